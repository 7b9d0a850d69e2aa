//! Line layouts of the result store.
//!
//! - `plain` - one raw URL per line
//! - `annotated` - `Enlace: <link>, Repositorio: <repo_url>`

pub mod annotated;
pub mod plain;

use serde::{Deserialize, Serialize};

use crate::model::LinkRecord;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The annotated layout splits on the first comma, so the link cannot carry one.
    #[error("Link '{0}' contains a comma and cannot be stored in the annotated format")]
    CommaInLink(String),
    #[error("Link '{0}' contains a line break")]
    LineBreakInLink(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Plain,
    Annotated,
}

impl RecordFormat {
    /// Renders a record as one line, without the trailing newline.
    pub fn encode(&self, record: &LinkRecord) -> Result<String, FormatError> {
        if record.link.contains(['\n', '\r']) {
            return Err(FormatError::LineBreakInLink(record.link.clone()));
        }
        match self {
            RecordFormat::Plain => Ok(plain::encode(record)),
            RecordFormat::Annotated => annotated::encode(record),
        }
    }

    /// Recovers the link portion of a stored line, if the line is a record.
    pub fn parse_link<'a>(&self, line: &'a str) -> Option<&'a str> {
        match self {
            RecordFormat::Plain => plain::parse_link(line),
            RecordFormat::Annotated => annotated::parse_link(line),
        }
    }
}
