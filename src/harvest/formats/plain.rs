use crate::model::LinkRecord;

pub fn encode(record: &LinkRecord) -> String {
    record.link.clone()
}

/// Blank lines are not records.
pub fn parse_link(line: &str) -> Option<&str> {
    let link = line.trim();
    (!link.is_empty()).then_some(link)
}
