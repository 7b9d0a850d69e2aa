use super::FormatError;
use crate::model::LinkRecord;

const LINK_PREFIX: &str = "Enlace: ";
const REPO_PREFIX: &str = "Repositorio: ";

pub fn encode(record: &LinkRecord) -> Result<String, FormatError> {
    if record.link.contains(',') {
        return Err(FormatError::CommaInLink(record.link.clone()));
    }
    Ok(format!(
        "{}{}, {}{}",
        LINK_PREFIX, record.link, REPO_PREFIX, record.repository_url
    ))
}

/// Text between `Enlace: ` and the first comma. Other lines are ignored.
pub fn parse_link(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(LINK_PREFIX)?;
    let link = rest.split(',').next().unwrap_or(rest).trim();
    (!link.is_empty()).then_some(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let record = LinkRecord::new("https://cdn/x.mpd", "https://github.com/octo/tv");
        assert_eq!(
            encode(&record).unwrap(),
            "Enlace: https://cdn/x.mpd, Repositorio: https://github.com/octo/tv"
        );
    }

    #[test]
    fn test_comma_in_link_rejected() {
        let record = LinkRecord::new("https://cdn/a,b.mpd", "https://github.com/octo/tv");
        assert_eq!(
            encode(&record),
            Err(FormatError::CommaInLink("https://cdn/a,b.mpd".to_string()))
        );
    }

    #[test]
    fn test_parse_ignores_foreign_lines() {
        assert_eq!(parse_link("https://cdn/x.mpd"), None);
        assert_eq!(parse_link("Enlace: , Repositorio: x"), None);
        assert_eq!(
            parse_link("Enlace: https://cdn/x.mpd, Repositorio: https://github.com/o/r\n"),
            Some("https://cdn/x.mpd")
        );
        // Records written before repositories were annotated.
        assert_eq!(parse_link("Enlace: https://cdn/y.mpd"), Some("https://cdn/y.mpd"));
    }
}
