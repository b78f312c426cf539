//! Error conversion implementations.
//!
//! From trait implementations for the third-party error types that surface
//! while tokenizing parts.
use super::types::Error;

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedXml {
            part: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::MalformedXml {
            part: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<quick_xml::encoding::EncodingError> for Error {
    fn from(err: quick_xml::encoding::EncodingError) -> Self {
        Error::MalformedXml {
            part: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::MalformedXml {
            part: String::new(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_part_fills_missing_name() {
        let err = Error::MalformedXml {
            part: String::new(),
            message: "unexpected end".to_string(),
        }
        .in_part("word/styles.xml");
        assert_eq!(
            err.to_string(),
            "Malformed XML in 'word/styles.xml': unexpected end"
        );
    }

    #[test]
    fn test_in_part_keeps_existing_name() {
        let err = Error::MalformedXml {
            part: "a.xml".to_string(),
            message: "x".to_string(),
        }
        .in_part("b.xml");
        assert!(err.to_string().contains("'a.xml'"));
    }
}
