use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The input is not a readable zip container.
    InvalidArchive(String),
    /// The container has no `word/document.xml` part.
    MissingDocumentPart(String),
    Xml(roxmltree::Error),
    /// A single embedded image could not be read or measured. Never escapes a conversion.
    ImageDecode(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidArchive(msg) => write!(f, "Invalid DOCX archive: {msg}"),
            Error::MissingDocumentPart(part) => write!(f, "Missing document part: {part}"),
            Error::Xml(e) => write!(f, "Malformed document XML: {e}"),
            Error::ImageDecode(msg) => write!(f, "Image decode failure: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}
