use std::fmt;

/// Category of a codec failure, mirroring the stage that detected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexer,
    Parse,
    Escape,
    Codec,
    Xml,
}

/// 1-based position of the offending input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Error {
    pub fn lexer(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind: ErrorKind::Lexer,
            message: message.into(),
            location: Some(Location { line, column }),
        }
    }

    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind: ErrorKind::Parse,
            message: message.into(),
            location: Some(Location { line, column }),
        }
    }

    pub fn escape(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Escape,
            message: message.into(),
            location: None,
        }
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Codec,
            message: message.into(),
            location: None,
        }
    }

    pub fn xml(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Xml,
            message: message.into(),
            location: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{} at line {}, column {}",
                self.message, loc.line, loc.column
            ),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Error {}
