use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    NotFound,
    InvalidShape,
    UnsupportedKind,
    RaggedInput,
    IndexOutOfRange,
    TypeConversion,
    Engine,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    chain: Option<String>,
    coords: Option<Vec<usize>>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            chain: None,
            coords: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn chain(&self) -> Option<&str> {
        self.chain.as_deref()
    }

    /// Offending position as an outer-to-inner index path into the nested
    /// value, when the failure is tied to one element.
    pub fn coords(&self) -> Option<&[usize]> {
        self.coords.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn with_coords(mut self, coords: impl Into<Vec<usize>>) -> Self {
        self.coords = Some(coords.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(chain) = &self.chain {
            write!(f, " (chain: {chain})")?;
        }
        if let Some(coords) = &self.coords {
            write!(f, " (at: ")?;
            for index in coords {
                write!(f, "[{index}]")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::InvalidShape => 4,
        ErrorKind::UnsupportedKind => 5,
        ErrorKind::RaggedInput => 6,
        ErrorKind::IndexOutOfRange => 7,
        ErrorKind::TypeConversion => 8,
        ErrorKind::Engine => 9,
        ErrorKind::Io => 10,
    }
}
