use std::borrow::Cow;
use std::{error, fmt, io, string};

use crate::AtomType;

/// Type alias for the result of container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while decoding, encoding, or querying ADE containers.
#[derive(Debug)]
pub enum ErrorKind {
    /// The byte length of a value's data didn't match the type's fixed width.
    /// Contains the type, the expected length, and the length that was found.
    ByteCount(AtomType, usize, usize),
    /// A decoded or to-be-encoded value fell outside the representable range of its type.
    /// Contains the type and a description of the offending value.
    Range(AtomType, String),
    /// Text input did not parse as a valid value of the given type. Contains the type and
    /// the offending text.
    StrInvalid(AtomType, String),
    /// A rational value (`SR32`/`SR64`) had a denominator of zero.
    ZeroDenominator(AtomType),
    /// A delimited string contained an invalid `\x..` escape, or a trailing lone `\`.
    InvalidEscape(String),
    /// A delimited string was missing its surrounding quotes.
    Undelimited(String),
    /// A delimited string contained a raw control byte or quote that should have been escaped.
    Unescaped(String),
    /// The binary frame's declared size didn't match the bytes actually present.
    BinaryFrame(String),
    /// ContainerText didn't match the expected grammar. Contains the 1-based line number.
    TextGrammar(usize, String),
    /// A path expression failed to lex or parse. Contains the original path text.
    PathSyntax(String, String),
    /// A path expression referenced an unknown function/variable or used the wrong arity.
    PathSemantic(String),
    /// A path predicate was empty (`[]`).
    PredicateEmpty,
    /// An atom name was not exactly 4 bytes.
    InvalidName(usize),
    /// A type code was not one of the closed set of recognized ADE types.
    UnknownType(String),
    /// An invalid UTF-8 string was encountered where one was required to be valid.
    Utf8Decoding(string::FromUtf8Error),
    /// An I/O error occurred while reading or writing a file.
    Io(io::Error),
}

/// Any error that may occur while performing ADE AtomContainer operations.
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: Cow<'static, str>,
}

impl Error {
    /// Creates a new error of `kind` with a human readable `description`.
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Error {
        Error { kind, description: description.into() }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Utf8Decoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        let description = format!("IO error: {err}");
        Error::new(ErrorKind::Io(err), description)
    }
}

impl From<string::FromUtf8Error> for Error {
    fn from(err: string::FromUtf8Error) -> Error {
        Error::new(ErrorKind::Utf8Decoding(err), "Data is not valid utf-8.")
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}:\n{:?}", self.description, self.kind)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}", self.description)
        }
    }
}
