//! Error types for credential parsing and evaluation.
//!
//! Parsing is fail-fast per record: a builder either returns a fully
//! populated record or exactly one error, never a partial record. File
//! parsers attach 1-based line numbers so callers can report precisely
//! which directive was rejected, and deny rather than guess when a
//! credential file is ambiguous.

use thiserror::Error;

/// Result type alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while parsing credential text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Timestamp token with an unrecognized length or non-digit layout.
    #[error("invalid timespec: {0}")]
    InvalidTimespec(String),

    /// Structurally broken option: unterminated quote, or an
    /// `environment` value without a `NAME=VALUE` shape.
    #[error("malformed option: {0}")]
    MalformedOption(String),

    /// Option name outside the grammar. The whole record is rejected.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// Allowed-signers line with too few whitespace-delimited fields.
    #[error("malformed allowed-signers line: {0:?}")]
    MalformedLine(String),

    /// Key material that does not decode as an SSH public-key wire blob
    /// matching the declared key type.
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Pattern with an empty body (a bare `!` or an empty list entry).
    #[error("invalid pattern: {0:?}")]
    InvalidPattern(String),
}

/// A parse failure tied to its 1-based line number in the source buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {error}")]
pub struct LineError {
    pub line: usize,
    pub error: Error,
}

/// Outcome of parsing a multi-line credential buffer.
///
/// Lenient by construction: well-formed lines land in `records`, broken
/// ones in `errors`, so a caller can load the good subset and report the
/// rest. Callers that want one bad line to invalidate the whole file use
/// [`ParseReport::into_result`].
#[derive(Debug, Clone)]
pub struct ParseReport<T> {
    pub records: Vec<T>,
    pub errors: Vec<LineError>,
}

impl<T> ParseReport<T> {
    /// True if every non-blank, non-comment line parsed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail-fast view: all records, or the first line error.
    pub fn into_result(self) -> std::result::Result<Vec<T>, LineError> {
        match self.errors.into_iter().next() {
            None => Ok(self.records),
            Some(err) => Err(err),
        }
    }
}

impl<T> Default for ParseReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}
