/*!
Error kinds shared across the buffer, tokenizer, navigator, extractor and modifier.

Nothing in this crate panics as part of its normal contract; every fallible
operation returns one of the enums below (or an `Option` where there's only
one way to fail). Recovery is always local: callers inspect the failure and
decide what to do next. The parser never auto-resets on error.
*/

use std::fmt;

/// Failure to grow or write into a [`crate::buffer::Buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer is fixed-capacity and has no room for the write.
    ByteCapacityExhausted,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ByteCapacityExhausted => {
                write!(f, "buffer is fixed-capacity and cannot absorb more bytes")
            }
        }
    }
}

impl std::error::Error for BufferError {}

/// The result of attempting to tokenize a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The input violates the JSON grammar at a definite position.
    Invalid { at: usize },
    /// The input ends while inside an unterminated string or container.
    Partial,
    /// The caller-provided token array was too small to hold the document.
    NoMem { needed: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Invalid { at } => write!(f, "invalid JSON grammar at byte {}", at),
            ParseError::Partial => write!(f, "input ends inside an open string or container"),
            ParseError::NoMem { needed } => {
                write!(f, "token array too small, need at least {} tokens", needed)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Failure to navigate to a requested token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateError {
    /// No child with that key exists in the container.
    KeyAbsent,
    /// The requested index is beyond the container's child count.
    IndexOutOfRange,
}

impl fmt::Display for NavigateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigateError::KeyAbsent => write!(f, "no such key in container"),
            NavigateError::IndexOutOfRange => write!(f, "index out of range for container"),
        }
    }
}

impl std::error::Error for NavigateError {}

/// Failure to convert a token's span into a requested typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractError {
    /// The span didn't parse as the requested numeric type.
    ConversionIncompatible,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::ConversionIncompatible => {
                write!(f, "span does not parse as the requested type")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Failure from an in-place modifier operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyError {
    /// `start_modify`/`start_append` was called while another modification
    /// was already in flight.
    ModifierBusy,
    /// The emitter ran out of room while writing the replacement content.
    EmitterTruncated,
    /// Re-parsing the buffer after the edit failed.
    Reparse(ParseError),
    /// The key or index requested for removal doesn't exist.
    Navigate(NavigateError),
}

impl fmt::Display for ModifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifyError::ModifierBusy => {
                write!(f, "a modification is already in flight on this parser")
            }
            ModifyError::EmitterTruncated => {
                write!(f, "output exceeded buffer capacity during modification")
            }
            ModifyError::Reparse(e) => write!(f, "re-parse after modification failed: {}", e),
            ModifyError::Navigate(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ModifyError {}

impl From<ParseError> for ModifyError {
    fn from(e: ParseError) -> Self {
        ModifyError::Reparse(e)
    }
}

impl From<NavigateError> for ModifyError {
    fn from(e: NavigateError) -> Self {
        ModifyError::Navigate(e)
    }
}
