/*!
A compact, embedded-oriented JSON tokenizer, navigator, extractor, and
in-place modifier.

This crate does not build a tree of owned values. Parsing produces a
flat array of [`token::Token`] span records pointing back into the
source buffer; navigation, extraction, and modification all operate on
those spans directly, so reading a document costs no allocation beyond
the token array itself.

Unsafe code is used internally for a handful of bounds-checked-in-debug,
unchecked-in-release indexing operations (see [`macros`]), gated behind
the `checked` cfg so fuzzing and tests always pay for the checks. None
of the safe public API can trigger undefined behavior; if you find a
counterexample, it's a bug.
*/

#[macro_use]
mod macros;

pub mod buffer;
pub mod chunk;
pub mod emit;
pub mod error;
pub mod extract;
pub mod fluent;
pub mod modify;
pub mod navigator;
pub mod parser;
pub mod token;

pub use buffer::Buffer;
pub use error::{BufferError, ExtractError, ModifyError, NavigateError, ParseError};
pub use fluent::Ref;
pub use parser::Parser;
pub use token::{Token, TokenKind};
