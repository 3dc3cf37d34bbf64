/*!
A chainable, default-valued view over a parsed document.

Grounded on `JsonReference` in the original implementation: `key`/`index`
each either narrow the reference to a child or collapse it to *null*
(absent), and every terminal getter falls back to a caller-supplied
default rather than surfacing an error. Useful for reading optional
configuration fields without a `match` at every step.
*/

use crate::extract::{self, StringSink};
use crate::navigator;
use crate::parser::Parser;
use crate::token::TokenKind;

/// A possibly-absent token, scoped to a [`Parser`]. `key`/`index` never
/// fail outright: once a step can't be satisfied, the reference goes
/// null and stays null through any further chaining.
#[derive(Clone, Copy)]
pub struct Ref<'p> {
    parser: &'p Parser,
    token: Option<usize>,
}

impl<'p> Ref<'p> {
    /// The reference to the document's outer value.
    pub fn root(parser: &'p Parser) -> Self {
        Ref {
            parser,
            token: navigator::outer_token(parser.tokens()),
        }
    }

    fn null(parser: &'p Parser) -> Self {
        Ref { parser, token: None }
    }

    pub fn is_null(&self) -> bool {
        self.token.is_none()
    }

    /// Narrow to the value for `key`, if this reference is an object.
    pub fn key(&self, key: &str) -> Ref<'p> {
        match self.token {
            Some(idx) if self.parser.tokens()[idx].kind == TokenKind::Object => {
                match navigator::value_by_key(self.parser.bytes(), self.parser.tokens(), idx, key) {
                    Ok(value_idx) => Ref {
                        parser: self.parser,
                        token: Some(value_idx),
                    },
                    Err(_) => Ref::null(self.parser),
                }
            }
            _ => Ref::null(self.parser),
        }
    }

    /// Narrow to the `index`-th direct child, if this reference is a
    /// container.
    pub fn index(&self, index: usize) -> Ref<'p> {
        match self.token {
            Some(idx)
                if matches!(
                    self.parser.tokens()[idx].kind,
                    TokenKind::Array | TokenKind::Object
                ) =>
            {
                match navigator::value_by_index(self.parser.tokens(), idx, index) {
                    Ok(value_idx) => Ref {
                        parser: self.parser,
                        token: Some(value_idx),
                    },
                    Err(_) => Ref::null(self.parser),
                }
            }
            _ => Ref::null(self.parser),
        }
    }

    /// Direct child count, or 0 if this reference is null or a scalar.
    pub fn size(&self) -> usize {
        match self.token {
            Some(idx) if self.parser.tokens()[idx].kind.is_container() => {
                navigator::array_size(self.parser.tokens(), idx)
            }
            _ => 0,
        }
    }

    pub fn value_bool(&self, default: bool) -> bool {
        match self.token {
            Some(idx) => extract::as_bool(self.parser.bytes(), &self.parser.tokens()[idx])
                .unwrap_or(default),
            None => default,
        }
    }

    pub fn value_int(&self, default: i64) -> i64 {
        match self.token {
            Some(idx) => {
                extract::as_i64(self.parser.bytes(), &self.parser.tokens()[idx]).unwrap_or(default)
            }
            None => default,
        }
    }

    pub fn value_unsigned_long(&self, default: u64) -> u64 {
        match self.token {
            Some(idx) => {
                extract::as_u64(self.parser.bytes(), &self.parser.tokens()[idx]).unwrap_or(default)
            }
            None => default,
        }
    }

    pub fn value_float(&self, default: f32) -> f32 {
        self.value_double(default as f64) as f32
    }

    pub fn value_double(&self, default: f64) -> f64 {
        match self.token {
            Some(idx) => {
                extract::as_f64(self.parser.bytes(), &self.parser.tokens()[idx]).unwrap_or(default)
            }
            None => default,
        }
    }

    pub fn value_string(&self, default: &str) -> String {
        match self.token {
            Some(idx) => {
                let mut sink = StringSink::new();
                extract::as_str(self.parser.bytes(), &self.parser.tokens()[idx], &mut sink);
                sink.into_string().unwrap_or_else(|_| default.to_string())
            }
            None => default.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_lookup_with_fallback_defaults() {
        let mut parser = Parser::new();
        parser
            .buffer_mut()
            .add_data(br#"{"nested":{"items":[10,20,30]},"name":"widget"}"#)
            .unwrap();
        parser.parse().unwrap();

        let root = Ref::root(&parser);
        assert_eq!(
            root.key("nested").key("items").index(1).value_int(-1),
            20
        );
        assert_eq!(root.key("name").value_string("?"), "widget");
        assert_eq!(root.key("missing").value_int(42), 42);
        assert!(root.key("missing").is_null());
    }
}
