/*!
Converting a token's span into a typed Rust value.

Strings are decoded on demand rather than in the tokenizer: a [`Sink`]
receives bytes one at a time, so the caller picks where they land (an
owned `String`, or a fixed caller-supplied buffer that truncates
instead of allocating). Grounded on the original implementation's
`getTokenValue` family and its `JsonParserString` sink, including the
exact boolean-truthy byte set and the `\uXXXX` → UTF8 bit patterns in
`appendUtf8`.

Numeric and boolean escapes aside, `\uXXXX` here only ever emits 1-3
UTF8 bytes for a single BMP code point. Surrogate pairs are not
reassembled: a `\uD800`-`\uDFFF` escape (high or low surrogate) is
encoded as its raw 3-byte form, matching the original and this crate's
non-goal of full astral-plane support on embedded targets.
*/

use crate::error::ExtractError;
use crate::token::Token;

/// Receives decoded string bytes one at a time.
pub trait Sink {
    fn push_byte(&mut self, byte: u8);
}

/// A growable, heap-backed [`Sink`].
#[derive(Debug, Default)]
pub struct StringSink {
    buf: Vec<u8>,
}

impl StringSink {
    pub fn new() -> Self {
        StringSink { buf: Vec::new() }
    }

    /// Consume the sink, producing the decoded string.
    ///
    /// The decoder only ever emits bytes that came from the source UTF8
    /// document or from a well-formed UTF8 encoding of a `\uXXXX`
    /// escape, so this never fails in practice; we still go through the
    /// checked conversion rather than assume it.
    pub fn into_string(self) -> Result<String, ExtractError> {
        String::from_utf8(self.buf).map_err(|_| ExtractError::ConversionIncompatible)
    }
}

impl Sink for StringSink {
    #[inline]
    fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }
}

/// A fixed caller-supplied buffer that truncates instead of growing.
///
/// Grounded on the fixed-`char*` mode of `JsonParserString`: writes past
/// capacity are dropped, but `total_len` keeps counting so the caller can
/// tell a truncated read from a complete one.
pub struct BoundedSink<'b> {
    buf: &'b mut [u8],
    written: usize,
    total_len: usize,
}

impl<'b> BoundedSink<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        BoundedSink {
            buf,
            written: 0,
            total_len: 0,
        }
    }

    /// Bytes actually written into the buffer (`<= buf.len()`).
    pub fn written(&self) -> usize {
        self.written
    }

    /// The decoded length before truncation.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn truncated(&self) -> bool {
        self.total_len > self.written
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }
}

impl Sink for BoundedSink<'_> {
    fn push_byte(&mut self, byte: u8) {
        if self.written < self.buf.len() {
            self.buf[self.written] = byte;
            self.written += 1;
        }
        self.total_len += 1;
    }
}

/// Encode a UTF16 code unit as UTF8, BMP-only (no surrogate-pair
/// reassembly). Returns the number of bytes written to `out`.
///
/// Bit patterns match `appendUtf8` in the original implementation
/// exactly: 1 byte up to `0x7f`, 2 bytes up to `0x7ff`, 3 bytes above
/// that (the full `0x0000..=0xffff` range, surrogates included as their
/// literal 3-byte encoding).
pub(crate) fn encode_utf8_from_utf16(code: u16, out: &mut [u8; 3]) -> usize {
    let code = code as u32;
    if code <= 0x7f {
        out[0] = code as u8;
        1
    } else if code <= 0x7ff {
        out[0] = 0b1100_0000 | ((code >> 6) as u8);
        out[1] = 0b1000_0000 | ((code & 0x3f) as u8);
        2
    } else {
        out[0] = 0b1110_0000 | ((code >> 12) as u8);
        out[1] = 0b1000_0000 | (((code >> 6) & 0x3f) as u8);
        out[2] = 0b1000_0000 | ((code & 0x3f) as u8);
        3
    }
}

/// Decode a string token's escapes into `sink`.
///
/// Recognized escapes are `\" \\ \/ \b \f \n \r \t` and `\uXXXX`; any
/// other character following a backslash is passed through literally,
/// matching the original implementation's tolerant default branch.
pub fn as_str(input: &[u8], tok: &Token, sink: &mut impl Sink) {
    let span = &input[tok.start..tok.end];
    let mut i = 0;

    while i < span.len() {
        let b = span[i];

        if b != b'\\' {
            sink.push_byte(b);
            i += 1;
            continue;
        }

        if i + 1 >= span.len() {
            sink.push_byte(b);
            i += 1;
            continue;
        }

        let esc = span[i + 1];
        match esc {
            b'"' => {
                sink.push_byte(b'"');
                i += 2;
            }
            b'\\' => {
                sink.push_byte(b'\\');
                i += 2;
            }
            b'/' => {
                sink.push_byte(b'/');
                i += 2;
            }
            b'b' => {
                sink.push_byte(0x08);
                i += 2;
            }
            b'f' => {
                sink.push_byte(0x0c);
                i += 2;
            }
            b'n' => {
                sink.push_byte(b'\n');
                i += 2;
            }
            b'r' => {
                sink.push_byte(b'\r');
                i += 2;
            }
            b't' => {
                sink.push_byte(b'\t');
                i += 2;
            }
            b'u' if i + 6 <= span.len() => {
                let hex = std::str::from_utf8(&span[i + 2..i + 6]).ok();
                let code = hex.and_then(|h| u16::from_str_radix(h, 16).ok());
                match code {
                    Some(code) => {
                        let mut buf = [0u8; 3];
                        let len = encode_utf8_from_utf16(code, &mut buf);
                        for &byte in &buf[..len] {
                            sink.push_byte(byte);
                        }
                        i += 6;
                    }
                    None => {
                        sink.push_byte(esc);
                        i += 2;
                    }
                }
            }
            _ => {
                sink.push_byte(esc);
                i += 2;
            }
        }
    }
}

/// The raw bytes of a token's span, verbatim: no escape decoding, and for
/// a `String` token the enclosing quotes are excluded.
///
/// This is not generally round-trippable back into valid JSON on its
/// own; it matches `getTokenJsonString` in the original implementation,
/// which exists for callers that just want to relay the text as-is.
pub fn token_json<'i>(input: &'i [u8], tok: &Token) -> &'i [u8] {
    &input[tok.start..tok.end]
}

/// Interpret a span's first byte against the truthy set `t T y Y 1`.
///
/// An empty span is neither truthy nor falsy, it's a conversion failure,
/// matching the original's refusal to report success for an empty token.
pub fn as_bool(input: &[u8], tok: &Token) -> Result<bool, ExtractError> {
    let span = &input[tok.start..tok.end];
    match span.first() {
        None => Err(ExtractError::ConversionIncompatible),
        Some(b) => Ok(matches!(b, b't' | b'T' | b'y' | b'Y' | b'1')),
    }
}

/// Size of the stack scratch buffer numeric extractors copy a span into,
/// mirroring the original's `char tmp[16]`.
const NUMERIC_SCRATCH_LEN: usize = 16;

/// Copy up to 15 bytes of the token's span into a fixed scratch buffer,
/// the same truncate-before-parsing behavior as `copyTokenValue`: longer
/// spans lose their tail rather than growing the buffer.
fn numeric_scratch(input: &[u8], tok: &Token) -> Result<([u8; NUMERIC_SCRATCH_LEN], usize), ExtractError> {
    let span = &input[tok.start..tok.end];
    let n = span.len().min(NUMERIC_SCRATCH_LEN - 1);
    let mut tmp = [0u8; NUMERIC_SCRATCH_LEN];
    tmp[..n].copy_from_slice(&span[..n]);
    Ok((tmp, n))
}

fn scratch_str(tmp: &[u8; NUMERIC_SCRATCH_LEN], n: usize) -> Result<&str, ExtractError> {
    std::str::from_utf8(&tmp[..n]).map_err(|_| ExtractError::ConversionIncompatible)
}

pub fn as_i64(input: &[u8], tok: &Token) -> Result<i64, ExtractError> {
    let (tmp, n) = numeric_scratch(input, tok)?;
    scratch_str(&tmp, n)?
        .parse()
        .map_err(|_| ExtractError::ConversionIncompatible)
}

pub fn as_u64(input: &[u8], tok: &Token) -> Result<u64, ExtractError> {
    let (tmp, n) = numeric_scratch(input, tok)?;
    scratch_str(&tmp, n)?
        .parse()
        .map_err(|_| ExtractError::ConversionIncompatible)
}

pub fn as_f64(input: &[u8], tok: &Token) -> Result<f64, ExtractError> {
    let (tmp, n) = numeric_scratch(input, tok)?;
    scratch_str(&tmp, n)?
        .parse()
        .map_err(|_| ExtractError::ConversionIncompatible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{required_token_count, scan_into};

    fn scan(input: &[u8]) -> Vec<Token> {
        let needed = required_token_count(input).unwrap();
        let mut tokens = vec![Token::default(); needed];
        let n = scan_into(input, &mut tokens).unwrap();
        tokens.truncate(n);
        tokens
    }

    #[test]
    fn decodes_standard_escapes() {
        let input = br#"{"a":"line1\nline2\ttabbed"}"#;
        let tokens = scan(input);
        let mut sink = StringSink::new();
        as_str(input, &tokens[1], &mut sink);
        assert_eq!(sink.into_string().unwrap(), "a");
        let mut sink = StringSink::new();
        as_str(input, &tokens[2], &mut sink);
        assert_eq!(sink.into_string().unwrap(), "line1\nline2\ttabbed");
    }

    #[test]
    fn decodes_unicode_escape_to_exact_utf8_bytes() {
        let input = br#""caf\u00e9""#;
        let tokens = scan(input);
        let mut sink = StringSink::new();
        as_str(input, &tokens[0], &mut sink);
        assert_eq!(sink.into_string().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn bounded_sink_truncates_but_counts_full_length() {
        let input = br#""hello world""#;
        let tokens = scan(input);
        let mut buf = [0u8; 5];
        let mut sink = BoundedSink::new(&mut buf);
        as_str(input, &tokens[0], &mut sink);
        assert_eq!(sink.as_bytes(), b"hello");
        assert_eq!(sink.total_len(), 11);
        assert!(sink.truncated());
    }

    #[test]
    fn bool_truthy_byte_set() {
        for (text, expected) in [
            (&b"true"[..], true),
            (b"True", true),
            (b"yes", true),
            (b"Y", true),
            (b"1", true),
            (b"0", false),
            (b"false", false),
            (b"no", false),
        ] {
            let doc = format!("[{}]", std::str::from_utf8(text).unwrap());
            let tokens = scan(doc.as_bytes());
            assert_eq!(as_bool(doc.as_bytes(), &tokens[1]).unwrap(), expected);
        }
    }

    #[test]
    fn numeric_conversions() {
        let input = br#"[42,-7,3.5]"#;
        let tokens = scan(input);
        assert_eq!(as_i64(input, &tokens[1]).unwrap(), 42);
        assert_eq!(as_i64(input, &tokens[2]).unwrap(), -7);
        assert_eq!(as_f64(input, &tokens[3]).unwrap(), 3.5);
        assert!(as_u64(input, &tokens[2]).is_err());
    }

    #[test]
    fn numeric_spans_longer_than_scratch_buffer_are_truncated_not_rejected() {
        // 20 nines: parsing the full span overflows i64, but the original's
        // copy-into-tmp[16] truncates to the first 15 digits before parsing,
        // which fits.
        let input = br#"[99999999999999999999]"#;
        let tokens = scan(input);
        assert_eq!(as_i64(input, &tokens[1]).unwrap(), 999_999_999_999_999);
    }

    #[test]
    fn token_json_excludes_quotes_but_keeps_escapes_raw() {
        let input = br#"{"a":"x\ny"}"#;
        let tokens = scan(input);
        assert_eq!(token_json(input, &tokens[2]), b"x\\ny");
    }
}
