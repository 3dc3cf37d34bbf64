/*!
The top-level handle combining a [`Buffer`], its scanned [`Token`]s, and
every navigator/extractor/emitter/modifier operation that acts on them.

Grounded on `JsonParser : public JsonBuffer` in the original
implementation, which bundles the same three responsibilities behind
one object; `JsonParserStatic<N>` is mirrored here as [`Parser::fixed`].
*/

use crate::buffer::Buffer;
use crate::emit::{BufferSink, Emitter, Value};
use crate::error::{BufferError, ExtractError, ModifyError, NavigateError, ParseError};
use crate::extract::{self, BoundedSink, StringSink};
use crate::navigator;
use crate::token::{self, Token};
use crate::{chunk, modify};

pub struct Parser {
    buffer: Buffer,
    tokens: Vec<Token>,
    token_count: usize,
    fixed_tokens: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// A parser over a growable buffer with automatically-sized token
    /// storage (two-pass on first parse).
    pub fn new() -> Self {
        Parser {
            buffer: Buffer::new(),
            tokens: Vec::new(),
            token_count: 0,
            fixed_tokens: false,
        }
    }

    /// A parser wrapping an already-constructed buffer.
    pub fn with_buffer(buffer: Buffer) -> Self {
        Parser {
            buffer,
            tokens: Vec::new(),
            token_count: 0,
            fixed_tokens: false,
        }
    }

    /// A parser whose buffer and token storage are both fixed-capacity,
    /// the Rust analogue of `JsonParserStatic<N>`.
    pub fn fixed(buffer_capacity: usize, token_capacity: usize) -> Self {
        Parser {
            buffer: Buffer::fixed(buffer_capacity),
            tokens: vec![Token::default(); token_capacity],
            token_count: 0,
            fixed_tokens: true,
        }
    }

    /// Pre-size token storage to exactly `n` tokens, switching this
    /// parser into fixed-token mode (no two-pass sizing on `NoMem`).
    pub fn allocate_tokens(&mut self, n: usize) {
        self.tokens = vec![Token::default(); n];
        self.token_count = 0;
        self.fixed_tokens = true;
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn bytes(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens[..self.token_count]
    }

    pub fn token(&self, idx: usize) -> Token {
        self.tokens[idx]
    }

    /// Ingest one chunk of a multipart payload. Does not parse; callers
    /// reassemble every expected chunk, then call [`Parser::parse`].
    pub fn add_chunk(
        &mut self,
        event_name: &str,
        payload: &[u8],
        chunk_size: usize,
    ) -> Result<(), BufferError> {
        chunk::add_chunk(&mut self.buffer, event_name, payload, chunk_size)
    }

    /// Reset the buffer and discard all tokens. The parser does not
    /// auto-clear between documents; callers clear explicitly.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.token_count = 0;
    }

    /// Scan the buffer's current contents into tokens.
    ///
    /// In fixed-token mode, a `NoMem` is returned to the caller as-is.
    /// Otherwise, a `NoMem` triggers the documented two-pass fallback:
    /// count the tokens needed, allocate exactly that many, and scan
    /// again over the same bytes.
    pub fn parse(&mut self) -> Result<usize, ParseError> {
        let input = self.buffer.as_slice();

        match token::scan_into(input, &mut self.tokens) {
            Ok(n) => {
                self.token_count = n;
                Ok(n)
            }
            Err(ParseError::NoMem { .. }) if !self.fixed_tokens => {
                log::debug!("token array undersized, falling back to two-pass sizing");
                let needed = token::required_token_count(input)?;
                self.tokens = vec![Token::default(); needed];
                let n = token::scan_into(input, &mut self.tokens)?;
                self.token_count = n;
                Ok(n)
            }
            Err(e) => {
                self.token_count = 0;
                log::warn!("parse failed: {}", e);
                Err(e)
            }
        }
    }

    // -- Navigator --------------------------------------------------

    pub fn outer_object(&self) -> Option<usize> {
        navigator::outer_object(self.tokens())
    }

    pub fn outer_array(&self) -> Option<usize> {
        navigator::outer_array(self.tokens())
    }

    pub fn outer_token(&self) -> Option<usize> {
        navigator::outer_token(self.tokens())
    }

    pub fn array_size(&self, container: usize) -> usize {
        navigator::array_size(self.tokens(), container)
    }

    pub fn value_by_index(&self, container: usize, index: usize) -> Result<usize, NavigateError> {
        navigator::value_by_index(self.tokens(), container, index)
    }

    pub fn key_value_by_index(
        &self,
        container: usize,
        index: usize,
    ) -> Result<(usize, usize), NavigateError> {
        navigator::key_value_by_index(self.tokens(), container, index)
    }

    pub fn value_by_key(&self, container: usize, key: &str) -> Result<usize, NavigateError> {
        navigator::value_by_key(self.bytes(), self.tokens(), container, key)
    }

    pub fn value_by_col_row(
        &self,
        container: usize,
        col: usize,
        row: usize,
    ) -> Result<usize, NavigateError> {
        navigator::value_by_col_row(self.tokens(), container, col, row)
    }

    // -- Extractors ---------------------------------------------------

    pub fn as_bool(&self, idx: usize) -> Result<bool, ExtractError> {
        extract::as_bool(self.bytes(), &self.tokens[idx])
    }

    pub fn as_i64(&self, idx: usize) -> Result<i64, ExtractError> {
        extract::as_i64(self.bytes(), &self.tokens[idx])
    }

    pub fn as_u64(&self, idx: usize) -> Result<u64, ExtractError> {
        extract::as_u64(self.bytes(), &self.tokens[idx])
    }

    pub fn as_f64(&self, idx: usize) -> Result<f64, ExtractError> {
        extract::as_f64(self.bytes(), &self.tokens[idx])
    }

    pub fn as_string(&self, idx: usize) -> Result<String, ExtractError> {
        let mut sink = StringSink::new();
        extract::as_str(self.bytes(), &self.tokens[idx], &mut sink);
        sink.into_string()
    }

    /// Decode a string token into a caller-supplied fixed buffer,
    /// truncating rather than allocating.
    pub fn as_string_bounded<'b>(&self, idx: usize, out: &'b mut [u8]) -> BoundedSink<'b> {
        let mut sink = BoundedSink::new(out);
        extract::as_str(self.bytes(), &self.tokens[idx], &mut sink);
        sink
    }

    pub fn token_json(&self, idx: usize) -> &[u8] {
        extract::token_json(self.bytes(), &self.tokens[idx])
    }

    // -- Emitter --------------------------------------------------------

    /// An emitter appending fresh JSON text at the buffer's current
    /// write offset, e.g. to build a brand-new document before parsing.
    pub fn emit(&mut self) -> Emitter<BufferSink<'_>> {
        Emitter::into_buffer(&mut self.buffer)
    }

    // -- Modifier ---------------------------------------------------

    fn adopt(&mut self, tokens: Vec<Token>) {
        self.token_count = tokens.len();
        self.tokens = tokens;
        self.fixed_tokens = false;
    }

    pub fn remove_key_value(&mut self, container: usize, key: &str) -> Result<(), ModifyError> {
        let tokens = self.tokens().to_vec();
        let updated = modify::remove_key_value(&mut self.buffer, &tokens, container, key)?;
        self.adopt(updated);
        Ok(())
    }

    pub fn remove_array_index(&mut self, container: usize, index: usize) -> Result<(), ModifyError> {
        let tokens = self.tokens().to_vec();
        let updated = modify::remove_array_index(&mut self.buffer, &tokens, container, index)?;
        self.adopt(updated);
        Ok(())
    }

    pub fn insert_or_update_key_value(
        &mut self,
        container: usize,
        key: &str,
        value: Value<'_>,
    ) -> Result<(), ModifyError> {
        let tokens = self.tokens().to_vec();
        let updated =
            modify::insert_or_update_key_value(&mut self.buffer, &tokens, container, key, value)?;
        self.adopt(updated);
        Ok(())
    }

    pub fn append_array_value(&mut self, container: usize, value: Value<'_>) -> Result<(), ModifyError> {
        let tokens = self.tokens().to_vec();
        let updated = modify::append_array_value(&mut self.buffer, &tokens, container, value)?;
        self.adopt(updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_typed_extraction() {
        let mut p = Parser::new();
        p.buffer_mut()
            .add_data(br#"{"t1":"abc","t2":1234,"t3":1234.5,"t4":true,"t5":false,"t6":null,"t7":"\"quoted\""}"#)
            .unwrap();
        p.parse().unwrap();

        let root = p.outer_object().unwrap();
        let t1 = p.value_by_key(root, "t1").unwrap();
        assert_eq!(p.as_string(t1).unwrap(), "abc");
        let t2 = p.value_by_key(root, "t2").unwrap();
        assert_eq!(p.as_i64(t2).unwrap(), 1234);
        let t3 = p.value_by_key(root, "t3").unwrap();
        assert_eq!(p.as_f64(t3).unwrap(), 1234.5);
        let t4 = p.value_by_key(root, "t4").unwrap();
        assert!(p.as_bool(t4).unwrap());
        let t5 = p.value_by_key(root, "t5").unwrap();
        assert!(!p.as_bool(t5).unwrap());
        let t7 = p.value_by_key(root, "t7").unwrap();
        assert_eq!(p.as_string(t7).unwrap(), "\"quoted\"");

        let (k2, v2) = p.key_value_by_index(root, 1).unwrap();
        assert_eq!(p.as_string(k2).unwrap(), "t2");
        assert_eq!(p.as_i64(v2).unwrap(), 1234);
    }

    #[test]
    fn col_row_lookup_over_array_of_arrays() {
        let mut p = Parser::new();
        p.buffer_mut()
            .add_data(br#"{"values":[["A","B","C","D"],[1,2,3,4]]}"#)
            .unwrap();
        p.parse().unwrap();

        let root = p.outer_object().unwrap();
        let values = p.value_by_key(root, "values").unwrap();
        let c = p.value_by_col_row(values, 0, 2).unwrap();
        assert_eq!(p.as_string(c).unwrap(), "C");
        let n = p.value_by_col_row(values, 1, 3).unwrap();
        assert_eq!(p.as_i64(n).unwrap(), 4);
    }

    #[test]
    fn unicode_and_escape_decoding_scenario() {
        let mut p = Parser::new();
        p.buffer_mut()
            .add_data("{\"t1\":\"ab\\\"\\u00A2c\\u20AC\"}".as_bytes())
            .unwrap();
        p.parse().unwrap();

        let root = p.outer_object().unwrap();
        let t1 = p.value_by_key(root, "t1").unwrap();
        let s = p.as_string(t1).unwrap();
        assert_eq!(s.as_bytes(), &[0x61, 0x62, 0x22, 0xc2, 0xa2, 0x63, 0xe2, 0x82, 0xac]);
    }

    #[test]
    fn emit_into_fixed_buffer_scenario() {
        let mut p = Parser::fixed(256, 16);
        {
            let mut e = p.emit();
            e.start_object();
            e.insert_key_value("a", Value::Bool(true));
            e.insert_key_value("b", Value::Int(1234));
            e.insert_key_value("c", Value::Str(b"test"));
            e.finish_object_or_array();
            assert!(!e.is_truncated());
        }
        assert_eq!(p.bytes(), br#"{"a":true,"b":1234,"c":"test"}"#);
    }

    #[test]
    fn chunked_reassembly_scenario() {
        let mut p = Parser::new();
        let chunk_size = 8usize;
        let full = br#"{"a":1,"b":"0123456789ab"}"#;
        let order = [0, 1, 4, 5, 6, 7, 8, 9, 10, 11, 2, 3];
        let chunks: Vec<&[u8]> = full.chunks(chunk_size).collect();

        for &i in &order {
            if i < chunks.len() {
                p.add_chunk(&format!("evt/{}", i), chunks[i], chunk_size)
                    .unwrap();
            }
        }

        assert_eq!(p.bytes(), &full[..]);
        p.parse().unwrap();
        assert!(p.outer_object().is_some());
    }
}
