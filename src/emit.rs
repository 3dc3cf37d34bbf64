/*!
Writing JSON text with automatic comma/quote/nesting bookkeeping.

An [`Emitter`] tracks a stack of container frames, each remembering
whether its next child needs a leading comma and which byte closes it.
Grounded on `JsonWriter` in the original implementation: `insertChar`'s
bounds check and latching `truncated` flag, `insertCheckSeparator`'s
first-child tracking, and `insertString`'s byte-by-byte high-bit UTF8
detection that re-encodes multi-byte characters as `\uXXXX` escapes.

The emitter is generic over where its bytes land (a growable
[`crate::buffer::Buffer`], or a fixed scratch window the modifier
carves out of one) via the [`ByteSink`] trait, so the same bookkeeping
serves both top-level document construction and in-place edits.
*/

/// Where an [`Emitter`]'s bytes go. `write_one` returns `false` instead
/// of panicking when there's no room, which the emitter turns into a
/// latched `truncated` flag rather than an error return.
pub trait ByteSink {
    fn write_one(&mut self, byte: u8) -> bool;
}

/// Writes into a (possibly growable) [`crate::buffer::Buffer`], appending
/// at its current write offset.
pub struct BufferSink<'b> {
    buf: &'b mut crate::buffer::Buffer,
}

impl<'b> BufferSink<'b> {
    pub fn new(buf: &'b mut crate::buffer::Buffer) -> Self {
        BufferSink { buf }
    }
}

impl ByteSink for BufferSink<'_> {
    #[inline]
    fn write_one(&mut self, byte: u8) -> bool {
        self.buf.add_data(&[byte]).is_ok()
    }
}

/// Writes into a fixed byte window, used by the modifier's displaced
/// scratch region where growth is never possible or desired.
pub struct SliceSink<'b> {
    dst: &'b mut [u8],
    pos: usize,
}

impl<'b> SliceSink<'b> {
    pub fn new(dst: &'b mut [u8]) -> Self {
        SliceSink { dst, pos: 0 }
    }

    pub fn written(&self) -> usize {
        self.pos
    }
}

impl ByteSink for SliceSink<'_> {
    fn write_one(&mut self, byte: u8) -> bool {
        if self.pos < self.dst.len() {
            self.dst[self.pos] = byte;
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// A value to hand to [`Emitter::insert_value`] or one of its
/// `insert_key_value`/`insert_array_value` callers.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'a [u8]),
}

struct Frame {
    is_first: bool,
    terminator: Option<u8>,
}

pub struct Emitter<S: ByteSink> {
    sink: S,
    context: Vec<Frame>,
    truncated: bool,
    float_places: Option<u32>,
}

impl<'b> Emitter<BufferSink<'b>> {
    pub fn into_buffer(buf: &'b mut crate::buffer::Buffer) -> Self {
        Emitter::new(BufferSink::new(buf))
    }
}

impl<'b> Emitter<SliceSink<'b>> {
    pub fn into_slice(dst: &'b mut [u8]) -> Self {
        Emitter::new(SliceSink::new(dst))
    }

    pub fn written(&self) -> usize {
        self.sink.written()
    }
}

impl<S: ByteSink> Emitter<S> {
    pub fn new(sink: S) -> Self {
        Emitter {
            sink,
            context: vec![Frame {
                is_first: true,
                terminator: None,
            }],
            truncated: false,
            float_places: None,
        }
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Exact decimal places for floats; `None` uses Rust's default
    /// shortest-round-trip formatting.
    pub fn set_float_places(&mut self, places: Option<u32>) {
        self.float_places = places;
    }

    /// Override whether the *next* item in the current container needs a
    /// leading comma. Used by the modifier when it starts writing into an
    /// existing non-empty container, where a fresh `Emitter`'s default
    /// (no comma for the first write) would be wrong.
    pub fn set_is_first(&mut self, is_first: bool) {
        self.context.last_mut().expect("root frame always present").is_first = is_first;
    }

    fn insert_char(&mut self, byte: u8) {
        if self.truncated {
            return;
        }
        if !self.sink.write_one(byte) {
            self.truncated = true;
        }
    }

    fn insert_raw(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.insert_char(b);
        }
    }

    fn insert_check_separator(&mut self) {
        let is_first = self.context.last().expect("root frame always present").is_first;
        if is_first {
            self.context.last_mut().unwrap().is_first = false;
        } else {
            self.insert_char(b',');
        }
    }

    /// Emit a 2- or 3-byte UTF8 sequence's code point as `\uXXXX`.
    fn insert_unicode_escape(&mut self, code: u16) {
        self.insert_char(b'\\');
        self.insert_char(b'u');
        self.insert_raw(format!("{:04X}", code).as_bytes());
    }

    /// Write `s`'s bytes, escaping control characters, `"` and `\`, and
    /// re-encoding any 2- or 3-byte UTF8 sequence as `\uXXXX`. A
    /// malformed or 4-byte-leading high-bit byte passes through as-is,
    /// matching the original implementation, which only recognizes 2-
    /// and 3-byte forms.
    fn insert_string(&mut self, s: &[u8], quoted: bool) {
        if quoted {
            self.insert_char(b'"');
        }

        let mut i = 0;
        while i < s.len() {
            let b = s[i];

            if b & 0x80 != 0 {
                if b & 0xf0 == 0xe0
                    && i + 2 < s.len()
                    && s[i + 1] & 0xc0 == 0x80
                    && s[i + 2] & 0xc0 == 0x80
                {
                    let code = ((b as u32 & 0x0f) << 12)
                        | ((s[i + 1] as u32 & 0x3f) << 6)
                        | (s[i + 2] as u32 & 0x3f);
                    self.insert_unicode_escape(code as u16);
                    i += 3;
                    continue;
                }
                if b & 0xe0 == 0xc0 && i + 1 < s.len() && s[i + 1] & 0xc0 == 0x80 {
                    let code = ((b as u32 & 0x1f) << 6) | (s[i + 1] as u32 & 0x3f);
                    self.insert_unicode_escape(code as u16);
                    i += 2;
                    continue;
                }
                self.insert_char(b);
                i += 1;
                continue;
            }

            match b {
                0x08 => self.insert_raw(b"\\b"),
                0x0c => self.insert_raw(b"\\f"),
                b'\n' => self.insert_raw(b"\\n"),
                b'\r' => self.insert_raw(b"\\r"),
                b'\t' => self.insert_raw(b"\\t"),
                b'"' => self.insert_raw(b"\\\""),
                b'\\' => self.insert_raw(b"\\\\"),
                _ => self.insert_char(b),
            }
            i += 1;
        }

        if quoted {
            self.insert_char(b'"');
        }
    }

    fn start_container(&mut self, open: u8, close: u8, empty: bool) {
        self.insert_check_separator();
        self.context.push(Frame {
            is_first: empty,
            terminator: Some(close),
        });
        self.insert_char(open);
    }

    pub fn start_object(&mut self) {
        self.start_container(b'{', b'}', true);
    }

    pub fn start_array(&mut self) {
        self.start_container(b'[', b']', true);
    }

    /// Close the innermost open container. A tolerant no-op if called
    /// with only the root frame left, guarding against over-popping.
    pub fn finish_object_or_array(&mut self) {
        if self.context.len() <= 1 {
            return;
        }
        let frame = self.context.pop().unwrap();
        if let Some(terminator) = frame.terminator {
            self.insert_char(terminator);
        }
    }

    fn insert_value_raw(&mut self, value: &Value<'_>) {
        match value {
            Value::Null => self.insert_raw(b"null"),
            Value::Bool(true) => self.insert_raw(b"true"),
            Value::Bool(false) => self.insert_raw(b"false"),
            Value::Int(v) => self.insert_raw(v.to_string().as_bytes()),
            Value::UInt(v) => self.insert_raw(v.to_string().as_bytes()),
            Value::Float(v) => match self.float_places {
                Some(places) => self.insert_raw(format!("{:.*}", places as usize, v).as_bytes()),
                None => self.insert_raw(v.to_string().as_bytes()),
            },
            Value::Str(s) => self.insert_string(s, true),
        }
    }

    /// Emit `value` as the next element of the current container,
    /// without separator/key bookkeeping. Prefer
    /// [`Emitter::insert_array_value`] or [`Emitter::insert_key_value`].
    pub fn insert_value(&mut self, value: Value<'_>) {
        self.insert_value_raw(&value);
    }

    pub fn insert_array_value(&mut self, value: Value<'_>) {
        self.insert_check_separator();
        self.insert_value_raw(&value);
    }

    pub fn insert_key_value(&mut self, key: &str, value: Value<'_>) {
        self.insert_check_separator();
        self.insert_string(key.as_bytes(), true);
        self.insert_char(b':');
        self.insert_value_raw(&value);
    }

    fn insert_key_container(&mut self, key: &str, open: u8, close: u8) {
        self.insert_check_separator();
        self.insert_string(key.as_bytes(), true);
        self.insert_char(b':');
        self.context.push(Frame {
            is_first: true,
            terminator: Some(close),
        });
        self.insert_char(open);
    }

    pub fn insert_key_object(&mut self, key: &str) {
        self.insert_key_container(key, b'{', b'}');
    }

    pub fn insert_key_array(&mut self, key: &str) {
        self.insert_key_container(key, b'[', b']');
    }
}

/// RAII guard that opens an object on construction and closes it on
/// drop. Grounded on `JsonWriterAutoObject` in the original
/// implementation.
pub struct ObjectScope<'e, S: ByteSink> {
    emitter: &'e mut Emitter<S>,
}

impl<'e, S: ByteSink> ObjectScope<'e, S> {
    pub fn new(emitter: &'e mut Emitter<S>) -> Self {
        emitter.start_object();
        ObjectScope { emitter }
    }

    pub fn emitter(&mut self) -> &mut Emitter<S> {
        self.emitter
    }
}

impl<S: ByteSink> Drop for ObjectScope<'_, S> {
    fn drop(&mut self) {
        self.emitter.finish_object_or_array();
    }
}

/// RAII guard for arrays, the `ArrayScope` counterpart of
/// [`ObjectScope`]. Grounded on `JsonWriterAutoArray`.
pub struct ArrayScope<'e, S: ByteSink> {
    emitter: &'e mut Emitter<S>,
}

impl<'e, S: ByteSink> ArrayScope<'e, S> {
    pub fn new(emitter: &'e mut Emitter<S>) -> Self {
        emitter.start_array();
        ArrayScope { emitter }
    }

    pub fn emitter(&mut self) -> &mut Emitter<S> {
        self.emitter
    }
}

impl<S: ByteSink> Drop for ArrayScope<'_, S> {
    fn drop(&mut self) {
        self.emitter.finish_object_or_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit_into(cap: usize, f: impl FnOnce(&mut Emitter<SliceSink<'_>>)) -> (Vec<u8>, bool) {
        let mut buf = vec![0u8; cap];
        let mut e = Emitter::into_slice(&mut buf);
        f(&mut e);
        let n = e.written();
        let truncated = e.is_truncated();
        (buf[..n].to_vec(), truncated)
    }

    #[test]
    fn object_with_mixed_values() {
        let (out, truncated) = emit_into(256, |e| {
            e.start_object();
            e.insert_key_value("a", Value::Bool(true));
            e.insert_key_value("b", Value::Int(1234));
            e.insert_key_value("c", Value::Str(b"test"));
            e.finish_object_or_array();
        });
        assert!(!truncated);
        assert_eq!(out, br#"{"a":true,"b":1234,"c":"test"}"#);
    }

    #[test]
    fn nested_object_via_insert_key_object() {
        let (out, _) = emit_into(256, |e| {
            e.start_object();
            e.insert_key_object("inner");
            e.insert_key_value("x", Value::Int(1));
            e.finish_object_or_array();
            e.finish_object_or_array();
        });
        assert_eq!(out, br#"{"inner":{"x":1}}"#);
    }

    #[test]
    fn empty_object_and_array_have_no_comma_artifacts() {
        let (out, _) = emit_into(64, |e| {
            e.start_object();
            e.finish_object_or_array();
        });
        assert_eq!(out, b"{}");

        let (out, _) = emit_into(64, |e| {
            e.start_array();
            e.finish_object_or_array();
        });
        assert_eq!(out, b"[]");
    }

    #[test]
    fn string_escapes_high_bit_as_unicode() {
        let (out, _) = emit_into(64, |e| {
            e.insert_value(Value::Str("caf\u{e9}".as_bytes()));
        });
        assert_eq!(out, b"\"caf\\u00E9\"");
    }

    #[test]
    fn capacity_overflow_latches_truncated() {
        let (_out, truncated) = emit_into(4, |e| {
            e.start_object();
            e.insert_key_value("a", Value::Int(1));
            e.finish_object_or_array();
        });
        assert!(truncated);
    }

    #[test]
    fn array_scope_closes_on_drop() {
        let mut buf = vec![0u8; 64];
        let mut e = Emitter::into_slice(&mut buf);
        {
            let mut scope = ArrayScope::new(&mut e);
            scope.emitter().insert_array_value(Value::Int(1));
            scope.emitter().insert_array_value(Value::Int(2));
        }
        let n = e.written();
        assert_eq!(&buf[..n], b"[1,2]");
    }

    #[test]
    fn float_places_controls_precision() {
        let (out, _) = emit_into(64, |e| {
            e.set_float_places(Some(2));
            e.insert_value(Value::Float(3.14159));
        });
        assert_eq!(out, b"3.14");
    }
}
