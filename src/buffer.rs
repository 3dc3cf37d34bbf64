/*!
The byte buffer underlying a [`crate::parser::Parser`].

A [`Buffer`] owns a contiguous byte region, either a caller-provided fixed
region or one it grows on demand. It tracks a write offset but knows nothing
about JSON; the tokenizer is the first thing that gives its bytes meaning.
*/

use crate::error::BufferError;

/// A contiguous byte region with a write cursor.
///
/// In fixed mode the buffer never reallocates: writes past capacity fail
/// with [`BufferError::ByteCapacityExhausted`]. In growable mode `addData`
/// and `addChunkedData` extend the underlying allocation as needed, which
/// means every pointer or slice borrowed from the buffer is invalidated by
/// a write. Borrow checking makes this the default in Rust: callers can't
/// hold a `&[u8]` across a `&mut self` write.
#[derive(Debug, Clone)]
pub struct Buffer {
    bytes: Vec<u8>,
    write_offset: usize,
    fixed: bool,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// An empty, growable buffer.
    #[inline]
    pub fn new() -> Self {
        Buffer {
            bytes: Vec::new(),
            write_offset: 0,
            fixed: false,
        }
    }

    /// A growable buffer pre-allocated to `capacity` bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Buffer {
            bytes: vec![0u8; capacity],
            write_offset: 0,
            fixed: false,
        }
    }

    /// A fixed-capacity buffer that never reallocates.
    ///
    /// Grounded on `JsonParserStatic<N>` in the original implementation,
    /// which wraps a caller-owned `char[N]` instead of a heap allocation.
    #[inline]
    pub fn fixed(capacity: usize) -> Self {
        Buffer {
            bytes: vec![0u8; capacity],
            write_offset: 0,
            fixed: true,
        }
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Set the write cursor directly.
    ///
    /// Used by the modifier after an in-place edit has already rearranged
    /// bytes; callers must ensure `offset <= capacity()`.
    #[inline]
    pub fn set_offset(&mut self, offset: usize) {
        debug_assert!(offset <= self.bytes.len());
        self.write_offset = offset;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.write_offset]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        let len = self.write_offset;
        &mut self.bytes[..len]
    }

    /// The full backing storage, including the unwritten tail. The modifier
    /// uses this tail as scratch space for its displaced window.
    #[inline]
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.bytes
    }

    /// Grow the backing allocation to at least `new_len` bytes.
    ///
    /// Fails in fixed mode; always succeeds in growable mode (panics only
    /// on allocation failure, matching `Vec`'s own contract).
    pub fn allocate(&mut self, new_len: usize) -> Result<(), BufferError> {
        if self.fixed {
            return Err(BufferError::ByteCapacityExhausted);
        }

        if new_len > self.bytes.len() {
            self.bytes.resize(new_len, 0);
        }

        Ok(())
    }

    /// Append raw bytes at the current write offset, growing if needed.
    pub fn add_data(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let needed = self.write_offset + data.len();
        if needed > self.bytes.len() {
            self.allocate(needed)?;
        }

        self.bytes[self.write_offset..needed].copy_from_slice(data);
        self.write_offset = needed;

        Ok(())
    }

    /// Append a UTF8 string's bytes, the Rust analogue of `addString`.
    #[inline]
    pub fn add_string(&mut self, s: &str) -> Result<(), BufferError> {
        self.add_data(s.as_bytes())
    }

    /// Place a chunk of a multipart payload at `index * chunk_size`,
    /// growing the buffer if it's not fixed.
    ///
    /// Chunks may arrive out of order; the caller is expected to supply
    /// every chunk except possibly the last at exactly `chunk_size` bytes.
    /// `write_offset` only ever grows: an earlier chunk (e.g. index 1)
    /// arriving before chunk 0 must not have its high-water mark clobbered
    /// by a later, lower-offset chunk.
    pub fn add_chunked_data(
        &mut self,
        index: usize,
        payload: &[u8],
        chunk_size: usize,
    ) -> Result<(), BufferError> {
        let offset = index * chunk_size;
        let needed = offset + payload.len();

        if needed > self.bytes.len() {
            self.allocate(needed)?;
        }

        self.bytes[offset..needed].copy_from_slice(payload);

        if needed > self.write_offset {
            self.write_offset = needed;
        }

        Ok(())
    }

    /// Reset the write cursor to zero and zero the bytes written so far.
    pub fn clear(&mut self) {
        for b in &mut self.bytes[..self.write_offset] {
            *b = 0;
        }
        self.write_offset = 0;
    }

    /// Write a trailing NUL, for callers that need a C-string view.
    ///
    /// Writes at `write_offset` when there's room, otherwise clobbers the
    /// last byte of the buffer so a truncated buffer is still terminated.
    pub fn null_terminate(&mut self) {
        if self.bytes.is_empty() {
            return;
        }

        if self.write_offset < self.bytes.len() {
            self.bytes[self.write_offset] = 0;
        } else {
            let last = self.bytes.len() - 1;
            self.bytes[last] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growable_add_data_grows() {
        let mut buf = Buffer::new();
        buf.add_data(b"hello").unwrap();
        assert_eq!(buf.as_slice(), b"hello");
        buf.add_data(b" world").unwrap();
        assert_eq!(buf.as_slice(), b"hello world");
    }

    #[test]
    fn fixed_add_data_fails_when_full() {
        let mut buf = Buffer::fixed(4);
        assert!(buf.add_data(b"abcd").is_ok());
        assert_eq!(
            buf.add_data(b"e"),
            Err(BufferError::ByteCapacityExhausted)
        );
    }

    #[test]
    fn clear_resets_offset_and_zeros() {
        let mut buf = Buffer::new();
        buf.add_data(b"abc").unwrap();
        buf.clear();
        assert_eq!(buf.write_offset(), 0);
        assert_eq!(buf.raw(), &[0, 0, 0]);
    }

    #[test]
    fn chunked_out_of_order_does_not_lose_high_water_mark() {
        let mut buf = Buffer::new();
        buf.add_chunked_data(1, b"second", 8).unwrap();
        buf.add_chunked_data(0, b"first!!!", 8).unwrap();

        assert_eq!(buf.write_offset(), 14);
        assert_eq!(&buf.raw()[0..8], b"first!!!");
        assert_eq!(&buf.raw()[8..14], b"second");
    }

    #[test]
    fn null_terminate_clobbers_last_byte_when_full() {
        let mut buf = Buffer::fixed(4);
        buf.add_data(b"abcd").unwrap();
        buf.null_terminate();
        assert_eq!(buf.raw(), b"abc\0");
    }
}
