/*!
Reassembly of a multipart payload delivered as a series of named chunks.

Grounded on `JsonBuffer::addChunkedData` in the original implementation,
which split an event name like `config/3` on its last `/` and used the
trailing decimal as the chunk's ordinal. The original's own comment on
why it doesn't clear the buffer when chunk 0 arrives is worth repeating
verbatim in spirit: an out-of-order chunk 1 arriving before chunk 0 must
not be discarded just because 0 looks like a fresh start. Clearing is
the caller's job, done once after a full document has parsed.
*/

use crate::buffer::Buffer;
use crate::error::BufferError;

/// Parse the trailing `/<decimal>` ordinal off an event name.
///
/// Returns `None` if the name has no `/`, or the suffix after the last
/// `/` isn't a plain base-10 integer.
pub fn chunk_index(event_name: &str) -> Option<usize> {
    let slash = event_name.rfind('/')?;
    event_name[slash + 1..].parse().ok()
}

/// Parse the ordinal out of `event_name` and place `payload` into `buf`
/// at `index * chunk_size`.
///
/// `buf`'s write offset only ever grows, so chunks may arrive in any
/// order without losing data written by a higher-numbered chunk that
/// happened to show up first.
pub fn add_chunk(
    buf: &mut Buffer,
    event_name: &str,
    payload: &[u8],
    chunk_size: usize,
) -> Result<(), BufferError> {
    let index = chunk_index(event_name).unwrap_or(0);
    buf.add_chunked_data(index, payload, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trailing_ordinal() {
        assert_eq!(chunk_index("config/3"), Some(3));
        assert_eq!(chunk_index("a/b/12"), Some(12));
    }

    #[test]
    fn no_slash_is_none() {
        assert_eq!(chunk_index("config"), None);
    }

    #[test]
    fn non_numeric_suffix_is_none() {
        assert_eq!(chunk_index("config/final"), None);
    }

    #[test]
    fn out_of_order_chunks_reassemble() {
        let mut buf = Buffer::new();
        add_chunk(&mut buf, "doc/1", b"World!!!", 8).unwrap();
        add_chunk(&mut buf, "doc/0", b"Hello, ", 8).unwrap();
        assert_eq!(&buf.as_slice()[0..7], b"Hello, ");
        assert_eq!(&buf.as_slice()[8..16], b"World!!!");
    }

    #[test]
    fn unnumbered_event_name_lands_at_index_zero() {
        let mut buf = Buffer::new();
        add_chunk(&mut buf, "single", b"whole document", 4096).unwrap();
        assert_eq!(buf.as_slice(), b"whole document");
    }
}
