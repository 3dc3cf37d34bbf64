/*!
In-place editing of an already-parsed document.

Two families of operation live here:

- Direct removal (`remove_key_value`, `remove_array_index`) computes the
  byte span to delete, including one adjacent comma, and shifts the tail
  left over the hole with a single `memmove`-equivalent.
- Append-based editing (`insert_or_update_key_value`, `append_array_value`)
  relocates the buffer's tail into high-memory scratch space, writes the
  new content through an [`crate::emit::Emitter`] into the space that
  frees up, then moves the tail back next to whatever was written.

Both families finish by re-running the tokenizer over the whole buffer
and handing back a fresh, owned token array: per this crate's borrowing
rules, any `Token` obtained before a modification cannot be used after
one, so there's nothing to invalidate silently.

Grounded on `JsonModifier` in the original implementation: its
`removeKeyValue`/`removeArrayIndex` comma-discovery table,
`startModify`/`startAppend`/`finish`, and `findLeftComma`/`findRightComma`
(which, preserved here as-is, only skip ASCII spaces, not other
whitespace).
*/

use crate::buffer::Buffer;
use crate::emit::{Emitter, SliceSink, Value};
use crate::error::{ModifyError, NavigateError};
use crate::navigator;
use crate::token::{required_token_count, scan_into, Token, TokenKind};

/// A modification in flight: the tail has been relocated to scratch
/// space but `finish` hasn't run yet.
pub struct ActiveModification {
    start: usize,
    save_loc: usize,
    orig_after: usize,
}

fn with_quotes(tok: &Token) -> (usize, usize) {
    if tok.kind == TokenKind::String {
        (tok.start - 1, tok.end + 1)
    } else {
        (tok.start, tok.end)
    }
}

fn find_left_comma(bytes: &[u8], expanded_start: usize) -> Option<usize> {
    if expanded_start == 0 {
        return None;
    }
    let mut i = expanded_start - 1;
    loop {
        match bytes.get(i) {
            Some(b' ') => {
                if i == 0 {
                    return None;
                }
                i -= 1;
            }
            Some(b',') => return Some(i),
            _ => return None,
        }
    }
}

fn find_right_comma(bytes: &[u8], expanded_end: usize) -> Option<usize> {
    let mut i = expanded_end;
    loop {
        match bytes.get(i) {
            Some(b' ') => i += 1,
            Some(b',') => return Some(i),
            _ => return None,
        }
    }
}

/// The removal table from the in-place modifier's design note: given the
/// quote-expanded bounds of the thing being removed, and whichever
/// adjacent commas were found, decide the exact byte range to delete.
fn removal_region(bytes: &[u8], leading_start: usize, trailing_end: usize) -> (usize, usize) {
    let left = find_left_comma(bytes, leading_start);
    let right = find_right_comma(bytes, trailing_end);

    match (left, right) {
        (Some(_), Some(r)) => (leading_start, r + 1),
        (Some(l), None) => (l, trailing_end),
        (None, Some(r)) => (leading_start, r + 1),
        (None, None) => (leading_start, trailing_end),
    }
}

fn remove_region(buf: &mut Buffer, region_start: usize, region_end: usize) -> Result<Vec<Token>, ModifyError> {
    let tail_len = buf.write_offset() - region_end;
    buf.raw_mut().copy_within(region_end..region_end + tail_len, region_start);
    buf.set_offset(region_start + tail_len);

    reparse(buf)
}

fn reparse(buf: &mut Buffer) -> Result<Vec<Token>, ModifyError> {
    let input = buf.as_slice();
    let needed = required_token_count(input)?;
    let mut tokens = vec![Token::default(); needed];
    let n = scan_into(input, &mut tokens)?;
    tokens.truncate(n);
    Ok(tokens)
}

/// Remove a key/value pair from `container`, including one adjacent
/// comma so the result stays valid JSON.
pub fn remove_key_value(
    buf: &mut Buffer,
    tokens: &[Token],
    container: usize,
    key: &str,
) -> Result<Vec<Token>, ModifyError> {
    let value_idx = navigator::value_by_key(buf.as_slice(), tokens, container, key)?;
    let key_idx = value_idx - 1;

    let (k_start, _k_end) = with_quotes(&tokens[key_idx]);
    let (_v_start, v_end) = with_quotes(&tokens[value_idx]);

    let (region_start, region_end) = removal_region(buf.as_slice(), k_start, v_end);
    remove_region(buf, region_start, region_end)
}

/// Remove the `index`-th element of an array container.
pub fn remove_array_index(
    buf: &mut Buffer,
    tokens: &[Token],
    container: usize,
    index: usize,
) -> Result<Vec<Token>, ModifyError> {
    let value_idx = navigator::value_by_index(tokens, container, index)?;
    let (start, end) = with_quotes(&tokens[value_idx]);

    let (region_start, region_end) = removal_region(buf.as_slice(), start, end);
    remove_region(buf, region_start, region_end)
}

/// Begin modifying an existing token's content in place: relocates the
/// buffer's tail to scratch space and returns a handle for writing the
/// replacement through an `Emitter` into `[start(), save_loc())`.
pub fn start_modify(buf: &mut Buffer, token: &Token) -> Result<ActiveModification, ModifyError> {
    begin(buf, token.start, token.end)
}

/// Begin appending a new entry to a container: like [`start_modify`] but
/// positions the write just before the container's closing bracket.
/// Returns the handle and whether the container was empty (so the
/// caller knows whether the first write needs a leading comma).
pub fn start_append(
    buf: &mut Buffer,
    container: &Token,
) -> Result<(ActiveModification, bool), ModifyError> {
    let is_empty = container.entry_count() == 0;
    let modification = begin(buf, container.end - 1, container.end)?;
    Ok((modification, is_empty))
}

/// Scratch space carved out beyond `start` when a growable buffer has no
/// spare capacity at all (e.g. a freshly-`add_data`'d document). A fixed
/// buffer never gets this treatment: its capacity is the caller's choice
/// to honor or report as exhausted, the way the original implementation's
/// caller-owned `char[N]` always did.
const MIN_SCRATCH_MARGIN: usize = 64;

/// Relocate the buffer's tail to scratch space, growing the backing
/// allocation first if it's not fixed and has no room for the scratch
/// window. Growable buffers have no analogue in the original
/// implementation (which only ever wraps a fixed caller buffer), so this
/// growth step is new: without it, `start_append`/`start_modify` would
/// spuriously fail on any growable buffer with no pre-reserved slack.
fn begin(buf: &mut Buffer, start: usize, end: usize) -> Result<ActiveModification, ModifyError> {
    let orig_after = buf.write_offset() - end;
    let mut save_loc = buf.capacity().saturating_sub(orig_after);

    if save_loc < start {
        if buf.is_fixed() {
            return Err(ModifyError::EmitterTruncated);
        }
        let margin = (start - save_loc) + MIN_SCRATCH_MARGIN;
        buf.allocate(buf.capacity() + margin)
            .map_err(|_| ModifyError::EmitterTruncated)?;
        save_loc = buf.capacity() - orig_after;
    }

    if orig_after > 0 {
        buf.raw_mut().copy_within(end..end + orig_after, save_loc);
    }

    Ok(ActiveModification {
        start,
        save_loc,
        orig_after,
    })
}

/// Grow a non-fixed buffer's scratch window and re-run `begin`, for when
/// the emitter ran out of room mid-write rather than up front (the
/// up-front margin in `begin` was too small for what was actually
/// written). Errors out immediately for fixed buffers, whose capacity
/// the caller chose deliberately.
fn regrow_and_retry(
    buf: &mut Buffer,
    modification: ActiveModification,
) -> Result<ActiveModification, ModifyError> {
    if buf.is_fixed() {
        return Err(ModifyError::EmitterTruncated);
    }

    let ActiveModification {
        start,
        save_loc,
        orig_after,
    } = modification;

    let window = save_loc - start;
    let new_len = buf.capacity() + window.max(MIN_SCRATCH_MARGIN) + MIN_SCRATCH_MARGIN;
    buf.allocate(new_len)
        .map_err(|_| ModifyError::EmitterTruncated)?;

    // `write_offset` is untouched until `finish`, so it still reflects the
    // same `end` originally passed to `begin`.
    let end = buf.write_offset() - orig_after;
    begin(buf, start, end)
}

/// An `Emitter` writing into the active modification's scratch window.
pub fn emitter<'b>(buf: &'b mut Buffer, modification: &ActiveModification) -> Emitter<SliceSink<'b>> {
    Emitter::into_slice(&mut buf.raw_mut()[modification.start..modification.save_loc])
}

/// Complete a modification: move the relocated tail next to whatever was
/// written, fix up the write offset, and re-parse the whole buffer.
pub fn finish(
    buf: &mut Buffer,
    modification: ActiveModification,
    written: usize,
) -> Result<Vec<Token>, ModifyError> {
    let ActiveModification {
        start,
        save_loc,
        orig_after,
    } = modification;

    if orig_after > 0 {
        buf.raw_mut()
            .copy_within(save_loc..save_loc + orig_after, start + written);
    }
    buf.set_offset(start + written + orig_after);

    reparse(buf)
}

/// Write through `insert` into the container's append window, regrowing a
/// non-fixed buffer and retrying if the first attempt's scratch window
/// turns out to be too small for what `insert` actually wrote.
fn append_with_retry(
    buf: &mut Buffer,
    container_tok: Token,
    mut insert: impl FnMut(&mut Emitter<SliceSink<'_>>),
) -> Result<(ActiveModification, usize), ModifyError> {
    let (mut modification, is_empty) = start_append(buf, &container_tok)?;

    loop {
        let outcome = {
            let mut e = emitter(buf, &modification);
            if !is_empty {
                e.set_is_first(false);
            }
            insert(&mut e);
            if e.is_truncated() {
                None
            } else {
                Some(e.written())
            }
        };

        match outcome {
            Some(written) => return Ok((modification, written)),
            None => modification = regrow_and_retry(buf, modification)?,
        }
    }
}

fn append_key_value(
    buf: &mut Buffer,
    tokens: &[Token],
    container: usize,
    key: &str,
    value: Value<'_>,
) -> Result<Vec<Token>, ModifyError> {
    let container_tok = tokens[container];
    let (modification, written) =
        append_with_retry(buf, container_tok, |e| e.insert_key_value(key, value))?;
    finish(buf, modification, written)
}

/// Insert `key: value` into `container`, or, if `key` is already present,
/// remove it and append the new pair at the end.
///
/// A true in-place type change (e.g. replacing a string with a number)
/// would need span growth with ambiguous re-parse semantics; remove-then
/// -append sidesteps that at the cost of reordering the updated key to
/// the end of the container.
pub fn insert_or_update_key_value(
    buf: &mut Buffer,
    tokens: &[Token],
    container: usize,
    key: &str,
    value: Value<'_>,
) -> Result<Vec<Token>, ModifyError> {
    let current = match navigator::value_by_key(buf.as_slice(), tokens, container, key) {
        Ok(_) => remove_key_value(buf, tokens, container, key)?,
        Err(NavigateError::KeyAbsent) => tokens.to_vec(),
        Err(e) => return Err(e.into()),
    };

    append_key_value(buf, &current, container, key, value)
}

/// Append `value` as a new element of array `container`.
pub fn append_array_value(
    buf: &mut Buffer,
    tokens: &[Token],
    container: usize,
    value: Value<'_>,
) -> Result<Vec<Token>, ModifyError> {
    let container_tok = tokens[container];
    let (modification, written) =
        append_with_retry(buf, container_tok, |e| e.insert_array_value(value))?;
    finish(buf, modification, written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::{outer_array, outer_object};

    fn parse(input: &[u8]) -> (Buffer, Vec<Token>) {
        let mut buf = Buffer::with_capacity(input.len() + 256);
        buf.add_data(input).unwrap();
        let tokens = reparse(&mut buf).unwrap();
        (buf, tokens)
    }

    #[test]
    fn sequential_key_removal_matches_expected_intermediate_buffers() {
        let (mut buf, mut tokens) = parse(br#"{"a":1,"b":"x","c":3}"#);

        let root = outer_object(&tokens).unwrap();
        tokens = remove_key_value(&mut buf, &tokens, root, "a").unwrap();
        assert_eq!(buf.as_slice(), br#"{"b":"x","c":3}"#);

        let root = outer_object(&tokens).unwrap();
        tokens = remove_key_value(&mut buf, &tokens, root, "c").unwrap();
        assert_eq!(buf.as_slice(), br#"{"b":"x"}"#);

        let root = outer_object(&tokens).unwrap();
        let tokens = remove_key_value(&mut buf, &tokens, root, "b").unwrap();
        assert_eq!(buf.as_slice(), br#"{}"#);
        let root = outer_object(&tokens).unwrap();
        assert_eq!(tokens[root].entry_count(), 0);
    }

    #[test]
    fn insert_or_update_reorders_updated_key_to_the_end() {
        let (mut buf, tokens) = parse(br#"{}"#);
        let root = outer_object(&tokens).unwrap();

        let tokens =
            insert_or_update_key_value(&mut buf, &tokens, root, "a", Value::Int(1)).unwrap();
        let root = outer_object(&tokens).unwrap();
        let tokens =
            insert_or_update_key_value(&mut buf, &tokens, root, "b", Value::Str(b"x")).unwrap();
        let root = outer_object(&tokens).unwrap();
        let _tokens =
            insert_or_update_key_value(&mut buf, &tokens, root, "a", Value::Int(999)).unwrap();

        assert_eq!(buf.as_slice(), br#"{"b":"x","a":999}"#);
    }

    #[test]
    fn append_array_value_to_nonempty_array() {
        let (mut buf, tokens) = parse(br#"{"xs":[1,2]}"#);
        let root = outer_object(&tokens).unwrap();
        let xs = navigator::value_by_key(buf.as_slice(), &tokens, root, "xs").unwrap();

        let _tokens = append_array_value(&mut buf, &tokens, xs, Value::Int(3)).unwrap();
        assert_eq!(buf.as_slice(), br#"{"xs":[1,2,3]}"#);
    }

    #[test]
    fn append_array_value_to_empty_array() {
        let (mut buf, tokens) = parse(br#"[]"#);
        let root = outer_array(&tokens).unwrap();
        let _tokens = append_array_value(&mut buf, &tokens, root, Value::Int(1)).unwrap();
        assert_eq!(buf.as_slice(), br#"[1]"#);
    }

    #[test]
    fn remove_array_index_from_middle() {
        let (mut buf, tokens) = parse(br#"[1,2,3]"#);
        let root = outer_array(&tokens).unwrap();
        let _tokens = remove_array_index(&mut buf, &tokens, root, 1).unwrap();
        assert_eq!(buf.as_slice(), br#"[1,3]"#);
    }
}
