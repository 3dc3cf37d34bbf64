/*!
Read-only traversal over a scanned token array.

None of these functions allocate or hold a reference past their return;
everything is expressed as indices into the caller's `tokens` slice plus
the original source bytes. Grounded on the sibling-skip traversal in the
original implementation's `JsonParser` navigator methods
(`skipObject`, `getTokenByIndex`, `getKeyValueTokenByIndex`,
`getValueTokenByKey`, `getValueTokenByColRow`).
*/

use crate::error::NavigateError;
use crate::token::{Token, TokenKind};

/// The index one past `idx`'s entire subtree: the next token, if any,
/// whose span doesn't fall inside `tokens[idx]`.
///
/// Tokens are stored pre-order, so a token's descendants are exactly the
/// contiguous run following it whose `end` doesn't exceed its own `end`.
pub fn skip(tokens: &[Token], idx: usize) -> usize {
    let container_end = tokens[idx].end;
    let mut next = idx + 1;
    while next < tokens.len() && tokens[next].end <= container_end {
        next += 1;
    }
    next
}

/// The root token, if the document's outer value is an object.
pub fn outer_object(tokens: &[Token]) -> Option<usize> {
    match tokens.first() {
        Some(t) if t.kind == TokenKind::Object => Some(0),
        _ => None,
    }
}

/// The root token, if the document's outer value is an array.
pub fn outer_array(tokens: &[Token]) -> Option<usize> {
    match tokens.first() {
        Some(t) if t.kind == TokenKind::Array => Some(0),
        _ => None,
    }
}

/// The root token, whatever kind it is.
pub fn outer_token(tokens: &[Token]) -> Option<usize> {
    if tokens.is_empty() {
        None
    } else {
        Some(0)
    }
}

/// Number of direct elements in an array container.
pub fn array_size(tokens: &[Token], container: usize) -> usize {
    tokens[container].entry_count()
}

/// The `index`-th direct child of an array (or the `index`-th raw child
/// of an object, i.e. counting keys and values together).
pub fn value_by_index(
    tokens: &[Token],
    container: usize,
    index: usize,
) -> Result<usize, NavigateError> {
    let mut cur = container + 1;
    let mut remaining = index;

    while remaining > 0 {
        if cur >= tokens.len() || tokens[cur].start >= tokens[container].end {
            return Err(NavigateError::IndexOutOfRange);
        }
        cur = skip(tokens, cur);
        remaining -= 1;
    }

    if cur >= tokens.len() || tokens[cur].start >= tokens[container].end {
        return Err(NavigateError::IndexOutOfRange);
    }

    Ok(cur)
}

/// The `index`-th key/value pair of an object container.
pub fn key_value_by_index(
    tokens: &[Token],
    container: usize,
    index: usize,
) -> Result<(usize, usize), NavigateError> {
    let mut cur = container + 1;
    let mut remaining = index;

    while remaining > 0 {
        if cur >= tokens.len() || tokens[cur].start >= tokens[container].end {
            return Err(NavigateError::IndexOutOfRange);
        }
        let key_end = skip(tokens, cur);
        if key_end >= tokens.len() {
            return Err(NavigateError::IndexOutOfRange);
        }
        cur = skip(tokens, key_end);
        remaining -= 1;
    }

    if cur >= tokens.len() || tokens[cur].start >= tokens[container].end {
        return Err(NavigateError::IndexOutOfRange);
    }
    let key_idx = cur;
    let value_idx = skip(tokens, key_idx);
    if value_idx >= tokens.len() {
        return Err(NavigateError::IndexOutOfRange);
    }

    Ok((key_idx, value_idx))
}

/// The value token paired with a matching key, linear-scanning the
/// object's entries and comparing each key's *decoded* contents (escapes
/// included) against `key`.
pub fn value_by_key(
    input: &[u8],
    tokens: &[Token],
    container: usize,
    key: &str,
) -> Result<usize, NavigateError> {
    let want = key.as_bytes();
    let mut index = 0;

    loop {
        let (key_idx, value_idx) = match key_value_by_index(tokens, container, index) {
            Ok(pair) => pair,
            Err(_) => return Err(NavigateError::KeyAbsent),
        };

        if key_matches(input, &tokens[key_idx], want) {
            return Ok(value_idx);
        }

        index += 1;
    }
}

/// `value_by_index(value_by_index(tokens, container, col), row)`: the
/// `row`-th element of the `col`-th element, for a 2D array-of-arrays.
pub fn value_by_col_row(
    tokens: &[Token],
    container: usize,
    col: usize,
    row: usize,
) -> Result<usize, NavigateError> {
    let column = value_by_index(tokens, container, col)?;
    value_by_index(tokens, column, row)
}

/// Decode a key token's escapes on the fly and compare against `want`,
/// without allocating. A truncated comparison (more decoded bytes than
/// `want` has) never matches.
fn key_matches(input: &[u8], tok: &Token, want: &[u8]) -> bool {
    let span = &input[tok.start..tok.end];
    let mut i = 0;
    let mut wi = 0;

    while i < span.len() {
        let b = span[i];

        if b != b'\\' {
            if wi >= want.len() || want[wi] != b {
                return false;
            }
            wi += 1;
            i += 1;
            continue;
        }

        if i + 1 >= span.len() {
            return false;
        }
        let esc = span[i + 1];
        let literal = match esc {
            b'"' => Some(b'"'),
            b'\\' => Some(b'\\'),
            b'/' => Some(b'/'),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            _ => None,
        };

        if let Some(byte) = literal {
            if wi >= want.len() || want[wi] != byte {
                return false;
            }
            wi += 1;
            i += 2;
            continue;
        }

        if esc == b'u' {
            if i + 6 > span.len() {
                return false;
            }
            let hex = std::str::from_utf8(&span[i + 2..i + 6]).ok();
            let code = hex.and_then(|h| u16::from_str_radix(h, 16).ok());
            let code = match code {
                Some(c) => c,
                None => return false,
            };

            let mut buf = [0u8; 3];
            let len = crate::extract::encode_utf8_from_utf16(code, &mut buf);
            for &byte in &buf[..len] {
                if wi >= want.len() || want[wi] != byte {
                    return false;
                }
                wi += 1;
            }
            i += 6;
            continue;
        }

        // Unrecognized escape: the literal byte passes through, matching
        // the extractor's own tolerant behavior for unknown sequences.
        if wi >= want.len() || want[wi] != esc {
            return false;
        }
        wi += 1;
        i += 2;
    }

    wi == want.len()
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
    fn value_by_index_walks_array_siblings() {
        let input = br#"[10,20,30]"#;
        let tokens = scan(input);
        let root = outer_array(&tokens).unwrap();
        assert_eq!(array_size(&tokens, root), 3);
        let second = value_by_index(&tokens, root, 1).unwrap();
        assert_eq!(&input[tokens[second].start..tokens[second].end], b"20");
    }

    #[test]
    fn value_by_key_finds_match_after_escaped_keys() {
        let input = br#"{"a\"b":1,"target":42}"#;
        let tokens = scan(input);
        let root = outer_object(&tokens).unwrap();
        let v = value_by_key(input, &tokens, root, "target").unwrap();
        assert_eq!(&input[tokens[v].start..tokens[v].end], b"42");
    }

    #[test]
    fn value_by_key_missing_is_key_absent() {
        let input = br#"{"a":1}"#;
        let tokens = scan(input);
        let root = outer_object(&tokens).unwrap();
        assert_eq!(
            value_by_key(input, &tokens, root, "missing"),
            Err(NavigateError::KeyAbsent)
        );
    }

    #[test]
    fn value_by_col_row_indexes_nested_arrays() {
        let input = br#"[[1,2,3],[4,5,6]]"#;
        let tokens = scan(input);
        let root = outer_array(&tokens).unwrap();
        let v = value_by_col_row(&tokens, root, 1, 2).unwrap();
        assert_eq!(&input[tokens[v].start..tokens[v].end], b"6");
    }

    #[test]
    fn key_value_by_index_pairs_keys_with_values() {
        let input = br#"{"a":1,"b":2}"#;
        let tokens = scan(input);
        let root = outer_object(&tokens).unwrap();
        let (k, v) = key_value_by_index(&tokens, root, 1).unwrap();
        assert_eq!(&input[tokens[k].start..tokens[k].end], b"b");
        assert_eq!(&input[tokens[v].start..tokens[v].end], b"2");
    }
}
