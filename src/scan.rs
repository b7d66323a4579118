//! Balanced-delimiter scanning utilities.
//!
//! Nested structures (model bodies, JSX expressions, handler bodies) cannot
//! be extracted with a non-greedy regex because their bodies contain the
//! closing delimiter themselves. Every such extraction in this crate goes
//! through the depth-counter scans here, which are aware of string
//! literals, template literals and escape sequences.

/// Find the matching close delimiter for the one at `open_at` (a byte
/// index). Returns the byte index just past the matching close, or `None`
/// if the input ends while still nested.
pub fn find_balanced_end(src: &str, open_at: usize, open: char, close: char) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut in_template = false;
    let mut template_brace_depth: i32 = 0;
    let mut skip_next = false;

    let mut iter = src[open_at..].char_indices();
    while let Some((off, c)) = iter.next() {
        let pos = open_at + off;

        if skip_next {
            skip_next = false;
            continue;
        }
        if c == '\\' {
            skip_next = true;
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }

        if in_template {
            if c == '`' && template_brace_depth == 0 {
                in_template = false;
            } else if c == '$' && src[pos + c.len_utf8()..].starts_with('{') {
                template_brace_depth += 1;
                iter.next();
            } else if c == '}' && template_brace_depth > 0 {
                template_brace_depth -= 1;
            }
            continue;
        }

        if c == '"' || c == '\'' {
            in_string = Some(c);
            continue;
        }
        if c == '`' {
            in_template = true;
            continue;
        }

        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(pos + c.len_utf8());
            }
        }
    }

    None
}

/// Extract the text between a delimiter at `open_at` and its matching
/// close, exclusive of both delimiters.
pub fn extract_delimited(src: &str, open_at: usize, open: char, close: char) -> Option<&str> {
    let end = find_balanced_end(src, open_at, open, close)?;
    Some(&src[open_at + open.len_utf8()..end - close.len_utf8()])
}

/// Split `src` on `sep` at nesting depth zero, ignoring separators inside
/// `()`, `[]`, `{}` and string/template literals. Used for splitting
/// parameter lists and dependency arrays.
pub fn split_top_level(src: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut skip_next = false;
    let mut start = 0;

    for (pos, c) in src.char_indices() {
        if skip_next {
            skip_next = false;
            continue;
        }
        if c == '\\' {
            skip_next = true;
            continue;
        }
        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if c == sep && depth == 0 => {
                parts.push(&src[start..pos]);
                start = pos + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&src[start..]);
    parts
}

/// Locate the first `{ ... }` block at or after `from`, e.g. the body
/// following `model Task`. Returns the inner text and the byte offset just
/// past the closing brace.
pub fn extract_braced_block(src: &str, from: usize) -> Option<(&str, usize)> {
    let brace_at = from + src[from..].find('{')?;
    let end = find_balanced_end(src, brace_at, '{', '}')?;
    Some((&src[brace_at + 1..end - 1], end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_balanced_simple() {
        assert_eq!(find_balanced_end("{hello}", 0, '{', '}'), Some(7));
        assert_eq!(find_balanced_end("{a + b}", 0, '{', '}'), Some(7));
        assert_eq!(find_balanced_end("{a {b} c}", 0, '{', '}'), Some(9));
    }

    #[test]
    fn test_find_balanced_inside_string() {
        assert_eq!(
            find_balanced_end("{'string with { brace'}", 0, '{', '}'),
            Some(23)
        );
        assert_eq!(find_balanced_end("{`tpl ${a}`}", 0, '{', '}'), Some(12));
    }

    #[test]
    fn test_unbalanced_returns_none() {
        assert_eq!(find_balanced_end("{a {b}", 0, '{', '}'), None);
    }

    #[test]
    fn test_nested_attribute_payload() {
        // A model body with a nested object in a default() payload must not
        // truncate at the first inner close brace.
        let src = "model M { a String @default(fn(x: {y: 1})) }";
        let open_at = src.find('{').unwrap();
        let end = find_balanced_end(src, open_at, '{', '}').unwrap();
        assert_eq!(end, src.len());
        let body = extract_delimited(src, open_at, '{', '}').unwrap();
        assert!(body.contains("@default(fn(x: {y: 1}))"));
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, b, c", ','), vec!["a", " b", " c"]);
        assert_eq!(
            split_top_level("a, f(x, y), [1, 2]", ','),
            vec!["a", " f(x, y)", " [1, 2]"]
        );
        assert_eq!(split_top_level("'a,b', c", ','), vec!["'a,b'", " c"]);
    }

    #[test]
    fn test_extract_braced_block() {
        let src = "enum Role { ADMIN USER } trailing";
        let (body, end) = extract_braced_block(src, 0).unwrap();
        assert_eq!(body.trim(), "ADMIN USER");
        assert_eq!(&src[end..], " trailing");
    }
}
