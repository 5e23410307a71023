//! Balanced-delimiter scanning over partially rewritten text
//!
//! The rewriter works on strings, not token lists, because each stage splices
//! its replacement back into the text. These helpers find argument extents by
//! counting nesting depth instead of pattern matching, so groups may nest to
//! any depth.

use std::ops::Range;

/// Characters that can never start a macro argument.
const NOT_AN_ARGUMENT: &[char] = &['}', ')', ']', '^', '_', '&'];

/// A macro argument located in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Byte range of the argument text, braces excluded
    pub inner: Range<usize>,
    /// Byte index just past the argument (past the closing brace if braced)
    pub end: usize,
    /// Whether the argument was written as a `{...}` group
    pub braced: bool,
}

impl Argument {
    /// The argument text, braces excluded
    pub fn text<'a>(&self, s: &'a str) -> &'a str {
        &s[self.inner.clone()]
    }
}

/// Index of the first non-whitespace byte at or after `i`
pub fn skip_ws(s: &str, mut i: usize) -> usize {
    let bytes = s.as_bytes();
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Index just past the last non-whitespace byte before `i`
pub fn skip_ws_back(s: &str, mut i: usize) -> usize {
    let bytes = s.as_bytes();
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    i
}

/// Closing counterpart of an opening delimiter
pub fn closing_for(open: u8) -> Option<u8> {
    match open {
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        _ => None,
    }
}

/// Find the index of the delimiter closing the one at `open`.
///
/// Only delimiters of the same family are counted; escaped `\{`/`\}` are
/// skipped. Returns `None` when the depth never returns to zero.
pub fn find_matching(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let open_ch = *bytes.get(open)?;
    let close_ch = closing_for(open_ch)?;
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            i += 2;
            continue;
        }
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Length in bytes of the control sequence starting at `i` (which must be `\`).
pub fn control_seq_len(s: &str, i: usize) -> Option<usize> {
    let rest = s.get(i..)?.strip_prefix('\\')?;
    let letters = rest.bytes().take_while(|b| b.is_ascii_alphabetic()).count();
    if letters > 0 {
        Some(1 + letters)
    } else {
        rest.chars().next().map(|c| 1 + c.len_utf8())
    }
}

/// Read a single macro argument (braced group or single token) at or after `i`
pub fn read_argument(s: &str, i: usize) -> Option<Argument> {
    let start = skip_ws(s, i);
    let c = s.get(start..)?.chars().next()?;
    match c {
        '{' => {
            let close = find_matching(s, start)?;
            Some(Argument {
                inner: start + 1..close,
                end: close + 1,
                braced: true,
            })
        }
        '\\' => {
            let len = control_seq_len(s, start)?;
            Some(Argument {
                inner: start..start + len,
                end: start + len,
                braced: false,
            })
        }
        c if NOT_AN_ARGUMENT.contains(&c) => None,
        c => Some(Argument {
            inner: start..start + c.len_utf8(),
            end: start + c.len_utf8(),
            braced: false,
        }),
    }
}

/// Read an optional `[...]` argument at or after `i`
pub fn read_optional(s: &str, i: usize) -> Option<Argument> {
    let start = skip_ws(s, i);
    if s.as_bytes().get(start) != Some(&b'[') {
        return None;
    }
    let close = find_matching(s, start)?;
    Some(Argument {
        inner: start + 1..close,
        end: close + 1,
        braced: true,
    })
}

/// True when the whole text is one parenthesized group: `(a+b)` but not `(a)+(b)`
pub fn is_enclosed(s: &str) -> bool {
    let t = s.trim();
    t.starts_with('(') && find_matching(t, 0) == Some(t.len() - 1)
}

/// Parenthesize unless the text is already one enclosed group
pub fn wrap(s: &str) -> String {
    let t = s.trim();
    if is_enclosed(t) {
        t.to_string()
    } else {
        format!("({})", t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matching_nested() {
        let s = "{a{b{c}}d}e";
        assert_eq!(find_matching(s, 0), Some(9));
        assert_eq!(find_matching(s, 2), Some(7));
        assert_eq!(find_matching("{a{b}", 0), None);
    }

    #[test]
    fn test_find_matching_ignores_escaped_braces() {
        assert_eq!(find_matching(r"{\{a}", 0), Some(4));
    }

    #[test]
    fn test_read_argument_forms() {
        let s = r"\frac{a+b} 2";
        let a = read_argument(s, 5).expect("braced");
        assert_eq!(a.text(s), "a+b");
        assert!(a.braced);
        let b = read_argument(s, a.end).expect("single char");
        assert_eq!(b.text(s), "2");
        assert_eq!(b.end, s.len());

        let s = r"\frac\pi2";
        let a = read_argument(s, 5).expect("control word");
        assert_eq!(a.text(s), r"\pi");
    }

    #[test]
    fn test_read_argument_rejects_closers() {
        assert_eq!(read_argument("}", 0), None);
        assert_eq!(read_argument("   ", 0), None);
        assert_eq!(read_argument("{unclosed", 0), None);
    }

    #[test]
    fn test_read_optional() {
        let s = "[3]{x}";
        let opt = read_optional(s, 0).expect("optional");
        assert_eq!(opt.text(s), "3");
        assert_eq!(opt.end, 3);
        assert_eq!(read_optional("{x}", 0), None);
    }

    #[test]
    fn test_enclosed_and_wrap() {
        assert!(is_enclosed("((a)/(b))"));
        assert!(!is_enclosed("(a)+(b)"));
        assert!(!is_enclosed("a"));
        assert_eq!(wrap("((a)/(b))"), "((a)/(b))");
        assert_eq!(wrap("x+1"), "(x+1)");
        assert_eq!(wrap(" c "), "(c)");
    }

    #[test]
    fn test_control_seq_len() {
        assert_eq!(control_seq_len(r"\sin x", 0), Some(4));
        assert_eq!(control_seq_len(r"\,x", 0), Some(2));
        assert_eq!(control_seq_len("x", 0), None);
    }
}
