//! Lexical cleanup before any rewriting
//!
//! Math shifts, comments and spacing commands disappear, and every sized or
//! escaped delimiter becomes a plain parenthesis. Absolute-value bars are the
//! only delimiters with meaning attached: `\left| ... \right|` and a pair of
//! bare bars both become `abs(...)`. The rewriter's placeholder mark is
//! dropped so input can never spell a placeholder.

use tracing::trace;

use super::engine::lexer::tokenize;
use super::engine::token::{Spanned, TexToken};
use super::functions::{command, Command, PLACEHOLDER_MARK};

/// What a delimiter after `\left` or `\right` opens or closes
fn sized_delimiter(token: &TexToken) -> Option<char> {
    match token {
        TexToken::Char(c) if "()[]|.".contains(*c) => Some(*c),
        TexToken::ControlSeq(name) if name == "{" || name == "}" => name.chars().next(),
        _ => None,
    }
}

fn next_significant(tokens: &[Spanned], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| !tokens[j].token.is_space())
}

/// Normalize a LaTeX math fragment.
///
/// Bare bars pair up left to right: odd bars open `(abs(` and even bars
/// close `))`. An unpaired final bar leaves its `(abs(` open.
pub fn normalize(input: &str) -> String {
    let tokens = tokenize(input.trim());
    let mut out = String::with_capacity(input.len());
    let mut seen_bars = 0usize;
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i].token {
            TexToken::MathShift | TexToken::Comment(_) => {}
            TexToken::Char(c) if *c == PLACEHOLDER_MARK => {}
            TexToken::Space | TexToken::ActiveChar(_) => out.push(' '),
            TexToken::ControlSeq(name) if name == "left" || name == "right" => {
                let delim = next_significant(&tokens, i + 1)
                    .and_then(|j| sized_delimiter(&tokens[j].token).map(|d| (j, d)));
                if let Some((j, d)) = delim {
                    match (name.as_str(), d) {
                        ("left", '|') => out.push_str("abs("),
                        ("left", _) => out.push('('),
                        _ => out.push(')'),
                    }
                    i = j;
                }
            }
            TexToken::ControlSeq(name) if name == "{" => out.push('('),
            TexToken::ControlSeq(name) if name == "}" => out.push(')'),
            TexToken::ControlSeq(name) if matches!(command(name), Some(Command::Spacing)) => {
                out.push(' ')
            }
            TexToken::ControlSeq(name) if name.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                // Keep the word intact even when letters follow directly
                out.push('\\');
                out.push_str(name);
            }
            TexToken::Char('|') => {
                seen_bars += 1;
                trace!(offset = tokens[i].offset, opens = seen_bars % 2 == 1, "bare bar");
                if seen_bars % 2 == 1 {
                    out.push_str("(abs(");
                } else {
                    out.push_str("))");
                }
            }
            other => out.push_str(&other.to_string()),
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_math_shift_and_comments() {
        assert_eq!(normalize("$x+y$"), "x+y");
        assert_eq!(normalize("x % note\n+y"), "x +y");
    }

    #[test]
    fn test_spacing_becomes_space() {
        assert_eq!(normalize(r"a\,b\quad c~d"), "a b  c d");
    }

    #[test]
    fn test_sized_delimiters() {
        assert_eq!(normalize(r"\left( x \right)"), "( x )");
        assert_eq!(normalize(r"\left[ x \right]"), "( x )");
        assert_eq!(normalize(r"\left\{ x \right\}"), "( x )");
        assert_eq!(normalize(r"\left. x \right|"), "( x )");
        assert_eq!(normalize(r"\left| x \right|"), "abs( x )");
    }

    #[test]
    fn test_bare_bars_pair_up() {
        assert_eq!(normalize("|x|+|y|"), "(abs(x))+(abs(y))");
        assert_eq!(normalize("|x|+|y"), "(abs(x))+(abs(y");
    }

    #[test]
    fn test_sized_bars_do_not_count_as_bare() {
        assert_eq!(normalize(r"\left|x\right| + |y|"), "abs(x) + (abs(y))");
    }

    #[test]
    fn test_leftarrow_is_not_left() {
        assert_eq!(normalize(r"\leftarrow x"), r"\leftarrow x");
    }

    #[test]
    fn test_placeholder_mark_is_dropped() {
        assert_eq!(normalize("\u{E000}sec x"), "sec x");
    }

    #[test]
    fn test_escaped_braces() {
        assert_eq!(normalize(r"\{a\}"), "(a)");
    }
}
