//! LaTeX math lexer
//!
//! Converts a LaTeX math string into a stream of [`Spanned`] tokens:
//! - Control words (`\frac`) and control symbols (`\,`, `\{`)
//! - Group delimiters, scripts, math shifts
//! - Comments (`%` to end of line)
//!
//! Unlike TeX proper, spaces after control words are kept as [`TexToken::Space`]
//! so that re-rendering tokens never fuses a control word with the letters after it.

use super::token::{Spanned, TexToken};

/// The lexer that converts source text to offset-tagged tokens
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    /// Peek at the next character without consuming it
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    /// Consume and return the next character
    fn next_char(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    /// Current byte position (input length at end of input)
    fn position(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len())
    }

    /// Read a control sequence name (letters only, or single non-letter)
    fn read_control_seq(&mut self) -> String {
        let mut name = String::new();

        if let Some(c) = self.peek_char() {
            if c.is_ascii_alphabetic() {
                while let Some(c) = self.peek_char() {
                    if c.is_ascii_alphabetic() {
                        name.push(c);
                        self.next_char();
                    } else {
                        break;
                    }
                }
            } else {
                // Single non-letter control sequence like \, \{ \}
                name.push(c);
                self.next_char();
            }
        }

        name
    }

    /// Read a comment (everything until end of line, newline consumed)
    fn read_comment(&mut self) -> String {
        let mut comment = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' || c == '\r' {
                break;
            }
            comment.push(c);
            self.next_char();
        }
        if let Some('\r') = self.peek_char() {
            self.next_char();
        }
        if let Some('\n') = self.peek_char() {
            self.next_char();
        }
        comment
    }

    /// Read the next token
    fn next_token(&mut self) -> Option<Spanned> {
        let offset = self.position();
        let c = self.next_char()?;

        let token = match c {
            '\\' => {
                let name = self.read_control_seq();
                if name.is_empty() {
                    // Lone backslash at end of input
                    TexToken::Char('\\')
                } else {
                    TexToken::ControlSeq(name)
                }
            }
            '{' => TexToken::BeginGroup,
            '}' => TexToken::EndGroup,
            '%' => TexToken::Comment(self.read_comment()),
            '$' => TexToken::MathShift,
            '^' => TexToken::Superscript,
            '_' => TexToken::Subscript,
            '~' => TexToken::ActiveChar('~'),
            c if c.is_whitespace() => {
                while let Some(next) = self.peek_char() {
                    if next.is_whitespace() {
                        self.next_char();
                    } else {
                        break;
                    }
                }
                TexToken::Space
            }
            _ => TexToken::Char(c),
        };

        Some(Spanned::new(offset, token))
    }

    /// Tokenize the entire input
    pub fn tokenize(self) -> Vec<Spanned> {
        self.collect()
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Spanned;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience function to tokenize a string
pub fn tokenize(input: &str) -> Vec<Spanned> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TexToken> {
        tokenize(input).into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn test_simple_tokenize() {
        let tokens = kinds("xy");
        assert_eq!(tokens, vec![TexToken::Char('x'), TexToken::Char('y')]);
    }

    #[test]
    fn test_control_sequence() {
        let tokens = kinds("\\frac{a}{b}");
        assert_eq!(tokens[0], TexToken::ControlSeq("frac".into()));
        assert_eq!(tokens[1], TexToken::BeginGroup);
        assert_eq!(tokens[2], TexToken::Char('a'));
        assert_eq!(tokens[3], TexToken::EndGroup);
    }

    #[test]
    fn test_space_after_control_word_is_kept() {
        let tokens = kinds("\\pi r");
        assert_eq!(
            tokens,
            vec![
                TexToken::ControlSeq("pi".into()),
                TexToken::Space,
                TexToken::Char('r')
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("a \\sin^2");
        let offsets: Vec<usize> = tokens.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 6, 7]);
    }

    #[test]
    fn test_control_symbols() {
        let tokens = kinds("\\, \\{");
        assert_eq!(tokens[0], TexToken::ControlSeq(",".into()));
        assert_eq!(tokens[1], TexToken::Space);
        assert_eq!(tokens[2], TexToken::ControlSeq("{".into()));
    }

    #[test]
    fn test_comment() {
        let tokens = kinds("a%comment\nb");
        assert_eq!(tokens[0], TexToken::Char('a'));
        assert_eq!(tokens[1], TexToken::Comment("comment".into()));
        assert_eq!(tokens[2], TexToken::Char('b'));
    }

    #[test]
    fn test_display_reproduces_source() {
        let input = "\\frac{a^2}{b_1} + \\sqrt[3]{x}";
        let output: String = tokenize(input).iter().map(|s| s.token.to_string()).collect();
        assert_eq!(output, input);
    }

    #[test]
    fn test_lone_backslash() {
        assert_eq!(kinds("x\\"), vec![TexToken::Char('x'), TexToken::Char('\\')]);
    }
}
