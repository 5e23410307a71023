//! Token definitions for the translation engine.
//!
//! Two token families live here:
//! - [`TexToken`]: raw LaTeX input as the lexer sees it (control sequences,
//!   groups, characters), tagged with byte offsets via [`Spanned`].
//! - [`Token`]: the classified, brace-free output stream produced by the
//!   disambiguator and consumed by the implicit-multiplication finisher.

use std::fmt;

/// A raw LaTeX token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TexToken {
    /// A control sequence like `\frac` or `\,`.
    /// The string does NOT include the leading backslash.
    ControlSeq(String),

    /// Begin group token `{`
    BeginGroup,

    /// End group token `}`
    EndGroup,

    /// A regular character (letters, digits, punctuation, etc.)
    Char(char),

    /// A run of whitespace, normalized to a single space
    Space,

    /// A comment (everything from `%` to end of line)
    Comment(String),

    /// Math shift `$`
    MathShift,

    /// Superscript `^`
    Superscript,

    /// Subscript `_`
    Subscript,

    /// Active char `~` (non-breaking space)
    ActiveChar(char),
}

impl TexToken {
    /// Returns true if this token is whitespace
    pub fn is_space(&self) -> bool {
        matches!(self, TexToken::Space)
    }

    /// Returns true for control words (`\sin`) as opposed to control symbols (`\,`)
    pub fn is_control_word(&self) -> bool {
        matches!(self, TexToken::ControlSeq(n) if n.starts_with(|c: char| c.is_ascii_alphabetic()))
    }
}

impl fmt::Display for TexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TexToken::ControlSeq(name) => write!(f, "\\{}", name),
            TexToken::BeginGroup => write!(f, "{{"),
            TexToken::EndGroup => write!(f, "}}"),
            TexToken::Char(c) => write!(f, "{}", c),
            TexToken::Space => write!(f, " "),
            TexToken::Comment(text) => write!(f, "%{}", text),
            TexToken::MathShift => write!(f, "$"),
            TexToken::Superscript => write!(f, "^"),
            TexToken::Subscript => write!(f, "_"),
            TexToken::ActiveChar(c) => write!(f, "{}", c),
        }
    }
}

/// A raw token together with the byte offset where it starts in the lexed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub offset: usize,
    pub token: TexToken,
}

impl Spanned {
    pub fn new(offset: usize, token: TexToken) -> Self {
        Spanned { offset, token }
    }
}

/// What a run of letters turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// Called with parentheses: `sin`, `log10`, `abs`, ...
    Function,
    /// Stands alone: `pi`, `Infinity`
    Constant,
}

/// A classified token of the output expression.
///
/// Tokens are immutable once classified; the finisher only inserts new
/// `Operator('*')` tokens between existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A decimal numeral such as `2` or `0.5`
    Number(String),
    /// A single-letter variable
    Variable(char),
    /// An entry of the function table used as a value
    Constant(String),
    /// An entry of the function table used as a call
    Function(String),
    /// `(` or `)`
    Delimiter(char),
    /// One of `+ - * / ^`
    Operator(char),
    /// Argument separator `,`
    Comma,
    /// Whitespace between atoms (dropped on output)
    Whitespace,
    /// Any other character, passed through untouched
    Literal(char),
    /// A control sequence that survived every rewrite (lenient mode only)
    Unknown(String),
}

impl Token {
    pub fn is_open(&self) -> bool {
        matches!(self, Token::Delimiter('('))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Token::Delimiter(')'))
    }

    /// Variables, constants and function names all start with a letter.
    pub fn is_name(&self) -> bool {
        matches!(
            self,
            Token::Variable(_) | Token::Constant(_) | Token::Function(_)
        )
    }

    /// A name that denotes a value rather than a call.
    pub fn is_value_name(&self) -> bool {
        matches!(self, Token::Variable(_) | Token::Constant(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(c) => write!(f, "{}", c),
            Token::Constant(name) | Token::Function(name) => write!(f, "{}", name),
            Token::Delimiter(c) | Token::Operator(c) | Token::Literal(c) => write!(f, "{}", c),
            Token::Comma => write!(f, ","),
            Token::Whitespace => Ok(()),
            Token::Unknown(name) => write!(f, "\\{}", name),
        }
    }
}

/// A classified token stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenStream(pub Vec<Token>);

impl TokenStream {
    /// Create a new empty stream
    pub fn new() -> Self {
        TokenStream(Vec::new())
    }

    /// Create from a vector of tokens
    pub fn from_vec(tokens: Vec<Token>) -> Self {
        TokenStream(tokens)
    }

    /// Push a token to the stream
    pub fn push(&mut self, token: Token) {
        self.0.push(token);
    }

    /// Get the inner vector
    pub fn into_inner(self) -> Vec<Token> {
        self.0
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get length
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Last token that is not whitespace
    pub fn last_significant(&self) -> Option<&Token> {
        self.0.iter().rev().find(|t| !matches!(t, Token::Whitespace))
    }
}

impl fmt::Display for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl IntoIterator for TokenStream {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tex_token_display() {
        assert_eq!(format!("{}", TexToken::ControlSeq("frac".into())), "\\frac");
        assert_eq!(format!("{}", TexToken::BeginGroup), "{");
        assert_eq!(format!("{}", TexToken::EndGroup), "}");
        assert_eq!(format!("{}", TexToken::Char('x')), "x");
        assert_eq!(format!("{}", TexToken::Space), " ");
        assert_eq!(format!("{}", TexToken::Superscript), "^");
    }

    #[test]
    fn test_control_word_vs_symbol() {
        assert!(TexToken::ControlSeq("sin".into()).is_control_word());
        assert!(!TexToken::ControlSeq(",".into()).is_control_word());
        assert!(!TexToken::Char('a').is_control_word());
    }

    #[test]
    fn test_stream_display_drops_whitespace() {
        let stream = TokenStream::from_vec(vec![
            Token::Function("sin".into()),
            Token::Delimiter('('),
            Token::Variable('x'),
            Token::Delimiter(')'),
            Token::Whitespace,
            Token::Operator('+'),
            Token::Constant("pi".into()),
        ]);
        assert_eq!(stream.to_string(), "sin(x)+pi");
    }

    #[test]
    fn test_last_significant_skips_whitespace() {
        let stream = TokenStream::from_vec(vec![Token::Variable('x'), Token::Whitespace]);
        assert_eq!(stream.last_significant(), Some(&Token::Variable('x')));
    }
}
