//! Function/variable disambiguation
//!
//! Classifies the rewritten text into [`Token`]s. A run of letters is a
//! function or constant only when a table entry matches it up to an
//! identifier boundary; otherwise every letter is its own variable and
//! adjacent values get an explicit `*`.

use tracing::trace;

use super::engine::token::{NameKind, Token, TokenStream};
use super::engine::utils::control_seq_len;
use super::functions::FunctionTable;

/// Whether `*` goes between a value already emitted and the name that follows
fn multiplies(prev: Option<&Token>, next: &Token) -> bool {
    matches!(prev, Some(Token::Variable(_)) | Some(Token::Constant(_))) && next.is_name()
}

/// Classify rewritten text into a whitespace-free token stream
pub fn disambiguate(input: &str, table: &FunctionTable) -> TokenStream {
    let mut stream = TokenStream::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        let (token, len) = if c.is_ascii_digit()
            || (c == '.' && input[i + 1..].starts_with(|d: char| d.is_ascii_digit()))
        {
            let len = input[i..]
                .find(|d: char| !(d.is_ascii_digit() || d == '.'))
                .unwrap_or(input.len() - i);
            (Token::Number(input[i..i + len].to_string()), len)
        } else if c.is_alphabetic() {
            match table.longest_match(input, i) {
                Some((name, NameKind::Function)) => (Token::Function(name.to_string()), name.len()),
                Some((name, NameKind::Constant)) => (Token::Constant(name.to_string()), name.len()),
                None => (Token::Variable(c), c.len_utf8()),
            }
        } else if c == '\\' {
            let len = control_seq_len(input, i).unwrap_or(1);
            (Token::Unknown(input[i + 1..i + len].to_string()), len)
        } else if c.is_whitespace() {
            (Token::Whitespace, c.len_utf8())
        } else {
            let token = match c {
                '(' | ')' => Token::Delimiter(c),
                '+' | '-' | '*' | '/' | '^' => Token::Operator(c),
                ',' => Token::Comma,
                _ => Token::Literal(c),
            };
            (token, c.len_utf8())
        };

        if multiplies(stream.last_significant(), &token) {
            trace!(before = %token, "implicit multiplication between names");
            stream.push(Token::Operator('*'));
        }
        if !(token == Token::Whitespace && stream.0.last() == Some(&Token::Whitespace)) {
            stream.push(token);
        }
        while chars.peek().is_some_and(|&(j, _)| j < i + len) {
            chars.next();
        }
    }

    TokenStream::from_vec(
        stream
            .into_iter()
            .filter(|t| *t != Token::Whitespace)
            .collect(),
    )
}
