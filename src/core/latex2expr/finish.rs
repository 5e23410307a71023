//! Implicit multiplication and final cleanup
//!
//! Inserts `*` wherever two classified atoms are juxtaposed and drops any
//! control sequence that survived rewriting.

use tracing::warn;

use super::engine::token::{Token, TokenStream};
use crate::utils::error::TranslationWarning;

/// Whether `prev next` is a product written without an operator.
///
/// A function name followed by `(` is a call and never qualifies.
pub fn is_juxtaposed(prev: &Token, next: &Token) -> bool {
    match (prev, next) {
        (Token::Number(_), n) => n.is_name() || n.is_number() || n.is_open(),
        (p, n) if p.is_close() => n.is_number() || n.is_open() || n.is_name(),
        (p, n) if p.is_value_name() => n.is_open(),
        _ => false,
    }
}

/// Render the final expression, recording a warning per dropped command
pub fn finish(tokens: TokenStream, warnings: &mut Vec<TranslationWarning>) -> String {
    let mut out = TokenStream::new();
    for token in tokens {
        if let Token::Unknown(name) = &token {
            warn!(command = %name, "dropping unknown control sequence");
            warnings.push(TranslationWarning::dropped_command(name));
            continue;
        }
        if out.last_significant().is_some_and(|prev| is_juxtaposed(prev, &token)) {
            out.push(Token::Operator('*'));
        }
        out.push(token);
    }
    out.to_string()
}
