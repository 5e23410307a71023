//! Low-level machinery shared by the pipeline stages
//!
//! - `token`: raw LaTeX tokens and the classified output tokens
//! - `lexer`: offset-tracking LaTeX lexer
//! - `utils`: balanced-delimiter scanning and argument reading

pub mod lexer;
pub mod token;
pub mod utils;

pub use lexer::{tokenize, Lexer};
pub use token::{NameKind, Spanned, TexToken, Token, TokenStream};
