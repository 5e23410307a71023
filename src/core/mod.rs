//! Core translation engines
//!
//! - `latex2expr`: LaTeX math to infix expression

pub mod latex2expr;
