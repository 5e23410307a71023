//! tex2expr - LaTeX math to infix expression translator
//!
//! Translates LaTeX math notation (`\frac`, `\sqrt`, `\sin^{-1}`, `\left|`,
//! `^{...}`) into a plain infix expression that a general-purpose evaluator
//! can parse: function-call syntax, explicit `*`, and explicit parentheses.
//!
//! # Example
//!
//! ```
//! use tex2expr::translate;
//!
//! assert_eq!(translate(r"\frac{\frac{a}{b}}{c}").unwrap(), "(((a)/(b))/(c))");
//! assert_eq!(translate(r"2\pi r").unwrap(), "2*pi*r");
//! assert_eq!(translate(r"\tan^{-1}xy").unwrap(), "atan(x*y)");
//! ```
//!
//! The output uses only `+ - * / ^`, parentheses, commas, decimal numerals,
//! single-letter variables and the names of a [`FunctionTable`].

pub mod core;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use crate::core::latex2expr::{
    translate, translate_lenient, translate_with_options, FunctionTable, LogBase, NameKind,
    PlusMinus, TranslateOptions, Translator,
};
pub use crate::utils::error::{
    ErrorKind, TranslateError, TranslateResult, Translation, TranslationWarning,
};
