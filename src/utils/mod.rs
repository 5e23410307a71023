//! Utility modules
//!
//! This module contains the error, warning and result types shared by the
//! library, the CLI and the wasm bindings.

pub mod error;

// Re-export commonly used items
pub use error::{ErrorKind, TranslateError, TranslateResult, Translation, TranslationWarning};
