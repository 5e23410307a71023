//! Error handling for tex2expr translations
//!
//! This module provides the error type raised in strict mode, the warning type
//! collected in lenient mode, and the translation output that carries both the
//! expression and its warnings.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classification of a translation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Unbalanced `|`, `{}`, `()`, `[]`, or an unterminated `\left`/`\right`
    MalformedDelimiter,
    /// A control sequence outside the recognized vocabulary
    UnknownControlSequence,
    /// A `^` without a base or without an exponent
    AmbiguousExponentTarget,
    /// Notation the target grammar cannot express (`x_1`, `3!`, `x'`)
    UnsupportedNotation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedDelimiter => write!(f, "malformed delimiter"),
            ErrorKind::UnknownControlSequence => write!(f, "unknown control sequence"),
            ErrorKind::AmbiguousExponentTarget => write!(f, "ambiguous exponent target"),
            ErrorKind::UnsupportedNotation => write!(f, "unsupported notation"),
        }
    }
}

/// Translation error type
///
/// Offsets are byte offsets into the caller's input, before any trimming.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("malformed delimiter at byte {offset}: {message} (near `{fragment}`)")]
    MalformedDelimiter {
        offset: usize,
        fragment: String,
        message: String,
    },

    #[error("unknown control sequence `\\{name}` at byte {offset}")]
    UnknownControlSequence { offset: usize, name: String },

    #[error("ambiguous exponent target at byte {offset} (near `{fragment}`)")]
    AmbiguousExponentTarget { offset: usize, fragment: String },

    #[error("unsupported notation `{fragment}` at byte {offset}")]
    UnsupportedNotation { offset: usize, fragment: String },
}

/// Result type for translation operations
pub type TranslateResult<T> = Result<T, TranslateError>;

// Convenience constructors for errors
impl TranslateError {
    pub fn malformed(
        offset: usize,
        fragment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TranslateError::MalformedDelimiter {
            offset,
            fragment: fragment.into(),
            message: message.into(),
        }
    }

    pub fn unknown(offset: usize, name: impl Into<String>) -> Self {
        TranslateError::UnknownControlSequence {
            offset,
            name: name.into(),
        }
    }

    pub fn exponent(offset: usize, fragment: impl Into<String>) -> Self {
        TranslateError::AmbiguousExponentTarget {
            offset,
            fragment: fragment.into(),
        }
    }

    pub fn unsupported(offset: usize, fragment: impl Into<String>) -> Self {
        TranslateError::UnsupportedNotation {
            offset,
            fragment: fragment.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::MalformedDelimiter { .. } => ErrorKind::MalformedDelimiter,
            TranslateError::UnknownControlSequence { .. } => ErrorKind::UnknownControlSequence,
            TranslateError::AmbiguousExponentTarget { .. } => ErrorKind::AmbiguousExponentTarget,
            TranslateError::UnsupportedNotation { .. } => ErrorKind::UnsupportedNotation,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            TranslateError::MalformedDelimiter { offset, .. }
            | TranslateError::UnknownControlSequence { offset, .. }
            | TranslateError::AmbiguousExponentTarget { offset, .. }
            | TranslateError::UnsupportedNotation { offset, .. } => *offset,
        }
    }

    /// Same error, shifted by `delta` bytes
    pub(crate) fn shifted(mut self, delta: usize) -> Self {
        match &mut self {
            TranslateError::MalformedDelimiter { offset, .. }
            | TranslateError::UnknownControlSequence { offset, .. }
            | TranslateError::AmbiguousExponentTarget { offset, .. }
            | TranslateError::UnsupportedNotation { offset, .. } => *offset += delta,
        }
        self
    }
}

/// A non-fatal issue recorded while translating in lenient mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationWarning {
    /// What went wrong
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Byte offset into the input, when known
    pub offset: Option<usize>,
}

impl TranslationWarning {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        TranslationWarning {
            kind,
            message: message.into(),
            offset: None,
        }
    }

    /// Add location context to the warning
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Create a warning for a control sequence deleted from the output
    pub fn dropped_command(name: &str) -> Self {
        TranslationWarning::new(
            ErrorKind::UnknownControlSequence,
            format!("Unknown command '\\{}' was removed", name),
        )
    }
}

impl From<TranslateError> for TranslationWarning {
    fn from(err: TranslateError) -> Self {
        TranslationWarning::new(err.kind(), err.to_string()).with_offset(err.offset())
    }
}

impl fmt::Display for TranslationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(offset) = self.offset {
            write!(f, "[{}] byte {}: {}", self.kind, offset, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

/// Translation output with optional warnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// The infix expression
    pub expression: String,
    /// Any warnings generated during translation (lenient mode only)
    pub warnings: Vec<TranslationWarning>,
}

impl Translation {
    pub fn new(expression: String) -> Self {
        Self {
            expression,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(expression: String, warnings: Vec<TranslationWarning>) -> Self {
        Self {
            expression,
            warnings,
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = TranslateError::malformed(3, "|", "odd number of bars");
        let msg = err.to_string();
        assert!(msg.contains("malformed delimiter"));
        assert!(msg.contains("byte 3"));
        assert!(msg.contains("odd number of bars"));
    }

    #[test]
    fn test_unknown_display_has_backslash() {
        let err = TranslateError::unknown(0, "alpha");
        assert_eq!(err.to_string(), "unknown control sequence `\\alpha` at byte 0");
        assert_eq!(err.kind(), ErrorKind::UnknownControlSequence);
    }

    #[test]
    fn test_shifted_offset() {
        let err = TranslateError::exponent(2, "^").shifted(3);
        assert_eq!(err.offset(), 5);
        assert_eq!(err.kind(), ErrorKind::AmbiguousExponentTarget);
    }

    #[test]
    fn test_unsupported_display() {
        let err = TranslateError::unsupported(1, "_1");
        assert_eq!(err.to_string(), "unsupported notation `_1` at byte 1");
        assert_eq!(err.kind(), ErrorKind::UnsupportedNotation);
        assert_eq!(err.shifted(2).offset(), 3);
    }

    #[test]
    fn test_warning_from_error() {
        let warning = TranslationWarning::from(TranslateError::unknown(4, "foo"));
        assert_eq!(warning.kind, ErrorKind::UnknownControlSequence);
        assert_eq!(warning.offset, Some(4));
        assert!(warning.to_string().starts_with("[unknown control sequence] byte 4"));
    }

    #[test]
    fn test_translation_output() {
        let output = Translation::new("x*y".to_string());
        assert!(!output.has_warnings());

        let with_warn = Translation::with_warnings(
            "x".to_string(),
            vec![TranslationWarning::dropped_command("alpha")],
        );
        assert!(with_warn.has_warnings());
    }
}
