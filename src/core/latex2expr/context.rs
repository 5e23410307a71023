//! Translation options
//!
//! Conventions the LaTeX source leaves open (the sign of `\pm`, the base of
//! `\log`) and the failure policy are chosen here rather than hard-coded in
//! the stages.

use serde::{Deserialize, Serialize};

/// Sign chosen for `\pm`; `\mp` always takes the other one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlusMinus {
    #[default]
    Plus,
    Minus,
}

impl PlusMinus {
    pub fn sign(self) -> &'static str {
        match self {
            PlusMinus::Plus => "+",
            PlusMinus::Minus => "-",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PlusMinus::Plus => PlusMinus::Minus,
            PlusMinus::Minus => PlusMinus::Plus,
        }
    }
}

/// What an unlabelled `\log` means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBase {
    /// `\log` is base 10 (`log10`)
    #[default]
    Common,
    /// `\log` is the natural logarithm (`log`)
    Natural,
}

impl LogBase {
    pub fn function(self) -> &'static str {
        match self {
            LogBase::Common => "log10",
            LogBase::Natural => "log",
        }
    }
}

/// Options for LaTeX to expression translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Abort on structural problems instead of passing them through.
    /// Default: true
    pub strict: bool,

    /// Sign used for `\pm`.
    /// Default: plus
    pub plus_minus: PlusMinus,

    /// Base of `\log`; `\ln` is always natural.
    /// Default: common (base 10)
    pub log_base: LogBase,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            strict: true,
            plus_minus: PlusMinus::Plus,
            log_base: LogBase::Common,
        }
    }
}

impl TranslateOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Strict mode: malformed input is an error
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient mode: malformed fragments are left in the output and reported as warnings
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_plus_minus(mut self, plus_minus: PlusMinus) -> Self {
        self.plus_minus = plus_minus;
        self
    }

    pub fn with_log_base(mut self, log_base: LogBase) -> Self {
        self.log_base = log_base;
        self
    }
}
