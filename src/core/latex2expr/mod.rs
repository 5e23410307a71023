//! LaTeX math to infix expression translator
//!
//! The translation runs as a fixed pipeline over one input string:
//!
//! 1. `validate` checks the raw input for structural problems
//! 2. `normalize` strips math shifts, spacing and sized delimiters
//! 3. `rewrite` resolves fractions, roots, trig forms and exponents
//! 4. `disambiguate` splits letter runs into names and variables
//! 5. `finish` makes implicit multiplication explicit
//!
//! In strict mode the first structural problem aborts the translation. In
//! lenient mode every problem becomes a warning and the later stages work
//! around it.

pub mod context;
pub mod disambiguate;
pub mod engine;
pub mod finish;
pub mod functions;
pub mod normalize;
pub mod rewrite;
pub mod validate;

use lazy_static::lazy_static;
use tracing::{debug, warn};

pub use context::{LogBase, PlusMinus, TranslateOptions};
pub use functions::{FunctionTable, NameKind};

use crate::utils::error::{TranslateResult, Translation, TranslationWarning};

use disambiguate::disambiguate;
use finish::finish;
use normalize::normalize;
use rewrite::Rewriter;
use validate::validate;

// =============================================================================
// Translator
// =============================================================================

/// A reusable translation engine.
///
/// The vocabulary and options are fixed at construction, so one translator
/// can be shared freely between threads.
///
/// # Example
///
/// ```
/// use tex2expr::core::latex2expr::{FunctionTable, TranslateOptions, Translator};
///
/// let table = FunctionTable::standard().with_function("sinh");
/// let translator = Translator::with_functions(TranslateOptions::default(), table);
/// assert_eq!(translator.translate("sinh(x)y").unwrap(), "sinh(x)*y");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    options: TranslateOptions,
    table: FunctionTable,
}

impl Translator {
    /// Translator with the standard vocabulary
    pub fn new(options: TranslateOptions) -> Self {
        Self::with_functions(options, FunctionTable::standard())
    }

    /// Translator with a custom vocabulary
    pub fn with_functions(options: TranslateOptions, table: FunctionTable) -> Self {
        Translator { options, table }
    }

    pub fn options(&self) -> &TranslateOptions {
        &self.options
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.table
    }

    /// Translate, discarding any lenient-mode warnings
    pub fn translate(&self, input: &str) -> TranslateResult<String> {
        self.translate_with_report(input).map(|t| t.expression)
    }

    /// Translate, returning the expression together with its warnings
    pub fn translate_with_report(&self, input: &str) -> TranslateResult<Translation> {
        let trimmed = input.trim_start();
        let lead = input.len() - trimmed.len();
        let trimmed = trimmed.trim_end();

        let mut warnings: Vec<TranslationWarning> = Vec::new();
        let issues = validate(trimmed);
        if self.options.strict {
            if let Some(issue) = issues.into_iter().next() {
                let issue = issue.shifted(lead);
                debug!(%issue, "rejecting input");
                return Err(issue);
            }
        } else {
            for issue in issues {
                let issue = issue.shifted(lead);
                warn!(%issue, "continuing past structural issue");
                warnings.push(issue.into());
            }
        }

        let normalized = normalize(trimmed);
        debug!(stage = "normalize", output = %normalized);

        let rewritten = Rewriter::new(&self.table, &self.options).rewrite(&normalized);
        debug!(stage = "rewrite", output = %rewritten);

        let tokens = disambiguate(&rewritten, &self.table);
        debug!(stage = "disambiguate", tokens = tokens.len());

        let expression = finish(tokens, &mut warnings);
        debug!(stage = "finish", output = %expression, warnings = warnings.len());

        Ok(Translation::with_warnings(expression, warnings))
    }
}

lazy_static! {
    static ref STRICT: Translator = Translator::new(TranslateOptions::strict());
    static ref LENIENT: Translator = Translator::new(TranslateOptions::lenient());
}

// =============================================================================
// Convenience entry points
// =============================================================================

/// Translate LaTeX math to an infix expression (strict mode)
///
/// # Example
///
/// ```
/// use tex2expr::core::latex2expr::translate;
///
/// assert_eq!(translate(r"\frac{1}{2}x").unwrap(), "((1)/(2))*x");
/// assert!(translate("|x").is_err());
/// ```
pub fn translate(input: &str) -> TranslateResult<String> {
    STRICT.translate(input)
}

/// Translate LaTeX math without ever failing
///
/// Malformed fragments are passed through and unknown control sequences are
/// deleted.
pub fn translate_lenient(input: &str) -> String {
    match LENIENT.translate(input) {
        Ok(expression) => expression,
        // Lenient translation reports problems as warnings instead
        Err(_) => String::new(),
    }
}

/// Translate with explicit options, keeping the warnings
pub fn translate_with_options(
    input: &str,
    options: &TranslateOptions,
) -> TranslateResult<Translation> {
    Translator::new(options.clone()).translate_with_report(input)
}
