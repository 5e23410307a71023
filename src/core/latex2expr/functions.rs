//! Name tables: the known function table and the LaTeX command table
//!
//! [`FunctionTable`] is the vocabulary of the target grammar. It is an
//! immutable value owned by a translator, so alternate vocabularies can be
//! injected without touching global state. [`COMMANDS`] maps every LaTeX
//! control sequence the engine understands to what it becomes.

use phf::{phf_map, phf_ordered_map};

pub use super::engine::token::NameKind;

/// The standard vocabulary, in the order it is documented.
pub static STANDARD_NAMES: phf::OrderedMap<&'static str, NameKind> = phf_ordered_map! {
    "sin" => NameKind::Function,
    "cos" => NameKind::Function,
    "tan" => NameKind::Function,
    "asin" => NameKind::Function,
    "acos" => NameKind::Function,
    "atan" => NameKind::Function,
    "log" => NameKind::Function,
    "log10" => NameKind::Function,
    "sqrt" => NameKind::Function,
    "exp" => NameKind::Function,
    "abs" => NameKind::Function,
    "pi" => NameKind::Constant,
    "Infinity" => NameKind::Constant,
};

/// Prefix of every name the rewriter parks until its argument is known.
///
/// It is a private-use character; the validator rejects it and the normalizer
/// strips it, so input can never spell a placeholder.
pub const PLACEHOLDER_MARK: char = '\u{E000}';

/// A reciprocal trig function parked behind a marked name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// Marked name as it appears in rewritten text
    pub name: &'static str,
    /// Target function it expands around
    pub function: &'static str,
    /// `acos(1/(x))` when true, `(1/cos(x))` otherwise
    pub inverse: bool,
}

pub const PLACEHOLDERS: &[Placeholder] = &[
    Placeholder { name: "\u{E000}sec", function: "cos", inverse: false },
    Placeholder { name: "\u{E000}csc", function: "sin", inverse: false },
    Placeholder { name: "\u{E000}cot", function: "tan", inverse: false },
    Placeholder { name: "\u{E000}asec", function: "acos", inverse: true },
    Placeholder { name: "\u{E000}acsc", function: "asin", inverse: true },
    Placeholder { name: "\u{E000}acot", function: "atan", inverse: true },
];

/// What `\<name>^{-1}` becomes, for the six trig functions
pub fn inverse_trig(name: &str) -> Option<&'static str> {
    match name {
        "sin" => Some("asin"),
        "cos" => Some("acos"),
        "tan" => Some("atan"),
        "sec" => Some(PLACEHOLDERS[3].name),
        "csc" => Some(PLACEHOLDERS[4].name),
        "cot" => Some(PLACEHOLDERS[5].name),
        _ => None,
    }
}

/// What a LaTeX control sequence turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Resolved by the normalizer or the structural pass (`\frac`, `\left`, `\{`)
    Structural,
    /// A function of the target grammar
    Function(&'static str),
    /// Reciprocal trig, parked behind a placeholder until its argument is known
    Reciprocal(&'static str),
    /// A constant of the target grammar
    Constant(&'static str),
    /// A binary operator
    Operator(&'static str),
    /// `\pm`
    PlusMinus,
    /// `\mp`
    MinusPlus,
    /// `\log`, whose base follows the options
    Log,
    /// Horizontal spacing, becomes whitespace
    Spacing,
}

/// Every control sequence the engine recognizes.
pub static COMMANDS: phf::Map<&'static str, Command> = phf_map! {
    "frac" => Command::Structural,
    "dfrac" => Command::Structural,
    "tfrac" => Command::Structural,
    "sqrt" => Command::Structural,
    "left" => Command::Structural,
    "right" => Command::Structural,
    "{" => Command::Structural,
    "}" => Command::Structural,
    "sin" => Command::Function("sin"),
    "cos" => Command::Function("cos"),
    "tan" => Command::Function("tan"),
    "arcsin" => Command::Function("asin"),
    "arccos" => Command::Function("acos"),
    "arctan" => Command::Function("atan"),
    "sec" => Command::Reciprocal("\u{E000}sec"),
    "csc" => Command::Reciprocal("\u{E000}csc"),
    "cot" => Command::Reciprocal("\u{E000}cot"),
    "ln" => Command::Function("log"),
    "log" => Command::Log,
    "exp" => Command::Function("exp"),
    "pi" => Command::Constant("pi"),
    "e" => Command::Constant("e"),
    "infty" => Command::Constant("Infinity"),
    "cdot" => Command::Operator("*"),
    "times" => Command::Operator("*"),
    "ast" => Command::Operator("*"),
    "div" => Command::Operator("/"),
    "pm" => Command::PlusMinus,
    "mp" => Command::MinusPlus,
    "quad" => Command::Spacing,
    "qquad" => Command::Spacing,
    "," => Command::Spacing,
    ";" => Command::Spacing,
    ":" => Command::Spacing,
    "!" => Command::Spacing,
    " " => Command::Spacing,
};

/// Look up a control sequence by name (without the backslash)
pub fn command(name: &str) -> Option<Command> {
    COMMANDS.get(name).copied()
}

/// Longest recognized command that `name` starts with, for fused words like `\sinx`.
///
/// Only names of at least two letters that stand for functions or constants
/// are considered, so `\epsilon` is not read as `\e` followed by `psilon`.
pub fn command_prefix(name: &str) -> Option<(&'static str, Command)> {
    COMMANDS
        .entries()
        .filter(|(key, cmd)| {
            matches!(
                cmd,
                Command::Function(_) | Command::Reciprocal(_) | Command::Constant(_) | Command::Log
            ) && key.len() >= 2
                && key.len() < name.len()
                && name.starts_with(**key)
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(key, cmd)| (*key, *cmd))
}

/// True when a name ending right before `next` is a complete identifier.
fn is_boundary(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => !c.is_ascii_alphanumeric(),
    }
}

/// The set of identifiers the downstream evaluator understands natively.
///
/// Entries are kept longest first, so `log10` is always tried before `log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTable {
    entries: Vec<(String, NameKind)>,
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FunctionTable {
    /// Build a table from `(name, kind)` pairs.
    ///
    /// Names must start with an ASCII letter and contain only ASCII
    /// alphanumerics; anything else is ignored. A repeated name keeps its
    /// last kind.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, NameKind)>,
        S: Into<String>,
    {
        let mut table = FunctionTable {
            entries: Vec::new(),
        };
        for (name, kind) in entries {
            table.insert(name.into(), kind);
        }
        table
    }

    /// The standard vocabulary (`sin` ... `abs`, `pi`, `Infinity`)
    pub fn standard() -> Self {
        Self::new(STANDARD_NAMES.entries().map(|(name, kind)| (*name, *kind)))
    }

    /// Add (or reclassify) a function name
    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.insert(name.into(), NameKind::Function);
        self
    }

    /// Add (or reclassify) a constant name
    pub fn with_constant(mut self, name: impl Into<String>) -> Self {
        self.insert(name.into(), NameKind::Constant);
        self
    }

    fn insert(&mut self, name: String, kind: NameKind) {
        let valid = name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return;
        }
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, kind));
        // Stable: equal lengths keep insertion order
        self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Kind of an exact name, if it is in the table
    pub fn kind_of(&self, name: &str) -> Option<NameKind> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// All entries, longest first
    pub fn names(&self) -> impl Iterator<Item = (&str, NameKind)> + '_ {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    /// Function names, longest first
    pub fn functions(&self) -> impl Iterator<Item = &str> + '_ {
        self.names()
            .filter(|(_, kind)| *kind == NameKind::Function)
            .map(|(name, _)| name)
    }

    /// Constant names, longest first
    pub fn constants(&self) -> impl Iterator<Item = &str> + '_ {
        self.names()
            .filter(|(_, kind)| *kind == NameKind::Constant)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest entry starting at byte `at` that is followed by a non-alphanumeric
    /// character or the end of `s`.
    ///
    /// A name that abuts another letter is part of a longer identifier and
    /// never matches.
    pub fn longest_match(&self, s: &str, at: usize) -> Option<(&str, NameKind)> {
        let rest = s.get(at..)?;
        self.names().find(|(name, _)| {
            rest.starts_with(name) && is_boundary(rest[name.len()..].chars().next())
        })
    }

    /// Longest constant starting at `at` with an identifier boundary after it
    pub fn constant_at(&self, s: &str, at: usize) -> Option<&str> {
        let rest = s.get(at..)?;
        self.constants()
            .find(|name| rest.starts_with(name) && is_boundary(rest[name.len()..].chars().next()))
    }
}
