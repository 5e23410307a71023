//! Structural rewriting
//!
//! Turns normalized LaTeX into brace-free infix text in a fixed order of
//! passes. Each pass assumes the earlier ones already ran:
//!
//! 1. fractions and roots, innermost first, until nothing is left to resolve
//! 2. inverse trig written as `\sin^{-1}`, while its argument is still visible
//! 3. logarithms with an explicit base (`\log_{2} x`)
//! 4. control words to target names (`\sec` parks behind a marked placeholder)
//! 5. argument attachment for function names (`sin x`, `sin2x`, `sin^2 x`, `sin cos x`)
//! 6. reciprocal placeholders to `1/cos(...)` and `acos(1/...)`
//! 7. exponents, right to left (`x^2` to `(x^2)`, `e^x` to `exp(x)`)
//! 8. remaining braces and brackets to parentheses
//!
//! Whitespace survives every pass; the disambiguator uses it as a word
//! boundary and then discards it.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{trace, warn};

use super::context::TranslateOptions;
use super::engine::utils::{
    control_seq_len, find_matching, is_enclosed, read_argument, read_optional, skip_ws,
    skip_ws_back, wrap,
};
use super::functions::{
    command, command_prefix, inverse_trig, Command, FunctionTable, Placeholder, PLACEHOLDERS,
};

lazy_static! {
    /// `\sin^{-1}` and friends, tolerant of inner spacing
    static ref INVERSE_TRIG: Regex =
        Regex::new(r"\\(sin|cos|tan|sec|csc|cot)\s*\^\s*\{\s*-\s*1\s*\}").expect("valid regex literal");
    /// `\log_` with its base still to be read
    static ref LOG_SUBSCRIPT: Regex = Regex::new(r"\\log\s*_").expect("valid regex literal");
    /// Two juxtaposed groups, which multiply
    static ref ADJACENT_GROUPS: Regex = Regex::new(r"\}\s*\{").expect("valid regex literal");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex literal");
    /// A decimal numeral at the start of the haystack
    static ref DECIMAL: Regex = Regex::new(r"^\d+(\.\d+)?").expect("valid regex literal");
}

/// Constructs resolved by the fixed-point pass
const STRUCTURES: &[&str] = &["frac", "dfrac", "tfrac", "sqrt"];

/// Start of the `[A-Za-z0-9.]` run ending at `end`
fn base_start(s: &str, end: usize) -> usize {
    s[..end]
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '.')
        .last()
        .map(|(i, _)| i)
        .unwrap_or(end)
}

/// True when the letter at `at` belongs to a `\word`
fn inside_control_word(s: &str, at: usize) -> bool {
    let letters = s[..at]
        .bytes()
        .rev()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    s[..at - letters].ends_with('\\')
}

fn first_char(s: &str, at: usize) -> Option<char> {
    s.get(at..)?.chars().next()
}

/// Structural rewriter bound to one vocabulary and one set of options
pub struct Rewriter<'a> {
    table: &'a FunctionTable,
    options: &'a TranslateOptions,
    /// Function names and placeholders, longest first
    callables: Vec<&'a str>,
}

impl<'a> Rewriter<'a> {
    pub fn new(table: &'a FunctionTable, options: &'a TranslateOptions) -> Self {
        let mut callables: Vec<&'a str> = table.functions().collect();
        callables.extend(PLACEHOLDERS.iter().map(|placeholder| placeholder.name));
        callables.sort_by(|a, b| b.len().cmp(&a.len()));
        Rewriter {
            table,
            options,
            callables,
        }
    }

    /// Run every pass over normalized input
    pub fn rewrite(&self, input: &str) -> String {
        let s = self.resolve_structures(input);
        trace!(pass = "structures", %s);
        let s = self.resolve_inverse_trig(&s);
        trace!(pass = "inverse-trig", %s);
        let s = self.resolve_log_bases(&s);
        trace!(pass = "log-bases", %s);
        let s = self.rename_commands(&s);
        trace!(pass = "commands", %s);
        let s = self.attach_arguments(&s);
        trace!(pass = "arguments", %s);
        let s = expand_placeholders(&s);
        trace!(pass = "placeholders", %s);
        let s = self.resolve_exponents(&s);
        trace!(pass = "exponents", %s);
        flatten_groups(&s)
    }

    // -- Fractions and roots --------------------------------------------

    fn resolve_structures(&self, input: &str) -> String {
        let mut s = input.to_string();
        loop {
            let mut candidates = Vec::new();
            let mut i = 0;
            while i < s.len() {
                if s.as_bytes()[i] == b'\\' {
                    let len = control_seq_len(&s, i).unwrap_or(1);
                    let name = &s[i + 1..i + len];
                    if STRUCTURES.contains(&name) {
                        candidates.push((i, name.to_string()));
                    }
                    i += len;
                } else {
                    i += 1;
                }
            }

            // Rightmost first: anything nested inside it is already gone
            let resolved = candidates
                .iter()
                .rev()
                .find_map(|(at, name)| resolve_structure(&s, *at, name).map(|r| (*at, r)));
            match resolved {
                Some((start, (end, replacement))) => {
                    trace!(from = &s[start..end], to = %replacement, "resolved structure");
                    s.replace_range(start..end, &replacement);
                }
                None => break,
            }
        }
        s
    }

    // -- Inverse trig -----------------------------------------------------

    fn resolve_inverse_trig(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        while let Some(m) = INVERSE_TRIG.find_at(s, last) {
            out.push_str(&s[last..m.start()]);
            let trig = &m.as_str()[1..4];
            let name = inverse_trig(trig).unwrap_or(trig);
            match self.read_prefixed_argument(s, m.end()) {
                Some((end, arg)) => {
                    out.push_str(&format!(" {}({})", name, arg));
                    last = end;
                }
                None => {
                    out.push_str(&format!(" {} ", name));
                    last = m.end();
                }
            }
        }
        out.push_str(&s[last..]);
        out
    }

    /// Raw argument after a prefix like `\sin^{-1}` or `\log_{2}`, read
    /// before any control word is renamed
    fn read_prefixed_argument(&self, s: &str, at: usize) -> Option<(usize, String)> {
        let i = skip_ws(s, at);
        let c = first_char(s, i)?;
        let end = match c {
            '{' | '(' => {
                let close = find_matching(s, i)?;
                return Some((close + 1, s[i + 1..close].to_string()));
            }
            '-' | '+' => self.read_prefixed_argument(s, i + 1)?.0,
            c if c.is_ascii_digit() => self.read_numeric(s, i)?,
            c if c.is_ascii_alphabetic() => self.letter_run(s, i),
            '\\' => {
                let len = control_seq_len(s, i)?;
                match command(&s[i + 1..i + len])? {
                    Command::Constant(_) => i + len,
                    Command::Function(_) | Command::Reciprocal(_) | Command::Log => {
                        let mut k = skip_ws(s, i + len);
                        if first_char(s, k) == Some('^') {
                            k = self.read_exponent(s, k + 1)?.0;
                        }
                        self.read_prefixed_argument(s, k)?.0
                    }
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some((end, s[i..end].to_string()))
    }

    // -- Explicit log bases -------------------------------------------------

    fn resolve_log_bases(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut last = 0;
        while let Some(m) = LOG_SUBSCRIPT.find_at(s, last) {
            out.push_str(&s[last..m.start()]);
            let Some(base) = read_argument(s, m.end()) else {
                out.push_str(m.as_str());
                last = m.end();
                continue;
            };
            let base_text = base.text(s).trim();
            let function = match base_text {
                "10" => Some("log10"),
                "e" => Some("log"),
                _ => None,
            };
            match (function, self.read_prefixed_argument(s, base.end)) {
                (Some(function), Some((end, arg))) => {
                    out.push_str(&format!(" {}({})", function, arg));
                    last = end;
                }
                (None, Some((end, arg))) => {
                    out.push_str(&format!(" (log({})/log({}))", arg, base_text));
                    last = end;
                }
                (Some(function), None) => {
                    out.push_str(&format!(" {} ", function));
                    last = base.end;
                }
                (None, None) => {
                    warn!(base = base_text, "logarithm base without a readable argument");
                    out.push_str(&format!(" (1/log({}))* log ", base_text));
                    last = base.end;
                }
            }
        }
        out.push_str(&s[last..]);
        out
    }

    // -- Control words ----------------------------------------------------

    fn render_command(&self, cmd: Command, source: &str) -> String {
        match cmd {
            Command::Structural => source.to_string(),
            Command::Function(name) | Command::Reciprocal(name) | Command::Constant(name) => {
                format!(" {} ", name)
            }
            Command::Operator(op) => op.to_string(),
            Command::PlusMinus => self.options.plus_minus.sign().to_string(),
            Command::MinusPlus => self.options.plus_minus.opposite().sign().to_string(),
            Command::Log => format!(" {} ", self.options.log_base.function()),
            Command::Spacing => " ".to_string(),
        }
    }

    fn rename_commands(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 16);
        let mut i = 0;
        while let Some(offset) = s[i..].find('\\') {
            let at = i + offset;
            out.push_str(&s[i..at]);
            let Some(len) = control_seq_len(s, at) else {
                out.push('\\');
                i = at + 1;
                continue;
            };
            let source = &s[at..at + len];
            let name = &source[1..];
            match command(name) {
                Some(cmd) => out.push_str(&self.render_command(cmd, source)),
                None => match command_prefix(name).filter(|_| !self.options.strict) {
                    Some((key, cmd)) => {
                        warn!(command = name, recovered = key, "splitting fused control word");
                        out.push_str(&self.render_command(cmd, &source[..=key.len()]));
                        out.push_str(&name[key.len()..]);
                    }
                    None => out.push_str(source),
                },
            }
            i = at + len;
        }
        out.push_str(&s[i..]);
        out
    }

    // -- Argument attachment ----------------------------------------------

    /// Function name or placeholder starting exactly at `at`
    fn callable_at(&self, s: &str, at: usize) -> Option<&'a str> {
        let rest = s.get(at..)?;
        self.callables.iter().copied().find(|name| rest.starts_with(name))
    }

    /// Leftmost callable at or after `from`, ignoring letters of unknown `\words`
    fn next_callable(&self, s: &str, from: usize) -> Option<(usize, &'a str)> {
        s[from..]
            .char_indices()
            .map(|(i, _)| from + i)
            .filter(|&at| !inside_control_word(s, at))
            .find_map(|at| self.callable_at(s, at).map(|name| (at, name)))
    }

    /// End of the letter run at `from`, stopping before another function name
    fn letter_run(&self, s: &str, from: usize) -> usize {
        let bytes = s.as_bytes();
        let mut i = from;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            if i > from && self.callable_at(s, i).is_some() {
                break;
            }
            i += 1;
        }
        i
    }

    /// `{group}`, `(group)`, a constant, or one alphanumeric character
    fn read_exponent(&self, s: &str, at: usize) -> Option<(usize, String)> {
        let i = skip_ws(s, at);
        let c = first_char(s, i)?;
        if c == '{' || c == '(' {
            let close = find_matching(s, i)?;
            return Some((close + 1, wrap(&s[i + 1..close])));
        }
        if let Some(name) = self.table.constant_at(s, i) {
            return Some((i + name.len(), name.to_string()));
        }
        c.is_ascii_alphanumeric()
            .then(|| (i + c.len_utf8(), c.to_string()))
    }

    /// Digits, optionally followed by letters or a constant
    fn read_numeric(&self, s: &str, at: usize) -> Option<usize> {
        let m = DECIMAL.find(&s[at..])?;
        let end = at + m.end();
        let k = skip_ws(s, end);
        if let Some(name) = self.table.constant_at(s, k) {
            return Some(k + name.len());
        }
        let run = self.letter_run(s, k);
        Some(if run > k { run } else { end })
    }

    /// A constant, or one letter with an optional exponent of its own
    fn read_atom(&self, s: &str, at: usize) -> Option<usize> {
        if let Some(name) = self.table.constant_at(s, at) {
            return Some(at + name.len());
        }
        let c = first_char(s, at)?;
        if !c.is_ascii_alphabetic() || self.callable_at(s, at).is_some() {
            return None;
        }
        let end = at + 1;
        let k = skip_ws(s, end);
        if first_char(s, k) == Some('^') {
            if let Some((exp_end, _)) = self.read_exponent(s, k + 1) {
                return Some(exp_end);
            }
        }
        Some(end)
    }

    /// A callable starting at `at` together with its own argument
    fn read_call(&self, s: &str, at: usize, name: &'a str) -> Option<(usize, String)> {
        let end = at + name.len();
        if let Some(found) = self.attach_at(s, end, name) {
            return Some(found);
        }
        let open = skip_ws(s, end);
        if !matches!(first_char(s, open), Some('(') | Some('{')) {
            return None;
        }
        let close = find_matching(s, open)?;
        let inner = self.attach_arguments(&s[open + 1..close]);
        Some((close + 1, format!("{}({})", name, inner.trim())))
    }

    /// Argument of a raised function: a call, a group, a numeral, or an
    /// atom, optionally signed
    fn read_power_argument(&self, s: &str, at: usize) -> Option<(usize, String)> {
        if let Some(inner) = self.callable_at(s, at) {
            return self.read_call(s, at, inner);
        }
        let c = first_char(s, at)?;
        if c == '-' || c == '+' {
            let k = skip_ws(s, at + 1);
            let (end, arg) = self.read_power_argument(s, k)?;
            return Some(match first_char(s, k) {
                Some('(') | Some('{') => (end, format!("{}({})", c, arg)),
                _ => (end, format!("{}{}", c, arg)),
            });
        }
        if c == '(' || c == '{' {
            let close = find_matching(s, at)?;
            let inner = self.attach_arguments(&s[at + 1..close]);
            return Some((close + 1, inner.trim().to_string()));
        }
        let end = if c.is_ascii_digit() {
            self.read_numeric(s, at)?
        } else {
            self.read_atom(s, at)?
        };
        Some((end, s[at..end].to_string()))
    }

    /// Give the function name ending at `end` an explicit argument
    fn attach_at(&self, s: &str, end: usize, name: &str) -> Option<(usize, String)> {
        let j = skip_ws(s, end);
        if let Some(inner) = self.callable_at(s, j) {
            let (arg_end, arg) = self.read_call(s, j, inner)?;
            return Some((arg_end, format!("{}({})", name, arg)));
        }
        let c = first_char(s, j)?;
        match c {
            '(' | '{' => None,
            '-' | '+' => {
                let (arg_end, arg) = self.read_power_argument(s, j)?;
                Some((arg_end, format!("{}({})", name, arg)))
            }
            '^' => {
                let (exp_end, exponent) = self.read_exponent(s, j + 1)?;
                let k = skip_ws(s, exp_end);
                let (arg_end, arg) = self.read_power_argument(s, k)?;
                Some((arg_end, format!("({}({})^{})", name, arg, exponent)))
            }
            c if c.is_ascii_digit() => {
                let arg_end = self.read_numeric(s, j)?;
                Some((arg_end, format!("{}({})", name, &s[j..arg_end])))
            }
            c if c.is_ascii_alphabetic() && j == end => {
                let arg_end = match self.table.constant_at(s, j) {
                    Some(constant) => j + constant.len(),
                    None => self.letter_run(s, j),
                };
                Some((arg_end, format!("{}({})", name, &s[j..arg_end])))
            }
            c if c.is_ascii_alphabetic() => {
                let arg_end = self.read_atom(s, j)?;
                Some((arg_end, format!("{}({})", name, &s[j..arg_end])))
            }
            _ => None,
        }
    }

    fn attach_arguments(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 8);
        let mut copied = 0;
        let mut search = 0;
        while let Some((at, name)) = self.next_callable(s, search) {
            let end = at + name.len();
            match self.attach_at(s, end, name) {
                Some((arg_end, rendered)) => {
                    trace!(from = &s[at..arg_end], to = %rendered, "attached argument");
                    out.push_str(&s[copied..at]);
                    out.push_str(&rendered);
                    copied = arg_end;
                    search = arg_end;
                }
                None => search = end,
            }
        }
        out.push_str(&s[copied..]);
        out
    }

    // -- Exponents ----------------------------------------------------------

    fn resolve_exponents(&self, input: &str) -> String {
        let mut s = input.to_string();
        let mut limit = s.len();
        while let Some(caret) = s[..limit].rfind('^') {
            limit = caret;
            let Some((exp_end, exponent)) = self.read_exponent(&s, caret + 1) else {
                continue;
            };
            let base_end = skip_ws_back(&s, caret);
            let start = base_start(&s, base_end);
            if start == base_end {
                // `)^2` and `}^2` already carry their own grouping
                continue;
            }
            let base = &s[start..base_end];
            let euler = base.ends_with('e')
                && (base.len() == 1 || base[..base.len() - 1].ends_with(|c: char| c.is_ascii_digit()));
            let (from, replacement) = if euler {
                let rendered = if is_enclosed(&exponent) {
                    format!("exp{}", exponent)
                } else {
                    format!("exp({})", exponent)
                };
                (base_end - 1, rendered)
            } else {
                (start, format!("({}^{})", base, exponent))
            };
            trace!(from = &s[from..exp_end], to = %replacement, "resolved exponent");
            s.replace_range(from..exp_end, &replacement);
            limit = from;
        }
        s
    }
}

/// Resolve the fraction or root at `at`, returning its end and replacement
fn resolve_structure(s: &str, at: usize, name: &str) -> Option<(usize, String)> {
    let after = at + 1 + name.len();
    if name == "sqrt" {
        let open = skip_ws(s, after);
        if s.as_bytes().get(open) == Some(&b'[') {
            let index = read_optional(s, open)?;
            let radicand = read_argument(s, index.end)?;
            return Some((
                radicand.end,
                format!("({}^(1/{}))", wrap(radicand.text(s)), wrap(index.text(s))),
            ));
        }
        let radicand = read_argument(s, after)?;
        return Some((radicand.end, format!("(sqrt({}))", radicand.text(s).trim())));
    }
    let numerator = read_argument(s, after)?;
    let denominator = read_argument(s, numerator.end)?;
    Some((
        denominator.end,
        format!("({}/{})", wrap(numerator.text(s)), wrap(denominator.text(s))),
    ))
}

/// Expand reciprocal and inverse-reciprocal placeholders, rightmost first
fn expand_placeholders(input: &str) -> String {
    let mut s = input.to_string();
    loop {
        let found = PLACEHOLDERS
            .iter()
            .filter_map(|placeholder| s.rfind(placeholder.name).map(|at| (at, placeholder)))
            .max_by_key(|(at, _)| *at);
        let Some((at, placeholder)) = found else {
            break;
        };
        let after = at + placeholder.name.len();
        let open = skip_ws(&s, after);
        let call = matches!(s.as_bytes().get(open), Some(b'(') | Some(b'{'))
            .then(|| find_matching(&s, open))
            .flatten();
        let (end, replacement) = match call {
            Some(close) => (close + 1, render_placeholder(placeholder, Some(&s[open + 1..close]))),
            None => (after, render_placeholder(placeholder, None)),
        };
        s.replace_range(at..end, &replacement);
    }
    s
}

fn render_placeholder(placeholder: &Placeholder, argument: Option<&str>) -> String {
    let function = placeholder.function;
    match (placeholder.inverse, argument) {
        (false, Some(arg)) => format!("(1/{}({}))", function, arg),
        (false, None) => format!("(1/{})", function),
        (true, Some(arg)) => format!("{}(1/{})", function, wrap(arg)),
        (true, None) => function.to_string(),
    }
}

/// Braces and brackets become parentheses; whitespace collapses
fn flatten_groups(input: &str) -> String {
    let joined = ADJACENT_GROUPS.replace_all(input, ")*(");
    let parens: String = joined
        .chars()
        .map(|c| match c {
            '{' | '[' => '(',
            '}' | ']' => ')',
            c => c,
        })
        .collect();
    WHITESPACE.replace_all(&parens, " ").trim().to_string()
}
