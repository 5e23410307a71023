//! Structural checks over the raw input
//!
//! Every issue the strict mode can raise is found here, in one pass over the
//! lexed source, so that offsets always point into the caller's text. The
//! later stages never fail; in lenient mode they simply work around whatever
//! this pass reported.

use crate::utils::error::TranslateError;

use super::engine::lexer::tokenize;
use super::engine::token::{Spanned, TexToken};
use super::engine::utils::{find_matching, read_argument, read_optional, skip_ws};
use super::functions::{command, Command};

/// An opened delimiter waiting for its partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Brace,
    EscapedBrace,
    Paren,
    Bracket,
    Left,
}

impl Open {
    fn describe(self) -> &'static str {
        match self {
            Open::Brace => "`{`",
            Open::EscapedBrace => "`\\{`",
            Open::Paren => "`(`",
            Open::Bracket => "`[`",
            Open::Left => "`\\left`",
        }
    }
}

/// Outcome of looking for a macro argument
enum Probe {
    Present(usize),
    /// `{}` with nothing but whitespace inside
    Empty,
    Missing,
    /// A `{` or `[` that never closes; the delimiter check reports it
    Unbalanced,
}

fn probe_argument(input: &str, pos: usize) -> Probe {
    match read_argument(input, pos) {
        Some(arg) if arg.braced && arg.text(input).trim().is_empty() => Probe::Empty,
        Some(arg) => Probe::Present(arg.end),
        None => {
            let start = skip_ws(input, pos);
            if input.as_bytes().get(start) == Some(&b'{') && find_matching(input, start).is_none() {
                Probe::Unbalanced
            } else {
                Probe::Missing
            }
        }
    }
}

/// Index of the next token that is not whitespace or a comment
fn next_significant(tokens: &[Spanned], from: usize) -> Option<usize> {
    (from..tokens.len())
        .find(|&j| !matches!(tokens[j].token, TexToken::Space | TexToken::Comment(_)))
}

/// Like [`next_significant`], but spacing commands are skipped too
fn next_operand(tokens: &[Spanned], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| match &tokens[j].token {
        TexToken::Space | TexToken::Comment(_) | TexToken::ActiveChar(_) => false,
        TexToken::ControlSeq(name) => !matches!(command(name), Some(Command::Spacing)),
        _ => true,
    })
}

/// Index of the previous token that is not whitespace or a comment
fn prev_significant(tokens: &[Spanned], before: usize) -> Option<usize> {
    (0..before)
        .rev()
        .find(|&j| !matches!(tokens[j].token, TexToken::Space | TexToken::Comment(_)))
}

/// Whether a token can be raised to a power
fn is_exponent_base(token: &TexToken) -> bool {
    match token {
        TexToken::Char(c) => c.is_alphanumeric() || ")]|.'!".contains(*c),
        TexToken::EndGroup => true,
        TexToken::ControlSeq(name) => {
            token.is_control_word() && !matches!(command(name), Some(Command::Spacing))
        }
        _ => false,
    }
}

/// Whether a token can start an exponent
fn is_exponent_start(token: &TexToken) -> bool {
    match token {
        TexToken::Char(c) => c.is_alphanumeric() || *c == '(',
        TexToken::BeginGroup => true,
        TexToken::ControlSeq(name) => {
            token.is_control_word() && !matches!(command(name), Some(Command::Spacing))
        }
        _ => false,
    }
}

/// Characters the target grammar can carry through
fn is_carried(c: char) -> bool {
    c.is_ascii_alphanumeric() || ".+-*/()[]|,".contains(c)
}

fn is_sign(token: &TexToken) -> bool {
    match token {
        TexToken::Char(c) => *c == '+' || *c == '-',
        TexToken::ControlSeq(name) => {
            matches!(command(name), Some(Command::PlusMinus | Command::MinusPlus))
        }
        _ => false,
    }
}

/// Delimiter accepted after `\left` / `\right`
fn is_sized_delimiter(token: &TexToken) -> bool {
    match token {
        TexToken::Char(c) => "()[]|.".contains(*c),
        TexToken::ControlSeq(name) => name == "{" || name == "}",
        _ => false,
    }
}

struct Validator<'a> {
    input: &'a str,
    tokens: Vec<Spanned>,
    stack: Vec<(Open, usize)>,
    bars: Vec<usize>,
    issues: Vec<TranslateError>,
}

impl<'a> Validator<'a> {
    fn new(input: &'a str) -> Self {
        Validator {
            input,
            tokens: tokenize(input),
            stack: Vec::new(),
            bars: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn open(&mut self, kind: Open, offset: usize) {
        self.stack.push((kind, offset));
    }

    fn close(&mut self, kind: Open, offset: usize, fragment: &str) {
        if !self.stack.iter().any(|(open, _)| *open == kind) {
            self.issues.push(TranslateError::malformed(
                offset,
                fragment,
                format!("`{}` closes nothing", fragment),
            ));
            return;
        }
        while let Some((open, at)) = self.stack.pop() {
            if open == kind {
                break;
            }
            self.issues.push(TranslateError::malformed(
                at,
                self.fragment_at(at),
                format!("{} is never closed", open.describe()),
            ));
        }
    }

    /// Source text of the token starting at `offset`
    fn fragment_at(&self, offset: usize) -> String {
        self.tokens
            .iter()
            .find(|t| t.offset == offset)
            .map(|t| t.token.to_string())
            .unwrap_or_default()
    }

    fn check_sized(&mut self, idx: usize, name: &str) -> usize {
        let offset = self.tokens[idx].offset;
        let delim = next_significant(&self.tokens, idx + 1)
            .filter(|&j| is_sized_delimiter(&self.tokens[j].token));
        let Some(j) = delim else {
            self.issues.push(TranslateError::malformed(
                offset,
                format!("\\{}", name),
                format!("`\\{}` has no delimiter", name),
            ));
            return idx;
        };
        let fragment = format!("\\{}{}", name, self.tokens[j].token);
        if name == "left" {
            self.open(Open::Left, offset);
        } else {
            self.close(Open::Left, offset, &fragment);
        }
        j
    }

    fn check_fraction(&mut self, offset: usize, name: &str) {
        let mut pos = offset + 1 + name.len();
        for _ in 0..2 {
            match probe_argument(self.input, pos) {
                Probe::Present(end) => pos = end,
                Probe::Unbalanced => return,
                Probe::Empty => {
                    self.issues.push(TranslateError::malformed(
                        offset,
                        format!("\\{}", name),
                        format!("`\\{}` has an empty argument", name),
                    ));
                    return;
                }
                Probe::Missing => {
                    self.issues.push(TranslateError::malformed(
                        offset,
                        format!("\\{}", name),
                        format!("`\\{}` expects two arguments", name),
                    ));
                    return;
                }
            }
        }
    }

    fn check_root(&mut self, offset: usize) {
        let mut pos = offset + "\\sqrt".len();
        let start = skip_ws(self.input, pos);
        if self.input.as_bytes().get(start) == Some(&b'[') {
            match read_optional(self.input, start) {
                Some(opt) if opt.text(self.input).trim().is_empty() => {
                    self.issues.push(TranslateError::malformed(
                        offset,
                        "\\sqrt",
                        "`\\sqrt` has an empty index",
                    ));
                    return;
                }
                Some(opt) => pos = opt.end,
                None => return,
            }
        }
        let message = match probe_argument(self.input, pos) {
            Probe::Missing => "`\\sqrt` expects an argument",
            Probe::Empty => "`\\sqrt` has an empty argument",
            Probe::Present(_) | Probe::Unbalanced => return,
        };
        self.issues.push(TranslateError::malformed(offset, "\\sqrt", message));
    }

    /// Whether the token at `j` can begin a function argument
    fn opens_argument(&self, j: usize) -> bool {
        match &self.tokens[j].token {
            TexToken::Char(c) => c.is_alphanumeric() || "([|.".contains(*c),
            TexToken::BeginGroup => next_operand(&self.tokens, j + 1)
                .is_some_and(|k| self.tokens[k].token != TexToken::EndGroup),
            TexToken::ControlSeq(name) => match command(name) {
                Some(Command::Operator(_)) => false,
                Some(Command::Structural) => name != "right" && name != "}",
                _ => true,
            },
            _ => false,
        }
    }

    /// Token index just past the operand of the script at `idx`
    fn skip_script(&self, idx: usize) -> Option<usize> {
        let j = next_operand(&self.tokens, idx + 1)?;
        if self.tokens[j].token != TexToken::BeginGroup {
            return Some(j + 1);
        }
        let mut depth = 0usize;
        for k in j..self.tokens.len() {
            match self.tokens[k].token {
                TexToken::BeginGroup => depth += 1,
                TexToken::EndGroup => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(k + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// `\sin`, `\sec` and `\log` need something to apply to, past any
    /// `^{n}` or `_{b}` and an optional sign
    fn check_function(&mut self, idx: usize, name: &str) {
        let mut next = next_operand(&self.tokens, idx + 1);
        while let Some(j) = next.filter(|&j| {
            matches!(self.tokens[j].token, TexToken::Superscript | TexToken::Subscript)
        }) {
            // An empty script is reported by the script checks
            let Some(end) = self.skip_script(j) else {
                return;
            };
            next = next_operand(&self.tokens, end);
        }
        if let Some(j) = next.filter(|&j| is_sign(&self.tokens[j].token)) {
            next = next_operand(&self.tokens, j + 1);
        }
        if next.is_some_and(|j| self.opens_argument(j)) {
            return;
        }
        self.issues.push(TranslateError::malformed(
            self.tokens[idx].offset,
            format!("\\{}", name),
            format!("`\\{}` expects an argument", name),
        ));
    }

    /// Only `\log_{b}` has a meaning; any other subscript has no target form
    fn check_subscript(&mut self, idx: usize) {
        let offset = self.tokens[idx].offset;
        let after_log = prev_significant(&self.tokens, idx).is_some_and(
            |p| matches!(&self.tokens[p].token, TexToken::ControlSeq(name) if name == "log"),
        );
        if after_log {
            if let Probe::Missing | Probe::Empty = probe_argument(self.input, offset + 1) {
                self.issues.push(TranslateError::malformed(
                    offset,
                    "\\log_",
                    "`\\log_` expects a base",
                ));
            }
            return;
        }
        let end = read_argument(self.input, offset + 1)
            .map(|arg| arg.end)
            .unwrap_or(offset + 1);
        let fragment = self.input[offset..end].to_string();
        self.issues.push(TranslateError::unsupported(offset, fragment));
    }

    fn check_exponent(&mut self, idx: usize) {
        let offset = self.tokens[idx].offset;
        let prev = prev_significant(&self.tokens, idx);
        let next = next_significant(&self.tokens, idx + 1);

        let has_base = prev.is_some_and(|p| is_exponent_base(&self.tokens[p].token));
        let mut has_exponent = next.is_some_and(|n| is_exponent_start(&self.tokens[n].token));
        if let Some(n) = next {
            if self.tokens[n].token == TexToken::BeginGroup {
                let body = next_significant(&self.tokens, n + 1);
                has_exponent = body.is_some_and(|b| self.tokens[b].token != TexToken::EndGroup);
            }
        }

        if !has_base || !has_exponent {
            let start = prev.map(|p| self.tokens[p].offset).unwrap_or(offset);
            let end = next
                .map(|n| self.tokens[n].offset + self.tokens[n].token.to_string().len())
                .unwrap_or(offset + 1)
                .min(self.input.len());
            let fragment = self.input.get(start..end).unwrap_or("^");
            self.issues.push(TranslateError::exponent(offset, fragment));
        }
    }

    fn run(mut self) -> Vec<TranslateError> {
        let mut i = 0;
        while i < self.tokens.len() {
            let offset = self.tokens[i].offset;
            match self.tokens[i].token.clone() {
                TexToken::ControlSeq(name) => match name.as_str() {
                    "left" | "right" => i = self.check_sized(i, &name),
                    "{" => self.open(Open::EscapedBrace, offset),
                    "}" => self.close(Open::EscapedBrace, offset, "\\}"),
                    "frac" | "dfrac" | "tfrac" => self.check_fraction(offset, &name),
                    "sqrt" => self.check_root(offset),
                    _ if command(&name).is_none() => {
                        self.issues.push(TranslateError::unknown(offset, name));
                    }
                    _ if matches!(
                        command(&name),
                        Some(Command::Function(_) | Command::Reciprocal(_) | Command::Log)
                    ) =>
                    {
                        self.check_function(i, &name)
                    }
                    _ => {}
                },
                TexToken::BeginGroup => self.open(Open::Brace, offset),
                TexToken::EndGroup => self.close(Open::Brace, offset, "}"),
                TexToken::Char('(') => self.open(Open::Paren, offset),
                TexToken::Char(')') => self.close(Open::Paren, offset, ")"),
                TexToken::Char('[') => self.open(Open::Bracket, offset),
                TexToken::Char(']') => self.close(Open::Bracket, offset, "]"),
                TexToken::Char('|') => self.bars.push(offset),
                TexToken::Char('\\') => self.issues.push(TranslateError::unknown(offset, "")),
                TexToken::Char(c) if !is_carried(c) => {
                    self.issues.push(TranslateError::unsupported(offset, c.to_string()))
                }
                TexToken::Superscript => self.check_exponent(i),
                TexToken::Subscript => self.check_subscript(i),
                _ => {}
            }
            i += 1;
        }

        while let Some((open, at)) = self.stack.pop() {
            self.issues.push(TranslateError::malformed(
                at,
                self.fragment_at(at),
                format!("{} is never closed", open.describe()),
            ));
        }

        if self.bars.len() % 2 == 1 {
            if let Some(&last) = self.bars.last() {
                self.issues.push(TranslateError::malformed(
                    last,
                    "|",
                    "odd number of `|` bars",
                ));
            }
        }

        self.issues.sort_by_key(|issue| issue.offset());
        self.issues
    }
}

/// Every structural issue in `input`, ordered by offset
pub fn validate(input: &str) -> Vec<TranslateError> {
    Validator::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;

    fn kinds(input: &str) -> Vec<(ErrorKind, usize)> {
        validate(input)
            .into_iter()
            .map(|e| (e.kind(), e.offset()))
            .collect()
    }

    #[test]
    fn test_well_formed_inputs_pass() {
        for input in [
            r"\frac{\frac{a}{b}}{c}",
            r"\sqrt[3]{x} + \sqrt{y}",
            r"\left| x \right| + |y|",
            r"\left\{ x \right\}",
            r"\sin^{-1}x + \cos^2 y",
            r"e^{x+1} \cdot 2\pi r",
            r"\frac12 + x^2",
            r"\left( x \right)^2",
            "$x + y$",
            r"\log_{10} x + \log_2(y)",
            r"\sin -x + \cos^2 \, y",
            r"\ln\ln x",
        ] {
            assert_eq!(validate(input), vec![], "{}", input);
        }
    }

    #[test]
    fn test_odd_bars() {
        assert_eq!(kinds("|x|+|y"), vec![(ErrorKind::MalformedDelimiter, 4)]);
    }

    #[test]
    fn test_unbalanced_braces() {
        assert_eq!(kinds("{x+1"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds("x+1}"), vec![(ErrorKind::MalformedDelimiter, 3)]);
    }

    #[test]
    fn test_inner_unclosed_paren_is_blamed() {
        assert_eq!(kinds("{(x}"), vec![(ErrorKind::MalformedDelimiter, 1)]);
    }

    #[test]
    fn test_left_without_right() {
        assert_eq!(kinds(r"\left( x"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"x \right)"), vec![(ErrorKind::MalformedDelimiter, 2)]);
        assert_eq!(kinds(r"\left x \right)"), vec![
            (ErrorKind::MalformedDelimiter, 0),
            (ErrorKind::MalformedDelimiter, 8),
        ]);
    }

    #[test]
    fn test_unknown_control_sequence() {
        let issues = validate(r"x + \alpha");
        assert_eq!(issues, vec![TranslateError::unknown(4, "alpha")]);
        assert_eq!(kinds(r"\sinx"), vec![(ErrorKind::UnknownControlSequence, 0)]);
    }

    #[test]
    fn test_fraction_arguments() {
        assert_eq!(kinds(r"\frac{a}"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"\sqrt"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        // Unclosed group is reported once, at the brace
        assert_eq!(kinds(r"\frac{a"), vec![(ErrorKind::MalformedDelimiter, 5)]);
    }

    #[test]
    fn test_empty_arguments() {
        assert_eq!(kinds(r"\sqrt{}"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"\frac{}{}"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"1+\frac{a}{ }"), vec![(ErrorKind::MalformedDelimiter, 2)]);
        assert_eq!(kinds(r"\sqrt[]{x}"), vec![(ErrorKind::MalformedDelimiter, 0)]);
    }

    #[test]
    fn test_function_without_argument() {
        assert_eq!(kinds(r"\sin"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"\sin^2"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"x+\cos)"), vec![
            (ErrorKind::MalformedDelimiter, 2),
            (ErrorKind::MalformedDelimiter, 6),
        ]);
        assert_eq!(kinds(r"\sin{} x"), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"\sin - "), vec![(ErrorKind::MalformedDelimiter, 0)]);
        assert_eq!(kinds(r"\tan\cdot x"), vec![(ErrorKind::MalformedDelimiter, 0)]);
    }

    #[test]
    fn test_unsupported_notation() {
        assert_eq!(
            validate("x_1 + y"),
            vec![TranslateError::unsupported(1, "_1")]
        );
        assert_eq!(
            validate("a_{ij}"),
            vec![TranslateError::unsupported(1, "_{ij}")]
        );
        assert_eq!(validate("3!"), vec![TranslateError::unsupported(1, "!")]);
        assert_eq!(validate("x'"), vec![TranslateError::unsupported(1, "'")]);
        assert_eq!(kinds("y = x"), vec![(ErrorKind::UnsupportedNotation, 2)]);
        assert_eq!(kinds("\u{E000}sec x"), vec![(ErrorKind::UnsupportedNotation, 0)]);
    }

    #[test]
    fn test_log_base() {
        assert_eq!(kinds(r"\log_{} x"), vec![(ErrorKind::MalformedDelimiter, 4)]);
        assert_eq!(kinds(r"\log_{10}"), vec![(ErrorKind::MalformedDelimiter, 0)]);
    }

    #[test]
    fn test_exponent_targets() {
        assert_eq!(kinds("x^"), vec![(ErrorKind::AmbiguousExponentTarget, 1)]);
        assert_eq!(kinds("^2"), vec![(ErrorKind::AmbiguousExponentTarget, 0)]);
        assert_eq!(kinds("x^{}"), vec![(ErrorKind::AmbiguousExponentTarget, 1)]);
        assert_eq!(kinds("x^+1"), vec![(ErrorKind::AmbiguousExponentTarget, 1)]);
        assert_eq!(
            validate("(^2)"),
            vec![TranslateError::exponent(1, "(^2")]
        );
    }
}
