//! Minimal reference evaluator for translated expressions
//!
//! Understands exactly the target grammar: `+ - * / ^`, parentheses,
//! decimal numerals, single-letter variables, the standard function names
//! and the constants `pi`, `e`, `Infinity`. `^` is right-associative and
//! binds tighter than unary minus.

use std::collections::HashMap;

pub struct Evaluator<'a> {
    chars: Vec<char>,
    pos: usize,
    vars: &'a HashMap<char, f64>,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                value /= self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, String> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, String> {
        let base = self.atom()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expr()?;
                if !self.eat(')') {
                    return Err(format!("expected ')' at {}", self.pos));
                }
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.')
                {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                text.parse().map_err(|e| format!("bad number {}: {}", text, e))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
                    self.pos += 1;
                }
                let name: String = self.chars[start..self.pos].iter().collect();
                self.name(&name)
            }
            other => Err(format!("unexpected {:?} at {}", other, self.pos)),
        }
    }

    fn name(&mut self, name: &str) -> Result<f64, String> {
        match name {
            "pi" => return Ok(std::f64::consts::PI),
            "e" => return Ok(std::f64::consts::E),
            "Infinity" => return Ok(f64::INFINITY),
            _ => {}
        }
        let function: Option<fn(f64) -> f64> = match name {
            "sin" => Some(f64::sin),
            "cos" => Some(f64::cos),
            "tan" => Some(f64::tan),
            "asin" => Some(f64::asin),
            "acos" => Some(f64::acos),
            "atan" => Some(f64::atan),
            "log" => Some(f64::ln),
            "log10" => Some(f64::log10),
            "sqrt" => Some(f64::sqrt),
            "exp" => Some(f64::exp),
            "abs" => Some(f64::abs),
            _ => None,
        };
        if let Some(f) = function {
            if !self.eat('(') {
                return Err(format!("{} must be called", name));
            }
            let arg = self.expr()?;
            if !self.eat(')') {
                return Err(format!("unclosed call to {}", name));
            }
            return Ok(f(arg));
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .vars
                .get(&c)
                .copied()
                .ok_or_else(|| format!("unbound variable {}", c)),
            _ => Err(format!("unknown identifier {}", name)),
        }
    }
}

/// Evaluate `expression` with the given variable bindings
pub fn evaluate(expression: &str, vars: &HashMap<char, f64>) -> Result<f64, String> {
    let mut evaluator = Evaluator {
        chars: expression.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
        vars,
    };
    let value = evaluator.expr()?;
    if evaluator.pos != evaluator.chars.len() {
        return Err(format!(
            "trailing input at {} in `{}`",
            evaluator.pos, expression
        ));
    }
    Ok(value)
}

/// The fixed bindings used by the round-trip corpus: x = 1, y = 2
pub fn bindings() -> HashMap<char, f64> {
    HashMap::from([('x', 1.0), ('y', 2.0)])
}
