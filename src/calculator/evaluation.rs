//! Expression evaluation.
//!
//! A small recursive-descent evaluator over a fixed grammar: numbers,
//! `+ - * / %`, unary signs, parentheses, and the keypad's function calls.
//! Input is never executed as code.
//!
//! ```text
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/' | '%') unary)*
//! unary    := ('+' | '-') unary | primary
//! primary  := number | '(' expr ')' | function '(' expr ')'
//! function := ['Math' '.'] ('sin' | 'cos' | 'tan' | 'log10' | 'sqrt')
//! ```

use tracing::debug;

use super::error::CalcError;
use super::validation::validate;

/// Parentheses and unary signs deeper than this are rejected instead of
/// recursing further.
const MAX_DEPTH: usize = 256;

/// Functions available on the keypad. Trigonometry works in radians.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Sin,
    Cos,
    Tan,
    Log10,
    Sqrt,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "log10" => Some(Self::Log10),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Log10 => x.log10(),
            Self::Sqrt => x.sqrt(),
        }
    }
}

/// Evaluate an expression that has already passed validation.
///
/// Malformed input is reported as a syntax error, and a NaN or infinite
/// outcome as [`CalcError::NonFinite`].
pub fn evaluate(expr: &str) -> Result<f64, CalcError> {
    let mut parser = Parser::new(expr);
    let value = parser.parse_expr()?;

    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(CalcError::syntax(parser.pos, format!("unexpected {c:?}")));
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite(value))
    }
}

/// Validate, then evaluate.
pub fn compute(expr: &str) -> Result<f64, CalcError> {
    validate(expr)?;
    let result = evaluate(expr);
    debug!(expression = expr, ?result, "evaluated expression");
    result
}

/// Format a result so it can be shown and typed on from.
///
/// Uses the shortest decimal that round-trips, so feeding the string back to
/// [`evaluate`] yields the same value. Negative zero prints as `0`.
pub fn format_result(value: f64) -> String {
    if value == 0.0 {
        return String::from("0");
    }
    format!("{value}")
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Skip whitespace and return the next significant character.
    fn peek_token(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.peek()
    }

    fn expect(&mut self, expected: char) -> Result<(), CalcError> {
        match self.peek_token() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(CalcError::syntax(
                self.pos,
                format!("expected {expected:?}, found {c:?}"),
            )),
            None => Err(CalcError::syntax(
                self.pos,
                format!("expected {expected:?}, found end of input"),
            )),
        }
    }

    fn enter(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::syntax(self.pos, "expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expr(&mut self) -> Result<f64, CalcError> {
        let mut lhs = self.parse_term()?;

        while let Some(op @ ('+' | '-')) = self.peek_token() {
            self.bump();
            let rhs = self.parse_term()?;
            if op == '+' {
                lhs += rhs;
            } else {
                lhs -= rhs;
            }
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<f64, CalcError> {
        let mut lhs = self.parse_unary()?;

        while let Some(op @ ('*' | '/' | '%')) = self.peek_token() {
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = match op {
                '*' => lhs * rhs,
                '/' => lhs / rhs,
                _ => lhs % rhs,
            };
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<f64, CalcError> {
        match self.peek_token() {
            Some(sign @ ('+' | '-')) => {
                self.bump();
                self.enter()?;
                let operand = self.parse_unary();
                self.leave();
                let operand = operand?;
                Ok(if sign == '-' { -operand } else { operand })
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<f64, CalcError> {
        match self.peek_token() {
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some('(') => {
                self.bump();
                self.parse_group()
            }
            Some(c) if c.is_ascii_alphabetic() => self.parse_call(),
            Some(c) => Err(CalcError::syntax(self.pos, format!("unexpected {c:?}"))),
            None => Err(CalcError::syntax(self.pos, "unexpected end of input")),
        }
    }

    /// Parse the inside of a parenthesised group whose `(` was consumed.
    fn parse_group(&mut self) -> Result<f64, CalcError> {
        self.enter()?;
        let value = self.parse_expr();
        self.leave();
        let value = value?;
        self.expect(')')?;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        let mut seen_dot = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.bump();
            } else {
                break;
            }
        }

        let literal = &self.input[start..self.pos];
        if literal == "." {
            return Err(CalcError::syntax(start, "expected digits around '.'"));
        }

        literal
            .parse::<f64>()
            .map_err(|e| CalcError::syntax(start, format!("invalid number {literal:?}: {e}")))
    }

    fn parse_word(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.bump();
        }
        &input[start..self.pos]
    }

    fn parse_call(&mut self) -> Result<f64, CalcError> {
        let start = self.pos;
        let mut name = self.parse_word();

        if name == "Math" && self.peek() == Some('.') {
            self.bump();
            name = self.parse_word();
        }

        let function = Function::from_name(name)
            .ok_or_else(|| CalcError::syntax(start, format!("unknown function {name:?}")))?;

        self.expect('(')?;
        let argument = self.parse_group()?;
        Ok(function.apply(argument))
    }
}
