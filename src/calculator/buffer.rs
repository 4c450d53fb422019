//! The in-progress expression typed on the keypad.

/// Multi-character tokens emitted by the function keys.
///
/// Backspace removes these as a single unit. Sorted longest first so that
/// `1/Math.sin(` is not mistaken for a trailing `Math.sin(`.
/// A `1/` prefix only belongs to the token when it does not continue a number.
const FUNCTION_TOKENS: &[&str] = &[
    "1/Math.sin(",
    "1/Math.cos(",
    "1/Math.tan(",
    "Math.log10(",
    "Math.sqrt(",
    "Math.sin(",
    "Math.cos(",
    "Math.tan(",
    "1/sin(",
    "1/cos(",
    "1/tan(",
    "log10(",
    "sqrt(",
    "sin(",
    "cos(",
    "tan(",
];

const RECIPROCAL: &str = "1/";

/// Placeholder shown when nothing has been typed yet.
pub const EMPTY_DISPLAY: &str = "0";

/// Append-only, backspace-editable expression text.
///
/// No validation happens here; the validator runs before evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    expression: String,
}

impl TokenBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a keypad token to the end of the expression.
    pub fn append(&mut self, token: &str) {
        self.expression.push_str(token);
    }

    /// Remove the trailing token.
    ///
    /// A trailing function prefix such as `sqrt(` goes in one step;
    /// anything else loses exactly one character. In `21/sin(` the `1/`
    /// is part of the typed number, so only `sin(` is removed.
    pub fn backspace(&mut self) {
        if let Some(token) = FUNCTION_TOKENS
            .iter()
            .find(|token| self.expression.ends_with(*token))
        {
            let mut remove = token.len();
            let before = &self.expression[..self.expression.len() - remove];
            if token.starts_with(RECIPROCAL)
                && before.ends_with(|c: char| c.is_ascii_digit() || c == '.')
            {
                remove -= RECIPROCAL.len();
            }
            let keep = self.expression.len() - remove;
            self.expression.truncate(keep);
        } else {
            self.expression.pop();
        }
    }

    /// Drop the whole expression.
    pub fn clear(&mut self) {
        self.expression.clear();
    }

    /// Replace the expression with a computed result so the user can keep
    /// calculating from it.
    pub fn reset_to(&mut self, result: &str) {
        self.set(result);
    }

    /// Replace the expression wholesale (e.g. when recalling history).
    pub fn set(&mut self, expression: &str) {
        self.expression.clear();
        self.expression.push_str(expression);
    }

    /// The raw expression, empty when nothing has been typed.
    pub fn as_str(&self) -> &str {
        &self.expression
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// Text to display: the expression, or `"0"` when empty.
    pub fn current(&self) -> &str {
        if self.expression.is_empty() {
            EMPTY_DISPLAY
        } else {
            &self.expression
        }
    }
}
