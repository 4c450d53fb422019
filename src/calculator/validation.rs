//! Pre-evaluation checks for calculator expressions.
//!
//! Two stages run in order: a character-set check, then a parenthesis
//! balance scan. The first failure wins.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::CalcError;

lazy_static! {
    /// Matches any character outside the calculator alphabet.
    /// Allowed: digits, whitespace, `. + - * / %`, parentheses, and the letters
    /// spelling `Math`, `sin`, `cos`, `tan`, `log10`, `sqrt`.
    static ref ILLEGAL_CHAR: Regex = Regex::new(
        r"[^0-9\s\.\+\-\*/%()Mathsincoglqr]"
    ).unwrap();
}

/// Check `expr` before handing it to the evaluator.
///
/// An empty string passes; callers decide what computing nothing means.
pub fn validate(expr: &str) -> Result<(), CalcError> {
    check_characters(expr)?;
    check_balance(expr)
}

/// Boolean form of [`validate`].
pub fn is_valid(expr: &str) -> bool {
    validate(expr).is_ok()
}

fn check_characters(expr: &str) -> Result<(), CalcError> {
    match ILLEGAL_CHAR.find(expr) {
        Some(m) => Err(CalcError::IllegalCharacter {
            ch: m.as_str().chars().next().unwrap_or_default(),
            position: m.start(),
        }),
        None => Ok(()),
    }
}

fn check_balance(expr: &str) -> Result<(), CalcError> {
    let mut balance: usize = 0;

    for (position, c) in expr.char_indices() {
        match c {
            '(' => balance += 1,
            ')' => {
                balance = balance
                    .checked_sub(1)
                    .ok_or(CalcError::UnmatchedClose { position })?;
            }
            _ => {}
        }
    }

    if balance == 0 {
        Ok(())
    } else {
        Err(CalcError::UnclosedParen { open: balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::ErrorKind;

    fn kind_of(expr: &str) -> Option<ErrorKind> {
        validate(expr).err().map(|e| e.kind())
    }

    #[test]
    fn test_plain_arithmetic_accepted() {
        assert!(is_valid("2+2"));
        assert!(is_valid("10 / 4"));
        assert!(is_valid("7%3"));
        assert!(is_valid("(1+2)*(3-4)"));
        assert!(is_valid("((0.5))"));
        assert!(is_valid("-3.25*-2"));
    }

    #[test]
    fn test_function_tokens_accepted() {
        assert!(is_valid("sin(0)"));
        assert!(is_valid("1/cos(1)"));
        assert!(is_valid("Math.log10(100)"));
        assert!(is_valid("1/Math.tan(2)+Math.sqrt(9)"));
    }

    #[test]
    fn test_empty_accepted() {
        assert!(is_valid(""));
    }

    #[test]
    fn test_illegal_characters() {
        assert_eq!(kind_of("2^3"), Some(ErrorKind::TypeError));
        assert_eq!(kind_of("alert(1)"), Some(ErrorKind::TypeError));
        assert_eq!(kind_of("x+1"), Some(ErrorKind::TypeError));
        assert_eq!(kind_of("1,5"), Some(ErrorKind::TypeError));
        assert_eq!(kind_of("2×3"), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_illegal_character_position() {
        assert_eq!(
            validate("12+y"),
            Err(CalcError::IllegalCharacter { ch: 'y', position: 3 })
        );
    }

    #[test]
    fn test_character_check_takes_precedence() {
        // Both unbalanced and illegal: the character error is reported.
        assert_eq!(kind_of("(2+e"), Some(ErrorKind::TypeError));
        assert_eq!(kind_of("2)+p"), Some(ErrorKind::TypeError));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(kind_of("(2+3))"), Some(ErrorKind::InvalidExpression));
        assert_eq!(kind_of("((2+3)"), Some(ErrorKind::InvalidExpression));
        assert_eq!(kind_of("sin("), Some(ErrorKind::InvalidExpression));
    }

    #[test]
    fn test_premature_close_rejected_even_if_counts_match() {
        assert_eq!(
            validate(")2+3("),
            Err(CalcError::UnmatchedClose { position: 0 })
        );
        assert_eq!(
            validate("(1))+((2)"),
            Err(CalcError::UnmatchedClose { position: 3 })
        );
    }

    #[test]
    fn test_unclosed_count() {
        assert_eq!(validate("((1"), Err(CalcError::UnclosedParen { open: 2 }));
    }

    #[test]
    fn test_letters_without_function_still_pass() {
        // Legal letters; the evaluator rejects the nonsense later.
        assert!(is_valid("ss(1)"));
        assert!(is_valid("Math"));
    }
}
