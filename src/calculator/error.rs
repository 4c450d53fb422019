//! Error taxonomy for the calculator engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error-kind tag exposed to the front end.
///
/// The front end maps these to localized text; the core never produces
/// user-facing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The expression contains a character outside the accepted set.
    TypeError,
    /// Unbalanced parentheses or malformed syntax.
    InvalidExpression,
    /// The expression evaluated to NaN or an infinity.
    InvalidResult,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("illegal character {ch:?} at position {position}")]
    IllegalCharacter { ch: char, position: usize },

    #[error("unmatched ')' at position {position}")]
    UnmatchedClose { position: usize },

    #[error("{open} unclosed '('")]
    UnclosedParen { open: usize },

    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("result is not a finite number: {0}")]
    NonFinite(f64),
}

impl CalcError {
    /// Classify this error for the front end.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalCharacter { .. } => ErrorKind::TypeError,
            Self::UnmatchedClose { .. } | Self::UnclosedParen { .. } | Self::Syntax { .. } => {
                ErrorKind::InvalidExpression
            }
            Self::NonFinite(_) => ErrorKind::InvalidResult,
        }
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = CalcError::IllegalCharacter { ch: 'x', position: 2 };
        assert_eq!(err.kind(), ErrorKind::TypeError);

        let err = CalcError::UnclosedParen { open: 1 };
        assert_eq!(err.kind(), ErrorKind::InvalidExpression);

        let err = CalcError::syntax(0, "unexpected end of input");
        assert_eq!(err.kind(), ErrorKind::InvalidExpression);

        let err = CalcError::NonFinite(f64::INFINITY);
        assert_eq!(err.kind(), ErrorKind::InvalidResult);
    }

    #[test]
    fn test_error_display() {
        let err = CalcError::IllegalCharacter { ch: 'x', position: 2 };
        assert_eq!(err.to_string(), "illegal character 'x' at position 2");

        let err = CalcError::UnmatchedClose { position: 5 };
        assert_eq!(err.to_string(), "unmatched ')' at position 5");

        let err = CalcError::UnclosedParen { open: 2 };
        assert_eq!(err.to_string(), "2 unclosed '('");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::InvalidResult).unwrap();
        assert_eq!(json, "\"InvalidResult\"");
    }
}
