//! Calculator engine.
//!
//! This module provides functionality to:
//! - Accumulate keypad tokens into an expression
//! - Validate an expression's characters and parentheses
//! - Evaluate expressions with a dedicated arithmetic parser

mod buffer;
mod error;
mod evaluation;
mod validation;

pub use buffer::{EMPTY_DISPLAY, TokenBuffer};
pub use error::{CalcError, ErrorKind};
pub use evaluation::{compute, evaluate, format_result};
pub use validation::{is_valid, validate};
