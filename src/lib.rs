//! A keypad-style arithmetic calculator.
//!
//! Tokens accumulate into an expression, which is validated and evaluated on
//! request. Successful results go into a bounded history that persists along
//! with theme and language preferences.

pub mod calculator;
pub mod config;
pub mod history;
pub mod preferences;
pub mod session;
pub mod storage;

pub use calculator::{CalcError, ErrorKind};
pub use history::{HISTORY_CAPACITY, HistoryEntry, HistoryStore};
pub use preferences::{Language, Preferences, Theme};
pub use session::{Notification, Session};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
