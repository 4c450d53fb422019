//! Application state for one calculator session.
//!
//! The front end forwards user actions here and renders the returned
//! [`Notification`]s; nothing in this module touches a UI directly.

use std::sync::Arc;

use tracing::debug;

use crate::calculator::{self, ErrorKind, TokenBuffer};
use crate::history::{HistoryEntry, HistoryStore};
use crate::preferences::{Language, Preferences, Theme};
use crate::storage::Storage;

/// Outbound messages for the front end, in the order they should be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// New text for the display (expression, result, or `"0"`).
    DisplayChanged(String),
    /// A compute attempt failed.
    Error(ErrorKind),
    /// A previously reported error no longer applies.
    ErrorCleared,
    /// The history log changed and should be re-rendered.
    HistoryChanged,
    ThemeChanged(Theme),
    LanguageChanged(Language),
}

pub struct Session {
    buffer: TokenBuffer,
    history: HistoryStore,
    preferences: Preferences,
    last_error: Option<ErrorKind>,
}

impl Session {
    /// Start a session, restoring history and preferences from `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let history = HistoryStore::load(Arc::clone(&storage));
        Self::with_history(history, storage)
    }

    /// Start a session around an already-loaded history store.
    pub fn with_history(history: HistoryStore, storage: Arc<dyn Storage>) -> Self {
        Self {
            buffer: TokenBuffer::new(),
            history,
            preferences: Preferences::load(storage),
            last_error: None,
        }
    }

    /// Add a keypad token to the expression.
    pub fn append(&mut self, token: &str) -> Vec<Notification> {
        self.buffer.append(token);
        self.edited()
    }

    /// Remove the trailing character or function token.
    pub fn backspace(&mut self) -> Vec<Notification> {
        self.buffer.backspace();
        self.edited()
    }

    /// Reset the display to `"0"`. History is kept.
    pub fn clear(&mut self) -> Vec<Notification> {
        self.buffer.clear();
        self.edited()
    }

    /// Validate and evaluate the current expression.
    ///
    /// On success the result is recorded in history and becomes the new
    /// expression. On failure the expression and history are left as they
    /// were so the user can fix the input and retry.
    pub fn compute(&mut self) -> Vec<Notification> {
        if self.buffer.is_empty() {
            return Vec::new();
        }

        let expression = self.buffer.as_str().to_string();
        match calculator::compute(&expression) {
            Ok(value) => {
                self.history.append(&expression, value);
                self.buffer.reset_to(&calculator::format_result(value));

                let mut notifications = self.take_error();
                notifications.push(Notification::HistoryChanged);
                notifications.push(self.display_changed());
                notifications
            }
            Err(e) => {
                debug!(expression = %expression, error = %e, "compute failed");
                let kind = e.kind();
                self.last_error = Some(kind);
                vec![Notification::Error(kind)]
            }
        }
    }

    /// History entries, newest first.
    pub fn history(&self) -> &[HistoryEntry] {
        self.history.all()
    }

    /// Empty the history log, leaving the display alone.
    pub fn clear_history(&mut self) -> Vec<Notification> {
        self.history.clear();
        vec![Notification::HistoryChanged]
    }

    /// Load the expression of history entry `index` back into the buffer.
    pub fn recall(&mut self, index: usize) -> Vec<Notification> {
        let Some(entry) = self.history.get(index) else {
            return Vec::new();
        };
        let expression = entry.expression.clone();
        self.buffer.set(&expression);
        self.edited()
    }

    /// Advance to the next theme and persist it.
    pub fn cycle_theme(&mut self) -> Vec<Notification> {
        vec![Notification::ThemeChanged(self.preferences.cycle_theme())]
    }

    /// Switch between English and Indonesian and persist it.
    pub fn toggle_language(&mut self) -> Vec<Notification> {
        vec![Notification::LanguageChanged(self.preferences.toggle_language())]
    }

    /// Text currently shown on the display.
    pub fn display(&self) -> &str {
        self.buffer.current()
    }

    /// The raw expression, empty when nothing has been typed.
    pub fn expression(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    fn edited(&mut self) -> Vec<Notification> {
        let mut notifications = self.take_error();
        notifications.push(self.display_changed());
        notifications
    }

    fn take_error(&mut self) -> Vec<Notification> {
        match self.last_error.take() {
            Some(_) => vec![Notification::ErrorCleared],
            None => Vec::new(),
        }
    }

    fn display_changed(&self) -> Notification {
        Notification::DisplayChanged(self.buffer.current().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn session() -> Session {
        Session::new(Arc::new(MemoryStorage::new()))
    }

    fn display(text: &str) -> Notification {
        Notification::DisplayChanged(text.to_string())
    }

    #[test]
    fn test_append_reports_display() {
        let mut session = session();
        assert_eq!(session.display(), "0");
        assert_eq!(session.append("1"), vec![display("1")]);
        assert_eq!(session.append("+"), vec![display("1+")]);
        assert_eq!(session.backspace(), vec![display("1")]);
        assert_eq!(session.clear(), vec![display("0")]);
    }

    #[test]
    fn test_compute_empty_is_noop() {
        let mut session = session();
        assert!(session.compute().is_empty());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_compute_success_records_and_chains() {
        let mut session = session();
        session.append("2+2");
        assert_eq!(
            session.compute(),
            vec![Notification::HistoryChanged, display("4")]
        );
        assert_eq!(session.expression(), "4");
        assert_eq!(session.history()[0].expression, "2+2");
        assert_eq!(session.history()[0].result, 4.0);

        session.append("*3");
        session.compute();
        assert_eq!(session.display(), "12");
        assert_eq!(session.history()[0].expression, "4*3");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_compute_failure_keeps_state() {
        let mut session = session();
        session.append("10/0");
        assert_eq!(
            session.compute(),
            vec![Notification::Error(ErrorKind::InvalidResult)]
        );
        assert_eq!(session.expression(), "10/0");
        assert!(session.history().is_empty());
        assert_eq!(session.last_error(), Some(ErrorKind::InvalidResult));
    }

    #[test]
    fn test_error_kinds() {
        let mut session = session();
        session.append("2^2");
        assert_eq!(
            session.compute(),
            vec![Notification::Error(ErrorKind::TypeError)]
        );

        session.clear();
        session.append("(2+3))");
        assert_eq!(
            session.compute(),
            vec![Notification::Error(ErrorKind::InvalidExpression)]
        );

        session.clear();
        session.append("sin()");
        assert_eq!(
            session.compute(),
            vec![Notification::Error(ErrorKind::InvalidExpression)]
        );
    }

    #[test]
    fn test_next_input_clears_error() {
        let mut session = session();
        session.append("1/0");
        session.compute();

        assert_eq!(
            session.backspace(),
            vec![Notification::ErrorCleared, display("1/")]
        );
        assert_eq!(session.last_error(), None);
        assert_eq!(session.append("2"), vec![display("1/2")]);
    }

    #[test]
    fn test_successful_compute_clears_error() {
        let mut session = session();
        session.append("(1");
        session.compute();
        // Fix the buffer behind the front end's back; the stale error
        // must still be withdrawn on success.
        session.buffer.append(")");
        assert_eq!(
            session.compute(),
            vec![
                Notification::ErrorCleared,
                Notification::HistoryChanged,
                display("1"),
            ]
        );
    }

    #[test]
    fn test_recall_history_entry() {
        let mut session = session();
        session.append("3*3");
        session.compute();
        session.clear();

        assert_eq!(session.recall(0), vec![display("3*3")]);
        assert_eq!(session.expression(), "3*3");
        assert!(session.recall(5).is_empty());
    }

    #[test]
    fn test_clear_history() {
        let mut session = session();
        session.append("1+1");
        session.compute();
        assert_eq!(session.clear_history(), vec![Notification::HistoryChanged]);
        assert!(session.history().is_empty());
        // Display is unaffected.
        assert_eq!(session.display(), "2");
    }

    #[test]
    fn test_preferences() {
        let mut session = session();
        assert_eq!(session.cycle_theme(), vec![Notification::ThemeChanged(Theme::Dark)]);
        assert_eq!(
            session.toggle_language(),
            vec![Notification::LanguageChanged(Language::English)]
        );
        assert_eq!(session.preferences().theme(), Theme::Dark);
    }
}
