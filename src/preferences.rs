//! Theme and language preferences.
//!
//! Each preference lives under its own storage key and is written only when
//! it changes, independently of the history log.

use std::sync::Arc;

use tracing::warn;

use crate::storage::{LANGUAGE_KEY, Storage, THEME_KEY};

/// Colour palettes, cycled in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
    DarkBlue,
    DarkPurple,
    DarkGreen,
}

impl Theme {
    /// Number of available palettes.
    pub const COUNT: usize = 5;

    /// Get all available themes
    pub fn all() -> &'static [Theme] {
        &[
            Self::Light,
            Self::Dark,
            Self::DarkBlue,
            Self::DarkPurple,
            Self::DarkGreen,
        ]
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Self::Light => 0,
            Self::Dark => 1,
            Self::DarkBlue => 2,
            Self::DarkPurple => 3,
            Self::DarkGreen => 4,
        }
    }

    /// The palette after this one, wrapping around.
    pub fn next(self) -> Self {
        Self::all()[(self.index() + 1) % Self::COUNT]
    }

    /// Style class name the front end applies for this palette.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Light => "light-theme",
            Self::Dark => "dark-theme",
            Self::DarkBlue => "dark-theme-blue",
            Self::DarkPurple => "dark-theme-purple",
            Self::DarkGreen => "dark-theme-green",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    English,
    #[default]
    Indonesian,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Indonesian => "id",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::English),
            "id" => Some(Self::Indonesian),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::English => Self::Indonesian,
            Self::Indonesian => Self::English,
        }
    }
}

/// Current theme and language, backed by storage.
pub struct Preferences {
    theme: Theme,
    language: Language,
    storage: Arc<dyn Storage>,
}

impl Preferences {
    /// Load preferences, falling back to defaults for anything missing or
    /// unrecognised.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let theme = read(storage.as_ref(), THEME_KEY)
            .and_then(|raw| {
                let theme = raw
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(Theme::from_index);
                if theme.is_none() {
                    warn!("Ignoring unknown theme index {:?}", raw);
                }
                theme
            })
            .unwrap_or_default();

        let language = read(storage.as_ref(), LANGUAGE_KEY)
            .and_then(|raw| {
                let language = Language::from_code(raw.trim());
                if language.is_none() {
                    warn!("Ignoring unknown language {:?}", raw);
                }
                language
            })
            .unwrap_or_default();

        Self {
            theme,
            language,
            storage,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Switch to the next theme and persist it.
    pub fn cycle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        write(self.storage.as_ref(), THEME_KEY, &self.theme.index().to_string());
        self.theme
    }

    /// Switch between the two languages and persist the choice.
    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggle();
        write(self.storage.as_ref(), LANGUAGE_KEY, self.language.code());
        self.language
    }
}

fn read(storage: &dyn Storage, key: &str) -> Option<String> {
    storage.get(key).unwrap_or_else(|e| {
        warn!("Failed to read {}: {}", key, e);
        None
    })
}

fn write(storage: &dyn Storage, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        warn!("Failed to save {}: {}", key, e);
    }
}
