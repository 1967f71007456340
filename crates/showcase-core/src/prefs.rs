use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::language::Language;

/// Small persisted key-value preferences.
///
/// Stored as `{"lang": "de", "isFirstLoaded": true}`. The language is kept
/// as the raw stored code so an unknown value survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    pub is_first_loaded: bool,
}

impl Preferences {
    /// Returns defaults if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse preferences: {}", path.display()))
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write preferences: {}", path.display()))?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "showcase", "car-showcase") {
            proj_dirs.config_dir().join("prefs.json")
        } else {
            PathBuf::from(".car-showcase-prefs.json")
        }
    }

    pub fn has_language(&self) -> bool {
        self.lang.as_deref().is_some_and(|code| !code.is_empty())
    }

    pub fn language(&self) -> Language {
        match self.lang.as_deref() {
            Some(code) => Language::from_code(code).unwrap_or_else(|| {
                warn!("Stored language {code:?} is not supported, using en");
                Language::default()
            }),
            None => Language::default(),
        }
    }

    pub fn set_language(&mut self, lang: Language) {
        self.lang = Some(lang.code().to_string());
    }

    /// Whether the first-launch tooltip should show. Marks the launch as
    /// seen, so this returns `true` at most once per preferences file.
    pub fn take_first_launch(&mut self) -> bool {
        let first = !self.is_first_loaded;
        self.is_first_loaded = true;
        first
    }
}

/// Where the app goes after the splash screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartScreen {
    LanguageSelect,
    Showcase,
}

impl StartScreen {
    pub fn for_prefs(prefs: &Preferences) -> Self {
        if prefs.has_language() {
            StartScreen::Showcase
        } else {
            StartScreen::LanguageSelect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load_from(dir.path().join("prefs.json")).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(StartScreen::for_prefs(&prefs), StartScreen::LanguageSelect);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");
        let mut prefs = Preferences::default();
        prefs.set_language(Language::De);
        prefs.take_first_launch();
        prefs.save_to(&path).unwrap();

        let loaded = Preferences::load_from(&path).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.language(), Language::De);
        assert_eq!(StartScreen::for_prefs(&loaded), StartScreen::Showcase);
    }

    #[test]
    fn stored_keys() {
        let mut prefs = Preferences::default();
        prefs.set_language(Language::Es);
        prefs.is_first_loaded = true;
        let value = serde_json::to_value(&prefs).unwrap();
        assert_eq!(value["lang"], "es");
        assert_eq!(value["isFirstLoaded"], true);
    }

    #[test]
    fn unknown_code_falls_back_but_is_kept() {
        let prefs: Preferences = serde_json::from_str(r#"{"lang": "fr"}"#).unwrap();
        assert_eq!(prefs.language(), Language::En);
        assert_eq!(prefs.lang.as_deref(), Some("fr"));
        assert_eq!(StartScreen::for_prefs(&prefs), StartScreen::Showcase);
    }

    #[test]
    fn empty_code_is_not_a_selection() {
        let prefs: Preferences = serde_json::from_str(r#"{"lang": ""}"#).unwrap();
        assert_eq!(StartScreen::for_prefs(&prefs), StartScreen::LanguageSelect);
    }

    #[test]
    fn first_launch_is_taken_once() {
        let mut prefs = Preferences::default();
        assert!(prefs.take_first_launch());
        assert!(!prefs.take_first_launch());
        assert!(prefs.is_first_loaded);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();
        assert!(Preferences::load_from(&path).is_err());
    }
}
