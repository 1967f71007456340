use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Supported UI languages, identified by stable codes.
///
/// Display names are never used as keys; they come from the translation
/// files through [`Language::translation_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    De,
    Es,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::De, Language::Es];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Es => "es",
        }
    }

    pub fn translation_key(self) -> &'static str {
        match self {
            Language::En => "languageList.english",
            Language::De => "languageList.german",
            Language::Es => "languageList.spanish",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Unknown or missing codes fall back to English.
    pub fn from_code_or_default(code: Option<&str>) -> Self {
        code.and_then(Self::from_code).unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| CoreError::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_parse() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert_eq!("DE".parse::<Language>().unwrap(), Language::De);
    }

    #[test]
    fn display_text_is_not_a_code() {
        assert!("English".parse::<Language>().is_err());
        assert_eq!(Language::from_code("Deutsch"), None);
    }

    #[test]
    fn unknown_falls_back_to_english() {
        assert_eq!(Language::from_code_or_default(Some("fr")), Language::En);
        assert_eq!(Language::from_code_or_default(None), Language::En);
        assert_eq!(Language::from_code_or_default(Some("es")), Language::Es);
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::De).unwrap(), "\"de\"");
        let lang: Language = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(lang, Language::Es);
    }

    #[test]
    fn translation_keys() {
        assert_eq!(Language::Es.translation_key(), "languageList.spanish");
    }
}
