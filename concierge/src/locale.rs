//! Supported locales and the prompt directory each one selects.
//!
//! Pure path composition: nothing here touches the disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("unsupported locale {0:?} (supported: en, ko, ja)")]
    Unsupported(String),
}

/// A supported prompt locale. Defaults to English.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
    Ja,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Ko, Locale::Ja];

    /// Two-letter code, also the directory name under the prompts root.
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ko => "ko",
            Locale::Ja => "ja",
        }
    }

    /// Directory holding this locale's prompt files.
    pub fn prompt_dir(self, root: &Path) -> PathBuf {
        root.join(self.code())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    /// Matches the primary subtag case-insensitively, so `ko-KR` and `ja_JP` resolve too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.trim().split(['-', '_']).next().unwrap_or_default();
        Locale::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(primary))
            .ok_or_else(|| LocaleError::Unsupported(s.to_string()))
    }
}

/// Resolves an optional language code. `None` or blank yields [`Locale::default`].
pub fn resolve(lang: Option<&str>) -> Result<Locale, LocaleError> {
    match lang.map(str::trim) {
        None | Some("") => Ok(Locale::default()),
        Some(code) => code.parse(),
    }
}
