//! Where dictionary source text comes from.
//!
//! A source is one of five JSON documents. Each may be absent: an absent
//! source contributes no entries and never fails the load.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::ConfigError;

/// Environment variable naming a directory that overrides the builtin sources.
pub const DICTIONARY_DIR_ENV: &str = "KETO_DICTIONARY_DIR";

/// The five dictionary documents, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionarySource {
    HighCarb,
    KetoFriendly,
    Substitutions,
    Negations,
    MenuTypes,
}

impl DictionarySource {
    pub const ALL: [DictionarySource; 5] = [
        DictionarySource::HighCarb,
        DictionarySource::KetoFriendly,
        DictionarySource::Substitutions,
        DictionarySource::Negations,
        DictionarySource::MenuTypes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DictionarySource::HighCarb => "high_carb",
            DictionarySource::KetoFriendly => "keto_friendly",
            DictionarySource::Substitutions => "substitutions",
            DictionarySource::Negations => "negations",
            DictionarySource::MenuTypes => "menu_types",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DictionarySource::HighCarb => "high_carb.json",
            DictionarySource::KetoFriendly => "keto_friendly.json",
            DictionarySource::Substitutions => "substitutions.json",
            DictionarySource::Negations => "negations.json",
            DictionarySource::MenuTypes => "menu_types.json",
        }
    }

    fn builtin_text(self) -> &'static str {
        match self {
            DictionarySource::HighCarb => include_str!("../../config/keto/high_carb.json"),
            DictionarySource::KetoFriendly => include_str!("../../config/keto/keto_friendly.json"),
            DictionarySource::Substitutions => include_str!("../../config/keto/substitutions.json"),
            DictionarySource::Negations => include_str!("../../config/keto/negations.json"),
            DictionarySource::MenuTypes => include_str!("../../config/keto/menu_types.json"),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Raw text of each dictionary source, prior to parsing.
#[derive(Debug, Clone, Default)]
pub struct DictionarySources {
    texts: [Option<String>; 5],
}

impl DictionarySources {
    /// No sources at all. Loads into an empty dictionary (regex defaults only).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The Korean/English dictionary compiled into the crate.
    pub fn builtin() -> Self {
        let mut sources = Self::empty();
        for source in DictionarySource::ALL {
            sources.texts[source.index()] = Some(source.builtin_text().to_string());
        }
        sources
    }

    /// Read `<dir>/<source>.json` for every source. Missing files are skipped.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut sources = Self::empty();
        for source in DictionarySource::ALL {
            let path = dir.join(source.file_name());
            match fs::read_to_string(&path) {
                Ok(text) => sources.texts[source.index()] = Some(text),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    warn!(source = source.name(), path = %path.display(), "dictionary source missing, using no entries");
                }
                Err(err) => return Err(ConfigError::Read { path, source: err }),
            }
        }
        info!(dir = %dir.display(), "read dictionary sources from directory");
        Ok(sources)
    }

    /// Use [`DICTIONARY_DIR_ENV`] when set, otherwise the builtin sources.
    pub fn from_env_or_builtin() -> Result<Self, ConfigError> {
        match std::env::var_os(DICTIONARY_DIR_ENV) {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::builtin()),
        }
    }

    /// Replace one source's text.
    pub fn with(mut self, source: DictionarySource, text: impl Into<String>) -> Self {
        self.texts[source.index()] = Some(text.into());
        self
    }

    /// Drop one source, as if its file were missing.
    pub fn without(mut self, source: DictionarySource) -> Self {
        self.texts[source.index()] = None;
        self
    }

    pub fn get(&self, source: DictionarySource) -> Option<&str> {
        self.texts[source.index()].as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_provides_every_source() {
        let sources = DictionarySources::builtin();
        for source in DictionarySource::ALL {
            assert!(sources.get(source).is_some(), "{} missing", source.name());
        }
    }

    #[test]
    fn from_dir_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("high_carb.json"), r#"{"밥": {"weight": -25}}"#).unwrap();

        let sources = DictionarySources::from_dir(dir.path()).unwrap();

        assert!(sources.get(DictionarySource::HighCarb).is_some());
        assert!(sources.get(DictionarySource::Negations).is_none());
    }

    #[test]
    fn from_dir_reports_unreadable_source() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where a file is expected cannot be read as text.
        fs::create_dir(dir.path().join("menu_types.json")).unwrap();

        let err = DictionarySources::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
