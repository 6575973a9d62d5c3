use crate::error::{Error, Result};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

const SENTINEL_LEVEL: &str = "default";
const MISSING_FALLBACK: [&str; 3] = ["error", "missing", "json"];
const MALFORMED_FALLBACK: [&str; 3] = ["json", "format", "error"];

#[derive(Deserialize)]
struct WordsFile
{
    #[serde(default)]
    levels: Map<String, Value>,
    #[serde(default)]
    default_level: Option<String>,
}

#[derive(Debug, Clone)]
struct Level
{
    name: String,
    words: Vec<String>,
}

/// Named word lists with a cursor on the level currently played.
#[derive(Debug, Clone)]
pub struct WordSource
{
    levels: Vec<Level>,
    current: usize,
}

impl WordSource
{
    /// Builds a source from `(level, words)` pairs, keeping their order.
    /// Levels without words are skipped.
    pub fn new<I, S, W>(levels: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<W>)>,
        S: Into<String>,
        W: Into<String>,
    {
        let levels = levels
            .into_iter()
            .map(|(name, words)| Level {
                name: name.into(),
                words: words.into_iter().map(Into::into).collect(),
            })
            .filter(|level| {
                if level.words.is_empty() {
                    warn!("Level '{}' has no words, skipping it", level.name);
                    false
                } else {
                    true
                }
            })
            .collect();
        Self { levels, current: 0 }
    }

    /// Loads the word configuration, falling back to a built-in catalog when
    /// the file is missing or malformed.
    pub fn load(path: &Path) -> Self
    {
        match Self::try_load(path) {
            Ok(source) => {
                info!("Loaded word configuration from {}", path.display());
                source
            }
            Err(err) if err.is_not_found() => {
                error!("Word configuration {} not found", path.display());
                Self::fallback(&MISSING_FALLBACK)
            }
            Err(err) => {
                error!("{err}");
                Self::fallback(&MALFORMED_FALLBACK)
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self>
    {
        let content = fs::read_to_string(path)?;
        let file: WordsFile = serde_json::from_str(&content).map_err(|err| Error::ConfigLoad {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut levels = Vec::with_capacity(file.levels.len());
        for (name, value) in file.levels {
            let words: Vec<String> = serde_json::from_value(value).map_err(|err| Error::ConfigLoad {
                path: path.to_path_buf(),
                reason: format!("level '{name}': {err}"),
            })?;
            levels.push((name, words));
        }

        let mut source = Self::new(levels);
        if source.levels.is_empty() {
            return Err(Error::ConfigLoad {
                path: path.to_path_buf(),
                reason: "no level contains any words".to_string(),
            });
        }
        let _ = source.set_level(file.default_level.as_deref().unwrap_or_default());
        Ok(source)
    }

    fn fallback(words: &[&str]) -> Self
    {
        Self::new([(SENTINEL_LEVEL, words.to_vec())])
    }

    pub fn current_level(&self) -> &str
    {
        self.levels
            .get(self.current)
            .map(|level| level.name.as_str())
            .unwrap_or(SENTINEL_LEVEL)
    }

    pub fn levels(&self) -> impl Iterator<Item = &str>
    {
        self.levels.iter().map(|level| level.name.as_str())
    }

    pub fn get_word(&self, rng: &mut impl Rng) -> Result<&str>
    {
        self.levels
            .get(self.current)
            .and_then(|level| level.words.choose(rng))
            .map(String::as_str)
            .ok_or(Error::EmptyCatalog)
    }

    pub fn cycle_level(&mut self) -> String
    {
        if self.levels.is_empty() {
            return SENTINEL_LEVEL.to_string();
        }
        self.current = (self.current + 1) % self.levels.len();
        self.current_level().to_string()
    }

    /// Switches to `name`. Unknown names are logged and leave the cursor
    /// where it was.
    pub fn set_level(&mut self, name: &str) -> Result<()>
    {
        match self.levels.iter().position(|level| level.name == name) {
            Some(index) => {
                self.current = index;
                Ok(())
            }
            None => {
                warn!("Level '{name}' not found");
                Err(Error::UnknownLevel(name.to_string()))
            }
        }
    }
}
