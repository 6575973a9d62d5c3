use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreRecord
{
    pub accuracy: f64,
    pub perfect_words: u32,
}

impl ScoreRecord
{
    fn is_beaten_by(&self, accuracy: f64, perfect_words: u32) -> bool
    {
        accuracy > self.accuracy || (accuracy == self.accuracy && perfect_words > self.perfect_words)
    }
}

/// Best result per level and difficulty.
#[derive(Debug, Clone, Default)]
pub struct ScoreLedger
{
    path: Option<PathBuf>,
    records: BTreeMap<String, ScoreRecord>,
}

impl ScoreLedger
{
    /// Reads the ledger at `path`. An unreadable or corrupt file starts an
    /// empty ledger; its old records are overwritten on the next new best.
    pub fn load(path: impl Into<PathBuf>) -> Self
    {
        let path = path.into();
        let records = match read_records(&path) {
            Ok(records) => {
                debug!("Loaded {} score records from {}", records.len(), path.display());
                records
            }
            Err(err) if err.is_not_found() => BTreeMap::new(),
            Err(err) => {
                error!("Failed to read high scores from {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            records,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self
    {
        Self::default()
    }

    pub fn best(&self, level: &str, difficulty: &str) -> Option<ScoreRecord>
    {
        self.records.get(&record_key(level, difficulty)).copied()
    }

    /// Stores the result if it beats the current best and returns whether it
    /// did. Higher accuracy wins; equal accuracy falls back to perfect words.
    ///
    /// The candidate is compared unrounded against the stored, rounded
    /// accuracy. A candidate that rounds to the same accuracy can therefore
    /// replace a record with more perfect words.
    pub fn update(&mut self, level: &str, difficulty: &str, accuracy: f64, perfect_words: u32) -> bool
    {
        let key = record_key(level, difficulty);
        let current = self.records.get(&key).copied().unwrap_or_default();
        if !current.is_beaten_by(accuracy, perfect_words) {
            return false;
        }

        self.records.insert(
            key.clone(),
            ScoreRecord {
                accuracy: round_tenth(accuracy),
                perfect_words,
            },
        );
        info!("New high score for [{key}]: accuracy {accuracy:.1}%, perfects {perfect_words}");

        if let Err(err) = self.save() {
            error!("{err}");
        }
        true
    }

    fn save(&self) -> Result<()>
    {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let content = encode_records(&self.records)?;
        fs::write(path, content).map_err(|source| Error::PersistenceWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn record_key(level: &str, difficulty: &str) -> String
{
    format!("{level}_{difficulty}")
}

fn round_tenth(value: f64) -> f64
{
    (value * 10.0).round() / 10.0
}

fn read_records(path: &Path) -> Result<BTreeMap<String, ScoreRecord>>
{
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        warn!("High score file {} is empty", path.display());
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}

fn encode_records(records: &BTreeMap<String, ScoreRecord>) -> Result<Vec<u8>>
{
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}
