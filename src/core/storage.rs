//! Persistence port for personas and transcripts.
//!
//! State is read once at startup and each record is rewritten in full after
//! every mutation. There is no incremental persistence and no schema version.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::core::config::path_display;
use crate::core::persona::Persona;
use crate::core::transcript::TranscriptMap;

pub const PERSONAS_FILE: &str = "personas.json";
pub const TRANSCRIPTS_FILE: &str = "chat_sessions.json";

/// Errors raised by a [`StateStore`].
#[derive(Debug)]
pub enum PersistenceError {
    /// The backing file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// A record could not be encoded.
    Serialize { source: serde_json::Error },
    /// A stored record is not valid JSON for its type.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Io { path, source } => {
                write!(f, "Failed to access {}: {}", path_display(path), source)
            }
            PersistenceError::Serialize { source } => {
                write!(f, "Failed to encode state: {source}")
            }
            PersistenceError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for PersistenceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            PersistenceError::Io { source, .. } => Some(source),
            PersistenceError::Serialize { source } => Some(source),
            PersistenceError::Parse { source, .. } => Some(source),
        }
    }
}

/// Read-at-startup, write-on-mutation storage for application state.
pub trait StateStore: Send {
    /// `None` means nothing has been stored yet.
    fn load_personas(&self) -> Result<Option<Vec<Persona>>, PersistenceError>;
    fn save_personas(&mut self, personas: &[Persona]) -> Result<(), PersistenceError>;
    fn load_transcripts(&self) -> Result<TranscriptMap, PersistenceError>;
    fn save_transcripts(&mut self, transcripts: &TranscriptMap) -> Result<(), PersistenceError>;
}

/// Stores each record as a JSON file inside one data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PersistenceError> {
        let path = self.dir.join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| PersistenceError::Parse { path, source })
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), PersistenceError> {
        let path = self.dir.join(name);
        let io_err = |source| PersistenceError::Io {
            path: path.clone(),
            source,
        };

        let contents =
            serde_json::to_vec(value).map_err(|source| PersistenceError::Serialize { source })?;
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Full rewrite through a temp file so a crash never leaves half a record.
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp_file.write_all(&contents).map_err(io_err)?;
        temp_file.as_file_mut().sync_all().map_err(io_err)?;
        temp_file.persist(&path).map_err(|err| io_err(err.error))?;
        debug!(path = %path.display(), bytes = contents.len(), "state written");
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn load_personas(&self) -> Result<Option<Vec<Persona>>, PersistenceError> {
        self.read(PERSONAS_FILE)
    }

    fn save_personas(&mut self, personas: &[Persona]) -> Result<(), PersistenceError> {
        self.write(PERSONAS_FILE, personas)
    }

    fn load_transcripts(&self) -> Result<TranscriptMap, PersistenceError> {
        Ok(self.read(TRANSCRIPTS_FILE)?.unwrap_or_default())
    }

    fn save_transcripts(&mut self, transcripts: &TranscriptMap) -> Result<(), PersistenceError> {
        self.write(TRANSCRIPTS_FILE, transcripts)
    }
}

/// Keeps serialized records in memory, counting writes.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub personas: Option<String>,
    pub transcripts: Option<String>,
    pub persona_writes: usize,
    pub transcript_writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
fn decode<T: DeserializeOwned>(raw: &str, name: &str) -> Result<T, PersistenceError> {
    serde_json::from_str(raw).map_err(|source| PersistenceError::Parse {
        path: PathBuf::from(name),
        source,
    })
}

#[cfg(test)]
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, PersistenceError> {
    serde_json::to_string(value).map_err(|source| PersistenceError::Serialize { source })
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn load_personas(&self) -> Result<Option<Vec<Persona>>, PersistenceError> {
        self.personas
            .as_deref()
            .map(|raw| decode(raw, PERSONAS_FILE))
            .transpose()
    }

    fn save_personas(&mut self, personas: &[Persona]) -> Result<(), PersistenceError> {
        self.personas = Some(encode(personas)?);
        self.persona_writes += 1;
        Ok(())
    }

    fn load_transcripts(&self) -> Result<TranscriptMap, PersistenceError> {
        match self.transcripts.as_deref() {
            Some(raw) => decode(raw, TRANSCRIPTS_FILE),
            None => Ok(TranscriptMap::new()),
        }
    }

    fn save_transcripts(&mut self, transcripts: &TranscriptMap) -> Result<(), PersistenceError> {
        self.transcripts = Some(encode(transcripts)?);
        self.transcript_writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builtin_personas::load_builtin_personas;
    use crate::core::message::{Turn, TurnRole};

    fn sample_transcripts() -> TranscriptMap {
        let mut map = TranscriptMap::new();
        map.insert(
            "2".to_string(),
            vec![
                Turn::new(TurnRole::User, "I feel stressed.", 1_000),
                Turn::new(TurnRole::Model, "Breathe deeply.", 1_250),
            ],
        );
        map.insert("4".to_string(), Vec::new());
        map
    }

    #[test]
    fn missing_files_read_as_empty_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path().join("state"));
        assert!(store.load_personas().expect("load").is_none());
        assert!(store.load_transcripts().expect("load").is_empty());
    }

    #[test]
    fn file_store_round_trips_both_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path().join("state"));
        let personas = load_builtin_personas();
        let transcripts = sample_transcripts();

        store.save_personas(&personas).expect("save personas");
        store.save_transcripts(&transcripts).expect("save transcripts");

        let reopened = JsonFileStore::new(dir.path().join("state"));
        assert_eq!(reopened.load_personas().expect("load"), Some(personas));
        assert_eq!(reopened.load_transcripts().expect("load"), transcripts);
    }

    #[test]
    fn serialization_is_byte_stable() {
        let mut first = MemoryStore::new();
        first.save_transcripts(&sample_transcripts()).expect("save");
        let loaded = first.load_transcripts().expect("load");

        let mut second = MemoryStore::new();
        second.save_transcripts(&loaded).expect("save");
        assert_eq!(first.transcripts, second.transcripts);
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(PERSONAS_FILE), "{not json").expect("write");
        let store = JsonFileStore::new(dir.path());
        let err = store.load_personas().expect_err("should fail");
        assert!(matches!(err, PersistenceError::Parse { .. }));
        assert!(err.to_string().contains(PERSONAS_FILE));
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        store.save_personas(&load_builtin_personas()).expect("save");
        store.save_personas(&[]).expect("save");
        assert_eq!(store.persona_writes, 2);
        assert_eq!(store.load_personas().expect("load"), Some(Vec::new()));
    }
}
