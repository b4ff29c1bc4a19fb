use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::{Collectible, ProgressStore};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCollectible {
    pub id: String,
    pub collected: bool,
}

/// Persisted quest progress. Versioned so a future format change can
/// refuse (rather than misread) an old file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub save_version: u32,
    pub score: u32,
    pub items: Vec<SavedCollectible>,
}

impl ProgressRecord {
    pub fn capture(score: u32, collectibles: &[Collectible]) -> Self {
        Self {
            save_version: SAVE_VERSION,
            score,
            items: collectibles
                .iter()
                .map(|item| SavedCollectible {
                    id: item.id.clone(),
                    collected: item.collected,
                })
                .collect(),
        }
    }

    /// Marks live collectibles as collected per the record. One-way: a
    /// record never un-collects anything, and ids with no live
    /// counterpart are skipped.
    pub fn apply_to(&self, collectibles: &mut [Collectible]) {
        for saved in self.items.iter().filter(|saved| saved.collected) {
            if let Some(live) = collectibles.iter_mut().find(|live| live.id == saved.id) {
                live.collected = true;
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("failed to read save file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save file at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("save file at {path} has save_version {found}, expected {expected}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
    #[error("failed to serialize progress record: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write save file at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File-backed progress store. Writes go through a temp file and rename
/// so a crash mid-write never leaves a torn save.
#[derive(Debug)]
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&mut self) -> Result<Option<ProgressRecord>, ProgressError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProgressError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let record: ProgressRecord =
            serde_json::from_slice(&bytes).map_err(|source| ProgressError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if record.save_version != SAVE_VERSION {
            return Err(ProgressError::UnsupportedVersion {
                path: self.path.clone(),
                found: record.save_version,
                expected: SAVE_VERSION,
            });
        }

        Ok(Some(record))
    }

    fn save(&mut self, record: &ProgressRecord) -> Result<(), ProgressError> {
        let json = serde_json::to_vec_pretty(record).map_err(ProgressError::Serialize)?;
        write_bytes_atomic(&self.path, &json).map_err(|source| ProgressError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    let tmp_path = parent.join(format!(".progress-{}-{nanos}.tmp", process::id()));

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            let _ = fs::remove_file(&tmp_path);
            Err(rename_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GeoPoint;

    fn collectibles() -> Vec<Collectible> {
        vec![
            Collectible {
                id: "item1".to_string(),
                name: "Blue Jay Feather".to_string(),
                location: GeoPoint::new(-76.5920, 40.1535),
                reward: 10,
                collected: false,
            },
            Collectible {
                id: "item2".to_string(),
                name: "Campus Map".to_string(),
                location: GeoPoint::new(-76.5930, 40.1525),
                reward: 5,
                collected: true,
            },
        ]
    }

    #[test]
    fn capture_then_apply_restores_collected_flags() {
        let mut live = collectibles();
        let record = ProgressRecord::capture(15, &live);
        assert_eq!(record.save_version, SAVE_VERSION);
        assert_eq!(record.score, 15);

        live[1].collected = false;
        record.apply_to(&mut live);
        assert!(!live[0].collected);
        assert!(live[1].collected);
    }

    #[test]
    fn apply_never_uncollects() {
        let mut live = collectibles();
        live[0].collected = true;

        let record = ProgressRecord {
            save_version: SAVE_VERSION,
            score: 0,
            items: vec![SavedCollectible {
                id: "item1".to_string(),
                collected: false,
            }],
        };
        record.apply_to(&mut live);
        assert!(live[0].collected);
    }

    #[test]
    fn apply_skips_unknown_ids() {
        let mut live = collectibles();
        let record = ProgressRecord {
            save_version: SAVE_VERSION,
            score: 0,
            items: vec![SavedCollectible {
                id: "retired_item".to_string(),
                collected: true,
            }],
        };
        record.apply_to(&mut live);
        assert!(!live[0].collected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonProgressStore::new(dir.path().join("progress.save.json"));

        let record = ProgressRecord::capture(30, &collectibles());
        store.save(&record).expect("save");

        let loaded = store.load().expect("load").expect("record present");
        assert_eq!(loaded, record);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonProgressStore::new(dir.path().join("absent.save.json"));
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.save.json");
        fs::write(&path, b"{ not json").expect("write corrupt file");

        let mut store = JsonProgressStore::new(path);
        assert!(matches!(store.load(), Err(ProgressError::Parse { .. })));
    }

    #[test]
    fn wrong_save_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("progress.save.json");
        let stale = ProgressRecord {
            save_version: SAVE_VERSION + 1,
            score: 0,
            items: Vec::new(),
        };
        fs::write(&path, serde_json::to_vec(&stale).expect("json")).expect("write");

        let mut store = JsonProgressStore::new(path);
        assert!(matches!(
            store.load(),
            Err(ProgressError::UnsupportedVersion { found, expected, .. })
                if found == SAVE_VERSION + 1 && expected == SAVE_VERSION
        ));
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("saves").join("progress.save.json");
        let mut store = JsonProgressStore::new(path);

        let record = ProgressRecord::capture(0, &[]);
        store.save(&record).expect("save");
        assert!(store.load().expect("load").is_some());
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonProgressStore::new(dir.path().join("progress.save.json"));
        store
            .save(&ProgressRecord::capture(5, &collectibles()))
            .expect("save");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .collect();
        assert!(leftovers.is_empty());
    }
}
