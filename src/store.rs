use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info, warn};
use serde::Serialize;

use crate::blockchain::snapshot::ChainSnapshot;
use crate::blockchain::{Blockchain, HashAlgorithm};
use crate::error::{ChainError, Result};

const EXTENSION: &str = "json";

/// Listing entry for one saved snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub name: String,
    pub saved_at: String,
    pub difficulty: u32,
    pub algorithm: HashAlgorithm,
    pub blocks: usize,
}

/// Directory of named chain snapshots, one `<name>.json` file each.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Default snapshot name, e.g. `blockchain_20240131_235959`.
    pub fn default_name() -> String {
        format!("blockchain_{}", Local::now().format("%Y%m%d_%H%M%S"))
    }

    /// Write the chain under `name`, replacing any snapshot of the same name.
    pub fn save(&self, name: &str, chain: &Blockchain) -> Result<String> {
        let filename = filename_for(name)?;
        let snapshot = chain.to_snapshot(name);
        fs::write(self.dir.join(&filename), snapshot.to_json()?)?;
        info!("Saved chain '{}' ({} blocks) to {}", name, chain.len(), filename);
        Ok(filename)
    }

    pub fn load(&self, filename: &str) -> Result<ChainSnapshot> {
        let filename = filename_for(filename)?;
        let text = match fs::read_to_string(self.dir.join(&filename)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ChainError::SnapshotNotFound(filename));
            }
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded snapshot {}", filename);
        ChainSnapshot::from_json(&text)
    }

    pub fn delete(&self, filename: &str) -> Result<()> {
        let filename = filename_for(filename)?;
        match fs::remove_file(self.dir.join(&filename)) {
            Ok(()) => {
                info!("Deleted snapshot {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ChainError::SnapshotNotFound(filename)),
            Err(e) => Err(e.into()),
        }
    }

    /// All readable snapshots, newest first. Unparseable files are skipped.
    pub fn list(&self) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
                continue;
            };
            let snapshot = match fs::read_to_string(&path)
                .map_err(ChainError::from)
                .and_then(|text| ChainSnapshot::from_json(&text))
            {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("Skipping {}: {}", filename, e);
                    continue;
                }
            };
            entries.push(HistoryEntry {
                filename: filename.to_string(),
                name: snapshot.name,
                saved_at: snapshot.saved_at,
                difficulty: snapshot.difficulty,
                algorithm: snapshot.algorithm,
                blocks: snapshot.chain.len(),
            });
        }
        entries.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(entries)
    }
}

/// Map a snapshot name (with or without `.json`) to its file name, refusing
/// anything that could escape the store directory.
fn filename_for(name: &str) -> Result<String> {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if stem.is_empty() || stem.starts_with('.') || !stem.chars().all(allowed) {
        return Err(ChainError::InvalidName(name.to_string()));
    }
    Ok(format!("{stem}.{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, HistoryStore) {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("history")).unwrap();
        (dir, store)
    }

    fn chain() -> Blockchain {
        let mut bc = Blockchain::new(HashAlgorithm::Sha3_256, 1);
        bc.append("kept on disk").unwrap();
        bc
    }

    #[test]
    fn save_load_round_trip() {
        let (_dir, store) = store();
        let bc = chain();
        let filename = store.save("my_chain", &bc).unwrap();
        assert_eq!(filename, "my_chain.json");

        let snapshot = store.load("my_chain.json").unwrap();
        assert_eq!(snapshot.name, "my_chain");
        let loaded = Blockchain::from_snapshot(snapshot).unwrap();
        assert_eq!(loaded.blocks(), bc.blocks());
        assert!(loaded.is_valid_chain());

        // Stem without extension resolves to the same file.
        assert!(store.load("my_chain").is_ok());
    }

    #[test]
    fn list_skips_garbage_and_reports_counts() {
        let (_dir, store) = store();
        store.save("first", &chain()).unwrap();
        fs::write(store.dir().join("broken.json"), "{oops").unwrap();
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].filename, "first.json");
        assert_eq!(entries[0].blocks, 2);
        assert_eq!(entries[0].algorithm, HashAlgorithm::Sha3_256);
    }

    #[test]
    fn list_is_newest_first() {
        let (_dir, store) = store();
        let mut old = chain().to_snapshot("old");
        old.saved_at = "2020-01-01T00:00:00+00:00".into();
        fs::write(store.dir().join("old.json"), old.to_json().unwrap()).unwrap();
        store.save("new", &chain()).unwrap();

        let names: Vec<_> = store.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["new", "old"]);
    }

    #[test]
    fn delete_and_missing() {
        let (_dir, store) = store();
        store.save("gone", &chain()).unwrap();
        store.delete("gone.json").unwrap();
        assert!(matches!(store.load("gone"), Err(ChainError::SnapshotNotFound(_))));
        assert!(matches!(store.delete("gone"), Err(ChainError::SnapshotNotFound(_))));
    }

    #[test]
    fn rejects_path_traversal() {
        let (_dir, store) = store();
        for bad in ["../escape", "a/b", "", ".hidden", "..json"] {
            assert!(
                matches!(store.save(bad, &chain()), Err(ChainError::InvalidName(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn corrupt_file_surfaces_as_corrupt_snapshot() {
        let (_dir, store) = store();
        fs::write(store.dir().join("bad.json"), "[1,2,3]").unwrap();
        assert!(matches!(store.load("bad"), Err(ChainError::CorruptSnapshot(_))));
    }

    #[test]
    fn default_name_has_prefix() {
        assert!(HistoryStore::default_name().starts_with("blockchain_"));
    }
}
