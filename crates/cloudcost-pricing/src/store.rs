//! The on-disk snapshot store: one file per snapshot named by its
//! content hash, written once via a temp-file-then-rename so a reader
//! never observes a partial write, and marked read-only on the
//! filesystem afterward. An index file maps `(provider, region)` to
//! its most recent snapshot id, rewritten the same atomic way.
//!
//! Grounded on `blueprint-store-local-database`'s `flush()`: write to
//! a sibling temp file in the target directory, then `rename` into
//! place, so the replace is atomic on any POSIX filesystem.

use crate::error::{Error, Result};
use crate::snapshot::PricingSnapshot;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// `(provider, region) -> most recent snapshot id`.
type Index = BTreeMap<(String, String), String>;

/// An append-only, content-addressed store of pricing snapshots
/// backed by a directory on disk.
pub struct SnapshotStore {
    base_dir: PathBuf,
    index: Mutex<Index>,
}

impl SnapshotStore {
    /// Opens (creating if absent) a store rooted at `base_dir`,
    /// loading its index file if one already exists.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        let index_path = base_dir.join("index.json");
        let index = if index_path.exists() {
            let raw = fs::read_to_string(&index_path)?;
            serde_json::from_str(&raw)?
        } else {
            Index::new()
        };
        Ok(Self {
            base_dir,
            index: Mutex::new(index),
        })
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        self.base_dir.join(format!("{id}.json"))
    }

    /// Writes a new snapshot. Never overwrites an existing file for
    /// the same content hash; since the id *is* the hash, rewriting
    /// identical content is a harmless no-op, but writing different
    /// content under an id that already exists on disk is rejected.
    pub fn put(&self, snapshot: &PricingSnapshot) -> Result<()> {
        let path = self.snapshot_path(snapshot.id());
        if path.exists() {
            let existing = self.read_snapshot_file(&path)?;
            if existing.content_hash() != snapshot.content_hash() {
                return Err(Error::immutability_violation(snapshot.id()));
            }
            return Ok(());
        }

        self.write_atomic(&path, snapshot)?;
        set_readonly(&path)?;

        let mut index = self.index.lock();
        index.insert(
            (snapshot.provider().to_string(), snapshot.region().to_string()),
            snapshot.id().to_string(),
        );
        drop(index);
        self.flush_index()?;
        Ok(())
    }

    fn write_atomic(&self, path: &Path, snapshot: &PricingSnapshot) -> Result<()> {
        let tmp_path = path.with_extension("json.tmp");
        let serialized = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn flush_index(&self) -> Result<()> {
        let index = self.index.lock();
        let tmp_path = self.base_dir.join("index.json.tmp");
        let serialized = serde_json::to_vec_pretty(&*index)?;
        fs::write(&tmp_path, serialized)?;
        fs::rename(&tmp_path, self.base_dir.join("index.json"))?;
        Ok(())
    }

    fn read_snapshot_file(&self, path: &Path) -> Result<PricingSnapshot> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn get(&self, id: &str) -> Result<PricingSnapshot> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Err(Error::no_snapshot(id));
        }
        self.read_snapshot_file(&path)
    }

    pub fn get_latest(&self, provider: &str, region: &str) -> Result<PricingSnapshot> {
        let id = self
            .index
            .lock()
            .get(&(provider.to_string(), region.to_string()))
            .cloned()
            .ok_or_else(|| Error::no_snapshot(format!("{provider}/{region}")))?;
        self.get(&id)
    }

    /// Rereads every snapshot file in the store and recomputes its
    /// content hash, returning the ids of any that no longer verify.
    pub fn verify_integrity(&self) -> Result<Vec<String>> {
        let mut corrupt = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some("index.json") {
                continue;
            }
            match self.read_snapshot_file(&path) {
                Ok(snapshot) if !snapshot.verify() => corrupt.push(snapshot.id().to_string()),
                Ok(_) => {}
                Err(_) => {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        corrupt.push(stem.to_string());
                    }
                }
            }
        }
        Ok(corrupt)
    }
}

#[cfg(unix)]
fn set_readonly(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o444);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_readonly(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(true);
    fs::set_permissions(path, perms)?;
    Ok(())
}
