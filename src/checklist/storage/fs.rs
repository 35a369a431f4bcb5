use super::backend::StorageBackend;
use crate::error::{ChecklistError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const PROBE_KEY: &str = "__checklist_probe__";

/// Filesystem storage backend: one JSON file per key under a data
/// directory. Availability is probed once at construction with a
/// write/delete of a sentinel key; probe failures are swallowed and only
/// recorded in the flag.
pub struct FsBackend {
    root: PathBuf,
    available: bool,
}

impl FsBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let available = Self::probe(&root);
        if !available {
            warn!(root = %root.display(), "storage probe failed, medium unavailable");
        }
        Self { root, available }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn probe(root: &Path) -> bool {
        if fs::create_dir_all(root).is_err() {
            return false;
        }
        let probe_path = root.join(format!("{}.json", PROBE_KEY));
        if fs::write(&probe_path, "probe").is_err() {
            return false;
        }
        let _ = fs::remove_file(&probe_path);
        true
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn storage_err(context: &str, err: std::io::Error) -> ChecklistError {
        ChecklistError::Storage(format!("{}: {}", context, err))
    }
}

impl StorageBackend for FsBackend {
    fn available(&self) -> bool {
        self.available
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_err("read failed", e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| Self::storage_err("create dir failed", e))?;

        // Atomic write: tmp file in the same directory, then rename.
        let tmp_path = self.root.join(format!(".{}-{}.tmp", key, Uuid::new_v4()));
        fs::write(&tmp_path, value).map_err(|e| Self::storage_err("write failed", e))?;
        fs::rename(&tmp_path, self.key_path(key))
            .map_err(|e| Self::storage_err("rename failed", e))?;

        debug!(key, bytes = value.len(), "wrote key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::storage_err("remove failed", e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        let entries =
            fs::read_dir(&self.root).map_err(|e| Self::storage_err("read dir failed", e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Self::storage_err("read dir entry failed", e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}
