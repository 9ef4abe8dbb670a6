//! JSON files on disk, one per key

use std::path::PathBuf;

use crate::{check_key, Result, Storage};

/// Stores each document as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("file storage at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, document: &str) -> Result<()> {
        let path = self.path_for(key)?;

        // Write to temp file first, then rename (atomic)
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, document)?;
        std::fs::rename(&temp_path, &path)?;
        Ok(())
    }
}
