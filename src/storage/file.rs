use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;

use super::KeyValueStore;

/// One `<key>.json` file per key inside a directory.
///
/// Writes land in a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn trash_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.trash", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// All or nothing: every file is first renamed aside, and a failed rename
    /// puts the earlier ones back before returning the error.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut moved: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(keys.len());

        for key in keys {
            let path = self.path_for(key);
            let trash = self.trash_path_for(key);
            match fs::rename(&path, &trash) {
                Ok(()) => moved.push((path, trash)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    for (path, trash) in moved.into_iter().rev() {
                        if let Err(restore) = fs::rename(&trash, &path) {
                            warn!(path = %path.display(), error = %restore, "failed to restore");
                        }
                    }
                    return Err(e.into());
                }
            }
        }

        for (_, trash) in moved {
            if let Err(e) = fs::remove_file(&trash) {
                warn!(path = %trash.display(), error = %e, "failed to delete cleared file");
            }
        }
        Ok(())
    }
}
