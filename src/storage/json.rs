use std::{
    fs::{self, OpenOptions, rename, write},
    io::ErrorKind,
    path::PathBuf,
};

use fs2::FileExt;
use uuid::Uuid;

use crate::storage::{Storage, StorageError};

/// Backups kept per key
const MAX_BACKUPS: usize = 5;

/// One JSON file per key inside a data directory
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn create_backup(&self, key: &str, path: &PathBuf) -> Result<u64, StorageError> {
        let file_exists = fs::exists(path).map_err(|e| StorageError::BackupFailed {
            path: path.clone(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backups_dir = self.get_backup_dir();
        fs::create_dir_all(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir.clone(),
            source: e,
        })?;

        let backup_path = self.get_backup_path(key);
        fs::copy(path, &backup_path).map_err(|e| StorageError::BackupFailed {
            path: backup_path,
            source: e,
        })
    }

    fn cleanup_old_backups(&self, key: &str) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let prefix = format!("{key}.json-");
        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        // Timestamp suffixes sort chronologically
        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(MAX_BACKUPS);
        for file_path in file_entries.iter().take(number_of_files_to_delete) {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }

        Ok(())
    }

    /// Swaps `temp_path` into `path` under the key's lock, backing up the old file first
    fn replace_locked(
        &self,
        key: &str,
        temp_path: &PathBuf,
        path: &PathBuf,
    ) -> Result<(), StorageError> {
        let lock_file_path = self.dir.join(format!("{key}.lock"));
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| StorageError::SaveFailed {
                key: key.to_string(),
                path: lock_file_path.clone(),
                source: e,
            })?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StorageError::SaveFailed {
                key: key.to_string(),
                path: lock_file_path,
                source: e,
            })?;

        self.create_backup(key, path)?;
        self.cleanup_old_backups(key)?;

        rename(temp_path, path).map_err(|e| StorageError::SaveFailed {
            key: key.to_string(),
            path: path.clone(),
            source: e,
        })?;

        lock_file.unlock().map_err(|e| StorageError::SaveFailed {
            key: key.to_string(),
            path: path.clone(),
            source: e,
        })?;

        Ok(())
    }

    fn get_backup_dir(&self) -> PathBuf {
        self.dir.join("backups")
    }

    fn get_backup_path(&self, key: &str) -> PathBuf {
        let nanos = jiff::Timestamp::now().as_nanosecond();
        self.get_backup_dir().join(format!("{key}.json-{nanos:024}"))
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::LoadFailed {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        let temp_path = self.dir.join(format!(".{key}.tmp.{}", Uuid::new_v4()));
        write(&temp_path, value).map_err(|e| StorageError::SaveFailed {
            key: key.to_string(),
            path: temp_path.clone(),
            source: e,
        })?;

        let result = self.replace_locked(key, &temp_path, &path);
        if result.is_err() {
            // No-op when the rename already happened
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::SaveFailed {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }
}
