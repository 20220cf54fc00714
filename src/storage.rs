use std::path::PathBuf;

use thiserror::Error;

pub mod json;
pub mod memory;
pub mod migrations;

/// Serialized `UserProfile`
pub const PROFILE_KEY: &str = "adhd-planner-data";
/// Serialized `TaskCollection`
pub const TASKS_KEY: &str = "adhd-planner-tasks";
/// Serialized `DismissalLedger`
pub const DISMISSED_KEY: &str = "adhd-planner-dismissed-suggestions";
/// Plain date string of the last daily check-in
pub const LAST_CHECKIN_KEY: &str = "last-checkin-date";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load '{key}' from '{path}': {source}")]
    LoadFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON stored under '{key}': {source}")]
    ParseFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save '{key}' to '{path}': {source}")]
    SaveFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize '{key}' to JSON: {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to create backup at '{path}': {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cleanup old backups in '{dir}': {source}")]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage key '{0}' is not a valid file name")]
    InvalidKey(String),

    #[error(
        "'{key}' was written by a newer version of the planner (version {version}). Please upgrade to read it."
    )]
    FutureVersion { key: String, version: u32 },

    #[error("'{key}' has unsupported version {version}. This version of the planner cannot read it.")]
    UnsupportedVersion { key: String, version: u32 },

    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value store of JSON strings
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
