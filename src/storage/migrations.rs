use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::storage::StorageError;

pub type MigrationFn = fn(Value) -> Result<Value, StorageError>;

/// Index n migrates a profile from version n+1 to n+2
pub fn profile_migrations() -> Vec<MigrationFn> {
    vec![migrate_profile_v1_to_v2]
}

/// Index n migrates a task collection from version n+1 to n+2
pub fn tasks_migrations() -> Vec<MigrationFn> {
    vec![migrate_tasks_v1_to_v2]
}

fn parse_error(key: &str, message: String) -> StorageError {
    StorageError::ParseFailed {
        key: key.to_string(),
        source: <serde_json::Error as serde::de::Error>::custom(message),
    }
}

/// Returns 1 if version field is missing (blobs written before versioning)
pub fn detect_version(key: &str, value: &Value) -> Result<u32, StorageError> {
    match value.get("version") {
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| parse_error(key, format!("invalid version field {v}"))),
        None => Ok(1),
    }
}

/// Migrations are applied sequentially: v1→v2→v3→...→target
pub fn apply_migrations(
    key: &str,
    mut data: Value,
    from_version: u32,
    to_version: u32,
    migrations: &[MigrationFn],
) -> Result<Value, StorageError> {
    if from_version > to_version {
        return Err(StorageError::FutureVersion {
            key: key.to_string(),
            version: from_version,
        });
    }

    for version in from_version..to_version {
        let migration = usize::try_from(version)
            .ok()
            .and_then(|v| v.checked_sub(1))
            .and_then(|idx| migrations.get(idx))
            .ok_or_else(|| StorageError::UnsupportedVersion {
                key: key.to_string(),
                version,
            })?;
        data = migration(data)?;
    }

    Ok(data)
}

/// Parses a versioned blob, migrating it up to `current` first
pub fn decode<T: DeserializeOwned>(
    key: &str,
    content: &str,
    current: u32,
    migrations: &[MigrationFn],
) -> Result<T, StorageError> {
    let data: Value = serde_json::from_str(content).map_err(|e| StorageError::ParseFailed {
        key: key.to_string(),
        source: e,
    })?;

    let file_version = detect_version(key, &data)?;
    if file_version > current {
        return Err(StorageError::FutureVersion {
            key: key.to_string(),
            version: file_version,
        });
    }

    let data = apply_migrations(key, data, file_version, current, migrations)?;

    serde_json::from_value(data).map_err(|e| StorageError::ParseFailed {
        key: key.to_string(),
        source: e,
    })
}

/// Serializes `value` with a `version` field alongside its own fields
pub fn encode<T: Serialize>(key: &str, value: &T, version: u32) -> Result<String, StorageError> {
    let mut data = serde_json::to_value(value).map_err(|e| StorageError::SerializeFailed {
        key: key.to_string(),
        source: e,
    })?;
    if let Some(obj) = data.as_object_mut() {
        obj.insert("version".to_string(), json!(version));
    }
    serde_json::to_string(&data).map_err(|e| StorageError::SerializeFailed {
        key: key.to_string(),
        source: e,
    })
}

/// v1 profiles kept usage in `appUsage` ("" meaning unset) and the mute
/// switches as top-level booleans.
fn migrate_profile_v1_to_v2(mut value: Value) -> Result<Value, StorageError> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(2));

        if let Some(usage) = obj.remove("appUsage") {
            let mode = match usage.as_str() {
                Some("personal") => "personal",
                Some("work") => "work",
                Some("both") => "both",
                _ => "unset",
            };
            obj.insert("appUsageMode".to_string(), Value::from(mode));
        }

        let during_work = obj.remove("muteDuringWork").and_then(|v| v.as_bool());
        let after_work = obj.remove("muteAfterWork").and_then(|v| v.as_bool());
        if !obj.contains_key("notificationMutePreferences") {
            obj.insert(
                "notificationMutePreferences".to_string(),
                json!({
                    "duringWork": during_work.unwrap_or(false),
                    "afterWork": after_work.unwrap_or(false),
                }),
            );
        }

        if !obj.contains_key("themeMode") {
            let mode = obj.get("theme").cloned().unwrap_or_else(|| Value::from("dark"));
            obj.insert("themeMode".to_string(), mode);
        }
    }

    Ok(value)
}

/// v1 task ids were millisecond timestamps and instance `createdAt` could be
/// a bare date key.
fn migrate_tasks_v1_to_v2(mut value: Value) -> Result<Value, StorageError> {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("version".to_string(), Value::from(2));

        for bucket in ["morning", "afternoon", "evening"] {
            let Some(tasks) = obj.get_mut(bucket).and_then(|t| t.as_array_mut()) else {
                continue;
            };
            for task in tasks.iter_mut().filter_map(Value::as_object_mut) {
                migrate_task_v1(task);
            }
        }
    }

    Ok(value)
}

fn migrate_task_v1(task: &mut Map<String, Value>) {
    for field in ["id", "parentTaskId"] {
        if let Some(n) = task.get(field).and_then(Value::as_u64) {
            task.insert(field.to_string(), Value::from(legacy_id(n).to_string()));
        }
    }

    if let Some(created) = task.get("createdAt").and_then(Value::as_str)
        && created.len() == 10
    {
        let widened = format!("{created}T00:00:00Z");
        task.insert("createdAt".to_string(), Value::from(widened));
    }

    if !task.contains_key("category") {
        task.insert("category".to_string(), Value::from("personal"));
    }

    let completed = task.get("completed").and_then(Value::as_bool).unwrap_or(false);
    let has_completed_at = task.get("completedAt").is_some_and(|v| !v.is_null());
    if completed && !has_completed_at {
        let created = task.get("createdAt").cloned().unwrap_or(Value::Null);
        task.insert("completedAt".to_string(), created);
    } else if !completed {
        task.insert("completedAt".to_string(), Value::Null);
    }
}

/// Deterministic UUID for a legacy integer id
pub fn legacy_id(id: u64) -> Uuid {
    Uuid::from_u64_pair(0, id)
}
