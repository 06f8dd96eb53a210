//! Artifact storage: keyed JSON blobs on the local filesystem.
//!
//! Every pipeline artifact (profiles, gap reports, outlines, module content)
//! is one pretty-printed JSON file under the store root. A missing key reads
//! back as `None`, never as an error, so callers branch on existence without
//! error handling. Concurrent writers to the same key are last-writer-wins.

use std::path::PathBuf;

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;

// Conventional keys for the local pipeline artifacts.
pub const EMPLOYEE_DATA_KEY: &str = "employee_data";
pub const REQUIREMENTS_KEY: &str = "position_requirements";
pub const TAXONOMY_KEY: &str = "skills_taxonomy";
pub const GAP_ANALYSIS_KEY: &str = "skills_gap_analysis";
pub const OUTLINE_KEY: &str = "course_outline";
pub const CONTENT_DIR: &str = "course_content";

/// Key for one module's content file under `prefix`, zero-padded so the
/// files list in module order: `course_content/module_07`.
pub fn content_key(prefix: &str, module_number: u32) -> String {
    format!("{prefix}/module_{module_number:02}")
}

/// Per-employee artifact keys used by the worker.
pub fn employee_gap_key(employee_id: &str) -> String {
    format!("skills_gap_{employee_id}")
}

pub fn employee_outline_key(employee_id: &str) -> String {
    format!("course_outline_{employee_id}")
}

pub fn employee_content_prefix(employee_id: &str) -> String {
    format!("course_content_{employee_id}")
}

/// File-backed JSON store rooted at the configured data directory.
#[derive(Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Writes `value` under `key`, creating parent directories as needed.
    pub async fn put(&self, key: &str, value: &Value) -> Result<PathBuf, AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored artifact '{}' at {}", key, path.display());
        Ok(path)
    }

    pub async fn put_as<T: Serialize>(&self, key: &str, value: &T) -> Result<PathBuf, AppError> {
        let value = serde_json::to_value(value)?;
        self.put(key, &value).await
    }

    /// Reads the value under `key`. A missing key is `Ok(None)`; an existing
    /// file that fails to parse is an error.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

/// Merges a `metadata` object into `value`: the owning employee id, RFC 3339
/// created/updated stamps, and a stable `artifact_id` assigned on the first
/// stamp. Restamping updates `updated_at` only.
pub fn stamp_metadata(value: &mut Value, employee_id: &str) {
    let obj = match value.as_object_mut() {
        Some(obj) => obj,
        None => return,
    };

    let now = Utc::now().to_rfc3339();
    let metadata = obj.entry("metadata").or_insert_with(|| json!({}));

    if let Some(meta) = metadata.as_object_mut() {
        meta.insert("employee_id".to_string(), json!(employee_id));
        meta.entry("artifact_id")
            .or_insert_with(|| json!(Uuid::new_v4()));
        meta.entry("created_at")
            .or_insert_with(|| json!(now.clone()));
        meta.insert("updated_at".to_string(), json!(now));
    }
}

/// Keys become file paths; restricting them to a safe alphabet keeps
/// remote-derived ids from escaping the store root.
fn validate_key(key: &str) -> Result<(), AppError> {
    let alphabet_ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/'));
    let segments_ok = !key.split('/').any(|segment| segment.is_empty());

    if alphabet_ok && segments_ok {
        Ok(())
    } else {
        Err(AppError::Validation(format!("invalid artifact key '{key}'")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
