//! Design persistence
//!
//! The editor only needs two operations from persistence: write a scene
//! snapshot for a design, and load a design. Both must be idempotent; a
//! stale overwrite is acceptable (last write wins).

use crate::scene::SceneSnapshot;
use crate::types::{EditorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A customer's design as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Design {
    pub id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default, deserialize_with = "snapshot_from_object_or_string")]
    pub canvas_json: SceneSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_shape_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_res_export_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_auto_save: Option<DateTime<Utc>>,
}

impl Design {
    pub fn new(id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            canvas_json: SceneSnapshot::default(),
            custom_shape_url: None,
            high_res_export_url: None,
            last_auto_save: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Stored canvases are sometimes a JSON object and sometimes the same
/// object encoded as a string.
fn snapshot_from_object_or_string<'de, D>(deserializer: D) -> std::result::Result<SceneSnapshot, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let snapshot = match value {
        Value::Null => Ok(SceneSnapshot::default()),
        Value::String(text) => SceneSnapshot::from_json(&text),
        other => SceneSnapshot::from_value(other),
    };
    snapshot.map_err(serde::de::Error::custom)
}

/// Persistence collaborator
pub trait DesignStore: Send + Sync + 'static {
    /// Replace the stored canvas of a design
    fn save_snapshot(
        &self,
        design_id: &str,
        snapshot: &SceneSnapshot,
    ) -> impl Future<Output = Result<()>> + Send;

    fn load_design(&self, design_id: &str) -> impl Future<Output = Result<Design>> + Send;
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store, used by tests and demos
#[derive(Debug, Default)]
pub struct MemoryDesignStore {
    designs: Mutex<HashMap<String, Design>>,
    saves: AtomicUsize,
    fail_next: AtomicBool,
}

impl MemoryDesignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, design: Design) -> Result<()> {
        self.lock()?.insert(design.id.clone(), design);
        Ok(())
    }

    pub fn get(&self, design_id: &str) -> Option<Design> {
        self.lock().ok()?.get(design_id).cloned()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make the next save fail with a transient error
    pub fn fail_next_save(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Design>>> {
        self.designs
            .lock()
            .map_err(|_| EditorError::Persistence("design store lock poisoned".to_string()))
    }
}

impl DesignStore for MemoryDesignStore {
    async fn save_snapshot(&self, design_id: &str, snapshot: &SceneSnapshot) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(EditorError::Persistence(format!(
                "simulated network failure saving {design_id}"
            )));
        }
        let mut designs = self.lock()?;
        let design = designs
            .get_mut(design_id)
            .ok_or_else(|| EditorError::NotFound(format!("design {design_id}")))?;
        design.canvas_json = snapshot.clone();
        design.last_auto_save = Some(Utc::now());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_design(&self, design_id: &str) -> Result<Design> {
        self.lock()?
            .get(design_id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(format!("design {design_id}")))
    }
}

// =============================================================================
// Filesystem store
// =============================================================================

/// One pretty-printed JSON file per design under a root directory
#[derive(Debug, Clone)]
pub struct FsDesignStore {
    root: PathBuf,
}

impl FsDesignStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_owned(),
        }
    }

    fn path_for(&self, design_id: &str) -> Result<PathBuf> {
        let valid = !design_id.is_empty()
            && design_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(EditorError::NotFound(format!(
                "design id `{design_id}` is not a valid file name"
            )));
        }
        Ok(self.root.join(format!("{design_id}.json")))
    }

    /// Write a whole design record
    pub async fn put(&self, design: &Design) -> Result<()> {
        let path = self.path_for(&design.id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_string_pretty(design)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

impl DesignStore for FsDesignStore {
    async fn save_snapshot(&self, design_id: &str, snapshot: &SceneSnapshot) -> Result<()> {
        let mut design = self.load_design(design_id).await?;
        design.canvas_json = snapshot.clone();
        design.last_auto_save = Some(Utc::now());
        self.put(&design).await?;
        log::debug!("Saved design {} to {}", design_id, self.root.display());
        Ok(())
    }

    async fn load_design(&self, design_id: &str) -> Result<Design> {
        let path = self.path_for(design_id)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EditorError::NotFound(format!("design {design_id}")));
            }
            Err(e) => return Err(e.into()),
        };
        let design: Design = serde_json::from_slice(&bytes)
            .map_err(|e| EditorError::MalformedSnapshot(format!("design {design_id}: {e}")))?;
        Ok(design)
    }
}
