//! Local persistence of the in-progress create form
//!
//! Drafts live in a small JSON file mapping keys to form contents. They are
//! never sent to the remote API.

use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::error::{CoreError, CoreResult};
use super::models::CreateTxForm;

pub type Draft = CreateTxForm;

#[derive(Debug)]
pub struct DraftStore {
    path: PathBuf,
    key: String,
    write_lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> BTreeMap<String, serde_json::Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Cannot read draft file {}: {}", self.path.display(), e);
                }
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Ignoring corrupt draft file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    async fn write_all(&self, map: &BTreeMap<String, serde_json::Value>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| CoreError::Draft {
                    message: format!("{}: {}", parent.display(), e),
                })?;
            }
        }
        let content = serde_json::to_string_pretty(map).map_err(|e| CoreError::Draft {
            message: e.to_string(),
        })?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| CoreError::Draft {
                message: format!("{}: {}", self.path.display(), e),
            })
    }

    /// The saved draft, or `None` if absent or unreadable
    pub async fn load(&self) -> Option<Draft> {
        let map = self.read_all().await;
        let value = map.get(&self.key)?.clone();
        match serde_json::from_value(value) {
            Ok(draft) => Some(draft),
            Err(e) => {
                log::warn!("Ignoring malformed draft under {}: {}", self.key, e);
                None
            }
        }
    }

    pub async fn save(&self, draft: &Draft) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await;
        let value = serde_json::to_value(draft).map_err(|e| CoreError::Draft {
            message: e.to_string(),
        })?;
        map.insert(self.key.clone(), value);
        self.write_all(&map).await
    }

    pub async fn clear(&self) -> CoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_all().await;
        if map.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_all(&map).await
    }
}
