//! Device-local persistence for anonymous workflow progress.
//!
//! Values are JSON under versioned keys. Reads never fail: anything missing,
//! unparsable or of the wrong shape is treated as "no local state".

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::WorkflowState;

pub const BREACH_STATE_KEY: &str = "breach_workflow_state.v1";
pub const DIRECT_STATE_KEY: &str = "freeze_flow_state.v1";
pub const SESSION_ID_KEY: &str = "freeze_session_id.v1";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values
            .lock()
            .map(|values| values.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("local store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("local store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("local store lock poisoned"))?;
        values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading local key {key}")),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        // Write-then-rename: readers never observe a partial value.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).with_context(|| format!("writing local key {key}"))?;
        std::fs::rename(&tmp, self.path(key)).with_context(|| format!("storing local key {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing local key {key}")),
        }
    }
}

/// Which entry point produced an anonymous workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocalSource {
    Direct,
    Breach(String),
}

impl LocalSource {
    pub fn breach_code(&self) -> Option<&str> {
        match self {
            Self::Direct => None,
            Self::Breach(code) => Some(code),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalWorkflowState {
    pub source: LocalSource,
    #[serde(flatten)]
    pub progress: WorkflowState,
}

impl LocalWorkflowState {
    pub fn direct() -> Self {
        Self {
            source: LocalSource::Direct,
            progress: WorkflowState::default(),
        }
    }

    pub fn breach(code: impl Into<String>) -> Self {
        Self {
            source: LocalSource::Breach(code.into()),
            progress: WorkflowState::default(),
        }
    }

    fn key(&self) -> &'static str {
        match self.source {
            LocalSource::Direct => DIRECT_STATE_KEY,
            LocalSource::Breach(_) => BREACH_STATE_KEY,
        }
    }
}

/// Typed access to the anonymous workflow keys of a [`KeyValueStore`].
#[derive(Debug)]
pub struct LocalWorkflowStore<K> {
    kv: K,
}

impl<K: KeyValueStore> LocalWorkflowStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Breach-sourced state; a value of any other shape is discarded.
    pub fn load_breach(&self) -> Option<LocalWorkflowState> {
        self.load(BREACH_STATE_KEY).filter(|state| {
            let ok = matches!(state.source, LocalSource::Breach(_));
            if !ok {
                tracing::warn!(key = BREACH_STATE_KEY, "Discarding local state with mismatched source");
            }
            ok
        })
    }

    /// Whatever is stored under the direct key. Callers decide whether its source is acceptable.
    pub fn load_direct(&self) -> Option<LocalWorkflowState> {
        self.load(DIRECT_STATE_KEY)
    }

    /// Best effort: a failed write is logged and otherwise ignored.
    pub fn save(&self, state: &LocalWorkflowState) {
        let key = state.key();
        let result = serde_json::to_string(state)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.kv.set(key, &json));
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "Failed to save local workflow state");
        }
    }

    /// Removes both workflow keys. The session id is left alone.
    pub fn clear_all(&self) -> Result<()> {
        self.kv.remove(BREACH_STATE_KEY)?;
        self.kv.remove(DIRECT_STATE_KEY)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Option<LocalWorkflowState> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Local store unavailable, starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding unreadable local workflow state");
                None
            }
        }
    }
}
