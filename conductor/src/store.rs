//! Shared in-memory blackboard for a single run.
//!
//! The store is the only channel between workers, and between workers and the
//! planner. Every mutation appends a log entry, so the log alone answers
//! "what happened when".

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::keys;
use crate::core::types::{LogEntry, StoreSnapshot};

/// Log source for mutations the store records on its own.
pub const SYSTEM_SOURCE: &str = "system";
/// Log source used by [`Store::record_error`].
pub const ERROR_SOURCE: &str = "error";

/// Number of trailing log entries exposed to planners.
const SNAPSHOT_LOG_TAIL: usize = 3;

/// Context, artifacts, append-only log and sticky errors for one run.
#[derive(Debug, Default)]
pub struct Store {
    context: BTreeMap<String, Value>,
    artifacts: BTreeMap<String, Value>,
    log: Vec<LogEntry>,
    errors: Vec<String>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the simulation flag.
    pub fn with_simulation(simulation: bool) -> Self {
        let mut store = Self::new();
        store.set_context(keys::SIMULATION_MODE, Value::Bool(simulation));
        store
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!(key = %key, "context updated");
        self.append_log(SYSTEM_SOURCE, format!("Updated context: {key}"));
        self.context.insert(key, value);
    }

    pub fn set_artifact(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        debug!(key = %key, "artifact saved");
        self.append_log(SYSTEM_SOURCE, format!("Saved artifact: {key}"));
        self.artifacts.insert(key, value);
    }

    /// Serialize `value` and store it under `key` in the context.
    pub fn put_context<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_value(value).with_context(|| format!("serialize {key}"))?;
        self.set_context(key, json);
        Ok(())
    }

    /// Serialize `value` and store it as artifact `key`.
    pub fn put_artifact<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_value(value).with_context(|| format!("serialize {key}"))?;
        self.set_artifact(key, json);
        Ok(())
    }

    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    pub fn get_artifact(&self, key: &str) -> Option<&Value> {
        self.artifacts.get(key)
    }

    pub fn has_context(&self, key: &str) -> bool {
        self.context.contains_key(key)
    }

    pub fn has_artifact(&self, key: &str) -> bool {
        self.artifacts.contains_key(key)
    }

    /// Deserialize a context value. `Ok(None)` when the key is absent.
    pub fn context_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get_context(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .with_context(|| format!("context key '{key}' has unexpected shape"))
            })
            .transpose()
    }

    /// Like [`Store::context_as`] but absence is an error.
    pub fn require_context<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.context_as(key)?
            .ok_or_else(|| anyhow!("context key '{key}' is missing"))
    }

    pub fn append_log(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.log.push(LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            source: source.into(),
            message: message.into(),
        });
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "error recorded");
        self.errors.push(message.clone());
        self.append_log(ERROR_SOURCE, message);
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn artifacts(&self) -> &BTreeMap<String, Value> {
        &self.artifacts
    }

    /// Simulation is on only when the flag is stored as JSON `true`.
    pub fn is_simulation(&self) -> bool {
        matches!(self.get_context(keys::SIMULATION_MODE), Some(Value::Bool(true)))
    }

    /// Key-level view of the store for planners.
    pub fn snapshot(&self) -> StoreSnapshot {
        let tail_start = self.log.len().saturating_sub(SNAPSHOT_LOG_TAIL);
        StoreSnapshot {
            simulation: self.is_simulation(),
            context_keys: self.context.keys().cloned().collect(),
            artifact_keys: self.artifacts.keys().cloned().collect(),
            validation_report: self
                .get_context(keys::VALIDATION_REPORT)
                .and_then(Value::as_str)
                .map(str::to_string),
            recent_log: self.log[tail_start..].to_vec(),
        }
    }
}
