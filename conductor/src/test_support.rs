//! Test-only oracles, workers, planners and store builders.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Result, anyhow, bail};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::artifacts::ProductRecord;
use crate::core::types::{Decision, StoreSnapshot};
use crate::io::oracle::Oracle;
use crate::planner::Planner;
use crate::store::Store;
use crate::workers::Worker;

#[derive(Default)]
struct Script {
    replies: RefCell<VecDeque<Result<String, String>>>,
    prompts: RefCell<Vec<String>>,
}

/// Oracle that answers from a fixed script and records every prompt.
///
/// `Err(text)` entries become errors carrying `text`. Running past the end of
/// the script is an error.
#[derive(Clone, Default)]
pub struct ScriptedOracle {
    script: Rc<Script>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        let oracle = Self::default();
        oracle.script.replies.borrow_mut().extend(replies);
        oracle
    }

    /// Handle to pass where an `Rc<dyn Oracle>` is expected; shares the script.
    pub fn shared(&self) -> Rc<dyn Oracle> {
        Rc::new(self.clone())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.script.prompts.borrow().clone()
    }
}

impl Oracle for ScriptedOracle {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.script.prompts.borrow_mut().push(prompt.to_string());
        match self.script.replies.borrow_mut().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => bail!("scripted oracle has no reply left"),
        }
    }
}

/// Worker that counts its calls and optionally sets marker context keys.
#[derive(Clone)]
pub struct CountingWorker {
    name: String,
    calls: Rc<Cell<u32>>,
    context_keys: Vec<String>,
}

impl CountingWorker {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: Rc::new(Cell::new(0)),
            context_keys: Vec::new(),
        }
    }

    /// Also set `key` in the context (to `true`) when it is absent.
    pub fn with_context(mut self, key: &str) -> Self {
        self.context_keys.push(key.to_string());
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl Worker for CountingWorker {
    fn execute(&self, store: &mut Store) -> Result<()> {
        self.calls.set(self.calls.get() + 1);
        store.append_log(self.name.as_str(), "ran");
        for key in &self.context_keys {
            if !store.has_context(key) {
                store.set_context(key.as_str(), Value::Bool(true));
            }
        }
        Ok(())
    }
}

/// Worker that always returns an error.
pub struct FailingWorker(pub &'static str);

impl Worker for FailingWorker {
    fn execute(&self, _store: &mut Store) -> Result<()> {
        bail!("{}", self.0)
    }
}

/// Worker that panics after writing one log entry.
pub struct PanickingWorker(pub &'static str);

impl Worker for PanickingWorker {
    fn execute(&self, store: &mut Store) -> Result<()> {
        store.append_log("panicker", "about to panic");
        panic!("{}", self.0);
    }
}

/// Planner that replays queued decisions, then finishes.
#[derive(Default)]
pub struct ScriptedPlanner {
    decisions: RefCell<VecDeque<Result<Decision, String>>>,
}

impl ScriptedPlanner {
    pub fn new(decisions: Vec<Result<Decision, String>>) -> Self {
        Self {
            decisions: RefCell::new(decisions.into()),
        }
    }
}

impl Planner for ScriptedPlanner {
    fn decide(&self, _snapshot: &StoreSnapshot) -> Result<Decision> {
        match self.decisions.borrow_mut().pop_front() {
            Some(Ok(decision)) => Ok(decision),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(Decision::finish("script exhausted")),
        }
    }
}

/// Store whose listed context keys and artifacts are all set to `true`.
pub fn store_with(simulation: bool, context_keys: &[&str], artifact_keys: &[&str]) -> Store {
    let mut store = Store::with_simulation(simulation);
    for key in context_keys {
        store.set_context(*key, Value::Bool(true));
    }
    for key in artifact_keys {
        store.set_artifact(*key, Value::Bool(true));
    }
    store
}

/// Write `product` as JSON into a fresh temp dir. Keep the dir alive while the
/// path is in use.
pub fn temp_product(product: &ProductRecord) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("product.json");
    let json = serde_json::to_string_pretty(product).expect("serialize product");
    fs::write(&path, json).expect("write product");
    (dir, path)
}
