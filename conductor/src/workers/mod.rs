//! Workers and the registry the scheduler dispatches through.
//!
//! A worker reads what it needs from the [`Store`], writes its results back and
//! returns. Every worker guards on its own output keys, so running it twice
//! leaves the store as it was after the first successful run.

use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use tracing::debug;

use crate::io::oracle::Oracle;
use crate::store::Store;

pub mod content;
pub mod ideation;
pub mod ingest;
pub mod validator;

/// A named unit of work executed during the EXECUTION phase.
pub trait Worker {
    fn execute(&self, store: &mut Store) -> Result<()>;
}

/// Name to worker mapping, iterated in name order.
#[derive(Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<String, Box<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `worker` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, worker: impl Worker + 'static) {
        let name = name.into();
        if self.workers.insert(name.clone(), Box::new(worker)).is_some() {
            debug!(worker = %name, "worker re-registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Worker> {
        self.workers.get(name).map(Box::as_ref)
    }

    pub fn names(&self) -> Vec<String> {
        self.workers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// The oracle a worker was built with, or an error when the run has none.
pub(crate) fn require_oracle(oracle: &Option<Rc<dyn Oracle>>) -> Result<&dyn Oracle> {
    oracle
        .as_deref()
        .ok_or_else(|| anyhow!("no oracle configured"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingWorker;

    #[test]
    fn register_overwrites_silently() {
        let first = CountingWorker::new("first");
        let second = CountingWorker::new("second");
        let mut registry = WorkerRegistry::new();
        registry.register("w", first.clone());
        registry.register("w", second.clone());
        assert_eq!(registry.len(), 1);

        let mut store = Store::new();
        registry.get("w").expect("worker").execute(&mut store).expect("execute");
        assert_eq!(first.calls(), 0);
        assert_eq!(second.calls(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = WorkerRegistry::new();
        registry.register("validator", CountingWorker::new("validator"));
        registry.register("ingest", CountingWorker::new("ingest"));
        assert_eq!(registry.names(), vec!["ingest", "validator"]);
        assert!(registry.get("content").is_none());
    }
}
