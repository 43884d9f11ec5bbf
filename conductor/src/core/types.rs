//! Shared deterministic types for scheduler core logic.
//!
//! These types define stable contracts between the planner, the scheduler and
//! the store. They carry no I/O and must remain deterministic across runs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scheduler phase. Transitions happen only inside `Scheduler::step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Ask the planner what to do next.
    Planning,
    /// Run the worker chosen during the previous planning step.
    Execution,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Planning => "PLANNING",
            Phase::Execution => "EXECUTION",
        }
    }
}

/// What a single `step()` tells the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSignal {
    Continue,
    Stop,
}

/// Next action chosen by a planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run the named worker.
    Run(String),
    /// Goal reached (or planning failed safely); stop the run.
    Finish,
    /// Configuration fault; stop the run without retrying.
    Error,
}

impl Action {
    pub const FINISH: &'static str = "FINISH";
    pub const ERROR: &'static str = "ERROR";

    pub fn as_str(&self) -> &str {
        match self {
            Action::Run(name) => name,
            Action::Finish => Self::FINISH,
            Action::Error => Self::ERROR,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A planner decision plus the human-readable reason logged with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
}

impl Decision {
    pub fn run(worker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: Action::Run(worker.into()),
            reason: reason.into(),
        }
    }

    pub fn finish(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Finish,
            reason: reason.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            action: Action::Error,
            reason: reason.into(),
        }
    }
}

/// One record of the append-only store log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time (`HH:MM:SS`). Informational only; order is the vec order.
    pub timestamp: String,
    pub source: String,
    pub message: String,
}

/// Read-only view of the store handed to planners.
///
/// Planners see which keys exist, never the values workers keep privately.
/// The validation report is the single value exposed because it decides the
/// reason attached to the final decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub simulation: bool,
    pub context_keys: BTreeSet<String>,
    pub artifact_keys: BTreeSet<String>,
    pub validation_report: Option<String>,
    /// Last few log entries, oldest first.
    pub recent_log: Vec<LogEntry>,
}

impl StoreSnapshot {
    pub fn has_context(&self, key: &str) -> bool {
        self.context_keys.contains(key)
    }

    pub fn has_artifact(&self, key: &str) -> bool {
        self.artifact_keys.contains(key)
    }
}
