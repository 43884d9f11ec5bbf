//! Planners turn a store snapshot into the next decision.
//!
//! A planner never mutates the store. Errors are returned to the scheduler,
//! which owns the fail-safe (see `Scheduler::step`).

use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::policy;
use crate::core::reply::parse_decision;
use crate::core::types::{Decision, StoreSnapshot};
use crate::io::oracle::Oracle;
use crate::io::prompt::PromptEngine;

pub trait Planner {
    fn decide(&self, snapshot: &StoreSnapshot) -> Result<Decision>;
}

/// Fixed rule table. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct RulePlanner {
    credentials: bool,
}

impl RulePlanner {
    /// `credentials` tells whether an oracle is configured for this run.
    pub fn new(credentials: bool) -> Self {
        Self { credentials }
    }
}

impl Planner for RulePlanner {
    fn decide(&self, snapshot: &StoreSnapshot) -> Result<Decision> {
        Ok(policy::decide(snapshot, self.credentials))
    }
}

/// Asks the oracle for the next action, constrained to the known workers.
///
/// In simulation mode the rule table answers instead, so simulated runs stay
/// deterministic and offline.
pub struct OraclePlanner {
    oracle: Option<Rc<dyn Oracle>>,
    prompts: Rc<PromptEngine>,
    workers: Vec<String>,
}

impl OraclePlanner {
    pub fn new(
        oracle: Option<Rc<dyn Oracle>>,
        prompts: Rc<PromptEngine>,
        workers: Vec<String>,
    ) -> Self {
        Self {
            oracle,
            prompts,
            workers,
        }
    }
}

impl Planner for OraclePlanner {
    #[instrument(name = "oracle_planner", skip_all)]
    fn decide(&self, snapshot: &StoreSnapshot) -> Result<Decision> {
        if snapshot.simulation {
            return Ok(policy::evaluate_rules(snapshot));
        }
        let Some(oracle) = self.oracle.as_deref() else {
            return Ok(Decision::error(policy::NO_CREDENTIALS));
        };
        let prompt = self.prompts.render_supervisor(snapshot, &self.workers)?;
        let reply = oracle.complete(&prompt).context("supervisor oracle call")?;
        debug!(reply = %reply, "supervisor replied");
        parse_decision(&reply, &self.workers)
    }
}
