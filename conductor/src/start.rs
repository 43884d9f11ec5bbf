//! Assembles a run from configuration: store, workers, planner and scheduler.

use std::rc::Rc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::keys;
use crate::io::config::{ConductorConfig, PlannerKind};
use crate::io::oracle::{CommandOracle, Oracle};
use crate::io::product::load_product;
use crate::io::prompt::PromptEngine;
use crate::planner::{OraclePlanner, Planner, RulePlanner};
use crate::scheduler::Scheduler;
use crate::store::Store;
use crate::workers::WorkerRegistry;
use crate::workers::content::ContentWorker;
use crate::workers::ideation::IdeationWorker;
use crate::workers::ingest::{IngestWorker, builtin_product};
use crate::workers::validator::ValidatorWorker;

/// Everything a driver needs to execute one run.
pub struct Run {
    pub store: Store,
    pub scheduler: Scheduler,
}

/// The oracle described by `cfg`, if its credential is present.
pub fn command_oracle(cfg: &ConductorConfig) -> Option<Rc<dyn Oracle>> {
    CommandOracle::from_config(&cfg.oracle).map(|oracle| Rc::new(oracle) as Rc<dyn Oracle>)
}

/// Build a fresh run.
///
/// `oracle` is `None` when no model is configured; outside simulation mode
/// the planner then stops the run with a configuration error.
pub fn assemble(cfg: &ConductorConfig, oracle: Option<Rc<dyn Oracle>>) -> Result<Run> {
    cfg.validate()?;
    let product = match &cfg.product_path {
        Some(path) => {
            load_product(path).with_context(|| format!("load product {}", path.display()))?
        }
        None => builtin_product(),
    };
    let prompts = Rc::new(PromptEngine::new()?);

    let mut registry = WorkerRegistry::new();
    registry.register(
        keys::INGEST_WORKER,
        IngestWorker::new(product, oracle.clone(), Rc::clone(&prompts)),
    );
    registry.register(
        keys::IDEATION_WORKER,
        IdeationWorker::new(oracle.clone(), Rc::clone(&prompts)),
    );
    registry.register(keys::CONTENT_WORKER, ContentWorker::new());
    registry.register(
        keys::VALIDATOR_WORKER,
        ValidatorWorker::new(oracle.clone(), Rc::clone(&prompts)),
    );
    debug!(workers = ?registry.names(), "workers registered");

    let credentials = oracle.is_some();
    let planner: Box<dyn Planner> = match cfg.planner {
        PlannerKind::Rules => Box::new(RulePlanner::new(credentials)),
        PlannerKind::Oracle => Box::new(OraclePlanner::new(oracle, prompts, registry.names())),
    };
    info!(
        simulation = cfg.simulation_mode,
        planner = ?cfg.planner,
        credentials,
        max_steps = cfg.max_steps,
        "run assembled"
    );

    Ok(Run {
        store: Store::with_simulation(cfg.simulation_mode),
        scheduler: Scheduler::new(registry, planner, cfg.max_steps),
    })
}
