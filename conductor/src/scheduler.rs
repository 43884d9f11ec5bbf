//! Two-phase step scheduler.
//!
//! Each call to [`Scheduler::step`] performs exactly one phase transition:
//! PLANNING asks the planner for a decision, EXECUTION runs the worker chosen
//! by the previous planning step. The scheduler never retries on its own; the
//! driver decides whether to call `step` again.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, instrument, warn};

use crate::core::policy;
use crate::core::reply::is_quota_signal;
use crate::core::types::{Action, Decision, Phase, StepSignal};
use crate::planner::Planner;
use crate::store::Store;
use crate::workers::WorkerRegistry;

/// Log source for scheduler entries.
pub const SUPERVISOR_SOURCE: &str = "Supervisor";

/// Why the scheduler stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// The planner chose FINISH (including the planning-error fail-safe).
    Finished,
    /// A configuration error: no credentials or an unregistered worker.
    Errored,
    /// `max_steps` transitions were taken without reaching FINISH.
    BudgetExhausted,
}

pub struct Scheduler {
    registry: WorkerRegistry,
    planner: Box<dyn Planner>,
    phase: Phase,
    pending: Option<String>,
    max_steps: u32,
    steps_taken: u32,
    halt: Option<Halt>,
}

impl Scheduler {
    pub fn new(registry: WorkerRegistry, planner: Box<dyn Planner>, max_steps: u32) -> Self {
        Self {
            registry,
            planner,
            phase: Phase::Planning,
            pending: None,
            max_steps,
            steps_taken: 0,
            halt: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Worker chosen by the last planning step and not yet executed.
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }

    pub fn worker_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Perform one phase transition.
    ///
    /// Once a step has returned [`StepSignal::Stop`], every later call returns
    /// `Stop` again without touching the store.
    #[instrument(skip_all, fields(phase = self.phase.as_str(), step = self.steps_taken + 1))]
    pub fn step(&mut self, store: &mut Store) -> StepSignal {
        if self.halt.is_some() {
            return StepSignal::Stop;
        }
        if self.steps_taken >= self.max_steps {
            warn!(max_steps = self.max_steps, "step budget exhausted");
            store.record_error(format!(
                "{SUPERVISOR_SOURCE}: step budget of {} exhausted",
                self.max_steps
            ));
            return self.stop(Halt::BudgetExhausted);
        }
        self.steps_taken += 1;
        match self.phase {
            Phase::Planning => self.plan(store),
            Phase::Execution => self.execute(store),
        }
    }

    fn plan(&mut self, store: &mut Store) -> StepSignal {
        let decision = self.decide(store);
        info!(action = %decision.action, reason = %decision.reason, "decision");
        store.append_log(
            SUPERVISOR_SOURCE,
            format!("Decision: {} ({})", decision.action, decision.reason),
        );
        match decision.action {
            Action::Finish => self.stop(Halt::Finished),
            Action::Error => {
                store.record_error(format!("{SUPERVISOR_SOURCE}: {}", decision.reason));
                self.stop(Halt::Errored)
            }
            Action::Run(name) => {
                self.pending = Some(name);
                self.phase = Phase::Execution;
                StepSignal::Continue
            }
        }
    }

    /// Ask the planner, turning any planning error into a safe FINISH.
    fn decide(&self, store: &mut Store) -> Decision {
        match self.planner.decide(&store.snapshot()) {
            Ok(decision) => decision,
            Err(err) => {
                let detail = format!("{err:#}");
                warn!(error = %detail, "planning failed");
                if is_quota_signal(&detail) {
                    store.append_log(
                        SUPERVISOR_SOURCE,
                        format!("Quota limit hit while planning: {detail}"),
                    );
                }
                store.record_error(format!("{SUPERVISOR_SOURCE}: planning error: {detail}"));
                Decision::finish(policy::PLANNING_ERROR)
            }
        }
    }

    fn execute(&mut self, store: &mut Store) -> StepSignal {
        self.phase = Phase::Planning;
        let Some(name) = self.pending.take() else {
            debug!("execution phase without a pending worker");
            return StepSignal::Continue;
        };
        let Some(worker) = self.registry.get(&name) else {
            store.record_error(format!(
                "{SUPERVISOR_SOURCE}: no worker registered as {name}"
            ));
            self.halt = Some(Halt::Errored);
            return StepSignal::Stop;
        };

        debug!(worker = %name, "executing worker");
        match catch_unwind(AssertUnwindSafe(|| worker.execute(store))) {
            Ok(Ok(())) => debug!(worker = %name, "worker finished"),
            Ok(Err(err)) => {
                store.record_error(format!("Agent {name} crashed: {err:#}"));
            }
            Err(payload) => {
                store.record_error(format!(
                    "Agent {name} crashed: {}",
                    panic_message(payload.as_ref())
                ));
            }
        }
        StepSignal::Continue
    }

    fn stop(&mut self, halt: Halt) -> StepSignal {
        debug!(?halt, steps = self.steps_taken, "scheduler halted");
        self.halt = Some(halt);
        StepSignal::Stop
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
