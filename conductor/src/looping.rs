//! Drives a scheduler until it stops.

use anyhow::{Result, anyhow};
use tracing::info;

use crate::core::types::{LogEntry, StepSignal};
use crate::scheduler::{Halt, Scheduler};
use crate::store::Store;

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Phase transitions performed.
    pub steps: u32,
    pub halt: Halt,
}

/// Call `step` until it returns [`StepSignal::Stop`].
///
/// `on_step` receives the log entries appended by each call, in order. The
/// scheduler's step budget guarantees termination.
pub fn run_to_completion<F: FnMut(&[LogEntry])>(
    scheduler: &mut Scheduler,
    store: &mut Store,
    mut on_step: F,
) -> Result<RunOutcome> {
    loop {
        let seen = store.log().len();
        let signal = scheduler.step(store);
        on_step(&store.log()[seen..]);
        if signal == StepSignal::Stop {
            break;
        }
    }
    let halt = scheduler
        .halt()
        .ok_or_else(|| anyhow!("scheduler stopped without a halt reason"))?;
    info!(steps = scheduler.steps_taken(), ?halt, "run finished");
    Ok(RunOutcome {
        steps: scheduler.steps_taken(),
        halt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Decision;
    use crate::test_support::{CountingWorker, ScriptedPlanner};
    use crate::workers::WorkerRegistry;

    #[test]
    fn callback_sees_every_entry_once() {
        let mut registry = WorkerRegistry::new();
        registry.register("w", CountingWorker::new("w"));
        let planner = ScriptedPlanner::new(vec![Ok(Decision::run("w", "go"))]);
        let mut scheduler = Scheduler::new(registry, Box::new(planner), 10);
        let mut store = Store::new();

        let mut streamed = Vec::new();
        let outcome = run_to_completion(&mut scheduler, &mut store, |entries| {
            streamed.extend_from_slice(entries);
        })
        .expect("run");

        assert_eq!(outcome, RunOutcome { steps: 3, halt: Halt::Finished });
        assert_eq!(streamed, store.log());
    }

    #[test]
    fn budget_bounds_a_looping_planner() {
        let mut registry = WorkerRegistry::new();
        registry.register("w", CountingWorker::new("w"));
        let decisions = (0..100).map(|_| Ok(Decision::run("w", "again"))).collect();
        let mut scheduler = Scheduler::new(registry, Box::new(ScriptedPlanner::new(decisions)), 5);
        let mut store = Store::new();
        let outcome = run_to_completion(&mut scheduler, &mut store, |_| {}).expect("run");
        assert_eq!(outcome.halt, Halt::BudgetExhausted);
        assert_eq!(outcome.steps, 5);
    }
}
