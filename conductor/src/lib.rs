//! Phase-based step scheduler driving content workers over a shared store.
//!
//! A run alternates between two phases. In PLANNING a [`planner::Planner`]
//! looks at a key-level snapshot of the [`store::Store`] and picks the next
//! worker (or FINISH/ERROR). In EXECUTION the chosen [`workers::Worker`] reads
//! and writes the store. The layout keeps the same split throughout:
//!
//! - **[`core`]**: Pure, deterministic logic (decision table, reply parsing,
//!   page builders). No I/O.
//! - **[`io`]**: Side-effecting adapters (config files, oracle subprocess,
//!   prompt rendering, export).
//!
//! [`scheduler`], [`looping`] and [`start`] tie the two together for the CLI.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod planner;
pub mod scheduler;
pub mod start;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workers;
