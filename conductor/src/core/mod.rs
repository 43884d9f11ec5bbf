//! Deterministic, pure logic shared by the scheduler and workers.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod artifacts;
pub mod keys;
pub mod logic;
pub mod policy;
pub mod reply;
pub mod types;
