//! Stable exit codes for conductor CLI commands.

/// The run reached FINISH (validation verdict and planning fail-safe included).
pub const OK: i32 = 0;
/// Invalid config, unreadable product file, or another I/O failure.
pub const INVALID: i32 = 1;
/// The run stopped on a configuration error (no credentials, unknown worker).
pub const ERROR: i32 = 2;
/// The step budget ran out before FINISH.
pub const BUDGET: i32 = 3;
