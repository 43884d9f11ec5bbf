//! I/O adapters: configuration, subprocesses, oracle calls, prompts and export.

pub mod config;
pub mod export;
pub mod oracle;
pub mod process;
pub mod product;
pub mod prompt;
