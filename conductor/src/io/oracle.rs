//! Oracle abstraction for external text generation.
//!
//! The [`Oracle`] trait decouples planners and workers from the actual model
//! backend. The default backend is a subprocess that reads the prompt on stdin
//! and prints its reply; tests use scripted oracles that never spawn anything.

use std::env;
use std::process::Command;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info, instrument, warn};

use crate::io::config::OracleConfig;
use crate::io::process::run_with_timeout;

/// Synchronous, non-cancelable text completion.
pub trait Oracle {
    /// Return the reply to `prompt`, or an error whose message carries the
    /// backend's diagnostics (so quota signals stay visible to callers).
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle that spawns a configured command per call.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandOracle {
    /// Build the oracle only when its credential is present.
    ///
    /// Returns `None` when `api_key_env` is unset or blank: the run then has
    /// no model configured, which planners report as a configuration error.
    pub fn from_config(cfg: &OracleConfig) -> Option<Self> {
        let present = env::var(&cfg.api_key_env)
            .map(|value| !value.trim().is_empty())
            .unwrap_or(false);
        if !present {
            info!(env = %cfg.api_key_env, "oracle credential not set");
            return None;
        }
        Some(Self {
            command: cfg.command.clone(),
            timeout: cfg.timeout(),
            output_limit_bytes: cfg.output_limit_bytes,
        })
    }
}

impl Oracle for CommandOracle {
    #[instrument(skip_all, fields(program = self.command.first().map(String::as_str).unwrap_or_default(), prompt_bytes = prompt.len()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| anyhow!("oracle command is empty"))?;
        let mut cmd = Command::new(program);
        cmd.args(args);

        let output = run_with_timeout(cmd, prompt.as_bytes(), self.timeout, self.output_limit_bytes)
            .map_err(|err| anyhow!("run oracle command '{program}': {err:#}"))?;

        if output.timed_out {
            warn!(timeout_secs = self.timeout.as_secs(), "oracle timed out");
            return Err(anyhow!("oracle timed out after {:?}", self.timeout));
        }
        if !output.status.success() {
            warn!(exit_code = ?output.status.code(), "oracle failed");
            return Err(anyhow!(
                "oracle exited with status {:?}: {}",
                output.status.code(),
                output.stderr.trim()
            ));
        }
        let reply = output.stdout.trim().to_string();
        if reply.is_empty() {
            return Err(anyhow!("oracle returned an empty reply"));
        }
        debug!(reply_bytes = reply.len(), "oracle replied");
        Ok(reply)
    }
}
