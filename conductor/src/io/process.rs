//! Child process execution with a timeout and bounded captured output.

use std::io::{ErrorKind, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// What a finished (or killed) child produced.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    /// Bytes discarded past the output limit, across both streams.
    pub truncated_bytes: usize,
    pub timed_out: bool,
}

/// Run `cmd`, feeding `stdin`, and wait at most `timeout`.
///
/// Stdin is written and both output pipes are drained on background threads,
/// so neither a child that ignores its input nor a chatty child can block the
/// timeout. Bytes past `output_limit_bytes` per stream are dropped but still
/// drained. The child is always reaped, on error paths too.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_with_timeout(
    mut cmd: Command,
    stdin: &[u8],
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CapturedOutput> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().context("spawn command")?;
    debug!(pid = child.id(), "child spawned");

    match collect(&mut child, stdin.to_vec(), timeout, output_limit_bytes) {
        Ok(output) => Ok(output),
        Err(err) => {
            // kill fails once the child has exited; wait still reaps it.
            let _ = child.kill();
            let _ = child.wait();
            Err(err)
        }
    }
}

fn collect(
    child: &mut Child,
    stdin: Vec<u8>,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CapturedOutput> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;
    let mut child_stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("stdin was not piped"))?;
    let stdout_handle = thread::spawn(move || drain_limited(stdout, output_limit_bytes));
    let stderr_handle = thread::spawn(move || drain_limited(stderr, output_limit_bytes));
    let stdin_handle = thread::spawn(move || match child_stdin.write_all(&stdin) {
        Err(err) if err.kind() != ErrorKind::BrokenPipe => Err(err),
        _ => Ok(()),
    });

    let (status, timed_out) = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => (status, false),
        None => {
            warn!(timeout_secs = timeout.as_secs(), "command timed out, killing");
            child.kill().context("kill command")?;
            (child.wait().context("wait command after kill")?, true)
        }
    };

    match stdin_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "write stdin failed"),
        Err(_) => return Err(anyhow!("stdin writer thread panicked")),
    }
    let (stdout, stdout_dropped) = join_drain(stdout_handle).context("join stdout")?;
    let (stderr, stderr_dropped) = join_drain(stderr_handle).context("join stderr")?;
    let truncated_bytes = stdout_dropped + stderr_dropped;
    if truncated_bytes > 0 {
        warn!(truncated_bytes, "command output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CapturedOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        truncated_bytes,
        timed_out,
    })
}

fn join_drain(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

fn drain_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut kept = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(kept.len()));
        kept.extend_from_slice(&chunk[..keep]);
        dropped += n - keep;
    }
    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn echoes_stdin_back() {
        let out = run_with_timeout(sh("cat"), b"hello", Duration::from_secs(5), 1024)
            .expect("run");
        assert!(out.status.success());
        assert_eq!(out.stdout, "hello");
        assert!(!out.timed_out);
    }

    #[test]
    fn truncates_past_limit() {
        let out = run_with_timeout(sh("printf 0123456789"), b"", Duration::from_secs(5), 4)
            .expect("run");
        assert_eq!(out.stdout, "0123");
        assert_eq!(out.truncated_bytes, 6);
    }

    #[test]
    fn kills_on_timeout() {
        let out = run_with_timeout(sh("sleep 5"), b"", Duration::from_millis(100), 1024)
            .expect("run");
        assert!(out.timed_out);
    }

    #[test]
    fn unread_stdin_does_not_defeat_timeout() {
        let input = vec![b'x'; 1024 * 1024];
        let started = Instant::now();
        let out = run_with_timeout(sh("exec sleep 3"), &input, Duration::from_millis(100), 1024)
            .expect("run");
        assert!(out.timed_out);
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    }

    #[test]
    fn child_exiting_without_reading_stdin_is_not_an_error() {
        let input = vec![b'x'; 1024 * 1024];
        let out = run_with_timeout(sh("exit 0"), &input, Duration::from_secs(5), 1024)
            .expect("run");
        assert!(out.status.success());
        assert!(!out.timed_out);
    }

    #[test]
    fn captures_stderr_on_failure() {
        let out = run_with_timeout(sh("echo nope >&2; exit 3"), b"", Duration::from_secs(5), 1024)
            .expect("run");
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(out.stderr.trim(), "nope");
    }
}
