//! Deterministic parsing of free-form oracle replies.
//!
//! Oracle output is untrusted text. Everything here either produces a value
//! that satisfies the caller's contract or an error; nothing is guessed.

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Deserialize;

use crate::core::keys;
use crate::core::types::{Action, Decision};

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*").expect("fence pattern is valid"));

static QUOTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b429\b|quota|rate[ _-]?limit|resource[ _-]?exhausted")
        .expect("quota pattern is valid")
});

/// Remove Markdown code fences (with or without a language tag) and trim.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Whether an error message carries a quota or rate-limit signal.
pub fn is_quota_signal(message: &str) -> bool {
    QUOTA_RE.is_match(message)
}

#[derive(Debug, Deserialize)]
struct RawDecision {
    next_action: String,
    #[serde(default)]
    reason: String,
}

/// Parse a supervisor reply of the form `{"next_action": ..., "reason": ...}`.
///
/// The action must be `FINISH` or one of `workers`. Anything else (including
/// `ERROR`, which only the configuration check may produce) is rejected.
pub fn parse_decision(text: &str, workers: &[String]) -> Result<Decision> {
    let cleaned = strip_code_fences(text);
    let raw: RawDecision =
        serde_json::from_str(&cleaned).context("parse supervisor reply as json")?;
    let action = raw.next_action.trim();
    let reason = raw.reason.trim().to_string();
    if action.eq_ignore_ascii_case(Action::FINISH) {
        return Ok(Decision::finish(reason));
    }
    match workers.iter().find(|name| name.as_str() == action) {
        Some(name) => Ok(Decision::run(name.clone(), reason)),
        None => Err(anyhow!("supervisor chose unknown action '{action}'")),
    }
}

/// Split a newline-separated list, dropping bullets, numbering and blanks.
pub fn parse_lines(text: &str) -> Vec<String> {
    static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").expect("bullet pattern is valid")
    });
    strip_code_fences(text)
        .lines()
        .map(|line| BULLET_RE.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Verdict returned by the audit prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    /// `PASS` or `FAIL`.
    pub status: String,
    pub critique: String,
}

#[derive(Debug, Deserialize)]
struct RawAudit {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    critique: Option<String>,
}

/// Parse `{"status": "PASS"|"FAIL", "critique": ...}`.
///
/// A missing or unrecognized status counts as `FAIL`.
pub fn parse_audit(text: &str) -> Result<Audit> {
    let cleaned = strip_code_fences(text);
    let raw: RawAudit = serde_json::from_str(&cleaned).context("parse audit reply as json")?;
    let status = match raw.status.as_deref().map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case(keys::PASS) => keys::PASS,
        _ => keys::FAIL,
    };
    Ok(Audit {
        status: status.to_string(),
        critique: raw
            .critique
            .unwrap_or_else(|| "No critique".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers() -> Vec<String> {
        keys::WORKERS.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn strips_json_fences() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(text), "{\"a\": 1}");
    }

    #[test]
    fn parses_worker_decision() {
        let text = "```json\n{\"next_action\": \"ideation\", \"reason\": \"faqs missing\"}\n```";
        let decision = parse_decision(text, &workers()).expect("decision");
        assert_eq!(decision, Decision::run("ideation", "faqs missing"));
    }

    #[test]
    fn parses_finish_case_insensitively() {
        let decision =
            parse_decision(r#"{"next_action": "finish", "reason": "done"}"#, &workers())
                .expect("decision");
        assert_eq!(decision.action, Action::Finish);
    }

    #[test]
    fn rejects_unknown_action() {
        let err = parse_decision(r#"{"next_action": "Publisher"}"#, &workers()).unwrap_err();
        assert!(err.to_string().contains("unknown action"));
    }

    #[test]
    fn rejects_error_action_from_oracle() {
        assert!(parse_decision(r#"{"next_action": "ERROR"}"#, &workers()).is_err());
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(parse_decision("I think you should run ideation next.", &workers()).is_err());
    }

    #[test]
    fn parse_lines_drops_bullets_and_blanks() {
        let lines = parse_lines("- How do I use it?\n\n2. Is it safe?\n* Why vitamin C?\n");
        assert_eq!(
            lines,
            vec!["How do I use it?", "Is it safe?", "Why vitamin C?"]
        );
    }

    #[test]
    fn audit_defaults_to_fail() {
        let audit = parse_audit(r#"{"critique": "missing price"}"#).expect("audit");
        assert_eq!(audit.status, keys::FAIL);
        let audit = parse_audit(r#"{"status": "pass"}"#).expect("audit");
        assert_eq!(audit.status, keys::PASS);
        assert_eq!(audit.critique, "No critique");
    }

    #[test]
    fn detects_quota_signals() {
        assert!(is_quota_signal("HTTP 429 Too Many Requests"));
        assert!(is_quota_signal("Resource exhausted: Quota exceeded"));
        assert!(is_quota_signal("rate limit reached"));
        assert!(!is_quota_signal("connection refused on port 4290"));
    }
}
