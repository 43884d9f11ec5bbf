//! Prompt rendering for oracle calls.

use anyhow::{Context, Result};
use minijinja::{Environment, context};
use serde::Serialize;
use tracing::debug;

use crate::core::artifacts::ProductRecord;
use crate::core::types::StoreSnapshot;

const SUPERVISOR_TEMPLATE: &str = include_str!("prompts/supervisor.md");
const COMPETITOR_TEMPLATE: &str = include_str!("prompts/competitor.md");
const QUESTIONS_TEMPLATE: &str = include_str!("prompts/questions.md");
const AUDIT_TEMPLATE: &str = include_str!("prompts/audit.md");

/// Artifact body embedded in the audit prompt.
#[derive(Debug, Clone, Serialize)]
pub struct AuditArtifact {
    pub name: String,
    pub body: String,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("supervisor", SUPERVISOR_TEMPLATE)
            .context("load supervisor template")?;
        env.add_template("competitor", COMPETITOR_TEMPLATE)
            .context("load competitor template")?;
        env.add_template("questions", QUESTIONS_TEMPLATE)
            .context("load questions template")?;
        env.add_template("audit", AUDIT_TEMPLATE)
            .context("load audit template")?;
        Ok(Self { env })
    }

    pub fn render_supervisor(&self, snapshot: &StoreSnapshot, workers: &[String]) -> Result<String> {
        let context_keys: Vec<&String> = snapshot.context_keys.iter().collect();
        let artifact_keys: Vec<&String> = snapshot.artifact_keys.iter().collect();
        self.render(
            "supervisor",
            context! {
                workers => workers,
                context_keys => context_keys,
                artifact_keys => artifact_keys,
                recent_log => &snapshot.recent_log,
            },
        )
    }

    pub fn render_competitor(&self, product: &ProductRecord) -> Result<String> {
        self.render("competitor", context! { product => product })
    }

    pub fn render_questions(&self, product: &ProductRecord, count: usize) -> Result<String> {
        self.render("questions", context! { product => product, count => count })
    }

    pub fn render_audit(&self, artifacts: &[AuditArtifact], min_questions: usize) -> Result<String> {
        self.render(
            "audit",
            context! { artifacts => artifacts, min_questions => min_questions },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        let template = self
            .env
            .get_template(name)
            .with_context(|| format!("get template {name}"))?;
        let rendered = template
            .render(ctx)
            .with_context(|| format!("render template {name}"))?;
        debug!(template = name, bytes = rendered.len(), "prompt rendered");
        Ok(rendered)
    }
}
