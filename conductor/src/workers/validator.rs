//! Checks the generated artifacts and stores a PASS/FAIL verdict.
//!
//! Structure is checked locally first (JSON Schema plus two content rules).
//! Only structurally sound artifacts are sent to the oracle for an audit, so a
//! broken page never costs an oracle call.

use std::rc::Rc;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::core::keys;
use crate::core::reply::parse_audit;
use crate::io::oracle::Oracle;
use crate::io::prompt::{AuditArtifact, PromptEngine};
use crate::store::Store;
use crate::workers::{Worker, require_oracle};

/// Smallest FAQ that passes validation.
pub const MIN_FAQ_QUESTIONS: u64 = 3;

const FAQ_SCHEMA: &str = include_str!("../../schemas/faq.schema.json");
const PRODUCT_PAGE_SCHEMA: &str = include_str!("../../schemas/product_page.schema.json");
const COMPARISON_PAGE_SCHEMA: &str = include_str!("../../schemas/comparison_page.schema.json");

const ARTIFACT_SCHEMAS: [(&str, &str); 3] = [
    (keys::FAQ_ARTIFACT, FAQ_SCHEMA),
    (keys::PRODUCT_PAGE_ARTIFACT, PRODUCT_PAGE_SCHEMA),
    (keys::COMPARISON_PAGE_ARTIFACT, COMPARISON_PAGE_SCHEMA),
];

pub struct ValidatorWorker {
    oracle: Option<Rc<dyn Oracle>>,
    prompts: Rc<PromptEngine>,
}

impl ValidatorWorker {
    pub fn new(oracle: Option<Rc<dyn Oracle>>, prompts: Rc<PromptEngine>) -> Self {
        Self { oracle, prompts }
    }

    fn audit(&self, store: &Store) -> Result<(String, String)> {
        let oracle = require_oracle(&self.oracle)?;
        let mut artifacts = Vec::with_capacity(keys::REQUIRED_ARTIFACTS.len());
        for key in keys::REQUIRED_ARTIFACTS {
            let body = match store.get_artifact(key) {
                Some(value) => serde_json::to_string_pretty(value)
                    .with_context(|| format!("serialize {key}"))?,
                None => String::new(),
            };
            artifacts.push(AuditArtifact {
                name: key.to_string(),
                body,
            });
        }
        let prompt = self
            .prompts
            .render_audit(&artifacts, MIN_FAQ_QUESTIONS as usize)?;
        let reply = oracle.complete(&prompt).context("audit oracle call")?;
        Ok(match parse_audit(&reply) {
            Ok(audit) => (audit.status, audit.critique),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "audit reply unusable");
                (
                    keys::FAIL.to_string(),
                    format!("Unparsable audit reply: {err:#}"),
                )
            }
        })
    }
}

impl Worker for ValidatorWorker {
    #[instrument(name = "validator", skip_all)]
    fn execute(&self, store: &mut Store) -> Result<()> {
        if store.has_context(keys::VALIDATION_REPORT) {
            return Ok(());
        }
        let (status, critique) = if store.is_simulation() {
            (keys::PASS.to_string(), "Simulated validation.".to_string())
        } else {
            let problems = structural_problems(store)?;
            if problems.is_empty() {
                self.audit(store)?
            } else {
                (keys::FAIL.to_string(), problems.join("; "))
            }
        };
        info!(status = %status, "validation finished");
        store.set_context(keys::VALIDATION_CRITIQUE, Value::String(critique.clone()));
        store.set_context(keys::VALIDATION_REPORT, Value::String(status.clone()));
        store.append_log(
            keys::VALIDATOR_WORKER,
            format!("Validation {status}: {critique}"),
        );
        Ok(())
    }
}

/// Schema violations and content rule failures across the required artifacts.
///
/// An empty result means the artifacts are structurally sound.
pub fn structural_problems(store: &Store) -> Result<Vec<String>> {
    let mut problems = Vec::new();
    for (key, schema_raw) in ARTIFACT_SCHEMAS {
        let Some(instance) = store.get_artifact(key) else {
            problems.push(format!("{key} is missing"));
            continue;
        };
        let schema: Value =
            serde_json::from_str(schema_raw).with_context(|| format!("parse schema for {key}"))?;
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&schema)
            .with_context(|| format!("compile schema for {key}"))?;
        problems.extend(
            compiled
                .iter_errors(instance)
                .map(|err| format!("{key}: {err}")),
        );
    }

    if let Some(faq) = store.get_artifact(keys::FAQ_ARTIFACT) {
        let total = faq["total_questions"].as_u64().unwrap_or(0);
        if total < MIN_FAQ_QUESTIONS {
            problems.push(format!(
                "{} has {total} questions, expected at least {MIN_FAQ_QUESTIONS}",
                keys::FAQ_ARTIFACT
            ));
        }
    }
    if let Some(page) = store.get_artifact(keys::PRODUCT_PAGE_ARTIFACT) {
        let price = page["specifications"]["price"].as_f64().unwrap_or(0.0);
        if price <= 0.0 {
            problems.push(format!(
                "{} must state a price above zero",
                keys::PRODUCT_PAGE_ARTIFACT
            ));
        }
    }
    Ok(problems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::{
        build_comparison_page, build_faq_page, build_product_page, structure_questions,
    };
    use crate::test_support::ScriptedOracle;
    use crate::workers::ingest::{builtin_product, simulated_competitor};
    use serde_json::json;

    fn worker(oracle: Option<Rc<dyn Oracle>>) -> ValidatorWorker {
        ValidatorWorker::new(oracle, Rc::new(PromptEngine::new().expect("engine")))
    }

    fn store_with_pages(questions: usize) -> Store {
        let product = builtin_product();
        let mut store = Store::with_simulation(false);
        let asked: Vec<String> = (0..questions).map(|i| format!("Question {i}?")).collect();
        let faq = build_faq_page(&structure_questions(&asked), &product, "2000-01-01T00:00:00Z");
        store.put_artifact(keys::FAQ_ARTIFACT, &faq).expect("faq");
        store
            .put_artifact(keys::PRODUCT_PAGE_ARTIFACT, &build_product_page(&product))
            .expect("product page");
        store
            .put_artifact(
                keys::COMPARISON_PAGE_ARTIFACT,
                &build_comparison_page(&product, &simulated_competitor()),
            )
            .expect("comparison page");
        store
    }

    fn report(store: &Store) -> Option<&str> {
        store
            .get_context(keys::VALIDATION_REPORT)
            .and_then(Value::as_str)
    }

    #[test]
    fn simulation_passes_without_oracle() {
        let mut store = Store::with_simulation(true);
        worker(None).execute(&mut store).expect("execute");
        assert_eq!(report(&store), Some(keys::PASS));
    }

    #[test]
    fn built_pages_are_structurally_sound() {
        let store = store_with_pages(5);
        assert!(structural_problems(&store).expect("check").is_empty());
    }

    #[test]
    fn short_faq_fails_without_calling_oracle() {
        let oracle = ScriptedOracle::new(Vec::new());
        let mut store = store_with_pages(2);
        worker(Some(oracle.shared())).execute(&mut store).expect("execute");
        assert_eq!(report(&store), Some(keys::FAIL));
        let critique = store
            .get_context(keys::VALIDATION_CRITIQUE)
            .and_then(Value::as_str)
            .expect("critique");
        assert!(critique.contains("expected at least 3"), "{critique}");
        assert!(oracle.prompts().is_empty());
    }

    #[test]
    fn schema_violation_is_reported() {
        let mut store = store_with_pages(5);
        store.set_artifact(keys::COMPARISON_PAGE_ARTIFACT, json!({"summary": "x"}));
        let problems = structural_problems(&store).expect("check");
        assert!(
            problems
                .iter()
                .any(|p| p.starts_with(keys::COMPARISON_PAGE_ARTIFACT)),
            "{problems:?}"
        );
    }

    #[test]
    fn oracle_verdict_is_stored() {
        let oracle = ScriptedOracle::new(vec![Ok(
            "{\"status\": \"PASS\", \"critique\": \"Looks good\"}".to_string(),
        )]);
        let mut store = store_with_pages(5);
        worker(Some(oracle.shared())).execute(&mut store).expect("execute");
        assert_eq!(report(&store), Some(keys::PASS));
        assert!(oracle.prompts()[0].contains("### comparison_page.json"));
        let last = store.log().last().expect("log");
        assert_eq!(last.message, "Validation PASS: Looks good");
    }

    #[test]
    fn unparsable_verdict_fails() {
        let oracle = ScriptedOracle::new(vec![Ok("PASS!".to_string())]);
        let mut store = store_with_pages(5);
        worker(Some(oracle.shared())).execute(&mut store).expect("execute");
        assert_eq!(report(&store), Some(keys::FAIL));
    }

    #[test]
    fn oracle_failure_leaves_report_unset() {
        let oracle = ScriptedOracle::new(vec![Err("connection reset".to_string())]);
        let mut store = store_with_pages(5);
        assert!(worker(Some(oracle.shared())).execute(&mut store).is_err());
        assert!(report(&store).is_none());
    }
}
