//! Fixed decision table mapping store snapshots to the next action.
//!
//! The table is total: every snapshot yields exactly one decision. Rules are
//! evaluated top to bottom and the first unmet precondition wins.

use crate::core::keys;
use crate::core::types::{Decision, StoreSnapshot};

pub const NO_CREDENTIALS: &str = "no credentials";
pub const COMPLETE: &str = "complete";
pub const VALIDATION_FAILED: &str = "validation failed";
/// Reason attached to the safe FINISH that replaces a failed planning call.
pub const PLANNING_ERROR: &str = "planning error";

/// A "precondition -> worker" row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Worker that must run while the precondition is unmet.
    pub worker: &'static str,
    pub reason: &'static str,
    pub satisfied: fn(&StoreSnapshot) -> bool,
}

pub const RULES: [Rule; 4] = [
    Rule {
        worker: keys::INGEST_WORKER,
        reason: "product or competitor data missing",
        satisfied: ingested,
    },
    Rule {
        worker: keys::IDEATION_WORKER,
        reason: "structured FAQs missing",
        satisfied: ideated,
    },
    Rule {
        worker: keys::CONTENT_WORKER,
        reason: "required artifacts missing",
        satisfied: assembled,
    },
    Rule {
        worker: keys::VALIDATOR_WORKER,
        reason: "artifacts not validated",
        satisfied: validated,
    },
];

fn ingested(snapshot: &StoreSnapshot) -> bool {
    snapshot.has_context(keys::PRODUCT_DATA) && snapshot.has_context(keys::COMPETITOR_DATA)
}

fn ideated(snapshot: &StoreSnapshot) -> bool {
    snapshot.has_context(keys::STRUCTURED_FAQS)
}

fn assembled(snapshot: &StoreSnapshot) -> bool {
    keys::REQUIRED_ARTIFACTS
        .iter()
        .all(|key| snapshot.has_artifact(key))
}

fn validated(snapshot: &StoreSnapshot) -> bool {
    snapshot.has_context(keys::VALIDATION_REPORT)
}

/// Decide the next action.
///
/// `credentials` reports whether an external model is configured. Outside
/// simulation mode its absence is a terminal configuration error.
pub fn decide(snapshot: &StoreSnapshot, credentials: bool) -> Decision {
    if !snapshot.simulation && !credentials {
        return Decision::error(NO_CREDENTIALS);
    }
    evaluate_rules(snapshot)
}

/// Walk the rule table, ignoring the credential check.
pub fn evaluate_rules(snapshot: &StoreSnapshot) -> Decision {
    if let Some(rule) = RULES.iter().find(|rule| !(rule.satisfied)(snapshot)) {
        return Decision::run(rule.worker, rule.reason);
    }
    if snapshot.validation_report.as_deref() == Some(keys::FAIL) {
        return Decision::finish(VALIDATION_FAILED);
    }
    Decision::finish(COMPLETE)
}
