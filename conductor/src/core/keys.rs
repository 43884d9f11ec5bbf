//! Well-known store keys and worker names for the content pipeline.
//!
//! Planners and workers only ever talk to each other through these keys, so
//! every name shared between them lives here.

/// Context flag that forces deterministic, offline behavior everywhere.
pub const SIMULATION_MODE: &str = "simulation_mode";

/// Primary product record ingested at the start of a run.
pub const PRODUCT_DATA: &str = "product_data";
/// Competitor product record used for the comparison page.
pub const COMPETITOR_DATA: &str = "competitor_data";
/// Candidate customer questions before categorization.
pub const RAW_QUESTIONS: &str = "raw_questions";
/// Questions grouped by category.
pub const STRUCTURED_FAQS: &str = "structured_faqs";
/// `"PASS"` or `"FAIL"` once the validator has run.
pub const VALIDATION_REPORT: &str = "validation_report";
/// Free-form explanation attached to the validation report.
pub const VALIDATION_CRITIQUE: &str = "validation_critique";

pub const FAQ_ARTIFACT: &str = "faq.json";
pub const PRODUCT_PAGE_ARTIFACT: &str = "product_page.json";
pub const COMPARISON_PAGE_ARTIFACT: &str = "comparison_page.json";

/// Artifacts that must exist before validation can run.
pub const REQUIRED_ARTIFACTS: [&str; 3] = [
    FAQ_ARTIFACT,
    PRODUCT_PAGE_ARTIFACT,
    COMPARISON_PAGE_ARTIFACT,
];

pub const PASS: &str = "PASS";
pub const FAIL: &str = "FAIL";

pub const INGEST_WORKER: &str = "ingest";
pub const IDEATION_WORKER: &str = "ideation";
pub const CONTENT_WORKER: &str = "content";
pub const VALIDATOR_WORKER: &str = "validator";

/// Worker names in pipeline order.
pub const WORKERS: [&str; 4] = [
    INGEST_WORKER,
    IDEATION_WORKER,
    CONTENT_WORKER,
    VALIDATOR_WORKER,
];
