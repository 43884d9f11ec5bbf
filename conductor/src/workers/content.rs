//! Assembles the page artifacts from ingested and ideated context.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use crate::core::artifacts::{
    ProductRecord, StructuredFaqs, build_comparison_page, build_faq_page, build_product_page,
};
use crate::core::keys;
use crate::store::Store;
use crate::workers::Worker;

/// `generated_at` used in simulation mode so repeated runs match byte for byte.
pub const SIMULATED_GENERATED_AT: &str = "2000-01-01T00:00:00Z";

#[derive(Debug, Default)]
pub struct ContentWorker;

impl ContentWorker {
    pub fn new() -> Self {
        Self
    }
}

impl Worker for ContentWorker {
    #[instrument(name = "content", skip_all)]
    fn execute(&self, store: &mut Store) -> Result<()> {
        if !store.has_artifact(keys::FAQ_ARTIFACT) {
            let faqs: StructuredFaqs = store.require_context(keys::STRUCTURED_FAQS)?;
            let product: ProductRecord = store.require_context(keys::PRODUCT_DATA)?;
            let generated_at = if store.is_simulation() {
                SIMULATED_GENERATED_AT.to_string()
            } else {
                Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
            };
            let page = build_faq_page(&faqs, &product, &generated_at);
            debug!(total_questions = page.total_questions, "faq page built");
            store.put_artifact(keys::FAQ_ARTIFACT, &page)?;
            store.append_log(
                keys::CONTENT_WORKER,
                format!("Built FAQ page with {} questions.", page.total_questions),
            );
        }

        if !store.has_artifact(keys::PRODUCT_PAGE_ARTIFACT) {
            let product: ProductRecord = store.require_context(keys::PRODUCT_DATA)?;
            store.put_artifact(keys::PRODUCT_PAGE_ARTIFACT, &build_product_page(&product))?;
            store.append_log(keys::CONTENT_WORKER, "Built product page.");
        }

        if !store.has_artifact(keys::COMPARISON_PAGE_ARTIFACT) {
            let product: ProductRecord = store.require_context(keys::PRODUCT_DATA)?;
            let competitor: ProductRecord = store.require_context(keys::COMPETITOR_DATA)?;
            let page = build_comparison_page(&product, &competitor);
            store.put_artifact(keys::COMPARISON_PAGE_ARTIFACT, &page)?;
            store.append_log(
                keys::CONTENT_WORKER,
                format!("Built comparison page against {}.", competitor.product_name),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifacts::structure_questions;
    use crate::workers::ingest::{builtin_product, simulated_competitor};

    fn seeded_store() -> Store {
        let mut store = Store::with_simulation(true);
        store
            .put_context(keys::PRODUCT_DATA, &builtin_product())
            .expect("product");
        store
            .put_context(keys::COMPETITOR_DATA, &simulated_competitor())
            .expect("competitor");
        let faqs = structure_questions(&["How do I apply it?".to_string()]);
        store.put_context(keys::STRUCTURED_FAQS, &faqs).expect("faqs");
        store
    }

    #[test]
    fn builds_all_three_artifacts() {
        let mut store = seeded_store();
        ContentWorker::new().execute(&mut store).expect("execute");
        for key in keys::REQUIRED_ARTIFACTS {
            assert!(store.has_artifact(key), "missing {key}");
        }
        let faq = store.get_artifact(keys::FAQ_ARTIFACT).expect("faq");
        assert_eq!(faq["generated_at"], SIMULATED_GENERATED_AT);
        assert_eq!(faq["total_questions"], 1);
    }

    #[test]
    fn existing_artifacts_are_not_rebuilt() {
        let mut store = seeded_store();
        store.set_artifact(keys::PRODUCT_PAGE_ARTIFACT, serde_json::json!({"kept": true}));
        ContentWorker::new().execute(&mut store).expect("execute");
        assert_eq!(
            store.get_artifact(keys::PRODUCT_PAGE_ARTIFACT),
            Some(&serde_json::json!({"kept": true}))
        );
        let before = store.log().len();
        ContentWorker::new().execute(&mut store).expect("again");
        assert_eq!(store.log().len(), before);
    }

    #[test]
    fn missing_competitor_fails_after_earlier_pages() {
        let mut store = Store::with_simulation(true);
        store
            .put_context(keys::PRODUCT_DATA, &builtin_product())
            .expect("product");
        store
            .put_context(keys::STRUCTURED_FAQS, &structure_questions(&[]))
            .expect("faqs");
        let err = ContentWorker::new().execute(&mut store).unwrap_err();
        assert!(format!("{err:#}").contains(keys::COMPETITOR_DATA));
        assert!(store.has_artifact(keys::FAQ_ARTIFACT));
        assert!(!store.has_artifact(keys::COMPARISON_PAGE_ARTIFACT));
    }
}
