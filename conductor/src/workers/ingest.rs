//! Loads the primary product and obtains a competitor to compare against.

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use crate::core::artifacts::ProductRecord;
use crate::core::keys;
use crate::core::reply::strip_code_fences;
use crate::io::oracle::Oracle;
use crate::io::prompt::PromptEngine;
use crate::store::Store;
use crate::workers::{Worker, require_oracle};

/// The product the pipeline describes when no `product_path` is configured.
pub fn builtin_product() -> ProductRecord {
    ProductRecord {
        product_name: "GlowBoost Vitamin C Serum".to_string(),
        category: "Serum".to_string(),
        size: "30ml".to_string(),
        price: 29.99,
        ingredients: vec![
            "Vitamin C (20%)".to_string(),
            "Vitamin E".to_string(),
            "Hyaluronic Acid".to_string(),
            "Ferulic Acid".to_string(),
        ],
        claims: vec![
            "Brightens skin".to_string(),
            "Reduces fine lines".to_string(),
            "Hydrates".to_string(),
            "Protects against UV".to_string(),
        ],
        usage_instructions: "Apply 3-4 drops to clean, dry skin every morning before sunscreen."
            .to_string(),
        safety_warnings:
            "For external use only. Patch test before first use. Avoid contact with eyes."
                .to_string(),
    }
}

/// Competitor used in simulation mode.
pub fn simulated_competitor() -> ProductRecord {
    ProductRecord {
        product_name: "LuminaEssence Brightening Drops".to_string(),
        category: "Serum".to_string(),
        size: "50ml".to_string(),
        price: 34.50,
        ingredients: vec![
            "Vitamin C (15%)".to_string(),
            "Niacinamide".to_string(),
            "Hyaluronic Acid".to_string(),
            "Vitamin E".to_string(),
        ],
        claims: vec!["Evens skin tone".to_string(), "Boosts radiance".to_string()],
        usage_instructions: "Use 2 drops morning and night after cleansing.".to_string(),
        safety_warnings: "Discontinue use if irritation occurs.".to_string(),
    }
}

pub struct IngestWorker {
    product: ProductRecord,
    oracle: Option<Rc<dyn Oracle>>,
    prompts: Rc<PromptEngine>,
}

impl IngestWorker {
    pub fn new(
        product: ProductRecord,
        oracle: Option<Rc<dyn Oracle>>,
        prompts: Rc<PromptEngine>,
    ) -> Self {
        Self {
            product,
            oracle,
            prompts,
        }
    }

    fn generate_competitor(&self, product: &ProductRecord) -> Result<ProductRecord> {
        let oracle = require_oracle(&self.oracle)?;
        let prompt = self.prompts.render_competitor(product)?;
        let reply = oracle.complete(&prompt).context("competitor oracle call")?;
        let competitor: ProductRecord = serde_json::from_str(&strip_code_fences(&reply))
            .context("parse competitor record")?;
        if competitor.product_name.trim().is_empty() {
            bail!("competitor record has an empty product_name");
        }
        Ok(competitor)
    }
}

impl Worker for IngestWorker {
    #[instrument(name = "ingest", skip_all)]
    fn execute(&self, store: &mut Store) -> Result<()> {
        if !store.has_context(keys::PRODUCT_DATA) {
            store.put_context(keys::PRODUCT_DATA, &self.product)?;
            store.append_log(
                keys::INGEST_WORKER,
                format!("Loaded product data: {}", self.product.product_name),
            );
        }

        if store.has_context(keys::COMPETITOR_DATA) {
            return Ok(());
        }
        let competitor = if store.is_simulation() {
            simulated_competitor()
        } else {
            let product: ProductRecord = store.require_context(keys::PRODUCT_DATA)?;
            match self.generate_competitor(&product) {
                Ok(competitor) => competitor,
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "competitor generation failed");
                    store.append_log(keys::INGEST_WORKER, "Failed to generate competitor.");
                    return Err(err);
                }
            }
        };
        info!(competitor = %competitor.product_name, "competitor ready");
        store.put_context(keys::COMPETITOR_DATA, &competitor)?;
        store.append_log(
            keys::INGEST_WORKER,
            format!("Competitor data ready: {}", competitor.product_name),
        );
        Ok(())
    }
}
