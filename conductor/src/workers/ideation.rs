//! Produces customer questions and groups them into FAQ categories.

use std::rc::Rc;

use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::core::artifacts::{ProductRecord, structure_questions};
use crate::core::keys;
use crate::core::reply::parse_lines;
use crate::io::oracle::Oracle;
use crate::io::prompt::PromptEngine;
use crate::store::Store;
use crate::workers::{Worker, require_oracle};

/// How many questions the oracle is asked for.
pub const QUESTION_COUNT: usize = 20;

const SIMULATED_QUESTIONS: [&str; 16] = [
    "How do I apply this serum?",
    "Should I use it in the morning or at night?",
    "Can I add it to my existing routine?",
    "How many drops should I use?",
    "Is it safe for sensitive skin?",
    "Can it cause irritation?",
    "Is it suitable for every skin type?",
    "What should I do if I have a reaction?",
    "What percent of vitamin C does it contain?",
    "Why is ferulic acid in the formula?",
    "Does vitamin C oxidize over time?",
    "How does hyaluronic acid hydrate the skin?",
    "How long does one bottle last?",
    "Where is it made?",
    "Is it cruelty free?",
    "When will I see results?",
];

pub struct IdeationWorker {
    oracle: Option<Rc<dyn Oracle>>,
    prompts: Rc<PromptEngine>,
}

impl IdeationWorker {
    pub fn new(oracle: Option<Rc<dyn Oracle>>, prompts: Rc<PromptEngine>) -> Self {
        Self { oracle, prompts }
    }

    fn generate_questions(&self, store: &Store) -> Result<Vec<String>> {
        let product: ProductRecord = store.require_context(keys::PRODUCT_DATA)?;
        let oracle = require_oracle(&self.oracle)?;
        let prompt = self.prompts.render_questions(&product, QUESTION_COUNT)?;
        let reply = oracle.complete(&prompt).context("questions oracle call")?;
        let questions = parse_lines(&reply);
        if questions.is_empty() {
            bail!("oracle returned no questions");
        }
        Ok(questions)
    }
}

impl Worker for IdeationWorker {
    #[instrument(name = "ideation", skip_all)]
    fn execute(&self, store: &mut Store) -> Result<()> {
        if store.has_context(keys::STRUCTURED_FAQS) {
            return Ok(());
        }
        let questions: Vec<String> = if store.is_simulation() {
            SIMULATED_QUESTIONS.iter().map(|q| q.to_string()).collect()
        } else {
            self.generate_questions(store)?
        };
        info!(count = questions.len(), "questions generated");
        store.put_context(keys::RAW_QUESTIONS, &questions)?;

        let structured = structure_questions(&questions);
        store.put_context(keys::STRUCTURED_FAQS, &structured)?;
        store.append_log(
            keys::IDEATION_WORKER,
            format!("Categorized {} questions.", questions.len()),
        );
        Ok(())
    }
}
