//! Reusable deterministic building blocks for content assembly.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// FAQ category assigned by keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Usage,
    Safety,
    Science,
    General,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Usage,
        Category::Safety,
        Category::Science,
        Category::General,
    ];
}

const SAFETY_WORDS: [&str; 4] = ["safe", "irritation", "skin type", "reaction"];
const USAGE_WORDS: [&str; 5] = ["use", "apply", "morning", "night", "routine"];
const SCIENCE_WORDS: [&str; 4] = ["acid", "percent", "formula", "oxidize"];

/// Price per millilitre, rounded to cents.
///
/// Returns `0.0` when the volume cannot be parsed or is zero.
pub fn price_per_ml(price: f64, volume: &str) -> f64 {
    let cleaned = volume.to_lowercase().replace("ml", "");
    match cleaned.trim().parse::<f64>() {
        Ok(vol) if vol > 0.0 => (price / vol * 100.0).round() / 100.0,
        _ => 0.0,
    }
}

/// Ingredients present in both lists, compared case-insensitively.
///
/// The result is lowercased and sorted so it is stable across runs.
pub fn common_ingredients(a: &[String], b: &[String]) -> Vec<String> {
    let left: BTreeSet<String> = a.iter().map(|i| i.to_lowercase()).collect();
    let right: BTreeSet<String> = b.iter().map(|i| i.to_lowercase()).collect();
    left.intersection(&right).cloned().collect()
}

/// One-line statement of which product is cheaper and by how much.
pub fn price_comparison(price_a: f64, price_b: f64, name_a: &str, name_b: &str) -> String {
    let diff = (price_a - price_b).abs();
    let cheaper = if price_a < price_b { name_a } else { name_b };
    format!("{cheaper} is cheaper by ${diff:.2}")
}

/// Keyword-based categorizer. Safety wins over usage, usage over science.
pub fn categorize_question(question: &str) -> Category {
    let lower = question.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if mentions(&SAFETY_WORDS) {
        Category::Safety
    } else if mentions(&USAGE_WORDS) {
        Category::Usage
    } else if mentions(&SCIENCE_WORDS) {
        Category::Science
    } else {
        Category::General
    }
}
