//! Product records and the three page artifacts assembled from them.
//!
//! Builders here are pure: same inputs, same JSON. Callers decide timestamps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::logic::{
    Category, categorize_question, common_ingredients, price_comparison, price_per_ml,
};

/// Questions grouped by category, as stored under `structured_faqs`.
pub type StructuredFaqs = BTreeMap<Category, Vec<String>>;

/// Source data for a single product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    /// Volume as written on the label, e.g. `"30ml"`.
    #[serde(default)]
    pub size: String,
    pub price: f64,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub claims: Vec<String>,
    #[serde(default)]
    pub usage_instructions: String,
    #[serde(default)]
    pub safety_warnings: String,
}

impl ProductRecord {
    fn lead_claim(&self) -> &str {
        self.claims.first().map(String::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqPage {
    pub generated_at: String,
    pub categories: BTreeMap<Category, Vec<FaqEntry>>,
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSection {
    pub headline: String,
    pub key_benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specifications {
    pub price: f64,
    pub volume: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub meta: PageMeta,
    pub hero_section: HeroSection,
    pub specifications: Specifications,
    pub usage_guide: String,
    pub call_to_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedProducts {
    pub product_a: String,
    pub product_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub feature: String,
    pub product_a_val: String,
    pub product_b_val: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPage {
    pub products: ComparedProducts,
    pub comparison_points: Vec<ComparisonPoint>,
    pub summary: String,
}

/// Group questions by category, keeping input order inside each group.
///
/// Every category is present, possibly empty.
pub fn structure_questions(questions: &[String]) -> StructuredFaqs {
    let mut grouped: StructuredFaqs = Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for question in questions {
        grouped
            .entry(categorize_question(question))
            .or_default()
            .push(question.clone());
    }
    grouped
}

/// Assemble `faq.json`. Answers are drawn from the product record by category.
pub fn build_faq_page(
    faqs: &StructuredFaqs,
    product: &ProductRecord,
    generated_at: &str,
) -> FaqPage {
    let mut categories: BTreeMap<Category, Vec<FaqEntry>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    let mut total_questions = 0;
    for (category, questions) in faqs {
        let entries = categories.entry(*category).or_default();
        for question in questions {
            entries.push(FaqEntry {
                question: question.clone(),
                answer: answer_for(*category, product),
            });
            total_questions += 1;
        }
    }
    FaqPage {
        generated_at: generated_at.to_string(),
        categories,
        total_questions,
    }
}

fn answer_for(category: Category, product: &ProductRecord) -> String {
    let fallback = || format!("See the {} product page for details.", product.product_name);
    let text = match category {
        Category::Usage => product.usage_instructions.clone(),
        Category::Safety => product.safety_warnings.clone(),
        Category::Science if !product.ingredients.is_empty() => {
            format!("Key ingredients: {}.", product.ingredients.join(", "))
        }
        Category::General if !product.claims.is_empty() => {
            format!("{}: {}.", product.product_name, product.claims.join(", "))
        }
        Category::Science | Category::General => String::new(),
    };
    if text.trim().is_empty() {
        fallback()
    } else {
        text
    }
}

/// Assemble `product_page.json`.
pub fn build_product_page(product: &ProductRecord) -> ProductPage {
    let claim = product.lead_claim();
    ProductPage {
        meta: PageMeta {
            title: format!("{} - Official Store", product.product_name),
            description: format!("Buy {}. {}.", product.product_name, claim),
        },
        hero_section: HeroSection {
            headline: format!("Experience {claim}"),
            key_benefits: product.claims.clone(),
        },
        specifications: Specifications {
            price: product.price,
            volume: product.size.clone(),
            ingredients: product.ingredients.clone(),
        },
        usage_guide: product.usage_instructions.clone(),
        call_to_action: "Add to Cart".to_string(),
    }
}

/// Assemble `comparison_page.json` for `a` (ours) against `b` (competitor).
pub fn build_comparison_page(a: &ProductRecord, b: &ProductRecord) -> ComparisonPage {
    let per_ml_a = price_per_ml(a.price, &a.size);
    let per_ml_b = price_per_ml(b.price, &b.size);
    let ours_cheaper = per_ml_a <= per_ml_b;
    let value_winner = if ours_cheaper { a } else { b };
    let common = common_ingredients(&a.ingredients, &b.ingredients);

    let comparison_points = vec![
        ComparisonPoint {
            feature: "Price per ml".to_string(),
            product_a_val: format!("${per_ml_a:.2}/ml"),
            product_b_val: format!("${per_ml_b:.2}/ml"),
            winner: Some(value_winner.product_name.clone()),
            note: None,
        },
        ComparisonPoint {
            feature: "Price".to_string(),
            product_a_val: format!("${:.2}", a.price),
            product_b_val: format!("${:.2}", b.price),
            winner: None,
            note: Some(price_comparison(
                a.price,
                b.price,
                &a.product_name,
                &b.product_name,
            )),
        },
        ComparisonPoint {
            feature: "Common Ingredients".to_string(),
            product_a_val: common.len().to_string(),
            product_b_val: common.len().to_string(),
            winner: None,
            note: Some(format!("Both contain: {}", common.join(", "))),
        },
    ];

    let summary = if ours_cheaper {
        format!(
            "While {} is a strong competitor, {} offers better value at ${per_ml_a:.2}/ml.",
            b.product_name, a.product_name
        )
    } else {
        format!(
            "{} costs less per ml (${per_ml_b:.2}/ml), while {} leads on its formula.",
            b.product_name, a.product_name
        )
    };

    ComparisonPage {
        products: ComparedProducts {
            product_a: a.product_name.clone(),
            product_b: b.product_name.clone(),
        },
        comparison_points,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::ingest::{
        builtin_product as sample_product, simulated_competitor as sample_competitor,
    };

    #[test]
    fn structure_questions_keeps_every_category() {
        let grouped = structure_questions(&["How do I apply it?".to_string()]);
        assert_eq!(grouped.len(), 4);
        assert_eq!(grouped[&Category::Usage], vec!["How do I apply it?"]);
        assert!(grouped[&Category::Safety].is_empty());
    }

    #[test]
    fn faq_page_counts_questions_and_answers_from_product() {
        let product = sample_product();
        let faqs = structure_questions(&[
            "How do I apply it?".to_string(),
            "Is it safe for sensitive skin?".to_string(),
            "Where is it made?".to_string(),
        ]);
        let page = build_faq_page(&faqs, &product, "2000-01-01T00:00:00Z");
        assert_eq!(page.total_questions, 3);
        assert_eq!(
            page.categories[&Category::Usage][0].answer,
            product.usage_instructions
        );
        assert_eq!(page.generated_at, "2000-01-01T00:00:00Z");
    }

    #[test]
    fn product_page_uses_lead_claim() {
        let page = build_product_page(&sample_product());
        assert_eq!(page.meta.title, "GlowBoost Vitamin C Serum - Official Store");
        assert_eq!(page.hero_section.headline, "Experience Brightens skin");
        assert_eq!(page.call_to_action, "Add to Cart");
    }

    #[test]
    fn product_page_tolerates_missing_claims() {
        let mut product = sample_product();
        product.claims.clear();
        let page = build_product_page(&product);
        assert!(page.hero_section.key_benefits.is_empty());
    }

    #[test]
    fn comparison_picks_cheaper_per_ml() {
        let page = build_comparison_page(&sample_product(), &sample_competitor());
        let per_ml = &page.comparison_points[0];
        assert_eq!(per_ml.product_a_val, "$1.00/ml");
        assert_eq!(per_ml.product_b_val, "$0.69/ml");
        assert_eq!(
            per_ml.winner.as_deref(),
            Some("LuminaEssence Brightening Drops")
        );
        assert!(page.summary.starts_with("LuminaEssence"));
        assert!(page.summary.contains("($0.69/ml)"), "{}", page.summary);
        let common = &page.comparison_points[2];
        assert_eq!(common.product_a_val, "2");
    }
}
