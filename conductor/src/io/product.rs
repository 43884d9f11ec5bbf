//! Product record loading.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::core::artifacts::ProductRecord;

/// Read a JSON product record from disk.
pub fn load_product(path: &Path) -> Result<ProductRecord> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let product: ProductRecord = serde_json::from_str(&contents)
        .with_context(|| format!("parse product record {}", path.display()))?;
    if product.product_name.trim().is_empty() {
        bail!("product record {} has an empty product_name", path.display());
    }
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_record_with_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("product.json");
        fs::write(&path, r#"{"product_name": "Dew Mist", "price": 12.5, "size": "100ml"}"#)
            .expect("write");
        let product = load_product(&path).expect("load");
        assert_eq!(product.product_name, "Dew Mist");
        assert!(product.ingredients.is_empty());
    }

    #[test]
    fn rejects_blank_name() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("product.json");
        fs::write(&path, r#"{"product_name": " ", "price": 1.0}"#).expect("write");
        assert!(load_product(&path).is_err());
    }

    #[test]
    fn missing_file_names_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_product(&temp.path().join("nope.json")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.json"));
    }
}
