//! Writes the outcome of a run to an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::store::Store;

pub const TRACE_FILE: &str = "trace.json";
pub const ERRORS_FILE: &str = "errors.json";

/// Export every artifact (named by its key) plus the log and error list.
///
/// Returns the written paths in write order: artifacts sorted by key, then
/// the trace, then the errors.
pub fn export_run(store: &Store, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let mut written = Vec::new();
    for (key, value) in store.artifacts() {
        let path = out_dir.join(key);
        write_json(&path, value)?;
        written.push(path);
    }
    let trace_path = out_dir.join(TRACE_FILE);
    write_json(&trace_path, &store.log())?;
    written.push(trace_path);
    let errors_path = out_dir.join(ERRORS_FILE);
    write_json(&errors_path, &store.errors())?;
    written.push(errors_path);

    info!(dir = %out_dir.display(), files = written.len(), "run exported");
    Ok(written)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keys;
    use crate::core::types::LogEntry;
    use serde_json::json;

    #[test]
    fn writes_artifacts_trace_and_errors() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = Store::new();
        store.set_artifact(keys::PRODUCT_PAGE_ARTIFACT, json!({"call_to_action": "Add to Cart"}));
        store.record_error("Agent content crashed: boom");

        let out = temp.path().join("out");
        let written = export_run(&store, &out).expect("export");
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![keys::PRODUCT_PAGE_ARTIFACT, TRACE_FILE, ERRORS_FILE]);

        let page: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out.join(keys::PRODUCT_PAGE_ARTIFACT)).expect("read page"),
        )
        .expect("page json");
        assert_eq!(page["call_to_action"], "Add to Cart");

        let trace: Vec<LogEntry> =
            serde_json::from_str(&fs::read_to_string(out.join(TRACE_FILE)).expect("read trace"))
                .expect("trace json");
        assert_eq!(trace.len(), store.log().len());

        let errors: Vec<String> =
            serde_json::from_str(&fs::read_to_string(out.join(ERRORS_FILE)).expect("read errors"))
                .expect("errors json");
        assert_eq!(errors, vec!["Agent content crashed: boom"]);
    }
}
