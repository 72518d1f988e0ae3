//! Loading module-tagged JSON exports into the local store

use crate::db::Database;
use crate::error::{BlockhubError, Result};
use crate::repository::RawItem;
use crate::search::Module;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default file mask for directory imports
pub const DEFAULT_PATTERN: &str = "**/*.json";

/// A file that could not be imported
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub files: usize,
    pub items: usize,
    pub per_module: BTreeMap<Module, usize>,
    pub skipped: Vec<SkippedFile>,
}

/// Parse a JSON document holding one item or an array of items
pub fn parse_items(json: &str) -> Result<Vec<RawItem>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    match value {
        serde_json::Value::Array(_) => Ok(serde_json::from_value(value)?),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        other => Err(BlockhubError::Parse(format!(
            "expected an item object or an array of items, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// JSON files under `base_path` whose relative path matches `pattern`
pub fn scan_directory(base_path: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let glob_pattern = glob::Pattern::new(pattern)?;
    let mut json_files = Vec::new();

    for entry in WalkDir::new(base_path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            e.depth() == 0
                || (!name.starts_with('.')
                    && !matches!(name.as_ref(), "node_modules" | "target"))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(base_path) {
            if glob_pattern.matches(&relative.to_string_lossy()) {
                json_files.push(path.to_path_buf());
            }
        }
    }

    Ok(json_files)
}

fn read_file(path: &Path) -> Result<Vec<RawItem>> {
    let content = fs::read_to_string(path).map_err(|e| {
        BlockhubError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;
    parse_items(&content)
        .map_err(|e| BlockhubError::Parse(format!("{}: {}", path.display(), e)))
}

/// Import a file, or every matching file of a directory, into the store
///
/// Unreadable or malformed files are reported and skipped; items of the
/// remaining files are written in one transaction per file.
pub fn import_path(db: &mut Database, path: &Path, pattern: &str) -> Result<ImportReport> {
    let files = if path.is_dir() {
        scan_directory(path, pattern)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(BlockhubError::NotFound(format!(
            "import path does not exist: {}",
            path.display()
        )));
    };

    let mut report = ImportReport::default();
    for file in files {
        match read_file(&file) {
            Ok(items) => {
                let written = db.upsert_items(&items)?;
                for item in &items {
                    *report.per_module.entry(item.module()).or_insert(0) += 1;
                }
                report.files += 1;
                report.items += written;
                tracing::debug!(file = %file.display(), items = written, "Imported file");
            }
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "Skipping file");
                report.skipped.push(SkippedFile {
                    path: file,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        files = report.files,
        items = report.items,
        skipped = report.skipped.len(),
        "Import complete"
    );
    Ok(report)
}
