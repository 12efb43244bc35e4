//! Serialization and file output for the generated artifacts.
//!
//! Documents are serialized as pretty-printed JSON and written whole; a crash mid-write can leave
//! a partial file behind, which the next run simply overwrites.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Serializes a document to JSON format with pretty printing.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Example
///
/// ```
/// use api_docs_generator::postman::PostmanEnvironment;
/// use api_docs_generator::serializer::serialize_json;
///
/// let environment = PostmanEnvironment::new("Shop", "shop.test");
/// let json = serialize_json(&environment).unwrap();
/// assert!(json.contains("\"_postman_variable_scope\": \"environment\""));
/// ```
pub fn serialize_json<T: Serialize + ?Sized>(doc: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and its parent directories if they don't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Appends string content to a file, creating it when missing.
pub fn append_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Appending content to file: {}", path.display());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open file for appending: {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to append to file: {}", path.display()))?;
    Ok(())
}

/// Deletes the files with the given extension directly inside `dir`.
///
/// Subdirectories are left alone. Returns the deleted paths.
pub fn delete_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    if !dir.is_dir() {
        return Ok(deleted);
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(extension) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to delete file: {}", path.display()))?;
            debug!("Deleted stale file {}", path.display());
            deleted.push(path.to_path_buf());
        }
    }

    Ok(deleted)
}
