//! apidoc source files.
//!
//! Every call is rendered into the `.coffee` file of its group. Old generated files are removed
//! first so renamed groups don't leave stale documentation behind.

use crate::docs::api_call::{ApiCall, DOC_LINE_BREAK};
use crate::docs::snake_case;
use crate::serializer::{append_to_file, delete_files_with_extension};
use anyhow::Result;
use indexmap::IndexSet;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of generated apidoc source files
pub const DOC_FILE_EXTENSION: &str = "coffee";

/// File used for definition blocks that belong to no group
const UNGROUPED_FILE_STEM: &str = "definitions";

const GENERATED_FILE_WARNING: [&str; 5] = [
    "# ************************************************* #",
    "#       AUTO-GENERATED. DO NOT EDIT THIS FILE.      #",
    "# ************************************************* #",
    "#    Create your files in `resources/docs/manual`   #",
    "# ************************************************* #",
];

/// Name of the source file a call is written to
pub fn doc_file_name(call: &ApiCall) -> String {
    let group = if call.group().trim().is_empty() {
        UNGROUPED_FILE_STEM
    } else {
        call.group()
    };
    snake_case(&format!("{}.{}", group, DOC_FILE_EXTENSION))
}

/// Rendered block of one call, preceded by the generated-file warning
pub fn render_entry(call: &ApiCall) -> crate::error::Result<String> {
    let mut lines: Vec<String> = GENERATED_FILE_WARNING.iter().map(|l| l.to_string()).collect();
    lines.push(call.api_doc()?);
    lines.push(String::new());
    Ok(lines.join(DOC_LINE_BREAK))
}

/// Writes the apidoc source files for `calls` into `docs_dir`.
///
/// Returns the written files in the order they were first touched.
pub fn create_doc_source_files(calls: &[ApiCall], docs_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(docs_dir)?;
    delete_files_with_extension(docs_dir, DOC_FILE_EXTENSION)?;

    let mut written = IndexSet::new();
    for call in calls {
        let path = docs_dir.join(doc_file_name(call));
        append_to_file(&render_entry(call)?, &path)?;
        written.insert(path);
    }

    info!("File(s) generated at {}", docs_dir.display());
    Ok(written.into_iter().collect())
}
