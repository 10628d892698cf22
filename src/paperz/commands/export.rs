use std::path::PathBuf;

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::merge::{self, MergeMode};
use crate::model::Document;
use crate::pattern::{unique_name, Pattern};
use crate::remote::{RemoteClient, Transport};

/// How a batch of documents is exported to disk.
#[derive(Debug, Default)]
pub struct ExportOptions {
    /// Compiled filename pattern; falls back to the document title.
    pub pattern: Option<Pattern>,
    /// Caller override for the base filename.
    pub output: Option<String>,
    /// Download thumbnails (PNG) instead of the archived PDFs.
    pub thumbnails: bool,
    /// Merge the batch into one composite artifact afterwards.
    pub merge: bool,
    /// Output name for the composite; derived from the batch when absent.
    pub merge_output: Option<String>,
    /// Directory the artifacts are written into.
    pub directory: PathBuf,
}

/// Download one artifact per document, with collision-free filenames,
/// and optionally merge the batch into a single annotated composite.
pub fn run<T: Transport>(
    client: &RemoteClient<T>,
    docs: &[Document],
    options: &ExportOptions,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if docs.is_empty() {
        result.add_message(CmdMessage::info("No documents to export."));
        return Ok(result);
    }

    let ext = if options.thumbnails { ".png" } else { ".pdf" };
    let mut taken: Vec<String> = Vec::new();
    let mut files: Vec<PathBuf> = Vec::new();
    let mut dates: Vec<String> = Vec::new();
    let mut labels: Vec<String> = Vec::new();

    for doc in docs {
        let base = match (&options.output, &options.pattern) {
            (Some(output), _) => output.clone(),
            (None, Some(pattern)) => {
                let rendered = pattern.render(doc);
                if rendered.is_empty() {
                    doc.title.clone()
                } else {
                    rendered
                }
            }
            (None, None) => doc.title.clone(),
        };
        let candidate = with_extension(&sanitize_filename(&base), ext);
        let name = unique_name(&candidate, &taken);
        taken.push(name.clone());

        let dest = options.directory.join(&name);
        let downloaded = if options.thumbnails {
            client.download_thumbnail(doc.id, &dest)
        } else {
            client.download_pdf(doc.id, &dest)
        };
        match downloaded {
            Ok(()) => {
                dates.push(doc.created_date().to_string());
                labels.push(doc.title.clone());
                files.push(dest);
            }
            Err(err) => {
                result.add_message(CmdMessage::warning(format!(
                    "Skipping document {}: {}",
                    doc.id, err
                )));
            }
        }
    }

    if options.merge && !files.is_empty() {
        let merge_ext = if options.thumbnails { ".gif" } else { ".pdf" };
        let merge_name = options
            .merge_output
            .clone()
            .unwrap_or_else(|| format!("Docs-merged{}", merge_ext));
        let merge_path = options.directory.join(&merge_name);
        let mode = if options.thumbnails {
            MergeMode::Images
        } else {
            MergeMode::Pdf
        };
        merge::merge(&files, &dates, Some(&labels), &merge_path, mode)?;
        result.add_message(CmdMessage::success(format!("Merged into {}", merge_name)));
        return Ok(result.with_merged_file(merge_path));
    }

    result.add_message(CmdMessage::success(format!(
        "Exported {} file(s)",
        files.len()
    )));
    Ok(result.with_files(files))
}

/// Default composite name for a batch: the effective criteria, slugified,
/// prefixed `Docs-`.
pub fn default_merge_name(description: &str, images: bool) -> String {
    let ext = if images { ".gif" } else { ".pdf" };
    format!("Docs-{}{}", slugify(description), ext)
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_dash = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn with_extension(name: &str, ext: &str) -> String {
    if name.to_lowercase().ends_with(ext) {
        name.to_string()
    } else {
        format!("{}{}", name, ext)
    }
}
