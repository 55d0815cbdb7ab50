use std::fmt::Debug;
use std::panic::{catch_unwind, UnwindSafe};
use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use tracing::warn;

/// Plain text from an uploaded file, chosen by extension.
///
/// `.pdf` goes through pdf-extract, `.docx` through docx-rs (body paragraphs,
/// one per line), `.txt` is decoded as lossy UTF-8. Anything else, and any
/// extraction failure, yields an empty string.
pub fn extract_text(filename: &str, bytes: &[u8]) -> String {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => guarded(filename, "PDF", || pdf_extract::extract_text_from_mem(bytes)),
        "docx" => guarded(filename, "DOCX", || {
            docx_rs::read_docx(bytes).map(|docx| docx_body_text(&docx.document.children))
        }),
        "txt" => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            warn!("Unsupported upload type '.{other}' for '{filename}'");
            String::new()
        }
    }
}

/// Runs a third-party parser; both errors and panics (pdf-extract panics on
/// some malformed documents) collapse to empty text.
fn guarded<F, E>(filename: &str, kind: &str, parse: F) -> String
where
    F: FnOnce() -> Result<String, E> + UnwindSafe,
    E: Debug,
{
    match catch_unwind(parse) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("{kind} extraction failed for '{filename}': {e:?}");
            String::new()
        }
        Err(_) => {
            warn!("{kind} extraction panicked for '{filename}'");
            String::new()
        }
    }
}

/// Non-empty body paragraphs joined by newlines. Tables and images are skipped.
fn docx_body_text(children: &[DocumentChild]) -> String {
    children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs within a paragraph are fragments of one line, so they join without a separator.
fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}
