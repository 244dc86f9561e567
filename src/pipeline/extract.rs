// src/pipeline/extract.rs

//! Offline extraction of a saved thread page.

use std::path::Path;

use crate::error::Result;
use crate::models::{Config, Message, sort_chronologically};
use crate::services::RecordExtractor;
use crate::storage::{ArchiveOutcome, ArchiveWriter};

/// Messages pulled from a saved page, and how many were newly archived.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub messages: Vec<Message>,
    pub archived: usize,
}

/// Extract messages from an HTML file, optionally appending them to `archive_type`.
pub async fn run_extract(
    config: &Config,
    html_path: &Path,
    archive_type: Option<&str>,
) -> Result<ExtractOutcome> {
    let markup = tokio::fs::read_to_string(html_path).await?;
    let extractor = RecordExtractor::new(&config.selectors)?;

    let mut messages = extractor.extract(&markup);
    if config.traversal.chronological {
        sort_chronologically(&mut messages);
    }
    log::info!(
        "Extracted {} messages from {}",
        messages.len(),
        html_path.display()
    );

    let mut outcome = ExtractOutcome::default();
    if let Some(archive_type) = archive_type {
        let mut writer = ArchiveWriter::open(&config.archive, archive_type).await?;
        for message in &messages {
            if writer.archive(message).await? == ArchiveOutcome::Written {
                outcome.archived += 1;
            }
        }
        let summary = writer.close().await?;
        log::info!(
            "Archived {} messages to {} ({} duplicates)",
            summary.written,
            summary.path.display(),
            summary.duplicates
        );
    }

    outcome.messages = messages;
    Ok(outcome)
}
