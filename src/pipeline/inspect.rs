// src/pipeline/inspect.rs

//! Read-back summary of an archive stream.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{Config, Conversation};
use crate::storage::{archive_path, read_archive};

/// What a conversation stream holds.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub conversations: usize,
    pub distinct_names: usize,
    pub messages: usize,
    pub undated: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
}

/// Summarize the conversation stream `archive_type`.
pub async fn run_inspect(config: &Config, archive_type: &str) -> Result<ArchiveStats> {
    let path = archive_path(&config.archive.dir, archive_type)?;
    let conversations: Vec<Conversation> = read_archive(&path).await?;

    let mut stats = ArchiveStats {
        conversations: conversations.len(),
        ..ArchiveStats::default()
    };
    let mut names = HashSet::new();

    for convo in &conversations {
        names.insert(convo.name.as_str());
        stats.messages += convo.messages.len();
        match convo.date {
            Some(date) => {
                stats.earliest = Some(stats.earliest.map_or(date, |e| e.min(date)));
                stats.latest = Some(stats.latest.map_or(date, |l| l.max(date)));
            }
            None => stats.undated += 1,
        }
    }
    stats.distinct_names = names.len();

    log::info!(
        "{}: {} conversations ({} distinct names), {} messages",
        path.display(),
        stats.conversations,
        stats.distinct_names,
        stats.messages
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationStub, Message};
    use crate::storage::ArchiveWriter;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_inspect_counts() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.archive.dir = tmp.path().to_path_buf();

        let mut writer = ArchiveWriter::open(&config.archive, "conversations")
            .await
            .unwrap();
        for stub in [
            ConversationStub::new("u1", "Alice", Some(day(2018, 3, 1))),
            ConversationStub::new("u2", "Bob", Some(day(2016, 1, 9))),
            ConversationStub::new("u3", "Carol", None),
        ] {
            let convo = stub.hydrate(vec![Message::new("x", "y", None)]);
            writer.archive(&convo).await.unwrap();
        }
        writer.close().await.unwrap();

        let stats = run_inspect(&config, "conversations").await.unwrap();
        assert_eq!(stats.conversations, 3);
        assert_eq!(stats.distinct_names, 3);
        assert_eq!(stats.messages, 3);
        assert_eq!(stats.undated, 1);
        assert_eq!(stats.earliest, Some(day(2016, 1, 9)));
        assert_eq!(stats.latest, Some(day(2018, 3, 1)));
    }

    #[tokio::test]
    async fn test_inspect_missing_stream() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.archive.dir = tmp.path().to_path_buf();
        assert_eq!(
            run_inspect(&config, "conversations").await.unwrap(),
            ArchiveStats::default()
        );
    }
}
