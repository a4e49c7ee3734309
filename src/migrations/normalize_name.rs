use bson::Document;
use futures::TryStreamExt;

use super::{MigrationId, MigrationReport};
use crate::db::repository::ChannelRepository;
use crate::error::MigrationError;
use crate::models::document::{document_label, required_str};
use crate::rules::normalize_host;

/// Replace a channel's `name` with its canonical host form.
///
/// Returns whether the name changed.
pub fn apply(channel: &mut Document) -> Result<bool, MigrationError> {
    let name = required_str(channel, "name")?;
    let normalized = normalize_host(name);
    if normalized == name {
        return Ok(false);
    }

    channel.insert("name", normalized);
    Ok(true)
}

pub async fn run(channels: &dyn ChannelRepository) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::new(MigrationId::ChannelsUpdateName);

    let mut all = channels.list_all().await?;
    while let Some(mut channel) = all.try_next().await? {
        report.scanned += 1;

        let before = channel.get_str("name").unwrap_or_default().to_string();
        if !apply(&mut channel)? {
            continue;
        }

        tracing::debug!(
            "Channel {}: {:?} -> {:?}",
            document_label(&channel),
            before,
            channel.get_str("name").unwrap_or_default()
        );

        if channels.replace(&channel).await? {
            report.modified += 1;
        }
    }

    tracing::info!("{}", report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::MockChannelRepository;
    use bson::doc;
    use futures::stream::{self, StreamExt};

    fn channel_stream(docs: Vec<Document>) -> crate::db::repository::DocumentStream {
        stream::iter(docs.into_iter().map(Ok)).boxed()
    }

    #[test]
    fn test_name_is_normalized() {
        let mut channel = doc! {
            "_id": 1,
            "name": "https://www.example.com/path/",
            "url": "https://www.example.com/path/",
        };
        assert!(apply(&mut channel).unwrap());
        assert_eq!(channel.get_str("name").unwrap(), "example.com/path");
        // Only `name` is rewritten.
        assert_eq!(channel.get_str("url").unwrap(), "https://www.example.com/path/");
    }

    #[test]
    fn test_canonical_name_is_unchanged() {
        let mut channel = doc! { "_id": 1, "name": "www.example" };
        assert!(!apply(&mut channel).unwrap());
        assert_eq!(channel.get_str("name").unwrap(), "www.example");
    }

    #[test]
    fn test_non_string_name_fails() {
        let mut channel = doc! { "_id": 1, "name": bson::Bson::Null };
        assert!(matches!(
            apply(&mut channel).unwrap_err(),
            MigrationError::InvalidDocument { .. }
        ));
    }

    #[tokio::test]
    async fn test_run_normalizes_every_channel() {
        let mut repo = MockChannelRepository::new();
        repo.expect_list_all().times(1).returning(|| {
            Ok(channel_stream(vec![
                doc! { "_id": 1, "name": "http://www3.sub.example.com/" },
                doc! { "_id": 2, "name": "example.com" },
                doc! { "_id": 3, "name": "example.com/a/b///" },
            ]))
        });
        repo.expect_replace()
            .times(2)
            .withf(|doc| {
                let name = doc.get_str("name").unwrap();
                name == "sub.example.com" || name == "example.com/a/b"
            })
            .returning(|_| Ok(true));

        let report = run(&repo).await.unwrap();
        assert_eq!(report.migration, MigrationId::ChannelsUpdateName);
        assert_eq!(report.scanned, 3);
        assert_eq!(report.modified, 2);
    }

    #[tokio::test]
    async fn test_unmodified_replace_is_not_counted() {
        let mut repo = MockChannelRepository::new();
        repo.expect_list_all()
            .returning(|| Ok(channel_stream(vec![doc! { "_id": 1, "name": "https://example.com" }])));
        repo.expect_replace().times(1).returning(|_| Ok(false));

        let report = run(&repo).await.unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.modified, 0);
    }
}
