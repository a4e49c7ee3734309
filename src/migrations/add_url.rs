use bson::Document;
use futures::TryStreamExt;

use super::{MigrationId, MigrationReport};
use crate::db::repository::ChannelRepository;
use crate::error::MigrationError;
use crate::models::document::{document_label, has_non_empty_str, required_str};
use crate::rules::derive_url;

/// Give a channel without a `url` one derived from its `name`.
///
/// Returns whether the document changed. Channels that already carry a
/// non-empty `url` are left alone.
pub fn apply(channel: &mut Document) -> Result<bool, MigrationError> {
    if has_non_empty_str(channel, "url") {
        return Ok(false);
    }

    let url = derive_url(required_str(channel, "name")?);
    channel.insert("url", url);
    Ok(true)
}

pub async fn run(channels: &dyn ChannelRepository) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::new(MigrationId::ChannelsAddUrl);

    let mut all = channels.list_all().await?;
    while let Some(mut channel) = all.try_next().await? {
        report.scanned += 1;

        if !apply(&mut channel)? {
            continue;
        }

        tracing::debug!(
            "Channel {} gets url {:?}",
            document_label(&channel),
            channel.get_str("url").unwrap_or_default()
        );

        if channels.replace(&channel).await? {
            report.modified += 1;
        }
    }

    tracing::info!("{}", report);
    Ok(report)
}
