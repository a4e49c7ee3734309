use bson::{Bson, Document};
use futures::TryStreamExt;

use super::{MigrationId, MigrationReport};
use crate::db::repository::{ChannelRepository, ItemRepository};
use crate::error::MigrationError;
use crate::models::document::document_label;
use crate::rules::timestamp::is_numeric;
use crate::rules::{upgrade_to_millis, Upgrade};

/// Upgrade an item's second-granularity `create_date` to milliseconds.
///
/// Items without a `create_date` (or with a null one) are skipped. Values
/// that are not numbers, or that overflow once scaled, are left in place
/// with a warning so the rest of the collection still gets migrated.
/// Returns whether the document changed.
pub fn apply(item: &mut Document, now_millis: i64) -> bool {
    let current = match item.get("create_date") {
        None | Some(Bson::Null) => return false,
        Some(value) => value,
    };

    if !is_numeric(current) {
        tracing::warn!(
            "Item {} has a non-numeric create_date ({:?}), leaving it unchanged",
            document_label(item),
            current.element_type()
        );
        return false;
    }

    let millis = match upgrade_to_millis(current, now_millis) {
        Ok(Upgrade::Unchanged) => return false,
        Ok(Upgrade::Millis(millis)) => millis,
        Err(e) => {
            tracing::warn!(
                "Item {} create_date {}: {}, leaving it unchanged",
                document_label(item),
                current,
                e
            );
            return false;
        }
    };

    let upgraded = Bson::Int64(millis);
    if *current == upgraded {
        return false;
    }
    item.insert("create_date", upgraded);
    true
}

/// Upgrade `create_date` on every item outside the channels whose
/// `source_type` is `excluded_source_type`.
pub async fn run(
    channels: &dyn ChannelRepository,
    items: &dyn ItemRepository,
    excluded_source_type: &str,
    now_millis: i64,
) -> Result<MigrationReport, MigrationError> {
    let mut report = MigrationReport::new(MigrationId::ItemsEditCreateDate);

    let excluded = channels.ids_by_source_type(excluded_source_type).await?;
    tracing::info!(
        "Skipping items of {} `{}` channel(s)",
        excluded.len(),
        excluded_source_type
    );

    let mut in_scope = items.list_outside_channels(&excluded).await?;
    while let Some(mut item) = in_scope.try_next().await? {
        report.scanned += 1;

        if !apply(&mut item, now_millis) {
            continue;
        }

        tracing::debug!(
            "Item {} create_date -> {}",
            document_label(&item),
            item.get_i64("create_date").unwrap_or_default()
        );

        if items.replace(&item).await? {
            report.modified += 1;
        }
    }

    tracing::info!("{}", report);
    Ok(report)
}
