use async_trait::async_trait;
use bson::{Bson, Document};
use futures::stream::BoxStream;

use crate::error::MigrationError;

/// Documents read one at a time from an open cursor.
pub type DocumentStream = BoxStream<'static, Result<Document, MigrationError>>;

/// Access to the channels collection.
///
/// Channels are handled as raw documents so fields the migrations do not
/// know about survive the write-back untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Every channel in the collection.
    async fn list_all(&self) -> Result<DocumentStream, MigrationError>;

    /// The `id` field of every channel with the given `source_type`.
    ///
    /// Channels without an `id` contribute `Bson::Null`.
    async fn ids_by_source_type(&self, source_type: &str) -> Result<Vec<Bson>, MigrationError>;

    /// Overwrite the stored channel with the same `_id`.
    ///
    /// Returns whether the stored document changed.
    async fn replace(&self, doc: &Document) -> Result<bool, MigrationError>;
}

/// Access to the items collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Items whose `channel_id` is not one of `channel_ids`.
    async fn list_outside_channels(
        &self,
        channel_ids: &[Bson],
    ) -> Result<DocumentStream, MigrationError>;

    /// Overwrite the stored item with the same `_id`.
    ///
    /// Returns whether the stored document changed.
    async fn replace(&self, doc: &Document) -> Result<bool, MigrationError>;
}

/// MongoDB implementation of the ChannelRepository.
pub struct MongoChannelRepository {
    collection: mongodb::Collection<Document>,
}

impl MongoChannelRepository {
    pub fn new(db: &mongodb::Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl ChannelRepository for MongoChannelRepository {
    async fn list_all(&self) -> Result<DocumentStream, MigrationError> {
        use mongodb::bson::doc;

        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| MigrationError::Database(e.to_string()))?;

        Ok(into_stream(cursor))
    }

    async fn ids_by_source_type(&self, source_type: &str) -> Result<Vec<Bson>, MigrationError> {
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().projection(doc! { "id": 1 }).build();

        let cursor = self
            .collection
            .find(doc! { "source_type": source_type })
            .with_options(options)
            .await
            .map_err(|e| MigrationError::Database(e.to_string()))?;

        let channels = collect(cursor).await?;
        Ok(channels
            .into_iter()
            .map(|channel| channel.get("id").cloned().unwrap_or(Bson::Null))
            .collect())
    }

    async fn replace(&self, doc: &Document) -> Result<bool, MigrationError> {
        replace_by_id(&self.collection, doc).await
    }
}

/// MongoDB implementation of the ItemRepository.
pub struct MongoItemRepository {
    collection: mongodb::Collection<Document>,
}

impl MongoItemRepository {
    pub fn new(db: &mongodb::Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    async fn list_outside_channels(
        &self,
        channel_ids: &[Bson],
    ) -> Result<DocumentStream, MigrationError> {
        use mongodb::bson::doc;

        let cursor = self
            .collection
            .find(doc! { "channel_id": { "$nin": channel_ids.to_vec() } })
            .await
            .map_err(|e| MigrationError::Database(e.to_string()))?;

        Ok(into_stream(cursor))
    }

    async fn replace(&self, doc: &Document) -> Result<bool, MigrationError> {
        replace_by_id(&self.collection, doc).await
    }
}

fn into_stream(cursor: mongodb::Cursor<Document>) -> DocumentStream {
    use futures::{StreamExt, TryStreamExt};

    cursor
        .map_err(|e| MigrationError::Database(e.to_string()))
        .boxed()
}

async fn collect(
    mut cursor: mongodb::Cursor<Document>,
) -> Result<Vec<Document>, MigrationError> {
    use futures::TryStreamExt;

    let mut documents = Vec::new();
    while let Some(doc) = cursor
        .try_next()
        .await
        .map_err(|e| MigrationError::Database(e.to_string()))?
    {
        documents.push(doc);
    }

    Ok(documents)
}

async fn replace_by_id(
    collection: &mongodb::Collection<Document>,
    doc: &Document,
) -> Result<bool, MigrationError> {
    use crate::models::document::document_label;
    use mongodb::bson::doc;

    let id = doc
        .get("_id")
        .cloned()
        .ok_or_else(|| MigrationError::invalid_document(document_label(doc), "missing `_id`"))?;

    let result = collection
        .replace_one(doc! { "_id": id }, doc)
        .await
        .map_err(|e| MigrationError::Database(e.to_string()))?;

    Ok(result.modified_count > 0)
}
