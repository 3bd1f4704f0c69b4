//! MongoDB implementation of ContactRepository

use async_trait::async_trait;
use database::mongodb::{to_stored_document, uuid_bson};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ContactError, ContactResult};
use crate::models::{ContactFilter, ContactMessage, MessageStatus};
use crate::repository::ContactRepository;

const COLLECTION: &str = "contact_messages";

pub struct MongoContactRepository {
    collection: Collection<ContactMessage>,
}

impl MongoContactRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<ContactMessage>(COLLECTION),
        }
    }

    fn documents(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }

    /// Inbox listing by status, newest first
    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> ContactResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "status": 1, "created_at": -1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "Indexes ensured");
        Ok(())
    }

    fn build_filter(filter: &ContactFilter) -> Document {
        let mut doc = doc! {};

        if let Some(status) = filter.status {
            doc.insert("status", status.to_string());
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "email": { "$regex": &pattern, "$options": "i" } },
                    doc! { "subject": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        doc
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        self.documents()
            .insert_one(to_stored_document(&message)?)
            .await?;
        Ok(message)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ContactFilter) -> ContactResult<Vec<ContactMessage>> {
        let cursor = self
            .collection
            .find(Self::build_filter(filter))
            .sort(doc! { "_id": -1 })
            .skip(filter.offset)
            .limit(filter.limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ContactFilter) -> ContactResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(filter))
            .await?)
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn update(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        let result = self
            .documents()
            .replace_one(doc! { "_id": uuid_bson(message.id) }, to_stored_document(&message)?)
            .await?;

        if result.matched_count == 0 {
            return Err(ContactError::NotFound(message.id));
        }

        Ok(message)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ContactResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, status: MessageStatus) -> ContactResult<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "status": status.to_string() })
            .await?)
    }
}
