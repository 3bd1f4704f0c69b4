//! MongoDB implementations of the event and registration repositories

use async_trait::async_trait;
use database::mongodb::{datetime_bson, is_duplicate_key_error, to_stored_document, uuid_bson};
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{DraftScope, Event, EventQuery, EventStats, EventStatus};
use crate::registration::{Registration, RegistrationStatus};
use crate::repository::{EventRepository, RegistrationRepository};

const EVENTS: &str = "events";
const REGISTRATIONS: &str = "registrations";

/// MongoDB-based event repository
#[derive(Clone)]
pub struct MongoEventRepository {
    collection: Collection<Event>,
}

impl MongoEventRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Event>(EVENTS),
        }
    }

    fn documents(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }

    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> EventResult<()> {
        let indexes = vec![
            // Public listing: status plus upcoming sort
            IndexModel::builder()
                .keys(doc! { "status": 1, "schedule.starts_at": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "created_by": 1 }).build(),
            IndexModel::builder().keys(doc! { "coordinators": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = EVENTS, "Indexes ensured");
        Ok(())
    }

    /// Mirrors [`EventQuery::matches`]
    fn build_filter(query: &EventQuery) -> EventResult<Document> {
        let mut clauses: Vec<Document> = Vec::new();

        let published = doc! { "status": { "$ne": EventStatus::Draft.to_string() } };
        match query.drafts {
            DraftScope::All => {}
            DraftScope::None => clauses.push(published),
            DraftScope::OwnedBy(id) => {
                clauses.push(doc! { "$or": [published, { "created_by": uuid_bson(id) }] });
            }
            DraftScope::CoordinatedBy(id) => {
                clauses.push(doc! { "$or": [published, { "coordinators": uuid_bson(id) }] });
            }
        }

        if let Some(status) = query.status {
            clauses.push(doc! { "status": status.to_string() });
        }

        if let Some(category) = query.category {
            clauses.push(doc! { "category": category.to_string() });
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            clauses.push(doc! {
                "$or": [
                    { "title": { "$regex": &pattern, "$options": "i" } },
                    { "description": { "$regex": &pattern, "$options": "i" } },
                ]
            });
        }

        if let Some(after) = query.starts_after {
            clauses.push(doc! { "schedule.starts_at": { "$gt": datetime_bson(after) } });
        }

        if let Some(id) = query.created_by {
            clauses.push(doc! { "created_by": uuid_bson(id) });
        }

        if let Some(id) = query.coordinator {
            clauses.push(doc! { "coordinators": uuid_bson(id) });
        }

        Ok(match clauses.len() {
            0 => doc! {},
            1 => clauses.remove(0),
            _ => doc! { "$and": clauses },
        })
    }

    fn sort(query: &EventQuery) -> Document {
        if query.starts_after.is_some() {
            doc! { "schedule.starts_at": 1 }
        } else {
            doc! { "_id": -1 }
        }
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn create(&self, event: Event) -> EventResult<Event> {
        self.documents()
            .insert_one(to_stored_document(&event)?)
            .await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Bson> = ids.into_iter().map(uuid_bson).collect();
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update(&self, event: Event) -> EventResult<Event> {
        let result = self
            .documents()
            .replace_one(doc! { "_id": uuid_bson(event.id) }, to_stored_document(&event)?)
            .await?;

        if result.matched_count == 0 {
            return Err(EventError::NotFound(event.id));
        }

        Ok(event)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> EventResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &EventQuery) -> EventResult<Vec<Event>> {
        let cursor = self
            .collection
            .find(Self::build_filter(query)?)
            .sort(Self::sort(query))
            .skip(query.offset)
            .limit(query.limit)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, query: &EventQuery) -> EventResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(query)?)
            .await?)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self) -> EventResult<EventStats> {
        let mut stats = EventStats::default();

        for status in EventStatus::ALL {
            let count = self
                .collection
                .count_documents(doc! { "status": status.to_string() })
                .await?;
            stats.set(status, count);
        }

        Ok(stats)
    }
}

/// MongoDB-based registration repository
#[derive(Clone)]
pub struct MongoRegistrationRepository {
    collection: Collection<Registration>,
}

impl MongoRegistrationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Registration>(REGISTRATIONS),
        }
    }

    fn documents(&self) -> Collection<Document> {
        self.collection.clone_with_type::<Document>()
    }

    /// One registration per (event, user)
    #[instrument(skip(self))]
    pub async fn create_indexes(&self) -> EventResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "event_id": 1, "user_id": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("event_user_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = REGISTRATIONS, "Indexes ensured");
        Ok(())
    }

    fn active_filter(event_id: Uuid) -> Document {
        doc! {
            "event_id": uuid_bson(event_id),
            "status": { "$ne": RegistrationStatus::Cancelled.to_string() },
        }
    }
}

#[async_trait]
impl RegistrationRepository for MongoRegistrationRepository {
    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn create(&self, registration: Registration) -> EventResult<Registration> {
        match self
            .documents()
            .insert_one(to_stored_document(&registration)?)
            .await
        {
            Ok(_) => Ok(registration),
            Err(e) if is_duplicate_key_error(&e) => Err(EventError::Conflict(
                "You are already registered for this event".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Registration>> {
        Ok(self.collection.find_one(doc! { "_id": uuid_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> EventResult<Option<Registration>> {
        Ok(self
            .collection
            .find_one(doc! { "event_id": uuid_bson(event_id), "user_id": uuid_bson(user_id) })
            .await?)
    }

    #[instrument(skip(self, registration), fields(registration_id = %registration.id))]
    async fn update(&self, registration: Registration) -> EventResult<Registration> {
        let result = self
            .documents()
            .replace_one(
                doc! { "_id": uuid_bson(registration.id) },
                to_stored_document(&registration)?,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(EventError::RegistrationNotFound(registration.id));
        }

        Ok(registration)
    }

    #[instrument(skip(self))]
    async fn list_by_event(&self, event_id: Uuid) -> EventResult<Vec<Registration>> {
        let cursor = self
            .collection
            .find(doc! { "event_id": uuid_bson(event_id) })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Uuid) -> EventResult<Vec<Registration>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": uuid_bson(user_id) })
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count_active(&self, event_id: Uuid) -> EventResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::active_filter(event_id))
            .await?)
    }

    #[instrument(skip(self))]
    async fn count_attended(&self, event_id: Uuid) -> EventResult<u64> {
        Ok(self
            .collection
            .count_documents(doc! {
                "event_id": uuid_bson(event_id),
                "status": RegistrationStatus::Attended.to_string(),
            })
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_by_event(&self, event_id: Uuid) -> EventResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "event_id": uuid_bson(event_id) })
            .await?;
        Ok(result.deleted_count)
    }
}
