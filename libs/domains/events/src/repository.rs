//! Event and registration repository traits, with in-memory stores

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventQuery, EventStats, EventStatus};
use crate::registration::{Registration, RegistrationStatus};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: Event) -> EventResult<Event>;

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// Events among `ids`; unknown ids are skipped
    async fn get_many(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>>;

    /// Replace an existing event
    async fn update(&self, event: Event) -> EventResult<Event>;

    async fn delete(&self, id: Uuid) -> EventResult<bool>;

    /// Newest first, or soonest first when `starts_after` is set
    async fn list(&self, query: &EventQuery) -> EventResult<Vec<Event>>;

    async fn count(&self, query: &EventQuery) -> EventResult<u64>;

    async fn count_by_status(&self) -> EventResult<EventStats>;
}

/// At most one registration per (event, user); cancelled ones are reused
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert, `Conflict` when the user already has a registration for the event
    async fn create(&self, registration: Registration) -> EventResult<Registration>;

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Registration>>;

    async fn find_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> EventResult<Option<Registration>>;

    async fn update(&self, registration: Registration) -> EventResult<Registration>;

    /// Oldest first
    async fn list_by_event(&self, event_id: Uuid) -> EventResult<Vec<Registration>>;

    /// Newest first
    async fn list_by_user(&self, user_id: Uuid) -> EventResult<Vec<Registration>>;

    /// Registered or attended
    async fn count_active(&self, event_id: Uuid) -> EventResult<u64>;

    async fn count_attended(&self, event_id: Uuid) -> EventResult<u64>;

    async fn delete_by_event(&self, event_id: Uuid) -> EventResult<u64>;
}

/// In-memory event store (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<HashMap<Uuid, Event>>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: Event) -> EventResult<Event> {
        let mut events = self.events.write().await;
        events.insert(event.id, event.clone());
        tracing::info!(event_id = %event.id, "Created event");
        Ok(event)
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;
        Ok(ids.iter().filter_map(|id| events.get(id).cloned()).collect())
    }

    async fn update(&self, event: Event) -> EventResult<Event> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(EventError::NotFound(event.id));
        }
        events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn delete(&self, id: Uuid) -> EventResult<bool> {
        Ok(self.events.write().await.remove(&id).is_some())
    }

    async fn list(&self, query: &EventQuery) -> EventResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut result: Vec<Event> = events
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();

        if query.starts_after.is_some() {
            result.sort_by_key(|e| e.starts_at());
        } else {
            result.sort_by(|a, b| b.id.cmp(&a.id));
        }

        Ok(result
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, query: &EventQuery) -> EventResult<u64> {
        let events = self.events.read().await;
        Ok(events.values().filter(|e| query.matches(e)).count() as u64)
    }

    async fn count_by_status(&self) -> EventResult<EventStats> {
        let events = self.events.read().await;
        let mut stats = EventStats::default();
        for status in EventStatus::ALL {
            stats.set(status, events.values().filter(|e| e.status == status).count() as u64);
        }
        Ok(stats)
    }
}

/// In-memory registration store (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistrationRepository {
    registrations: Arc<RwLock<HashMap<Uuid, Registration>>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn create(&self, registration: Registration) -> EventResult<Registration> {
        let mut registrations = self.registrations.write().await;

        if registrations
            .values()
            .any(|r| r.event_id == registration.event_id && r.user_id == registration.user_id)
        {
            return Err(EventError::Conflict(
                "You are already registered for this event".to_string(),
            ));
        }

        registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Registration>> {
        Ok(self.registrations.read().await.get(&id).cloned())
    }

    async fn find_by_event_and_user(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> EventResult<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .values()
            .find(|r| r.event_id == event_id && r.user_id == user_id)
            .cloned())
    }

    async fn update(&self, registration: Registration) -> EventResult<Registration> {
        let mut registrations = self.registrations.write().await;
        if !registrations.contains_key(&registration.id) {
            return Err(EventError::RegistrationNotFound(registration.id));
        }
        registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn list_by_event(&self, event_id: Uuid) -> EventResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        let mut result: Vec<Registration> = registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.id);
        Ok(result)
    }

    async fn list_by_user(&self, user_id: Uuid) -> EventResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        let mut result: Vec<Registration> = registrations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(result)
    }

    async fn count_active(&self, event_id: Uuid) -> EventResult<u64> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status.is_active())
            .count() as u64)
    }

    async fn count_attended(&self, event_id: Uuid) -> EventResult<u64> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Attended)
            .count() as u64)
    }

    async fn delete_by_event(&self, event_id: Uuid) -> EventResult<u64> {
        let mut registrations = self.registrations.write().await;
        let before = registrations.len();
        registrations.retain(|_, r| r.event_id != event_id);
        Ok((before - registrations.len()) as u64)
    }
}
