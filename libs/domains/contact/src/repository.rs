use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ContactError, ContactResult};
use crate::models::{ContactFilter, ContactMessage, MessageStatus};

/// Repository trait for contact messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage>;

    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>>;

    /// Newest first
    async fn list(&self, filter: &ContactFilter) -> ContactResult<Vec<ContactMessage>>;

    async fn count(&self, filter: &ContactFilter) -> ContactResult<u64>;

    async fn update(&self, message: ContactMessage) -> ContactResult<ContactMessage>;

    async fn delete(&self, id: Uuid) -> ContactResult<bool>;

    async fn count_by_status(&self, status: MessageStatus) -> ContactResult<u64>;
}

/// In-memory message store (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactRepository {
    messages: Arc<RwLock<HashMap<Uuid, ContactMessage>>>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());
        Ok(message)
    }

    async fn get_by_id(&self, id: Uuid) -> ContactResult<Option<ContactMessage>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: &ContactFilter) -> ContactResult<Vec<ContactMessage>> {
        let messages = self.messages.read().await;
        let mut result: Vec<ContactMessage> = messages
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ContactFilter) -> ContactResult<u64> {
        let messages = self.messages.read().await;
        Ok(messages.values().filter(|m| filter.matches(m)).count() as u64)
    }

    async fn update(&self, message: ContactMessage) -> ContactResult<ContactMessage> {
        let mut messages = self.messages.write().await;
        if !messages.contains_key(&message.id) {
            return Err(ContactError::NotFound(message.id));
        }
        messages.insert(message.id, message.clone());
        Ok(message)
    }

    async fn delete(&self, id: Uuid) -> ContactResult<bool> {
        Ok(self.messages.write().await.remove(&id).is_some())
    }

    async fn count_by_status(&self, status: MessageStatus) -> ContactResult<u64> {
        let messages = self.messages.read().await;
        Ok(messages.values().filter(|m| m.status == status).count() as u64)
    }
}
