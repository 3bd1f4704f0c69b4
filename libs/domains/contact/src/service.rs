//! Contact service: public submission, admin-only inbox

use axum_helpers::{CurrentUser, Role};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ContactError, ContactResult};
use crate::models::{ContactFilter, ContactList, ContactMessage, CreateContactMessage, MessageStatus};
use crate::repository::ContactRepository;

const MAX_PAGE_SIZE: i64 = 100;

pub struct ContactService<R: ContactRepository> {
    repository: Arc<R>,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn submit(&self, input: CreateContactMessage) -> ContactResult<ContactMessage> {
        input
            .validate()
            .map_err(|e| ContactError::Validation(e.to_string()))?;

        let message = ContactMessage::new(input);
        if message.name.is_empty() || message.subject.is_empty() {
            return Err(ContactError::Validation(
                "Name and subject must not be blank".to_string(),
            ));
        }

        let message = self.repository.create(message).await?;
        info!(message_id = %message.id, "Contact message received");
        Ok(message)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn list(&self, actor: &CurrentUser, mut filter: ContactFilter) -> ContactResult<ContactList> {
        actor.require_any(&[Role::MainAdmin])?;

        filter.limit = filter.limit.clamp(1, MAX_PAGE_SIZE);
        let total = self.repository.count(&filter).await?;
        let items = self.repository.list(&filter).await?;
        Ok(ContactList { items, total })
    }

    pub async fn get(&self, actor: &CurrentUser, id: Uuid) -> ContactResult<ContactMessage> {
        actor.require_any(&[Role::MainAdmin])?;
        self.load(id).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn set_status(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        status: MessageStatus,
    ) -> ContactResult<ContactMessage> {
        actor.require_any(&[Role::MainAdmin])?;

        let mut message = self.load(id).await?;
        message.set_status(status);
        self.repository.update(message).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete(&self, actor: &CurrentUser, id: Uuid) -> ContactResult<()> {
        actor.require_any(&[Role::MainAdmin])?;

        if !self.repository.delete(id).await? {
            return Err(ContactError::NotFound(id));
        }
        info!(message_id = %id, "Contact message deleted");
        Ok(())
    }

    /// Messages still in the `new` state
    pub async fn count_unread(&self) -> ContactResult<u64> {
        self.repository.count_by_status(MessageStatus::New).await
    }

    async fn load(&self, id: Uuid) -> ContactResult<ContactMessage> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ContactError::NotFound(id))
    }
}

impl<R: ContactRepository> Clone for ContactService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
