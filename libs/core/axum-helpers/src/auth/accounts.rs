use super::roles::Role;
use crate::errors::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Live account state behind a token.
///
/// Tokens are signed once at login; a lookup lets the auth middleware see
/// deactivation, deletion and role changes on the next request.
#[async_trait]
pub trait AccountStatus: Send + Sync {
    /// Current role of an active account; `None` when it is disabled or gone
    async fn active_role(&self, user_id: Uuid) -> Result<Option<Role>, AppError>;
}
