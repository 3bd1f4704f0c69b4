use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, RoleCounts, User, UserFilter};

/// Repository trait for User persistence.
///
/// Emails reach the repository already lowercased; uniqueness is enforced here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, `DuplicateEmail` if the email is taken
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Newest first, paginated
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Matches for `filter`, ignoring pagination
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Replace an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    async fn count_by_role(&self) -> UserResult<RoleCounts>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    if filter.role.is_some_and(|role| user.role != role) {
        return false;
    }
    if filter.is_active.is_some_and(|active| user.is_active != active) {
        return false;
    }
    if let Some(search) = filter.search.as_deref().map(str::to_lowercase) {
        if !user.name.to_lowercase().contains(&search) && !user.email.contains(&search) {
            return false;
        }
    }
    true
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, role = %user.role, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| matches(u, &filter))
            .cloned()
            .collect();

        // v7 ids sort by creation time
        result.sort_by(|a, b| b.id.cmp(&a.id));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| matches(u, &filter)).count() as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        let removed = users.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }

        Ok(removed)
    }

    async fn count_by_role(&self) -> UserResult<RoleCounts> {
        let users = self.users.read().await;
        let mut counts = RoleCounts::default();

        for role in Role::ALL {
            counts.set(role, users.values().filter(|u| u.role == role).count() as u64);
        }

        Ok(counts)
    }
}
