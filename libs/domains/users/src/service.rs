use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::CurrentUser;
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, ParticipantProfile, RegisterRequest, Role, RoleCounts, UpdateProfile, User,
    UserFilter, UserResponse,
};
use crate::repository::UserRepository;

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Accounts, authentication and the main-admin user management
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Self-service sign-up; always a student
    #[instrument(skip(self, input))]
    pub async fn register_student(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        validate_password(&input.password)?;

        let email = normalize_email(&input.email);
        let mut user = User::new(
            email,
            input.name.trim().to_string(),
            hash_password(&input.password)?,
            Role::Student,
        );
        user.profile = input.profile.unwrap_or_default().normalized();

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, "Student registered");
        Ok(created.into())
    }

    /// Check credentials and record the login
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(UserError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(UserError::AccountDisabled);
        }

        user.last_login_at = Some(Utc::now());
        let user = self.repository.update(user).await?;

        Ok(user.into())
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        Ok(self.load(id).await?.into())
    }

    /// Name and student profile of the caller
    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, id: Uuid, input: UpdateProfile) -> UserResult<UserResponse> {
        let mut user = self.load(id).await?;

        if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(UserError::Validation("Name cannot be blank".to_string()));
        }

        user.apply_update(input);
        Ok(self.repository.update(user).await?.into())
    }

    #[instrument(skip(self, current_password, new_password))]
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> UserResult<()> {
        let mut user = self.load(id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(UserError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(new_password)?;

        user.password_hash = hash_password(new_password)?;
        user.updated_at = Utc::now();
        self.repository.update(user).await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(())
    }

    // Main-admin operations

    #[instrument(skip(self, actor, input), fields(actor_id = %actor.id))]
    pub async fn create_user(
        &self,
        actor: &CurrentUser,
        input: CreateUser,
    ) -> UserResult<UserResponse> {
        actor.require_any(&[Role::MainAdmin])?;

        if input.role == Role::MainAdmin {
            return Err(UserError::Validation(
                "Cannot create another MAIN_ADMIN account".to_string(),
            ));
        }

        validate_password(&input.password)?;

        let mut user = User::new(
            normalize_email(&input.email),
            input.name.trim().to_string(),
            hash_password(&input.password)?,
            input.role,
        );
        user.profile = input.profile.unwrap_or_default().normalized();

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, role = %created.role, "User created by admin");
        Ok(created.into())
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn list_users(
        &self,
        actor: &CurrentUser,
        filter: UserFilter,
    ) -> UserResult<(Vec<UserResponse>, u64)> {
        actor.require_any(&[Role::MainAdmin])?;

        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter).await?;
        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    pub async fn admin_get_user(&self, actor: &CurrentUser, id: Uuid) -> UserResult<UserResponse> {
        actor.require_any(&[Role::MainAdmin])?;
        self.get_user(id).await
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn set_role(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        role: Role,
    ) -> UserResult<UserResponse> {
        let mut user = self.load_managed(actor, id, "change your own role").await?;

        if role == Role::MainAdmin {
            return Err(UserError::Validation(
                "Cannot assign the MAIN_ADMIN role".to_string(),
            ));
        }

        user.role = role;
        user.updated_at = Utc::now();
        let user = self.repository.update(user).await?;

        tracing::info!(user_id = %id, role = %role, "Role changed");
        Ok(user.into())
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn set_active(
        &self,
        actor: &CurrentUser,
        id: Uuid,
        is_active: bool,
    ) -> UserResult<UserResponse> {
        let mut user = self.load_managed(actor, id, "change your own status").await?;

        user.is_active = is_active;
        user.updated_at = Utc::now();
        let user = self.repository.update(user).await?;

        tracing::info!(user_id = %id, is_active, "Account status changed");
        Ok(user.into())
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn delete_user(&self, actor: &CurrentUser, id: Uuid) -> UserResult<()> {
        self.load_managed(actor, id, "delete your own account").await?;

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    /// Create the main admin, or promote and re-enable an existing account
    /// with that email. The password of an existing account is left as is.
    #[instrument(skip(self, name, password))]
    pub async fn ensure_main_admin(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> UserResult<UserResponse> {
        let email = normalize_email(email);

        if let Some(mut user) = self.repository.get_by_email(&email).await? {
            if user.role == Role::MainAdmin && user.is_active {
                tracing::debug!(user_id = %user.id, "Main admin already present");
                return Ok(user.into());
            }

            user.role = Role::MainAdmin;
            user.is_active = true;
            user.updated_at = Utc::now();
            let user = self.repository.update(user).await?;
            tracing::warn!(user_id = %user.id, "Existing account promoted to main admin");
            return Ok(user.into());
        }

        validate_password(password)?;
        let user = User::new(
            email,
            name.trim().to_string(),
            hash_password(password)?,
            Role::MainAdmin,
        );
        let user = self.repository.create(user).await?;

        tracing::info!(user_id = %user.id, "Main admin created");
        Ok(user.into())
    }

    /// Registrant details for the events domain; `None` for unknown or
    /// disabled accounts
    pub async fn participant_profile(&self, id: Uuid) -> UserResult<Option<ParticipantProfile>> {
        Ok(self
            .repository
            .get_by_id(id)
            .await?
            .filter(|u| u.is_active)
            .map(Into::into))
    }

    pub async fn count_by_role(&self) -> UserResult<RoleCounts> {
        self.repository.count_by_role().await
    }

    async fn load(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Target of an admin operation: never the actor, never the main admin
    async fn load_managed(&self, actor: &CurrentUser, id: Uuid, action: &str) -> UserResult<User> {
        actor.require_any(&[Role::MainAdmin])?;

        if actor.id == id {
            return Err(UserError::Validation(format!("You cannot {}", action)));
        }

        let user = self.load(id).await?;
        if user.role == Role::MainAdmin {
            return Err(UserError::Validation(
                "The main admin account cannot be modified".to_string(),
            ));
        }

        Ok(user)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 8..=128 chars with upper, lower, digit and a special character
pub fn validate_password(password: &str) -> UserResult<()> {
    let len = password.chars().count();
    if len < 8 {
        return Err(UserError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if len > 128 {
        return Err(UserError::Validation(
            "Password cannot exceed 128 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(UserError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(UserError::Validation(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(UserError::Validation(
            "Password must contain at least one digit".to_string(),
        ));
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(UserError::Validation(format!(
            "Password must contain at least one special character ({})",
            SPECIAL_CHARS
        )));
    }

    Ok(())
}
