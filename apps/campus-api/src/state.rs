//! Shared application state.
//!
//! Services are built once at startup and cloned into each router; clones
//! share the underlying repositories.

use axum_helpers::JwtAuth;
use domain_contact::{ContactService, MongoContactRepository};
use domain_events::{EventService, MongoEventRepository, MongoRegistrationRepository};
use domain_users::{UserService, mongodb::MongoUserRepository};
use mongodb::{Client, Database};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::directory::UserDirectory;

pub type Users = UserService<MongoUserRepository>;
pub type Events = EventService<MongoEventRepository, MongoRegistrationRepository>;
pub type Contact = ContactService<MongoContactRepository>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Shares the connection pool with `db`
    pub mongo_client: Client,
    pub db: Database,
    pub jwt: JwtAuth,
    pub users: Users,
    pub events: Events,
    pub contact: Contact,
}

impl AppState {
    pub fn new(config: Config, mongo_client: Client, db: Database) -> Self {
        let users = UserService::new(MongoUserRepository::new(&db));
        let jwt = JwtAuth::new(&config.jwt)
            .with_account_status(Arc::new(UserDirectory::new(users.clone())));
        let events = EventService::new(
            MongoEventRepository::new(&db),
            MongoRegistrationRepository::new(&db),
            Arc::new(UserDirectory::new(users.clone())),
        );
        let contact = ContactService::new(MongoContactRepository::new(&db));

        Self {
            config,
            mongo_client,
            db,
            jwt,
            users,
            events,
            contact,
        }
    }

    /// Create or promote the configured main admin
    pub async fn bootstrap_admin(&self) -> eyre::Result<()> {
        let Some(seed) = &self.config.admin else {
            info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping main admin bootstrap");
            return Ok(());
        };

        let admin = self
            .users
            .ensure_main_admin(&seed.email, &seed.name, &seed.password)
            .await?;
        info!(user_id = %admin.id, email = %admin.email, "Main admin ready");
        Ok(())
    }
}

/// Ensure indexes for every collection
pub async fn init_indexes(db: &Database) -> eyre::Result<()> {
    MongoUserRepository::new(db).create_indexes().await?;
    MongoEventRepository::new(db).create_indexes().await?;
    MongoRegistrationRepository::new(db).create_indexes().await?;
    MongoContactRepository::new(db).create_indexes().await?;
    Ok(())
}
