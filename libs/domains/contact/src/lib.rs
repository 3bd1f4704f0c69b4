//! Contact Domain
//!
//! Messages sent through the public contact form and the admin inbox that
//! triages them (`new` → `read` → `resolved`).
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_contact::{ContactService, InMemoryContactRepository, handlers};
//!
//! let service = ContactService::new(InMemoryContactRepository::new());
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars"));
//! let router = handlers::router(service, jwt);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ContactError, ContactResult};
pub use handlers::ApiDoc;
pub use models::{ContactFilter, ContactList, ContactMessage, CreateContactMessage, MessageStatus};
pub use mongodb::MongoContactRepository;
pub use repository::{ContactRepository, InMemoryContactRepository};
pub use service::ContactService;
