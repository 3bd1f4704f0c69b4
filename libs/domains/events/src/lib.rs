//! Events Domain
//!
//! Campus events from draft to completion, and the registrations students
//! make for them.
//!
//! # Lifecycle
//!
//! ```text
//!            publish              complete (after start)
//!   draft ───────────► published ───────────────────────► completed
//!     ▲                  │   │
//!     └──── unpublish ───┘   └──── cancel ────► cancelled
//!        (no registrations)
//! ```
//!
//! Drafts are visible only to the admin, their organizer and assigned
//! coordinators. Everything else is public.
//!
//! Accounts live elsewhere; registration looks registrants up through a
//! [`ParticipantDirectory`] supplied by the application.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_events::{
//!     EventService, InMemoryEventRepository, InMemoryRegistrationRepository,
//!     ParticipantDirectory, handlers, registration_handlers,
//! };
//!
//! fn routers(directory: Arc<dyn ParticipantDirectory>) {
//!     let service = EventService::new(
//!         InMemoryEventRepository::new(),
//!         InMemoryRegistrationRepository::new(),
//!         directory,
//!     );
//!     let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars"));
//!
//!     let events = handlers::router(service.clone(), jwt.clone());
//!     let registrations = registration_handlers::router(service, jwt);
//! }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod participants;
pub mod registration;
pub mod registration_handlers;
pub mod repository;
pub mod service;

pub use error::{EventError, EventResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateEvent, Event, EventCategory, EventFilter, EventList, EventStats, EventStatus,
    EventSummary, ProfileField, RegistrationKind, UpdateEvent,
};
pub use mongodb::{MongoEventRepository, MongoRegistrationRepository};
pub use participants::{Participant, ParticipantDirectory};
pub use registration::{Registration, RegistrationStatus};
pub use registration_handlers::RegistrationsApiDoc;
pub use repository::{
    EventRepository, InMemoryEventRepository, InMemoryRegistrationRepository,
    RegistrationRepository,
};
pub use service::EventService;
