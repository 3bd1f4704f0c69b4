//! Users Domain
//!
//! Accounts, roles and the student profile, plus email/password login.
//!
//! # Features
//!
//! - Student self-registration with an optional profile
//! - Argon2 password hashing and a password policy
//! - Stateless JWT sessions (bearer header or `access_token` cookie)
//! - Account administration for the main admin
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ Handlers / AuthHandlers  │  ← /users and /auth endpoints
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │         Service          │  ← Role checks, password policy, hashing
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │        Repository        │  ← Trait + in-memory and MongoDB stores
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │          Models          │  ← Entities, DTOs
//! └──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{
//!     auth_handlers::{self, AuthState},
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let jwt = JwtAuth::new(&JwtConfig::new("a-secret-of-at-least-thirty-two-chars"));
//!
//! let users = handlers::router(service.clone(), jwt.clone());
//! let auth = auth_handlers::router(AuthState { service, jwt, secure_cookies: false });
//! ```

pub mod auth_handlers;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use auth_handlers::{AuthApiDoc, AuthState};
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, ParticipantProfile, RegisterRequest, Role, RoleCounts, StudentProfile,
    UpdateProfile, User, UserFilter, UserResponse,
};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
