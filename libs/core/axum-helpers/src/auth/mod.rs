//! Stateless JWT authentication and role checks.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/api/protected", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod accounts;
pub mod config;
pub mod jwt;
pub mod middleware;
pub mod roles;
pub mod user;

pub use accounts::AccountStatus;
pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{
    ACCESS_TOKEN_COOKIE, extract_token_from_request, jwt_auth_middleware,
    optional_jwt_auth_middleware,
};
pub use roles::Role;
pub use user::{CurrentUser, MaybeUser};
