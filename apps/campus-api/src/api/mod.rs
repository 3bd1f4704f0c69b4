//! HTTP routes, nested under `/api` by `axum_helpers::create_router`

pub mod admin;
pub mod health;

use axum::Router;
use domain_users::AuthState;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    let jwt = &state.jwt;

    Router::new()
        .nest(
            "/auth",
            domain_users::auth_handlers::router(AuthState {
                service: state.users.clone(),
                jwt: jwt.clone(),
                secure_cookies: state.config.environment.use_https(),
            }),
        )
        .nest(
            "/users",
            domain_users::handlers::router(state.users.clone(), jwt.clone()),
        )
        .nest(
            "/events",
            domain_events::handlers::router(state.events.clone(), jwt.clone()),
        )
        .nest(
            "/registrations",
            domain_events::registration_handlers::router(state.events.clone(), jwt.clone()),
        )
        .nest(
            "/contact",
            domain_contact::handlers::router(state.contact.clone(), jwt.clone()),
        )
        .nest(
            "/admin",
            admin::router(
                state.users.clone(),
                state.events.clone(),
                state.contact.clone(),
                jwt.clone(),
            ),
        )
        .merge(health::router(state.db.clone()))
}
