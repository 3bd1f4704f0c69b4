//! Platform overview for the main admin

use axum::{Json, Router, extract::State, middleware, routing::get};
use axum_helpers::{
    AppError, CurrentUser, JwtAuth, Role,
    errors::responses::{ForbiddenResponse, InternalServerErrorResponse, UnauthorizedResponse},
    jwt_auth_middleware,
};
use domain_contact::{ContactRepository, ContactService};
use domain_events::{EventRepository, EventService, EventStats, RegistrationRepository};
use domain_users::{RoleCounts, UserRepository, UserService};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

#[derive(OpenApi)]
#[openapi(
    paths(overview),
    components(
        schemas(AdminOverview, RoleCounts, EventStats),
        responses(UnauthorizedResponse, ForbiddenResponse, InternalServerErrorResponse)
    ),
    tags((name = "Admin", description = "Main admin dashboard"))
)]
pub struct AdminApiDoc;

/// Account, event and inbox counters
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverview {
    pub users: RoleCounts,
    pub events: EventStats,
    pub unread_messages: u64,
}

struct OverviewState<U, E, G, C>
where
    U: UserRepository,
    E: EventRepository,
    G: RegistrationRepository,
    C: ContactRepository,
{
    users: UserService<U>,
    events: EventService<E, G>,
    contact: ContactService<C>,
}

pub fn router<U, E, G, C>(
    users: UserService<U>,
    events: EventService<E, G>,
    contact: ContactService<C>,
    jwt: JwtAuth,
) -> Router
where
    U: UserRepository + 'static,
    E: EventRepository + 'static,
    G: RegistrationRepository + 'static,
    C: ContactRepository + 'static,
{
    Router::new()
        .route("/overview", get(overview))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(Arc::new(OverviewState {
            users,
            events,
            contact,
        }))
}

#[utoipa::path(
    get,
    path = "/overview",
    tag = "Admin",
    responses(
        (status = 200, description = "Platform counters", body = AdminOverview),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn overview<U, E, G, C>(
    State(state): State<Arc<OverviewState<U, E, G, C>>>,
    actor: CurrentUser,
) -> Result<Json<AdminOverview>, AppError>
where
    U: UserRepository,
    E: EventRepository,
    G: RegistrationRepository,
    C: ContactRepository,
{
    actor.require_any(&[Role::MainAdmin])?;

    Ok(Json(AdminOverview {
        users: state.users.count_by_role().await?,
        events: state.events.stats().await?,
        unread_messages: state.contact.count_unread().await?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserDirectory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use axum_helpers::JwtConfig;
    use domain_contact::{CreateContactMessage, InMemoryContactRepository};
    use domain_events::{InMemoryEventRepository, InMemoryRegistrationRepository};
    use domain_users::{InMemoryUserRepository, User};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn app() -> (Router, JwtAuth) {
        let jwt = JwtAuth::new(&JwtConfig::new("admin-overview-secret-long-enough-for-hs256"));

        let user_repo = InMemoryUserRepository::new();
        for (email, role) in [
            ("root@campus.edu", Role::MainAdmin),
            ("org@campus.edu", Role::Organizer),
            ("s1@campus.edu", Role::Student),
            ("s2@campus.edu", Role::Student),
        ] {
            user_repo
                .create(User::new(email.into(), email.into(), "hash".into(), role))
                .await
                .unwrap();
        }
        let users = UserService::new(user_repo);

        let events = EventService::new(
            InMemoryEventRepository::new(),
            InMemoryRegistrationRepository::new(),
            Arc::new(UserDirectory::new(users.clone())),
        );

        let contact = ContactService::new(InMemoryContactRepository::new());
        contact
            .submit(CreateContactMessage {
                name: "Visitor".into(),
                email: "visitor@example.com".into(),
                subject: "Open day".into(),
                message: "Is the open day still on this Saturday?".into(),
            })
            .await
            .unwrap();

        (router(users, events, contact, jwt.clone()), jwt)
    }

    fn request(token: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/overview");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn token(jwt: &JwtAuth, role: Role) -> String {
        jwt.create_access_token(Uuid::now_v7(), "t@campus.edu", "T", role)
            .unwrap()
    }

    #[tokio::test]
    async fn test_overview_requires_token() {
        let (app, _) = app().await;
        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_overview_is_admin_only() {
        let (app, jwt) = app().await;
        let response = app
            .oneshot(request(Some(token(&jwt, Role::Organizer))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_overview_counts() {
        let (app, jwt) = app().await;
        let response = app
            .oneshot(request(Some(token(&jwt, Role::MainAdmin))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["users"]["student"], 2);
        assert_eq!(body["users"]["main_admin"], 1);
        assert_eq!(body["events"]["draft"], 0);
        assert_eq!(body["unread_messages"], 1);
    }
}
