use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_helpers::{
    CurrentUser, JwtAuth, MaybeUser, QueryParams, Role, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EventResult;
use crate::models::{
    AssignCoordinators, CertificateSettings, CreateEvent, Event, EventCategory, EventFilter,
    EventList, EventStats, EventStatus, EventSummary, FeedbackSettings, ProfileField,
    RegistrationKind, RegistrationSettings, Schedule, UpdateEvent, Venue, VenueMode,
};
use crate::registration::{RegisterForEvent, Registration, RegistrationStatus, Team, TeamMember};
use crate::repository::{EventRepository, RegistrationRepository};
use crate::service::EventService;

type SharedService<E, G> = Arc<EventService<E, G>>;

/// OpenAPI documentation for the events API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_events,
        create_event,
        event_stats,
        get_event,
        update_event,
        delete_event,
        publish_event,
        unpublish_event,
        cancel_event,
        complete_event,
        assign_coordinators,
        event_summary,
        register,
        list_registrations
    ),
    components(
        schemas(
            Event,
            EventList,
            EventStats,
            EventSummary,
            EventStatus,
            EventCategory,
            CreateEvent,
            UpdateEvent,
            AssignCoordinators,
            Schedule,
            Venue,
            VenueMode,
            RegistrationSettings,
            RegistrationKind,
            ProfileField,
            CertificateSettings,
            FeedbackSettings,
            RegisterForEvent,
            Registration,
            RegistrationStatus,
            Team,
            TeamMember
        ),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Events", description = "Event lifecycle and sign-up"))
)]
pub struct ApiDoc;

/// Browsing is public; a token, when present, widens what the caller sees.
/// Mutating handlers extract [`CurrentUser`] and answer 401 without one.
pub fn router<E, G>(service: EventService<E, G>, jwt: JwtAuth) -> Router
where
    E: EventRepository + 'static,
    G: RegistrationRepository + 'static,
{
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/stats", get(event_stats))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/{id}/publish", post(publish_event))
        .route("/{id}/unpublish", post(unpublish_event))
        .route("/{id}/cancel", post(cancel_event))
        .route("/{id}/complete", post(complete_event))
        .route("/{id}/coordinators", put(assign_coordinators))
        .route("/{id}/summary", get(event_summary))
        .route(
            "/{id}/registrations",
            get(list_registrations).post(register),
        )
        .route_layer(middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ))
        .with_state(Arc::new(service))
}

/// List visible events
#[utoipa::path(
    get,
    path = "",
    tag = "Events",
    params(EventFilter),
    responses(
        (status = 200, description = "Page of events", body = EventList),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    viewer: MaybeUser,
    QueryParams(filter): QueryParams<EventFilter>,
) -> EventResult<Json<EventList>> {
    Ok(Json(service.list_events(viewer.as_ref(), filter).await?))
}

/// Create a draft event
#[utoipa::path(
    post,
    path = "",
    tag = "Events",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Draft created", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer" = []))
)]
async fn create_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Event counts per status
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Events",
    responses(
        (status = 200, description = "Counts per status", body = EventStats),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer" = []))
)]
async fn event_stats<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
) -> EventResult<Json<EventStats>> {
    actor.require_any(&[Role::MainAdmin])?;
    Ok(Json(service.stats().await?))
}

/// Get an event
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    viewer: MaybeUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    Ok(Json(service.get_event(viewer.as_ref(), id).await?))
}

/// Update an event
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn update_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateEvent>,
) -> EventResult<Json<Event>> {
    Ok(Json(service.update_event(&actor, id, input).await?))
}

/// Delete an event and its registrations
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn delete_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<StatusCode> {
    service.delete_event(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish a complete draft
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event published", body = Event),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn publish_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    Ok(Json(service.publish_event(&actor, id).await?))
}

/// Move a published event without registrations back to draft
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event unpublished", body = Event),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn unpublish_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    Ok(Json(service.unpublish_event(&actor, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event cancelled", body = Event),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn cancel_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    Ok(Json(service.cancel_event(&actor, id).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/complete",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event completed", body = Event),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn complete_event<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    Ok(Json(service.complete_event(&actor, id).await?))
}

/// Replace the event's student coordinators
#[utoipa::path(
    put,
    path = "/{id}/coordinators",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = AssignCoordinators,
    responses(
        (status = 200, description = "Coordinators assigned", body = Event),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn assign_coordinators<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AssignCoordinators>,
) -> EventResult<Json<Event>> {
    Ok(Json(
        service
            .assign_coordinators(&actor, id, input.coordinators)
            .await?,
    ))
}

/// Seats, registrations and attendance for an event
#[utoipa::path(
    get,
    path = "/{id}/summary",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event summary", body = EventSummary),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn event_summary<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    viewer: MaybeUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<EventSummary>> {
    Ok(Json(service.event_summary(viewer.as_ref(), id).await?))
}

/// Register the calling student
#[utoipa::path(
    post,
    path = "/{id}/registrations",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = RegisterForEvent,
    responses(
        (status = 201, description = "Registered", body = Registration),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn register<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<RegisterForEvent>,
) -> EventResult<impl IntoResponse> {
    let registration = service.register(&actor, id, input).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Registrations for an event (organizer, coordinators, admin)
#[utoipa::path(
    get,
    path = "/{id}/registrations",
    tag = "Events",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Registrations", body = Vec<Registration>),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn list_registrations<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Vec<Registration>>> {
    Ok(Json(service.event_registrations(&actor, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::fixtures::{Harness, complete_input, harness, published_event};
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::JwtConfig;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Fixture {
        app: Router,
        h: Harness,
        jwt: JwtAuth,
    }

    fn fixture() -> Fixture {
        let h = harness();
        let jwt = JwtAuth::new(&JwtConfig::new("events-test-secret-long-enough-for-hs256"));
        Fixture {
            app: router(h.service.clone(), jwt.clone()),
            h,
            jwt,
        }
    }

    impl Fixture {
        fn token(&self, user: &CurrentUser) -> String {
            self.jwt
                .create_access_token(user.id, &user.email, &user.name, user.role)
                .unwrap()
        }
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_organizer_creates_and_publishes() {
        let f = fixture();
        let token = f.token(&f.h.organizer);
        let input = complete_input();
        let schedule = input.schedule.unwrap();

        let response = f
            .app
            .clone()
            .oneshot(request(
                "POST",
                "/",
                Some(&token),
                Some(json!({
                    "title": "Robotics Expo",
                    "description": "Build and race bots",
                    "category": "workshop",
                    "schedule": schedule,
                    "venue": { "mode": "offline", "name": "Lab 3" }
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["status"], "draft");
        let id = created["id"].as_str().unwrap().to_string();

        let response = f
            .app
            .clone()
            .oneshot(request("POST", &format!("/{id}/publish"), Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "published");

        let response = f
            .app
            .oneshot(request("GET", "/", None, None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_anonymous_cannot_create() {
        let f = fixture();
        let response = f
            .app
            .oneshot(request("POST", "/", None, Some(json!({ "title": "X" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_incomplete_draft_publish_is_bad_request() {
        let f = fixture();
        let draft = f
            .h
            .service
            .create_event(
                &f.h.organizer,
                CreateEvent {
                    schedule: None,
                    ..complete_input()
                },
            )
            .await
            .unwrap();
        let token = f.token(&f.h.organizer);

        let response = f
            .app
            .oneshot(request(
                "POST",
                &format!("/{}/publish", draft.id),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("schedule is required"));
    }

    #[tokio::test]
    async fn test_draft_hidden_from_anonymous() {
        let f = fixture();
        let draft = f
            .h
            .service
            .create_event(&f.h.organizer, complete_input())
            .await
            .unwrap();

        let response = f
            .app
            .clone()
            .oneshot(request("GET", &format!("/{}", draft.id), None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let token = f.token(&f.h.organizer);
        let response = f
            .app
            .oneshot(request(
                "GET",
                &format!("/{}", draft.id),
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_student_registers_and_organizer_lists() {
        let f = fixture();
        let event = published_event(&f.h).await;

        let response = f
            .app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/{}/registrations", event.id),
                Some(&f.token(&f.h.student)),
                Some(json!({})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = f
            .app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/{}/registrations", event.id),
                Some(&f.token(&f.h.student)),
                Some(json!({})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = f
            .app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/{}/registrations", event.id),
                Some(&f.token(&f.h.organizer)),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = f
            .app
            .oneshot(request("GET", &format!("/{}/summary", event.id), None, None))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["registered"], 1);
    }

    #[tokio::test]
    async fn test_stats_admin_only() {
        let f = fixture();

        let response = f
            .app
            .clone()
            .oneshot(request("GET", "/stats", Some(&f.token(&f.h.organizer)), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let token = f.token(&f.h.admin);
        let response = f
            .app
            .oneshot(request("GET", "/stats", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["draft"], 0);
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_json_bad_request() {
        let f = fixture();
        let response = f
            .app
            .oneshot(request("GET", "/?status=bogus", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_mine_without_token_is_unauthorized() {
        let f = fixture();
        let response = f
            .app
            .oneshot(request("GET", "/?mine=true", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
