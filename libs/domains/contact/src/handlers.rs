use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    CurrentUser, JwtAuth, QueryParams, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ContactResult;
use crate::models::{
    ContactFilter, ContactList, ContactMessage, CreateContactMessage, MessageStatus,
    SetMessageStatus,
};
use crate::repository::ContactRepository;
use crate::service::ContactService;

/// OpenAPI documentation for the contact API
#[derive(OpenApi)]
#[openapi(
    paths(submit_message, list_messages, get_message, delete_message, set_status),
    components(
        schemas(
            ContactMessage,
            ContactList,
            CreateContactMessage,
            SetMessageStatus,
            MessageStatus
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Contact", description = "Contact form and admin inbox"))
)]
pub struct ApiDoc;

/// Submitting is public; the inbox handlers require a `MAIN_ADMIN` token
pub fn router<R: ContactRepository + 'static>(service: ContactService<R>, jwt: JwtAuth) -> Router {
    Router::new()
        .route("/", get(list_messages).post(submit_message))
        .route("/{id}", get(get_message).delete(delete_message))
        .route("/{id}/status", put(set_status))
        .route_layer(middleware::from_fn_with_state(
            jwt,
            optional_jwt_auth_middleware,
        ))
        .with_state(Arc::new(service))
}

/// Send a message through the contact form
#[utoipa::path(
    post,
    path = "",
    tag = "Contact",
    request_body = CreateContactMessage,
    responses(
        (status = 201, description = "Message received", body = ContactMessage),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn submit_message<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateContactMessage>,
) -> ContactResult<impl IntoResponse> {
    let message = service.submit(input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// List messages
#[utoipa::path(
    get,
    path = "",
    tag = "Contact",
    params(ContactFilter),
    responses(
        (status = 200, description = "Page of messages", body = ContactList),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse)
    ),
    security(("bearer" = []))
)]
async fn list_messages<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    actor: CurrentUser,
    QueryParams(filter): QueryParams<ContactFilter>,
) -> ContactResult<Json<ContactList>> {
    Ok(Json(service.list(&actor, filter).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message found", body = ContactMessage),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn get_message<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> ContactResult<Json<ContactMessage>> {
    Ok(Json(service.get(&actor, id).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn delete_message<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> ContactResult<StatusCode> {
    service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a message read or resolved
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Contact",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = SetMessageStatus,
    responses(
        (status = 200, description = "Status changed", body = ContactMessage),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn set_status<R: ContactRepository>(
    State(service): State<Arc<ContactService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SetMessageStatus>,
) -> ContactResult<Json<ContactMessage>> {
    Ok(Json(service.set_status(&actor, id, input.status).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryContactRepository;
    use axum::body::Body;
    use axum::http::Request;
    use axum_helpers::{JwtConfig, Role};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> (Router, JwtAuth) {
        let jwt = JwtAuth::new(&JwtConfig::new("contact-test-secret-long-enough-for-hs256"));
        let service = ContactService::new(InMemoryContactRepository::new());
        (router(service, jwt.clone()), jwt)
    }

    fn token(jwt: &JwtAuth, role: Role) -> String {
        jwt.create_access_token(Uuid::now_v7(), "x@campus.edu", "X", role)
            .unwrap()
    }

    fn submit() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "name": "Ada",
                    "email": "ada@campus.edu",
                    "subject": "Lost and found",
                    "message": "I left my umbrella in the auditorium."
                })
                .to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_anyone_can_submit() {
        let (app, _) = app();
        let response = app.oneshot(submit()).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["status"], "new");
    }

    #[tokio::test]
    async fn test_invalid_submission_is_rejected() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "name": "Ada",
                            "email": "not-an-email",
                            "subject": "Hi",
                            "message": "Short"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_inbox_requires_admin() {
        let (app, jwt) = app();
        app.clone().oneshot(submit()).await.unwrap();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("authorization", format!("Bearer {}", token(&jwt, Role::Organizer)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?status=new")
                    .header("authorization", format!("Bearer {}", token(&jwt, Role::MainAdmin)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["total"], 1);
    }
}
