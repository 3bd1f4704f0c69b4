use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, post, put},
};
use axum_helpers::{
    CurrentUser, JwtAuth, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, ConflictResponse, ForbiddenResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EventResult;
use crate::registration::{
    AttendanceUpdate, CertificateEligibility, MyRegistration, Registration, RegistrationStatus,
};
use crate::repository::{EventRepository, RegistrationRepository};
use crate::service::EventService;

type SharedService<E, G> = Arc<EventService<E, G>>;

/// OpenAPI documentation for registration management
#[derive(OpenApi)]
#[openapi(
    paths(my_registrations, cancel_registration, mark_attendance, certificate_eligibility),
    components(
        schemas(
            MyRegistration,
            Registration,
            RegistrationStatus,
            AttendanceUpdate,
            CertificateEligibility
        ),
        responses(
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse
        )
    ),
    tags((name = "Registrations", description = "Student registrations and attendance"))
)]
pub struct RegistrationsApiDoc;

pub fn router<E, G>(service: EventService<E, G>, jwt: JwtAuth) -> Router
where
    E: EventRepository + 'static,
    G: RegistrationRepository + 'static,
{
    Router::new()
        .route("/me", get(my_registrations))
        .route("/{id}/cancel", post(cancel_registration))
        .route("/{id}/attendance", put(mark_attendance))
        .route("/{id}/certificate", get(certificate_eligibility))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(Arc::new(service))
}

/// The caller's registrations
#[utoipa::path(
    get,
    path = "/me",
    tag = "Registrations",
    responses(
        (status = 200, description = "Registrations with event details", body = Vec<MyRegistration>),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer" = []))
)]
async fn my_registrations<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
) -> EventResult<Json<Vec<MyRegistration>>> {
    Ok(Json(service.my_registrations(&actor).await?))
}

/// Cancel the caller's registration
#[utoipa::path(
    post,
    path = "/{id}/cancel",
    tag = "Registrations",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Registration cancelled", body = Registration),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn cancel_registration<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Registration>> {
    Ok(Json(service.cancel_registration(&actor, id).await?))
}

/// Record or clear attendance
#[utoipa::path(
    put,
    path = "/{id}/attendance",
    tag = "Registrations",
    params(("id" = Uuid, Path, description = "Registration ID")),
    request_body = AttendanceUpdate,
    responses(
        (status = 200, description = "Attendance updated", body = Registration),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    ),
    security(("bearer" = []))
)]
async fn mark_attendance<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<AttendanceUpdate>,
) -> EventResult<Json<Registration>> {
    Ok(Json(service.mark_attendance(&actor, id, input.attended).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/certificate",
    tag = "Registrations",
    params(("id" = Uuid, Path, description = "Registration ID")),
    responses(
        (status = 200, description = "Certificate eligibility", body = CertificateEligibility),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn certificate_eligibility<E: EventRepository, G: RegistrationRepository>(
    State(service): State<SharedService<E, G>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> EventResult<Json<CertificateEligibility>> {
    Ok(Json(service.certificate_eligibility(&actor, id).await?))
}
