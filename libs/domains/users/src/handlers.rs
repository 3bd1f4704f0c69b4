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
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::models::{
    CreateUser, Role, SetRoleRequest, SetStatusRequest, StudentProfile, UserFilter, UserList,
    UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the user administration API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, delete_user, set_role, set_status),
    components(
        schemas(
            UserResponse,
            UserList,
            CreateUser,
            SetRoleRequest,
            SetStatusRequest,
            StudentProfile,
            Role
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
    tags((name = "Users", description = "Account administration (main admin only)"))
)]
pub struct ApiDoc;

/// Every route needs a token; the service checks for `MAIN_ADMIN`
pub fn router<R: UserRepository + 'static>(service: UserService<R>, jwt: JwtAuth) -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/role", put(set_role))
        .route("/{id}/status", put(set_status))
        .route_layer(middleware::from_fn_with_state(jwt, jwt_auth_middleware))
        .with_state(Arc::new(service))
}

/// List accounts
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(UserFilter),
    responses(
        (status = 200, description = "Page of users", body = UserList),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    QueryParams(filter): QueryParams<UserFilter>,
) -> UserResult<Json<UserList>> {
    let (items, total) = service.list_users(&actor, filter).await?;
    Ok(Json(UserList { items, total }))
}

/// Create an organizer, coordinator or student account
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer" = []))
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.admin_get_user(&actor, id).await?))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
) -> UserResult<StatusCode> {
    service.delete_user(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change an account's role
#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn set_role<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SetRoleRequest>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.set_role(&actor, id, input.role).await?))
}

/// Enable or disable an account
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    ),
    security(("bearer" = []))
)]
async fn set_status<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    actor: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<SetStatusRequest>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(service.set_active(&actor, id, input.is_active).await?))
}
