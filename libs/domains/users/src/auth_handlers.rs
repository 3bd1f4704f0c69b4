use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    CurrentUser, JwtAuth, ValidatedJson,
    auth::ACCESS_TOKEN_COOKIE,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, StudentProfile,
    UpdateProfile, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(register, login, logout, me, update_me, change_password),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserResponse,
            StudentProfile,
            UpdateProfile,
            ChangePasswordRequest
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = "Auth", description = "Sign-up, login and the caller's own account"))
)]
pub struct AuthApiDoc;

/// State for the auth routes
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
    /// Adds `Secure` to the session cookie
    pub secure_cookies: bool,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

/// `/register`, `/login`, `/logout` are public; `/me*` need a token
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    let protected = Router::new()
        .route("/me", get(me).put(update_me))
        .route("/me/password", post(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
        .with_state(state)
}

fn session_cookie(token: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { " Secure;" } else { "" };
    format!(
        "{}={}; HttpOnly;{} SameSite=Strict; Path=/; Max-Age={}",
        ACCESS_TOKEN_COOKIE, token, secure, max_age
    )
}

/// Token in the body and in the session cookie
fn issue_session<R: UserRepository>(
    state: &AuthState<R>,
    status: StatusCode,
    user: UserResponse,
) -> UserResult<Response> {
    let access_token = state
        .jwt
        .create_access_token(user.id, &user.email, &user.name, user.role)
        .map_err(|e| {
            tracing::error!("Failed to create access token: {:?}", e);
            UserError::Internal("Failed to create token".to_string())
        })?;

    let expires_in = state.jwt.ttl().as_secs();
    let cookie = session_cookie(&access_token, expires_in, state.secure_cookies);

    let body = AuthResponse {
        user,
        access_token,
        token_type: "Bearer".to_string(),
        expires_in,
    };

    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Register a student account
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created and signed in", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<Response> {
    let user = state.service.register_student(input).await?;
    issue_session(&state, StatusCode::CREATED, user)
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; the token is also set as a cookie", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Response> {
    let user = state
        .service
        .authenticate(&input.email, &input.password)
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    issue_session(&state, StatusCode::OK, user)
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    responses((status = 204, description = "Cookie cleared"))
)]
async fn logout<R: UserRepository>(State(state): State<AuthState<R>>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session_cookie("", 0, state.secure_cookies))],
    )
}

/// The caller's account
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer" = []))
)]
async fn me<R: UserRepository>(
    State(state): State<AuthState<R>>,
    user: CurrentUser,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(state.service.get_user(user.id).await?))
}

/// Update name and student profile
#[utoipa::path(
    put,
    path = "/me",
    tag = "Auth",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer" = []))
)]
async fn update_me<R: UserRepository>(
    State(state): State<AuthState<R>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<UpdateProfile>,
) -> UserResult<Json<UserResponse>> {
    Ok(Json(state.service.update_profile(user.id, input).await?))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/me/password",
    tag = "Auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    ),
    security(("bearer" = []))
)]
async fn change_password<R: UserRepository>(
    State(state): State<AuthState<R>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<ChangePasswordRequest>,
) -> UserResult<StatusCode> {
    state
        .service
        .change_password(user.id, &input.current_password, &input.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
