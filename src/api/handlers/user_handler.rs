//! User handlers.
//!
//! Thin translation between HTTP and `UserService`: every status code other
//! than the success one comes from an `AppError`.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{AppJson, AppPath, ValidatedJson};
use crate::api::AppState;
use crate::config::{MAX_NAME_LENGTH, MAX_PASSWORD_LENGTH, MAX_USERNAME_LENGTH};
use crate::domain::{NewUser, PatchDocument, User};
use crate::errors::{AppError, AppResult};
use crate::types::NoContent;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = MAX_USERNAME_LENGTH))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1, max = MAX_PASSWORD_LENGTH))]
    #[schema(example = "p1")]
    pub password: String,
    #[validate(length(max = MAX_NAME_LENGTH))]
    #[schema(example = "Alice")]
    pub first_name: Option<String>,
    #[validate(length(max = MAX_NAME_LENGTH))]
    #[schema(example = "Liddell")]
    pub last_name: Option<String>,
    /// Accepted for compatibility; the server always issues a new key
    pub api_key: Option<String>,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        NewUser {
            username: request.username,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            api_key: request.api_key.unwrap_or_default(),
        }
    }
}

/// User login request
///
/// Both fields must be present; their values are only compared, so an empty
/// string is simply a credential that matches nobody.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "p1")]
    pub password: String,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/:id",
            get(get_user)
                .put(replace_user)
                .patch(patch_user)
                .delete(delete_user),
        )
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User record", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<User>> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered, with server-assigned id and apiKey", body = User),
        (status = 400, description = "Validation error or user could not be registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Json<User>> {
    let user = state.user_service.register(payload.into()).await?;
    Ok(Json(user))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Matching user record", body = User),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<User>> {
    let user = state
        .user_service
        .login(payload.username, payload.password)
        .await?;

    Ok(Json(user))
}

/// Replace a user record
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User ID; must equal the body id")
    ),
    request_body = User,
    responses(
        (status = 204, description = "User replaced"),
        (status = 400, description = "ID mismatch or validation error"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Write failed")
    )
)]
pub async fn replace_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    ValidatedJson(user): ValidatedJson<User>,
) -> AppResult<NoContent> {
    state.user_service.replace_user(id, user).await?;
    Ok(NoContent)
}

/// Partially update a user with a patch document
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body(content = PatchDocument, content_type = "application/json-patch+json"),
    responses(
        (status = 204, description = "Patch applied"),
        (status = 400, description = "Null patch document or validation errors"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Write failed")
    )
)]
pub async fn patch_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(patch): AppJson<Option<PatchDocument>>,
) -> AppResult<NoContent> {
    let patch = patch.ok_or_else(|| AppError::bad_request("Patch document is null."))?;

    state.user_service.patch_user(id, patch).await?;
    Ok(NoContent)
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Delete failed")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> AppResult<NoContent> {
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}
