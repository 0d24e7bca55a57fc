use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use application::{
    ApplicationError, AuthenticateUserRequest, BlogPostDto, CreatePostRequest,
    RegisterUserRequest, UpdateUserRequest, UserDto,
};
use domain::DomainError;

use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::security;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct RefreshPayload {
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct VerifyPayload {
    token: String,
}

#[derive(Debug, Deserialize)]
struct PostPayload {
    name: String,
    email: Option<String>,
    subject: String,
    date: Option<NaiveDate>,
    description: String,
}

impl From<PostPayload> for CreatePostRequest {
    fn from(payload: PostPayload) -> Self {
        Self {
            name: payload.name,
            email: payload.email,
            subject: payload.subject,
            date: payload.date,
            description: payload.description,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserUpdatePayload {
    username: String,
    email: String,
    is_staff: bool,
    is_active: bool,
}

#[derive(Debug, serde::Serialize)]
struct AccessTokenResponse {
    access: String,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .merge(blog_routes())
        .nest("/admin", admin_routes())
        .nest("/auth", auth_routes())
        .nest("/api-auth", api_auth_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security::enforce_allowed_hosts,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // HSTS is resolved only when debug mode is off.
    if let Some(security) = state.settings.security.as_ref() {
        if let Ok(value) = HeaderValue::from_str(&security.hsts_header_value()) {
            app = app.layer(SetResponseHeaderLayer::if_not_present(
                header::STRICT_TRANSPORT_SECURITY,
                value,
            ));
        }
    }

    app
}

/// The blog app's own routes, mounted at the root.
fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog_index))
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/{post_id}",
            get(get_post).put(replace_post).delete(delete_post),
        )
}

/// Auth plugin surface: registration plus the JWT token endpoints.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(register_user))
        .route("/users/me/", get(current_user))
        .route("/jwt/create/", post(jwt_create))
        .route("/jwt/refresh/", post(jwt_refresh))
        .route("/jwt/verify/", post(jwt_verify))
}

/// Login/logout for clients that do not speak JWT.
fn api_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login/", post(api_login))
        .route("/logout/", post(api_logout))
}

/// Staff-only CRUD over both registered models.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/blog/posts",
            get(admin_list_posts).post(admin_create_post),
        )
        .route(
            "/blog/posts/{post_id}",
            get(admin_get_post)
                .put(admin_replace_post)
                .delete(admin_delete_post),
        )
        .route("/auth/users", get(admin_list_users))
        .route(
            "/auth/users/{user_id}",
            get(admin_get_user)
                .put(admin_update_user)
                .delete(admin_delete_user),
        )
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Resolve the bearer token to a live account.
async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<UserDto, ApiError> {
    let user_id = state.token_service.user_from_headers(headers)?;
    let user = match state.account_service.get(user_id).await {
        Ok(user) => user,
        Err(ApplicationError::Domain(DomainError::UserNotFound)) => {
            return Err(ApiError::unauthorized("user no longer exists"))
        }
        Err(other) => return Err(other.into()),
    };
    if !user.is_active {
        return Err(ApiError::unauthorized("user is inactive"));
    }
    Ok(user)
}

async fn require_staff(state: &AppState, headers: &HeaderMap) -> Result<UserDto, ApiError> {
    let user = require_user(state, headers).await?;
    if !user.is_staff {
        return Err(ApiError::forbidden("staff account required"));
    }
    Ok(user)
}

// ---- blog ----

async fn blog_index(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BlogPostDto>>, ApiError> {
    require_user(&state, &headers).await?;
    Ok(Json(state.blog_service.list().await?))
}

async fn list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BlogPostDto>>, ApiError> {
    require_user(&state, &headers).await?;
    Ok(Json(state.blog_service.list().await?))
}

async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<BlogPostDto>), ApiError> {
    require_user(&state, &headers).await?;
    let dto = state.blog_service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

async fn get_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Result<Json<BlogPostDto>, ApiError> {
    require_user(&state, &headers).await?;
    Ok(Json(state.blog_service.get(post_id).await?))
}

async fn replace_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<BlogPostDto>, ApiError> {
    require_user(&state, &headers).await?;
    Ok(Json(state.blog_service.replace(post_id, payload.into()).await?))
}

async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_user(&state, &headers).await?;
    state.blog_service.delete(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- auth ----

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let dto = state
        .account_service
        .register(RegisterUserRequest {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(dto)))
}

async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserDto>, ApiError> {
    let user = require_user(&state, &headers).await?;
    Ok(Json(user))
}

async fn jwt_create(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<TokenPair>, ApiError> {
    let user = state
        .account_service
        .authenticate(AuthenticateUserRequest {
            username: payload.username,
            password: payload.password,
        })
        .await?;

    Ok(Json(state.token_service.issue_pair(user.id)?))
}

async fn jwt_refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access = state.token_service.refresh_access(&payload.refresh)?;
    Ok(Json(AccessTokenResponse { access }))
}

async fn jwt_verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPayload>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.token_service.decode(&payload.token)?;
    Ok(Json(serde_json::json!({})))
}

// ---- api-auth ----

async fn api_login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .account_service
        .authenticate(AuthenticateUserRequest {
            username: payload.username,
            password: payload.password,
        })
        .await?;

    Ok(Json(user))
}

async fn api_logout() -> StatusCode {
    // Token invalidation is the client's job; there is no server-side session.
    StatusCode::NO_CONTENT
}

// ---- admin ----

async fn admin_list_posts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<BlogPostDto>>, ApiError> {
    require_staff(&state, &headers).await?;
    Ok(Json(state.blog_service.list().await?))
}

async fn admin_create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<PostPayload>,
) -> Result<(StatusCode, Json<BlogPostDto>), ApiError> {
    require_staff(&state, &headers).await?;
    let dto = state.blog_service.create(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

async fn admin_get_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Result<Json<BlogPostDto>, ApiError> {
    require_staff(&state, &headers).await?;
    Ok(Json(state.blog_service.get(post_id).await?))
}

async fn admin_replace_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<BlogPostDto>, ApiError> {
    require_staff(&state, &headers).await?;
    Ok(Json(state.blog_service.replace(post_id, payload.into()).await?))
}

async fn admin_delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_staff(&state, &headers).await?;
    state.blog_service.delete(post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    require_staff(&state, &headers).await?;
    Ok(Json(state.account_service.list().await?))
}

async fn admin_get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDto>, ApiError> {
    require_staff(&state, &headers).await?;
    Ok(Json(state.account_service.get(user_id).await?))
}

async fn admin_update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdatePayload>,
) -> Result<Json<UserDto>, ApiError> {
    require_staff(&state, &headers).await?;
    let dto = state
        .account_service
        .update(
            user_id,
            UpdateUserRequest {
                username: payload.username,
                email: payload.email,
                is_staff: payload.is_staff,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(Json(dto))
}

async fn admin_delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    require_staff(&state, &headers).await?;
    state.account_service.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
