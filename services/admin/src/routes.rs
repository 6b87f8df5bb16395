//! Admin service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    error::{AdminError, AdminResult},
    helpers::{fetch_language, get_usermeta, will_expire_at_str},
    middleware::{AdminUser, admin_auth_middleware},
    models::UserRequest,
    state::AppState,
    validation::{town_rules, user_request_rules},
};

/// Query parameters for paginated listings
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters for a user meta lookup
#[derive(Debug, Deserialize)]
pub struct MetaQuery {
    pub key: Option<String>,
}

/// Query parameters for the job expiry helper
#[derive(Debug, Deserialize)]
pub struct ExpiryQuery {
    pub due_time: String,
    pub created_at: String,
}

/// Create the router for the admin service
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route(
            "/admin/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/admin/users/:id/enable", post(enable_user))
        .route("/admin/users/:id/disable", post(disable_user))
        .route("/admin/users/:id/meta", get(user_meta))
        .route("/admin/users/by-type/:user_type", get(users_by_type))
        .route("/admin/translators", get(translators))
        .route("/admin/towns", get(list_towns).post(create_town))
        .route("/admin/towns/:id", put(update_town).delete(delete_town))
        .route("/admin/languages/:id", get(language))
        .route("/admin/languages/slug/:slug", get(language_by_slug))
        .route("/admin/jobs/expiry", get(job_expiry))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(admin_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "admin-service"
    }))
}

fn user_request(payload: &Value) -> AdminResult<UserRequest> {
    crate::validation::Validator::new(user_request_rules()).validate(payload)?;
    serde_json::from_value(payload.clone()).map_err(|e| AdminError::BadRequest(e.to_string()))
}

fn attributes(payload: &Value) -> AdminResult<&serde_json::Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| AdminError::BadRequest("Expected a JSON object".to_string()))
}

/// List users page by page
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AdminResult<impl IntoResponse> {
    let page = state.users.paginate(query.page, query.per_page).await?;
    Ok(Json(page))
}

/// Create a user with its meta, role and associations
pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<Value>,
) -> AdminResult<impl IntoResponse> {
    let request = user_request(&payload)?;
    info!(
        "Admin {} ({}) creating user {}",
        admin.id,
        admin.roles.join(","),
        request.email
    );

    let user = state.user_repository.create_or_update(None, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    let user = state.users.find_or_fail(id).await?;
    Ok(Json(user))
}

/// Update a user with its meta, role and associations
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> AdminResult<impl IntoResponse> {
    let request = user_request(&payload)?;
    info!("Admin {} updating user {}", admin.id, id);

    let user = state
        .user_repository
        .create_or_update(Some(id), &request)
        .await?;
    Ok(Json(user))
}

/// Delete a user and, through cascades, its dependent rows
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    info!("Admin {} deleting user {}", admin.id, id);
    let user = state.users.delete(id).await?;
    Ok(Json(user))
}

pub async fn enable_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    let user = state.user_repository.enable(id).await?;
    Ok(Json(user))
}

pub async fn disable_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    let user = state.user_repository.disable(id).await?;
    Ok(Json(user))
}

/// All meta attributes of a user, or one when `key` is given
pub async fn user_meta(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<MetaQuery>,
) -> AdminResult<impl IntoResponse> {
    let meta = get_usermeta(&state.user_meta, id, query.key.as_deref()).await?;
    Ok(Json(meta))
}

/// Users carrying a given `user_type`
pub async fn users_by_type(
    State(state): State<AppState>,
    Path(user_type): Path<i32>,
) -> AdminResult<impl IntoResponse> {
    let users = state.users.where_eq("user_type", user_type).await?;
    Ok(Json(users))
}

pub async fn translators(State(state): State<AppState>) -> AdminResult<impl IntoResponse> {
    let translators = state.user_repository.get_translators().await?;
    Ok(Json(translators))
}

pub async fn list_towns(State(state): State<AppState>) -> AdminResult<impl IntoResponse> {
    let towns = state.towns.all().await?;
    Ok(Json(towns))
}

pub async fn create_town(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> AdminResult<impl IntoResponse> {
    state.towns.validate(&payload, town_rules())?;
    let town = state.towns.create(attributes(&payload)?).await?;
    Ok((StatusCode::CREATED, Json(town)))
}

pub async fn update_town(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> AdminResult<impl IntoResponse> {
    state.towns.validate(&payload, town_rules())?;
    let town = state.towns.update(id, attributes(&payload)?).await?;
    Ok(Json(town))
}

pub async fn delete_town(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    let town = state.towns.delete(id).await?;
    Ok(Json(town))
}

/// Language name by ID
pub async fn language(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AdminResult<impl IntoResponse> {
    let language = fetch_language(&state.languages, id).await?;
    Ok(Json(json!({ "id": id, "language": language })))
}

pub async fn language_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AdminResult<impl IntoResponse> {
    let language = state.languages.find_by_slug(&slug).await?;
    Ok(Json(language))
}

/// Expiry time of a job offer
pub async fn job_expiry(Query(query): Query<ExpiryQuery>) -> AdminResult<impl IntoResponse> {
    let expires_at = will_expire_at_str(&query.due_time, &query.created_at)?;
    Ok(Json(json!({ "expires_at": expires_at })))
}
