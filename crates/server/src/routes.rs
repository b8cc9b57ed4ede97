use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::{Method, header};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use watchlog_core::error::ApiError;
use watchlog_core::types::{AddItemRequest, ItemPatch, MediaType, TrackedItem, WatchStatus};
use watchlog_db::DbError;
use watchlog_metadata::enrich::EnrichSource;
use watchlog_metadata::normalize::UNKNOWN_TITLE;
use watchlog_metadata::{MediaDetail, MediaSummary, SearchResults, recommend};
use watchlog_tracker::ListError;
use watchlog_tracker::query::{self, FilterCriteria, SortDirection, SortKey};
use watchlog_tracker::stats::{self, DashboardStats, ListSummary};

use crate::auth::{AuthUser, issue_token};
use crate::error::AppError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_router())
        .nest("/list", list_router())
        .nest("/discover", discover_router())
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/recommendations", get(recommendations))
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me).delete(delete_account))
}

fn list_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_list))
        .route("/add", post(add_item))
        .route("/update/{item_id}", put(update_item))
        .route("/toggle-season/{item_id}", put(toggle_season))
        .route("/filtered", get(filtered_list))
        .route("/stats", get(list_stats))
        .route("/{item_id}", delete(delete_item))
}

fn discover_router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/trending", get(trending))
        .route("/latest", get(latest))
        .route("/details/{media_type}/{api_id}", get(details))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1")
        .execute(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").expect("valid username regex"));
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Deserialize)]
struct RegisterRequest {
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
struct UserView {
    id: String,
    email: String,
    username: String,
}

#[derive(Serialize)]
struct AuthResponse {
    token: String,
    user: UserView,
}

#[derive(Serialize)]
struct MeResponse {
    user: UserView,
}

fn normalize_email(raw: Option<&str>) -> String {
    raw.unwrap_or_default().trim().to_lowercase()
}

#[derive(Debug)]
struct Registration {
    email: String,
    username: String,
    password: String,
}

fn validate_registration(req: RegisterRequest) -> Result<Registration, ApiError> {
    let mut fields = serde_json::Map::new();

    let email = normalize_email(req.email.as_deref());
    if email.is_empty() {
        fields.insert("email".into(), json!(["is required"]));
    } else if !EMAIL.is_match(&email) {
        fields.insert("email".into(), json!(["must be a valid email address"]));
    }

    let username = req.username.unwrap_or_default().trim().to_string();
    if !USERNAME.is_match(&username) {
        fields.insert(
            "username".into(),
            json!(["must be 3-30 letters, digits or underscores"]),
        );
    }

    let password = req.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LEN {
        fields.insert(
            "password".into(),
            json!([format!("must be at least {MIN_PASSWORD_LEN} characters")]),
        );
    }

    if fields.is_empty() {
        Ok(Registration {
            email,
            username,
            password,
        })
    } else {
        Err(ApiError::validation(fields.into()))
    }
}

async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let reg = validate_registration(body)?;

    let user_id =
        watchlog_db::repo::users::create_user(&state.db, &reg.email, &reg.username, &reg.password)
            .await
            .map_err(|e| match e {
                DbError::EmailTaken => ApiError::Conflict("email already registered".into()),
                other => ApiError::Internal(other.to_string()),
            })?;
    info!(user_id = %user_id, username = %reg.username, "user registered");

    let token = issue_token(&user_id, &reg.username, &state.jwt_secret)?;
    Ok(Json(AuthResponse {
        token,
        user: UserView {
            id: user_id,
            email: reg.email,
            username: reg.username,
        },
    }))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = normalize_email(body.email.as_deref());
    let password = body.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("email and password required".into()).into());
    }

    let user = watchlog_db::repo::users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".into()))?;

    let valid = watchlog_db::repo::users::verify_password(&password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("hash error: {e}")))?;
    if !valid {
        return Err(ApiError::Unauthorized("invalid credentials".into()).into());
    }

    let token = issue_token(&user.id, &user.username, &state.jwt_secret)?;
    Ok(Json(AuthResponse {
        token,
        user: UserView {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    }))
}

async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<MeResponse>, AppError> {
    let user = watchlog_db::repo::users::find_by_id(&state.db, &auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

    Ok(Json(MeResponse {
        user: UserView {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    }))
}

#[derive(Serialize)]
struct OkResponse {
    ok: bool,
}

async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<OkResponse>, AppError> {
    if !watchlog_db::repo::users::delete_user(&state.db, &auth.user_id).await? {
        return Err(ApiError::NotFound("user not found".into()).into());
    }
    info!(user_id = %auth.user_id, "account deleted");
    Ok(Json(OkResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    tracked_items: Vec<TrackedItem>,
}

#[derive(Serialize)]
struct ItemResponse {
    item: TrackedItem,
}

/// The user's list with blank display fields filled from the catalogs.
/// Provider-filled fields are written back; a failed write is only logged.
async fn enriched_items(state: &AppState, user_id: &str) -> Result<Vec<TrackedItem>, AppError> {
    let items = state.list.items(user_id).await?;
    let enriched = state.enricher.enrich_all(items).await;

    let filled: Vec<TrackedItem> = enriched
        .iter()
        .filter(|e| e.source == EnrichSource::Provider)
        .map(|e| {
            let mut item = e.item.clone();
            if item.title.as_deref() == Some(UNKNOWN_TITLE) {
                item.title = None;
            }
            item
        })
        .collect();
    if !filled.is_empty() {
        if let Err(e) = state.list.fill_metadata(user_id, &filled).await {
            warn!(user_id, error = %e, "could not persist enriched metadata");
        }
    }

    Ok(enriched.into_iter().map(|e| e.item).collect())
}

async fn get_list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListResponse>, AppError> {
    let tracked_items = enriched_items(&state, &auth.user_id).await?;
    Ok(Json(ListResponse { tracked_items }))
}

async fn add_item(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<AddItemRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.list.add(&auth.user_id, &body).await?;
    Ok(Json(ItemResponse { item }))
}

async fn update_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
    ApiJson(patch): ApiJson<ItemPatch>,
) -> Result<Json<ItemResponse>, AppError> {
    let item = state.list.update(&auth.user_id, &item_id, &patch).await?;
    Ok(Json(ItemResponse { item }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToggleSeasonRequest {
    season_number: Option<i64>,
    total_seasons: Option<i64>,
}

async fn toggle_season(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
    ApiJson(body): ApiJson<ToggleSeasonRequest>,
) -> Result<Json<ItemResponse>, AppError> {
    let season = body
        .season_number
        .ok_or_else(|| ApiError::validation(json!({ "seasonNumber": ["is required"] })))?;
    let item = state
        .list
        .toggle_season(&auth.user_id, &item_id, season, body.total_seasons)
        .await?;
    Ok(Json(ItemResponse { item }))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FilteredParams {
    media_type: Option<MediaType>,
    status: Option<WatchStatus>,
    min_rating: Option<u8>,
    max_rating: Option<u8>,
    sort_by: Option<SortKey>,
    order: Option<SortDirection>,
}

async fn filtered_list(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(params): ApiQuery<FilteredParams>,
) -> Result<Json<ListResponse>, AppError> {
    let criteria = FilterCriteria {
        media_type: params.media_type,
        status: params.status,
        min_rating: params.min_rating,
        max_rating: params.max_rating,
    };
    let items = enriched_items(&state, &auth.user_id).await?;
    let mut tracked_items = query::filter(items, &criteria);
    query::sort(
        &mut tracked_items,
        params.sort_by.unwrap_or_default(),
        params.order.unwrap_or_default(),
    );
    Ok(Json(ListResponse { tracked_items }))
}

async fn list_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ListSummary>, AppError> {
    let items = state.list.items(&auth.user_id).await?;
    Ok(Json(stats::summary(&items)))
}

#[derive(Serialize)]
struct DeleteResponse {
    ok: bool,
    removed: bool,
}

/// Idempotent: an id that is already gone still answers 200.
async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(item_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let removed = match state.list.remove(&auth.user_id, &item_id).await {
        Ok(()) => true,
        Err(ListError::ItemNotFound) => false,
        Err(e) => return Err(e.into()),
    };
    Ok(Json(DeleteResponse { ok: true, removed }))
}

// ---------------------------------------------------------------------------
// Dashboard & recommendations
// ---------------------------------------------------------------------------

async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    let items = state.list.items(&auth.user_id).await?;
    Ok(Json(stats::dashboard(&items)))
}

async fn recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SearchResults>, AppError> {
    let items = state.list.items(&auth.user_id).await?;
    Ok(Json(recommend::recommend(state.catalogs(), &items).await))
}

// ---------------------------------------------------------------------------
// Discover
// ---------------------------------------------------------------------------

fn parse_media_type(raw: &str) -> Result<MediaType, ApiError> {
    MediaType::parse(raw)
        .ok_or_else(|| ApiError::BadRequest("type must be one of movie, tv, anime".into()))
}

/// Absent, empty or `all` means every media type.
fn type_filter(raw: Option<&str>) -> Result<Option<MediaType>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(t) => parse_media_type(t).map(Some),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
}

#[derive(Deserialize)]
struct TypeParams {
    #[serde(rename = "type")]
    media_type: Option<String>,
}

impl TypeParams {
    fn media_type(&self) -> Result<MediaType, ApiError> {
        Ok(type_filter(self.media_type.as_deref())?.unwrap_or(MediaType::Movie))
    }
}

async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<SearchResults>, AppError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query param q is required".into()).into());
    }
    let filter = type_filter(params.media_type.as_deref())?;
    Ok(Json(state.discovery.search(query, filter).await))
}

async fn trending(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TypeParams>,
) -> Result<Json<Vec<MediaSummary>>, AppError> {
    let media_type = params.media_type()?;
    Ok(Json(state.discovery.trending(media_type).await))
}

async fn latest(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TypeParams>,
) -> Result<Json<Vec<MediaSummary>>, AppError> {
    let media_type = params.media_type()?;
    Ok(Json(state.discovery.latest(media_type).await))
}

async fn details(
    State(state): State<AppState>,
    Path((media_type, api_id)): Path<(String, String)>,
) -> Result<Json<MediaDetail>, AppError> {
    let media_type = parse_media_type(&media_type)?;
    let api_id: i64 = api_id
        .parse()
        .map_err(|_| ApiError::BadRequest("id must be an integer".into()))?;
    Ok(Json(state.discovery.details(media_type, api_id).await?))
}
