use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use serde_json::{Value, json};
use watchlog_core::clock::SystemClock;
use watchlog_core::types::MediaType;
use watchlog_metadata::provider::{CatalogProvider, Catalogs};
use watchlog_metadata::{MediaDetail, MediaSummary, MetadataError};
use watchlog_server::routes::build_router;
use watchlog_server::state::AppState;

/// Catalog with canned answers. Unknown ids are `NotFound`.
#[derive(Default)]
struct FakeCatalog {
    hits: Vec<MediaSummary>,
    details: HashMap<i64, MediaDetail>,
    similar: HashMap<i64, Vec<MediaSummary>>,
    detail_calls: AtomicUsize,
}

impl FakeCatalog {
    fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for FakeCatalog {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn search(&self, _query: &str) -> Result<Vec<MediaSummary>, MetadataError> {
        Ok(self.hits.clone())
    }

    async fn trending(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        Ok(self
            .hits
            .iter()
            .filter(|h| h.media_type == media_type)
            .cloned()
            .collect())
    }

    async fn latest(&self, media_type: MediaType) -> Result<Vec<MediaSummary>, MetadataError> {
        self.trending(media_type).await
    }

    async fn details(
        &self,
        _media_type: MediaType,
        api_id: i64,
    ) -> Result<MediaDetail, MetadataError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.get(&api_id).cloned().ok_or(MetadataError::NotFound)
    }

    async fn similar(
        &self,
        _media_type: MediaType,
        api_id: i64,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        Ok(self.similar.get(&api_id).cloned().unwrap_or_default())
    }
}

fn summary(api_id: i64, media_type: MediaType, title: &str) -> MediaSummary {
    MediaSummary {
        api_id,
        media_type,
        title: title.to_string(),
        overview: Some(format!("About {title}")),
        poster: Some(format!("https://img.example/{api_id}.jpg")),
        release_date: Some("2010-07-16".to_string()),
        first_air_date: None,
        genres: vec!["Action".to_string()],
        popularity: None,
    }
}

fn detail(api_id: i64, media_type: MediaType, title: &str) -> MediaDetail {
    MediaDetail {
        summary: summary(api_id, media_type, title),
        runtime: Some(148),
        episodes: None,
        number_of_seasons: None,
        status: None,
    }
}

struct TestApp {
    server: TestServer,
    movie_tv: Arc<FakeCatalog>,
}

fn movie_tv_catalog() -> FakeCatalog {
    FakeCatalog {
        hits: vec![
            summary(27205, MediaType::Movie, "Inception"),
            summary(1396, MediaType::Tv, "Breaking Bad"),
        ],
        details: HashMap::from([(27205, detail(27205, MediaType::Movie, "Inception"))]),
        similar: HashMap::from([(
            603,
            vec![
                summary(604, MediaType::Movie, "The Matrix Reloaded"),
                summary(27205, MediaType::Movie, "Inception"),
                summary(604, MediaType::Movie, "The Matrix Reloaded"),
            ],
        )]),
        ..Default::default()
    }
}

fn anime_catalog() -> FakeCatalog {
    FakeCatalog {
        hits: vec![summary(1, MediaType::Anime, "Cowboy Bebop")],
        ..Default::default()
    }
}

async fn build_app(movie_tv: Option<Arc<FakeCatalog>>) -> TestServer {
    let pool = watchlog_db::connect(":memory:").await.unwrap();
    watchlog_db::migrate::run(&pool).await.unwrap();

    let movie_tv = movie_tv.map(|catalog| catalog as Arc<dyn CatalogProvider>);
    let state = AppState::new(
        pool,
        "test-secret-key".to_string(),
        Catalogs::new(movie_tv, Arc::new(anime_catalog())),
        Arc::new(SystemClock),
        Duration::from_secs(300),
        4,
    );

    TestServer::new(build_router(state)).unwrap()
}

/// Create a test server with an in-memory SQLite database.
async fn test_app() -> TestApp {
    let movie_tv = Arc::new(movie_tv_catalog());
    TestApp {
        server: build_app(Some(movie_tv.clone())).await,
        movie_tv,
    }
}

fn bearer(token: &str) -> HeaderValue {
    format!("Bearer {token}").parse().unwrap()
}

/// Helper: register and return a JWT token.
async fn register(server: &TestServer, email: &str, username: &str) -> String {
    let resp = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "username": username, "password": "hunter22" }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    body["token"].as_str().unwrap().to_string()
}

async fn add(server: &TestServer, token: &str, body: Value) -> Value {
    let resp = server
        .post("/api/list/add")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await;
    resp.assert_status_ok();
    resp.json::<Value>()["item"].clone()
}

async fn update(server: &TestServer, token: &str, item_id: &str, body: Value) -> Value {
    let resp = server
        .put(&format!("/api/list/update/{item_id}"))
        .add_header(AUTHORIZATION, bearer(token))
        .json(&body)
        .await;
    resp.assert_status_ok();
    resp.json::<Value>()["item"].clone()
}

async fn get_list(server: &TestServer, token: &str) -> Vec<Value> {
    let resp = server
        .get("/api/list")
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    resp.assert_status_ok();
    resp.json::<Value>()["trackedItems"]
        .as_array()
        .unwrap()
        .clone()
}

// ---------------------------------------------------------------------------
// Health & auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let app = test_app().await;
    let resp = app.server.get("/api/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_me() {
    let app = test_app().await;
    register(&app.server, "Ann@Example.com", "ann").await;

    let resp = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": "hunter22" }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let token = body["token"].as_str().unwrap();
    assert_eq!(body["user"]["username"], "ann");

    let resp = app
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["user"]["email"], "ann@example.com");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = test_app().await;
    register(&app.server, "ann@example.com", "ann").await;

    let resp = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "ann@example.com", "username": "ann2", "password": "hunter22" }))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn register_validates_fields() {
    let app = test_app().await;
    let resp = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "not-an-email", "username": "x", "password": "123" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"]["username"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn login_with_invalid_credentials() {
    let app = test_app().await;
    register(&app.server, "ann@example.com", "ann").await;

    let resp = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": "wrong-password" }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn list_requires_auth() {
    let app = test_app().await;
    let resp = app.server.get("/api/list").await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let resp = app
        .server
        .get("/api/list")
        .add_header(AUTHORIZATION, bearer("garbage"))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleting_the_account_removes_everything() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;

    let resp = app
        .server
        .delete("/api/auth/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["ok"], true);

    let resp = app
        .server
        .get("/api/list")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    let resp = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ann@example.com", "password": "hunter22" }))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// List mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_twice_reports_the_existing_item() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;

    let item = add(
        &app.server,
        &token,
        json!({ "apiId": 27205, "mediaType": "movie", "title": "Inception", "releaseDate": "2010-07-16" }),
    )
    .await;
    assert_eq!(item["status"], "planToWatch");
    assert_eq!(item["releaseYear"], 2010);

    let resp = app
        .server
        .post("/api/list/add")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "apiId": 27205, "mediaType": "movie" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "duplicate_item");
    assert_eq!(body["error"]["details"]["item"]["id"], item["id"]);

    assert_eq!(get_list(&app.server, &token).await.len(), 1);
}

#[tokio::test]
async fn add_rejects_missing_fields() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;

    let resp = app
        .server
        .post("/api/list/add")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "mediaType": "book" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["details"]["apiId"].is_array());
    assert!(body["error"]["details"]["mediaType"].is_array());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;

    let resp = app
        .server
        .post("/api/list/add")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "apiId": "not a number", "mediaType": "movie" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["error"]["code"], "bad_request");
}

#[tokio::test]
async fn completing_stamps_and_regressing_clears_the_date() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let item = add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;
    let id = item["id"].as_str().unwrap();

    let done = update(&app.server, &token, id, json!({ "status": "completed", "rating": 9 })).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["rating"], 9);
    assert!(done["dateCompleted"].is_string());

    let back = update(&app.server, &token, id, json!({ "status": "watching" })).await;
    assert!(back["dateCompleted"].is_null());
}

#[tokio::test]
async fn update_validates_and_reports_missing_items() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let item = add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;
    let id = item["id"].as_str().unwrap();

    let resp = app
        .server
        .put(&format!("/api/list/update/{id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "rating": 11 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = app
        .server
        .put("/api/list/update/nope")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "rating": 5 }))
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn season_toggles_drive_the_status() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let item = add(&app.server, &token, json!({ "apiId": 1396, "mediaType": "tv" })).await;
    let id = item["id"].as_str().unwrap();

    let toggle = |season: i64| {
        let path = format!("/api/list/toggle-season/{id}");
        let token = token.clone();
        let server = &app.server;
        async move {
            let resp = server
                .put(&path)
                .add_header(AUTHORIZATION, bearer(&token))
                .json(&json!({ "seasonNumber": season, "totalSeasons": 2 }))
                .await;
            resp.assert_status_ok();
            resp.json::<Value>()["item"].clone()
        }
    };

    let first = toggle(1).await;
    assert_eq!(first["status"], "watching");
    assert!(first["dateCompleted"].is_null());

    let second = toggle(2).await;
    assert_eq!(second["status"], "completed");
    assert_eq!(second["watchedSeasons"], json!([1, 2]));
    assert!(second["dateCompleted"].is_string());

    let regressed = toggle(1).await;
    assert_eq!(regressed["status"], "watching");
    assert_eq!(regressed["watchedSeasons"], json!([2]));
    assert!(regressed["dateCompleted"].is_null());
}

#[tokio::test]
async fn season_toggle_on_a_movie_is_rejected() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let item = add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;
    let id = item["id"].as_str().unwrap();

    let resp = app
        .server
        .put(&format!("/api/list/toggle-season/{id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({ "seasonNumber": 1 }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = app
        .server
        .put(&format!("/api/list/toggle-season/{id}"))
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["error"]["code"], "validation_error");
}

#[tokio::test]
async fn delete_is_idempotent() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let item = add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;
    let path = format!("/api/list/{}", item["id"].as_str().unwrap());

    let resp = app
        .server
        .delete(&path)
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>(), json!({ "ok": true, "removed": true }));

    let resp = app
        .server
        .delete(&path)
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>(), json!({ "ok": true, "removed": false }));

    assert!(get_list(&app.server, &token).await.is_empty());
}

// ---------------------------------------------------------------------------
// List reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_read_enriches_and_persists() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    add(&app.server, &token, json!({ "apiId": 27205, "mediaType": "movie" })).await;

    let items = get_list(&app.server, &token).await;
    assert_eq!(items[0]["title"], "Inception");
    assert_eq!(items[0]["poster"], "https://img.example/27205.jpg");
    assert_eq!(items[0]["genres"], json!(["Action"]));
    assert_eq!(app.movie_tv.detail_calls(), 1);

    // Written back: the second read needs no provider call.
    let items = get_list(&app.server, &token).await;
    assert_eq!(items[0]["title"], "Inception");
    assert_eq!(app.movie_tv.detail_calls(), 1);
}

#[tokio::test]
async fn enrichment_keeps_user_titles_and_survives_provider_misses() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    add(
        &app.server,
        &token,
        json!({ "apiId": 27205, "mediaType": "movie", "title": "My Inception" }),
    )
    .await;
    add(&app.server, &token, json!({ "apiId": 999, "mediaType": "movie" })).await;

    let items = get_list(&app.server, &token).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "My Inception");
    assert!(items[0]["poster"].is_string());
    assert_eq!(items[1]["title"], "Unknown Title");

    // The fallback title is not persisted, so the miss is retried.
    get_list(&app.server, &token).await;
    assert_eq!(app.movie_tv.detail_calls(), 3);
}

#[tokio::test]
async fn filtered_list_filters_then_sorts() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    for (api_id, rating) in [(1, None), (2, Some(7)), (3, Some(8)), (4, Some(10))] {
        let item = add(
            &app.server,
            &token,
            json!({ "apiId": api_id, "mediaType": "movie", "title": format!("m{api_id}"), "poster": "/p.jpg" }),
        )
        .await;
        if let Some(rating) = rating {
            update(&app.server, &token, item["id"].as_str().unwrap(), json!({ "rating": rating })).await;
        }
    }

    let resp = app
        .server
        .get("/api/list/filtered?minRating=8&sortBy=rating&order=asc")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    let ratings: Vec<Value> = resp.json::<Value>()["trackedItems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["rating"].clone())
        .collect();
    assert_eq!(ratings, vec![json!(8), json!(10)]);

    let resp = app
        .server
        .get("/api/list/filtered?status=sleeping")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stats_match_the_three_item_scenario() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;

    let movie = add(&app.server, &token, json!({ "apiId": 1, "mediaType": "movie", "title": "a", "poster": "/a" })).await;
    update(&app.server, &token, movie["id"].as_str().unwrap(), json!({ "status": "completed", "rating": 8 })).await;
    let tv = add(&app.server, &token, json!({ "apiId": 2, "mediaType": "tv", "title": "b", "poster": "/b" })).await;
    update(&app.server, &token, tv["id"].as_str().unwrap(), json!({ "status": "completed", "rating": 9 })).await;
    add(
        &app.server,
        &token,
        json!({ "apiId": 3, "mediaType": "anime", "title": "c", "poster": "/c", "status": "watching" }),
    )
    .await;

    let resp = app
        .server
        .get("/api/list/stats")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["avgRating"], 8.5);
    assert_eq!(
        body["byStatus"],
        json!({ "planToWatch": 0, "watching": 1, "completed": 2 })
    );

    let resp = app
        .server
        .get("/api/dashboard/stats")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["total"], 3);
    assert_eq!(body["averageRating"], 8.5);
    assert!(body["averageRatingByMediaType"]["anime"].is_null());
    assert_eq!(body["recentlyCompleted"].as_array().unwrap().len(), 2);
    assert_eq!(body["currentlyWatching"][0]["apiId"], 3);
}

// ---------------------------------------------------------------------------
// Discover & recommendations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_requires_a_query_and_groups_results() {
    let app = test_app().await;
    let resp = app.server.get("/api/discover/search").await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let resp = app.server.get("/api/discover/search?q=bebop").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["movies"].as_array().unwrap().len(), 1);
    assert_eq!(body["tv"].as_array().unwrap().len(), 1);
    assert_eq!(body["anime"][0]["title"], "Cowboy Bebop");

    let resp = app.server.get("/api/discover/search?q=bebop&type=anime").await;
    let body: Value = resp.json();
    assert!(body["movies"].as_array().unwrap().is_empty());
    assert_eq!(body["anime"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn trending_defaults_to_movies() {
    let app = test_app().await;
    let resp = app.server.get("/api/discover/trending").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body[0]["mediaType"], "movie");

    let resp = app.server.get("/api/discover/latest?type=tv").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()[0]["apiId"], 1396);

    let resp = app.server.get("/api/discover/trending?type=podcast").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn details_found_missing_and_malformed() {
    let app = test_app().await;
    let resp = app.server.get("/api/discover/details/movie/27205").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["title"], "Inception");
    assert_eq!(body["runtime"], 148);

    let resp = app.server.get("/api/discover/details/movie/1").await;
    resp.assert_status(StatusCode::NOT_FOUND);

    let resp = app.server.get("/api/discover/details/movie/abc").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn without_a_movie_catalog_discovery_degrades() {
    let server = build_app(None).await;

    let resp = server.get("/api/discover/trending?type=movie").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>(), json!([]));

    let resp = server.get("/api/discover/search?q=bebop").await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["anime"].as_array().unwrap().len(), 1);

    let resp = server.get("/api/discover/details/tv/1396").await;
    resp.assert_status(StatusCode::BAD_GATEWAY);
    assert_eq!(resp.json::<Value>()["error"]["code"], "provider_error");
}

#[tokio::test]
async fn recommendations_skip_tracked_and_duplicate_titles() {
    let app = test_app().await;
    let token = register(&app.server, "ann@example.com", "ann").await;
    let seed = add(
        &app.server,
        &token,
        json!({ "apiId": 603, "mediaType": "movie", "title": "The Matrix", "poster": "/m" }),
    )
    .await;
    update(&app.server, &token, seed["id"].as_str().unwrap(), json!({ "status": "completed", "rating": 10 })).await;
    add(
        &app.server,
        &token,
        json!({ "apiId": 27205, "mediaType": "movie", "title": "Inception", "poster": "/i" }),
    )
    .await;

    let resp = app
        .server
        .get("/api/recommendations")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let movies = body["movies"].as_array().unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["apiId"], 604);
    assert!(body["tv"].as_array().unwrap().is_empty());
}
