//! In-process stand-in for the content API, plus helpers to wire a client to it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::routing::{get, post};
use async_trait::async_trait;
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};
use time::OffsetDateTime;

use travel_articles::models::UserProfile;
use travel_articles::navigation::RecordingNavigator;
use travel_articles::session::{self, CredentialStore, MemoryCredentialStore, TokenClaims};
use travel_articles::{ApiResult, AppContext, ClientConfig};

pub const SEEDED_TOKEN: &str = "seeded-session-token";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_NAME: &str = "traveller";
pub const USER_PASSWORD: &str = "correct-horse";
pub const PAGE_SIZE: u32 = 6;
/// Eight numbered articles plus `abc123`.
pub const SEEDED_ARTICLES: usize = 9;

const TIMESTAMP: &str = "2024-05-01T08:00:00.000Z";

type ApiError = (StatusCode, Json<Value>);
type JsonResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

pub struct MockApi {
    articles: Mutex<Vec<Value>>,
    categories: Vec<Value>,
    users: Mutex<Vec<(Value, String)>>,
    tokens: Mutex<HashSet<String>>,
    requests: Mutex<Vec<RecordedRequest>>,
    /// Artificial latency for list requests, keyed by lower-cased title filter.
    delays: Mutex<HashMap<String, u64>>,
    /// Artificial latency for single-article reads, keyed by document id.
    detail_delays: Mutex<HashMap<String, u64>>,
    next_id: Mutex<i64>,
}

fn error_body(status: StatusCode, name: &str, message: &str) -> ApiError {
    (
        status,
        Json(json!({
            "data": null,
            "error": { "status": status.as_u16(), "name": name, "message": message }
        })),
    )
}

fn user_json(id: i64, username: &str, email: &str) -> Value {
    json!({
        "id": id,
        "documentId": format!("user{}", id),
        "username": username,
        "email": email,
        "provider": "local",
        "confirmed": true,
        "blocked": false,
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP,
    })
}

fn category_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "documentId": format!("cat{}", id),
        "name": name,
        "description": null,
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP,
        "publishedAt": TIMESTAMP,
        "locale": null,
    })
}

fn article_json(id: i64, document_id: &str, title: &str, category: &Value) -> Value {
    json!({
        "id": id,
        "documentId": document_id,
        "title": title,
        "description": format!("Notes from {}", title),
        "cover_image_url": format!("https://images.example.com/{}.jpg", document_id),
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP,
        "publishedAt": TIMESTAMP,
        "locale": null,
        "category": category,
        "comments": [{
            "id": id * 10,
            "documentId": format!("comment{}", id),
            "content": "Worth the trip",
            "createdAt": TIMESTAMP,
            "updatedAt": TIMESTAMP,
            "publishedAt": TIMESTAMP,
            "locale": null,
            "user": user_json(1, USER_NAME, USER_EMAIL),
        }],
    })
}

/// Drops relations the request did not ask for.
fn shape(article: &Value, with_category: bool, with_comments: bool) -> Value {
    let mut article = article.clone();
    if let Some(object) = article.as_object_mut() {
        if !with_category {
            object.remove("category");
        }
        if !with_comments {
            object.remove("comments");
        }
    }
    article
}

fn eq_ignore_case(value: Option<&Value>, expected: &str) -> bool {
    value
        .and_then(Value::as_str)
        .map(|v| v.to_lowercase() == expected.to_lowercase())
        .unwrap_or(false)
}

impl MockApi {
    fn new() -> Self {
        let beach = category_json(1, "Beach");
        let mountain = category_json(2, "Mountain");
        let mut articles: Vec<Value> = (1..=8)
            .map(|id| {
                let category = if id % 2 == 0 { &mountain } else { &beach };
                article_json(id, &format!("doc{:03}", id), &format!("Article {}", id), category)
            })
            .collect();
        articles.push(article_json(9, "abc123", "Sunrise at Bromo", &mountain));

        Self {
            articles: Mutex::new(articles),
            categories: vec![beach, mountain],
            users: Mutex::new(vec![(
                user_json(1, USER_NAME, USER_EMAIL),
                USER_PASSWORD.to_owned(),
            )]),
            tokens: Mutex::new(HashSet::from([SEEDED_TOKEN.to_owned()])),
            requests: Mutex::new(vec![]),
            delays: Mutex::new(HashMap::new()),
            detail_delays: Mutex::new(HashMap::new()),
            next_id: Mutex::new(100),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn article_count(&self) -> usize {
        self.articles.lock().unwrap().len()
    }

    /// Invalidates every issued token so the next authenticated call gets a 401.
    pub fn revoke_all_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn delay_title(&self, title: &str, millis: u64) {
        self.delays
            .lock()
            .unwrap()
            .insert(title.to_lowercase(), millis);
    }

    /// Delays reads of `document_id`. The article is read before the pause,
    /// so writes made meanwhile are not reflected in the response.
    pub fn delay_document(&self, document_id: &str, millis: u64) {
        self.detail_delays
            .lock()
            .unwrap()
            .insert(document_id.to_owned(), millis);
    }

    fn record(
        &self,
        method: Method,
        path: &str,
        query: &HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_owned(),
            query: query.clone(),
            authorization,
            body,
        });
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        match token {
            Some(token) if self.tokens.lock().unwrap().contains(token) => Ok(()),
            _ => Err(error_body(
                StatusCode::UNAUTHORIZED,
                "UnauthorizedError",
                "Missing or invalid credentials",
            )),
        }
    }

    fn issue_token(&self, user_id: i64) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = TokenClaims {
            id: Some(user_id),
            iat: Some(now.unix_timestamp()),
            exp: Some((now + time::Duration::days(30)).unix_timestamp()),
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"mock-api-secret"),
        )
        .unwrap();
        self.tokens.lock().unwrap().insert(token.clone());
        token
    }

    fn next_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }

    fn category_by_id(&self, id: Option<i64>) -> Value {
        id.and_then(|id| {
            self.categories
                .iter()
                .find(|c| c["id"].as_i64() == Some(id))
                .cloned()
        })
        .unwrap_or(Value::Null)
    }
}

// ----------------- Article Handlers -----------------

async fn list_articles(
    State(api): State<Arc<MockApi>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> JsonResult {
    api.record(Method::GET, "/articles", &query, &headers, None);
    api.authorize(&headers)?;

    let title = query.get("filters[title][$eqi]").cloned();
    let category = query.get("filters[category][name][$eqi]").cloned();
    let delay = title
        .as_ref()
        .and_then(|t| api.delays.lock().unwrap().get(&t.to_lowercase()).copied());
    if let Some(millis) = delay {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    let page: usize = query
        .get("pagination[page]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
        .max(1);
    let page_size: usize = query
        .get("pagination[pageSize]")
        .and_then(|v| v.parse().ok())
        .unwrap_or(25)
        .max(1);
    let everything = query.get("populate").map(String::as_str) == Some("*");
    let with_category = everything || query.contains_key("populate[category]");
    let with_comments = everything || query.contains_key("populate[comments][populate][user]");

    let matched: Vec<Value> = api
        .articles
        .lock()
        .unwrap()
        .iter()
        .filter(|a| title.as_deref().map_or(true, |t| eq_ignore_case(a.get("title"), t)))
        .filter(|a| {
            category
                .as_deref()
                .map_or(true, |c| eq_ignore_case(a["category"].get("name"), c))
        })
        .cloned()
        .collect();

    let total = matched.len();
    let page_count = (total + page_size - 1) / page_size;
    let data: Vec<Value> = matched
        .iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .map(|a| shape(a, with_category, with_comments))
        .collect();

    Ok(Json(json!({
        "data": data,
        "meta": { "pagination": {
            "page": page, "pageSize": page_size, "pageCount": page_count, "total": total
        }}
    })))
}

async fn get_article(
    State(api): State<Arc<MockApi>>,
    Path(document_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> JsonResult {
    api.record(
        Method::GET,
        &format!("/articles/{}", document_id),
        &query,
        &headers,
        None,
    );
    api.authorize(&headers)?;

    let with_category = query.get("populate[category]").map(String::as_str) == Some("true");
    let with_comments = query.get("populate[comments][populate]").map(String::as_str) == Some("user");
    let found = api
        .articles
        .lock()
        .unwrap()
        .iter()
        .find(|a| a["documentId"] == document_id.as_str())
        .map(|article| shape(article, with_category, with_comments));
    let delay = api.detail_delays.lock().unwrap().get(&document_id).copied();
    if let Some(millis) = delay {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
    match found {
        Some(article) => Ok(Json(json!({ "data": article }))),
        None => Err(error_body(StatusCode::NOT_FOUND, "NotFoundError", "Not Found")),
    }
}

fn payload_fields(body: &Value) -> Result<(String, String, String, i64), ApiError> {
    let data = &body["data"];
    let text = |key: &str| data[key].as_str().map(str::to_owned);
    match (
        text("title"),
        text("description"),
        text("cover_image_url"),
        data["category"].as_i64(),
    ) {
        (Some(title), Some(description), Some(cover), Some(category)) => {
            Ok((title, description, cover, category))
        }
        _ => Err(error_body(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "Missing article fields",
        )),
    }
}

async fn create_article(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> JsonResult {
    api.record(Method::POST, "/articles", &HashMap::new(), &headers, Some(body.clone()));
    api.authorize(&headers)?;

    let (title, description, cover, category) = payload_fields(&body)?;
    let id = api.next_id();
    let mut article = article_json(id, &format!("new{}", id), &title, &api.category_by_id(Some(category)));
    article["description"] = json!(description);
    article["cover_image_url"] = json!(cover);
    article["comments"] = json!([]);
    api.articles.lock().unwrap().push(article.clone());
    Ok(Json(json!({ "data": shape(&article, false, false) })))
}

async fn update_article(
    State(api): State<Arc<MockApi>>,
    Path(document_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> JsonResult {
    let path = format!("/articles/{}", document_id);
    api.record(Method::PUT, &path, &HashMap::new(), &headers, Some(body.clone()));
    api.authorize(&headers)?;

    let (title, description, cover, category) = payload_fields(&body)?;
    let category = api.category_by_id(Some(category));
    let mut articles = api.articles.lock().unwrap();
    let article = articles
        .iter_mut()
        .find(|a| a["documentId"] == document_id.as_str())
        .ok_or_else(|| error_body(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"))?;
    article["title"] = json!(title);
    article["description"] = json!(description);
    article["cover_image_url"] = json!(cover);
    article["category"] = category;
    article["updatedAt"] = json!("2024-06-01T08:00:00.000Z");
    Ok(Json(json!({ "data": shape(article, false, false) })))
}

async fn delete_article(
    State(api): State<Arc<MockApi>>,
    Path(document_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let path = format!("/articles/{}", document_id);
    api.record(Method::DELETE, &path, &HashMap::new(), &headers, None);
    api.authorize(&headers)?;

    let mut articles = api.articles.lock().unwrap();
    let before = articles.len();
    articles.retain(|a| a["documentId"] != document_id.as_str());
    if articles.len() == before {
        return Err(error_body(StatusCode::NOT_FOUND, "NotFoundError", "Not Found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ----------------- Category Handlers -----------------

async fn list_categories(State(api): State<Arc<MockApi>>, headers: HeaderMap) -> JsonResult {
    api.record(Method::GET, "/categories", &HashMap::new(), &headers, None);
    api.authorize(&headers)?;
    let total = api.categories.len();
    Ok(Json(json!({
        "data": api.categories,
        "meta": { "pagination": { "page": 1, "pageSize": 25, "pageCount": 1, "total": total } }
    })))
}

// ----------------- Auth Handlers -----------------

async fn login(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> JsonResult {
    api.record(Method::POST, "/auth/local", &HashMap::new(), &headers, Some(body.clone()));
    let identifier = body["identifier"].as_str().unwrap_or_default().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default();

    let user = api
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|(user, stored)| {
            (eq_ignore_case(user.get("email"), &identifier)
                || eq_ignore_case(user.get("username"), &identifier))
                && stored == password
        })
        .map(|(user, _)| user.clone());
    match user {
        Some(user) => {
            let jwt = api.issue_token(user["id"].as_i64().unwrap_or_default());
            Ok(Json(json!({ "jwt": jwt, "user": user })))
        }
        None => Err(error_body(
            StatusCode::BAD_REQUEST,
            "ValidationError",
            "Invalid identifier or password",
        )),
    }
}

async fn register(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> JsonResult {
    api.record(
        Method::POST,
        "/auth/local/register",
        &HashMap::new(),
        &headers,
        Some(body.clone()),
    );
    let username = body["username"].as_str().unwrap_or_default().to_owned();
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    let taken = api.users.lock().unwrap().iter().any(|(user, _)| {
        eq_ignore_case(user.get("email"), &email) || eq_ignore_case(user.get("username"), &username)
    });
    if taken {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "ApplicationError",
            "Email or Username are already taken",
        ));
    }
    let id = api.next_id();
    let user = user_json(id, &username, &email);
    api.users.lock().unwrap().push((user.clone(), password));
    let jwt = api.issue_token(id);
    Ok(Json(json!({ "jwt": jwt, "user": user })))
}

// ----------------- Upload Handler -----------------

async fn upload(
    State(api): State<Arc<MockApi>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> JsonResult {
    api.authorize(&headers)?;
    let mut files = vec![];
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("files") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_owned();
        let mime = field.content_type().map(str::to_owned);
        let bytes = field.bytes().await.unwrap();
        files.push(json!({
            "id": api.next_id(),
            "documentId": format!("file-{}", file_name),
            "name": file_name,
            "url": format!("/uploads/{}", file_name),
            "mime": mime,
            "size": bytes.len() as f64 / 1000.0,
        }));
    }
    api.record(
        Method::POST,
        "/upload",
        &HashMap::new(),
        &headers,
        Some(json!(files)),
    );
    Ok(Json(json!(files)))
}

/// Starts the mock API on a free port and returns it with its base URL.
pub async fn spawn_api() -> (Arc<MockApi>, String) {
    let api = Arc::new(MockApi::new());
    let routes = Router::new()
        .route("/articles", get(list_articles).post(create_article))
        .route(
            "/articles/:document_id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/categories", get(list_categories))
        .route("/auth/local", post(login))
        .route("/auth/local/register", post(register))
        .route("/upload", post(upload));
    let app = Router::new().nest("/api", routes).with_state(api.clone());

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let server = axum::Server::from_tcp(listener)
        .unwrap()
        .serve(app.into_make_service());
    tokio::spawn(server);

    (api, format!("http://{}/api", address))
}

pub struct TestApp {
    pub context: AppContext,
    pub api: Arc<MockApi>,
    pub navigator: Arc<RecordingNavigator>,
    pub credentials: Arc<MemoryCredentialStore>,
}

pub fn seeded_profile() -> UserProfile {
    serde_json::from_value(user_json(1, USER_NAME, USER_EMAIL)).unwrap()
}

/// A client with no stored session.
pub async fn spawn_app() -> TestApp {
    let (api, base_url) = spawn_api().await;
    let navigator = Arc::new(RecordingNavigator::new());
    let credentials = Arc::new(MemoryCredentialStore::new());
    let config = ClientConfig {
        page_size: PAGE_SIZE,
        ..ClientConfig::new(base_url)
    };
    let context = AppContext::new(config, credentials.clone(), navigator.clone()).unwrap();
    TestApp {
        context,
        api,
        navigator,
        credentials,
    }
}

/// A client whose store already holds a valid session.
pub async fn spawn_logged_in_app() -> TestApp {
    let app = spawn_app().await;
    session::persist_session(app.credentials.as_ref(), SEEDED_TOKEN, &seeded_profile())
        .await
        .unwrap();
    app
}

impl TestApp {
    pub async fn stored_token(&self) -> Option<String> {
        session::load_token(self.credentials.as_ref()).await.unwrap()
    }
}

/// A JWT that expired an hour ago.
pub fn expired_token() -> String {
    let now = OffsetDateTime::now_utc();
    let claims = TokenClaims {
        id: Some(1),
        iat: Some((now - time::Duration::days(31)).unix_timestamp()),
        exp: Some((now - time::Duration::hours(1)).unix_timestamp()),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"mock-api-secret"),
    )
    .unwrap()
}

/// Credential storage that pauses before every read, widening the window
/// between an action starting and its session check completing.
pub struct SlowCredentialStore {
    inner: MemoryCredentialStore,
    delay: Duration,
}

#[async_trait]
impl CredentialStore for SlowCredentialStore {
    async fn get_item(&self, key: &str) -> ApiResult<Option<String>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> ApiResult<()> {
        self.inner.set_item(key, value).await
    }

    async fn remove_item(&self, key: &str) -> ApiResult<()> {
        self.inner.remove_item(key).await
    }
}

/// A logged-in client whose session reads each take `delay`.
pub async fn spawn_app_with_slow_session(delay: Duration) -> (AppContext, Arc<MockApi>) {
    let (api, base_url) = spawn_api().await;
    let inner = MemoryCredentialStore::new();
    session::persist_session(&inner, SEEDED_TOKEN, &seeded_profile())
        .await
        .unwrap();
    let credentials = Arc::new(SlowCredentialStore { inner, delay });
    let config = ClientConfig {
        page_size: PAGE_SIZE,
        ..ClientConfig::new(base_url)
    };
    let context =
        AppContext::new(config, credentials, Arc::new(RecordingNavigator::new())).unwrap();
    (context, api)
}
