use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{
    net::TcpListener,
    sync::{Mutex, RwLock},
};
use uuid::Uuid;

const DEFAULT_PAGE_NUMBER: u64 = 1;
const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub address: AddressInput,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub address_id: String,
    pub address: AddressInput,
}

#[derive(Clone, Debug)]
pub struct PostRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
}

/// A request as it reached the server, before routing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct Store {
    users: Vec<UserRecord>,
    posts: Vec<PostRecord>,
}

/// Shared server state. Cloning shares the same store and request log, so a
/// test can keep a handle while the server runs.
#[derive(Clone, Default)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request received so far, in arrival order.
    pub async fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn clear_recorded(&self) {
        self.requests.lock().await.clear();
    }

    pub async fn user_count(&self) -> usize {
        self.store.read().await.users.len()
    }

    pub async fn post_count(&self) -> usize {
        self.store.read().await.posts.len()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::new())
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", delete(delete_post))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::new()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn success(body: Value) -> Response {
    (StatusCode::OK, Json(json!({ "message": "successful", "body": body }))).into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "body": null }))).into_response()
}

fn render_user(user: &UserRecord) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "fullName": user.full_name,
        "address": {
            "id": user.address_id,
            "street": user.address.street,
            "city": user.address.city,
            "state": user.address.state,
            "zipCode": user.address.zipcode,
        },
    })
}

fn render_post(post: &PostRecord) -> Value {
    json!({ "id": post.id, "title": post.title, "body": post.body })
}

async fn record(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "unreadable request body"),
    };
    tracing::debug!(method = %parts.method, uri = %parts.uri, "request");
    state.requests.lock().await.push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

async fn create_user(State(state): State<AppState>, Json(input): Json<CreateUser>) -> Response {
    let mut store = state.store.write().await;
    if store.users.iter().any(|u| u.email == input.email) {
        tracing::warn!(email = %input.email, "duplicate email");
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "A user with this email already exists",
        );
    }
    let user = UserRecord {
        id: Uuid::new_v4().to_string(),
        full_name: input.full_name,
        email: input.email,
        address_id: Uuid::new_v4().to_string(),
        address: input.address,
    };
    let rendered = render_user(&user);
    store.users.push(user);
    success(rendered)
}

/// Raw pagination parameters; parsed by hand so a non-numeric value yields
/// the backend's own message rather than the extractor's.
#[derive(Deserialize)]
struct PageParams {
    #[serde(rename = "pageNumber")]
    page_number: Option<String>,
    #[serde(rename = "pageSize")]
    page_size: Option<String>,
}

fn parse_param(raw: Option<&str>, default: u64, message: &str) -> Result<u64, Response> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| failure(StatusCode::BAD_REQUEST, message)),
    }
}

async fn list_users(State(state): State<AppState>, Query(params): Query<PageParams>) -> Response {
    let page = match parse_param(
        params.page_number.as_deref(),
        DEFAULT_PAGE_NUMBER,
        "page number must be a number",
    ) {
        Ok(page) => page.max(1),
        Err(response) => return response,
    };
    let per_page = match parse_param(
        params.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        "page size must be a number",
    ) {
        Ok(size) => size,
        Err(response) => return response,
    };

    let store = state.store.read().await;
    let skip = usize::try_from((page - 1).saturating_mul(per_page)).unwrap_or(usize::MAX);
    let take = usize::try_from(per_page).unwrap_or(usize::MAX);
    let users: Vec<Value> = store.users.iter().skip(skip).take(take).map(render_user).collect();

    success(json!({
        "users": users,
        "pagination": {
            "current_page": page,
            "per_page": per_page,
            "total_rows": store.users.len(),
        },
    }))
}

#[derive(Deserialize)]
struct PostFilter {
    user_id: Option<String>,
}

async fn list_posts(State(state): State<AppState>, Query(filter): Query<PostFilter>) -> Response {
    let Some(user_id) = filter.user_id.filter(|id| !id.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "user_id is required");
    };
    let store = state.store.read().await;
    let posts: Vec<Value> = store
        .posts
        .iter()
        .filter(|p| p.user_id == user_id)
        .map(render_post)
        .collect();
    success(Value::Array(posts))
}

async fn create_post(State(state): State<AppState>, Json(input): Json<CreatePost>) -> Response {
    let mut store = state.store.write().await;
    if !store.users.iter().any(|u| u.id == input.user_id) {
        return failure(StatusCode::BAD_REQUEST, "Invalid User ID");
    }
    let post = PostRecord {
        id: Uuid::new_v4().to_string(),
        user_id: input.user_id,
        title: input.title,
        body: input.body,
    };
    let rendered = render_post(&post);
    store.posts.push(post);
    success(rendered)
}

async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut store = state.store.write().await;
    let before = store.posts.len();
    store.posts.retain(|p| p.id != id);
    if store.posts.len() == before {
        return failure(StatusCode::NOT_FOUND, "post not found");
    }
    (StatusCode::OK, Json(json!({ "message": "successful" }))).into_response()
}
