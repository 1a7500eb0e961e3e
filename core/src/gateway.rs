//! Async gateway: executes `ApiClient` requests over `reqwest`.
//!
//! `ApiGateway` is built once at startup and shared by reference (or cloned;
//! clones share the connection pool). Every operation issues exactly one
//! request and surfaces failures unchanged.

use reqwest::Method;
use tracing::{debug, instrument, warn};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{NewPost, NewUser, Post, User, UserPage};

/// Typed async client for the users/posts API.
#[derive(Debug, Clone)]
pub struct ApiGateway {
    http: reqwest::Client,
    api: ApiClient,
}

impl ApiGateway {
    /// Create a gateway with a default `reqwest::Client`. No timeout is set
    /// beyond the transport's own default.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a gateway around an existing `reqwest::Client`, e.g. one with
    /// custom TLS or proxy settings.
    pub fn with_http_client(config: &ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api: ApiClient::new(config),
        }
    }

    /// The underlying request builder, for hosts that execute requests
    /// themselves.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let request = self.api.build_create_user(user)?;
        let response = self.execute(request).await?;
        self.api.parse_create_user(response)
    }

    #[instrument(skip(self))]
    pub async fn get_users(&self, page: u64) -> Result<UserPage, ApiError> {
        let response = self.execute(self.api.build_get_users(page)).await?;
        self.api.parse_get_users(response)
    }

    #[instrument(skip(self))]
    pub async fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>, ApiError> {
        let response = self.execute(self.api.build_get_user_posts(user_id)).await?;
        self.api.parse_get_user_posts(response)
    }

    #[instrument(skip(self, post), fields(user_id = %post.user_id))]
    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        let request = self.api.build_create_post(post)?;
        let response = self.execute(request).await?;
        self.api.parse_create_post(response)
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        let request = self.api.build_delete_post(id)?;
        let response = self.execute(request).await?;
        self.api.parse_delete_post(response)
    }

    /// Perform one HTTP round-trip. Non-2xx statuses come back as data; only
    /// failing to obtain a response is an error here.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.http.request(to_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(error = %err, url = %request.url, "request failed");
            ApiError::Transport(err)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|source| {
            warn!(status, error = %source, "reading response body failed");
            ApiError::BodyRead { status, source }
        })?;
        let response = HttpResponse {
            status,
            headers,
            body,
        };

        if response.is_success() {
            debug!(status, "received response");
        } else {
            warn!(
                status,
                body_len = response.body.len(),
                body = %truncate(&response.body, LOGGED_BODY_LIMIT),
                "server rejected request"
            );
        }
        Ok(response)
    }
}

/// Longest slice of an error body written to the log, in bytes.
const LOGGED_BODY_LIMIT: usize = 256;

/// `body` cut to at most `limit` bytes on a char boundary.
fn truncate(body: &str, limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Delete => Method::DELETE,
    }
}
