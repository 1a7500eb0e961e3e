//! Stateless HTTP request builder and response parser for the users/posts API.
//!
//! # Design
//! `ApiClient` holds only the base URL and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip.

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Envelope, NewPost, NewUser, Post, User, UserPage};

/// Number of users requested per page by `build_get_users`. Part of the
/// contract with the frontend, not a caller option.
pub const PAGE_SIZE: u64 = 4;

const JSON: &str = "application/json";

/// Synchronous, stateless client for the users/posts API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url().clone(),
        }
    }

    pub fn build_create_user(&self, user: &NewUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, self.endpoint(&["users"]), user)
    }

    pub fn build_get_users(&self, page: u64) -> HttpRequest {
        let mut url = self.endpoint(&["users"]);
        url.query_pairs_mut()
            .append_pair("pageNumber", &page.to_string())
            .append_pair("pageSize", &PAGE_SIZE.to_string());
        self.request(HttpMethod::Get, url)
    }

    pub fn build_get_user_posts(&self, user_id: &str) -> HttpRequest {
        let mut url = self.endpoint(&["posts"]);
        url.query_pairs_mut().append_pair("user_id", user_id);
        self.request(HttpMethod::Get, url)
    }

    pub fn build_create_post(&self, post: &NewPost) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, self.endpoint(&["posts"]), post)
    }

    /// Fails with `ApiError::InvalidId` for `""`, `"."` and `".."`: URL
    /// normalisation would collapse those (even percent-encoded) onto the
    /// collection itself.
    pub fn build_delete_post(&self, id: &str) -> Result<HttpRequest, ApiError> {
        if matches!(id, "" | "." | "..") {
            return Err(ApiError::InvalidId(id.to_string()));
        }
        Ok(self.request(HttpMethod::Delete, self.endpoint(&["posts", id])))
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        decode_body(response)
    }

    pub fn parse_get_users(&self, response: HttpResponse) -> Result<UserPage, ApiError> {
        decode_body(response)
    }

    pub fn parse_get_user_posts(&self, response: HttpResponse) -> Result<Vec<Post>, ApiError> {
        decode_body(response)
    }

    pub fn parse_create_post(&self, response: HttpResponse) -> Result<Post, ApiError> {
        decode_body(response)
    }

    pub fn parse_delete_post(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(response).map(|_| ())
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // ClientConfig rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: HttpMethod, url: Url) -> HttpRequest {
        HttpRequest {
            method,
            url: url.into(),
            headers: vec![("accept".to_string(), JSON.to_string())],
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        url: Url,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(ApiError::Serialization)?;
        let mut request = self.request(method, url);
        request
            .headers
            .push(("content-type".to_string(), JSON.to_string()));
        request.body = Some(body);
        Ok(request)
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        return Ok(response);
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            body: response.body,
        });
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body,
    })
}

fn decode_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let response = check_status(response)?;
    let envelope: Envelope<T> =
        serde_json::from_str(&response.body).map_err(ApiError::Deserialization)?;
    Ok(envelope.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewAddress;

    fn client() -> ApiClient {
        ApiClient::new(&ClientConfig::new("http://localhost:3000").unwrap())
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn status(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn new_user() -> NewUser {
        NewUser {
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            address: NewAddress {
                street: "Street".to_string(),
                city: "City".to_string(),
                state: "State".to_string(),
                zipcode: "ZipCode".to_string(),
            },
        }
    }

    #[test]
    fn build_create_user_produces_correct_request() {
        let req = client().build_create_user(&new_user()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/users");
        assert!(req
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["full_name"], "Test User");
        assert_eq!(body["email"], "test@example.com");
        assert_eq!(body["address"]["zipcode"], "ZipCode");
    }

    #[test]
    fn build_get_users_uses_fixed_page_size() {
        let req = client().build_get_users(2);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/users?pageNumber=2&pageSize=4");
        assert!(req.body.is_none());
        assert_eq!(
            req.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn build_get_users_page_size_never_varies() {
        for page in [0, 1, 7, u64::MAX] {
            let req = client().build_get_users(page);
            assert!(req.url.ends_with(&format!("pageNumber={page}&pageSize=4")));
        }
    }

    #[test]
    fn build_get_user_posts_filters_by_user() {
        let req = client().build_get_user_posts("05c-90df");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/posts?user_id=05c-90df");
    }

    #[test]
    fn build_get_user_posts_encodes_query_value() {
        let req = client().build_get_user_posts("a&b=c");
        assert_eq!(req.url, "http://localhost:3000/posts?user_id=a%26b%3Dc");
    }

    #[test]
    fn build_create_post_produces_correct_request() {
        let post = NewPost {
            title: "Test Post".to_string(),
            body: "Test Body".to_string(),
            user_id: "user123".to_string(),
        };
        let req = client().build_create_post(&post).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/posts");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"title": "Test Post", "body": "Test Body", "user_id": "user123"})
        );
    }

    #[test]
    fn build_delete_post_targets_resource() {
        let req = client().build_delete_post("42").unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:3000/posts/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_delete_post_encodes_path_segment() {
        let req = client().build_delete_post("a/b c").unwrap();
        assert_eq!(req.url, "http://localhost:3000/posts/a%2Fb%20c");
    }

    #[test]
    fn build_delete_post_rejects_dot_and_empty_ids() {
        for id in ["", ".", ".."] {
            let err = client().build_delete_post(id).unwrap_err();
            assert!(matches!(err, ApiError::InvalidId(ref bad) if bad == id), "id {id:?}");
        }
    }

    #[test]
    fn build_delete_post_keeps_ids_containing_dots() {
        for (id, url) in [
            ("...", "http://localhost:3000/posts/..."),
            ("v1.2", "http://localhost:3000/posts/v1.2"),
            ("../x", "http://localhost:3000/posts/..%2Fx"),
        ] {
            assert_eq!(client().build_delete_post(id).unwrap().url, url);
        }
    }

    #[test]
    fn trailing_slash_is_ignored() {
        let client = ApiClient::new(&ClientConfig::new("http://localhost:3000/").unwrap());
        assert_eq!(
            client.build_delete_post("1").unwrap().url,
            "http://localhost:3000/posts/1"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = ApiClient::new(&ClientConfig::new("http://example.com/api/v1/").unwrap());
        assert_eq!(
            client.build_get_users(1).url,
            "http://example.com/api/v1/users?pageNumber=1&pageSize=4"
        );
    }

    #[test]
    fn parse_create_user_unwraps_envelope() {
        let user = client()
            .parse_create_user(ok(
                r#"{"message":"successful","body":{"id":"u1","email":"test@example.com","fullName":"Test User","address":{"id":"a1","street":"Street","city":"City","state":"State","zipCode":"ZipCode"}}}"#,
            ))
            .unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.full_name, "Test User");
        assert_eq!(user.address.unwrap().zipcode, "ZipCode");
    }

    #[test]
    fn parse_create_user_duplicate_email() {
        let err = client()
            .parse_create_user(status(
                500,
                r#"{"message":"A user with this email already exists","body":null}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500, .. }));
        assert_eq!(
            err.server_message().as_deref(),
            Some("A user with this email already exists")
        );
    }

    #[test]
    fn parse_get_users_success() {
        let page = client()
            .parse_get_users(ok(
                r#"{"message":"successful","body":{"users":[{"id":"u1","fullName":"A","email":"a@x"}],"pagination":{"current_page":2,"per_page":4,"total_rows":5}}}"#,
            ))
            .unwrap();
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_pages(), 2);
    }

    #[test]
    fn parse_get_user_posts_success() {
        let posts = client()
            .parse_get_user_posts(ok(
                r#"{"message":"successful","body":[{"id":"p1","title":"First Post","body":"First post content"}]}"#,
            ))
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "First Post");
    }

    #[test]
    fn parse_get_user_posts_rejects_wrong_shape() {
        let err = client()
            .parse_get_user_posts(ok(r#"{"message":"successful","body":{"posts":[]}}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_create_post_invalid_user() {
        let err = client()
            .parse_create_post(status(400, r#"{"message":"Invalid User ID","body":null}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 400, .. }));
    }

    #[test]
    fn parse_delete_post_accepts_any_2xx() {
        for code in [200, 202, 204] {
            assert!(client().parse_delete_post(status(code, "")).is_ok());
        }
    }

    #[test]
    fn parse_delete_post_not_found() {
        let err = client()
            .parse_delete_post(status(404, r#"{"message":"post not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.server_message().as_deref(), Some("post not found"));
    }

    #[test]
    fn parse_bad_json_is_deserialization_error() {
        let err = client().parse_create_post(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
