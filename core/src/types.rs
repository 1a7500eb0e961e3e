//! Request payloads and response records for the users/posts API.
//!
//! # Design
//! Payloads serialize with exactly the keys the backend binds
//! (`full_name`, `zipcode`, `user_id`). Response records are declared
//! separately because the backend renders users with camelCase keys
//! (`fullName`, `zipCode`); the snake_case spellings are accepted as aliases
//! so either rendering decodes.

use serde::{Deserialize, Serialize};

/// Postal address sent as part of a `NewUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// Request payload for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub address: NewAddress,
}

/// Request payload for `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: String,
}

/// A stored address as rendered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(rename = "zipCode", alias = "zipcode")]
    pub zipcode: String,
}

/// A user as rendered by the server, including server-assigned fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(rename = "fullName", alias = "full_name")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<Address>,
}

/// A post as rendered by the server.
///
/// The backend does not echo `user_id` back, so it is optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Pagination metadata attached to a page of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u64,
    pub per_page: u64,
    pub total_rows: u64,
}

impl Pagination {
    /// Number of pages needed to hold `total_rows` at `per_page` rows each.
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total_rows.div_ceil(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }
}

/// Response body of `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// Wrapper the backend puts around every response body. The `message`
/// field is only read back out of error bodies (see `ApiError::server_message`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    #[serde(alias = "data")]
    pub body: T,
}
