//! Async API client for the Lema users/posts backend.
//!
//! # Overview
//! `ApiGateway` exposes one async function per endpoint:
//!
//! | Operation | Request |
//! |---|---|
//! | `create_user` | `POST /users` |
//! | `get_users` | `GET /users?pageNumber=<page>&pageSize=4` |
//! | `get_user_posts` | `GET /posts?user_id=<id>` |
//! | `create_post` | `POST /posts` |
//! | `delete_post` | `DELETE /posts/<id>` |
//!
//! # Design
//! - `ApiClient` is stateless and does no I/O: each operation is split into
//!   `build_*` (produces an `HttpRequest`) and `parse_*` (consumes an
//!   `HttpResponse`), so the request/response mapping is testable without a
//!   server.
//! - `ApiGateway` pairs an `ApiClient` with a `reqwest::Client` and runs the
//!   round-trip. It is immutable after construction.
//! - Responses are decoded through declared schemas in `types`; a body that
//!   does not match fails with `ApiError::Deserialization`.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod types;

pub use client::{ApiClient, PAGE_SIZE};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind};
pub use gateway::ApiGateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Address, NewAddress, NewPost, NewUser, Pagination, Post, User, UserPage};
