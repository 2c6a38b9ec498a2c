//! Blocking API client core for the task service.
//!
//! # Overview
//! Wraps the four task endpoints (`POST /tasks`, `GET`/`PUT`/`DELETE
//! /tasks/{id}`) behind `TaskClient`, which speaks JSON through a pluggable
//! `Transport`. The production transport is `UreqTransport`; tests plug in
//! doubles that return canned responses.
//!
//! # Design
//! - `TaskClient` is stateless apart from `base_url` and its transport.
//! - Status codes are checked per operation; a mismatch is fatal.
//! - Application errors embedded in a 2xx envelope are returned inside
//!   `ServiceResponse`, never raised.
//! - `TaskService` is the seam the provider layer programs against.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::{ClientConfig, TaskClient, TaskService};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, RawResponse, ResponseBody, Transport, UreqTransport, DEFAULT_TIMEOUT};
pub use types::{JsonCodec, ServiceError, ServiceResponse, Task, TaskRequest};
