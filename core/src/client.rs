//! Blocking client for the task service REST API.
//!
//! # Design
//! `TaskClient` holds the base URL and a `Transport`; it carries no mutable
//! state between calls. Every operation follows the same steps: check
//! arguments, build an `HttpRequest`, send it, drain the body, compare the
//! status with the one the operation expects, decode the envelope.
//!
//! A status mismatch is always fatal. The body is still decoded best-effort
//! so an error envelope sent with a 4xx/5xx ends up in
//! `ApiError::UnexpectedStatus::service_error`. On the expected status the
//! envelope is returned as-is, including any embedded `error`: callers must
//! inspect both the `Result` and `ServiceResponse::service_error`.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport, UreqTransport, DEFAULT_TIMEOUT};
use crate::types::{JsonCodec, ServiceResponse, TaskRequest};

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;

/// The four task operations, as seen by the provider layer.
pub trait TaskService {
    /// `POST /tasks`, expects 201 and `{taskId}`.
    fn create_task(&self, request: Option<TaskRequest>) -> Result<ServiceResponse, ApiError>;

    /// `PUT /tasks/{id}`, expects 200 and `{taskId}`.
    fn update_task(&self, task_id: Option<i64>, request: Option<TaskRequest>) -> Result<ServiceResponse, ApiError>;

    /// `GET /tasks/{id}`, expects 200 and `{task}`.
    fn get_task(&self, task_id: Option<i64>) -> Result<ServiceResponse, ApiError>;

    /// `DELETE /tasks/{id}`, expects 200.
    fn delete_task(&self, task_id: Option<i64>) -> Result<ServiceResponse, ApiError>;
}

/// Connection settings for `TaskClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the task service, generic over its transport.
#[derive(Debug, Clone)]
pub struct TaskClient<T> {
    base_url: String,
    transport: T,
}

impl TaskClient<UreqTransport> {
    /// Client that talks HTTP through `ureq`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(&config.base_url, UreqTransport::new(config.timeout))
    }
}

impl<T: Transport> TaskClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, task_id: i64) -> String {
        format!("{}/tasks/{task_id}", self.base_url)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        url: String,
        payload: Option<&TaskRequest>,
    ) -> Result<HttpRequest, ApiError> {
        let body = payload.map(|p| p.to_json()).transpose()?;
        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body,
        })
    }

    /// Send, drain, check status, decode.
    fn execute(
        &self,
        operation: &'static str,
        request: HttpRequest,
        expected: u16,
    ) -> Result<ServiceResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request to Task Service");

        let response = self.transport.send(&request).inspect_err(|e| {
            warn!(operation, error = %e, "send failed");
        })?;
        let status = response.status;
        let body = self.transport.read_body(response.body).inspect_err(|e| {
            warn!(operation, status, error = %e, "reading response body failed");
        })?;

        if status != expected {
            let text = String::from_utf8_lossy(&body).into_owned();
            let service_error = ServiceResponse::from_json(&body).ok().and_then(|r| r.error);
            let err = ApiError::UnexpectedStatus {
                operation,
                status,
                body: text,
                service_error,
            };
            warn!(operation, status, "{err}");
            return Err(err);
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ServiceResponse::default());
        }
        ServiceResponse::from_json(&body).inspect_err(|e| {
            warn!(operation, status, error = %e, "failed to decode response envelope");
        })
    }
}

fn require_id(task_id: Option<i64>) -> Result<i64, ApiError> {
    task_id.ok_or_else(|| ApiError::InvalidArgument("Invalid task id passed".to_string()))
}

fn require_request(request: Option<TaskRequest>) -> Result<TaskRequest, ApiError> {
    request.ok_or_else(|| ApiError::InvalidArgument("Invalid task request passed".to_string()))
}

impl<T: Transport> TaskService for TaskClient<T> {
    fn create_task(&self, request: Option<TaskRequest>) -> Result<ServiceResponse, ApiError> {
        let payload = require_request(request)?;
        let req = self.build_request(HttpMethod::Post, self.tasks_url(), Some(&payload))?;
        self.execute("Create", req, STATUS_CREATED)
    }

    fn update_task(&self, task_id: Option<i64>, request: Option<TaskRequest>) -> Result<ServiceResponse, ApiError> {
        let task_id = require_id(task_id)?;
        let payload = require_request(request)?;
        let req = self.build_request(HttpMethod::Put, self.task_url(task_id), Some(&payload))?;
        self.execute("Update", req, STATUS_OK)
    }

    fn get_task(&self, task_id: Option<i64>) -> Result<ServiceResponse, ApiError> {
        let task_id = require_id(task_id)?;
        let req = self.build_request(HttpMethod::Get, self.task_url(task_id), None)?;
        self.execute("Get", req, STATUS_OK)
    }

    fn delete_task(&self, task_id: Option<i64>) -> Result<ServiceResponse, ApiError> {
        let task_id = require_id(task_id)?;
        let req = self.build_request(HttpMethod::Delete, self.task_url(task_id), None)?;
        self.execute("Delete", req, STATUS_OK)
    }
}
