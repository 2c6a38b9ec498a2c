//! Create/read/update/delete for the task resource, plus the data source read.
//!
//! # Design
//! Every operation takes the resource's generic `ResourceData` and a
//! `TaskService`, and returns the diagnostics it collected instead of an
//! error. Each one stops at its first failure. Create and update only get a
//! task id back from the service, so both finish with a read to refresh the
//! stored item.

use chrono::Utc;
use serde_json::Value;
use taskserv_core::{JsonCodec, ServiceError, TaskService};
use tracing::{debug, info, warn};

use crate::convert::{expand_task_request, flatten_task};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::resource_data::ResourceData;

const NO_TASKS: &str = "Invalid Argument - No tasks found";
const BAD_ID: &str = "Failed to get Id from resource data";
const BAD_REQUEST: &str = "Failed to make Task Service Request";
const SET_FAILED: &str = "Failed to set task into resource data";

fn no_tasks() -> Diagnostic {
    Diagnostic::error(NO_TASKS, "No Items found in incoming Resource data")
}

/// The service error rendered as compact JSON, for diagnostic details.
fn service_error_detail(err: &ServiceError) -> String {
    err.to_json().unwrap_or_else(|e| e.to_string())
}

fn parse_id(rd: &ResourceData) -> Result<i64, Diagnostic> {
    rd.id()
        .parse::<i64>()
        .map_err(|e| Diagnostic::error(BAD_ID, format!("invalid id '{}': {e}", rd.id())))
}

/// Stateless bridge between resource data and the task service.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskOperation;

impl TaskOperation {
    pub fn new() -> Self {
        Self
    }

    pub fn create<S: TaskService + ?Sized>(&self, rd: &mut ResourceData, client: &S) -> Diagnostics {
        let Some(item) = rd.items().into_iter().next() else {
            return vec![no_tasks()];
        };
        let request = match expand_task_request(&item) {
            Ok(request) => request,
            Err(e) => return vec![Diagnostic::error(BAD_REQUEST, e.to_string())],
        };

        let response = match client.create_task(Some(request)) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "create task failed");
                return vec![Diagnostic::error("Failed to create task", e.to_string())];
            }
        };
        if let Some(err) = response.service_error() {
            return vec![Diagnostic::error("Failed to create task", service_error_detail(err))];
        }
        let Some(task_id) = response.task_id else {
            return vec![Diagnostic::error(
                "Failed to create task",
                "Task Service response did not contain a taskId",
            )];
        };

        info!(task_id, "task created");
        rd.set_id(task_id.to_string());
        self.read(rd, client)
    }

    pub fn update<S: TaskService + ?Sized>(&self, rd: &mut ResourceData, client: &S) -> Diagnostics {
        let task_id = match parse_id(rd) {
            Ok(id) => id,
            Err(diag) => return vec![diag],
        };
        let Some(item) = rd.items().into_iter().next() else {
            return vec![no_tasks()];
        };
        let request = match expand_task_request(&item) {
            Ok(request) => request,
            Err(e) => return vec![Diagnostic::error(BAD_REQUEST, e.to_string())],
        };

        let response = match client.update_task(Some(task_id), Some(request)) {
            Ok(response) => response,
            Err(e) => {
                warn!(task_id, error = %e, "update task failed");
                return vec![Diagnostic::error("Failed to update task", e.to_string())];
            }
        };
        if let Some(err) = response.service_error() {
            return vec![Diagnostic::error("Failed to update task", service_error_detail(err))];
        }

        let task_id = response.task_id.unwrap_or(task_id);
        info!(task_id, "task updated");
        rd.set_id(task_id.to_string());
        if let Err(e) = rd.set("last_updated", Value::String(Utc::now().to_rfc2822())) {
            return vec![Diagnostic::error(SET_FAILED, e.to_string())];
        }
        self.read(rd, client)
    }

    pub fn read<S: TaskService + ?Sized>(&self, rd: &mut ResourceData, client: &S) -> Diagnostics {
        let task_id = match parse_id(rd) {
            Ok(id) => id,
            Err(diag) => return vec![diag],
        };

        let response = match client.get_task(Some(task_id)) {
            Ok(response) => response,
            Err(e) => {
                warn!(task_id, error = %e, "read task failed");
                return vec![Diagnostic::error("Failed to read task", e.to_string())];
            }
        };
        if let Some(err) = response.service_error() {
            return vec![Diagnostic::error("Failed to read task", service_error_detail(err))];
        }

        let items = match flatten_task(response.task.as_ref()) {
            Ok(items) => items,
            Err(diag) => return vec![diag],
        };
        debug!(task_id, "task read");
        match rd.set("items", Value::Array(items)) {
            Ok(()) => Diagnostics::new(),
            Err(e) => vec![Diagnostic::error(SET_FAILED, e.to_string())],
        }
    }

    pub fn delete<S: TaskService + ?Sized>(&self, rd: &mut ResourceData, client: &S) -> Diagnostics {
        let task_id = match parse_id(rd) {
            Ok(id) => id,
            Err(diag) => return vec![diag],
        };

        let response = match client.delete_task(Some(task_id)) {
            Ok(response) => response,
            Err(e) => {
                warn!(task_id, error = %e, "delete task failed");
                return vec![Diagnostic::error("Failed to delete task", e.to_string())];
            }
        };
        if let Some(err) = response.service_error() {
            return vec![Diagnostic::error("Failed to delete task", service_error_detail(err))];
        }

        info!(task_id, "task deleted");
        rd.set_id("");
        Diagnostics::new()
    }

    /// Data source lookup: take the required `id` attribute, then read.
    pub fn read_data_source<S: TaskService + ?Sized>(&self, rd: &mut ResourceData, client: &S) -> Diagnostics {
        let Some(task_id) = rd.get("id").and_then(Value::as_i64) else {
            return vec![Diagnostic::error(
                "Failed to get Id from data source",
                "Attribute 'id' must be an integer",
            )];
        };
        rd.set_id(task_id.to_string());
        self.read(rd, client)
    }
}
