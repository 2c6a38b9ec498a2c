//! Conversion between generic `items` entries and typed task payloads.
//!
//! `expand_task_request` turns one configured item into a `TaskRequest` with
//! explicit type checks. `flatten_task` goes the other way, turning a `Task`
//! from the service into the single-element list the resource stores, with
//! epoch-millisecond timestamps rendered as UTC calendar dates.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use taskserv_core::{ApiError, Task, TaskRequest};

use crate::diagnostics::Diagnostic;

/// Calendar-date format used for every date field in resource data.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn invalid(key: &str, expected: &str) -> ApiError {
    ApiError::InvalidArgument(format!("'{key}' must be {expected}"))
}

/// Optional string; `null` and `""` mean unset.
fn opt_string(item: &Map<String, Value>, key: &str) -> Result<Option<String>, ApiError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(key, "a string")),
    }
}

fn opt_int(item: &Map<String, Value>, key: &str) -> Result<Option<i32>, ApiError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(key, "a 32-bit integer")),
    }
}

fn opt_bool(item: &Map<String, Value>, key: &str) -> Result<Option<bool>, ApiError> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(invalid(key, "a boolean")),
    }
}

/// Build the create/update payload from one `items` entry.
pub fn expand_task_request(item: &Map<String, Value>) -> Result<TaskRequest, ApiError> {
    let title = opt_string(item, "title")?
        .ok_or_else(|| ApiError::InvalidArgument("'title' is required".to_string()))?;
    Ok(TaskRequest {
        title: Some(title),
        description: opt_string(item, "description")?,
        priority: opt_int(item, "priority")?,
        completed: opt_bool(item, "completed")?,
        start_date: opt_string(item, "start_date")?,
        due_date: opt_string(item, "due_date")?,
    })
}

/// Epoch milliseconds as a `YYYY-MM-DD` string, or `null` when absent.
pub fn format_date(millis: Option<i64>) -> Value {
    millis
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| Value::String(t.format(DATE_FORMAT).to_string()))
        .unwrap_or(Value::Null)
}

/// Flatten a task into the single-element `items` list.
pub fn flatten_task(task: Option<&Task>) -> Result<Vec<Value>, Diagnostic> {
    let task = task.ok_or_else(|| Diagnostic::error("Invalid Argument", "Invalid Task instance passed"))?;
    Ok(vec![json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "priority": task.priority,
        "completed": task.completed,
        "start_date": format_date(task.start_date),
        "due_date": format_date(task.due_date),
        "time_updated": format_date(task.time_updated),
        "time_created": format_date(task.time_created),
    })])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn expands_every_field() {
        let req = expand_task_request(&item(json!({
            "title": "Task from terraform",
            "description": "Task description",
            "priority": 1,
            "completed": false,
            "start_date": "2023-02-10",
            "due_date": "2023-02-20",
            "time_created": "ignored"
        })))
        .unwrap();
        assert_eq!(
            req,
            TaskRequest {
                title: Some("Task from terraform".to_string()),
                description: Some("Task description".to_string()),
                priority: Some(1),
                completed: Some(false),
                start_date: Some("2023-02-10".to_string()),
                due_date: Some("2023-02-20".to_string()),
            }
        );
    }

    #[test]
    fn unset_values_are_omitted() {
        let req = expand_task_request(&item(json!({"title": "t", "description": "", "priority": null}))).unwrap();
        assert!(req.description.is_none());
        assert!(req.priority.is_none());
        assert!(req.start_date.is_none());
    }

    #[test]
    fn title_is_required() {
        let err = expand_task_request(&item(json!({"priority": 2}))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn wrong_types_are_rejected() {
        for bad in [
            json!({"title": 3}),
            json!({"title": "t", "priority": "high"}),
            json!({"title": "t", "priority": 5_000_000_000_i64}),
            json!({"title": "t", "completed": "yes"}),
            json!({"title": "t", "due_date": 20230220}),
        ] {
            let err = expand_task_request(&item(bad.clone())).unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn dates_render_as_utc_calendar_days() {
        assert_eq!(format_date(Some(1_675_987_200_000)), json!("2023-02-10"));
        assert_eq!(format_date(Some(1_676_800_000_000)), json!("2023-02-19"));
        assert_eq!(format_date(Some(0)), json!("1970-01-01"));
        assert_eq!(format_date(None), Value::Null);
    }

    #[test]
    fn flatten_produces_one_snake_case_item() {
        let task = Task {
            id: Some(1001),
            title: Some("Test Task 1".to_string()),
            description: Some("Test Task 1 Desc".to_string()),
            priority: Some(5),
            completed: Some(true),
            start_date: Some(1_675_987_200_000),
            due_date: Some(1_676_851_200_000),
            time_updated: Some(1_676_073_600_000),
            time_created: Some(1_675_987_200_000),
        };
        let items = flatten_task(Some(&task)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0],
            json!({
                "id": 1001,
                "title": "Test Task 1",
                "description": "Test Task 1 Desc",
                "priority": 5,
                "completed": true,
                "start_date": "2023-02-10",
                "due_date": "2023-02-20",
                "time_updated": "2023-02-11",
                "time_created": "2023-02-10"
            })
        );
    }

    #[test]
    fn flatten_keeps_missing_fields_as_null() {
        let task = Task {
            id: Some(2),
            title: Some("Sparse".to_string()),
            ..Default::default()
        };
        let items = flatten_task(Some(&task)).unwrap();
        assert_eq!(items[0]["start_date"], Value::Null);
        assert_eq!(items[0]["priority"], Value::Null);
    }

    #[test]
    fn flatten_without_task_is_a_diagnostic() {
        let diag = flatten_task(None).unwrap_err();
        assert_eq!(diag.summary, "Invalid Argument");
    }
}
