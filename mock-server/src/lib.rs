use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    pub time_updated: i64,
    pub time_created: i64,
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<i32>,
    #[serde(default)]
    pub completed: bool,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error_code: i32,
    pub error_message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    tasks: HashMap<i64, Task>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Envelope>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        next_id: 1,
        tasks: HashMap::new(),
    }));
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_reply(status: StatusCode, message: String) -> Reply {
    let error = ErrorBody {
        error_code: i32::from(status.as_u16()),
        error_message: message,
    };
    (
        status,
        Json(Envelope {
            error: Some(error),
            ..Default::default()
        }),
    )
}

fn not_found(id: i64) -> Reply {
    error_reply(StatusCode::NOT_FOUND, format!("Task {id} not found"))
}

/// `YYYY-MM-DD` to epoch milliseconds at midnight UTC.
fn parse_date(value: Option<&str>) -> Result<Option<i64>, String> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| format!("Invalid date '{s}': {e}"))
                .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis())
        })
        .transpose()
}

fn apply(task: &mut Task, input: TaskInput) -> Result<(), String> {
    let start_date = parse_date(input.start_date.as_deref())?;
    let due_date = parse_date(input.due_date.as_deref())?;
    task.title = input.title;
    task.description = input.description;
    task.priority = input.priority;
    task.completed = input.completed;
    task.start_date = start_date;
    task.due_date = due_date;
    task.time_updated = Utc::now().timestamp_millis();
    Ok(())
}

async fn create_task(State(db): State<Db>, Json(input): Json<TaskInput>) -> Reply {
    let now = Utc::now().timestamp_millis();
    let mut store = db.write().await;
    let mut task = Task {
        id: store.next_id,
        title: String::new(),
        description: None,
        priority: None,
        completed: false,
        start_date: None,
        due_date: None,
        time_updated: now,
        time_created: now,
    };
    if let Err(message) = apply(&mut task, input) {
        return error_reply(StatusCode::BAD_REQUEST, message);
    }
    store.next_id += 1;
    let id = task.id;
    store.tasks.insert(id, task);
    tracing::info!(id, "task created");
    (
        StatusCode::CREATED,
        Json(Envelope {
            task_id: Some(id),
            ..Default::default()
        }),
    )
}

async fn get_task(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.tasks.get(&id) {
        Some(task) => (
            StatusCode::OK,
            Json(Envelope {
                task: Some(task.clone()),
                ..Default::default()
            }),
        ),
        None => not_found(id),
    }
}

async fn update_task(State(db): State<Db>, Path(id): Path<i64>, Json(input): Json<TaskInput>) -> Reply {
    let mut store = db.write().await;
    let Some(task) = store.tasks.get_mut(&id) else {
        return not_found(id);
    };
    if let Err(message) = apply(task, input) {
        return error_reply(StatusCode::BAD_REQUEST, message);
    }
    tracing::info!(id, "task updated");
    (
        StatusCode::OK,
        Json(Envelope {
            task_id: Some(id),
            ..Default::default()
        }),
    )
}

async fn delete_task(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let mut store = db.write().await;
    match store.tasks.remove(&id) {
        Some(_) => {
            tracing::info!(id, "task deleted");
            (StatusCode::OK, Json(Envelope::default()))
        }
        None => not_found(id),
    }
}
