//! Full CRUD lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `UreqTransport`. Validates that request
//! building, status checks, and envelope decoding work end-to-end.

use std::time::Duration;

use taskserv_core::{ApiError, ClientConfig, TaskClient, TaskRequest, TaskService};

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let base_url = start_server();
    let client = TaskClient::from_config(&ClientConfig::new(&base_url).with_timeout(Duration::from_secs(5)));

    // Step 1: create a task.
    let create_input = TaskRequest {
        title: Some("Integration test".to_string()),
        description: Some("Created over HTTP".to_string()),
        priority: Some(1),
        completed: Some(false),
        start_date: Some("2023-02-10".to_string()),
        due_date: Some("2023-02-20".to_string()),
    };
    let created = client.create_task(Some(create_input)).unwrap();
    assert!(created.service_error().is_none());
    let id = created.task_id.expect("create returns taskId");

    // Step 2: get the created task.
    let fetched = client.get_task(Some(id)).unwrap();
    let task = fetched.task.expect("get returns task");
    assert_eq!(task.id, Some(id));
    assert_eq!(task.title.as_deref(), Some("Integration test"));
    assert_eq!(task.priority, Some(1));
    assert_eq!(task.start_date, Some(1_675_987_200_000));
    assert_eq!(task.due_date, Some(1_676_851_200_000));
    assert!(task.time_created.is_some());

    // Step 3: update.
    let update_input = TaskRequest {
        title: Some("Updated title".to_string()),
        completed: Some(true),
        ..Default::default()
    };
    let updated = client.update_task(Some(id), Some(update_input)).unwrap();
    assert_eq!(updated.task_id, Some(id));

    let task = client.get_task(Some(id)).unwrap().task.unwrap();
    assert_eq!(task.title.as_deref(), Some("Updated title"));
    assert_eq!(task.completed, Some(true));

    // Step 4: a bad date is rejected with an error envelope and a 400.
    let bad = TaskRequest {
        title: Some("Bad date".to_string()),
        start_date: Some("tomorrow".to_string()),
        ..Default::default()
    };
    let err = client.update_task(Some(id), Some(bad)).unwrap_err();
    match err {
        ApiError::UnexpectedStatus { status, service_error, .. } => {
            assert_eq!(status, 400);
            assert_eq!(service_error.unwrap().error_code, Some(400));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Step 5: delete.
    let deleted = client.delete_task(Some(id)).unwrap();
    assert!(deleted.service_error().is_none());

    // Step 6: get after delete — 404 is an unexpected status.
    let err = client.get_task(Some(id)).unwrap_err();
    assert_eq!(err.status(), Some(404));

    // Step 7: delete again — also 404.
    let err = client.delete_task(Some(id)).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn unreachable_service_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = TaskClient::from_config(&ClientConfig::new(&format!("http://{addr}")));
    let err = client.get_task(Some(1)).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}
