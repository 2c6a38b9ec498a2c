//! Declarative-configuration provider for the task service.
//!
//! # Overview
//! Exposes one managed resource (`taskserv_task`) and one read-only data
//! source (`taskserv_tasks`). Host-side state travels as `ResourceData`, a
//! schema-checked JSON map; `TaskOperation` maps it onto `TaskService` calls
//! and reports failures as `Diagnostic`s rather than errors.
//!
//! # Design
//! - `schema` declares attribute shapes; `resource_data` enforces them.
//! - `convert` expands configured items into requests and flattens tasks
//!   back into items.
//! - `operation` holds the CRUD flow; it only sees the `TaskService` trait.
//! - `provider` resolves configuration into a `TaskClient`.

pub mod convert;
pub mod diagnostics;
pub mod operation;
pub mod provider;
pub mod resource_data;
pub mod schema;

pub use diagnostics::{has_errors, Diagnostic, Diagnostics, Severity};
pub use operation::TaskOperation;
pub use provider::{ProviderConfig, TaskProvider, DATA_SOURCE_TASKS, HOST_ENV, RESOURCE_TASK};
pub use resource_data::ResourceData;
