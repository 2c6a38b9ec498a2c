use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use taskserv_provider::schema::{task_data_source_schema, task_resource_schema};
use taskserv_provider::{has_errors, Diagnostic, ProviderConfig, ResourceData, TaskProvider};
use tracing_subscriber::EnvFilter;

/// taskserv - manage tasks in the task service through the provider operations
#[derive(Parser, Debug)]
#[command(name = "taskserv", version, about = "Manage tasks in the task service")]
struct Cli {
    /// Base URL of the task service (defaults to $TASKSERV_HOST)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task and print the stored state
    Create(TaskArgs),

    /// Look up a task by id
    Get { id: i64 },

    /// Replace the fields of an existing task
    Update {
        id: i64,
        #[command(flatten)]
        task: TaskArgs,
    },

    /// Delete a task
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct TaskArgs {
    #[arg(long)]
    title: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    priority: Option<i32>,

    #[arg(long)]
    completed: bool,

    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    due_date: Option<String>,
}

impl TaskArgs {
    /// Resource configuration holding this task as its single item.
    fn to_config(&self) -> Value {
        json!({
            "items": [{
                "title": self.title,
                "description": self.description,
                "priority": self.priority,
                "completed": self.completed,
                "start_date": self.start_date,
                "due_date": self.due_date,
            }]
        })
    }
}

fn report(diags: &[Diagnostic]) -> ExitCode {
    for diag in diags {
        eprintln!("{diag}");
    }
    if has_errors(diags) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = TaskProvider::new();
    let config = ProviderConfig::from_value(&json!({
        "host": cli.host,
        "timeout_secs": cli.timeout_secs,
    }))
    .context("invalid provider settings")?;
    let client = match provider.configure(&config) {
        Ok(client) => client,
        Err(diags) => return Ok(report(&diags)),
    };
    let operation = provider.operation();

    let (rd, diags) = match cli.command {
        Command::Create(task) => {
            let mut rd =
                ResourceData::from_config(task_resource_schema(), task.to_config()).context("invalid task arguments")?;
            let diags = operation.create(&mut rd, &client);
            (rd, diags)
        }
        Command::Get { id } => {
            let mut rd = ResourceData::from_config(task_data_source_schema(), json!({ "id": id }))?;
            let diags = operation.read_data_source(&mut rd, &client);
            (rd, diags)
        }
        Command::Update { id, task } => {
            let mut rd =
                ResourceData::from_config(task_resource_schema(), task.to_config()).context("invalid task arguments")?;
            rd.set_id(id.to_string());
            let diags = operation.update(&mut rd, &client);
            (rd, diags)
        }
        Command::Delete { id } => {
            let mut rd = ResourceData::new(task_resource_schema());
            rd.set_id(id.to_string());
            let diags = operation.delete(&mut rd, &client);
            (rd, diags)
        }
    };

    let code = report(&diags);
    if !has_errors(&diags) {
        println!("{}", serde_json::to_string_pretty(&rd.state())?);
    }
    Ok(code)
}
