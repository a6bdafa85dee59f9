//! Invoke Demo
//!
//! Feeds one Lambda event through a Switchyard router with a handful of
//! demo handlers, then prints the acknowledgement the function would return.
//!
//! # Handlers
//!
//! ```text
//! {"httpMethod": "GET",  "resource": "/books"}  (partial)  → list of books
//! {"httpMethod": "POST", "resource": "/books"}  (partial)  → "created"
//! {"command": "process"}                                   → echoes the SQS body, fails on "poison"
//! {"topic": "orders"}                                      → "seen <id>"
//! "*"                                                      → "Results"
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package switchyard-invoke -- event.json
//! echo '{"foo": "bar"}' | cargo run --package switchyard-invoke
//! ```

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use switchyard::prelude::*;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Event JSON file; reads stdin when omitted
    event: Option<PathBuf>,

    /// Configuration file (TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Function name put into the invocation context
    #[arg(long, default_value = "invoke-demo")]
    function_name: String,

    /// Pretty-print the acknowledgement
    #[arg(short, long)]
    pretty: bool,
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Deserialize)]
struct SqsBody {
    body: String,
}

async fn list_books() -> Value {
    json!([{ "title": "Dune" }, { "title": "Solaris" }])
}

async fn create_book(Payload(request): Payload<Value>) -> &'static str {
    info!(body = ?request.get("body"), "Creating book");
    "created"
}

async fn process(Payload(record): Payload<SqsBody>) -> HandlerResult<String> {
    if record.body == "poison" {
        warn!("Refusing poison message");
        return Err(HandlerError::rpc("cannot process"));
    }
    Ok(record.body)
}

async fn order_seen(RequestId(id): RequestId) -> String {
    format!("seen {id}")
}

async fn fallback(MessagePattern(pattern): MessagePattern) -> &'static str {
    info!(%pattern, "No specific handler, using catch-all");
    "Results"
}

fn handlers() -> Vec<HandlerGroup> {
    vec![
        HandlerGroup::named("books")
            .partial_match(true)
            .message(json!({ "httpMethod": "GET", "resource": "/books" }), list_books)
            .message(json!({ "httpMethod": "POST", "resource": "/books" }), create_book),
        HandlerGroup::named("queue")
            .message(json!({ "command": "process" }), process)
            .message(json!({ "topic": "orders" }), order_seen),
        HandlerGroup::named("fallback").message(CATCH_ALL, fallback),
    ]
}

// ============================================================================
// Main Entry Point
// ============================================================================

async fn read_event(path: Option<PathBuf>) -> Result<Value> {
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            raw
        }
    };
    serde_json::from_str(&raw).context("event is not valid JSON")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = SwitchyardRuntime::builder();
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    let runtime = builder.build_with_mapper::<AwsEventMapper>()?;

    for group in handlers() {
        runtime.register_group(group)?;
    }
    runtime.start()?;

    let event = read_event(cli.event).await?;
    let context = InvocationContext::new().with_function_name(cli.function_name);
    let result = runtime.process_event(event, context).await;
    runtime.shutdown().await;

    let ack = result?.into_value();
    let output = if cli.pretty {
        serde_json::to_string_pretty(&ack)?
    } else {
        serde_json::to_string(&ack)?
    };
    println!("{output}");
    Ok(())
}
