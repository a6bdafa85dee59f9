//! # Switchyard
//!
//! Pattern-routed request/reply dispatch for serverless function events.
//!
//! ## Overview
//!
//! An invocation event is normalized into one or more requests, each with a
//! correlation id and a routing pattern. Requests travel over an in-process
//! broker to a consumer that picks the handler whose pattern matches, and
//! each handler's reply travels back under the same id. Once every request
//! of the event has settled, the outcomes are folded into whatever the
//! trigger expects as acknowledgement.
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────┐   ┌──────────┐   ┌──────────┐
//! │  event   │──▶│   mapper   │──▶│ broker │──▶│  server  │──▶│ handlers │
//! └──────────┘   │ (adapter)  │   │        │◀──│          │◀──│          │
//!       ▲        └────────────┘   └────────┘   └──────────┘   └──────────┘
//!       │              │               │
//!       └── ack ◀── responder ◀── outcomes
//! ```
//!
//! - **Core**: patterns, the handler registry and the correlation broker
//! - **Framework**: extractor-based handlers, handler groups, server, client
//! - **Runtime**: configuration, logging and the [`SwitchyardRuntime`](runtime::SwitchyardRuntime)
//! - **Adapters**: trigger detection and per-trigger request/response builders
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! async fn process(Payload(order): Payload<Order>) -> Result<String, HandlerError> {
//!     Ok(format!("processed {}", order.id))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::builder().build_with_mapper::<AwsEventMapper>()?;
//!     runtime.register(json!({ "command": "process" }), process)?;
//!     runtime.start()?;
//!
//!     let ack = runtime.process_event(event, InvocationContext::new()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `adapter-aws`: AWS Lambda event adapter (default)
//! - `toml-config` / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output

#[cfg(feature = "adapter-aws")]
pub use switchyard_adapter_aws as aws;
pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;

/// Commonly used types for building handlers and running the router.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use switchyard_runtime::{RuntimeError, RuntimeResult, SwitchyardRuntime};

    pub use switchyard_core::{
        Acknowledgement, CATCH_ALL, DispatchError, HandlerExtras, InvocationContext, Pattern,
    };

    // Handler building blocks
    pub use switchyard_framework::{
        Context, HandlerError, HandlerGroup, HandlerResult, Json, MessagePattern, Payload,
        RequestId,
    };

    #[cfg(feature = "adapter-aws")]
    pub use switchyard_adapter_aws::{AwsConfig, AwsEventMapper};

    pub use serde_json::json;
}
