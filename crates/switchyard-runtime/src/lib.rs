//! Switchyard Runtime - orchestration layer for the Switchyard event router.
//!
//! This crate provides:
//! - Layered configuration (`SwitchyardConfig`, `ConfigLoader`)
//! - Logging setup driven by that configuration
//! - The [`SwitchyardRuntime`], which owns the broker, the handler registry
//!   and the event mapper
//!
//! ```ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::builder().build_with_mapper::<MyMapper>()?;
//!     runtime.register(CATCH_ALL, fallback)?;
//!     runtime.start()?;
//!
//!     let ack = runtime.process_event(event, InvocationContext::new()).await?;
//!     println!("{}", ack.into_value());
//!
//!     runtime.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, ServerConfig, SwitchyardConfig,
    load_config, load_config_from_file,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{RuntimeBuilder, SwitchyardRuntime};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
