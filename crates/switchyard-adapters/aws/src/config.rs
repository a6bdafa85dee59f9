//! Configuration types for the AWS adapter.
//!
//! Loaded from the `adapters.aws` section of the global configuration file.
//!
//! # Example Configuration
//!
//! ```yaml
//! adapters:
//!   aws:
//!     # What to do with DynamoDB Streams and Kinesis batches
//!     unknown_sources: custom
//!     # Route SNS notifications delivered through SQS by their SNS attributes
//!     unwrap_sns_envelopes: true
//!     # Field name of the SQS partial batch response
//!     batch_failure_key: batchItemFailures
//! ```

use serde::{Deserialize, Serialize};
use switchyard_core::BatchFailureKey;

/// AWS adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Handling of record batches from sources without a dedicated builder.
    pub unknown_sources: UnknownSources,

    /// Whether SQS records carrying an SNS notification are routed by the
    /// notification's attributes.
    pub unwrap_sns_envelopes: bool,

    /// Field under which failed SQS items are reported.
    pub batch_failure_key: BatchFailureKey,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            unknown_sources: UnknownSources::default(),
            unwrap_sns_envelopes: true,
            batch_failure_key: BatchFailureKey::default(),
        }
    }
}

/// Policy for recognized but unsupported record sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSources {
    /// Fail the invocation.
    #[default]
    Reject,
    /// Dispatch the whole event as a custom event.
    Custom,
}
