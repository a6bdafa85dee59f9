//! API Gateway proxy events.

use serde::Deserialize;
use serde_json::{Map, Value};

/// The fields of `requestContext` that are used for correlation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: String,
}

/// A REST API (payload format 1.0) proxy event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV1Event {
    pub request_context: RequestContext,
    pub http_method: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub path_parameters: Option<Map<String, Value>>,
}

/// An HTTP API (payload format 2.0) proxy event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayV2Event {
    pub request_context: RequestContext,
    /// `"<METHOD> <path>"`, or `"$default"`.
    pub route_key: String,
    #[serde(default)]
    pub query_string_parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub path_parameters: Option<Map<String, Value>>,
}

impl ApiGatewayV2Event {
    /// Splits the route key at its first space into method and resource.
    pub fn route(&self) -> (&str, Option<&str>) {
        match self.route_key.split_once(' ') {
            Some((method, resource)) => (method, Some(resource)),
            None => (self.route_key.as_str(), None),
        }
    }
}
