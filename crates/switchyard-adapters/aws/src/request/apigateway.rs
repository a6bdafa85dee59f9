use serde_json::Value;
use switchyard_core::{
    AdapterError, AdapterResult, InvocationContext, OutgoingRequest, Pattern, RequestBuilder,
};

use super::decode;
use crate::model::{ApiGatewayV1Event, ApiGatewayV2Event};

/// Builds requests from API Gateway proxy events of either payload format.
///
/// The pattern is `{httpMethod, resource, queryStringParameters,
/// pathParameters}`, with missing parts set to `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiGatewayRequestBuilder;

impl ApiGatewayRequestBuilder {
    const TRIGGER: &'static str = "apigateway";

    fn pattern(
        method: &str,
        resource: Option<&str>,
        query: Option<&serde_json::Map<String, Value>>,
        path: Option<&serde_json::Map<String, Value>>,
    ) -> Pattern {
        let object = |params: Option<&serde_json::Map<String, Value>>| {
            params.map_or(Value::Null, |p| Value::Object(p.clone()))
        };
        Pattern::mapping([
            ("httpMethod", Pattern::from(method)),
            ("resource", Pattern::from(resource)),
            ("queryStringParameters", Pattern::from(object(query))),
            ("pathParameters", Pattern::from(object(path))),
        ])
    }
}

impl RequestBuilder for ApiGatewayRequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        let (id, pattern) = if item.get("httpMethod").is_some() {
            let event: ApiGatewayV1Event = decode(Self::TRIGGER, item)?;
            let pattern = Self::pattern(
                &event.http_method,
                event.resource.as_deref(),
                event.query_string_parameters.as_ref(),
                event.path_parameters.as_ref(),
            );
            (event.request_context.request_id, pattern)
        } else if item.get("routeKey").is_some() {
            let event: ApiGatewayV2Event = decode(Self::TRIGGER, item)?;
            let (method, resource) = event.route();
            let pattern = Self::pattern(
                method,
                resource,
                event.query_string_parameters.as_ref(),
                event.path_parameters.as_ref(),
            );
            (event.request_context.request_id.clone(), pattern)
        } else {
            return Err(AdapterError::parse(
                Self::TRIGGER,
                "unknown API Gateway payload format",
            ));
        };

        Ok(OutgoingRequest::new(id, pattern, item.clone()).with_context(context.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_v1() {
        let event = json!({
            "requestContext": { "requestId": "req-1" },
            "httpMethod": "GET",
            "resource": "/books/{id}",
            "path": "/books/7",
            "pathParameters": { "id": "7" },
            "queryStringParameters": null,
            "isBase64Encoded": false
        });
        let request = ApiGatewayRequestBuilder
            .build(&event, &InvocationContext::new())
            .unwrap();

        assert_eq!(request.id, "req-1");
        assert_eq!(
            request.pattern,
            Pattern::from(json!({
                "httpMethod": "GET",
                "resource": "/books/{id}",
                "queryStringParameters": null,
                "pathParameters": { "id": "7" }
            }))
        );
        assert_eq!(request.data, event);
    }

    #[test]
    fn test_build_v2_splits_route_key() {
        let event = json!({
            "requestContext": { "requestId": "req-2" },
            "routeKey": "POST /books",
            "rawPath": "/books",
            "isBase64Encoded": false
        });
        let request = ApiGatewayRequestBuilder
            .build(&event, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.pattern.get("httpMethod"), Some(&Pattern::from("POST")));
        assert_eq!(request.pattern.get("resource"), Some(&Pattern::from("/books")));
        assert_eq!(request.pattern.get("pathParameters"), Some(&Pattern::Null));

        let default_route = json!({
            "requestContext": { "requestId": "req-3" },
            "routeKey": "$default",
            "rawPath": "/",
            "isBase64Encoded": false
        });
        let request = ApiGatewayRequestBuilder
            .build(&default_route, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.pattern.get("httpMethod"), Some(&Pattern::from("$default")));
        assert_eq!(request.pattern.get("resource"), Some(&Pattern::Null));
    }

    #[test]
    fn test_missing_request_id_fails() {
        let event = json!({ "requestContext": {}, "httpMethod": "GET", "path": "/", "isBase64Encoded": false });
        let err = ApiGatewayRequestBuilder
            .build(&event, &InvocationContext::new())
            .unwrap_err();
        assert!(matches!(err, AdapterError::Parse { trigger: "apigateway", .. }));
    }
}
