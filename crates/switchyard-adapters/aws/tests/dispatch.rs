//! End-to-end dispatch of Lambda events through the broker.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};
use switchyard_adapter_aws::{AwsConfig, AwsEventMapper};
use switchyard_core::{
    Acknowledgement, BatchFailureKey, CATCH_ALL, CorrelationBroker, DispatchError,
    HandlerRegistry, InvocationContext,
};
use switchyard_framework::{Client, HandlerError, HandlerGroup, Payload, RequestId, Server};

#[derive(Deserialize)]
struct SqsBody {
    body: String,
}

async fn results() -> &'static str {
    "Results"
}

async fn list_books() -> Value {
    json!(["dune"])
}

async fn create_book() -> &'static str {
    "created"
}

async fn process(Payload(record): Payload<SqsBody>) -> Result<String, HandlerError> {
    if record.body == "poison" {
        return Err(HandlerError::rpc("cannot process"));
    }
    Ok(record.body)
}

async fn notified(RequestId(id): RequestId) -> String {
    format!("seen {id}")
}

struct Harness {
    server: Server,
    client: Client<AwsEventMapper>,
}

impl Harness {
    fn start(config: AwsConfig) -> Self {
        let mut registry = HandlerRegistry::new();
        HandlerGroup::named("books")
            .partial_match(true)
            .message(json!({ "httpMethod": "GET", "resource": "/books" }), list_books)
            .message(json!({ "httpMethod": "POST", "resource": "/books" }), create_book)
            .register_into(&mut registry)
            .unwrap();
        HandlerGroup::named("queue")
            .message(json!({ "command": "process" }), process)
            .message(json!({ "topic": "orders" }), notified)
            .message(CATCH_ALL, results)
            .register_into(&mut registry)
            .unwrap();

        let broker = Arc::new(CorrelationBroker::in_memory());
        let server = Server::new(Arc::new(registry), broker.clone());
        server.listen();
        let client = Client::new(broker, AwsEventMapper::new(config));
        Self { server, client }
    }

    async fn dispatch(&self, event: Value) -> Result<Acknowledgement, DispatchError> {
        self.client
            .process_event(event, InvocationContext::new().with_function_name("test"))
            .await
    }
}

fn sqs_record(id: &str, command: &str, body: &str) -> Value {
    json!({
        "eventSource": "aws:sqs",
        "messageId": id,
        "body": body,
        "messageAttributes": {
            "command": { "dataType": "String", "stringValue": command }
        }
    })
}

fn api_gateway(method: &str, resource: &str) -> Value {
    json!({
        "requestContext": { "requestId": format!("{method}-{resource}") },
        "httpMethod": method,
        "resource": resource,
        "path": resource,
        "queryStringParameters": { "page": "1" },
        "pathParameters": null,
        "isBase64Encoded": false
    })
}

#[tokio::test]
async fn test_custom_event_reaches_catch_all() {
    let harness = Harness::start(AwsConfig::default());
    let ack = harness.dispatch(json!({ "foo": "bar" })).await.unwrap();
    assert_eq!(ack, Acknowledgement::Reply(json!("Results")));
    harness.server.close().await;
}

#[tokio::test]
async fn test_sqs_partial_batch_failure() {
    let harness = Harness::start(AwsConfig::default());
    let event = json!({ "Records": [
        sqs_record("id0", "process", "a"),
        sqs_record("id1", "process", "b"),
        sqs_record("id3", "process", "poison"),
        sqs_record("id2", "unknown", "c"),
    ]});

    let ack = harness.dispatch(event).await.unwrap();
    // "unknown" falls through to the catch-all, so only the poison message fails.
    assert_eq!(
        ack.into_value(),
        json!({ "failedItems": [{ "itemIdentifier": "id3" }] })
    );
    harness.server.close().await;
}

#[tokio::test]
async fn test_sqs_unmatched_and_failed_items_are_reported() {
    let mut registry = HandlerRegistry::new();
    HandlerGroup::new()
        .message(json!({ "command": "process" }), process)
        .register_into(&mut registry)
        .unwrap();
    let broker = Arc::new(CorrelationBroker::in_memory());
    let server = Server::new(Arc::new(registry), broker.clone());
    server.listen();
    let client = Client::new(
        broker,
        AwsEventMapper::new(AwsConfig {
            batch_failure_key: BatchFailureKey::BatchItemFailures,
            ..AwsConfig::default()
        }),
    );

    let event = json!({ "Records": [
        sqs_record("id0", "process", "a"),
        sqs_record("id1", "process", "b"),
        sqs_record("id3", "nobody", "c"),
        sqs_record("id2", "process", "poison"),
    ]});
    let ack = client
        .process_event(event, InvocationContext::new())
        .await
        .unwrap();
    assert_eq!(
        ack.into_value(),
        json!({ "batchItemFailures": [{ "itemIdentifier": "id2" }, { "itemIdentifier": "id3" }] })
    );
    server.close().await;
}

#[tokio::test]
async fn test_api_gateway_partial_routes() {
    let harness = Harness::start(AwsConfig::default());

    let get = harness.dispatch(api_gateway("GET", "/books")).await.unwrap();
    assert_eq!(get, Acknowledgement::Reply(json!(["dune"])));

    let post = harness.dispatch(api_gateway("POST", "/books")).await.unwrap();
    assert_eq!(post, Acknowledgement::Reply(json!("created")));

    let other = harness.dispatch(api_gateway("DELETE", "/books")).await.unwrap();
    assert_eq!(other, Acknowledgement::Reply(json!("Results")));
    harness.server.close().await;
}

#[tokio::test]
async fn test_sqs_with_sns_envelope_routes_by_sns_attributes() {
    let harness = Harness::start(AwsConfig::default());
    let envelope = json!({
        "Type": "Notification",
        "MessageId": "sns-1",
        "TopicArn": "arn:aws:sns:eu-west-1:123:orders",
        "Message": "{}",
        "MessageAttributes": { "topic": { "Type": "String", "Value": "orders" } }
    });
    let record = json!({
        "eventSource": "aws:sqs",
        "messageId": "sqs-1",
        "body": envelope.to_string(),
        "messageAttributes": {}
    });

    let ack = harness
        .dispatch(json!({ "Records": [record] }))
        .await
        .unwrap();
    assert_eq!(ack.into_value(), json!({ "failedItems": [] }));
    harness.server.close().await;
}

#[tokio::test]
async fn test_sns_replies_in_order() {
    let harness = Harness::start(AwsConfig::default());
    let record = |id: &str| {
        json!({
            "EventSource": "aws:sns",
            "Sns": {
                "Type": "Notification",
                "MessageId": id,
                "TopicArn": "arn:aws:sns:eu-west-1:123:orders",
                "MessageAttributes": { "topic": { "Type": "String", "Value": "orders" } }
            }
        })
    };

    let ack = harness
        .dispatch(json!({ "Records": [record("n2"), record("n1")] }))
        .await
        .unwrap();
    assert_eq!(
        ack,
        Acknowledgement::Replies(vec![json!("seen n2"), json!("seen n1")])
    );
    harness.server.close().await;
}

#[tokio::test]
async fn test_binary_attribute_fails_dispatch() {
    let harness = Harness::start(AwsConfig::default());
    let record = json!({
        "eventSource": "aws:sqs",
        "messageId": "m",
        "body": "",
        "messageAttributes": { "blob": { "dataType": "Binary", "stringValue": "AAE=" } }
    });

    let err = harness
        .dispatch(json!({ "Records": [record] }))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Attribute type not implemented: Binary");
    harness.server.close().await;
}

#[tokio::test]
async fn test_without_consumer_single_item_fails() {
    let broker = Arc::new(CorrelationBroker::in_memory());
    let client = Client::new(broker, AwsEventMapper::default());
    let err = client
        .process_event(json!({ "foo": "bar" }), InvocationContext::new())
        .await
        .unwrap_err();
    let DispatchError::Correlation(err) = err else {
        panic!("expected a correlation error");
    };
    assert!(err.is_no_consumer());
}
