//! The consumer side of the correlation broker.
//!
//! A [`Server`] attaches to the broker as its single long-lived listener.
//! Every request is resolved against the [`HandlerRegistry`] and handled in
//! its own task; exactly one terminal response is published per request,
//! whether the handler succeeds, fails, panics or no handler qualifies.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use switchyard_core::{
    CorrelationBroker, HandlerRegistry, OutgoingRequest, OutgoingResponse, ResponseError,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Behaviour switches for the consumer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerOptions {
    /// Include the serialized request when logging failures.
    pub log_payloads: bool,
}

/// Long-lived request consumer.
pub struct Server {
    registry: Arc<HandlerRegistry>,
    broker: Arc<CorrelationBroker>,
    options: ServerOptions,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Server {
    pub fn new(registry: Arc<HandlerRegistry>, broker: Arc<CorrelationBroker>) -> Self {
        Self {
            registry,
            broker,
            options: ServerOptions::default(),
            shutdown: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Attaches to the broker and starts consuming requests.
    ///
    /// Calling `listen` on a server that is already listening has no effect.
    /// Must be called from within a tokio runtime.
    pub fn listen(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            warn!("Server is already listening");
            return;
        }

        let mut requests = self.broker.listen();
        let registry = self.registry.clone();
        let broker = self.broker.clone();
        let shutdown = self.shutdown.clone();
        let options = self.options;

        info!(handlers = registry.len(), "Server listening");
        *task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    next = requests.recv() => {
                        let Some(request) = next else { break };
                        let registry = registry.clone();
                        let broker = broker.clone();
                        tokio::spawn(async move {
                            let response = handle_request(&registry, request, options).await;
                            broker.respond(response);
                        });
                    }
                }
            }
            debug!("Consumer loop stopped");
        }));
    }

    /// Returns `true` while the consumer is attached.
    pub fn is_listening(&self) -> bool {
        self.task.lock().is_some() && self.broker.is_listening()
    }

    /// Stops consuming, closes the broker and waits for the consumer loop.
    ///
    /// Producers still awaiting a response observe a closed stream.
    pub async fn close(&self) {
        self.shutdown.cancel();
        self.broker.close();
        let task = self.task.lock().take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            error!(error = %e, "Consumer loop terminated abnormally");
        }
        info!("Server closed");
    }
}

/// Resolves and runs the handler for one request.
///
/// Always returns a terminal response for the request's id.
pub async fn handle_request(
    registry: &HandlerRegistry,
    request: OutgoingRequest,
    options: ServerOptions,
) -> OutgoingResponse {
    let span = info_span!("request", id = %request.id, pattern = %request.pattern);
    async move {
        let id = request.id.clone();
        let handler = match registry.resolve(&request.pattern).into_result() {
            Ok(registration) => registration.handler().clone(),
            Err(err) => {
                log_failure(&request, &err, options);
                return OutgoingResponse::failure(id, err);
            }
        };

        let request = Arc::new(request);
        let outcome = AssertUnwindSafe(handler(request.clone()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("Handler panicked");
                Err(ResponseError::internal())
            });

        match outcome {
            Ok(value) => {
                debug!("Handler replied");
                OutgoingResponse::reply(id, value)
            }
            Err(err) => {
                log_failure(&request, &err, options);
                OutgoingResponse::failure(id, err)
            }
        }
    }
    .instrument(span)
    .await
}

fn log_failure(request: &OutgoingRequest, err: &ResponseError, options: ServerOptions) {
    if options.log_payloads {
        let payload = serde_json::to_string(request).unwrap_or_default();
        warn!(kind = ?err.kind, error = %err, request = %payload, "Request failed");
    } else {
        warn!(kind = ?err.kind, error = %err, "Request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::HandlerGroup;
    use crate::error::HandlerError;
    use serde_json::{Value, json};
    use switchyard_core::{ErrorKind, HandlerExtras, HandlerKind, handler_fn};

    async fn panics() -> Value {
        panic!("handler bug")
    }

    fn registry() -> Arc<HandlerRegistry> {
        let mut registry = HandlerRegistry::new();
        HandlerGroup::new()
            .message("ping", || async { "pong" })
            .message("fail", || async { Err::<(), _>(HandlerError::rpc("nope")) })
            .message("panic", panics)
            .event("evt", || async {})
            .register_into(&mut registry)
            .unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_handle_request_outcomes() {
        let registry = registry();
        let opts = ServerOptions::default();
        let call = |pattern: &str| OutgoingRequest::new("id", pattern, Value::Null);

        let ok = handle_request(&registry, call("ping"), opts).await;
        assert_eq!(ok, OutgoingResponse::reply("id", json!("pong")));

        let failed = handle_request(&registry, call("fail"), opts).await;
        assert_eq!(failed.err, Some(ResponseError::handler("nope")));
        assert!(failed.is_disposed);

        let panicked = handle_request(&registry, call("panic"), opts).await;
        assert_eq!(panicked.err, Some(ResponseError::internal()));

        let missing = handle_request(&registry, call("missing"), opts).await;
        assert_eq!(missing.err.map(|e| e.kind), Some(ErrorKind::NoHandlerQualified));

        let illegal = handle_request(&registry, call("evt"), opts).await;
        assert_eq!(illegal.err.map(|e| e.kind), Some(ErrorKind::IllegalEventHandler));
    }

    #[tokio::test]
    async fn test_listen_and_close() {
        let broker = Arc::new(CorrelationBroker::in_memory());
        let server = Server::new(registry(), broker.clone());
        assert!(!server.is_listening());

        server.listen();
        assert!(server.is_listening());
        let reply = broker
            .send_request(OutgoingRequest::new("1", "ping", Value::Null))
            .outcome()
            .await;
        assert_eq!(reply.unwrap(), json!("pong"));

        server.close().await;
        assert!(!server.is_listening());
        let err = broker
            .send_request(OutgoingRequest::new("2", "ping", Value::Null))
            .outcome()
            .await
            .unwrap_err();
        assert!(err.is_no_consumer());
    }

    #[tokio::test]
    async fn test_reply_buffered_until_polled() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(
                "slow",
                handler_fn(|req| async move {
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok(json!(req.id.clone()))
                }),
                HandlerKind::Message,
                HandlerExtras::default(),
            )
            .unwrap();
        let broker = Arc::new(CorrelationBroker::in_memory());
        let server = Server::new(Arc::new(registry), broker.clone());
        server.listen();

        let stream = broker.send_request(OutgoingRequest::new("late", "slow", Value::Null));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(stream.outcome().await.unwrap(), json!("late"));
    }
}
