//! Runtime orchestration.
//!
//! [`SwitchyardRuntime`] owns one correlation broker and wires both of its
//! ends: the [`Server`] that consumes requests with the registered handlers,
//! and the [`Client`] that turns invocation events into requests.
//!
//! ```rust,ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! let runtime = SwitchyardRuntime::builder()
//!     .config_file("switchyard.toml")
//!     .build_with_mapper::<AwsEventMapper>()?;
//!
//! runtime.register(json!({ "command": "process" }), process)?;
//! runtime.register(CATCH_ALL, fallback)?;
//! runtime.start()?;
//!
//! let ack = runtime.process_event(event, context).await?;
//! runtime.shutdown().await;
//! ```

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use switchyard_core::{
    Acknowledgement, ConfigurableMapper, CorrelationBroker, DispatchResult, EventMapper,
    HandlerExtras, HandlerKind, HandlerRegistry, InvocationContext, Pattern,
};
use switchyard_framework::{Client, Handler, HandlerGroup, Server, into_handler};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigLoader, SwitchyardConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

enum State {
    /// Collecting registrations.
    Building(HandlerRegistry),
    Running(Server),
    Stopped,
}

/// A configured event router for one mapper.
pub struct SwitchyardRuntime<M> {
    config: SwitchyardConfig,
    client: Client<M>,
    state: Mutex<State>,
}

impl SwitchyardRuntime<()> {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }
}

impl<M: EventMapper> SwitchyardRuntime<M> {
    /// Creates a runtime from an already loaded configuration.
    ///
    /// Initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(config: SwitchyardConfig, mapper: M) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            "Runtime initialized from configuration"
        );

        let broker = Arc::new(CorrelationBroker::in_memory());
        Self {
            client: Client::new(broker, mapper),
            state: Mutex::new(State::Building(HandlerRegistry::new())),
            config,
        }
    }

    /// Creates a runtime whose mapper is built from its own section of
    /// `adapters`.
    ///
    /// A missing section falls back to the mapper's default configuration.
    pub fn with_mapper(config: SwitchyardConfig) -> RuntimeResult<Self>
    where
        M: ConfigurableMapper,
    {
        let name = M::name();
        let mapper_config: M::Config = match config.adapters.get(name) {
            Some(value) => value
                .clone()
                .deserialize()
                .map_err(|e| ConfigError::adapter_section(name, e))?,
            None => {
                warn!(adapter = name, "No configuration found for adapter, using default");
                M::Config::default()
            }
        };

        let mapper = M::from_config(mapper_config)?;
        debug!(adapter = name, "Mapper created");
        Ok(Self::from_config(config, mapper))
    }

    pub fn config(&self) -> &SwitchyardConfig {
        &self.config
    }

    pub fn mapper(&self) -> &M {
        self.client.mapper()
    }

    /// Registers a request/reply handler.
    pub fn register<H, T>(&self, pattern: impl Into<Pattern>, handler: H) -> RuntimeResult<()>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.register_with(pattern, handler, HandlerExtras::default())
    }

    /// Registers a request/reply handler with explicit extras.
    pub fn register_with<H, T>(
        &self,
        pattern: impl Into<Pattern>,
        handler: H,
        extras: HandlerExtras,
    ) -> RuntimeResult<()>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.with_registry(|registry| {
            registry.register(pattern, into_handler(handler), HandlerKind::Message, extras)
        })
    }

    /// Registers an event-only handler.
    pub fn register_event<H, T>(&self, pattern: impl Into<Pattern>, handler: H) -> RuntimeResult<()>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.with_registry(|registry| {
            registry.register(
                pattern,
                into_handler(handler),
                HandlerKind::Event,
                HandlerExtras::default(),
            )
        })
    }

    /// Registers every handler of `group`, returning how many were added.
    pub fn register_group(&self, group: HandlerGroup) -> RuntimeResult<usize> {
        self.with_registry(|registry| group.register_into(registry))
    }

    fn with_registry<T>(
        &self,
        f: impl FnOnce(&mut HandlerRegistry) -> switchyard_core::RegistryResult<T>,
    ) -> RuntimeResult<T> {
        match &mut *self.state.lock() {
            State::Building(registry) => Ok(f(registry)?),
            State::Running(_) => Err(RuntimeError::AlreadyStarted),
            State::Stopped => Err(RuntimeError::Stopped),
        }
    }

    /// Freezes the registry and starts consuming requests.
    ///
    /// Must be called from within a tokio runtime. Starting twice is a
    /// no-op.
    pub fn start(&self) -> RuntimeResult<()> {
        let mut state = self.state.lock();
        let registry = match std::mem::replace(&mut *state, State::Stopped) {
            State::Building(registry) => registry,
            running @ State::Running(_) => {
                *state = running;
                warn!("Runtime is already running");
                return Ok(());
            }
            State::Stopped => return Err(RuntimeError::Stopped),
        };

        let server = Server::new(Arc::new(registry), self.client.broker().clone())
            .with_options(self.config.server.into());
        server.listen();
        *state = State::Running(server);
        info!("Runtime started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), State::Running(_))
    }

    /// Processes one invocation event and returns its acknowledgement.
    ///
    /// Before [`start`](Self::start) there is no consumer, so every request
    /// fails with a no-consumer correlation error.
    pub async fn process_event(
        &self,
        event: Value,
        context: InvocationContext,
    ) -> DispatchResult<Acknowledgement> {
        self.client.process_event(event, context).await
    }

    /// Stops the consumer and closes the broker.
    ///
    /// In-flight producers observe a closed stream. The runtime cannot be
    /// restarted.
    pub async fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), State::Stopped);
        match previous {
            State::Running(server) => server.close().await,
            State::Building(_) => self.client.broker().close(),
            State::Stopped => warn!("Runtime is not running"),
        }
        info!("Runtime stopped");
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`SwitchyardRuntime`] with custom configuration loading.
///
/// ```rust,ignore
/// let runtime = SwitchyardRuntime::builder()
///     .config_file("config/production.toml")
///     .profile("production")
///     .build_with_mapper::<AwsEventMapper>()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: SwitchyardConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    fn load(self) -> RuntimeResult<SwitchyardConfig> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Builds the runtime around an explicit mapper.
    pub fn build<M: EventMapper>(self, mapper: M) -> RuntimeResult<SwitchyardRuntime<M>> {
        Ok(SwitchyardRuntime::from_config(self.load()?, mapper))
    }

    /// Builds the runtime, configuring the mapper from `adapters.<name>`.
    pub fn build_with_mapper<M: ConfigurableMapper>(self) -> RuntimeResult<SwitchyardRuntime<M>> {
        SwitchyardRuntime::with_mapper(self.load()?)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use switchyard_core::{
        AdapterResult, CATCH_ALL, DispatchError, MappedEvent, OutgoingRequest, ResponseBuilder,
        ResponseTuple,
    };

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct TagConfig {
        tag: String,
    }

    /// Sends the whole event as one request tagged with the configured tag.
    struct TagMapper {
        tag: String,
    }

    struct FirstReply;

    impl ResponseBuilder for FirstReply {
        fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
            match tuples.into_iter().next() {
                Some(tuple) => Ok(Acknowledgement::Reply(tuple.outcome?)),
                None => Ok(Acknowledgement::Empty),
            }
        }
    }

    impl EventMapper for TagMapper {
        fn map_event(&self, event: Value, _: &InvocationContext) -> AdapterResult<MappedEvent> {
            let request = OutgoingRequest::new("1", json!({ "tag": self.tag }), event);
            Ok(MappedEvent::new("tag", vec![request], FirstReply))
        }
    }

    impl ConfigurableMapper for TagMapper {
        type Config = TagConfig;

        fn name() -> &'static str {
            "tag"
        }

        fn from_config(config: TagConfig) -> AdapterResult<Self> {
            Ok(Self { tag: config.tag })
        }
    }

    async fn tagged() -> &'static str {
        "tagged"
    }

    async fn fallback(data: Value) -> Value {
        data
    }

    fn config_with_tag(tag: &str) -> SwitchyardConfig {
        let mut config = SwitchyardConfig::default();
        config.adapters.insert(
            "tag".into(),
            figment::value::Value::serialize(json!({ "tag": tag })).unwrap(),
        );
        config
    }

    #[test]
    fn test_mapper_from_adapter_section() {
        let runtime = SwitchyardRuntime::<TagMapper>::with_mapper(config_with_tag("orders")).unwrap();
        assert_eq!(runtime.mapper().tag, "orders");

        let runtime =
            SwitchyardRuntime::<TagMapper>::with_mapper(SwitchyardConfig::default()).unwrap();
        assert_eq!(runtime.mapper().tag, "");
    }

    #[test]
    fn test_bad_adapter_section() {
        let mut config = SwitchyardConfig::default();
        config.adapters.insert(
            "tag".into(),
            figment::value::Value::serialize(json!({ "tag": [1, 2] })).unwrap(),
        );
        let err = SwitchyardRuntime::<TagMapper>::with_mapper(config)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::AdapterSection { ref adapter, .. }) if adapter == "tag"
        ));
    }

    #[tokio::test]
    async fn test_register_start_dispatch() {
        let runtime = SwitchyardRuntime::<TagMapper>::with_mapper(config_with_tag("orders")).unwrap();
        runtime.register(json!({ "tag": "orders" }), tagged).unwrap();
        runtime.register(CATCH_ALL, fallback).unwrap();
        assert!(matches!(
            runtime.register(CATCH_ALL, fallback),
            Err(RuntimeError::Registry(_))
        ));

        runtime.start().unwrap();
        assert!(runtime.is_running());
        runtime.start().unwrap();

        let ack = runtime
            .process_event(json!({ "n": 1 }), InvocationContext::new())
            .await
            .unwrap();
        assert_eq!(ack, Acknowledgement::Reply(json!("tagged")));

        assert!(matches!(
            runtime.register("late", fallback),
            Err(RuntimeError::AlreadyStarted)
        ));
        runtime.shutdown().await;
        assert!(!runtime.is_running());
        assert!(matches!(runtime.start(), Err(RuntimeError::Stopped)));
    }

    #[tokio::test]
    async fn test_dispatch_before_start_has_no_consumer() {
        let runtime = SwitchyardRuntime::from_config(
            SwitchyardConfig::default(),
            TagMapper { tag: "x".into() },
        );
        runtime.register(CATCH_ALL, fallback).unwrap();
        let err = runtime
            .process_event(json!({}), InvocationContext::new())
            .await
            .unwrap_err();
        let DispatchError::Correlation(err) = err else {
            panic!("expected a correlation error");
        };
        assert!(err.is_no_consumer());
    }

    #[test]
    fn test_builder_validates_config() {
        let mut overrides = SwitchyardConfig::default();
        overrides.logging.output = crate::config::LogOutput::File;
        let err = SwitchyardRuntime::builder()
            .search_path("does/not/exist")
            .without_env()
            .merge(overrides)
            .build(TagMapper { tag: String::new() })
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::Invalid(_))
        ));
    }
}
