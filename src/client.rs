//! Top-level Admiral API client.

// std
use std::sync::OnceLock;
// self
use crate::{
	_prelude::*,
	auth::{self, TokenInfo, TokenValidation},
	config::ClientConfig,
	error::ConfigError,
	http::{ResponseMetadata, Transport},
	service::{
		ApplicationClient, ClusterClient, ComponentClient, ConnectionClient, DeploymentClient,
		EnvironmentClient, HealthcheckClient, RpcService, RunnerClient, SourceClient, StateClient,
		UserClient, VariableClient,
	},
};

/// Entry point to every Admiral API service.
///
/// The client owns one [`Transport`] and hands out service handles over it. Each handle is
/// constructed on first access and the same instance is returned afterwards, so accessors are
/// cheap to call repeatedly. The client is `Send + Sync`; share it behind an [`Arc`] when
/// several tasks need it.
pub struct AdmiralClient {
	config: ClientConfig,
	transport: Transport,
	cluster: OnceLock<ClusterClient>,
	runner: OnceLock<RunnerClient>,
	user: OnceLock<UserClient>,
	application: OnceLock<ApplicationClient>,
	component: OnceLock<ComponentClient>,
	connection: OnceLock<ConnectionClient>,
	deployment: OnceLock<DeploymentClient>,
	environment: OnceLock<EnvironmentClient>,
	healthcheck: OnceLock<HealthcheckClient>,
	source: OnceLock<SourceClient>,
	state: OnceLock<StateClient>,
	variable: OnceLock<VariableClient>,
}
impl AdmiralClient {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
		let transport = Transport::new(&config)?;

		Ok(Self::with_transport(config, transport))
	}

	/// Creates a client with default configuration.
	pub fn with_defaults() -> Result<Self, ConfigError> {
		Self::new(ClientConfig::default())
	}

	/// Creates a client over a caller-provided reqwest client.
	///
	/// Interceptors are still assembled from `config`; only connection-level settings come
	/// from `client`.
	pub fn with_reqwest_client(
		config: ClientConfig,
		client: ReqwestClient,
	) -> Result<Self, ConfigError> {
		let transport = Transport::with_client(client, &config)?;

		Ok(Self::with_transport(config, transport))
	}

	fn with_transport(config: ClientConfig, transport: Transport) -> Self {
		Self {
			config,
			transport,
			cluster: OnceLock::new(),
			runner: OnceLock::new(),
			user: OnceLock::new(),
			application: OnceLock::new(),
			component: OnceLock::new(),
			connection: OnceLock::new(),
			deployment: OnceLock::new(),
			environment: OnceLock::new(),
			healthcheck: OnceLock::new(),
			source: OnceLock::new(),
			state: OnceLock::new(),
			variable: OnceLock::new(),
		}
	}

	/// Resolved configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Transport shared by every service handle.
	pub fn transport(&self) -> &Transport {
		&self.transport
	}

	/// Metadata recorded by the most recent completed call on any service.
	pub fn last_response(&self) -> Option<ResponseMetadata> {
		self.transport.last_response()
	}

	/// Validates the configured auth token locally. Never fails; a missing token is reported
	/// as empty.
	pub fn validate_token(&self) -> TokenValidation {
		auth::validate_token(self.config.auth_token().map_or("", |token| token.expose()))
	}

	/// Summarizes the configured auth token; `None` when it is absent or not a decodable JWT.
	pub fn token_info(&self) -> Option<TokenInfo> {
		self.config.auth_token().and_then(|token| auth::token_info(token.expose()))
	}

	/// Cluster service handle.
	pub fn cluster(&self) -> &ClusterClient {
		self.handle(&self.cluster)
	}

	/// Runner service handle.
	pub fn runner(&self) -> &RunnerClient {
		self.handle(&self.runner)
	}

	/// User service handle.
	pub fn user(&self) -> &UserClient {
		self.handle(&self.user)
	}

	/// Application service handle.
	pub fn application(&self) -> &ApplicationClient {
		self.handle(&self.application)
	}

	/// Component service handle.
	pub fn component(&self) -> &ComponentClient {
		self.handle(&self.component)
	}

	/// Connection service handle.
	pub fn connection(&self) -> &ConnectionClient {
		self.handle(&self.connection)
	}

	/// Deployment service handle.
	pub fn deployment(&self) -> &DeploymentClient {
		self.handle(&self.deployment)
	}

	/// Environment service handle.
	pub fn environment(&self) -> &EnvironmentClient {
		self.handle(&self.environment)
	}

	/// Healthcheck service handle.
	pub fn healthcheck(&self) -> &HealthcheckClient {
		self.handle(&self.healthcheck)
	}

	/// Source service handle.
	pub fn source(&self) -> &SourceClient {
		self.handle(&self.source)
	}

	/// State service handle.
	pub fn state(&self) -> &StateClient {
		self.handle(&self.state)
	}

	/// Variable service handle.
	pub fn variable(&self) -> &VariableClient {
		self.handle(&self.variable)
	}

	fn handle<'a, S>(&'a self, cell: &'a OnceLock<S>) -> &'a S
	where
		S: RpcService,
	{
		cell.get_or_init(|| {
			#[cfg(feature = "tracing")]
			tracing::debug!(service = S::SERVICE_NAME, "constructed service handle");

			S::new(self.transport.clone())
		})
	}
}
impl Debug for AdmiralClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AdmiralClient")
			.field("config", &self.config)
			.field("transport", &self.transport)
			.finish()
	}
}
