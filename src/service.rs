//! Per-service handles sharing one [`Transport`].
//!
//! Each Admiral API service gets its own handle type so call sites read as
//! `client.cluster().unary("ListClusters", &request)`. Handles are cheap to clone and carry
//! nothing but the fully qualified service name and a transport clone; message types and
//! method catalogs live with the generated API definitions.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, http::Transport};

macro_rules! def_service {
	($name:ident, $kind:ident, $fqn:literal, $doc:literal) => {
		#[doc = $doc]
		#[derive(Clone, Debug)]
		pub struct $name {
			transport: Transport,
		}
		impl $name {
			/// Issues a unary call to `method` on this service.
			pub async fn unary<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp>
			where
				Req: ?Sized + Serialize,
				Resp: DeserializeOwned,
			{
				self.transport.unary(Self::KIND, method, request).await
			}
		}
		impl RpcService for $name {
			const KIND: ServiceKind = ServiceKind::$kind;
			const SERVICE_NAME: &'static str = $fqn;

			fn new(transport: Transport) -> Self {
				Self { transport }
			}

			fn transport(&self) -> &Transport {
				&self.transport
			}
		}
	};
}

/// Common surface of every service handle.
pub trait RpcService
where
	Self: Sized + Send + Sync,
{
	/// Service discriminant.
	const KIND: ServiceKind;
	/// Fully qualified RPC service name used in request paths.
	const SERVICE_NAME: &'static str;

	/// Builds a handle over `transport`.
	fn new(transport: Transport) -> Self;

	/// Transport shared with the owning client.
	fn transport(&self) -> &Transport;

	/// Fully qualified RPC service name used in request paths.
	fn service_name(&self) -> &'static str {
		Self::SERVICE_NAME
	}
}

/// Services exposed by the Admiral API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
	/// `ClusterService`.
	Cluster,
	/// `RunnerService`.
	Runner,
	/// `UserService`.
	User,
	/// `ApplicationService`.
	Application,
	/// `ComponentService`.
	Component,
	/// `ConnectionService`.
	Connection,
	/// `DeploymentService`.
	Deployment,
	/// `EnvironmentService`.
	Environment,
	/// `HealthcheckService`.
	Healthcheck,
	/// `SourceService`.
	Source,
	/// `StateService`.
	State,
	/// `VariableService`.
	Variable,
}
impl ServiceKind {
	/// Every service, in declaration order.
	pub const ALL: [ServiceKind; 12] = [
		ServiceKind::Cluster,
		ServiceKind::Runner,
		ServiceKind::User,
		ServiceKind::Application,
		ServiceKind::Component,
		ServiceKind::Connection,
		ServiceKind::Deployment,
		ServiceKind::Environment,
		ServiceKind::Healthcheck,
		ServiceKind::Source,
		ServiceKind::State,
		ServiceKind::Variable,
	];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ServiceKind::Cluster => "cluster",
			ServiceKind::Runner => "runner",
			ServiceKind::User => "user",
			ServiceKind::Application => "application",
			ServiceKind::Component => "component",
			ServiceKind::Connection => "connection",
			ServiceKind::Deployment => "deployment",
			ServiceKind::Environment => "environment",
			ServiceKind::Healthcheck => "healthcheck",
			ServiceKind::Source => "source",
			ServiceKind::State => "state",
			ServiceKind::Variable => "variable",
		}
	}

	/// Fully qualified RPC service name.
	pub const fn service_name(self) -> &'static str {
		match self {
			ServiceKind::Cluster => ClusterClient::SERVICE_NAME,
			ServiceKind::Runner => RunnerClient::SERVICE_NAME,
			ServiceKind::User => UserClient::SERVICE_NAME,
			ServiceKind::Application => ApplicationClient::SERVICE_NAME,
			ServiceKind::Component => ComponentClient::SERVICE_NAME,
			ServiceKind::Connection => ConnectionClient::SERVICE_NAME,
			ServiceKind::Deployment => DeploymentClient::SERVICE_NAME,
			ServiceKind::Environment => EnvironmentClient::SERVICE_NAME,
			ServiceKind::Healthcheck => HealthcheckClient::SERVICE_NAME,
			ServiceKind::Source => SourceClient::SERVICE_NAME,
			ServiceKind::State => StateClient::SERVICE_NAME,
			ServiceKind::Variable => VariableClient::SERVICE_NAME,
		}
	}
}
impl Display for ServiceKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

def_service! { ClusterClient, Cluster, "admiral.cluster.v1.ClusterService", "Handle for the cluster service." }
def_service! { RunnerClient, Runner, "admiral.runner.v1.RunnerService", "Handle for the runner service." }
def_service! { UserClient, User, "admiral.user.v1.UserService", "Handle for the user service." }
def_service! { ApplicationClient, Application, "admiral.application.v1.ApplicationService", "Handle for the application service." }
def_service! { ComponentClient, Component, "admiral.component.v1.ComponentService", "Handle for the component service." }
def_service! { ConnectionClient, Connection, "admiral.connection.v1.ConnectionService", "Handle for the connection service." }
def_service! { DeploymentClient, Deployment, "admiral.deployment.v1.DeploymentService", "Handle for the deployment service." }
def_service! { EnvironmentClient, Environment, "admiral.environment.v1.EnvironmentService", "Handle for the environment service." }
def_service! { HealthcheckClient, Healthcheck, "admiral.healthcheck.v1.HealthcheckService", "Handle for the healthcheck service." }
def_service! { SourceClient, Source, "admiral.source.v1.SourceService", "Handle for the source service." }
def_service! { StateClient, State, "admiral.state.v1.StateService", "Handle for the state service." }
def_service! { VariableClient, Variable, "admiral.variable.v1.VariableService", "Handle for the variable service." }
