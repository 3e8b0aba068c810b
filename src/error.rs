//! SDK-level error types shared across configuration, transport, and service calls.

// self
use crate::_prelude::*;

/// SDK-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical SDK error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the expected message.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// Remote service answered with an RPC error.
	#[error("RPC {service}/{method} failed with `{code}`: {message}.")]
	Rpc {
		/// Fully qualified service name.
		service: &'static str,
		/// Method name.
		method: String,
		/// RPC error code (for example `not_found` or `unauthenticated`).
		code: String,
		/// Server-supplied message, possibly empty.
		message: String,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Configuration and validation failures raised while resolving a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Rejected input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL parses but cannot carry RPC paths (e.g. `mailto:`).
	#[error("Base URL `{url}` cannot be used as a request base.")]
	UnsupportedBaseUrl {
		/// Rejected input.
		url: String,
	},
	/// Custom header name or value cannot be sent over HTTP.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as configured.
		name: String,
		/// Underlying header validation failure.
		#[source]
		source: BoxError,
	},
	/// Configured credential contains bytes that are not valid in a header.
	#[error("Auth token cannot be carried in an Authorization header.")]
	InvalidAuthToken,
	/// Timeout must be strictly positive.
	#[error("Timeout must be positive, got {timeout}.")]
	NonPositiveTimeout {
		/// Rejected timeout.
		timeout: Duration,
	},
	/// HTTP version string is not recognized.
	#[error("HTTP version `{value}` is not supported; expected `1.1` or `2`.")]
	UnsupportedHttpVersion {
		/// Rejected input.
		value: String,
	},
	/// Authorization scheme string is not recognized.
	#[error("Auth scheme `{value}` is not supported; expected `bearer` or `token`.")]
	UnsupportedAuthScheme {
		/// Rejected input.
		value: String,
	},
	/// Environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` is invalid: {reason}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Human-readable reason.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Wraps a header validation failure for `name`.
	pub fn invalid_header(
		name: impl Into<String>,
		src: impl 'static + Send + Sync + StdError,
	) -> Self {
		Self::InvalidHeader { name: name.into(), source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, deadlines).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request exceeded its deadline.
	#[error("Request to {url} timed out.")]
	Timeout {
		/// Request URL.
		url: String,
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the Admiral API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the Admiral API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() {
			let url = e.url().map(ToString::to_string).unwrap_or_default();

			Self::Timeout { url, source: Box::new(e) }
		} else {
			Self::network(e)
		}
	}
}

/// Failures decoding request or response payloads.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// Request message could not be encoded as JSON.
	#[error("Request message could not be encoded.")]
	Encode(#[source] serde_json::Error),
	/// Response body could not be parsed into the expected message.
	#[error("Response body is malformed JSON.")]
	Response {
		/// Structured parsing failure with the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
