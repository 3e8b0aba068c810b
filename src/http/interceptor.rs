//! Request interceptors composed into the transport pipeline.
//!
//! Interceptors run in chain order on every outgoing request, after the transport has built
//! the request and before it is executed. Only the timeout interceptor is unconditional; the
//! headers and authorization interceptors exist only when their configuration does.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::{
	Request,
	header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

/// Shared, type-erased interceptor chain.
pub type InterceptorChain = Vec<Arc<dyn Interceptor>>;

/// Hook that adjusts an outgoing request.
pub trait Interceptor
where
	Self: 'static + Send + Sync,
{
	/// Stable label used in logs and debug output.
	fn name(&self) -> &'static str;

	/// Mutates `request` in place.
	fn intercept(&self, request: &mut Request);
}

/// Bounds every request by the configured timeout.
///
/// A deadline already present on the request is kept when it is shorter.
#[derive(Clone, Debug)]
pub struct TimeoutInterceptor {
	timeout: StdDuration,
}
impl TimeoutInterceptor {
	/// Creates an interceptor enforcing `timeout`.
	pub fn new(timeout: StdDuration) -> Self {
		Self { timeout }
	}

	/// Timeout enforced by this interceptor.
	pub fn timeout(&self) -> StdDuration {
		self.timeout
	}
}
impl Interceptor for TimeoutInterceptor {
	fn name(&self) -> &'static str {
		"timeout"
	}

	fn intercept(&self, request: &mut Request) {
		let deadline = match request.timeout() {
			Some(existing) => (*existing).min(self.timeout),
			None => self.timeout,
		};

		*request.timeout_mut() = Some(deadline);
	}
}

/// Attaches the configured custom headers.
#[derive(Clone, Debug)]
pub struct HeadersInterceptor {
	headers: HeaderMap,
}
impl HeadersInterceptor {
	/// Creates an interceptor that sets every header in `headers`.
	pub fn new(headers: HeaderMap) -> Self {
		Self { headers }
	}
}
impl Interceptor for HeadersInterceptor {
	fn name(&self) -> &'static str {
		"headers"
	}

	fn intercept(&self, request: &mut Request) {
		let target = request.headers_mut();

		for (name, value) in &self.headers {
			target.insert(name.clone(), value.clone());
		}
	}
}

/// Sets the `Authorization` header from the configured credential.
#[derive(Clone)]
pub struct AuthInterceptor {
	value: HeaderValue,
}
impl AuthInterceptor {
	/// Creates an interceptor that sends a pre-rendered, sensitive header value.
	pub fn new(mut value: HeaderValue) -> Self {
		value.set_sensitive(true);

		Self { value }
	}
}
impl Interceptor for AuthInterceptor {
	fn name(&self) -> &'static str {
		"auth"
	}

	fn intercept(&self, request: &mut Request) {
		request.headers_mut().insert(AUTHORIZATION, self.value.clone());
	}
}
impl Debug for AuthInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthInterceptor").field("value", &"<redacted>").finish()
	}
}

/// Builds the interceptor chain for `config`: timeout, then headers, then authorization.
pub fn assemble_interceptors(config: &ClientConfig) -> Result<InterceptorChain, ConfigError> {
	let mut chain: InterceptorChain =
		vec![Arc::new(TimeoutInterceptor::new(config.timeout().unsigned_abs()))];

	if !config.headers().is_empty() {
		chain.push(Arc::new(HeadersInterceptor::new(config.headers().clone())));
	}
	if let Some(token) = config.auth_token() {
		chain.push(Arc::new(AuthInterceptor::new(config.auth_scheme().header_value(token)?)));
	}

	Ok(chain)
}
