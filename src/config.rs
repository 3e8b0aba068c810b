//! Client configuration: user-supplied fields merged over SDK defaults.
//!
//! [`ClientConfigBuilder`] collects optional overrides and [`ClientConfigBuilder::build`]
//! validates them into an immutable [`ClientConfig`]. Defaults target the hosted Admiral API
//! over HTTP/2 with a 30 second request timeout and bearer authentication.

// std
use std::env;
// crates.io
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Base URL used when none is supplied.
pub const DEFAULT_BASE_URL: &str = "https://api.admiral.io";
/// Request timeout used when none is supplied.
pub const DEFAULT_TIMEOUT: Duration = Duration::milliseconds(30_000);

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "ADMIRAL_BASE_URL";
/// Environment variable holding the auth token.
pub const ENV_TOKEN: &str = "ADMIRAL_TOKEN";
/// Environment variable holding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "ADMIRAL_TIMEOUT_MS";
/// Environment variable holding the HTTP version (`1.1` or `2`).
pub const ENV_HTTP_VERSION: &str = "ADMIRAL_HTTP_VERSION";
/// Environment variable holding the auth scheme (`bearer` or `token`).
pub const ENV_AUTH_SCHEME: &str = "ADMIRAL_AUTH_SCHEME";

/// HTTP protocol version negotiated with the API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpVersion {
	/// HTTP/1.1 only.
	#[serde(rename = "1.1")]
	Http1_1,
	/// HTTP/2 with prior knowledge.
	#[default]
	#[serde(rename = "2")]
	Http2,
}
impl HttpVersion {
	/// Returns the configuration label (`1.1` or `2`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Http1_1 => "1.1",
			Self::Http2 => "2",
		}
	}
}
impl Display for HttpVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for HttpVersion {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim() {
			"1.1" => Ok(Self::Http1_1),
			"2" => Ok(Self::Http2),
			other => Err(ConfigError::UnsupportedHttpVersion { value: other.to_owned() }),
		}
	}
}

/// Authorization scheme used to present the auth token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
	/// `Authorization: Bearer <token>`.
	#[default]
	Bearer,
	/// `Authorization: Token <token>`.
	Token,
}
impl AuthScheme {
	/// Returns the configuration label (`bearer` or `token`).
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Bearer => "bearer",
			Self::Token => "token",
		}
	}

	/// Returns the prefix written before the credential in the `Authorization` header.
	pub const fn header_prefix(self) -> &'static str {
		match self {
			Self::Bearer => "Bearer",
			Self::Token => "Token",
		}
	}

	/// Renders the `Authorization` header value for `token`.
	pub fn header_value(self, token: &TokenSecret) -> Result<HeaderValue, ConfigError> {
		let raw = format!("{} {}", self.header_prefix(), token.expose());
		let mut value = HeaderValue::try_from(raw).map_err(|_| ConfigError::InvalidAuthToken)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthScheme {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();

		if trimmed.eq_ignore_ascii_case("bearer") {
			Ok(Self::Bearer)
		} else if trimmed.eq_ignore_ascii_case("token") {
			Ok(Self::Token)
		} else {
			Err(ConfigError::UnsupportedAuthScheme { value: trimmed.to_owned() })
		}
	}
}

/// Resolved, validated client configuration.
#[derive(Clone)]
pub struct ClientConfig {
	base_url: String,
	timeout: Duration,
	http_version: HttpVersion,
	auth_scheme: AuthScheme,
	auth_token: Option<TokenSecret>,
	headers: HeaderMap,
}
impl ClientConfig {
	/// Returns an empty builder; unset fields resolve to the SDK defaults.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Base URL without a trailing slash.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Per-request timeout.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// HTTP version used by the transport.
	pub fn http_version(&self) -> HttpVersion {
		self.http_version
	}

	/// Authorization scheme used to present the token.
	pub fn auth_scheme(&self) -> AuthScheme {
		self.auth_scheme
	}

	/// Configured credential, if any.
	pub fn auth_token(&self) -> Option<&TokenSecret> {
		self.auth_token.as_ref()
	}

	/// Custom headers attached to every request.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_owned(),
			timeout: DEFAULT_TIMEOUT,
			http_version: HttpVersion::default(),
			auth_scheme: AuthScheme::default(),
			auth_token: None,
			headers: HeaderMap::new(),
		}
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.field("http_version", &self.http_version)
			.field("auth_scheme", &self.auth_scheme)
			.field("auth_token_set", &self.auth_token.is_some())
			.field("headers", &self.headers.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Clone, Debug, Default)]
pub struct ClientConfigBuilder {
	base_url: Option<String>,
	timeout: Option<Duration>,
	http_version: Option<HttpVersion>,
	auth_scheme: Option<AuthScheme>,
	auth_token: Option<TokenSecret>,
	headers: BTreeMap<String, String>,
}
impl ClientConfigBuilder {
	/// Seeds a builder from `ADMIRAL_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Seeds a builder from an arbitrary variable lookup.
	///
	/// Unset or empty variables are skipped; malformed values fail.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let mut builder = Self::default();

		if let Some(url) = read(ENV_BASE_URL) {
			builder = builder.base_url(url);
		}
		if let Some(token) = read(ENV_TOKEN) {
			builder = builder.auth_token(token);
		}
		if let Some(raw) = read(ENV_TIMEOUT_MS) {
			let ms = raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidEnv {
				name: ENV_TIMEOUT_MS,
				reason: e.to_string(),
			})?;

			builder = builder.timeout_ms(ms);
		}
		if let Some(raw) = read(ENV_HTTP_VERSION) {
			let version = raw.parse().map_err(|e: ConfigError| ConfigError::InvalidEnv {
				name: ENV_HTTP_VERSION,
				reason: e.to_string(),
			})?;

			builder = builder.http_version(version);
		}
		if let Some(raw) = read(ENV_AUTH_SCHEME) {
			let scheme = raw.parse().map_err(|e: ConfigError| ConfigError::InvalidEnv {
				name: ENV_AUTH_SCHEME,
				reason: e.to_string(),
			})?;

			builder = builder.auth_scheme(scheme);
		}

		Ok(builder)
	}

	/// Overrides the base URL.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the per-request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the per-request timeout in milliseconds.
	pub fn timeout_ms(self, ms: u64) -> Self {
		self.timeout(Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX)))
	}

	/// Overrides the HTTP version.
	pub fn http_version(mut self, version: HttpVersion) -> Self {
		self.http_version = Some(version);

		self
	}

	/// Overrides the authorization scheme.
	pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
		self.auth_scheme = Some(scheme);

		self
	}

	/// Sets the auth token; an empty string clears it.
	pub fn auth_token(mut self, token: impl Into<String>) -> Self {
		let token = token.into();

		self.auth_token = if token.is_empty() { None } else { Some(TokenSecret::new(token)) };

		self
	}

	/// Adds or replaces a custom header sent with every request.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Adds or replaces several custom headers.
	pub fn headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (name, value) in headers {
			self.headers.insert(name.into(), value.into());
		}

		self
	}

	/// Merges the supplied fields over the defaults and validates the result.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let defaults = ClientConfig::default();
		let base_url = match self.base_url {
			Some(url) => normalize_base_url(&url)?,
			None => defaults.base_url,
		};
		let timeout = self.timeout.unwrap_or(defaults.timeout);

		if !timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout { timeout });
		}

		let auth_scheme = self.auth_scheme.unwrap_or(defaults.auth_scheme);

		if let Some(token) = self.auth_token.as_ref() {
			auth_scheme.header_value(token)?;
		}

		let mut headers = HeaderMap::with_capacity(self.headers.len());

		for (name, value) in self.headers {
			let header_name = HeaderName::from_bytes(name.as_bytes())
				.map_err(|e| ConfigError::invalid_header(&name, e))?;
			let header_value =
				HeaderValue::try_from(value).map_err(|e| ConfigError::invalid_header(&name, e))?;

			headers.insert(header_name, header_value);
		}

		Ok(ClientConfig {
			base_url,
			timeout,
			http_version: self.http_version.unwrap_or(defaults.http_version),
			auth_scheme,
			auth_token: self.auth_token,
			headers,
		})
	}
}

/// Validates URL syntax and strips a single trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
	let parsed = Url::parse(raw)
		.map_err(|source| ConfigError::InvalidBaseUrl { url: raw.to_owned(), source })?;

	if parsed.cannot_be_a_base() {
		return Err(ConfigError::UnsupportedBaseUrl { url: raw.to_owned() });
	}

	Ok(raw.strip_suffix('/').unwrap_or(raw).to_owned())
}
