//! Shared HTTP transport used by every service handle.
//!
//! [`Transport`] owns one [`ReqwestClient`], the normalized base URL, and the interceptor chain
//! assembled from [`ClientConfig`]. Cloning a transport is cheap; every clone shares the same
//! connection pool and [`ResponseMetadataSlot`].
//!
//! Calls follow the unary JSON shape: `POST {base_url}/{service}/{method}` with a JSON body.
//! Non-success responses carrying a JSON `{ "code", "message" }` body surface as
//! [`Error::Rpc`]; other failures fall back to a code derived from the HTTP status.

pub mod interceptor;

pub use interceptor::*;

// crates.io
use reqwest::{
	StatusCode,
	header::{ACCEPT, CONTENT_TYPE, HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	config::{ClientConfig, HttpVersion},
	error::{ConfigError, DecodeError, TransportError},
	obs::{self, RpcOutcome, RpcSpan},
	service::ServiceKind,
};

const APPLICATION_JSON: &str = "application/json";
const CONNECT_PROTOCOL_VERSION: &str = "connect-protocol-version";
const USER_AGENT: &str = concat!("admiral-sdk-rs/", env!("CARGO_PKG_VERSION"));

/// Captures metadata from the most recent HTTP response.
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the API, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot holding the [`ResponseMetadata`] of the latest call.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}

	/// Returns a copy of the captured metadata without consuming it.
	pub fn peek(&self) -> Option<ResponseMetadata> {
		self.0.lock().clone()
	}
}

/// Error body returned by the API for failed calls.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

struct TransportInner {
	client: ReqwestClient,
	base_url: String,
	interceptors: InterceptorChain,
	last_response: ResponseMetadataSlot,
}

/// One shared HTTP transport: client, base URL, and interceptor chain.
#[derive(Clone)]
pub struct Transport(Arc<TransportInner>);
impl Transport {
	/// Builds a transport whose reqwest client honors the configured HTTP version.
	pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
		let builder = ReqwestClient::builder().user_agent(USER_AGENT);
		let builder = match config.http_version() {
			HttpVersion::Http1_1 => builder.http1_only(),
			HttpVersion::Http2 => builder.http2_prior_knowledge(),
		};

		Self::with_client(builder.build()?, config)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// The client's own protocol settings win over [`ClientConfig::http_version`].
	pub fn with_client(client: ReqwestClient, config: &ClientConfig) -> Result<Self, ConfigError> {
		let interceptors = assemble_interceptors(config)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(
			base_url = config.base_url(),
			http_version = %config.http_version(),
			interceptors = ?interceptors.iter().map(|i| i.name()).collect::<Vec<_>>(),
			"assembled transport"
		);

		Ok(Self(Arc::new(TransportInner {
			client,
			base_url: config.base_url().to_owned(),
			interceptors,
			last_response: ResponseMetadataSlot::default(),
		})))
	}

	/// Base URL without a trailing slash.
	pub fn base_url(&self) -> &str {
		&self.0.base_url
	}

	/// Labels of the active interceptors, in chain order.
	pub fn interceptor_names(&self) -> Vec<&'static str> {
		self.0.interceptors.iter().map(|interceptor| interceptor.name()).collect()
	}

	/// Metadata recorded by the most recent completed call.
	pub fn last_response(&self) -> Option<ResponseMetadata> {
		self.0.last_response.peek()
	}

	/// Returns `true` if both handles share the same underlying transport.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	/// Resolves the endpoint URL for `service`/`method`.
	pub fn endpoint(&self, service: &str, method: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}/{service}/{method}", self.0.base_url);

		Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl { url: raw, source })
	}

	/// Issues a unary call to `method` on the `kind` service and decodes the JSON response.
	///
	/// Spans and metrics are labeled with [`ServiceKind::as_str`]; request paths and
	/// [`Error::Rpc`] carry the fully qualified service name.
	pub async fn unary<Req, Resp>(
		&self,
		kind: ServiceKind,
		method: &str,
		message: &Req,
	) -> Result<Resp>
	where
		Req: ?Sized + Serialize,
		Resp: DeserializeOwned,
	{
		let span = RpcSpan::new(kind, method);

		obs::record_rpc_outcome(kind, RpcOutcome::Attempt);

		let result = span.instrument(self.dispatch(kind.service_name(), method, message)).await;

		obs::record_rpc_outcome(kind, RpcOutcome::of(&result));

		#[cfg(feature = "tracing")]
		if let Err(e) = &result {
			tracing::warn!(service = kind.as_str(), method, error = %e, "call failed");
		}

		result
	}

	async fn dispatch<Req, Resp>(
		&self,
		service: &'static str,
		method: &str,
		message: &Req,
	) -> Result<Resp>
	where
		Req: ?Sized + Serialize,
		Resp: DeserializeOwned,
	{
		let url = self.endpoint(service, method)?;
		let body = serde_json::to_vec(message).map_err(DecodeError::Encode)?;
		let mut request = self
			.0
			.client
			.post(url)
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.header(ACCEPT, APPLICATION_JSON)
			.header(CONNECT_PROTOCOL_VERSION, "1")
			.body(body)
			.build()
			.map_err(TransportError::from)?;

		for interceptor in &self.0.interceptors {
			interceptor.intercept(&mut request);
		}

		self.0.last_response.take();

		let response = self.0.client.execute(request).await.map_err(TransportError::from)?;
		let status = response.status();
		let retry_after = parse_retry_after(response.headers());

		self.0.last_response.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

		let bytes = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(rpc_error(service, method, status, &bytes));
		}

		decode_response(status, &bytes)
	}
}
impl Debug for Transport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Transport")
			.field("base_url", &self.0.base_url)
			.field("interceptors", &self.interceptor_names())
			.finish()
	}
}

fn decode_response<Resp>(status: StatusCode, bytes: &[u8]) -> Result<Resp>
where
	Resp: DeserializeOwned,
{
	// Empty messages may be sent as an empty body.
	let bytes = if bytes.iter().all(u8::is_ascii_whitespace) { b"{}".as_slice() } else { bytes };
	let mut de = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Response { source, status: status.as_u16() }.into())
}

fn rpc_error(service: &'static str, method: &str, status: StatusCode, bytes: &[u8]) -> Error {
	let body = serde_json::from_slice::<RpcErrorBody>(bytes).ok();
	let code = body
		.as_ref()
		.and_then(|body| body.code.clone())
		.unwrap_or_else(|| code_for_status(status).to_owned());
	let message = body.and_then(|body| body.message).unwrap_or_else(|| {
		String::from_utf8_lossy(bytes).chars().take(256).collect::<String>().trim().to_owned()
	});

	Error::Rpc { service, method: method.to_owned(), code, message, status: status.as_u16() }
}

/// Maps an HTTP status onto an RPC code when the body carries none.
fn code_for_status(status: StatusCode) -> &'static str {
	match status.as_u16() {
		400 => "invalid_argument",
		401 => "unauthenticated",
		403 => "permission_denied",
		404 => "unimplemented",
		408 => "deadline_exceeded",
		409 => "aborted",
		412 => "failed_precondition",
		429 | 502 | 503 | 504 => "unavailable",
		500 => "internal",
		_ => "unknown",
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// crates.io
	use reqwest::header::HeaderValue;
	// self
	use super::*;

	fn transport(base_url: &str) -> Transport {
		let config = ClientConfig::builder()
			.base_url(base_url)
			.build()
			.expect("Transport configuration should resolve.");

		Transport::new(&config).expect("Transport should build.")
	}

	#[test]
	fn endpoint_joins_base_service_and_method() {
		let transport = transport("https://api.admiral.io/rpc/");
		let url = transport
			.endpoint("admiral.cluster.v1.ClusterService", "ListClusters")
			.expect("Endpoint should resolve.");

		assert_eq!(
			url.as_str(),
			"https://api.admiral.io/rpc/admiral.cluster.v1.ClusterService/ListClusters"
		);
	}

	#[test]
	fn clones_share_one_transport() {
		let transport = transport("https://api.admiral.io");
		let clone = transport.clone();

		assert!(transport.ptr_eq(&clone));
		assert_eq!(clone.interceptor_names(), ["timeout"]);
		assert!(clone.last_response().is_none());
	}

	#[test]
	fn retry_after_parses_seconds_and_ignores_garbage() {
		let mut headers = HeaderMap::new();

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(7)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("later"));

		assert_eq!(parse_retry_after(&headers), None);

		headers.insert(RETRY_AFTER, HeaderValue::from_static("18446744073709551615"));

		assert_eq!(parse_retry_after(&headers), None);
	}

	#[test]
	fn rpc_errors_prefer_body_then_status() {
		let from_body = rpc_error(
			"admiral.user.v1.UserService",
			"GetUser",
			StatusCode::NOT_FOUND,
			br#"{"code":"not_found","message":"user u-1 does not exist"}"#,
		);

		assert!(matches!(
			from_body,
			Error::Rpc { ref code, ref message, status: 404, .. }
				if code == "not_found" && message == "user u-1 does not exist"
		));

		let from_status = rpc_error(
			"admiral.user.v1.UserService",
			"GetUser",
			StatusCode::SERVICE_UNAVAILABLE,
			b"upstream down",
		);

		assert!(matches!(
			from_status,
			Error::Rpc { ref code, ref message, status: 503, .. }
				if code == "unavailable" && message == "upstream down"
		));
	}

	#[test]
	fn empty_success_bodies_decode_as_empty_messages() {
		let decoded: BTreeMap<String, String> =
			decode_response(StatusCode::OK, b"").expect("Empty body should decode.");

		assert!(decoded.is_empty());

		let err = decode_response::<BTreeMap<String, u32>>(StatusCode::OK, br#"{"n":"x"}"#)
			.expect_err("Type mismatch should fail.");

		assert!(matches!(err, Error::Decode(DecodeError::Response { status: 200, .. })));
	}
}
