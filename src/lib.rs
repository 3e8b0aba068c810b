//! Typed Admiral API client: lazily built per-service handles over one shared,
//! interceptor-aware transport, plus JWT claim inspection for the configured credential.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod service;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{
		client::AdmiralClient,
		config::{ClientConfig, ClientConfigBuilder, HttpVersion},
	};

	/// Encodes an unsigned JWT whose payload is the provided JSON value.
	pub fn encode_test_jwt(payload: &serde_json::Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let body = URL_SAFE_NO_PAD.encode(payload.to_string());

		format!("{header}.{body}.signature")
	}

	/// Returns a builder pointed at `base_url` over plain HTTP/1.1, as served by `httpmock`.
	pub fn test_config_builder(base_url: &str) -> ClientConfigBuilder {
		ClientConfig::builder().base_url(base_url).http_version(HttpVersion::Http1_1)
	}

	/// Resolves `builder` and builds a client over it.
	pub fn build_test_client_from(builder: ClientConfigBuilder) -> AdmiralClient {
		let config = builder.build().expect("Test client configuration should resolve.");

		AdmiralClient::new(config).expect("Test client should build.")
	}

	/// Builds a client pointed at `base_url` that authenticates with `token`.
	pub fn build_test_client(base_url: &str, token: Option<&str>) -> AdmiralClient {
		let builder = test_config_builder(base_url);

		build_test_client_from(match token {
			Some(token) => builder.auth_token(token),
			None => builder,
		})
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
