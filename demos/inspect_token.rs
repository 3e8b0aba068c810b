//! Inspects an Admiral auth token locally, without contacting the API.
//!
//! Pass the token as the first argument or through `ADMIRAL_TOKEN`. A short-lived demo JWT is
//! minted when neither is set.

// std
use std::env;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use admiral_sdk::{auth, config::ENV_TOKEN};

fn demo_token() -> String {
	let exp = (OffsetDateTime::now_utc() + Duration::minutes(15)).unix_timestamp();
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD
		.encode(json!({ "sub": "demo-user", "iss": "https://auth.admiral.io", "exp": exp }).to_string());

	format!("{header}.{payload}.signature")
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let token = env::args().nth(1).or_else(|| env::var(ENV_TOKEN).ok()).unwrap_or_else(demo_token);
	let validation = auth::validate_token(&token);

	match validation.message() {
		None => println!("Token is valid."),
		Some(message) => println!("Token is invalid: {message}"),
	}

	match auth::token_info(&token) {
		Some(info) => {
			println!("subject: {}", info.claims.sub.as_deref().unwrap_or("-"));
			println!("issuer: {}", info.claims.iss.as_deref().unwrap_or("-"));
			println!("expires at: {:?}", info.expires_at);
			println!("not before: {:?}", info.not_before);
			println!("expired: {}, active: {}", info.is_expired, info.is_active);
			println!("expires in: {}", info.expires_in);
		},
		None => println!("Token is opaque; no claims to show."),
	}

	Ok(())
}
