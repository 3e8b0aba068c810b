//! Issues a healthcheck call through the typed client against a local mock server.
//!
//! Configuration is read from the `ADMIRAL_*` environment variables first, then the base URL
//! is pointed at the mock so the demo runs offline.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use admiral_sdk::{
	client::AdmiralClient,
	config::{ClientConfigBuilder, HttpVersion},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let check_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/admiral.healthcheck.v1.HealthcheckService/Check")
				.header("x-demo", "healthcheck");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "status": "SERVING" }));
		})
		.await;
	let config = ClientConfigBuilder::from_env()?
		.base_url(server.base_url())
		.http_version(HttpVersion::Http1_1)
		.header("x-demo", "healthcheck")
		.build()?;
	let client = AdmiralClient::new(config)?;

	println!("Token check: {:?}", client.validate_token().message());

	let response: Value = client.healthcheck().unary("Check", &json!({})).await?;

	check_mock.assert_async().await;

	println!("Healthcheck response: {response}");
	println!("Last response: {:?}", client.last_response());

	Ok(())
}
