// crates.io
use nomad_access_broker::reqwest::{Client, redirect::Policy};

/// Builds a login client that trusts the self-signed certificates `httpmock` serves over HTTPS.
pub fn insecure_client() -> Client {
	Client::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Insecure reqwest client for mock servers should build.")
}
