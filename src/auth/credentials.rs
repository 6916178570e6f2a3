//! Client identity used to sign every platform request.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Project-level client identifier plus the HMAC signing secret.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClientCredentials {
	/// Client identifier sent in the `client_id` header and prefixed to every signature input.
	pub client_id: String,
	/// HMAC-SHA256 key; never leaves the process.
	pub secret: TokenSecret,
}
impl ClientCredentials {
	/// Pairs a client identifier with its signing secret.
	pub fn new(client_id: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self { client_id: client_id.into(), secret: secret.into() }
	}
}
