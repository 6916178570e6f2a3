//! Typed wrappers over the platform's device and device-user endpoints.
//!
//! Every wrapper builds its URL from encoded path segments, sends through
//! [`Broker::send`](crate::flows::Broker::send), and decodes the response envelope.

pub mod device;
pub mod envelope;
pub mod model;
pub mod user;

pub use model::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	flows::{Broker, SignedRequest},
	http::PlatformHttpClient,
};

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Sends a signed request and decodes the envelope's `result`.
	pub async fn call<T>(&self, request: SignedRequest) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let response = self.send(request).await?;

		envelope::decode(&response)
	}
}

/// Rejects empty identifiers before they reach a URL.
pub(crate) fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str> {
	if value.trim().is_empty() {
		return Err(Error::InvalidInput { field, reason: "must not be empty" });
	}

	Ok(value)
}
