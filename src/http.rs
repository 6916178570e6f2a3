//! Transport primitives for signed platform calls.
//!
//! The module exposes [`PlatformHttpClient`] alongside the crate-owned [`PlatformRequest`]
//! and [`PlatformResponse`] types so downstream crates (and tests) can plug in a custom HTTP
//! stack without touching signing or token handling. The broker builds and signs the
//! request; the transport only executes it and hands back the status and raw body.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`PlatformHttpClient::execute`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<PlatformResponse, TransportError>> + 'a + Send>>;

/// HTTP methods used by the platform's REST surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `DELETE`.
	Delete,
}
impl HttpMethod {
	/// Returns the method token as it appears on the wire and in the signing string.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Put => "PUT",
			HttpMethod::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<HttpMethod> for reqwest::Method {
	fn from(method: HttpMethod) -> Self {
		match method {
			HttpMethod::Get => reqwest::Method::GET,
			HttpMethod::Post => reqwest::Method::POST,
			HttpMethod::Put => reqwest::Method::PUT,
			HttpMethod::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Fully signed outbound request handed to a transport.
#[derive(Clone, Debug)]
pub struct PlatformRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(String, String)>,
	/// Body bytes; empty for most reads.
	pub body: Vec<u8>,
}
impl PlatformRequest {
	/// Returns the first header value matching `name` case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw platform response. Envelope decoding happens in the endpoint wrappers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw body bytes.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP transports capable of executing signed platform requests.
///
/// The trait is the broker's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared by the refresh loop and every
/// request task, and the returned futures must be `Send` so callers can spawn them.
pub trait PlatformHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes the request and returns the status plus the full body.
	///
	/// Non-success HTTP statuses are not errors at this layer; only failures to obtain a
	/// response are.
	fn execute(&self, request: PlatformRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client with an optional per-request timeout.
	///
	/// `None` keeps reqwest's default of no overall timeout.
	pub fn with_timeout(timeout: Option<StdDuration>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
impl PlatformHttpClient for ReqwestHttpClient {
	fn execute(&self, request: PlatformRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let PlatformRequest { method, url, headers, body } = request;
			let mut builder = client.request(method.into(), url);

			for (name, value) in &headers {
				builder = builder.header(name.as_str(), value.as_str());
			}

			let response = builder.body(body).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(PlatformResponse { status, body })
		})
	}
}
