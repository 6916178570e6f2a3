//! Token lifecycle and signed dispatch orchestrated by [`Broker`].

pub mod auto_refresh;
pub mod backoff;
mod common;
pub mod dispatch;
pub mod issue;
pub mod refresh;
pub mod schedule;

pub use auto_refresh::*;
pub use backoff::*;
pub use dispatch::*;
pub use schedule::*;

// self
use crate::{
	_prelude::*,
	auth::ClientCredentials,
	error::ConfigError,
	http::{PlatformHttpClient, ReqwestHttpClient},
	obs::LifecycleMetrics,
	store::TokenStore,
};

/// API version segment prefixed to every platform path.
pub const API_VERSION: &str = "v1.0";

/// Coordinates token maintenance and signed calls against one platform project.
///
/// The broker owns the HTTP client, the token store, and the client credentials, so the
/// individual flows (issue, refresh, dispatch, endpoint wrappers) only deal with their own
/// request shapes. Clones share the store, transport, and metrics.
pub struct Broker<C = ReqwestHttpClient>
where
	C: ?Sized + PlatformHttpClient,
{
	/// HTTP client used for every outbound platform request.
	pub http_client: Arc<C>,
	/// Store holding the single active token and the refresh gate.
	pub store: Arc<TokenStore>,
	/// Platform base URL, e.g. `https://openapi.tuyaus.com`.
	pub host: Url,
	/// Client identifier and signing secret.
	pub credentials: ClientCredentials,
	/// Wake-up policy for the refresh loop.
	pub schedule: RefreshSchedule,
	/// Shared counters for issue/refresh outcomes.
	pub metrics: Arc<LifecycleMetrics>,
}
impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Creates a broker that reuses the caller-provided transport.
	pub fn with_http_client(
		host: Url,
		credentials: ClientCredentials,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			store: Default::default(),
			host,
			credentials,
			schedule: RefreshSchedule::default(),
			metrics: Default::default(),
		}
	}

	/// Shares an existing token store instead of the broker's private one.
	pub fn with_store(mut self, store: Arc<TokenStore>) -> Self {
		self.store = store;

		self
	}

	/// Overrides the refresh margin and minimum wake delay.
	pub fn with_schedule(mut self, schedule: RefreshSchedule) -> Self {
		self.schedule = schedule;

		self
	}

	/// Builds `{host}/v1.0/{segments..}`; each segment is percent-encoded.
	pub fn endpoint<I>(&self, segments: I) -> Result<Url>
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
	{
		let mut url = self.host.clone();

		url.set_query(None);
		url.path_segments_mut()
			.map_err(|_| ConfigError::CannotBeBase { host: self.host.to_string() })?
			.pop_if_empty()
			.push(API_VERSION)
			.extend(segments);

		Ok(url)
	}
}
impl Broker<ReqwestHttpClient> {
	/// Creates a broker backed by a default reqwest client.
	pub fn new(host: Url, credentials: ClientCredentials) -> Self {
		Self::with_http_client(host, credentials, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			host: self.host.clone(),
			credentials: self.credentials.clone(),
			schedule: self.schedule,
			metrics: self.metrics.clone(),
		}
	}
}
impl<C> Debug for Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("host", &self.host.as_str())
			.field("client_id", &self.credentials.client_id)
			.field("schedule", &self.schedule)
			.finish()
	}
}

/// Parses the configured platform host into a base URL.
pub fn parse_host(host: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(host)
		.map_err(|source| ConfigError::InvalidHost { host: host.to_owned(), source })?;

	if url.cannot_be_a_base() {
		return Err(ConfigError::CannotBeBase { host: host.to_owned() });
	}

	Ok(url)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn broker(host: &str) -> Broker {
		let host = parse_host(host).expect("Fixture host should parse.");

		Broker::new(host, ClientCredentials::new("client", "secret"))
	}

	#[test]
	fn endpoint_trims_trailing_slash_and_encodes_segments() {
		let broker = broker("https://openapi.example.com/");

		assert_eq!(
			broker.endpoint(["devices", "d1"]).expect("Endpoint should build.").as_str(),
			"https://openapi.example.com/v1.0/devices/d1"
		);
		assert_eq!(
			broker.endpoint(["token", "a/b"]).expect("Endpoint should build.").as_str(),
			"https://openapi.example.com/v1.0/token/a%2Fb"
		);
	}

	#[test]
	fn endpoint_keeps_host_prefix() {
		let broker = broker("https://gateway.example.com/iot");

		assert_eq!(
			broker.endpoint(["devices"]).expect("Endpoint should build.").as_str(),
			"https://gateway.example.com/iot/v1.0/devices"
		);
	}

	#[test]
	fn parse_host_rejects_garbage() {
		assert!(matches!(parse_host("not a url"), Err(ConfigError::InvalidHost { .. })));
		assert!(matches!(parse_host("mailto:ops@example.com"), Err(ConfigError::CannotBeBase { .. })));
	}

	#[test]
	fn debug_hides_secret() {
		let rendered = format!("{:?}", broker("https://openapi.example.com"));

		assert!(rendered.contains("client"));
		assert!(!rendered.contains("\"secret\""));
	}
}
