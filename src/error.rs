//! Broker-level error types shared across signing, token flows, and endpoint wrappers.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be decoded into the expected envelope.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Request payload could not be serialized to JSON.
	#[error("Request body could not be encoded.")]
	Encode(#[source] serde_json::Error),

	/// Platform answered with `success=false`.
	#[error("Platform rejected the request (code: {}): {}.", code.as_deref().unwrap_or("none"), msg.as_deref().unwrap_or("no message"))]
	Api {
		/// Platform error code, when supplied.
		code: Option<String>,
		/// Platform error message, when supplied.
		msg: Option<String>,
	},
	/// No access token is available to attach to an outbound request.
	#[error("No access token is available; the initial token has not been issued yet.")]
	TokenUnavailable,
	/// A refresh was attempted before any token was issued.
	#[error("Cannot refresh before an initial token with a refresh token has been issued.")]
	NoInitialToken,
	/// The token endpoint reported success without an access token.
	#[error("Token endpoint returned an empty access token.")]
	EmptyAccessToken,
	/// The token lifetime cannot be represented as an absolute instant.
	#[error("Token lifetime of {seconds} seconds is out of range.")]
	InvalidExpiry {
		/// Lifetime reported by the platform.
		seconds: i64,
	},
	/// Caller-supplied endpoint argument failed validation.
	#[error("Invalid {field}: {reason}.")]
	InvalidInput {
		/// Argument name.
		field: &'static str,
		/// Validation failure summary.
		reason: &'static str,
	},
}

/// Configuration and validation failures raised by the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Platform host is not a valid base URL.
	#[error("Platform host `{host}` is not a valid URL.")]
	InvalidHost {
		/// Host value as configured.
		host: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Platform host cannot carry path segments (e.g. `mailto:` style URLs).
	#[error("Platform host `{host}` cannot be used as a base URL.")]
	CannotBeBase {
		/// Host value as configured.
		host: String,
	},
	/// Settings could not be read or deserialized.
	#[error("Settings could not be loaded.")]
	Settings(#[from] config::ConfigError),
	/// Log subscriber could not be installed.
	#[error("Logger could not be initialised: {message}.")]
	Logger {
		/// Human-readable failure summary.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Malformed platform response.
#[derive(Debug, ThisError)]
#[error("Platform returned a malformed response body (status: {}).", status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()))]
pub struct DecodeError {
	/// Structured parsing failure, including the JSON path that failed.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
	/// HTTP status code, when available.
	pub status: Option<u16>,
}
