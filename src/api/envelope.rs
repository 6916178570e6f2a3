//! Platform response envelope: `{success, code?, msg?, t, result}`.
//!
//! Decoding is two-phase. The header is read first so a `success=false` reply surfaces as
//! [`Error::Api`] even when its `result` would not fit the expected shape; the payload is
//! only decoded for successful replies.

// crates.io
use serde::{Deserializer, de::DeserializeOwned};
// self
use crate::{_prelude::*, error::DecodeError, http::PlatformResponse};

/// Envelope fields shared by every platform reply.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct EnvelopeHeader {
	/// Whether the platform accepted the call.
	pub success: bool,
	/// Error code; the platform sends it as a number or a string.
	#[serde(default, deserialize_with = "code_as_string")]
	pub code: Option<String>,
	/// Error message.
	#[serde(default)]
	pub msg: Option<String>,
	/// Server timestamp in Unix milliseconds.
	#[serde(default)]
	pub t: i64,
}

#[derive(Deserialize)]
struct Payload<T> {
	result: T,
}

/// Decodes a reply into its `result`, mapping `success=false` onto [`Error::Api`].
pub fn decode<T>(response: &PlatformResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	let header = decode_json::<EnvelopeHeader>(response)?;

	if !header.success {
		tracing::error!(
			status = response.status,
			code = header.code.as_deref().unwrap_or_default(),
			msg = header.msg.as_deref().unwrap_or_default(),
			"Platform rejected the request."
		);

		return Err(Error::Api { code: header.code, msg: header.msg });
	}

	Ok(decode_json::<Payload<T>>(response)?.result)
}

fn decode_json<T>(response: &PlatformResponse) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		tracing::error!(
			status = response.status,
			path = %source.path(),
			"Platform response did not match the expected shape."
		);

		DecodeError { source, status: Some(response.status) }
	})
}

fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Code {
		Number(i64),
		Text(String),
	}

	Ok(Option::<Code>::deserialize(deserializer)?.map(|code| match code {
		Code::Number(value) => value.to_string(),
		Code::Text(value) => value,
	}))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(body: &str) -> PlatformResponse {
		PlatformResponse { status: 200, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn success_yields_result() {
		let value = decode::<bool>(&response(r#"{"success":true,"t":1588925778000,"result":true}"#))
			.expect("Successful envelope should decode.");

		assert!(value);
	}

	#[test]
	fn failure_maps_to_api_error_with_numeric_code() {
		let err = decode::<bool>(&response(
			r#"{"success":false,"code":1010,"msg":"token invalid","t":1}"#,
		))
		.expect_err("Failed envelope should error.");

		match err {
			Error::Api { code, msg } => {
				assert_eq!(code.as_deref(), Some("1010"));
				assert_eq!(msg.as_deref(), Some("token invalid"));
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn failure_ignores_mismatched_result() {
		let err = decode::<Vec<String>>(&response(
			r#"{"success":false,"code":"2009","msg":"device offline","result":{"x":1}}"#,
		))
		.expect_err("Failed envelope should error.");

		assert!(matches!(err, Error::Api { code: Some(code), .. } if code == "2009"));
	}

	#[test]
	fn malformed_body_reports_path() {
		let err = decode::<bool>(&response(r#"{"success":true,"result":"yes"}"#))
			.expect_err("Mismatched result should error.");

		match err {
			Error::Decode(err) => {
				assert_eq!(err.status, Some(200));
				assert_eq!(err.source.path().to_string(), "result");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn non_json_body_is_a_decode_error() {
		assert!(matches!(decode::<bool>(&response("<html>")), Err(Error::Decode(_))));
	}
}
