//! Canonical request signing for the platform's HMAC-SHA256 scheme.
//!
//! Every request is signed over
//!
//! ```text
//! client_id + access_token + t + METHOD "\n" sha256(body) "\n" header_block "\n" canonical_url
//! ```
//!
//! where `header_block` folds the headers named by a `Signature-Headers` directive and
//! `canonical_url` is the path plus the query sorted by key. Token issue and refresh calls
//! sign with an empty access-token segment. The signature is the uppercase hex HMAC keyed
//! with the client secret.
//!
//! Everything here is pure: time and secrets are explicit inputs.

// crates.io
use hmac::{Hmac, Mac};
use percent_encoding::percent_decode_str;
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::TokenSecret, http::HttpMethod};

type HmacSha256 = Hmac<Sha256>;

/// Value of the `sign_method` header.
pub const SIGN_METHOD: &str = "HMAC-SHA256";
/// Header whose colon-separated value lists the headers folded into the signature.
pub const SIGNATURE_HEADERS: &str = "Signature-Headers";

/// Everything the signer reads from an outbound request.
#[derive(Clone, Copy, Debug)]
pub struct SigningInput<'a> {
	/// HTTP method.
	pub method: HttpMethod,
	/// Full request URL; only the path and query participate.
	pub url: &'a Url,
	/// Request headers, consulted only when a `Signature-Headers` directive is present.
	pub headers: &'a [(String, String)],
	/// Exact body bytes sent on the wire.
	pub body: &'a [u8],
	/// Value of the `t` header, in Unix milliseconds.
	pub timestamp_millis: i64,
	/// Client identifier.
	pub client_id: &'a str,
	/// Current access token, or `""` for token issue/refresh calls.
	pub access_token: &'a str,
}

/// Computes the uppercase hex signature for a request.
pub fn sign(input: &SigningInput, secret: &TokenSecret) -> String {
	let canonical = string_to_sign(input.method, input.url, input.headers, input.body);
	let message = format!(
		"{}{}{}{canonical}",
		input.client_id, input.access_token, input.timestamp_millis
	);

	hmac_sha256_upper(message.as_bytes(), secret.expose().as_bytes())
}

/// Builds `METHOD\ncontent_digest\nheader_block\ncanonical_url`.
pub fn string_to_sign(
	method: HttpMethod,
	url: &Url,
	headers: &[(String, String)],
	body: &[u8],
) -> String {
	format!(
		"{}\n{}\n{}\n{}",
		method.as_str(),
		content_digest(body),
		header_block(headers),
		canonical_url(url)
	)
}

/// Lowercase hex SHA-256 of the body; an empty body hashes the empty input.
pub fn content_digest(body: &[u8]) -> String {
	hex::encode(Sha256::digest(body))
}

/// Folds the headers named by the `Signature-Headers` directive, in directive order.
///
/// Header names match case-insensitively; a named header that is absent contributes an
/// empty value. Without a directive the block is empty.
pub fn header_block(headers: &[(String, String)]) -> String {
	let directive = match find_header(headers, SIGNATURE_HEADERS) {
		Some(value) if !value.is_empty() => value,
		_ => return String::new(),
	};

	directive.split(':').fold(String::new(), |mut block, key| {
		block.push_str(key);
		block.push(':');
		block.push_str(find_header(headers, key).unwrap_or_default());
		block.push('\n');

		block
	})
}

/// Decoded path plus the query parameters sorted by key, `key=value` joined with `&`.
///
/// Path and values are signed decoded; when a key repeats, its first value is used.
pub fn canonical_url(url: &Url) -> String {
	let mut params = BTreeMap::new();

	for (key, value) in url.query_pairs() {
		params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
	}

	let mut canonical = percent_decode_str(url.path()).decode_utf8_lossy().into_owned();

	if !params.is_empty() {
		canonical.push('?');

		for (idx, (key, value)) in params.iter().enumerate() {
			if idx > 0 {
				canonical.push('&');
			}

			canonical.push_str(key);
			canonical.push('=');
			canonical.push_str(value);
		}
	}

	canonical
}

/// Converts an instant into the millisecond timestamp carried in the `t` header.
pub fn timestamp_millis(instant: OffsetDateTime) -> i64 {
	i64::try_from(instant.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

fn hmac_sha256_upper(message: &[u8], key: &[u8]) -> String {
	let mut mac =
		<HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length.");

	mac.update(message);

	hex::encode_upper(mac.finalize().into_bytes())
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
	headers
		.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.map(|(_, value)| value.as_str())
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	const CLIENT_ID: &str = "1KAD46OrT9HafiKdsXeg";
	const SECRET: &str = "4OHBOnWOqaEC1mWXOpVL3yV50s0qGSRC";
	const ACCESS: &str = "3f4eda2bdec17232f67c0b188af3eec1";
	const T: i64 = 1_588_925_778_000;
	const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	fn input<'a>(
		method: HttpMethod,
		url: &'a Url,
		headers: &'a [(String, String)],
		body: &'a [u8],
		access_token: &'a str,
	) -> SigningInput<'a> {
		SigningInput {
			method,
			url,
			headers,
			body,
			timestamp_millis: T,
			client_id: CLIENT_ID,
			access_token,
		}
	}

	#[test]
	fn empty_body_digest_matches_sha256_of_nothing() {
		assert_eq!(content_digest(b""), EMPTY_DIGEST);
		assert_eq!(
			content_digest(br#"{"name":"Kitchen"}"#),
			"31f6042b63600f72c2efea4150ec374bba5f0bd48208da671574bc163d516d1d"
		);
	}

	#[test]
	fn query_keys_are_sorted_regardless_of_insertion_order() {
		let a = url("https://openapi.example.com/v1.0/devices?page_size=10&page_no=2");
		let b = url("https://openapi.example.com/v1.0/devices?page_no=2&page_size=10");

		assert_eq!(canonical_url(&a), "/v1.0/devices?page_no=2&page_size=10");
		assert_eq!(canonical_url(&a), canonical_url(&b));
	}

	#[test]
	fn canonical_url_omits_empty_query_and_trailing_separator() {
		assert_eq!(canonical_url(&url("https://h.example/v1.0/devices/d1")), "/v1.0/devices/d1");
		assert_eq!(canonical_url(&url("https://h.example/v1.0/devices?")), "/v1.0/devices");
		assert_eq!(
			canonical_url(&url("https://h.example/v1.0/devices?page_no=1&page_size=20&")),
			"/v1.0/devices?page_no=1&page_size=20"
		);
	}

	#[test]
	fn canonical_url_signs_decoded_path() {
		let url = url("https://h.example/v1.0/devices/a%20b?name=Living%20Room");

		assert_eq!(url.path(), "/v1.0/devices/a%20b");
		assert_eq!(canonical_url(&url), "/v1.0/devices/a b?name=Living Room");
	}

	#[test]
	fn repeated_query_key_uses_first_value() {
		assert_eq!(
			canonical_url(&url("https://h.example/v1.0/x?b=2&a=1&b=3")),
			"/v1.0/x?a=1&b=2"
		);
	}

	#[test]
	fn header_block_follows_directive_order() {
		let headers = vec![
			("call_id".to_owned(), "8afdb70ab".to_owned()),
			("area_id".to_owned(), "29a33e6f".to_owned()),
			("signature-headers".to_owned(), "area_id:call_id".to_owned()),
		];

		assert_eq!(header_block(&headers), "area_id:29a33e6f\ncall_id:8afdb70ab\n");
		assert_eq!(header_block(&headers[..2]), "");
	}

	#[test]
	fn header_block_keeps_missing_headers_as_empty_values() {
		let headers = vec![(SIGNATURE_HEADERS.to_owned(), "area_id".to_owned())];

		assert_eq!(header_block(&headers), "area_id:\n");
	}

	#[test]
	fn token_issue_signature_matches_reference() {
		let url = url("https://openapi.example.com/v1.0/token?grant_type=1");
		let input = input(HttpMethod::Get, &url, &[], b"", "");

		assert_eq!(
			string_to_sign(input.method, input.url, input.headers, input.body),
			format!("GET\n{EMPTY_DIGEST}\n\n/v1.0/token?grant_type=1")
		);
		assert_eq!(
			sign(&input, &TokenSecret::new(SECRET)),
			"7BA26C076E5ECB1E959BE274A0FFB397B2B1865FC7BCED8F1C78AC5653C20CAA"
		);
	}

	#[test]
	fn business_signature_includes_access_token() {
		let url = url("https://openapi.example.com/v1.0/devices?page_size=10&page_no=2");
		let input = input(HttpMethod::Get, &url, &[], b"", ACCESS);
		let secret = TokenSecret::new(SECRET);
		let signature = sign(&input, &secret);

		assert_eq!(signature, "A1439FB1C0D55128CDB5A8A476F7B8E54DB0CFB53FDF586D2CD076CEF0DE7FF1");
		assert_eq!(signature, sign(&input, &secret));
	}

	#[test]
	fn signed_headers_and_body_participate() {
		let url = url("https://openapi.example.com/v1.0/devices/vdevo123");
		let headers = vec![
			(SIGNATURE_HEADERS.to_owned(), "area_id:call_id".to_owned()),
			("area_id".to_owned(), "29a33e6f".to_owned()),
			("call_id".to_owned(), "8afdb70ab".to_owned()),
		];
		let body = br#"{"name":"Kitchen"}"#;
		let input = input(HttpMethod::Put, &url, &headers, body, ACCESS);

		assert_eq!(
			sign(&input, &TokenSecret::new(SECRET)),
			"88E9F2ABF84FC73CFADEB123784CDF9A5394E9830023DA524AB9A606A13FF73E"
		);
	}

	#[test]
	fn timestamp_is_unix_millis() {
		assert_eq!(timestamp_millis(macros::datetime!(2020-05-08 08:16:18 UTC)), T);
	}
}
