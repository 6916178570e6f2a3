//! Signed business requests.
//!
//! [`Broker::send`] reads the current access token through the store's read gate, signs the
//! request, releases the gate, and only then performs network I/O. A refresh in flight
//! therefore delays signing but never a request already on the wire.

// self
use crate::{
	_prelude::*,
	flows::Broker,
	http::{HttpMethod, PlatformHttpClient, PlatformRequest, PlatformResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	sign::{self, SIGN_METHOD, SIGNATURE_HEADERS, SigningInput},
};

/// Unsigned request description handed to [`Broker::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// HTTP method.
	pub method: HttpMethod,
	/// Absolute URL, including any query.
	pub url: Url,
	/// Extra headers sent alongside the authentication headers.
	pub headers: Vec<(String, String)>,
	/// Body bytes.
	pub body: Vec<u8>,
	/// Header names folded into the signature, in order.
	pub signed_headers: Vec<String>,
}
impl SignedRequest {
	/// Starts a request with no body or extra headers.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: Vec::new(), signed_headers: Vec::new() }
	}

	/// Sets the raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = body.into();

		self
	}

	/// Serializes `payload` as the JSON body and sets `Content-Type`.
	pub fn with_json<T>(mut self, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		self.body = serde_json::to_vec(payload).map_err(Error::Encode)?;

		Ok(self.with_header("Content-Type", "application/json"))
	}

	/// Appends a header that is sent but not signed.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Appends a header and lists it in the `Signature-Headers` directive.
	pub fn with_signed_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into();
		let mut request = self.with_header(name.clone(), value);

		request.signed_headers.push(name);

		request
	}

	/// Appends query pairs; an empty iterator leaves the URL untouched.
	pub fn with_query<I, K, V>(mut self, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut pairs = pairs.into_iter().peekable();

		if pairs.peek().is_some() {
			self.url.query_pairs_mut().extend_pairs(pairs);
		}

		self
	}
}

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Signs `body` for `method url` with the current token and returns the raw response body.
	///
	/// Fails with [`Error::TokenUnavailable`] before any network I/O when no token is held.
	pub async fn dispatch(&self, url: Url, method: HttpMethod, body: Vec<u8>) -> Result<Vec<u8>> {
		let response = self.send(SignedRequest::new(method, url).with_body(body)).await?;

		Ok(response.body)
	}

	/// Signs and executes a request, returning status plus body.
	pub async fn send(&self, request: SignedRequest) -> Result<PlatformResponse> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let outbound = {
					let gate = self.store.read().await;
					let Some(access_token) = gate.access_token() else {
						tracing::error!(url = %request.url, "No access token available for signing.");

						return Err(Error::TokenUnavailable);
					};
					let now = OffsetDateTime::now_utc();

					if gate.current().is_some_and(|active| active.is_expired_at(now)) {
						tracing::warn!(url = %request.url, "Signing with an expired access token.");
					}

					self.sign_request(request, access_token.expose(), now)
				};

				tracing::info!(method = %outbound.method, url = %outbound.url, "Sending signed request.");

				let response = self.http_client.execute(outbound).await.inspect_err(|err| {
					tracing::error!(error = %err, "Signed request failed.");
				})?;

				tracing::debug!(status = response.status, bytes = response.body.len(), "Received response.");

				Ok(response)
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Adds the authentication headers and the signature for `now`.
	///
	/// An empty `access_token` signs a token endpoint call and omits the `access_token` header.
	pub fn sign_request(
		&self,
		request: SignedRequest,
		access_token: &str,
		now: OffsetDateTime,
	) -> PlatformRequest {
		let SignedRequest { method, url, headers: extra, body, signed_headers } = request;
		let timestamp_millis = sign::timestamp_millis(now);
		let mut headers = vec![
			("client_id".to_owned(), self.credentials.client_id.clone()),
			("sign_method".to_owned(), SIGN_METHOD.to_owned()),
			("t".to_owned(), timestamp_millis.to_string()),
		];

		if !access_token.is_empty() {
			headers.push(("access_token".to_owned(), access_token.to_owned()));
		}

		headers.extend(extra);

		if !signed_headers.is_empty() {
			headers.push((SIGNATURE_HEADERS.to_owned(), signed_headers.join(":")));
		}

		let signature = sign::sign(
			&SigningInput {
				method,
				url: &url,
				headers: &headers,
				body: &body,
				timestamp_millis,
				client_id: &self.credentials.client_id,
				access_token,
			},
			&self.credentials.secret,
		);

		headers.push(("sign".to_owned(), signature));

		PlatformRequest { method, url, headers, body }
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{auth::ClientCredentials, flows::parse_host};

	fn broker() -> Broker {
		Broker::new(
			parse_host("https://openapi.example.com").expect("Fixture host should parse."),
			ClientCredentials::new("1KAD46OrT9HafiKdsXeg", "4OHBOnWOqaEC1mWXOpVL3yV50s0qGSRC"),
		)
	}

	#[test]
	fn sign_request_matches_reference_signature() {
		let broker = broker();
		let url = broker.endpoint(["devices"]).expect("Endpoint should build.");
		let request = SignedRequest::new(HttpMethod::Get, url)
			.with_query([("page_size", "10"), ("page_no", "2")]);
		let signed = broker.sign_request(
			request,
			"3f4eda2bdec17232f67c0b188af3eec1",
			macros::datetime!(2020-05-08 08:16:18 UTC),
		);

		assert_eq!(signed.header("client_id"), Some("1KAD46OrT9HafiKdsXeg"));
		assert_eq!(signed.header("sign_method"), Some("HMAC-SHA256"));
		assert_eq!(signed.header("t"), Some("1588925778000"));
		assert_eq!(signed.header("access_token"), Some("3f4eda2bdec17232f67c0b188af3eec1"));
		assert_eq!(
			signed.header("sign"),
			Some("A1439FB1C0D55128CDB5A8A476F7B8E54DB0CFB53FDF586D2CD076CEF0DE7FF1")
		);
	}

	#[test]
	fn token_calls_omit_access_token_header() {
		let broker = broker();
		let url = broker.endpoint(["token"]).expect("Endpoint should build.");
		let signed = broker.sign_request(
			SignedRequest::new(HttpMethod::Get, url).with_query([("grant_type", "1")]),
			"",
			macros::datetime!(2020-05-08 08:16:18 UTC),
		);

		assert_eq!(signed.header("access_token"), None);
		assert_eq!(
			signed.header("sign"),
			Some("7BA26C076E5ECB1E959BE274A0FFB397B2B1865FC7BCED8F1C78AC5653C20CAA")
		);
	}

	#[test]
	fn signed_headers_emit_directive() {
		let broker = broker();
		let url = broker.endpoint(["devices", "vdevo123"]).expect("Endpoint should build.");
		let request = SignedRequest::new(HttpMethod::Put, url)
			.with_body(br#"{"name":"Kitchen"}"#.to_vec())
			.with_signed_header("area_id", "29a33e6f")
			.with_signed_header("call_id", "8afdb70ab");
		let signed = broker.sign_request(
			request,
			"3f4eda2bdec17232f67c0b188af3eec1",
			macros::datetime!(2020-05-08 08:16:18 UTC),
		);

		assert_eq!(signed.header("Signature-Headers"), Some("area_id:call_id"));
		assert_eq!(
			signed.header("sign"),
			Some("88E9F2ABF84FC73CFADEB123784CDF9A5394E9830023DA524AB9A606A13FF73E")
		);
	}

	#[test]
	fn json_body_sets_content_type() {
		let url = Url::parse("https://h.example/v1.0/devices/d1").expect("Fixture URL should parse.");
		let request = SignedRequest::new(HttpMethod::Put, url)
			.with_json(&serde_json::json!({ "name": "Kitchen" }))
			.expect("JSON body should encode.");

		assert_eq!(request.body, br#"{"name":"Kitchen"}"#);
		assert_eq!(request.headers, vec![("Content-Type".into(), "application/json".into())]);
	}

	#[tokio::test]
	async fn dispatch_without_token_fails_fast() {
		let broker = broker();
		let url = broker.endpoint(["devices", "d1"]).expect("Endpoint should build.");
		let err = broker
			.dispatch(url, HttpMethod::Get, Vec::new())
			.await
			.expect_err("Dispatch should fail without a token.");

		assert!(matches!(err, Error::TokenUnavailable));
	}
}
