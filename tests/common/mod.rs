#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::{Arc, Mutex},
};
// crates.io
use tokio::sync::Semaphore;
// self
use iot_cloud_broker::{
	auth::ClientCredentials,
	error::TransportError,
	flows::{Broker, parse_host},
	http::{HttpFuture, PlatformHttpClient, PlatformRequest, PlatformResponse},
	url::Url,
};

pub const CLIENT_ID: &str = "1KAD46OrT9HafiKdsXeg";
pub const SECRET: &str = "4OHBOnWOqaEC1mWXOpVL3yV50s0qGSRC";

pub fn credentials() -> ClientCredentials {
	ClientCredentials::new(CLIENT_ID, SECRET)
}

pub fn host(value: &str) -> Url {
	parse_host(value).expect("Test host should parse.")
}

pub fn token_body(access: &str, refresh: &str, expire_time: i64) -> String {
	format!(
		r#"{{"success":true,"t":1588925778000,"result":{{"access_token":"{access}","refresh_token":"{refresh}","uid":"uid-1","expire_time":{expire_time}}}}}"#
	)
}

pub fn ok(body: impl Into<String>) -> PlatformResponse {
	PlatformResponse { status: 200, body: body.into().into_bytes() }
}

/// Outcome queued on a [`ScriptedClient`].
pub enum Reply {
	Respond(PlatformResponse),
	Fail,
}

/// In-process transport that records requests and replays queued replies.
///
/// Token endpoint calls can be held until [`ScriptedClient::release_token_calls`] is called.
#[derive(Default)]
pub struct ScriptedClient {
	requests: Mutex<Vec<PlatformRequest>>,
	replies: Mutex<VecDeque<Reply>>,
	token_gate: Option<Arc<Semaphore>>,
}
impl ScriptedClient {
	pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
		Self { replies: Mutex::new(replies.into_iter().collect()), ..Default::default() }
	}

	pub fn holding_token_calls(mut self) -> Self {
		self.token_gate = Some(Arc::new(Semaphore::new(0)));

		self
	}

	pub fn release_token_calls(&self, permits: usize) {
		if let Some(gate) = &self.token_gate {
			gate.add_permits(permits);
		}
	}

	pub fn push(&self, reply: Reply) {
		self.replies.lock().expect("Reply queue lock should not be poisoned.").push_back(reply);
	}

	pub fn requests(&self) -> Vec<PlatformRequest> {
		self.requests.lock().expect("Request log lock should not be poisoned.").clone()
	}

	pub fn paths(&self) -> Vec<String> {
		self.requests().into_iter().map(|request| request.url.path().to_owned()).collect()
	}
}
impl PlatformHttpClient for ScriptedClient {
	fn execute(&self, request: PlatformRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let is_token_call = request.url.path().starts_with("/v1.0/token");

			self.requests.lock().expect("Request log lock should not be poisoned.").push(request);

			if let (true, Some(gate)) = (is_token_call, &self.token_gate) {
				gate.acquire().await.expect("Token gate should stay open.").forget();
			}

			let reply = self.replies.lock().expect("Reply queue lock should not be poisoned.").pop_front();

			match reply {
				Some(Reply::Respond(response)) => Ok(response),
				Some(Reply::Fail) | None => Err(TransportError::network(std::io::Error::other(
					"scripted transport failure",
				))),
			}
		})
	}
}

pub fn scripted_broker(client: ScriptedClient) -> (Broker<ScriptedClient>, Arc<ScriptedClient>) {
	let client = Arc::new(client);
	let broker = Broker::with_http_client(host("https://openapi.example.com"), credentials(), client.clone());

	(broker, client)
}
