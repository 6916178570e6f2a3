//! Initial token issue (`GET /v1.0/token?grant_type=1`).

// self
use crate::{
	_prelude::*,
	auth::Token,
	flows::{Broker, SignedRequest},
	http::{HttpMethod, PlatformHttpClient},
	obs::FlowKind,
};

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Obtains a first token and installs it in the store.
	///
	/// The refresh gate is held for the whole call, so concurrent requests wait for the new
	/// token instead of signing with a stale one. On failure the store is left unchanged.
	pub async fn fetch_initial(&self) -> Result<Token> {
		self.observe_lifecycle(FlowKind::Issue, "fetch_initial", async move {
			let url = SignedRequest::new(HttpMethod::Get, self.endpoint(["token"])?)
				.with_query([("grant_type", "1")])
				.url;
			let mut gate = self.store.begin_refresh().await;

			tracing::info!("Requesting initial platform token.");

			self.rotate_token(&mut gate, url).await
		})
		.await
	}
}
