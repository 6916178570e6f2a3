//! Refresh-token rotation (`GET /v1.0/token/{refresh_token}`).

// self
use crate::{_prelude::*, auth::Token, flows::Broker, http::PlatformHttpClient, obs::FlowKind};

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Exchanges the stored refresh token for a new token and replaces the stored one.
	///
	/// Fails with [`Error::NoInitialToken`] without touching the network when no refresh
	/// token is held. The whole exchange runs under the refresh gate; on failure the
	/// previous token stays in place.
	pub async fn refresh(&self) -> Result<Token> {
		self.observe_lifecycle(FlowKind::Refresh, "refresh", async move {
			let mut gate = self.store.begin_refresh().await;
			let refresh_token = gate
				.current()
				.and_then(|active| active.token.refresh_token())
				.cloned()
				.ok_or(Error::NoInitialToken)?;
			let url = self.endpoint(["token", refresh_token.expose()])?;

			tracing::info!("Refreshing platform token.");

			self.rotate_token(&mut gate, url).await
		})
		.await
	}
}
