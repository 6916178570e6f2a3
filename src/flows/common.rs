//! Shared helpers for the token issue and refresh flows.

// self
use crate::{
	_prelude::*,
	api::envelope,
	auth::{ActiveToken, Token},
	flows::{Broker, SignedRequest},
	http::{HttpMethod, PlatformHttpClient},
	obs::{FlowKind, FlowOutcome, FlowSpan},
	store::RefreshGuard,
};

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Calls a token endpoint and installs the result while the caller holds the gate.
	///
	/// The store is only written after the platform returned a usable token.
	pub(crate) async fn rotate_token(
		&self,
		gate: &mut RefreshGuard<'_>,
		url: Url,
	) -> Result<Token> {
		let request = self.sign_request(
			SignedRequest::new(HttpMethod::Get, url),
			"",
			OffsetDateTime::now_utc(),
		);
		let response = self.http_client.execute(request).await.inspect_err(|err| {
			tracing::warn!(error = %err, "Token endpoint call failed.");
		})?;
		let token = envelope::decode::<Token>(&response)?;

		if !token.has_access_token() {
			tracing::error!("Token endpoint returned an empty access token.");

			return Err(Error::EmptyAccessToken);
		}

		let active = ActiveToken::issued(token.clone(), OffsetDateTime::now_utc())?;

		tracing::info!(
			uid = %token.uid,
			expire_seconds = token.expire_seconds,
			expires_at = %active.expires_at,
			"Installed new platform token."
		);
		gate.replace(active);

		Ok(token)
	}

	/// Runs a lifecycle flow under its span and records the outcome on the broker metrics.
	pub(crate) async fn observe_lifecycle<F>(
		&self,
		kind: FlowKind,
		stage: &'static str,
		flow: F,
	) -> Result<Token>
	where
		F: Future<Output = Result<Token>>,
	{
		let span = FlowSpan::new(kind, stage);

		self.metrics.record(kind, FlowOutcome::Attempt);

		let result = span.instrument(flow).await;

		self.metrics.record(kind, FlowOutcome::of(&result));

		result
	}
}
