//! Platform token payloads and the active-token record kept by the store.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Token issued by the platform's token endpoints.
///
/// The payload is opaque beyond these fields. Secrets are wrapped in [`TokenSecret`] so the
/// struct can be logged with `{:?}` safely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Short-lived credential attached to every signed request.
	#[serde(default)]
	pub access_token: TokenSecret,
	/// Longer-lived credential used to mint a new access token.
	#[serde(default)]
	pub refresh_token: TokenSecret,
	/// Platform user identifier bound to the token.
	#[serde(default)]
	pub uid: String,
	/// Token lifetime in seconds, relative to issuance.
	#[serde(rename = "expire_time", default)]
	pub expire_seconds: i64,
}
impl Token {
	/// Returns the refresh token when the platform issued one.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		(!self.refresh_token.is_empty()).then_some(&self.refresh_token)
	}

	/// Returns `true` when the token carries a usable access token.
	pub fn has_access_token(&self) -> bool {
		!self.access_token.is_empty()
	}

	/// Computes the absolute expiry instant for a token issued at `issued_at`.
	pub fn expires_at(&self, issued_at: OffsetDateTime) -> Result<OffsetDateTime> {
		issued_at
			.checked_add(Duration::seconds(self.expire_seconds))
			.ok_or(Error::InvalidExpiry { seconds: self.expire_seconds })
	}
}

/// The current token together with its absolute expiry instant.
///
/// Records are replaced as a whole; there is no partial update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveToken {
	/// Current token.
	pub token: Token,
	/// Instant after which the platform rejects the access token.
	pub expires_at: OffsetDateTime,
}
impl ActiveToken {
	/// Pairs a token with its absolute expiry instant.
	pub fn new(token: Token, expires_at: OffsetDateTime) -> Self {
		Self { token, expires_at }
	}

	/// Builds the record for a token issued at `issued_at`.
	pub fn issued(token: Token, issued_at: OffsetDateTime) -> Result<Self> {
		let expires_at = token.expires_at(issued_at)?;

		Ok(Self { token, expires_at })
	}

	/// Returns `true` once `instant` reaches the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}
}
