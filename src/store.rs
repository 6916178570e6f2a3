//! The process-owned token store and its refresh gate.
//!
//! [`TokenStore`] holds at most one [`ActiveToken`]. The state sits behind an async
//! single-writer/many-reader lock that doubles as the refresh gate:
//!
//! - the lifecycle manager takes a [`RefreshGuard`] (write side) for the whole token call and
//!   replacement, so every reader that arrives meanwhile waits for the new token;
//! - the dispatcher takes a [`TokenReadGuard`] while it reads the token and signs, then drops
//!   it before network I/O.
//!
//! Writers are preferred, so a steady stream of requests cannot starve a refresh. Records
//! are replaced whole, so readers never observe a half-written token.

// crates.io
use async_lock::{RwLockReadGuard, RwLockWriteGuard};
// self
use crate::{
	_prelude::*,
	auth::{ActiveToken, Token, TokenSecret},
};

type Slot = Option<ActiveToken>;

/// Holder of the single active token.
///
/// Share it through an `Arc`; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct TokenStore(AsyncRwLock<Slot>);
impl TokenStore {
	/// Returns a snapshot of the current token, waiting out any in-flight refresh.
	pub async fn get(&self) -> Option<ActiveToken> {
		self.0.read().await.clone()
	}

	/// Replaces the current token and its expiry in one step.
	pub async fn set(&self, token: Token, expires_at: OffsetDateTime) {
		*self.0.write().await = Some(ActiveToken::new(token, expires_at));
	}

	/// Acquires shared access for request signing.
	pub async fn read(&self) -> TokenReadGuard<'_> {
		TokenReadGuard(self.0.read().await)
	}

	/// Acquires the refresh gate. Readers block until the guard is dropped.
	pub async fn begin_refresh(&self) -> RefreshGuard<'_> {
		RefreshGuard(self.0.write().await)
	}
}

/// Shared view of the store held while a request is signed.
pub struct TokenReadGuard<'a>(RwLockReadGuard<'a, Slot>);
impl TokenReadGuard<'_> {
	/// Current record, if any.
	pub fn current(&self) -> Option<&ActiveToken> {
		self.0.as_ref()
	}

	/// Current access token, when one is present and non-empty.
	pub fn access_token(&self) -> Option<&TokenSecret> {
		self.current()
			.map(|active| &active.token.access_token)
			.filter(|secret| !secret.is_empty())
	}
}
impl Debug for TokenReadGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenReadGuard").field(&self.current()).finish()
	}
}

/// Exclusive view of the store held for the duration of a token issue or refresh.
pub struct RefreshGuard<'a>(RwLockWriteGuard<'a, Slot>);
impl RefreshGuard<'_> {
	/// Current record, if any.
	pub fn current(&self) -> Option<&ActiveToken> {
		self.0.as_ref()
	}

	/// Replaces the record; readers see it once the guard is dropped.
	pub fn replace(&mut self, active: ActiveToken) {
		*self.0 = Some(active);
	}
}
impl Debug for RefreshGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("RefreshGuard").field(&self.current()).finish()
	}
}
