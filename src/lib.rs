//! Signed-REST broker for IoT cloud platforms: HMAC request signing, a gated single-token
//! store, and a refresh loop that keeps the token alive for long-running middleware.
//!
//! The crate is organised leaves first:
//!
//! - [`sign`] builds the canonical signing string and the HMAC-SHA256 signature.
//! - [`store`] owns the single active token and the refresh gate.
//! - [`flows`] hosts the [`Broker`](flows::Broker): token issue/refresh, wake scheduling, the
//!   auto-refresh loop, and the signed dispatcher every endpoint goes through.
//! - [`api`] wraps the platform's device and device-user endpoints.
//! - [`settings`], [`logger`], and [`obs`] carry configuration, log setup, and flow
//!   instrumentation.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod logger;
pub mod obs;
pub mod settings;
pub mod sign;
pub mod store;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::RwLock as AsyncRwLock;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
