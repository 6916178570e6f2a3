//! Client credentials and token models.

pub mod credentials;
pub mod token {
	//! Platform token payloads and redacted secrets.

	pub mod record;
	pub mod secret;
}

pub use credentials::*;
pub use token::{record::*, secret::*};
