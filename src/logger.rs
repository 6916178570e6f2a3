//! Global `tracing` subscriber setup.

// crates.io
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{
	error::ConfigError,
	settings::{Encoding, Logger, Mode},
};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Development mode adds source locations.
/// Output goes to stderr so command output on stdout stays machine-readable.
pub fn init(settings: &Logger, mode: Mode) -> Result<(), ConfigError> {
	let filter = match EnvFilter::try_from_default_env() {
		Ok(filter) => filter,
		Err(_) => filter(&settings.level)?,
	};
	let verbose = mode == Mode::Development;
	let registry = tracing_subscriber::registry().with(filter);
	let layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_file(verbose)
		.with_line_number(verbose);
	let installed = match settings.encoding {
		Encoding::Json => registry.with(layer.json()).try_init(),
		Encoding::Console => registry.with(layer).try_init(),
	};

	installed.map_err(|e| ConfigError::Logger { message: e.to_string() })
}

/// Parses a level directive such as `info` or `iot_cloud_broker=debug,reqwest=warn`.
pub fn filter(directive: &str) -> Result<EnvFilter, ConfigError> {
	EnvFilter::try_new(directive).map_err(|e| ConfigError::Logger { message: e.to_string() })
}
