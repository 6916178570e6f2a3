//! Layered settings: `config/config-<name>` overlaid by `BROKER__*` environment variables.

pub mod cli;

pub use cli::*;

// std
use std::time::Duration as StdDuration;
// crates.io
use config::{Config, Environment, File};
// self
use crate::{
	_prelude::*,
	auth::{ClientCredentials, TokenSecret},
	error::ConfigError,
	flows::{self, BackoffPolicy, Broker, DEFAULT_REISSUE_AFTER_FAILURES, RefreshSchedule},
	http::ReqwestHttpClient,
};

/// Directory holding the settings files.
pub const CONFIG_DIR: &str = "config";
/// Settings name used when none is given.
pub const DEFAULT_CONFIG_NAME: &str = "local";
/// Prefix for environment overrides, e.g. `BROKER__PLATFORM__SECRET`.
pub const ENV_PREFIX: &str = "BROKER";
/// Separator between the prefix and nested keys in environment overrides.
pub const ENV_SEPARATOR: &str = "__";

/// Complete broker settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
	/// Process-level settings.
	#[serde(default)]
	pub server: Server,
	/// Log output.
	#[serde(default)]
	pub logger: Logger,
	/// Platform endpoint and credentials.
	pub platform: Platform,
	/// Token maintenance tuning.
	#[serde(default)]
	pub refresh: Refresh,
}
impl Settings {
	/// Loads `path` (extension optional) and applies environment overrides.
	pub fn load(path: &str) -> Result<Self, ConfigError> {
		Self::load_with_env(path, None)
	}

	/// Like [`Settings::load`], reading overrides from `env` instead of the process environment.
	pub fn load_with_env(
		path: &str,
		env: Option<config::Map<String, String>>,
	) -> Result<Self, ConfigError> {
		let settings = Config::builder()
			.add_source(File::with_name(path))
			.add_source(
				Environment::with_prefix(ENV_PREFIX)
					.prefix_separator(ENV_SEPARATOR)
					.separator(ENV_SEPARATOR)
					.try_parsing(true)
					.source(env),
			)
			.build()?
			.try_deserialize()?;

		Ok(settings)
	}

	/// Client id plus signing secret.
	pub fn credentials(&self) -> ClientCredentials {
		ClientCredentials::new(self.platform.client_id.clone(), self.platform.secret.clone())
	}

	/// Wake-up schedule for the refresh loop.
	pub fn schedule(&self) -> RefreshSchedule {
		RefreshSchedule::new(
			Duration::seconds(i64::try_from(self.refresh.margin_secs).unwrap_or(i64::MAX)),
			StdDuration::from_secs(self.refresh.min_wake_delay_secs),
		)
	}

	/// Retry policy for failed token calls.
	pub fn backoff(&self) -> BackoffPolicy {
		BackoffPolicy::new(
			StdDuration::from_secs(self.refresh.backoff_initial_secs),
			StdDuration::from_secs(self.refresh.backoff_max_secs),
		)
		.with_jitter(self.refresh.jitter)
	}

	/// Builds the reqwest-backed broker described by these settings.
	pub fn broker(&self) -> Result<Broker, ConfigError> {
		let host = flows::parse_host(&self.platform.host)?;
		let http_client = ReqwestHttpClient::with_timeout(
			self.platform.request_timeout_secs.map(StdDuration::from_secs),
		)?;

		Ok(Broker::with_http_client(host, self.credentials(), http_client)
			.with_schedule(self.schedule()))
	}
}

/// Resolves the settings path for a name such as `local` or `prod`.
pub fn config_path(name: Option<&str>) -> String {
	format!("{CONFIG_DIR}/config-{}", name.unwrap_or(DEFAULT_CONFIG_NAME))
}

/// Process-level settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Server {
	/// Deployment mode.
	#[serde(default)]
	pub mode: Mode,
}

/// Deployment mode; development logs carry source locations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Mode {
	/// Local development.
	#[serde(alias = "development", alias = "dev")]
	Development,
	/// Deployed service.
	#[default]
	#[serde(alias = "production", alias = "prod")]
	Production,
}

/// Log output settings.
#[derive(Clone, Debug, Deserialize)]
pub struct Logger {
	/// `EnvFilter` directive, e.g. `info` or `iot_cloud_broker=debug`.
	#[serde(default = "default_level")]
	pub level: String,
	/// Line format.
	#[serde(default)]
	pub encoding: Encoding,
}
impl Default for Logger {
	fn default() -> Self {
		Self { level: default_level(), encoding: Encoding::default() }
	}
}

/// Log line format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
	/// Human-readable lines.
	Console,
	/// One JSON object per line.
	#[default]
	Json,
}

/// Platform endpoint and credentials.
#[derive(Clone, Debug, Deserialize)]
pub struct Platform {
	/// Base URL, e.g. `https://openapi.tuyaus.com`.
	pub host: String,
	/// Client identifier.
	pub client_id: String,
	/// Signing secret.
	pub secret: TokenSecret,
	/// Overall per-request timeout; unset means none.
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

/// Token maintenance tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Refresh {
	/// Seconds before expiry at which the loop refreshes.
	pub margin_secs: u64,
	/// Shortest sleep between loop iterations.
	pub min_wake_delay_secs: u64,
	/// First retry delay after a failure.
	pub backoff_initial_secs: u64,
	/// Upper bound for retry delays.
	pub backoff_max_secs: u64,
	/// Randomizes retry delays.
	pub jitter: bool,
	/// Consecutive refresh failures before a fresh issue; `0` disables.
	pub reissue_after_failures: u32,
}
impl Default for Refresh {
	fn default() -> Self {
		Self {
			margin_secs: 120,
			min_wake_delay_secs: 1,
			backoff_initial_secs: 1,
			backoff_max_secs: 300,
			jitter: true,
			reissue_after_failures: DEFAULT_REISSUE_AFTER_FAILURES,
		}
	}
}

fn default_level() -> String {
	"info".into()
}

#[cfg(test)]
mod tests {
	// std
	use std::{fs, path::PathBuf};
	// self
	use super::*;

	struct TempSettings(PathBuf);
	impl TempSettings {
		fn write(name: &str, contents: &str) -> Self {
			let path = std::env::temp_dir()
				.join(format!("iot-broker-settings-{}-{name}.toml", std::process::id()));

			fs::write(&path, contents).expect("Temporary settings file should be writable.");

			Self(path)
		}

		fn path(&self) -> &str {
			self.0.to_str().expect("Temporary path should be valid UTF-8.")
		}
	}
	impl Drop for TempSettings {
		fn drop(&mut self) {
			let _ = fs::remove_file(&self.0);
		}
	}

	const MINIMAL: &str = r#"
[platform]
host = "https://openapi.example.com"
client_id = "client"
secret = "s3cr3t"
"#;

	#[test]
	fn defaults_fill_optional_sections() {
		let file = TempSettings::write("minimal", MINIMAL);
		let settings =
			Settings::load_with_env(file.path(), Some(Default::default())).expect("Settings should load.");

		assert_eq!(settings.server.mode, Mode::Production);
		assert_eq!(settings.logger.level, "info");
		assert_eq!(settings.logger.encoding, Encoding::Json);
		assert_eq!(settings.refresh.margin_secs, 120);
		assert_eq!(settings.refresh.reissue_after_failures, 3);
		assert_eq!(settings.schedule(), RefreshSchedule::default());
		assert_eq!(settings.platform.request_timeout_secs, None);
	}

	#[test]
	fn environment_overrides_file_values() {
		let file = TempSettings::write("env", MINIMAL);
		let env = config::Map::from([
			("BROKER__PLATFORM__SECRET".to_owned(), "from-env".to_owned()),
			("BROKER__REFRESH__MARGIN_SECS".to_owned(), "300".to_owned()),
		]);
		let settings =
			Settings::load_with_env(file.path(), Some(env)).expect("Settings should load.");

		assert_eq!(settings.platform.secret.expose(), "from-env");
		assert_eq!(settings.refresh.margin_secs, 300);
	}

	#[test]
	fn full_file_is_honoured() {
		let file = TempSettings::write(
			"full",
			r#"
[server]
mode = "Development"

[logger]
level = "debug"
encoding = "console"

[platform]
host = "https://openapi.example.com"
client_id = "client"
secret = "s3cr3t"
request_timeout_secs = 10

[refresh]
margin_secs = 60
min_wake_delay_secs = 2
backoff_initial_secs = 3
backoff_max_secs = 30
jitter = false
reissue_after_failures = 0
"#,
		);
		let settings =
			Settings::load_with_env(file.path(), Some(Default::default())).expect("Settings should load.");
		let backoff = settings.backoff();

		assert_eq!(settings.server.mode, Mode::Development);
		assert_eq!(settings.logger.encoding, Encoding::Console);
		assert_eq!(settings.schedule().margin, Duration::seconds(60));
		assert_eq!(settings.schedule().min_wake_delay, StdDuration::from_secs(2));
		assert_eq!(backoff.delay_for(1), StdDuration::from_secs(3));
		assert_eq!(backoff.delay_for(10), StdDuration::from_secs(30));
		assert!(settings.broker().is_ok());
	}

	#[test]
	fn missing_platform_section_fails() {
		let file = TempSettings::write("empty", "[logger]\nlevel = \"warn\"\n");

		assert!(matches!(
			Settings::load_with_env(file.path(), Some(Default::default())),
			Err(ConfigError::Settings(_))
		));
	}

	#[test]
	fn debug_hides_secret() {
		let file = TempSettings::write("debug", MINIMAL);
		let settings =
			Settings::load_with_env(file.path(), Some(Default::default())).expect("Settings should load.");

		assert!(!format!("{settings:?}").contains("s3cr3t"));
	}

	#[test]
	fn config_path_defaults_to_local() {
		assert_eq!(config_path(None), "config/config-local");
		assert_eq!(config_path(Some("prod")), "config/config-prod");
	}
}
