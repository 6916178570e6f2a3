//! Command-line surface of the `iot-broker` binary.

// crates.io
use clap::{Parser, Subcommand};
// self
use crate::settings;

/// Signed-REST IoT cloud broker.
#[derive(Debug, Parser)]
#[command(name = "iot-broker", version, about)]
pub struct Cli {
	/// Settings name; loads `config/config-<name>`.
	#[arg(long, env = "CONFIG", global = true)]
	pub config: Option<String>,
	/// Action to run; defaults to `run`.
	#[command(subcommand)]
	pub command: Option<Command>,
}
impl Cli {
	/// Path of the settings file selected by `--config`.
	pub fn settings_path(&self) -> String {
		settings::config_path(self.config.as_deref())
	}
}

/// Broker actions.
#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
	/// Keep the platform token alive until interrupted.
	Run,
	/// Print one device as JSON.
	Device {
		/// Device identifier.
		device_id: String,
	},
	/// Print one page of devices as JSON.
	Devices {
		/// Page number, starting at 1.
		#[arg(long, default_value_t = 1)]
		page_no: u32,
		/// Devices per page.
		#[arg(long, default_value_t = 20)]
		page_size: u32,
	},
}
