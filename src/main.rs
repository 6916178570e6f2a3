//! `iot-broker`: keeps a platform token alive and offers a few one-shot device queries.

// crates.io
use clap::Parser;
use serde::Serialize;
// self
use iot_cloud_broker::{
	error::{Error, Result},
	flows::{AutoRefresh, Broker},
	logger,
	settings::{Cli, Command, Settings},
};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	let settings = Settings::load(&cli.settings_path())?;

	logger::init(&settings.logger, settings.server.mode)?;

	let broker = settings.broker()?;

	tracing::info!(host = %broker.host, "Broker configured.");

	match cli.command.unwrap_or(Command::Run) {
		Command::Run => run(broker, &settings).await,
		Command::Device { device_id } => {
			broker.fetch_initial().await?;

			print_json(&broker.get_device(&device_id).await?)
		},
		Command::Devices { page_no, page_size } => {
			broker.fetch_initial().await?;

			let no_filters: [(&str, &str); 0] = [];

			print_json(&broker.get_devices(page_no, page_size, no_filters).await?)
		},
	}
}

async fn run(broker: Broker, settings: &Settings) -> Result<()> {
	let handle = AutoRefresh::new(broker)
		.with_backoff(settings.backoff())
		.with_reissue_after(settings.refresh.reissue_after_failures)
		.spawn();

	tokio::select! {
		exit = handle.wait() => match exit {
			Some(exit) => tracing::warn!(?exit, "Refresh loop stopped."),
			None => tracing::error!("Refresh loop was cancelled."),
		},
		signal = tokio::signal::ctrl_c() => {
			if let Err(e) = signal {
				tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
			}

			tracing::info!("Shutting down.");
		},
	}

	Ok(())
}

fn print_json<T>(value: &T) -> Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value).map_err(Error::Encode)?);

	Ok(())
}
