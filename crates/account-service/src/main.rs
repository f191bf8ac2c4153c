//! Main entry point for the chain account service.
//!
//! The binary loads the YAML configuration, builds an adaptor for every
//! enabled network and serves the account API over HTTP until interrupted.

use account_config::Config;
use clap::Parser;
use dispatcher::Dispatcher;
use std::path::PathBuf;
use std::sync::Arc;

mod dispatcher;
mod server;

/// Command-line arguments for the chain account service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.yaml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::error!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started chain account service");

	let config = Config::from_file(&args.config).await?;
	tracing::info!(
		network = %config.network,
		chains = ?config.chains,
		"Loaded configuration [{}]",
		args.config.display()
	);

	let dispatcher =
		Arc::new(Dispatcher::new(&config, &account_chain::get_all_implementations()).await?);

	server::start_server(&config.server, Arc::clone(&dispatcher), shutdown_signal()).await?;

	dispatcher.shutdown();
	tracing::info!("Stopped chain account service");
	Ok(())
}
