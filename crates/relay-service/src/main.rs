use anyhow::{Context, Result};
use clap::Parser;
use relay_config::{ConfigLoader, RelayConfig};
use relay_core::RelayBuilder;
use relay_service::{
	api,
	cli::{Args, Command},
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	// Load configuration first: .env files may set LOG_LEVEL
	let config = ConfigLoader::new()
		.with_optional_file(args.config.as_ref())
		.load()
		.context("Failed to load configuration")?;

	setup_tracing(args.log_level.as_deref().unwrap_or(&config.log_level))?;

	match args.command {
		Some(Command::Start) | None => start_service(config).await,
		Some(Command::Validate) => validate_config(config),
	}
}

async fn start_service(config: RelayConfig) -> Result<()> {
	info!("Starting EIP-3009 relay");

	let relay = RelayBuilder::new(config.clone())
		.build()
		.context("Failed to build authorization relay")?;
	let relay = Arc::new(relay);

	info!("Environment: {}", config.environment);
	info!("HTTP port: {}", config.server.port);
	info!("Chain: {} ({})", relay.profile().name, relay.chain_id());
	info!("Token contract: {}", relay.token_address());
	info!("Relayer address: {}", relay.relayer_address());
	info!("Allowed origins: {}", config.server.allowed_origins.join(", "));

	api::serve(&config.server, relay, setup_shutdown_signal())
		.await
		.context("HTTP server failed")?;

	info!("EIP-3009 relay stopped");
	Ok(())
}

fn validate_config(config: RelayConfig) -> Result<()> {
	let relay = RelayBuilder::new(config.clone())
		.build()
		.context("Failed to build authorization relay")?;

	info!("Configuration is valid");
	info!("Environment: {}", config.environment);
	info!("Chain: {} ({})", relay.profile().name, relay.chain_id());
	info!("RPC endpoint: {}", config.network.rpc_url);
	info!("Token contract: {}", relay.token_address());
	info!("Relayer address: {}", relay.relayer_address());

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}

async fn setup_shutdown_signal() {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
