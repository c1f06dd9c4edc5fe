use fr_core::{config::default_data_dir, logging, AppConfig, Core};

use std::{
	net::{Ipv6Addr, SocketAddr},
	path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod utils;

#[derive(Parser, Debug)]
#[command(name = "fr-server", about = "Face registration server", version)]
struct Cli {
	/// Directory holding the config file and logs
	#[arg(long, env = "DATA_DIR", global = true)]
	data_dir: Option<PathBuf>,

	/// Port to listen on, overrides the config file
	#[arg(long, env = "PORT", global = true)]
	port: Option<u16>,

	/// PostgreSQL connection string, overrides the config file
	#[arg(long, env = "DATABASE_URL", global = true)]
	database_url: Option<String>,

	/// Keep identities in memory only, wins over any database URL
	#[arg(long, global = true)]
	in_memory: bool,

	/// Directory with `index.html` and registration page assets
	#[arg(long, env = "STATIC_DIR", global = true)]
	static_dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	/// Serve the HTTP API (default)
	Serve,
	/// Create the identity table and exit
	InitDb,
}

impl Cli {
	fn config(&self) -> anyhow::Result<AppConfig> {
		let data_dir = match &self.data_dir {
			Some(dir) => dir.clone(),
			None => default_data_dir()?,
		};

		let mut config = AppConfig::load_from(&data_dir)
			.with_context(|| format!("failed to load config from {}", data_dir.display()))?;

		if let Some(port) = self.port {
			config.port = port;
		}
		if let Some(url) = &self.database_url {
			config.database.url = Some(url.clone());
		}
		if self.in_memory {
			config.database.url = None;
		}
		if let Some(dir) = &self.static_dir {
			config.static_dir = Some(dir.clone());
		}

		Ok(config)
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = logging::with_startup_logging("info", || cli.config())??;

	let _guard = logging::init(config.logs_dir(), &config.log_level)?;

	let core = Core::new(config)
		.await
		.context("unable to start the face registry")?;

	if cli.command == Some(Command::InitDb) {
		info!("Identity store initialised");
		return Ok(());
	}

	let app = api::router(core.registrations.clone(), core.config.static_dir.as_deref());

	// Listens on IPv6 and IPv4
	let addr = SocketAddr::from((Ipv6Addr::UNSPECIFIED, core.config.port));
	let listener = TcpListener::bind(addr)
		.await
		.with_context(|| format!("failed to bind {addr}"))?;
	info!("Listening on http://localhost:{}", core.config.port);

	axum::serve(listener, app)
		.with_graceful_shutdown(utils::axum_shutdown_signal())
		.await
		.context("HTTP server failed")?;

	Ok(())
}
