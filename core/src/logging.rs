use std::{fs, path::Path};

use anyhow::{anyhow, Result};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sets up console output plus a daily rolling file under `logs_dir`.
///
/// `RUST_LOG` wins over `default_level` when set. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init(logs_dir: impl AsRef<Path>, default_level: &str) -> Result<WorkerGuard> {
	let logs_dir = logs_dir.as_ref();
	fs::create_dir_all(logs_dir)?;

	let (non_blocking, guard) =
		tracing_appender::non_blocking(rolling::daily(logs_dir, "face-registry.log"));

	tracing_subscriber::registry()
		.with(env_filter(default_level)?)
		.with(fmt::layer().with_target(true))
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(true)
				.with_ansi(false) // No ANSI colors in log files
				.with_writer(non_blocking),
		)
		.try_init()
		.map_err(|e| anyhow!("Failed to initialize tracing: {e}"))?;

	Ok(guard)
}

/// Runs `f` with console-only logging.
///
/// For startup work that happens before [`init`] can run, like loading the config that
/// says where the log files go.
pub fn with_startup_logging<T>(default_level: &str, f: impl FnOnce() -> T) -> Result<T> {
	let subscriber = tracing_subscriber::registry()
		.with(env_filter(default_level)?)
		.with(fmt::layer().with_target(true));

	Ok(tracing::subscriber::with_default(subscriber, f))
}

fn env_filter(default_level: &str) -> Result<EnvFilter> {
	Ok(EnvFilter::try_from_default_env().or_else(|_| {
		EnvFilter::try_new(format!(
			"warn,fr_core={default_level},fr_ai={default_level},fr_images={default_level},fr_server={default_level},tower_http=info"
		))
	})?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::AppConfig;

	use tempfile::TempDir;
	use tracing::Level;

	#[test]
	fn config_loading_is_logged_before_init() {
		let dir = TempDir::new().unwrap();

		let (enabled, config) = with_startup_logging("info", || {
			(
				tracing::enabled!(Level::INFO),
				AppConfig::load_from(dir.path()),
			)
		})
		.unwrap();

		assert!(enabled);
		assert!(config.is_ok());
	}
}
