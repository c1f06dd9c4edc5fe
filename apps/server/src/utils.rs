use tokio::signal;
use tracing::{error, info};

/// Resolves on Ctrl+C or SIGTERM so in-flight requests can finish before exit.
pub(crate) async fn axum_shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to listen for Ctrl+C: {e:#?}");
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut sigterm) => {
				sigterm.recv().await;
			}
			Err(e) => {
				error!("Failed to listen for SIGTERM: {e:#?}");
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	info!("Shutting down, waiting for in-flight requests...");
}
