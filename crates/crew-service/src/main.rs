//! Main entry point for the crew staffing service.
//!
//! This binary wires a repository backend to the staffing engine, keeps
//! the expiry sweep running on an interval, and logs snapshot activity
//! until interrupted. The engine itself stays a library: everything a
//! presentation layer needs goes through the orchestrator's command
//! surface.

use clap::Parser;
use crew_config::Config;
use crew_core::{StaffingEngine, StaticSession, SystemClock};
use crew_storage::{OrderRepository, RepositoryFactory};
use crew_types::Command;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Command-line arguments for the staffing service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	tracing::info!("Started staffing service");

	// Load configuration
	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.staffing.id);

	// Select the repository backend
	let factories: HashMap<&str, RepositoryFactory> =
		crew_storage::get_all_implementations().into_iter().collect();
	let factory = factories.get(config.storage.primary.as_str()).ok_or_else(|| {
		anyhow::anyhow!("unknown storage backend '{}'", config.storage.primary)
	})?;
	let repository: Arc<dyn OrderRepository> = factory(&config.primary_storage_config())?;
	tracing::info!(component = "storage", implementation = %config.storage.primary, "Loaded");

	// The service itself acts as the system: no actor is selected, and
	// only system commands (the expiry sweep) are dispatched here.
	let session = Arc::new(StaticSession::anonymous());
	let clock = Arc::new(SystemClock);
	let engine = StaffingEngine::new(
		repository.clone(),
		session,
		clock,
		config.staffing.application_limit,
	);

	let mut snapshots = repository.observe_orders();
	let mut sweep = tokio::time::interval(Duration::from_secs(
		config.staffing.refresh_interval_seconds,
	));

	loop {
		tokio::select! {
			_ = sweep.tick() => {
				if let Err(e) = engine.dispatch(Command::Refresh).await {
					tracing::warn!(reason = %e, "Expiry sweep failed");
				}
			}

			emission = snapshots.recv() => {
				match emission {
					Ok(snapshot) => {
						tracing::debug!(orders = snapshot.len(), "Snapshot updated");
					}
					Err(RecvError::Lagged(skipped)) => {
						tracing::debug!(skipped, "Snapshot feed lagged");
					}
					Err(RecvError::Closed) => break,
				}
			}

			// Shutdown signal
			_ = tokio::signal::ctrl_c() => {
				break;
			}
		}
	}

	tracing::info!("Stopped staffing service");
	Ok(())
}
