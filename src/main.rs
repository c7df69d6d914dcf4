//! Countries - terminal host for the countries list screen
//!
//! # Overview
//!
//! Initializes:
//! - Configuration loading ([`ConfigManager`]: `countries.yaml` + `COUNTRIES_*` env)
//! - Logging infrastructure (file rotation, optional stderr mirror)
//! - Tokio async runtime for the load operation
//! - State management ([`StateManager`]) and the countries interactor
//! - The frame presenter ([`EventLoopBridge`]) writing to stdout
//!
//! # Execution Flow
//!
//! 1. Parse arguments, load config, initialize logging
//! 2. Create the runtime, state manager, repository and interactor
//! 3. Spawn the countries list task; its first render starts the load
//! 4. Present a frame per relevant state change until the list settles
//! 5. Apply `--select` as a deep link and present the detail frame
//! 6. Flush frames, log metrics, shut the runtime down with a 5s timeout

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use countries::services::{Interactors, RealCountriesInteractor, RestCountriesRepository};
use countries::ui::{CountriesList, CountriesListAction, EventLoopBridge, EventLoopBridgeHandle};
use countries::{APP_NAME, ConfigManager, CountryCode, StateManager, VERSION, logging};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Parser)]
#[command(name = "countries", version, about = "Browse the list of countries")]
struct Args {
    /// Directory containing countries.yaml
    #[arg(long, default_value = "config")]
    config_dir: Utf8PathBuf,

    /// Log at debug level regardless of the config file
    #[arg(long)]
    debug: bool,

    /// Open the detail screen for this country code once the list is loaded
    #[arg(long, value_name = "CODE")]
    select: Option<CountryCode>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(&args.config_dir)?;
    let mut config = config_manager.load_app_config()?;
    if args.debug {
        config.logging.debug_mode = true;
    }

    let _log_guard = logging::init_logging(&config.logging)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("countries-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let state_manager = Arc::new(StateManager::new());
    let repository = Arc::new(RestCountriesRepository::new(&config.api)?);
    tracing::info!("Country data service: {}", repository.base_url());

    let interactor = RealCountriesInteractor::new(
        repository,
        Arc::clone(&state_manager),
        runtime.handle().clone(),
    );
    let interactors = Interactors::new(Arc::new(interactor));

    let bridge = EventLoopBridge::new(runtime.handle().clone(), Box::new(std::io::stdout()));

    // The screen runs as a runtime task; this thread only waits for it
    let (done_tx, done_rx) = oneshot::channel();
    let state = Arc::clone(&state_manager);
    let frames = bridge.handle();
    let select = args.select;
    bridge.spawn_async(move || async move {
        run_screen(state, interactors, frames, select).await;
        let _ = done_tx.send(());
    });

    if runtime.block_on(done_rx).is_err() {
        tracing::warn!("Countries list task ended without finishing");
    }

    // Writes out every frame still queued
    bridge.shutdown();

    state_manager.metrics().log_summary();
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");
    Ok(())
}

/// Drive the countries list until it settles, then apply the deep link.
///
/// Consumes the frame handle so the presenter can drain once this returns.
async fn run_screen(
    state: Arc<StateManager>,
    interactors: Interactors,
    frames: EventLoopBridgeHandle,
    mut select: Option<CountryCode>,
) {
    let mut screen = CountriesList::new(state, interactors);
    let mut frame = screen.body();
    frames.present(&frame);

    loop {
        if frame.is_settled() {
            match select.take() {
                Some(code) => screen.dispatch(CountriesListAction::Select(code)),
                None => break,
            }
        }

        tokio::select! {
            next = screen.next_frame() => match next {
                Some(next) => {
                    frame = next;
                    frames.present(&frame);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, closing the countries list");
                break;
            }
        }
    }
}
