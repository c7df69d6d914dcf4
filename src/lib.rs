// Countries - country list screen over a single observable application state
//
// This is the library crate containing the state container, the load
// operation, and the screens. The binary crate (main.rs) renders the screens
// as text in a terminal.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AppConfig, AppState, Country, CountryCode, LoadError, Loadable};
pub use state::{Deduplicated, StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
