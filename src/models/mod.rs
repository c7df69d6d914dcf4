//! Data models for the countries application.
//!
//! - [`Loadable`]: Lifecycle of an asynchronously loaded value, with [`LoadError`]
//! - [`Country`] and [`CountryCode`]: What the country data service returns
//! - [`AppState`]: The global state container contents, plus the per-screen
//!   snapshots ([`CountriesListSnapshot`], [`CountryDetailsSnapshot`])
//! - [`AppConfig`]: Settings loaded from `countries.yaml`
//!
//! # Architecture Note
//!
//! State updates go through [`StateManager`](crate::state::StateManager); the
//! models themselves carry no synchronization.

pub mod app_state;
pub mod config;
pub mod country;
pub mod loadable;

pub use app_state::{
    AppState, CountriesListRouting, CountriesListSnapshot, CountryDetailsRouting,
    CountryDetailsSnapshot, Routing, SystemState, UserData,
};
pub use config::{ApiSettings, AppConfig, LoggingSettings};
pub use country::{Country, CountryCode, InvalidCountryCode};
pub use loadable::{LoadError, Loadable};
