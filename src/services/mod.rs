//! Services module - loading country data into the global state.
//!
//! # Components
//!
//! - [`CountriesRepository`]: Where the country list comes from. The default
//!   [`RestCountriesRepository`] calls the country data service over HTTP.
//! - [`CountriesInteractor`]: The load operation screens trigger. The default
//!   [`RealCountriesInteractor`] writes `Loading -> Loaded | Failed` into
//!   [`StateManager`](crate::state::StateManager) and hands back a
//!   cancellable [`LoadHandle`].
//! - [`Interactors`]: The bundle of interactors injected into screens.
//!
//! Nothing here depends on the UI layer.

pub mod countries;
pub mod interactor;

pub use countries::{CountriesRepository, RestCountriesRepository};
pub use interactor::{
    CountriesInteractor, Interactors, LoadHandle, RealCountriesInteractor, StubCountriesInteractor,
};
