// UI module - screens and the frame presenter
//
// This module contains:
// - CountriesList / CountryDetails: screens bound to slices of the global state
// - view: the declarative frames screens produce
// - CancelBag: ties a screen's loads to the screen's lifetime
// - EventLoopBridge: hands frames from tokio tasks to the presenter thread

pub mod bridge;
pub mod cancel_bag;
pub mod countries_list;
pub mod country_details;
pub mod view;

pub use bridge::{EventLoopBridge, EventLoopBridgeHandle};
pub use cancel_bag::CancelBag;
pub use countries_list::{CountriesList, CountriesListAction};
pub use country_details::{CountryDetails, CountryDetailsAction};
pub use view::{Content, CountryDetailsView, CountryRow, Screen};
