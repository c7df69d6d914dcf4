use crate::models::country::{Country, CountryCode};
use crate::models::loadable::Loadable;
use serde::{Deserialize, Serialize};

/// Single source of truth for all application state.
///
/// # Thread Safety
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`].
/// Screens never write it directly; they go through the manager's named
/// operations or through an interactor.
///
/// # Related Types
///
/// - [`crate::state::StateManager`]: Thread-safe wrapper with change publication
/// - [`crate::state::Deduplicated`]: Per-screen snapshot filter over this state
/// - [`CountriesListSnapshot`] / [`CountryDetailsSnapshot`]: The projections screens observe
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub user_data: UserData,
    pub routing: Routing,
    pub system: SystemState,
}

/// Data fetched from remote services.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserData {
    pub countries: Loadable<Vec<Country>>,
}

/// Navigation selections, one entry per screen.
///
/// Serializable so navigation can be restored from global state alone.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routing {
    #[serde(default)]
    pub countries_list: CountriesListRouting,
    #[serde(default)]
    pub country_details: CountryDetailsRouting,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountriesListRouting {
    /// Country whose detail screen is pushed, if any.
    pub country_details: Option<CountryCode>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryDetailsRouting {
    /// Whether the full-size flag sheet is presented.
    pub flag_sheet: bool,
}

/// Host lifecycle flags. No screen projects these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemState {
    pub is_active: bool,
}

impl Default for SystemState {
    fn default() -> Self {
        Self { is_active: true }
    }
}

/// The part of [`AppState`] the countries list screen re-renders on.
#[derive(Clone, Debug, PartialEq)]
pub struct CountriesListSnapshot {
    pub countries: Loadable<Vec<Country>>,
    pub routing: CountriesListRouting,
}

/// The part of [`AppState`] the country details screen re-renders on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountryDetailsSnapshot {
    pub routing: CountryDetailsRouting,
}

impl AppState {
    pub fn countries_list_snapshot(&self) -> CountriesListSnapshot {
        CountriesListSnapshot {
            countries: self.user_data.countries.clone(),
            routing: self.routing.countries_list.clone(),
        }
    }

    pub fn country_details_snapshot(&self) -> CountryDetailsSnapshot {
        CountryDetailsSnapshot {
            routing: self.routing.country_details.clone(),
        }
    }

    /// Look up a country in the loaded list, or in the stale list while a
    /// refresh is in flight.
    pub fn find_country(&self, code: &CountryCode) -> Option<&Country> {
        self.user_data
            .countries
            .value()
            .and_then(|countries| countries.iter().find(|c| c.code() == code))
    }
}
