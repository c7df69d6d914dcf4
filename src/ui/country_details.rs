use crate::models::{AppState, Country, CountryDetailsSnapshot};
use crate::state::{Deduplicated, StateManager};
use crate::ui::view::CountryDetailsView;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryDetailsAction {
    ShowFlag,
    HideFlag,
}

/// Detail screen for one country.
///
/// Observes only `routing.country_details`; the country itself is handed in
/// by whoever opened the screen.
pub struct CountryDetails {
    country: Country,
    app_state: Deduplicated<CountryDetailsSnapshot>,
}

impl CountryDetails {
    pub fn new(country: Country, state: Arc<StateManager>) -> Self {
        tracing::debug!(code = %country.code(), "Opening country details");
        Self {
            country,
            app_state: Deduplicated::new(state, AppState::country_details_snapshot),
        }
    }

    pub fn country(&self) -> &Country {
        &self.country
    }

    /// Show a newer copy of the same country, e.g. after a refresh.
    ///
    /// Returns true if anything about the country changed.
    pub fn replace_country(&mut self, country: Country) -> bool {
        if self.country == country {
            return false;
        }
        tracing::debug!(code = %country.code(), "Country details refreshed");
        self.country = country;
        true
    }

    pub fn body(&self) -> CountryDetailsView {
        CountryDetailsView {
            name: self.country.name.clone(),
            code: self.country.code().clone(),
            population: self.country.formatted_population(),
            flag: self.country.flag.clone(),
            flag_sheet: self.app_state.current().routing.flag_sheet,
        }
    }

    pub fn dispatch(&mut self, action: CountryDetailsAction) {
        let manager = self.app_state.manager();
        match action {
            CountryDetailsAction::ShowFlag => manager.set_flag_sheet(true),
            CountryDetailsAction::HideFlag => manager.set_flag_sheet(false),
        };
    }

    /// Render if a relevant change is pending, without waiting.
    pub fn poll_frame(&mut self) -> Option<CountryDetailsView> {
        if self.app_state.drain().is_empty() {
            None
        } else {
            Some(self.body())
        }
    }

    /// Wait for the next relevant change and render it.
    pub async fn next_frame(&mut self) -> Option<CountryDetailsView> {
        self.app_state.changed().await?;
        Some(self.body())
    }
}
