// Countries list screen
//
// Binds to the countries slice of the global state through a Deduplicated
// filter, renders one of the four load branches, and turns user intent into
// interactor calls or routing updates.

use crate::models::{AppState, CountriesListSnapshot, Country, CountryCode, Loadable};
use crate::services::Interactors;
use crate::state::{Deduplicated, StateManager};
use crate::ui::cancel_bag::CancelBag;
use crate::ui::country_details::{CountryDetails, CountryDetailsAction};
use crate::ui::view::{Content, CountryDetailsView, CountryRow, Screen};
use std::sync::Arc;

pub const TITLE: &str = "Countries";

/// User intent on the countries list.
#[derive(Debug, Clone, PartialEq)]
pub enum CountriesListAction {
    /// Reload while showing the current list
    Refresh,
    /// Reload after a failure
    Retry,
    /// Push the detail screen for a country
    Select(CountryCode),
    /// Pop the detail screen
    Back,
    /// Present a detail screen modally; local to this screen
    PresentModal(Country),
    DismissModal,
}

/// The countries list screen.
///
/// Holds no business state. Selection lives in routing state; the only local
/// state is the modal, which no other screen needs. Dropping the screen
/// cancels any load it started.
pub struct CountriesList {
    app_state: Deduplicated<CountriesListSnapshot>,
    interactors: Interactors,
    cancel_bag: CancelBag,
    pushed: Option<CountryDetails>,
    modal: Option<CountryDetails>,
}

impl CountriesList {
    pub fn new(state: Arc<StateManager>, interactors: Interactors) -> Self {
        Self {
            app_state: Deduplicated::new(state, AppState::countries_list_snapshot),
            interactors,
            cancel_bag: CancelBag::new(),
            pushed: None,
            modal: None,
        }
    }

    /// The snapshot the last frame was rendered from.
    pub fn snapshot(&self) -> &CountriesListSnapshot {
        self.app_state.current()
    }

    /// Render the current snapshot.
    ///
    /// Rendering `NotRequested` is the screen's first appearance and starts
    /// the load.
    pub fn body(&mut self) -> Screen {
        let snapshot = self.app_state.current().clone();
        let selected = snapshot.routing.country_details.as_ref();

        let content = match &snapshot.countries {
            Loadable::NotRequested => {
                self.on_first_appear();
                Content::Placeholder
            }
            Loadable::Loading(previous) => Content::Loading {
                stale: previous.as_deref().map(|countries| rows(countries, selected)),
            },
            Loadable::Loaded(countries) => Content::List(rows(countries, selected)),
            Loadable::Failed(error) => Content::error(error),
        };

        self.sync_pushed(&snapshot);

        Screen {
            title: TITLE.to_string(),
            content,
            pushed: self.pushed.as_mut().map(details_view),
            modal: self.modal.as_mut().map(details_view),
        }
    }

    pub fn dispatch(&mut self, action: CountriesListAction) {
        tracing::debug!(?action, "Countries list action");
        match action {
            CountriesListAction::Refresh | CountriesListAction::Retry => self.load_countries(),
            CountriesListAction::Select(code) => {
                self.app_state.manager().show_country_details(Some(code));
            }
            CountriesListAction::Back => {
                self.app_state.manager().show_country_details(None);
            }
            CountriesListAction::PresentModal(country) => {
                let state = Arc::clone(self.app_state.manager());
                self.modal = Some(CountryDetails::new(country, state));
            }
            CountriesListAction::DismissModal => {
                // Backing out of the last detail screen clears its routing
                if self.modal.take().is_some() && self.pushed.is_none() {
                    self.app_state.manager().set_flag_sheet(false);
                }
            }
        }
    }

    /// Route an action to the detail screen on top: the modal if one is
    /// presented, otherwise the pushed screen.
    ///
    /// Returns false when no detail screen is open.
    pub fn dispatch_details(&mut self, action: CountryDetailsAction) -> bool {
        match self.modal.as_mut().or(self.pushed.as_mut()) {
            Some(details) => {
                details.dispatch(action);
                true
            }
            None => {
                tracing::debug!(?action, "No detail screen open");
                false
            }
        }
    }

    /// Wait for the next change relevant to this screen or to an open detail
    /// screen, and render it.
    ///
    /// Returns `None` once the state manager is gone.
    pub async fn next_frame(&mut self) -> Option<Screen> {
        tokio::select! {
            changed = self.app_state.changed() => {
                changed?;
            }
            Some(_) = details_changed(self.pushed.as_mut()) => {}
            Some(_) = details_changed(self.modal.as_mut()) => {}
        }
        Some(self.body())
    }

    /// Render if a relevant change is pending, without waiting.
    pub fn poll_frame(&mut self) -> Option<Screen> {
        let list_changed = !self.app_state.drain().is_empty();
        // Drain every open detail screen, not just the first with news
        let details_changed = [self.pushed.as_mut(), self.modal.as_mut()]
            .into_iter()
            .flatten()
            .fold(false, |changed, details| {
                let pending = details.poll_frame().is_some();
                changed || pending
            });

        if list_changed || details_changed {
            Some(self.body())
        } else {
            None
        }
    }

    fn on_first_appear(&mut self) {
        // The snapshot may lag the live state; only start a load if nothing
        // has been requested yet.
        if self
            .app_state
            .read(|s| s.user_data.countries.is_not_requested())
        {
            self.load_countries();
        }
    }

    fn load_countries(&mut self) {
        let handle = self.interactors.countries.load_countries();
        self.cancel_bag.store(handle);
    }

    /// Keep the pushed detail screen in line with routing state and with the
    /// latest copy of the selected country.
    fn sync_pushed(&mut self, snapshot: &CountriesListSnapshot) {
        let Some(code) = &snapshot.routing.country_details else {
            self.pushed = None;
            return;
        };

        let country = snapshot
            .countries
            .value()
            .and_then(|countries| countries.iter().find(|c| c.code() == code))
            .cloned();

        // Same selection: keep the screen (and its subscription), refresh its data
        if let Some(details) = self
            .pushed
            .as_mut()
            .filter(|details| details.country().code() == code)
        {
            if let Some(country) = country {
                details.replace_country(country);
            }
            return;
        }

        if country.is_none() {
            tracing::debug!(code = %code, "Selected country is not in the list");
        }

        let state = self.app_state.manager();
        self.pushed = country.map(|country| CountryDetails::new(country, Arc::clone(state)));
    }
}

fn rows(countries: &[Country], selected: Option<&CountryCode>) -> Vec<CountryRow> {
    countries
        .iter()
        .map(|country| CountryRow::new(country, selected))
        .collect()
}

fn details_view(details: &mut CountryDetails) -> CountryDetailsView {
    details.poll_frame().unwrap_or_else(|| details.body())
}

/// Next frame of an open detail screen; never resolves when none is open.
async fn details_changed(details: Option<&mut CountryDetails>) -> Option<CountryDetailsView> {
    match details {
        Some(details) => details.next_frame().await,
        None => std::future::pending().await,
    }
}
