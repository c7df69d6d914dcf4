use crate::models::{ApiSettings, Country, LoadError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Fields requested from the country data service.
const COUNTRY_FIELDS: &str = "name,population,flag,alpha3Code";

/// Source of the country list.
///
/// The load operation only depends on this trait, so tests and alternative
/// hosts can swap the HTTP implementation out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountriesRepository: Send + Sync {
    async fn load_countries(&self) -> Result<Vec<Country>, LoadError>;
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LoadError::Timeout
        } else if let Some(status) = e.status() {
            LoadError::Status {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            LoadError::Decode(e.to_string())
        } else {
            LoadError::Network(e.to_string())
        }
    }
}

/// REST client for the country data service.
pub struct RestCountriesRepository {
    client: Client,
    base_url: String,
}

impl RestCountriesRepository {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn all_countries_url(&self) -> String {
        format!("{}/all?fields={}", self.base_url, COUNTRY_FIELDS)
    }
}

#[async_trait]
impl CountriesRepository for RestCountriesRepository {
    async fn load_countries(&self) -> Result<Vec<Country>, LoadError> {
        let url = self.all_countries_url();
        tracing::debug!(url = %url, "Requesting country list");

        let start = Instant::now();
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = %status, url = %url, "Country service error");
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let countries: Vec<Country> = response.json().await?;

        tracing::info!(
            count = countries.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Country list received"
        );
        Ok(countries)
    }
}
