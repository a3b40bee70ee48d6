use crate::{
    Config,
    model::{Coordinates, Forecast, SuggestionRecord, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Read-only weather data source.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_by_coords(&self, coords: Coordinates) -> anyhow::Result<WeatherSnapshot>;

    async fn current_by_name(&self, name: &str) -> anyhow::Result<WeatherSnapshot>;

    async fn forecast_by_coords(&self, coords: Coordinates) -> anyhow::Result<Forecast>;
}

/// Geocoder used for autocomplete.
#[async_trait]
pub trait CitySearch: Send + Sync {
    async fn search_cities(&self, query: &str) -> anyhow::Result<Vec<SuggestionRecord>>;
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = config.require_api_key()?;

    Ok(OpenWeatherProvider::new(api_key.to_owned())
        .with_base_url(&config.base_url)
        .with_units(config.units)
        .with_lang(&config.lang)
        .with_suggest_limit(config.suggest.limit))
}
