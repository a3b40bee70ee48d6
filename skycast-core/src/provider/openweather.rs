use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::{DEFAULT_BASE_URL, Units},
    model::{Condition, Coordinates, Forecast, ForecastEntry, SuggestionRecord, WeatherSnapshot},
};

use super::{CitySearch, WeatherProvider};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    lang: String,
    suggest_limit: u8,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            lang: "en".to_string(),
            suggest_limit: 5,
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_lang(mut self, lang: &str) -> Self {
        self.lang = lang.to_string();
        self
    }

    pub fn with_suggest_limit(mut self, limit: u8) -> Self {
        self.suggest_limit = limit;
        self
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        tracing::debug!(endpoint = path, bytes = body.len(), "OpenWeather response received");

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_by_coords(&self, coords: Coordinates) -> Result<WeatherSnapshot> {
        let parsed: OwCurrentResponse = self
            .get_json(
                "/data/2.5/weather",
                "current weather",
                &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
            )
            .await?;
        Ok(parsed.into_snapshot())
    }

    async fn current_by_name(&self, name: &str) -> Result<WeatherSnapshot> {
        let parsed: OwCurrentResponse = self
            .get_json("/data/2.5/weather", "current weather", &[("q", name.to_string())])
            .await?;
        Ok(parsed.into_snapshot())
    }

    async fn forecast_by_coords(&self, coords: Coordinates) -> Result<Forecast> {
        let parsed: OwForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                "forecast",
                &[("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())],
            )
            .await?;

        Ok(Forecast {
            utc_offset_secs: parsed.city.timezone,
            entries: parsed.list.into_iter().map(OwForecastEntry::into_entry).collect(),
        })
    }
}

#[async_trait]
impl CitySearch for OpenWeatherProvider {
    async fn search_cities(&self, query: &str) -> Result<Vec<SuggestionRecord>> {
        let parsed: Vec<OwGeoCandidate> = self
            .get_json(
                "/geo/1.0/direct",
                "geocoding",
                &[("q", query.to_string()), ("limit", self.suggest_limit.to_string())],
            )
            .await?;

        Ok(parsed
            .into_iter()
            .map(|candidate| candidate.into_suggestion(&self.lang))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
    #[serde(default)]
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    dt: i64,
    #[serde(default)]
    timezone: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    #[serde(default)]
    visibility: u32,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_snapshot(self) -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: self.name,
            country: self.sys.country,
            coordinates: Coordinates {
                lat: self.coord.lat,
                lon: self.coord.lon,
            },
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            wind_speed: self.wind.speed,
            cloud_cover_pct: self.clouds.all,
            visibility_m: self.visibility,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            utc_offset_secs: self.timezone,
            observed_at: self.dt,
            condition: first_condition(self.weather),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

impl OwForecastEntry {
    fn into_entry(self) -> ForecastEntry {
        let temp = self.main.temp;
        ForecastEntry {
            timestamp: self.dt,
            temp,
            temp_min: self.main.temp_min.unwrap_or(temp),
            temp_max: self.main.temp_max.unwrap_or(temp),
            condition: first_condition(self.weather),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwGeoCandidate {
    name: String,
    #[serde(default)]
    local_names: HashMap<String, String>,
    lat: f64,
    lon: f64,
    country: String,
    state: Option<String>,
}

impl OwGeoCandidate {
    fn into_suggestion(self, lang: &str) -> SuggestionRecord {
        let mut display = self
            .local_names
            .get(lang)
            .cloned()
            .unwrap_or(self.name);
        if let Some(state) = self.state.filter(|s| !s.is_empty()) {
            display.push_str(", ");
            display.push_str(&state);
        }
        display.push_str(", ");
        display.push_str(&self.country);

        SuggestionRecord {
            display,
            lat: self.lat,
            lon: self.lon,
        }
    }
}

fn first_condition(weather: Vec<OwWeather>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(|w| Condition {
            code: w.id,
            description: w.description,
            icon: w.icon,
        })
        .unwrap_or_else(Condition::unknown)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_label_prefers_local_name_and_includes_state() {
        let candidate: OwGeoCandidate = serde_json::from_value(serde_json::json!({
            "name": "Moscow",
            "local_names": { "ru": "Москва", "en": "Moscow" },
            "lat": 55.75,
            "lon": 37.61,
            "country": "RU",
            "state": "Moscow"
        }))
        .unwrap();

        let record = candidate.into_suggestion("ru");
        assert_eq!(record.display, "Москва, Moscow, RU");
        assert_eq!(record.lat, 55.75);
    }

    #[test]
    fn geo_label_falls_back_to_name_without_state() {
        let candidate: OwGeoCandidate = serde_json::from_value(serde_json::json!({
            "name": "Paris",
            "lat": 48.85,
            "lon": 2.35,
            "country": "FR"
        }))
        .unwrap();

        assert_eq!(candidate.into_suggestion("de").display, "Paris, FR");
    }

    #[test]
    fn forecast_entry_min_max_default_to_temp() {
        let entry: OwForecastEntry = serde_json::from_value(serde_json::json!({
            "dt": 1_705_320_000,
            "main": { "temp": 4.5, "feels_like": 2.0 },
            "weather": [{ "id": 500, "description": "light rain", "icon": "10d" }]
        }))
        .unwrap();

        let entry = entry.into_entry();
        assert_eq!(entry.temp_min, 4.5);
        assert_eq!(entry.temp_max, 4.5);
        assert_eq!(entry.condition.icon, "10d");
    }

    #[test]
    fn missing_weather_array_is_unknown_condition() {
        assert_eq!(first_condition(Vec::new()), Condition::unknown());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "я".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
