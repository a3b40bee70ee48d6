use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::convert::Locale;

/// A latitude/longitude pair as returned by the geocoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Short condition data shared by snapshots and forecast entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub code: u32,
    pub description: String,
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            code: 0,
            description: "Unknown".to_string(),
            icon: String::new(),
        }
    }
}

/// Current conditions for a location. Replaced wholesale on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub country: Option<String>,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed: f64,
    pub cloud_cover_pct: u8,
    pub visibility_m: u32,
    pub sunrise: i64,
    pub sunset: i64,
    pub utc_offset_secs: i64,
    pub observed_at: i64,
    pub condition: Condition,
}

/// One 3-hour forecast sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: i64,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub condition: Condition,
}

/// The forecast list together with the location's UTC offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub utc_offset_secs: i64,
    pub entries: Vec<ForecastEntry>,
}

/// One calendar day reduced from forecast entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub min: i32,
    pub max: i32,
    /// Entry closest to local noon.
    pub representative: ForecastEntry,
    pub weekday: Weekday,
}

impl DaySummary {
    pub fn icon(&self) -> &str {
        &self.representative.condition.icon
    }

    pub fn description(&self) -> &str {
        &self.representative.condition.description
    }

    pub fn weekday_label(&self, locale: Locale) -> &'static str {
        locale.weekday_name(self.weekday)
    }
}

/// A forecast entry labelled with its local time for the hourly strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlySlot {
    pub label: String,
    pub temp: i32,
    pub condition: Condition,
}

/// Geocoded autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub display: String,
    pub lat: f64,
    pub lon: f64,
}

impl SuggestionRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}
