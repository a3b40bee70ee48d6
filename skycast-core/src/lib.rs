//! Core library for the `skycast` weather widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind provider traits
//! - City autocomplete with a TTL cache and keystroke debouncing
//! - Reduction of the 3-hour forecast into hourly and daily strips
//! - The widget session that ties lookups together
//!
//! It is used by `skycast-cli`, but can also be reused by other front-ends.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod suggest;

pub use aggregate::summarize_days;
pub use config::{Config, SuggestConfig, Units};
pub use convert::Locale;
pub use error::WidgetError;
pub use model::{
    Condition, Coordinates, DaySummary, Forecast, ForecastEntry, HourlySlot, SuggestionRecord,
    WeatherSnapshot,
};
pub use provider::{CitySearch, WeatherProvider, openweather::OpenWeatherProvider};
pub use session::{LookupOutcome, SessionState, WeatherSession, WeatherView};
pub use suggest::{Debouncer, Suggester, normalize_query};
