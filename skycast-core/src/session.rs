//! State behind one weather widget: the last view shown and the last error.
//!
//! A weather lookup is followed by the dependent forecast lookup. Each lookup
//! takes a ticket; only the newest ticket may write state, so a slow response
//! never overwrites the result of a later query.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    aggregate::summarize_days,
    convert::{DEFAULT_HOURLY_SLOTS, hourly_strip},
    error::WidgetError,
    model::{DaySummary, HourlySlot, SuggestionRecord, WeatherSnapshot},
    provider::WeatherProvider,
};

/// Everything the widget renders for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub snapshot: WeatherSnapshot,
    pub hourly: Vec<HourlySlot>,
    pub days: Vec<DaySummary>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub view: Option<WeatherView>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Applied(Box<WeatherView>),
    /// A newer lookup started before this one finished.
    Superseded,
    /// Blank input; nothing was requested.
    Skipped,
}

#[derive(Debug)]
pub struct WeatherSession<P> {
    provider: P,
    latest: AtomicU64,
    state: Mutex<SessionState>,
}

impl<P: WeatherProvider> WeatherSession<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            latest: AtomicU64::new(0),
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Looks up current weather by city name, then its forecast.
    pub async fn search_by_name(&self, query: &str) -> Result<LookupOutcome, WidgetError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(LookupOutcome::Skipped);
        }

        let ticket = self.begin();
        tracing::info!(query, ticket, "weather lookup by name");
        let snapshot = self
            .provider
            .current_by_name(query)
            .await
            .map_err(WidgetError::CityNotFound);
        self.complete(ticket, snapshot).await
    }

    /// Looks up current weather at a picked suggestion's coordinates, then its forecast.
    pub async fn select_suggestion(
        &self,
        suggestion: &SuggestionRecord,
    ) -> Result<LookupOutcome, WidgetError> {
        let ticket = self.begin();
        tracing::info!(place = %suggestion.display, ticket, "weather lookup by coordinates");
        let snapshot = self
            .provider
            .current_by_coords(suggestion.coordinates())
            .await
            .map_err(WidgetError::Weather);
        self.complete(ticket, snapshot).await
    }

    fn begin(&self) -> u64 {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().error = None;
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    async fn complete(
        &self,
        ticket: u64,
        snapshot: Result<WeatherSnapshot, WidgetError>,
    ) -> Result<LookupOutcome, WidgetError> {
        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(err) => return self.fail(ticket, err),
        };

        if !self.is_current(ticket) {
            return Ok(LookupOutcome::Superseded);
        }

        let forecast = self
            .provider
            .forecast_by_coords(snapshot.coordinates)
            .await
            .map_err(WidgetError::Forecast);

        let (hourly, days, forecast_err) = match forecast {
            Ok(forecast) => (
                hourly_strip(&forecast.entries, forecast.utc_offset_secs, DEFAULT_HOURLY_SLOTS),
                summarize_days(&forecast.entries, forecast.utc_offset_secs),
                None,
            ),
            Err(err) => (Vec::new(), Vec::new(), Some(err)),
        };

        let view = WeatherView {
            snapshot,
            hourly,
            days,
        };

        let mut state = self.state.lock();
        if !self.is_current(ticket) {
            return Ok(LookupOutcome::Superseded);
        }
        state.view = Some(view.clone());

        match forecast_err {
            Some(err) => {
                tracing::warn!(ticket, error = %format!("{:#}", cause(&err)), "{err}");
                state.error = Some(err.to_string());
                Err(err)
            }
            None => {
                state.error = None;
                Ok(LookupOutcome::Applied(Box::new(view)))
            }
        }
    }

    fn fail(&self, ticket: u64, err: WidgetError) -> Result<LookupOutcome, WidgetError> {
        let mut state = self.state.lock();
        if !self.is_current(ticket) {
            return Ok(LookupOutcome::Superseded);
        }
        tracing::warn!(ticket, error = %format!("{:#}", cause(&err)), "{err}");
        state.error = Some(err.to_string());
        Err(err)
    }
}

fn cause(err: &WidgetError) -> &anyhow::Error {
    match err {
        WidgetError::CityNotFound(source)
        | WidgetError::Weather(source)
        | WidgetError::Forecast(source) => source,
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, time::Duration};

    use anyhow::anyhow;
    use async_trait::async_trait;

    use super::*;
    use crate::model::{Condition, Coordinates, Forecast, ForecastEntry};

    // 2024-01-15T00:00:00Z
    const MONDAY: i64 = 1_705_276_800;

    #[derive(Debug, Default)]
    struct FakeProvider {
        cities: HashMap<String, (Coordinates, Duration)>,
        forecast_fails: bool,
    }

    impl FakeProvider {
        fn with_city(mut self, name: &str, lat: f64, delay_ms: u64) -> Self {
            self.cities.insert(
                name.to_string(),
                (Coordinates { lat, lon: 0.0 }, Duration::from_millis(delay_ms)),
            );
            self
        }
    }

    fn snapshot(name: &str, coords: Coordinates) -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: name.to_string(),
            country: Some("XX".to_string()),
            coordinates: coords,
            temperature: 10.0,
            feels_like: 8.0,
            humidity_pct: 50,
            pressure_hpa: 1013.0,
            wind_speed: 3.0,
            cloud_cover_pct: 20,
            visibility_m: 10_000,
            sunrise: MONDAY + 6 * 3600,
            sunset: MONDAY + 18 * 3600,
            utc_offset_secs: 0,
            observed_at: MONDAY,
            condition: Condition::unknown(),
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_by_coords(&self, coords: Coordinates) -> anyhow::Result<WeatherSnapshot> {
            Ok(snapshot("Picked", coords))
        }

        async fn current_by_name(&self, name: &str) -> anyhow::Result<WeatherSnapshot> {
            let (coords, delay) = self
                .cities
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("404 city not found"))?;
            tokio::time::sleep(delay).await;
            Ok(snapshot(name, coords))
        }

        async fn forecast_by_coords(&self, _coords: Coordinates) -> anyhow::Result<Forecast> {
            if self.forecast_fails {
                return Err(anyhow!("502 bad gateway"));
            }
            let entries = (0..16)
                .map(|i| ForecastEntry {
                    timestamp: MONDAY + i * 3 * 3600,
                    temp: i as f64,
                    temp_min: i as f64,
                    temp_max: i as f64,
                    condition: Condition::unknown(),
                })
                .collect();
            Ok(Forecast {
                utc_offset_secs: 0,
                entries,
            })
        }
    }

    #[tokio::test]
    async fn search_builds_full_view() {
        let session = WeatherSession::new(FakeProvider::default().with_city("Oslo", 59.9, 0));

        let outcome = session.search_by_name("  Oslo ").await.unwrap();
        let LookupOutcome::Applied(view) = outcome else {
            panic!("expected applied outcome");
        };

        assert_eq!(view.snapshot.location_name, "Oslo");
        assert_eq!(view.hourly.len(), 8);
        assert_eq!(view.days.len(), 2);
        assert_eq!(view.days[0].max, 7);
        assert_eq!(view_name(&session.state()).as_deref(), Some("Oslo"));
        assert_eq!(session.state().error, None);
    }

    #[tokio::test]
    async fn blank_query_is_skipped() {
        let session = WeatherSession::new(FakeProvider::default());
        assert_eq!(session.search_by_name("   ").await.unwrap(), LookupOutcome::Skipped);
    }

    #[tokio::test]
    async fn unknown_city_reports_generic_message_and_keeps_previous_view() {
        let session = WeatherSession::new(FakeProvider::default().with_city("Oslo", 59.9, 0));
        session.search_by_name("Oslo").await.unwrap();

        let err = session.search_by_name("Atlantis").await.unwrap_err();

        assert_eq!(err.to_string(), "city not found");
        assert!(format!("{:#}", cause(&err)).contains("404"));
        let state = session.state();
        assert_eq!(state.error.as_deref(), Some("city not found"));
        assert_eq!(view_name(&state).as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn forecast_failure_keeps_snapshot() {
        let provider = FakeProvider {
            forecast_fails: true,
            ..FakeProvider::default()
        };
        let session = WeatherSession::new(provider);
        let pick = SuggestionRecord {
            display: "Somewhere, XX".to_string(),
            lat: 10.0,
            lon: 20.0,
        };

        let err = session.select_suggestion(&pick).await.unwrap_err();

        assert_eq!(err.to_string(), "forecast request failed");
        let state = session.state();
        let view = state.view.expect("snapshot should be kept");
        assert_eq!(view.snapshot.coordinates, Coordinates { lat: 10.0, lon: 20.0 });
        assert!(view.days.is_empty());
        assert_eq!(state.error.as_deref(), Some("forecast request failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_response_does_not_overwrite_newer() {
        let provider = FakeProvider::default()
            .with_city("Slowtown", 1.0, 2_000)
            .with_city("Quickville", 2.0, 10);
        let session = WeatherSession::new(provider);

        let (slow, quick) = tokio::join!(
            session.search_by_name("Slowtown"),
            async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                session.search_by_name("Quickville").await
            }
        );

        assert_eq!(slow.unwrap(), LookupOutcome::Superseded);
        assert!(matches!(quick.unwrap(), LookupOutcome::Applied(_)));
        assert_eq!(view_name(&session.state()).as_deref(), Some("Quickville"));
    }

    fn view_name(state: &SessionState) -> Option<String> {
        state
            .view
            .as_ref()
            .map(|view| view.snapshot.location_name.clone())
    }
}
