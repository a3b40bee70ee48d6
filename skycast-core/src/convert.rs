//! Unit conversions and local-time labels used when rendering weather data.
//!
//! Local time is always computed as `timestamp + utc_offset` read as UTC, so the
//! output never depends on the timezone of the machine doing the rendering.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::{ForecastEntry, HourlySlot};

const HPA_TO_MMHG: f64 = 0.75006;

/// Number of slots shown in the hourly strip (24 hours at 3-hour resolution).
pub const DEFAULT_HOURLY_SLOTS: usize = 8;

pub fn hpa_to_mmhg(hpa: f64) -> i32 {
    round_half_up(hpa * HPA_TO_MMHG)
}

pub fn meters_to_km(meters: u32) -> f64 {
    f64::from(meters) / 1000.0
}

/// Rounds to the nearest integer, with halves going towards positive infinity.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// The location's wall-clock time for a unix timestamp.
pub fn local_datetime(timestamp: i64, utc_offset_secs: i64) -> Option<NaiveDateTime> {
    let shifted = timestamp.checked_add(utc_offset_secs)?;
    DateTime::from_timestamp(shifted, 0).map(|dt| dt.naive_utc())
}

/// `HH:MM` in the location's local time, or `--:--` when out of range.
pub fn format_local_time(timestamp: i64, utc_offset_secs: i64) -> String {
    local_datetime(timestamp, utc_offset_secs)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// The first `count` forecast entries labelled with their local time.
pub fn hourly_strip(entries: &[ForecastEntry], utc_offset_secs: i64, count: usize) -> Vec<HourlySlot> {
    entries
        .iter()
        .take(count)
        .map(|entry| HourlySlot {
            label: format_local_time(entry.timestamp, utc_offset_secs),
            temp: round_half_up(entry.temp),
            condition: entry.condition.clone(),
        })
        .collect()
}

/// Language used for weekday labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Falls back to English for languages without weekday names.
    pub fn from_lang(lang: &str) -> Self {
        Self::try_from(lang).unwrap_or_default()
    }

    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        match self {
            Locale::En => match weekday {
                Weekday::Mon => "Monday",
                Weekday::Tue => "Tuesday",
                Weekday::Wed => "Wednesday",
                Weekday::Thu => "Thursday",
                Weekday::Fri => "Friday",
                Weekday::Sat => "Saturday",
                Weekday::Sun => "Sunday",
            },
            Locale::Ru => match weekday {
                Weekday::Mon => "понедельник",
                Weekday::Tue => "вторник",
                Weekday::Wed => "среда",
                Weekday::Thu => "четверг",
                Weekday::Fri => "пятница",
                Weekday::Sat => "суббота",
                Weekday::Sun => "воскресенье",
            },
        }
    }
}

impl TryFrom<&str> for Locale {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            _ => Err(anyhow!("Unsupported locale '{value}'. Supported locales: en, ru.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Condition;

    fn entry(timestamp: i64, temp: f64) -> ForecastEntry {
        ForecastEntry {
            timestamp,
            temp,
            temp_min: temp,
            temp_max: temp,
            condition: Condition::unknown(),
        }
    }

    #[test]
    fn converts_pressure_to_mmhg() {
        assert_eq!(hpa_to_mmhg(1013.0), 760);
        assert_eq!(hpa_to_mmhg(1000.0), 750);
    }

    #[test]
    fn converts_visibility_to_km() {
        assert_eq!(meters_to_km(10_000), 10.0);
        assert_eq!(meters_to_km(2_500), 2.5);
    }

    #[test]
    fn rounds_halves_upwards() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(7.49), 7);
    }

    #[test]
    fn local_time_applies_offset() {
        // 2024-01-15T10:00:00Z at UTC+3
        assert_eq!(format_local_time(1_705_312_800, 3 * 3600), "13:00");
        assert_eq!(format_local_time(1_705_312_800, -5 * 3600), "05:00");
    }

    #[test]
    fn local_time_out_of_range_is_placeholder() {
        assert_eq!(format_local_time(i64::MAX, 1), "--:--");
    }

    #[test]
    fn hourly_strip_takes_leading_entries() {
        let entries: Vec<_> = (0..10).map(|i| entry(1_705_276_800 + i * 10_800, f64::from(i as i32))).collect();
        let strip = hourly_strip(&entries, 0, DEFAULT_HOURLY_SLOTS);

        assert_eq!(strip.len(), 8);
        assert_eq!(strip[0].label, "00:00");
        assert_eq!(strip[1].label, "03:00");
        assert_eq!(strip[7].temp, 7);
    }

    #[test]
    fn locale_parsing_and_fallback() {
        assert_eq!(Locale::try_from("RU").unwrap(), Locale::Ru);
        assert!(Locale::try_from("de").is_err());
        assert_eq!(Locale::from_lang("de"), Locale::En);
        assert_eq!(Locale::Ru.weekday_name(Weekday::Wed), "среда");
        assert_eq!(Locale::En.weekday_name(Weekday::Sun), "Sunday");
    }
}
