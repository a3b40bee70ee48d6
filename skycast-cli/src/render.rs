//! Plain-text panels for the terminal.

use skycast_core::{
    DaySummary, HourlySlot, Locale, SuggestionRecord, Units, WeatherSnapshot, WeatherView,
    convert::{format_local_time, hpa_to_mmhg, meters_to_km, round_half_up},
};

/// Joins lines into a block that ends with a newline.
fn block(lines: impl IntoIterator<Item = String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

pub fn current_panel(snapshot: &WeatherSnapshot, units: Units) -> String {
    let deg = units.temperature_suffix();

    let title = match &snapshot.country {
        Some(country) => format!("{}, {}", snapshot.location_name, country),
        None => snapshot.location_name.clone(),
    };

    block([
        title,
        format!(
            "  {}{deg}  {}",
            round_half_up(snapshot.temperature),
            snapshot.condition.description
        ),
        format!("  Feels like: {}{deg}", round_half_up(snapshot.feels_like)),
        format!("  Humidity:   {}%", snapshot.humidity_pct),
        format!(
            "  Pressure:   {} mmHg ({} hPa)",
            hpa_to_mmhg(snapshot.pressure_hpa),
            round_half_up(snapshot.pressure_hpa)
        ),
        format!("  Wind:       {:.2} {}", snapshot.wind_speed, units.wind_suffix()),
        format!("  Clouds:     {}%", snapshot.cloud_cover_pct),
        format!(
            "  Visibility: {} km",
            round_half_up(meters_to_km(snapshot.visibility_m))
        ),
        format!(
            "  Sunrise {}  Sunset {}",
            format_local_time(snapshot.sunrise, snapshot.utc_offset_secs),
            format_local_time(snapshot.sunset, snapshot.utc_offset_secs)
        ),
    ])
}

pub fn hourly_panel(slots: &[HourlySlot]) -> String {
    let rows = slots.iter().map(|slot| {
        format!("  {}  {:>4}°  {}", slot.label, slot.temp, slot.condition.description)
    });
    block(std::iter::once("Hourly".to_string()).chain(rows))
}

pub fn week_panel(days: &[DaySummary], locale: Locale) -> String {
    let rows = days.iter().map(|day| {
        format!(
            "  {:<12} {:>4}° / {:>4}°  {}",
            day.weekday_label(locale),
            day.max,
            day.min,
            day.description()
        )
    });
    block(std::iter::once("Week".to_string()).chain(rows))
}

pub fn view(view: &WeatherView, units: Units, locale: Locale) -> String {
    let mut out = current_panel(&view.snapshot, units);
    if !view.hourly.is_empty() {
        out.push('\n');
        out.push_str(&hourly_panel(&view.hourly));
    }
    if !view.days.is_empty() {
        out.push('\n');
        out.push_str(&week_panel(&view.days, locale));
    }
    out
}

pub fn suggestions(records: &[SuggestionRecord]) -> String {
    block(
        records
            .iter()
            .map(|record| format!("{}  ({:.4}, {:.4})", record.display, record.lat, record.lon)),
    )
}
