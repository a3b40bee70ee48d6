//! Reduction of a 3-hour forecast list into per-day summaries.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::{
    convert::{local_datetime, round_half_up},
    model::{DaySummary, ForecastEntry},
};

/// At most one week of days is shown.
pub const MAX_DAYS: usize = 7;

const NOON: u32 = 12;

struct DayBucket<'a> {
    date: NaiveDate,
    min: f64,
    max: f64,
    representative: &'a ForecastEntry,
    representative_distance: u32,
}

/// Groups `entries` into calendar days of the location and summarizes each day.
///
/// Days are keyed by the date of `timestamp + utc_offset_secs` read as UTC and are
/// returned in the order they first appear, truncated to [`MAX_DAYS`]. The
/// representative entry is the one whose local hour is closest to noon; the first
/// entry wins a tie. Entries whose local time is out of range are skipped.
pub fn summarize_days(entries: &[ForecastEntry], utc_offset_secs: i64) -> Vec<DaySummary> {
    let mut buckets: Vec<DayBucket<'_>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        let Some(local) = local_datetime(entry.timestamp, utc_offset_secs) else {
            tracing::debug!(timestamp = entry.timestamp, "skipping forecast entry outside the calendar range");
            continue;
        };
        let date = local.date();
        let distance = local.hour().abs_diff(NOON);

        match index.get(&date) {
            Some(&slot) => {
                let bucket = &mut buckets[slot];
                bucket.min = bucket.min.min(entry.temp_min);
                bucket.max = bucket.max.max(entry.temp_max);
                if distance < bucket.representative_distance {
                    bucket.representative = entry;
                    bucket.representative_distance = distance;
                }
            }
            None => {
                index.insert(date, buckets.len());
                buckets.push(DayBucket {
                    date,
                    min: entry.temp_min,
                    max: entry.temp_max,
                    representative: entry,
                    representative_distance: distance,
                });
            }
        }
    }

    buckets
        .into_iter()
        .take(MAX_DAYS)
        .map(|bucket| {
            // The representative is local to this day, so its weekday is the bucket's.
            let weekday = bucket.date.weekday();
            DaySummary {
                date: bucket.date,
                min: round_half_up(bucket.min),
                max: round_half_up(bucket.max),
                representative: bucket.representative.clone(),
                weekday,
            }
        })
        .collect()
}
