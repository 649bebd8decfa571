//! When the conversation happens

use super::rank_by_count;
use crate::models::{DayCount, Message, TemporalPatterns};
use chrono::{Datelike, Timelike, Weekday};
use std::collections::BTreeMap;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Hour-of-day and weekday activity
///
/// Peak hour and most active day break ties in favour of whichever
/// occurs first in the conversation.
pub fn analyze_temporal_patterns(messages: &[Message]) -> TemporalPatterns {
    let hours = rank_by_count(messages.iter().map(|m| m.timestamp.hour()));
    let days = rank_by_count(messages.iter().map(|m| m.timestamp.weekday()));

    let peak_hour = hours.first().map(|(h, _)| *h).unwrap_or(0);
    let most_active_day = days
        .first()
        .map(|(d, _)| weekday_name(*d).to_string())
        .unwrap_or_default();

    let hourly_distribution: BTreeMap<u32, usize> = hours.into_iter().collect();

    let daily_distribution = WEEK
        .iter()
        .filter_map(|day| {
            days.iter().find(|(d, _)| d == day).map(|(d, count)| DayCount {
                day: weekday_name(*d).to_string(),
                count: *count,
            })
        })
        .collect();

    TemporalPatterns {
        hourly_distribution,
        peak_hour,
        daily_distribution,
        most_active_day,
    }
}
