//! Aggregate statistics across a user's habits.
//!
//! Figures shown on the stats screen:
//! - **Totals**: habits, completions, habits done today, best streak
//! - **Last seven days**: habits completed per day, oldest first
//! - **Per habit**: completion rates and longest run of days

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::frequency::{format_date, parse_date, weekday_index, Locale};
use crate::habit::Habit;

/// Window the completion rate is measured against.
pub const COMPLETION_RATE_WINDOW_DAYS: usize = 30;

/// Completions across all habits on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: String,
    /// Abbreviated weekday name
    pub day: String,
    pub count: usize,
    pub is_today: bool,
}

/// Per-habit performance row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitPerformance {
    pub id: String,
    pub name: String,
    pub streak: u32,
    pub longest_streak: u32,
    pub total_completions: usize,
    /// All-time completions against the 30-day window, 0 to 100
    pub completion_rate: u32,
    /// Days completed among the 30 days ending today, 0 to 100
    pub recent_completion_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub total_habits: usize,
    pub completed_today: usize,
    pub best_streak: u32,
    pub total_completions: usize,
    pub last_seven_days: Vec<DayCount>,
    /// Id of the habit with the most completions
    pub most_consistent: Option<String>,
    pub habits: Vec<HabitPerformance>,
}

impl HabitStats {
    pub fn compute(habits: &[Habit], today: NaiveDate) -> Self {
        Self::compute_in(habits, today, Locale::En)
    }

    pub fn compute_in(habits: &[Habit], today: NaiveDate, locale: Locale) -> Self {
        let today_key = format_date(today);
        let names = locale.weekday_abbrevs();

        let last_seven_days = (0..7u64)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(|date| {
                let key = format_date(date);
                DayCount {
                    count: habits.iter().filter(|h| h.is_completed_on(&key)).count(),
                    day: names[usize::from(weekday_index(date))].to_string(),
                    is_today: key == today_key,
                    date: key,
                }
            })
            .collect();

        // ties keep the earlier habit
        let most_consistent = habits
            .iter()
            .fold(None::<&Habit>, |best, h| match best {
                Some(b) if b.completed_dates().len() >= h.completed_dates().len() => Some(b),
                _ => Some(h),
            })
            .map(|h| h.id.clone());

        Self {
            total_habits: habits.len(),
            completed_today: habits.iter().filter(|h| h.is_completed_on(&today_key)).count(),
            best_streak: habits.iter().map(|h| h.streak).max().unwrap_or(0),
            total_completions: habits.iter().map(|h| h.completed_dates().len()).sum(),
            last_seven_days,
            most_consistent,
            habits: habits
                .iter()
                .map(|h| HabitPerformance {
                    id: h.id.clone(),
                    name: h.name.clone(),
                    streak: h.streak,
                    longest_streak: longest_streak(h.completed_dates()),
                    total_completions: h.completed_dates().len(),
                    completion_rate: completion_rate(h.completed_dates().len()),
                    recent_completion_rate: recent_completion_rate(h.completed_dates(), today),
                })
                .collect(),
        }
    }
}

/// Completions as a percentage of the 30-day window, capped at 100.
pub fn completion_rate(completions: usize) -> u32 {
    if completions == 0 {
        return 0;
    }
    let pct = (completions as f64 / COMPLETION_RATE_WINDOW_DAYS as f64 * 100.0).round();
    pct.min(100.0) as u32
}

/// Share of the 30 days ending at `today` (inclusive) that were completed.
///
/// Each day counts once however often it appears in the history.
pub fn recent_completion_rate<S: AsRef<str>>(completed_dates: &[S], today: NaiveDate) -> u32 {
    let done: BTreeSet<&str> = completed_dates.iter().map(|d| d.as_ref()).collect();
    let days = (0..COMPLETION_RATE_WINDOW_DAYS as u64)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .filter(|date| done.contains(format_date(*date).as_str()))
        .count();
    completion_rate(days)
}

/// Longest run of consecutive calendar days in a completion history.
///
/// Malformed entries are ignored; duplicates count once.
pub fn longest_streak<S: AsRef<str>>(completed_dates: &[S]) -> u32 {
    let days: BTreeSet<NaiveDate> = completed_dates
        .iter()
        .filter_map(|d| parse_date(d.as_ref()).ok())
        .collect();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
