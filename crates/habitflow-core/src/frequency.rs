//! Habit frequency and streak engine.
//!
//! Decides, for a habit's scheduling policy and a calendar date, whether the
//! habit is due, how many completions landed in that date's week, how the
//! policy reads in the UI, and how long the current streak is.
//!
//! Every function here is pure: results depend only on the arguments. Dates
//! are calendar days (`NaiveDate`), so no time-of-day or UTC offset can
//! shift a day across a boundary. Completion and rest dates stay in their
//! persisted `YYYY-MM-DD` string form and are compared lexicographically,
//! which matches chronological order for that format.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::error::ValidationError;

/// Persisted calendar-day format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Weekly target used when a record carries none.
pub const DEFAULT_TIMES_PER_WEEK: i64 = 3;

/// Ceiling on the day-by-day streak walk (one year).
pub const MAX_STREAK_DAYS: usize = 365;

/// Ceiling on the week-by-week streak walk (one year).
pub const MAX_STREAK_WEEKS: usize = 52;

/// Scheduling policy tag as persisted on a habit record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyType {
    /// Due every day
    #[default]
    Daily,
    /// Due on a fixed set of weekdays
    SpecificDays,
    /// Due until a weekly completion target is met
    TimesPerWeek,
}

/// Scheduling policy resolved from a record, with all defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    /// Weekday indices, 0 = Sunday .. 6 = Saturday.
    SpecificDays(BTreeSet<u8>),
    /// Weekly target, never below 1.
    TimesPerWeek(u32),
}

/// The frequency-related slice of a habit record.
///
/// Older records predate every field except `completedDates`; absent or
/// `null` fields deserialize to their defaults, and `times_per_week` is
/// clamped whenever it is read through [`HabitFrequency::policy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitFrequency {
    #[serde(default, deserialize_with = "null_as_default")]
    pub frequency_type: FrequencyType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specific_days: Vec<u8>,
    #[serde(
        default = "default_times_per_week",
        deserialize_with = "times_per_week_or_default"
    )]
    pub times_per_week: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rest_dates: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_dates: Vec<String>,
}

fn default_times_per_week() -> i64 {
    DEFAULT_TIMES_PER_WEEK
}

/// Read an explicit `null` as the field's `Default`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn times_per_week_or_default<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(DEFAULT_TIMES_PER_WEEK))
}

impl Default for HabitFrequency {
    fn default() -> Self {
        Self {
            frequency_type: FrequencyType::Daily,
            specific_days: Vec::new(),
            times_per_week: DEFAULT_TIMES_PER_WEEK,
            rest_dates: Vec::new(),
            completed_dates: Vec::new(),
        }
    }
}

impl HabitFrequency {
    pub fn daily() -> Self {
        Self::default()
    }

    pub fn specific_days(days: impl IntoIterator<Item = u8>) -> Self {
        Self {
            frequency_type: FrequencyType::SpecificDays,
            specific_days: days.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn times_per_week(target: i64) -> Self {
        Self {
            frequency_type: FrequencyType::TimesPerWeek,
            times_per_week: target,
            ..Self::default()
        }
    }

    /// Replace the completion history.
    pub fn with_completed<I, S>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed_dates = dates.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the rest dates.
    pub fn with_rest<I, S>(mut self, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rest_dates = dates.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve the persisted fields into a policy.
    pub fn policy(&self) -> Frequency {
        match self.frequency_type {
            FrequencyType::Daily => Frequency::Daily,
            FrequencyType::SpecificDays => {
                Frequency::SpecificDays(self.specific_days.iter().copied().collect())
            }
            FrequencyType::TimesPerWeek => Frequency::TimesPerWeek(self.weekly_target()),
        }
    }

    /// Weekly target clamped to at least 1.
    pub fn weekly_target(&self) -> u32 {
        self.times_per_week.clamp(1, i64::from(u32::MAX)) as u32
    }

    pub fn is_rest_date(&self, date: &str) -> bool {
        self.rest_dates.iter().any(|d| d == date)
    }

    pub fn is_completed_on(&self, date: &str) -> bool {
        self.completed_dates.iter().any(|d| d == date)
    }
}

/// How an unmarked "today" affects a day-based streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodayPolicy {
    /// A due but unmarked today is skipped until the day ends.
    #[default]
    Grace,
    /// A due but unmarked today ends the streak.
    Strict,
}

impl TodayPolicy {
    pub fn from_grace(grace: bool) -> Self {
        if grace {
            TodayPolicy::Grace
        } else {
            TodayPolicy::Strict
        }
    }
}

/// Label language for [`frequency_label_in`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    fn daily(self) -> &'static str {
        match self {
            Locale::En => "Daily",
            Locale::Es => "Diario",
        }
    }

    fn specific_days(self) -> &'static str {
        match self {
            Locale::En => "Specific days",
            Locale::Es => "Días específicos",
        }
    }

    fn per_week(self, target: u32) -> String {
        match self {
            Locale::En => format!("{target}x per week"),
            Locale::Es => format!("{target}x por semana"),
        }
    }

    /// Abbreviated weekday names, indexed from Sunday.
    pub fn weekday_abbrevs(self) -> [&'static str; 7] {
        match self {
            Locale::En => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            Locale::Es => ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"],
        }
    }
}

/// Sunday-to-Saturday calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
}

impl WeekRange {
    /// Whether a persisted date string falls inside the week, inclusive.
    pub fn contains(&self, date: &str) -> bool {
        let (start, end) = self.bounds();
        date >= start.as_str() && date <= end.as_str()
    }

    fn bounds(&self) -> (String, String) {
        (format_date(self.week_start), format_date(self.week_end))
    }
}

/// Parse a strict `YYYY-MM-DD` calendar day.
pub fn parse_date(date: &str) -> Result<NaiveDate, ValidationError> {
    let bytes = date.as_bytes();
    let shaped = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if !shaped {
        return Err(ValidationError::InvalidDate(date.to_string()));
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Re-emit a date string in canonical `YYYY-MM-DD` form.
pub fn normalize_date(date: &str) -> Result<String, ValidationError> {
    parse_date(date.trim()).map(format_date)
}

/// Weekday index, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn week_range(date: NaiveDate) -> WeekRange {
    let week_start = date
        .checked_sub_days(Days::new(u64::from(weekday_index(date))))
        .unwrap_or(date);
    let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(week_start);
    WeekRange {
        week_start,
        week_end,
    }
}

/// Completions recorded in the calendar week containing `date`.
pub fn count_completions_in_week<S: AsRef<str>>(completed_dates: &[S], date: NaiveDate) -> usize {
    let (start, end) = week_range(date).bounds();
    completed_dates
        .iter()
        .map(AsRef::as_ref)
        .filter(|d| *d >= start.as_str() && *d <= end.as_str())
        .count()
}

/// Whether the habit is expected to be actioned on `date`.
///
/// Rest dates win over every policy. Under `times_per_week` the habit stays
/// due on each day of the week until the target is met.
pub fn is_habit_due_on_date(habit: &HabitFrequency, date: NaiveDate) -> bool {
    is_due_under(habit, &habit.policy(), date, &format_date(date))
}

fn is_due_under(habit: &HabitFrequency, policy: &Frequency, date: NaiveDate, key: &str) -> bool {
    if habit.is_rest_date(key) {
        return false;
    }
    match policy {
        Frequency::Daily => true,
        Frequency::SpecificDays(days) => days.contains(&weekday_index(date)),
        Frequency::TimesPerWeek(target) => {
            count_completions_in_week(&habit.completed_dates, date) < *target as usize
        }
    }
}

pub fn frequency_label(habit: &HabitFrequency) -> String {
    frequency_label_in(habit, Locale::En)
}

pub fn frequency_label_in(habit: &HabitFrequency, locale: Locale) -> String {
    match habit.policy() {
        Frequency::Daily => locale.daily().to_string(),
        Frequency::TimesPerWeek(target) => locale.per_week(target),
        Frequency::SpecificDays(days) if days.is_empty() => locale.specific_days().to_string(),
        Frequency::SpecificDays(days) => {
            let names = locale.weekday_abbrevs();
            days.iter()
                .map(|d| names.get(usize::from(*d)).copied().unwrap_or("?"))
                .collect::<Vec<_>>()
                .join(" · ")
        }
    }
}

/// Current streak, treating an unmarked today leniently.
pub fn calculate_habit_streak(habit: &HabitFrequency, today: NaiveDate) -> u32 {
    calculate_habit_streak_with(habit, today, TodayPolicy::Grace)
}

/// Current streak in days (daily, specific days) or weeks (times per week).
pub fn calculate_habit_streak_with(
    habit: &HabitFrequency,
    today: NaiveDate,
    today_policy: TodayPolicy,
) -> u32 {
    if habit.completed_dates.is_empty() {
        return 0;
    }
    match habit.policy() {
        Frequency::TimesPerWeek(target) => weekly_streak(habit, today, target),
        policy @ (Frequency::Daily | Frequency::SpecificDays(_)) => {
            daily_streak(habit, &policy, today, today_policy)
        }
    }
}

fn weekly_streak(habit: &HabitFrequency, today: NaiveDate, target: u32) -> u32 {
    let mut streak = 0;
    let mut cursor = today;
    for _ in 0..MAX_STREAK_WEEKS {
        if count_completions_in_week(&habit.completed_dates, cursor) < target as usize {
            break;
        }
        streak += 1;
        match cursor.checked_sub_days(Days::new(7)) {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

fn daily_streak(
    habit: &HabitFrequency,
    policy: &Frequency,
    today: NaiveDate,
    today_policy: TodayPolicy,
) -> u32 {
    let completed: HashSet<&str> = habit.completed_dates.iter().map(String::as_str).collect();
    let mut streak = 0;
    let mut cursor = today;
    for step in 0..MAX_STREAK_DAYS {
        let key = format_date(cursor);
        if is_due_under(habit, policy, cursor, &key) {
            if completed.contains(key.as_str()) {
                streak += 1;
            } else if !(step == 0 && today_policy == TodayPolicy::Grace) {
                break;
            }
        }
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}
