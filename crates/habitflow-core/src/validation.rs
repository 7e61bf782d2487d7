//! Input validation for user-entered habits and dates.
//!
//! The frequency engine trusts its inputs; callers run these checks first.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::frequency::{parse_date, HabitFrequency};
use crate::habit::Habit;

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_NOTES_CHARS: usize = 200;

/// Check a `YYYY-MM-DD` date supplied by the user.
pub fn validate_date(date: &str) -> Result<NaiveDate, ValidationError> {
    parse_date(date)
}

/// Check an `HH:MM` reminder time.
pub fn validate_reminder_time(time: &str) -> Result<(), ValidationError> {
    let parts = time
        .split_once(':')
        .filter(|(h, m)| {
            h.len() == 2 && m.len() == 2 && h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit())
        })
        .and_then(|(h, m)| Some((h.parse::<u32>().ok()?, m.parse::<u32>().ok()?)));
    match parts {
        Some((h, m)) if h < 24 && m < 60 => Ok(()),
        _ => Err(ValidationError::invalid("reminderTime", format!("'{time}' is not HH:MM"))),
    }
}

pub fn validate_frequency(frequency: &HabitFrequency) -> Result<(), ValidationError> {
    if let Some(day) = frequency.specific_days.iter().find(|d| **d > 6) {
        return Err(ValidationError::OutOfBounds {
            field: "specificDays".into(),
            value: i64::from(*day),
            min: 0,
            max: 6,
        });
    }
    for date in frequency.rest_dates.iter().chain(&frequency.completed_dates) {
        parse_date(date)?;
    }
    Ok(())
}

/// Validate the user-editable fields of a habit.
pub fn validate_habit(habit: &Habit) -> Result<(), ValidationError> {
    let name = habit.name.trim();
    if name.is_empty() {
        return Err(ValidationError::invalid("name", "must not be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ValidationError::invalid(
            "name",
            format!("must be at most {MAX_NAME_CHARS} characters"),
        ));
    }
    if habit.icon.is_empty() {
        return Err(ValidationError::invalid("icon", "an icon must be selected"));
    }
    if habit.color.is_empty() {
        return Err(ValidationError::invalid("color", "a color must be selected"));
    }
    if habit.notes.chars().count() > MAX_NOTES_CHARS {
        return Err(ValidationError::invalid(
            "notes",
            format!("must be at most {MAX_NOTES_CHARS} characters"),
        ));
    }
    validate_reminder_time(&habit.reminder_time)?;
    validate_frequency(&habit.frequency)
}
