//! Habit records as the app persists them.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::frequency::{null_as_default, FrequencyType, HabitFrequency};

fn default_reminder_time() -> String {
    "08:00".into()
}

fn reminder_time_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_reminder_time))
}

/// A user habit.
///
/// Field names follow the app's camelCase records. Every field added after
/// the first release has a serde default, taken also when the field is
/// `null`, so older snapshots still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reminder_enabled: bool,
    #[serde(
        default = "default_reminder_time",
        deserialize_with = "reminder_time_or_default"
    )]
    pub reminder_time: String,
    /// Derived from the frequency policy and history; recomputed by the store.
    #[serde(default, deserialize_with = "null_as_default")]
    pub streak: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    pub created_at: String,
    #[serde(flatten)]
    pub frequency: HabitFrequency,
}

impl Habit {
    /// Create a daily habit with a fresh id.
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            notes: String::new(),
            reminder_enabled: false,
            reminder_time: default_reminder_time(),
            streak: 0,
            archived: false,
            created_at: created_at.into(),
            frequency: HabitFrequency::default(),
        }
    }

    pub fn with_frequency(mut self, frequency: HabitFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn completed_dates(&self) -> &[String] {
        &self.frequency.completed_dates
    }

    pub fn is_completed_on(&self, date: &str) -> bool {
        self.frequency.is_completed_on(date)
    }
}

/// Partial update for [`crate::HabitStore::update`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub archived: Option<bool>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<String>,
    pub completed_dates: Option<Vec<String>>,
    pub frequency_type: Option<FrequencyType>,
    pub specific_days: Option<Vec<u8>>,
    pub times_per_week: Option<i64>,
    pub rest_dates: Option<Vec<String>>,
}

impl HabitPatch {
    pub fn apply(self, habit: &mut Habit) {
        if let Some(name) = self.name {
            habit.name = name;
        }
        if let Some(icon) = self.icon {
            habit.icon = icon;
        }
        if let Some(color) = self.color {
            habit.color = color;
        }
        if let Some(notes) = self.notes {
            habit.notes = notes;
        }
        if let Some(archived) = self.archived {
            habit.archived = archived;
        }
        if let Some(enabled) = self.reminder_enabled {
            habit.reminder_enabled = enabled;
        }
        if let Some(time) = self.reminder_time {
            habit.reminder_time = time;
        }
        if let Some(dates) = self.completed_dates {
            habit.frequency.completed_dates = dates;
        }
        if let Some(kind) = self.frequency_type {
            habit.frequency.frequency_type = kind;
        }
        if let Some(days) = self.specific_days {
            habit.frequency.specific_days = days;
        }
        if let Some(target) = self.times_per_week {
            habit.frequency.times_per_week = target;
        }
        if let Some(dates) = self.rest_dates {
            habit.frequency.rest_dates = dates;
        }
    }
}
