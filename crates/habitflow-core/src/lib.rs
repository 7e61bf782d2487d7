//! # Habitflow Core Library
//!
//! This library provides the core logic for the Habitflow habit tracker.
//! Screens, reminders and sync live in the app; they call into this crate
//! for every due/streak/label value they show.
//!
//! ## Architecture
//!
//! - **Frequency Engine**: pure date logic deciding when a habit is due and
//!   how long its streak is, under daily, specific-weekday and
//!   times-per-week policies
//! - **Habit Store**: in-memory habit list that recomputes streaks after
//!   every mutation
//! - **Stats**: aggregate figures across habits
//! - **Config**: TOML-based preferences
//!
//! ## Key Components
//!
//! - [`HabitFrequency`]: scheduling policy and history of one habit
//! - [`calculate_habit_streak`]: current streak for a habit
//! - [`HabitStore`]: habit list owner
//! - [`Config`]: application configuration management

pub mod config;
pub mod error;
pub mod frequency;
pub mod habit;
pub mod stats;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{ConfigError, CoreError, ValidationError};
pub use frequency::{
    calculate_habit_streak, calculate_habit_streak_with, count_completions_in_week,
    frequency_label, frequency_label_in, is_habit_due_on_date, normalize_date, parse_date,
    week_range, Frequency, FrequencyType, HabitFrequency, Locale, TodayPolicy, WeekRange,
};
pub use habit::{Habit, HabitPatch};
pub use stats::HabitStats;
pub use store::{today, HabitStore};
