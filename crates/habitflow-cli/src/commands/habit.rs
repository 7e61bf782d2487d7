//! Habit inspection commands for CLI.

use clap::{Subcommand, ValueEnum};
use habitflow_core::frequency::format_date;
use habitflow_core::validation::validate_habit;
use habitflow_core::{
    calculate_habit_streak_with, frequency_label_in, is_habit_due_on_date, parse_date, Config,
    FrequencyType, Habit, Locale, TodayPolicy,
};
use serde::Serialize;

use super::SnapshotArgs;

#[derive(Subcommand)]
pub enum HabitAction {
    /// List habits with label, streak and today's status
    List {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Include archived habits
        #[arg(long)]
        all: bool,
    },
    /// Show one habit
    Show {
        /// Habit ID
        id: String,
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
    /// List habits due on a date
    Due {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Date to check (YYYY-MM-DD, default: --today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print a habit's current streak
    Streak {
        /// Habit ID
        id: String,
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Break the streak on an unmarked today regardless of config
        #[arg(long)]
        strict: bool,
    },
    /// Print a new habit record built from the configured defaults
    New {
        /// Habit name
        #[arg(long)]
        name: String,
        /// Icon (emoji)
        #[arg(long)]
        icon: String,
        /// Color, e.g. "#22c55e"
        #[arg(long)]
        color: String,
        /// Scheduling policy
        #[arg(long, value_enum, default_value_t = FrequencyArg::Daily)]
        frequency: FrequencyArg,
        /// Weekday indices for specific-days, 0 = Sunday (comma separated)
        #[arg(long, value_delimiter = ',')]
        days: Vec<u8>,
        /// Weekly target (default: defaults.times_per_week)
        #[arg(long)]
        times_per_week: Option<i64>,
        /// Reminder time HH:MM (default: defaults.reminder_time)
        #[arg(long)]
        reminder: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    SpecificDays,
    TimesPerWeek,
}

impl From<FrequencyArg> for FrequencyType {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => FrequencyType::Daily,
            FrequencyArg::SpecificDays => FrequencyType::SpecificDays,
            FrequencyArg::TimesPerWeek => FrequencyType::TimesPerWeek,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HabitSummary<'a> {
    id: &'a str,
    name: &'a str,
    label: String,
    streak: u32,
    due: bool,
    completed: bool,
    archived: bool,
}

impl<'a> HabitSummary<'a> {
    fn new(habit: &'a Habit, date: &str, due: bool, locale: Locale) -> Self {
        Self {
            id: &habit.id,
            name: &habit.name,
            label: frequency_label_in(&habit.frequency, locale),
            streak: habit.streak,
            due,
            completed: habit.is_completed_on(date),
            archived: habit.archived,
        }
    }
}

fn print_summaries(
    summaries: &[HabitSummary<'_>],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("No habits.");
        return Ok(());
    }
    for s in summaries {
        let status = match (s.completed, s.due) {
            (true, _) => "done",
            (false, true) => "due",
            (false, false) => "-",
        };
        println!(
            "{:<38} {:<20} {:<18} streak {:<4} {}",
            s.id, s.name, s.label, s.streak, status
        );
    }
    Ok(())
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::read_or_default();
    let locale = config.ui.locale;

    match action {
        HabitAction::List { snapshot, all } => {
            let store = snapshot.open_store(&config)?;
            let today = snapshot.today()?;
            let key = format_date(today);
            let summaries: Vec<_> = store
                .habits()
                .iter()
                .filter(|h| all || !h.archived)
                .map(|h| {
                    let due = is_habit_due_on_date(&h.frequency, today);
                    HabitSummary::new(h, &key, due, locale)
                })
                .collect();
            print_summaries(&summaries, snapshot.json)?;
        }
        HabitAction::Show { id, snapshot } => {
            let store = snapshot.open_store(&config)?;
            let habit = store.get(&id).ok_or_else(|| format!("habit not found: {id}"))?;
            if snapshot.json {
                println!("{}", serde_json::to_string_pretty(habit)?);
            } else {
                let today = snapshot.today()?;
                let due = is_habit_due_on_date(&habit.frequency, today);
                let summary = HabitSummary::new(habit, &format_date(today), due, locale);
                print_summaries(&[summary], false)?;
                println!("completions: {}", habit.completed_dates().len());
                if !habit.frequency.rest_dates.is_empty() {
                    println!("rest dates:  {}", habit.frequency.rest_dates.join(", "));
                }
            }
        }
        HabitAction::Due { snapshot, date } => {
            let store = snapshot.open_store(&config)?;
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => snapshot.today()?,
            };
            let key = format_date(date);
            let summaries: Vec<_> = store
                .active()
                .filter(|h| is_habit_due_on_date(&h.frequency, date))
                .map(|h| HabitSummary::new(h, &key, true, locale))
                .collect();
            print_summaries(&summaries, snapshot.json)?;
        }
        HabitAction::Streak { id, snapshot, strict } => {
            let store = snapshot.open_store(&config)?;
            let habit = store.get(&id).ok_or_else(|| format!("habit not found: {id}"))?;
            let policy = if strict {
                TodayPolicy::Strict
            } else {
                store.today_policy()
            };
            let streak = calculate_habit_streak_with(&habit.frequency, snapshot.today()?, policy);
            if snapshot.json {
                println!("{}", serde_json::json!({ "id": habit.id, "streak": streak }));
            } else {
                println!("{streak}");
            }
        }
        HabitAction::New {
            name,
            icon,
            color,
            frequency,
            days,
            times_per_week,
            reminder,
        } => {
            let created_at = chrono::Local::now().to_rfc3339();
            let mut habit = config.defaults.new_habit(name, icon, color, created_at);
            habit.frequency.frequency_type = frequency.into();
            habit.frequency.specific_days = days;
            if let Some(target) = times_per_week {
                habit.frequency.times_per_week = target;
            }
            if let Some(time) = reminder {
                habit.reminder_time = time;
                habit.reminder_enabled = true;
            }
            validate_habit(&habit)?;
            tracing::debug!(id = %habit.id, "habit record created");
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
    }
    Ok(())
}
