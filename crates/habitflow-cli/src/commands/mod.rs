pub mod config;
pub mod habit;
pub mod stats;
pub mod week;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use habitflow_core::{parse_date, today, Config, Habit, HabitStore};

/// Arguments shared by every command that reads a snapshot.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// JSON file holding an array of habit records
    #[arg(long, short)]
    pub file: PathBuf,
    /// Evaluate as of this date (YYYY-MM-DD, default: local today)
    #[arg(long)]
    pub today: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl SnapshotArgs {
    pub fn today(&self) -> Result<NaiveDate, Box<dyn std::error::Error>> {
        match &self.today {
            Some(date) => Ok(parse_date(date)?),
            None => Ok(today()),
        }
    }

    /// Load the snapshot into a store with streaks refreshed for `today`.
    pub fn open_store(&self, config: &Config) -> Result<HabitStore, Box<dyn std::error::Error>> {
        let today = self.today()?;
        let habits = load_snapshot(&self.file)?;
        tracing::debug!(path = %self.file.display(), count = habits.len(), "snapshot loaded");
        Ok(HabitStore::from_habits(habits, today, config.today_policy()))
    }
}

pub fn load_snapshot(path: &Path) -> Result<Vec<Habit>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}
