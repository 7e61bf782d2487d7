//! In-memory habit store.
//!
//! Owns the habit list and recomputes each habit's streak after every
//! mutation. Loading and saving the list is left to the embedding app.

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::frequency::{calculate_habit_streak_with, TodayPolicy};
use crate::habit::{Habit, HabitPatch};
use crate::validation::{validate_date, validate_habit};

/// Local calendar day of the device.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Clone, Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
    today_policy: TodayPolicy,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of loaded records and refresh their streaks under
    /// `policy`.
    pub fn from_habits(habits: Vec<Habit>, today: NaiveDate, policy: TodayPolicy) -> Self {
        let mut store = Self {
            habits: Vec::new(),
            today_policy: policy,
        };
        store.load(habits, today);
        store
    }

    /// Replace the habit list, e.g. after reading it from disk.
    pub fn load(&mut self, habits: Vec<Habit>, today: NaiveDate) {
        self.habits = habits;
        self.recompute_all(today);
    }

    pub fn today_policy(&self) -> TodayPolicy {
        self.today_policy
    }

    /// Switch policy and refresh every streak under it.
    pub fn set_today_policy(&mut self, policy: TodayPolicy, today: NaiveDate) {
        self.today_policy = policy;
        self.recompute_all(today);
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Habits that are not archived.
    pub fn active(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| !h.archived)
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub fn add(&mut self, mut habit: Habit, today: NaiveDate) -> Result<&Habit> {
        validate_habit(&habit).inspect_err(|e| warn!(name = %habit.name, "rejected habit: {e}"))?;
        habit.archived = false;
        habit.streak = calculate_habit_streak_with(&habit.frequency, today, self.today_policy);
        info!(id = %habit.id, name = %habit.name, "habit added");
        self.habits.push(habit);
        Ok(&self.habits[self.habits.len() - 1])
    }

    /// Apply a partial update. The habit is left untouched if the result
    /// would not validate.
    pub fn update(&mut self, id: &str, patch: HabitPatch, today: NaiveDate) -> Result<&Habit> {
        let policy = self.today_policy;
        let habit = self.find_mut(id)?;
        let mut updated = habit.clone();
        patch.apply(&mut updated);
        validate_habit(&updated).inspect_err(|e| warn!(id, "rejected update: {e}"))?;
        updated.streak = calculate_habit_streak_with(&updated.frequency, today, policy);
        *habit = updated;
        info!(id, "habit updated");
        Ok(habit)
    }

    /// Mark `date` done, or undo it if it was already marked.
    pub fn toggle(&mut self, id: &str, date: &str, today: NaiveDate) -> Result<&Habit> {
        validate_date(date).inspect_err(|e| warn!(id, "rejected toggle: {e}"))?;
        let policy = self.today_policy;
        let habit = self.find_mut(id)?;
        let dates = &mut habit.frequency.completed_dates;
        if let Some(pos) = dates.iter().position(|d| d == date) {
            dates.remove(pos);
            info!(id, date, "completion removed");
        } else {
            dates.push(date.to_string());
            info!(id, date, "completion recorded");
        }
        habit.streak = calculate_habit_streak_with(&habit.frequency, today, policy);
        debug!(id, streak = habit.streak, "streak recomputed");
        Ok(habit)
    }

    /// Flip the archived flag. Returns the new value.
    pub fn archive(&mut self, id: &str) -> Result<bool> {
        let habit = self.find_mut(id)?;
        habit.archived = !habit.archived;
        info!(id, archived = habit.archived, "habit archive toggled");
        Ok(habit.archived)
    }

    pub fn delete(&mut self, id: &str) -> Result<Habit> {
        let pos = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HabitNotFound(id.to_string()))?;
        info!(id, "habit deleted");
        Ok(self.habits.remove(pos))
    }

    pub fn clear(&mut self) {
        info!(count = self.habits.len(), "habits cleared");
        self.habits.clear();
    }

    /// Refresh every stored streak, e.g. after loading or at day rollover.
    pub fn recompute_all(&mut self, today: NaiveDate) {
        for habit in &mut self.habits {
            habit.streak = calculate_habit_streak_with(&habit.frequency, today, self.today_policy);
        }
        debug!(count = self.habits.len(), %today, "streaks recomputed");
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Habit> {
        self.habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::HabitNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{parse_date, FrequencyType, HabitFrequency};

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn store_with_habit() -> (HabitStore, String) {
        let mut store = HabitStore::new();
        let id = store
            .add(Habit::new("Read", "📚", "#3b82f6", "2024-06-01"), d("2024-06-05"))
            .unwrap()
            .id
            .clone();
        (store, id)
    }

    #[test]
    fn toggle_records_and_removes_completion() {
        let (mut store, id) = store_with_habit();
        let today = d("2024-06-05");

        store.toggle(&id, "2024-06-04", today).unwrap();
        let habit = store.toggle(&id, "2024-06-05", today).unwrap();
        assert_eq!(habit.streak, 2);

        let habit = store.toggle(&id, "2024-06-04", today).unwrap();
        assert_eq!(habit.completed_dates(), ["2024-06-05".to_string()]);
        assert_eq!(habit.streak, 1);
    }

    #[test]
    fn toggle_rejects_malformed_date() {
        let (mut store, id) = store_with_habit();
        let err = store.toggle(&id, "2024-6-5", d("2024-06-05")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.get(&id).unwrap().completed_dates().is_empty());
    }

    #[test]
    fn unknown_id_is_reported() {
        let (mut store, _) = store_with_habit();
        assert!(matches!(
            store.toggle("nope", "2024-06-05", d("2024-06-05")),
            Err(CoreError::HabitNotFound(id)) if id == "nope"
        ));
        assert!(store.archive("nope").is_err());
        assert!(store.delete("nope").is_err());
    }

    #[test]
    fn add_rejects_invalid_habit() {
        let mut store = HabitStore::new();
        let mut habit = Habit::new("", "📚", "#3b82f6", "2024-06-01");
        assert!(store.add(habit.clone(), d("2024-06-05")).is_err());
        habit.name = "Read".into();
        habit.archived = true;
        assert!(!store.add(habit, d("2024-06-05")).unwrap().archived);
    }

    #[test]
    fn update_recomputes_streak_under_new_policy() {
        let (mut store, id) = store_with_habit();
        let today = d("2024-06-07"); // Friday
        for date in ["2024-06-03", "2024-06-05", "2024-06-07"] {
            store.toggle(&id, date, today).unwrap();
        }
        assert_eq!(store.get(&id).unwrap().streak, 1);

        let patch = HabitPatch {
            frequency_type: Some(FrequencyType::SpecificDays),
            specific_days: Some(vec![1, 3, 5]),
            ..Default::default()
        };
        assert_eq!(store.update(&id, patch, today).unwrap().streak, 3);
    }

    #[test]
    fn invalid_update_leaves_habit_unchanged() {
        let (mut store, id) = store_with_habit();
        let patch = HabitPatch {
            name: Some("New".into()),
            reminder_time: Some("25:00".into()),
            ..Default::default()
        };
        assert!(store.update(&id, patch, d("2024-06-05")).is_err());
        assert_eq!(store.get(&id).unwrap().name, "Read");
    }

    #[test]
    fn archive_hides_from_active() {
        let (mut store, id) = store_with_habit();
        assert!(store.archive(&id).unwrap());
        assert_eq!(store.active().count(), 0);
        assert!(!store.archive(&id).unwrap());
        assert_eq!(store.active().count(), 1);
    }

    #[test]
    fn delete_and_clear() {
        let (mut store, id) = store_with_habit();
        store
            .add(Habit::new("Walk", "🚶", "#22c55e", "2024-06-01"), d("2024-06-05"))
            .unwrap();
        assert_eq!(store.delete(&id).unwrap().name, "Read");
        assert_eq!(store.habits().len(), 1);
        store.clear();
        assert!(store.habits().is_empty());
    }

    #[test]
    fn strict_policy_breaks_on_unmarked_today() {
        let mut habit = Habit::new("Read", "📚", "#3b82f6", "2024-06-01")
            .with_frequency(HabitFrequency::daily().with_completed(["2024-06-04"]));
        habit.streak = 99;
        let today = d("2024-06-05");
        let lenient = HabitStore::from_habits(vec![habit.clone()], today, TodayPolicy::Grace);
        assert_eq!(lenient.habits()[0].streak, 1);

        let strict = HabitStore::from_habits(vec![habit], today, TodayPolicy::Strict);
        assert_eq!(strict.today_policy(), TodayPolicy::Strict);
        assert_eq!(strict.habits()[0].streak, 0);
    }

    #[test]
    fn switching_policy_refreshes_loaded_streaks() {
        let habit = Habit::new("Read", "📚", "#3b82f6", "2024-06-01")
            .with_frequency(HabitFrequency::daily().with_completed(["2024-06-03", "2024-06-04"]));
        let today = d("2024-06-05");
        let mut store = HabitStore::from_habits(vec![habit], today, TodayPolicy::Grace);
        assert_eq!(store.habits()[0].streak, 2);

        store.set_today_policy(TodayPolicy::Strict, today);
        assert_eq!(store.habits()[0].streak, 0);
        store.set_today_policy(TodayPolicy::Grace, today);
        assert_eq!(store.habits()[0].streak, 2);
    }
}
