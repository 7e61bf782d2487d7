//! Property tests for the frequency engine.

use chrono::{Datelike, Duration, NaiveDate};
use habitflow_core::frequency::format_date;
use habitflow_core::{
    calculate_habit_streak, count_completions_in_week, frequency_label, is_habit_due_on_date,
    week_range, HabitFrequency,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
}

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..3000).prop_map(|offset| base() + Duration::days(offset))
}

fn any_policy() -> impl Strategy<Value = HabitFrequency> {
    prop_oneof![
        Just(HabitFrequency::daily()),
        proptest::collection::vec(0u8..7, 0..7)
            .prop_map(|days| HabitFrequency::specific_days(days)),
        (-2i64..8).prop_map(HabitFrequency::times_per_week),
    ]
}

proptest! {
    #[test]
    fn rest_dates_are_never_due(policy in any_policy(), date in any_date()) {
        let habit = policy.with_rest([format_date(date)]);
        prop_assert!(!is_habit_due_on_date(&habit, date));
    }

    #[test]
    fn daily_is_always_due(date in any_date()) {
        prop_assert!(is_habit_due_on_date(&HabitFrequency::daily(), date));
    }

    #[test]
    fn specific_days_match_weekday(
        days in proptest::collection::vec(0u8..7, 0..7),
        date in any_date(),
    ) {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        let habit = HabitFrequency::specific_days(days.clone());
        prop_assert_eq!(is_habit_due_on_date(&habit, date), days.contains(&weekday));
    }

    #[test]
    fn weekly_due_until_target_met(
        target in 1i64..8,
        marked in proptest::collection::btree_set(0i64..7, 0..7),
        date in any_date(),
    ) {
        let start = week_range(date).week_start;
        let completed: Vec<String> =
            marked.iter().map(|o| format_date(start + Duration::days(*o))).collect();
        let habit = HabitFrequency::times_per_week(target).with_completed(completed.clone());
        for offset in 0..7 {
            let day = start + Duration::days(offset);
            prop_assert_eq!(count_completions_in_week(&completed, day), marked.len());
            prop_assert_eq!(
                is_habit_due_on_date(&habit, day),
                (marked.len() as i64) < target
            );
        }
    }

    #[test]
    fn week_range_spans_seven_days(date in any_date()) {
        let range = week_range(date);
        prop_assert_eq!(range.week_start.weekday().num_days_from_sunday(), 0);
        prop_assert_eq!(range.week_end - range.week_start, Duration::days(6));
        prop_assert!(range.week_start <= date && date <= range.week_end);
    }

    #[test]
    fn empty_history_has_no_streak(policy in any_policy(), date in any_date()) {
        prop_assert_eq!(calculate_habit_streak(&policy, date), 0);
    }

    #[test]
    fn consecutive_daily_history_is_its_length(k in 1i64..=365, today in any_date()) {
        let dates: Vec<String> = (0..k).map(|i| format_date(today - Duration::days(i))).collect();
        let habit = HabitFrequency::daily().with_completed(dates);
        prop_assert_eq!(i64::from(calculate_habit_streak(&habit, today)), k);
    }

    #[test]
    fn label_never_reports_zero_target(target in -5i64..=0) {
        prop_assert_eq!(frequency_label(&HabitFrequency::times_per_week(target)), "1x per week");
    }
}
