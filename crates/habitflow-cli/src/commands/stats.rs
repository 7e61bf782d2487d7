use habitflow_core::{stats::HabitStats, Config};

use super::SnapshotArgs;

pub fn run(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::read_or_default();
    let store = args.open_store(&config)?;
    let stats = HabitStats::compute_in(store.habits(), args.today()?, config.ui.locale);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Habits:            {}", stats.total_habits);
    println!("Completed today:   {}", stats.completed_today);
    println!("Best streak:       {}", stats.best_streak);
    println!("Total completions: {}", stats.total_completions);
    println!();
    for day in &stats.last_seven_days {
        let marker = if day.is_today { "*" } else { " " };
        println!("{marker} {} {} {}", day.day, day.date, "#".repeat(day.count));
    }
    println!();
    for habit in &stats.habits {
        println!(
            "{:<20} {:>3}%  last 30d {:>3}%  streak {:<3} best {}",
            habit.name,
            habit.completion_rate,
            habit.recent_completion_rate,
            habit.streak,
            habit.longest_streak
        );
    }
    Ok(())
}
