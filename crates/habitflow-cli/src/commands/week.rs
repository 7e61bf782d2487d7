use habitflow_core::{parse_date, week_range};

pub fn run(date: &str) -> Result<(), Box<dyn std::error::Error>> {
    let range = week_range(parse_date(date)?);
    println!("{}", serde_json::to_string_pretty(&range)?);
    Ok(())
}
