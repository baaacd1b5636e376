pub mod advisor;
pub mod config;
pub mod layout;
pub mod optimize;
pub mod tag;
pub mod task;

use chrono::{Local, NaiveDate};

/// Parse `--date YYYY-MM-DD`, defaulting to today.
pub fn resolve_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{text}': {e} (expected YYYY-MM-DD)").into()),
        None => Ok(Local::now().date_naive()),
    }
}
