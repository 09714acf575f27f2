//! Image tags of the form `2023-04-09-db9a92f` (build date, then commit).
use time::{Date, Month};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    pub date: Option<Date>,
    pub commit: Option<String>,
}

impl ImageTag {
    pub fn parse(tag: &str) -> Self {
        let parts: Vec<&str> = tag.split('-').collect();
        let date = match parts.as_slice() {
            [year, month, day, ..] => parse_date(year, month, day),
            _ => None,
        };
        let commit = parts
            .get(3)
            .filter(|commit| date.is_some() && !commit.is_empty())
            .map(|commit| commit.to_string());
        Self { date, commit }
    }
}

fn parse_date(year: &str, month: &str, day: &str) -> Option<Date> {
    let year = year.parse::<i32>().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    let day = day.parse::<u8>().ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Coarse relative age of `date` as seen on `today`.
pub fn time_ago(date: Date, today: Date) -> String {
    let days = (today - date).whole_days().max(0);
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=49 => format!("{days} days ago"),
        50..=699 => format!("{} months ago", days / 30),
        _ => format!("{} years ago", days / 365),
    }
}
