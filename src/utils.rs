use chrono::{Datelike, Duration, NaiveDate};

/// Normalizes a release date to day precision.
///
/// Spotify reports release dates at year, month or day precision; missing
/// parts fall back to the first day of the period.
pub fn generate_release_date(date: &str, precision: &str) -> Result<NaiveDate, chrono::ParseError> {
    let padded = match precision {
        "year" => format!("{date}-01-01"),
        "month" => format!("{date}-01"),
        _ => date.to_string(),
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d")
}

pub fn week_of_month(date: NaiveDate) -> u32 {
    let first_day = date.with_day(1).unwrap_or(date);
    let adjusted_dom = date.day() + first_day.weekday().num_days_from_monday();
    adjusted_dom.div_ceil(7)
}

pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Splits text into chunks of at most `size` characters, breaking only on
/// line boundaries. A single line longer than `size` becomes its own chunk.
pub fn chunk_lines(size: usize, data: &str) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in data.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > size {
            chunks.push(current);
            current = String::new();
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
