use chrono::{NaiveDate, Weekday};
use chrono::Datelike;
use sporlsync::utils::*;

#[test]
fn test_generate_release_date_day_precision() {
    let date = generate_release_date("2026-08-28", "day").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 28).unwrap());
}

#[test]
fn test_generate_release_date_month_precision() {
    // Month precision falls back to the first day of the month
    let date = generate_release_date("2026-08", "month").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
}

#[test]
fn test_generate_release_date_year_precision() {
    // Year precision falls back to January 1st
    let date = generate_release_date("2026", "year").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
}

#[test]
fn test_generate_release_date_invalid_input() {
    assert!(generate_release_date("not-a-date", "day").is_err());

    // Precision mismatch: a bare year with day precision cannot parse
    assert!(generate_release_date("2026", "day").is_err());
}

#[test]
fn test_week_of_month() {
    // June 2026 starts on a Monday, so the weeks align with the calendar
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()), 1);
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 6, 7).unwrap()), 1);
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 6, 8).unwrap()), 2);
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()), 5);

    // August 2026 starts on a Saturday; the 3rd lands in week 2
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()), 1);
    assert_eq!(week_of_month(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()), 2);
}

#[test]
fn test_monday_of_week() {
    // Friday 2026-08-28 belongs to the week starting Monday 2026-08-24
    let friday = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
    let monday = monday_of_week(friday);
    assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
    assert_eq!(monday.weekday(), Weekday::Mon);

    // A Monday maps to itself
    assert_eq!(monday_of_week(monday), monday);

    // A Sunday maps back six days
    let sunday = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
    assert_eq!(monday_of_week(sunday), NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
}

#[test]
fn test_chunk_lines_respects_size() {
    let data = "aaaa\nbbbb\ncccc\ndddd";
    let chunks = chunk_lines(10, data);

    // Two lines plus newlines fit in 10 characters, so two chunks
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "aaaa\nbbbb\n");
    assert_eq!(chunks[1], "cccc\ndddd\n");
}

#[test]
fn test_chunk_lines_never_splits_a_line() {
    let data = "short\nthis line is far longer than the chunk size\nshort";
    let chunks = chunk_lines(10, data);

    // Every line survives intact, even the oversized one
    let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.lines()).collect();
    assert_eq!(
        rejoined,
        vec![
            "short",
            "this line is far longer than the chunk size",
            "short"
        ]
    );

    // The oversized line stands alone in its chunk
    assert!(chunks.iter().any(|c| c.trim_end() == "this line is far longer than the chunk size"));
}

#[test]
fn test_chunk_lines_empty_input() {
    assert!(chunk_lines(100, "").is_empty());
}

#[test]
fn test_chunk_lines_keeps_everything() {
    let data = "one\ntwo\nthree\nfour\nfive";
    let chunks = chunk_lines(9, data);

    let total_lines: usize = chunks.iter().map(|c| c.lines().count()).sum();
    assert_eq!(total_lines, 5);
}
