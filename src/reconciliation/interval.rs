//! Calendar interval labels for checkpoint history
//!
//! A checkpoint records how long it has been since the previous checkpoint
//! (or since the account opened) as a single largest-whole-unit label such as
//! "1 Month" or "2 Years". Months are counted calendar-wise and everything
//! rounds down, so 40 days spanning a month boundary reads "1 Month", while
//! the 28 days from 31 January to 28 February read "28 Days".

use chrono::{Datelike, NaiveDate};

/// Number of whole calendar months between two dates, rounding down.
///
/// A month only counts as complete once the day-of-month of `from` has been
/// reached again; negative intervals clamp to zero.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Render the interval between two dates as its largest whole calendar unit
pub fn interval_label(from: NaiveDate, to: NaiveDate) -> String {
    if to <= from {
        return "0 Days".to_string();
    }

    let months = whole_months_between(from, to);
    if months >= 12 {
        pluralize(months / 12, "Year")
    } else if months >= 1 {
        pluralize(months, "Month")
    } else {
        let days = to.signed_duration_since(from).num_days();
        pluralize(days as u32, "Day")
    }
}

fn pluralize(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_intervals_are_days() {
        assert_eq!(interval_label(date(2024, 1, 1), date(2024, 1, 2)), "1 Day");
        assert_eq!(interval_label(date(2024, 1, 1), date(2024, 1, 29)), "28 Days");
        assert_eq!(interval_label(date(2024, 4, 1), date(2024, 4, 30)), "29 Days");
    }

    #[test]
    fn forty_days_is_one_month() {
        // 2024-01-05 + 40 days = 2024-02-14
        assert_eq!(interval_label(date(2024, 1, 5), date(2024, 2, 14)), "1 Month");
    }

    #[test]
    fn exact_month_boundaries() {
        assert_eq!(interval_label(date(2024, 1, 5), date(2024, 2, 5)), "1 Month");
        assert_eq!(interval_label(date(2024, 1, 31), date(2024, 3, 31)), "2 Months");
        // February 2023 is 28 days; 31 Jan -> 28 Feb has not completed a month
        assert_eq!(interval_label(date(2023, 1, 31), date(2023, 2, 28)), "28 Days");
        // Leap February: 31 Jan -> 29 Feb is still short of a whole month
        assert_eq!(interval_label(date(2024, 1, 31), date(2024, 2, 29)), "29 Days");
    }

    #[test]
    fn thirty_vs_thirty_one_day_months() {
        // April has 30 days, so 1 Apr -> 1 May is exactly one month
        assert_eq!(interval_label(date(2024, 4, 1), date(2024, 5, 1)), "1 Month");
        // 30 days from 1 May lands on 31 May, inside the same calendar month
        assert_eq!(interval_label(date(2024, 5, 1), date(2024, 5, 31)), "30 Days");
    }

    #[test]
    fn years_round_down() {
        assert_eq!(interval_label(date(2023, 1, 5), date(2024, 1, 5)), "1 Year");
        assert_eq!(interval_label(date(2022, 3, 10), date(2024, 3, 9)), "1 Year");
        assert_eq!(interval_label(date(2021, 6, 1), date(2024, 5, 30)), "2 Years");
        assert_eq!(interval_label(date(2023, 1, 5), date(2024, 1, 4)), "11 Months");
    }

    #[test]
    fn zero_and_negative_intervals() {
        assert_eq!(interval_label(date(2024, 1, 5), date(2024, 1, 5)), "0 Days");
        assert_eq!(interval_label(date(2024, 1, 5), date(2024, 1, 1)), "0 Days");
    }
}
