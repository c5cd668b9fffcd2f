//! Time-of-day and calendar-date mapping for the site's picker controls.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::DateFormatError;

/// Date prefix the time dropdown uses for every option value.
const TIME_VALUE_DATE: &str = "2000-02-01";

/// Label used in place of a date that could not be rendered.
pub const INVALID_DATE_LABEL: &str = "invalid date";

/// `H[:MM] AM|PM`, anywhere in the text. Colon and space are optional.
static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]{1,2}):?([0-9]{2})?\s?(AM|PM)").expect("time pattern is valid")
});

/// Map a free-text time preference to the time dropdown's option value.
///
/// Returns `None` when the text carries no recognizable 12-hour time; the
/// caller skips time selection in that case.
///
/// ```
/// use tablebot_domain::time::map_time_to_value;
///
/// assert_eq!(map_time_to_value("around 7 PM").as_deref(), Some("2000-02-01T19:00:00"));
/// assert_eq!(map_time_to_value("lunchtime"), None);
/// ```
#[must_use]
pub fn map_time_to_value(text: &str) -> Option<String> {
    let caps = TIME_PATTERN.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }

    let afternoon = caps[3].eq_ignore_ascii_case("PM");
    let hour = match (hour, afternoon) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    Some(format!("{TIME_VALUE_DATE}T{hour:02}:{minute:02}:00"))
}

/// Render a `YYYY-MM-DD` date as the date picker's accessible label,
/// e.g. `"Saturday, April 27"`.
///
/// # Errors
///
/// Returns [`DateFormatError`] when `date` is not a valid calendar date.
pub fn day_label(date: &str) -> Result<String, DateFormatError> {
    let parsed =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|source| DateFormatError {
            input: date.to_string(),
            source,
        })?;
    Ok(parsed.format("%A, %B %-d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_evening_hour_to_24h_value() {
        assert_eq!(map_time_to_value("7 PM").as_deref(), Some("2000-02-01T19:00:00"));
    }

    #[test]
    fn should_map_half_past_midnight_to_hour_zero() {
        assert_eq!(
            map_time_to_value("12:30 AM").as_deref(),
            Some("2000-02-01T00:30:00")
        );
    }

    #[test]
    fn should_keep_noon_at_twelve() {
        assert_eq!(map_time_to_value("12 PM").as_deref(), Some("2000-02-01T12:00:00"));
    }

    #[test]
    fn should_pad_morning_hour_and_minutes() {
        assert_eq!(map_time_to_value("9:05 am").as_deref(), Some("2000-02-01T09:05:00"));
    }

    #[test]
    fn should_find_time_inside_longer_text() {
        assert_eq!(
            map_time_to_value("around 8:30PM please").as_deref(),
            Some("2000-02-01T20:30:00")
        );
    }

    #[test]
    fn should_accept_time_without_colon() {
        assert_eq!(map_time_to_value("830 PM").as_deref(), Some("2000-02-01T20:30:00"));
    }

    #[test]
    fn should_return_none_when_no_time_present() {
        assert_eq!(map_time_to_value("lunchtime"), None);
        assert_eq!(map_time_to_value("19:00"), None);
    }

    #[test]
    fn should_return_none_when_hour_out_of_range() {
        assert_eq!(map_time_to_value("13 PM"), None);
        assert_eq!(map_time_to_value("0 AM"), None);
    }

    #[test]
    fn should_render_day_label_for_iso_date() {
        assert_eq!(day_label("2024-04-27").unwrap(), "Saturday, April 27");
    }

    #[test]
    fn should_not_pad_single_digit_day() {
        assert_eq!(day_label("2025-01-05").unwrap(), "Sunday, January 5");
    }

    #[test]
    fn should_fail_with_date_format_error_when_date_unparsable() {
        let err = day_label("next friday").unwrap_err();
        assert_eq!(err.input, "next friday");
    }

    #[test]
    fn should_fail_when_date_does_not_exist() {
        assert!(day_label("2023-02-30").is_err());
    }
}
