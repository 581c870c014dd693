use crate::contact::BirthDate;
use chrono::NaiveDate;

/// Render a birthdate as "March 15, 1920".
///
/// Missing parts yield an empty string. Parts that do not form a calendar
/// date are logged and echoed back as `Invalid date: Y-M-D`. The date is
/// pinned to midday UTC before formatting so no caller offset can shift it
/// across a day boundary.
pub fn transform_birthday(birth: &BirthDate) -> String {
    if !birth.is_complete() {
        return String::new();
    }
    match birth.to_naive_date() {
        Some(date) => format_long(date),
        None => {
            let raw = birth.raw();
            tracing::error!(input = %raw, "birthday is not a calendar date");
            format!("Invalid date: {raw}")
        }
    }
}

/// Same as [`transform_birthday`] for a single `YYYY-MM-DD` string.
pub fn transform_iso_birthday(iso: &str) -> String {
    let iso = iso.trim();
    if iso.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => format_long(date),
        Err(e) => {
            tracing::error!(input = %iso, error = %e, "failed to parse birthday");
            format!("Invalid date: {iso}")
        }
    }
}

fn format_long(date: NaiveDate) -> String {
    const LONG: &str = "%B %-d, %Y";
    match date.and_hms_opt(12, 0, 0) {
        Some(midday) => midday.and_utc().format(LONG).to_string(),
        None => date.format(LONG).to_string(),
    }
}
