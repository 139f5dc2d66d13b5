// Helper functions shared by the fraud_check handlers
use chrono::{NaiveTime, Timelike};

/// Hour of day from a receipt time such as "13:05:02" or "13:05".
pub fn transaction_hour_from_time(time_str: &str) -> Option<u8> {
    let trimmed = time_str.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .map(|t| t.hour() as u8)
}

/// Maps free-form gender text onto the two values the scoring service accepts.
pub fn normalize_gender(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "nam" | "male" | "m" => Some("Nam"),
        "nữ" | "nu" | "female" | "f" => Some("Nữ"),
        _ => None,
    }
}

pub fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
