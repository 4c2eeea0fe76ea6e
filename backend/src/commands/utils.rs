use chrono::NaiveDate;

pub fn parse_date_safe(date_str: &str) -> Option<NaiveDate> {
    if date_str.trim().is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str.trim(), "%Y%m%d"))
        .ok()
}

/// Trims an optional field and treats blank input as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
