//! Publication date parsing.

use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &["%Y年%m月%d日 %H:%M", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y年%m月%d日", "%Y/%m/%d", "%Y-%m-%d"];

/// Parse a publication date in any of the formats research output uses.
///
/// Date-only values resolve to midnight. Unrecognized values return `None`;
/// a bad date never invalidates the record carrying it.
///
/// # Examples
///
/// ```
/// use kizashi_parse::parse_date;
///
/// let date = parse_date("2025年03月14日").unwrap();
/// assert_eq!(date.format("%Y-%m-%d").to_string(), "2025-03-14");
/// assert!(parse_date("last Tuesday").is_none());
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
