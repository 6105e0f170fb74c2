//! Calendar-date parsing and formatting.
//!
//! Holiday dates are pure (year, month, day) triples — never instants —
//! so parsing and formatting must not apply any timezone shift.

use crate::error::Error;
use chrono::NaiveDate;

const ISO_DATE: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` string into a calendar date.
pub fn parse_holiday_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), ISO_DATE).map_err(|e| Error::MalformedResponse {
        name: "date",
        reason: format!("invalid calendar date {raw:?}: {e}"),
    })
}

/// Format a calendar date as ISO `YYYY-MM-DD`.
pub fn format_holiday_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for s in ["2025-01-01", "2025-09-07", "2024-02-29", "1999-12-31"] {
            let parsed = parse_holiday_date(s).unwrap();
            assert_eq!(format_holiday_date(parsed), s);
        }
    }

    #[test]
    fn test_no_timezone_shift() {
        let d = parse_holiday_date("2025-09-07").unwrap();
        assert_eq!(
            (
                chrono::Datelike::year(&d),
                chrono::Datelike::month(&d),
                chrono::Datelike::day(&d)
            ),
            (2025, 9, 7)
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_holiday_date("not-a-date").is_err());
        assert!(parse_holiday_date("2025-13-01").is_err());
        assert!(parse_holiday_date("2025-02-30").is_err());
        assert!(parse_holiday_date("").is_err());
    }
}
