//! Days-until-expiry and urgency classification

use crate::config::SOON_THRESHOLD_DAYS;
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a stored date.
///
/// Accepts `YYYY-MM-DD`, or an ISO / RFC 3339 timestamp whose leading date
/// part is used as-is.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Whole days from `today` to `date`; negative once the date has passed
pub fn days_until_date(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Whole days from `today` to the parsed date, `None` if it does not parse
pub fn days_until(raw: &str, today: NaiveDate) -> Option<i64> {
    parse_date(raw).map(|date| days_until_date(date, today))
}

/// Display bucket for a days-until-expiry value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Expired,
    Today,
    Soon,
    Safe,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Expired => "expired",
            Urgency::Today => "today",
            Urgency::Soon => "soon",
            Urgency::Safe => "safe",
        }
    }
}

pub fn classify_urgency(days: i64) -> Urgency {
    match days {
        d if d < 0 => Urgency::Expired,
        0 => Urgency::Today,
        d if d <= SOON_THRESHOLD_DAYS => Urgency::Soon,
        _ => Urgency::Safe,
    }
}

/// Human-readable countdown, e.g. "In 3 days" or "Expired 1 day ago"
pub fn describe_days(days: i64) -> String {
    match days {
        d if d < 0 => {
            let ago = d.unsigned_abs();
            format!("Expired {} day{} ago", ago, if ago == 1 { "" } else { "s" })
        }
        0 => "Today".to_string(),
        1 => "In 1 day".to_string(),
        d => format!("In {} days", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_today_is_zero() {
        for raw in ["2024-01-01", "2024-02-29", "2023-12-31", "2025-06-15"] {
            assert_eq!(days_until(raw, day(raw)), Some(0), "{}", raw);
        }
    }

    #[test]
    fn test_three_days_out_is_soon() {
        let today = day("2024-03-10");
        let expiry = (today + Duration::days(3)).format("%Y-%m-%d").to_string();

        let days = days_until(&expiry, today).unwrap();
        assert_eq!(days, 3);
        assert_eq!(classify_urgency(days), Urgency::Soon);
    }

    #[test]
    fn test_yesterday_is_expired() {
        let today = day("2024-03-01");

        let days = days_until("2024-02-29", today).unwrap();
        assert_eq!(days, -1);
        assert_eq!(classify_urgency(days), Urgency::Expired);
    }

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(classify_urgency(-10), Urgency::Expired);
        assert_eq!(classify_urgency(0), Urgency::Today);
        assert_eq!(classify_urgency(1), Urgency::Soon);
        assert_eq!(classify_urgency(5), Urgency::Soon);
        assert_eq!(classify_urgency(6), Urgency::Safe);
    }

    #[test]
    fn test_unparseable_date() {
        let today = day("2024-03-01");
        assert_eq!(days_until("", today), None);
        assert_eq!(days_until("soon", today), None);
        assert_eq!(days_until("2024-13-40", today), None);
    }

    #[test]
    fn test_timestamp_dates_use_date_part() {
        assert_eq!(parse_date("2024-05-06T22:30:00.000Z"), Some(day("2024-05-06")));
        assert_eq!(parse_date("2024-05-06T08:00:00"), Some(day("2024-05-06")));
    }

    #[test]
    fn test_describe_days() {
        assert_eq!(describe_days(-1), "Expired 1 day ago");
        assert_eq!(describe_days(-4), "Expired 4 days ago");
        assert_eq!(describe_days(0), "Today");
        assert_eq!(describe_days(1), "In 1 day");
        assert_eq!(describe_days(12), "In 12 days");
    }
}
