//! Date parsing and normalisation.
//!
//! Sentiment dates use ISO ordering. Trade timestamps are day-first, but
//! ISO strings are unambiguous (four-digit year first) and accepted too.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

/// Strip the time of day.
pub fn normalize(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

fn parse_with(
    value: &str,
    datetime_formats: &[&str],
    date_formats: &[&str],
) -> Option<NaiveDateTime> {
    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Day, month and year fields of the date part, in written order.
fn date_fields(value: &str) -> Vec<&str> {
    value
        .split([' ', 'T'])
        .next()
        .unwrap_or("")
        .split(['-', '/', '.'])
        .collect()
}

fn is_year(field: Option<&&str>) -> bool {
    field.is_some_and(|f| f.len() == 4 && f.bytes().all(|b| b.is_ascii_digit()))
}

/// `%Y` accepts one to four digits; only a written four-digit year counts.
fn year_first(value: &str) -> bool {
    is_year(date_fields(value).first())
}

fn year_last(value: &str) -> bool {
    let fields = date_fields(value);
    fields.len() == 3 && is_year(fields.get(2))
}

/// Parse a sentiment date and normalise it to midnight.
pub fn parse_sentiment_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !year_first(value) {
        return None;
    }
    parse_with(value, ISO_DATETIME_FORMATS, ISO_DATE_FORMATS)
        .map(normalize)
        .map(|ts| ts.date())
}

/// Parse a trade timestamp, day-first. Time of day is kept.
pub fn parse_trade_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if year_first(value) {
        parse_with(value, ISO_DATETIME_FORMATS, ISO_DATE_FORMATS)
    } else if year_last(value) {
        parse_with(value, DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn sentiment_iso_date() {
        assert_eq!(parse_sentiment_date("2024-01-01"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_sentiment_date(" 2018/02/01 "), Some(ymd(2018, 2, 1)));
    }

    #[test]
    fn sentiment_datetime_is_normalised() {
        assert_eq!(
            parse_sentiment_date("2024-03-05 13:45:00"),
            Some(ymd(2024, 3, 5))
        );
    }

    #[test]
    fn sentiment_rejects_garbage() {
        assert_eq!(parse_sentiment_date("yesterday"), None);
        assert_eq!(parse_sentiment_date(""), None);
        assert_eq!(parse_sentiment_date("2024-13-01"), None);
    }

    #[test]
    fn trade_timestamp_is_day_first() {
        let ts = parse_trade_timestamp("02-12-2024 22:50").unwrap();
        assert_eq!(ts.date(), ymd(2024, 12, 2));
        assert_eq!(ts.time(), NaiveTime::from_hms_opt(22, 50, 0).unwrap());

        let ts = parse_trade_timestamp("05/01/2025 03:04:05").unwrap();
        assert_eq!(ts.date(), ymd(2025, 1, 5));
    }

    #[test]
    fn trade_timestamp_accepts_iso() {
        let ts = parse_trade_timestamp("2024-01-01 09:30").unwrap();
        assert_eq!(ts.date(), ymd(2024, 1, 1));
        let ts = parse_trade_timestamp("2024-01-02").unwrap();
        assert_eq!(ts, ymd(2024, 1, 2).and_time(NaiveTime::MIN));
    }

    #[test]
    fn trade_timestamp_rejects_impossible_day_first() {
        assert_eq!(parse_trade_timestamp("32-01-2024 10:00"), None);
        assert_eq!(parse_trade_timestamp("not a time"), None);
    }

    #[test]
    fn two_digit_years_are_rejected() {
        assert_eq!(parse_trade_timestamp("05-01-24 10:00"), None);
        assert_eq!(parse_trade_timestamp("5/1/24 10:00"), None);
        assert_eq!(parse_trade_timestamp("24-01-05"), None);
        assert_eq!(parse_sentiment_date("01-02-24"), None);
        assert_eq!(parse_sentiment_date("24-02-01"), None);
    }

    #[test]
    fn day_first_is_never_read_as_iso() {
        assert_eq!(parse_sentiment_date("01-02-2024"), None);
        let ts = parse_trade_timestamp("1/2/2024 10:00").unwrap();
        assert_eq!(ts.date(), ymd(2024, 2, 1));
    }

    #[test]
    fn normalize_strips_time() {
        let ts = ymd(2024, 6, 1).and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(normalize(ts), ymd(2024, 6, 1).and_time(NaiveTime::MIN));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(
            days in 0i64..40_000,
            secs in 0u32..86_400,
        ) {
            let date = ymd(1970, 1, 1) + chrono::Duration::days(days);
            let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap();
            let ts = date.and_time(time);
            let once = normalize(ts);
            prop_assert_eq!(normalize(once), once);
            prop_assert_eq!(once.date(), date);
        }

        #[test]
        fn day_first_round_trips_through_format(
            days in 0i64..40_000,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let date = ymd(1970, 1, 1) + chrono::Duration::days(days);
            let ts = date.and_hms_opt(hour, minute, 0).unwrap();
            let text = ts.format("%d-%m-%Y %H:%M").to_string();
            prop_assert_eq!(parse_trade_timestamp(&text), Some(ts));
        }
    }
}
