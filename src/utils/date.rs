// src/utils/date.rs

//! Timestamp parsing and the fixed archive timestamp format.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Textual pattern every archived timestamp is normalized to.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp the way it is written to the archive.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIME_FORMAT).to_string()
}

/// Parse a timestamp written in the archive format.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT).ok()
}

/// Convert epoch milliseconds to a UTC wall-clock timestamp.
pub fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Serde adapter writing `NaiveDateTime` as `YYYY-MM-DD HH:MM:SS`.
pub mod archive_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::TIME_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIME_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(de::Error::custom)
    }

    /// Same format for optional fields.
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer, de};

        use super::TIME_FORMAT;

        pub fn serialize<S: Serializer>(
            ts: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => s.collect_str(&ts.format(TIME_FORMAT)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(d)? {
                Some(raw) => NaiveDateTime::parse_from_str(&raw, TIME_FORMAT)
                    .map(Some)
                    .map_err(de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

const FULL_DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%d %b %Y", "%d %B %Y"];
const MONTH_DAY_FORMATS: &[&str] = &["%b %d", "%B %d", "%d %b", "%d %B"];
const TIME_OF_DAY_FORMATS: &[&str] = &["%I:%M %p", "%I:%M%p", "%H:%M"];

/// Parse the date label a message listing shows next to a conversation.
///
/// Listings render recent items relatively: a bare time means today, a
/// weekday means the most recent such day before today, a month and day
/// means its latest occurrence not after `now`. `now` anchors all of these.
pub fn parse_listing_date(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    if let Some(ts) = parse_timestamp(&text) {
        return Some(ts);
    }

    for fmt in FULL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    // chrono needs a year to build a date, so borrow the current one
    let dated = format!("{} {}", text, now.year());
    for fmt in MONTH_DAY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&dated, &format!("{fmt} %Y")) {
            let ts = date.and_time(NaiveTime::MIN);
            if ts <= now {
                return Some(ts);
            }
            // a future day in this year was shown late last year
            return Some(date.with_year(now.year() - 1).unwrap_or(date).and_time(NaiveTime::MIN));
        }
    }

    let upper = text.to_uppercase();
    for fmt in TIME_OF_DAY_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(&upper, fmt) {
            return Some(now.date().and_time(time));
        }
    }

    if let Ok(weekday) = text.parse::<Weekday>() {
        let today = now.date();
        let back = (7 + today.weekday().num_days_from_monday()
            - weekday.num_days_from_monday())
            % 7;
        // today's items show a time, so today's weekday means a week ago
        let back = if back == 0 { 7 } else { back };
        return Some((today - Duration::days(back as i64)).and_time(NaiveTime::MIN));
    }

    None
}
