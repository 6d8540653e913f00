use chrono::{DateTime, NaiveDateTime, Timelike, TimeZone};

/// Format of every timestamp written to the activity log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(moment: &NaiveDateTime) -> String {
    moment.format(TIMESTAMP_FORMAT).to_string()
}

/// Drops the sub-second part. Records are kept at second precision so that the stored duration
/// always matches the stored timestamps.
pub fn truncate_to_seconds<Tz: TimeZone>(moment: DateTime<Tz>) -> DateTime<Tz> {
    moment.with_nanosecond(0).unwrap_or(moment)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, TimeZone, Timelike};

    use super::{format_timestamp, truncate_to_seconds};

    #[test]
    fn test_format_timestamp() {
        let moment = NaiveDate::from_ymd_opt(2018, 7, 4)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap();
        assert_eq!(format_timestamp(&moment), "2018-07-04 09:05:03");
    }

    #[test]
    fn test_truncate_to_seconds() {
        let moment = Local
            .with_ymd_and_hms(2018, 7, 4, 12, 0, 0)
            .unwrap()
            .with_nanosecond(750_000_000)
            .unwrap();
        assert_eq!(truncate_to_seconds(moment).nanosecond(), 0);
    }
}
