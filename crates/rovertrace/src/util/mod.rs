use chrono::{DateTime, Local, TimeZone};
use eyre::Result;

pub fn initialise() -> Result<()> {
    color_eyre::install()
}

const UNKNOWN_TIME: &str = "--";

fn local_time(epoch_ms: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(epoch_ms).single()
}

/// Local time of day for an epoch-milliseconds timestamp.
pub fn format_clock(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Local date and time for an epoch-milliseconds timestamp.
pub fn format_timestamp(epoch_ms: i64) -> String {
    local_time(epoch_ms)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_millis(hour: u32, min: u32, sec: u32) -> i64 {
        Local
            .with_ymd_and_hms(2024, 1, 1, hour, min, sec)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn clock_is_local_time_of_day() {
        let ts = local_millis(13, 45, 30) + 250;
        assert_eq!(format_clock(ts), "13:45:30");
    }

    #[test]
    fn timestamp_carries_the_date() {
        let ts = local_millis(8, 5, 9);
        assert_eq!(format_timestamp(ts), "2024-01-01 08:05:09");
    }

    #[test]
    fn out_of_range_timestamps_are_placeholders() {
        assert_eq!(format_clock(i64::MAX), "--");
        assert_eq!(format_timestamp(i64::MIN), "--");
    }
}
