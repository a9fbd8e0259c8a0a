use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

pub const DEFAULT_MARKET_TIMEZONE: &str = "America/New_York";

/// Today's calendar date in `tz`
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// Parse an IANA timezone name such as "America/New_York"
pub fn parse_timezone(name: &str) -> anyhow::Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", name, e))
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(date_str: &str) -> anyhow::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")?)
}

/// Format a date as YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("America/New_York").unwrap(), Tz::America__New_York);
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_date_round_trip_format() {
        let date = parse_date(" 2024-02-29 ").unwrap();
        assert_eq!(format_date(date), "2024-02-29");
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_today_in_is_close_to_utc_today() {
        let utc_today = Utc::now().date_naive();
        let tokyo_today = today_in(Tz::Asia__Tokyo);
        assert!((tokyo_today - utc_today).num_days().abs() <= 1);
    }
}
