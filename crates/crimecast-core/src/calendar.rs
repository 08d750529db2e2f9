//! Calendar decomposition of a query timestamp

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{FeatureError, FeatureResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

/// Meteorological season (Dec-Feb winter, Mar-May spring, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Season for a calendar month (1-12). Out-of-range months wrap.
    pub fn from_month(month: u32) -> Self {
        match (month % 12 + 3) / 3 {
            1 => Season::Winter,
            2 => Season::Spring,
            3 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// 1-based season index used at training time (winter = 1)
    pub fn index(self) -> u32 {
        match self {
            Season::Winter => 1,
            Season::Spring => 2,
            Season::Summer => 3,
            Season::Fall => 4,
        }
    }

    /// Label the season encoder was fitted on
    pub fn label(self) -> String {
        self.index().to_string()
    }
}

/// Time-derived features for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFeatures {
    pub hour: u32,
    /// ISO day of week, Monday = 0
    pub day_of_week: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub is_night: bool,
    pub is_rush_hour: bool,
    pub is_business_hours: bool,
    pub season: Season,
}

impl CalendarFeatures {
    pub fn from_timestamp(ts: NaiveDateTime) -> Self {
        let hour = ts.hour();
        let day_of_week = ts.weekday().num_days_from_monday();
        let month = ts.month();
        let is_weekend = day_of_week >= 5;

        Self {
            hour,
            day_of_week,
            month,
            is_weekend,
            is_night: hour >= 18 || hour <= 6,
            is_rush_hour: (7..=9).contains(&hour) || (16..=18).contains(&hour),
            is_business_hours: (9..=17).contains(&hour) && !is_weekend,
            season: Season::from_month(month),
        }
    }
}

/// Parse `YYYY-MM-DD` plus a time of day into one timestamp
pub fn parse_timestamp(date: &str, time: &str) -> FeatureResult<NaiveDateTime> {
    let day = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|e| FeatureError::InvalidInput(format!("date '{}': {}", date, e)))?;

    let time = time.trim();
    let clock = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
        .ok_or_else(|| FeatureError::InvalidInput(format!("time '{}'", time)))?;

    Ok(day.and_time(clock))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(date: &str, time: &str) -> CalendarFeatures {
        CalendarFeatures::from_timestamp(parse_timestamp(date, time).unwrap())
    }

    #[test]
    fn test_season_grouping() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Fall);
        assert_eq!(Season::from_month(11), Season::Fall);
        assert_eq!(Season::Summer.label(), "3");
    }

    #[test]
    fn test_sunday_afternoon() {
        // 2025-06-15 is a Sunday
        let f = features("2025-06-15", "14:30:00");
        assert_eq!(f.hour, 14);
        assert_eq!(f.day_of_week, 6);
        assert_eq!(f.month, 6);
        assert!(f.is_weekend);
        assert!(!f.is_night);
        assert!(!f.is_rush_hour);
        assert!(!f.is_business_hours);
        assert_eq!(f.season, Season::Summer);
    }

    #[test]
    fn test_weekday_boundaries() {
        // 2025-06-16 is a Monday
        let f = features("2025-06-16", "09:00:00");
        assert_eq!(f.day_of_week, 0);
        assert!(f.is_rush_hour);
        assert!(f.is_business_hours);
        assert!(!f.is_night);

        let f = features("2025-06-16", "18:00:00");
        assert!(f.is_night);
        assert!(f.is_rush_hour);
        assert!(!f.is_business_hours);

        let f = features("2025-06-16", "06:59:59");
        assert!(f.is_night);
        assert!(!f.is_rush_hour);

        let f = features("2025-06-16", "17:59");
        assert!(f.is_business_hours);
        assert!(f.is_rush_hour);
    }

    #[test]
    fn test_saturday_is_weekend() {
        let f = features("2025-06-14", "12:00:00");
        assert_eq!(f.day_of_week, 5);
        assert!(f.is_weekend);
        assert!(!f.is_business_hours);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            parse_timestamp("2025-13-01", "10:00:00"),
            Err(FeatureError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_timestamp("2025-06-15", "25:00:00"),
            Err(FeatureError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_timestamp("yesterday", "noon"),
            Err(FeatureError::InvalidInput(_))
        ));
    }
}
