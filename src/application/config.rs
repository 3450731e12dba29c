//! Fixed values that stand in for a clock in this mock.

use serde::Serialize;

use crate::domain::{DomainResult, MockDate};

pub const DEFAULT_BOOKING_TIME_DISPLAY: &str = "27 Jul 25 | 12:28 PM";

/// Recognized options: `mockDate` (DDMMYYYY, stamped into transaction IDs)
/// and `mockBookingTimeDisplay` (shown as the booking time on the ticket).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MockConfig {
    pub mock_date: MockDate,
    pub mock_booking_time_display: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mock_date: MockDate::default(),
            mock_booking_time_display: DEFAULT_BOOKING_TIME_DISPLAY.to_string(),
        }
    }
}

impl MockConfig {
    /// Builds a config from optional overrides, keeping defaults for
    /// anything not given.
    pub fn from_overrides(mock_date: Option<&str>, booking_time: Option<&str>) -> DomainResult<Self> {
        let mut config = Self::default();
        if let Some(date) = mock_date {
            config.mock_date = MockDate::parse(date)?;
        }
        if let Some(time) = booking_time {
            config.mock_booking_time_display = time.to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MockConfig::default();
        assert_eq!(config.mock_date.as_str(), "27072025");
        assert_eq!(config.mock_booking_time_display, "27 Jul 25 | 12:28 PM");
    }

    #[test]
    fn test_overrides() {
        let config = MockConfig::from_overrides(Some("15082026"), Some("15 Aug 26 | 09:00 AM")).unwrap();
        assert_eq!(config.mock_date.as_str(), "15082026");
        assert_eq!(config.mock_booking_time_display, "15 Aug 26 | 09:00 AM");

        let partial = MockConfig::from_overrides(None, Some("now-ish")).unwrap();
        assert_eq!(partial.mock_date.as_str(), "27072025");
    }

    #[test]
    fn test_bad_mock_date_is_rejected() {
        assert!(MockConfig::from_overrides(Some("2025-07-27"), None).is_err());
    }

    #[test]
    fn test_serializes_with_recognized_option_names() {
        let json = serde_json::to_value(MockConfig::default()).unwrap();
        assert_eq!(json["mockDate"], "27072025");
        assert_eq!(json["mockBookingTimeDisplay"], "27 Jul 25 | 12:28 PM");
    }
}
