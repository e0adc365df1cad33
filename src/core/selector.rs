use chrono::{DateTime, Local, TimeDelta, Timelike};

use crate::core::consumption::N_READINGS;

/// Hours in either half of the series.
const HOURS_PER_DAY: i64 = 24;

/// Picks the reading that represents «now» out of the yesterday-and-today series.
///
/// Everything here is derived from the wall clock and the reporting delay, so it is meant to be
/// recomputed on every read.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Moment the selected reading refers to.
    pub timestamp: DateTime<Local>,

    pub delay_hours: u32,

    /// Current hour minus the delay, negative when it falls on yesterday.
    pub data_hour: i64,
}

impl Selection {
    pub fn at(now: DateTime<Local>, delay_hours: u32) -> Self {
        let data_hour = i64::from(now.hour()) - i64::from(delay_hours);
        Self { timestamp: now - TimeDelta::hours(i64::from(delay_hours)), delay_hours, data_hour }
    }

    /// Hour of the day the reading belongs to.
    #[must_use]
    pub const fn hour_of_day(&self) -> i64 {
        if self.data_hour < 0 { self.data_hour + HOURS_PER_DAY } else { self.data_hour }
    }

    /// `-1` for yesterday and `0` for today.
    #[must_use]
    pub const fn day_offset(&self) -> i64 {
        if self.data_hour < 0 { -1 } else { 0 }
    }

    /// Position in the series.
    ///
    /// The same offset is applied on both sides of midnight: a negative hour wraps into
    /// yesterday's half and a non-negative one lands in today's half.
    #[must_use]
    #[allow(clippy::if_same_then_else)]
    pub fn index(&self) -> Option<usize> {
        let index = if self.data_hour < 0 {
            self.data_hour + HOURS_PER_DAY
        } else {
            self.data_hour + HOURS_PER_DAY
        };
        usize::try_from(index).ok().filter(|index| *index < N_READINGS)
    }

    /// Select the reading, or nothing when the series is not a full 48-hour one.
    #[must_use]
    pub fn select(&self, readings: &[Option<f64>]) -> Option<f64> {
        if readings.len() != N_READINGS {
            return None;
        }
        readings.get(self.index()?).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;

    fn at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, hour, 30, 0).unwrap()
    }

    fn series() -> Vec<Option<f64>> {
        (0..N_READINGS).map(|index| Some(index as f64 / 10.0)).collect()
    }

    #[test]
    fn test_electricity_points_into_yesterday() {
        let selection = Selection::at(at_hour(10), 24);
        assert_eq!(selection.data_hour, -14);
        assert_eq!(selection.index(), Some(10));
        assert_eq!(selection.hour_of_day(), 10);
        assert_eq!(selection.day_offset(), -1);
        assert_eq!(selection.timestamp, at_hour(10) - TimeDelta::hours(24));
    }

    #[test]
    fn test_water_points_into_today() {
        let selection = Selection::at(at_hour(10), 2);
        assert_eq!(selection.data_hour, 8);
        assert_eq!(selection.index(), Some(32));
        assert_eq!(selection.hour_of_day(), 8);
        assert_eq!(selection.day_offset(), 0);
    }

    #[test]
    fn test_shortly_after_midnight() {
        let selection = Selection::at(at_hour(1), 2);
        assert_eq!(selection.data_hour, -1);
        assert_eq!(selection.index(), Some(23));
        assert_eq!(selection.hour_of_day(), 23);
        assert_eq!(selection.day_offset(), -1);
    }

    #[test]
    fn test_every_hour_stays_in_range() {
        for hour in 0..24 {
            for delay_hours in [2, 24] {
                let index = Selection::at(at_hour(hour), delay_hours).index();
                assert!(index.is_some_and(|index| index < N_READINGS), "hour={hour}");
            }
        }
    }

    #[test]
    fn test_select_ok() {
        let value = Selection::at(at_hour(10), 2).select(&series());
        assert_abs_diff_eq!(value.unwrap(), 3.2);
    }

    #[test]
    fn test_select_null_reading() {
        let mut series = series();
        series[10] = None;
        assert_eq!(Selection::at(at_hour(10), 24).select(&series), None);
    }

    #[test]
    fn test_select_incomplete_series() {
        let short = vec![Some(1.0); 47];
        let long = vec![Some(1.0); 49];
        for hour in 0..24 {
            let selection = Selection::at(at_hour(hour), 2);
            assert_eq!(selection.select(&short), None);
            assert_eq!(selection.select(&long), None);
            assert_eq!(selection.select(&[]), None);
        }
    }
}
