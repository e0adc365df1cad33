use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    api::models::QuickGraph,
    core::utility::{Utility, clean_utility_name, units_for},
    prelude::*,
};

/// Number of hourly readings the portal returns: 24 for yesterday and 24 for today.
pub const N_READINGS: usize = 48;

/// Requested date range: from yesterday until tomorrow, exclusive.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn around(today: NaiveDate) -> Result<Self> {
        Ok(Self {
            start: today.checked_sub_days(Days::new(1)).context("date out of range")?,
            end: today.checked_add_days(Days::new(1)).context("date out of range")?,
        })
    }
}

/// Hourly consumption series of a single utility.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Consumption {
    pub utility: Utility,

    /// Utility name without the parenthetical suffix.
    pub utility_name: String,

    /// Empty for unknown utilities.
    pub units: &'static str,

    pub name: String,
    pub site: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,

    /// Raw readings, `null` ones included.
    pub data: Vec<Option<f64>>,
}

impl Consumption {
    pub fn new(utility: Utility, graph: QuickGraph, window: Window) -> Self {
        let utility_name = clean_utility_name(&graph.utility).to_owned();
        let units = units_for(&utility_name);
        Self {
            utility,
            utility_name,
            units,
            name: graph.name.unwrap_or_default(),
            site: graph.site.unwrap_or_default(),
            start_date: window.start.and_time(NaiveTime::MIN),
            end_date: window.end.and_time(NaiveTime::MIN),
            data: graph.data,
        }
    }

    /// Whether the series is usable for point lookups.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.data.len() == N_READINGS
    }
}
