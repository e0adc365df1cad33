use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    coordinator::ConsumptionByName,
    core::{
        selector::Selection,
        utility::{DeviceClass, UtilityKind},
    },
};

const NAME_PREFIX: &str = "Provident Energy";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StateClass {
    TotalIncreasing,
}

/// Live reading of a single utility, as displayed by the home automation host.
#[must_use]
#[derive(Clone, Debug)]
pub struct Sensor {
    pub kind: UtilityKind,
    pub name: String,
    pub unique_id: String,
}

impl Sensor {
    /// One sensor per known utility kind present in the data.
    pub fn discover(data: &ConsumptionByName) -> Vec<Self> {
        UtilityKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let consumption = data.get(&kind.to_string())?;
                Some(Self {
                    kind,
                    name: format!("{NAME_PREFIX} {kind}"),
                    unique_id: consumption.utility.title.clone(),
                })
            })
            .collect()
    }

    #[must_use]
    pub const fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    #[must_use]
    pub const fn device_class(&self) -> DeviceClass {
        self.kind.device_class()
    }

    #[must_use]
    pub const fn state_class(&self) -> StateClass {
        StateClass::TotalIncreasing
    }

    fn selection(&self, now: DateTime<Local>) -> Selection {
        Selection::at(now, self.kind.reporting_delay_hours())
    }

    /// Current value, if the latest data has it.
    #[must_use]
    pub fn native_value(&self, data: &ConsumptionByName, now: DateTime<Local>) -> Option<f64> {
        let consumption = data.get(&self.kind.to_string())?;
        self.selection(now).select(&consumption.data)
    }

    pub fn attributes(&self, data: &ConsumptionByName, now: DateTime<Local>) -> Attributes {
        let selection = self.selection(now);
        let mut attributes = Attributes {
            timestamp: selection.timestamp,
            delay_hours: selection.delay_hours,
            data_hour: selection.hour_of_day(),
            day_offset: selection.day_offset(),
            data_index: None,
            start_date: None,
            end_date: None,
        };
        if let Some(consumption) = data.get(&self.kind.to_string())
            && consumption.is_complete()
        {
            attributes.data_index = selection.index();
            attributes.start_date = Some(consumption.start_date);
            attributes.end_date = Some(consumption.end_date);
        }
        attributes
    }
}

/// Extra state attributes describing which reading has been picked.
#[must_use]
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attributes {
    pub timestamp: DateTime<Local>,
    pub delay_hours: u32,

    /// Hour of the day the reading belongs to.
    pub data_hour: i64,

    pub day_offset: i64,
    pub data_index: Option<usize>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::{
        api::portal::fake::quick_graph,
        core::{
            consumption::{Consumption, Window},
            utility::Utility,
        },
        prelude::*,
    };

    fn consumption(id: &str, utility: &str, title: &str) -> Result<Consumption> {
        Ok(Consumption::new(
            Utility { id: id.into(), text: utility.into(), title: title.into() },
            quick_graph(utility),
            Window::around(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())?,
        ))
    }

    fn data() -> Result<ConsumptionByName> {
        Ok(ConsumptionByName::from([
            ("Hot Water".to_owned(), consumption("m3", "Hot Water", "HW-0001")?),
            ("Electricity".to_owned(), consumption("m1", "Electricity", "E-0001")?),
            ("Gas".to_owned(), consumption("m9", "Gas", "G-0001")?),
        ]))
    }

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 10, 15, 0).unwrap()
    }

    #[test]
    fn test_discover_ok() -> Result {
        let sensors = Sensor::discover(&data()?);
        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[0].kind, UtilityKind::Electricity);
        assert_eq!(sensors[0].name, "Provident Energy Electricity");
        assert_eq!(sensors[0].unique_id, "E-0001");
        assert_eq!(sensors[0].unit(), "kWh");
        assert_eq!(sensors[0].device_class(), DeviceClass::Energy);
        assert_eq!(sensors[1].kind, UtilityKind::HotWater);
        assert_eq!(sensors[1].unit(), "m³");
        assert_eq!(sensors[1].device_class(), DeviceClass::Water);
        Ok(())
    }

    #[test]
    fn test_native_value_ok() -> Result {
        let data = data()?;
        let sensors = Sensor::discover(&data);
        assert_abs_diff_eq!(sensors[0].native_value(&data, now()).unwrap(), 10.0);
        assert_abs_diff_eq!(sensors[1].native_value(&data, now()).unwrap(), 32.0);
        Ok(())
    }

    #[test]
    fn test_native_value_incomplete_series() -> Result {
        let mut data = data()?;
        let sensors = Sensor::discover(&data);
        data.get_mut("Electricity").unwrap().data.pop();
        assert_eq!(sensors[0].native_value(&data, now()), None);
        Ok(())
    }

    #[test]
    fn test_attributes_ok() -> Result {
        let data = data()?;
        let sensors = Sensor::discover(&data);
        let attributes = sensors[1].attributes(&data, now());
        assert_eq!(attributes.delay_hours, 2);
        assert_eq!(attributes.data_hour, 8);
        assert_eq!(attributes.day_offset, 0);
        assert_eq!(attributes.data_index, Some(32));
        assert_eq!(attributes.start_date.unwrap().to_string(), "2026-10-17 00:00:00");

        let json = serde_json::to_value(&attributes)?;
        assert_eq!(json["data_index"], 32);
        assert_eq!(json["end_date"], "2026-10-19T00:00:00");
        Ok(())
    }

    #[test]
    fn test_attributes_without_complete_series() -> Result {
        let mut data = data()?;
        let sensors = Sensor::discover(&data);
        data.get_mut("Electricity").unwrap().data.truncate(24);
        let attributes = sensors[0].attributes(&data, now());
        assert_eq!(attributes.delay_hours, 24);
        assert_eq!(attributes.data_hour, 10);
        assert_eq!(attributes.day_offset, -1);
        assert_eq!(attributes.data_index, None);

        let json = serde_json::to_value(&attributes)?;
        assert!(json.get("data_index").is_none());
        assert!(json.get("start_date").is_none());
        assert!(json.get("timestamp").is_some());
        Ok(())
    }
}
