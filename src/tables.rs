use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::{
    coordinator::ConsumptionByName,
    core::utility::UtilityGroup,
    sensor::Sensor,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_groups_table(groups: &[UtilityGroup]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Group", "ID", "Utilities", "Titles"]);
    for group in groups {
        table.add_row(vec![
            Cell::new(&group.text),
            Cell::new(&group.id).add_attribute(Attribute::Dim),
            Cell::new(group.utilities.iter().join("\n")),
            Cell::new(group.utilities.iter().map(|utility| &utility.title).join("\n"))
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_consumption_table(data: &ConsumptionByName, now: DateTime<Local>) -> Table {
    let sensors = Sensor::discover(data);

    let mut table = new_table();
    table.set_header(vec![
        "Utility", "Name", "Site", "Start", "End", "Readings", "Index", "Value", "Units",
    ]);
    for (utility_name, consumption) in data {
        let sensor = sensors.iter().find(|sensor| sensor.kind.to_string() == *utility_name);
        let n_readings = consumption.data.iter().flatten().count();
        let index = sensor.and_then(|sensor| sensor.attributes(data, now).data_index);
        let value = sensor.and_then(|sensor| sensor.native_value(data, now));
        table.add_row(vec![
            Cell::new(utility_name).fg(if sensor.is_some() {
                Color::Reset
            } else {
                Color::DarkYellow
            }),
            Cell::new(&consumption.name),
            Cell::new(&consumption.site).add_attribute(Attribute::Dim),
            Cell::new(consumption.start_date.format("%b %d")),
            Cell::new(consumption.end_date.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(format!("{n_readings}/{}", consumption.data.len()))
                .set_alignment(CellAlignment::Right)
                .fg(if consumption.is_complete() { Color::Green } else { Color::Red }),
            Cell::new(index.map_or_else(String::new, |index| index.to_string()))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(value.map_or_else(|| "-".to_owned(), |value| format!("{value:.3}")))
                .set_alignment(CellAlignment::Right),
            Cell::new(consumption.units),
        ]);
    }
    table
}
