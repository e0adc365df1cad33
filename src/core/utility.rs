use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::{api::models::Node, prelude::*};

/// Parent of the top-level nodes in the meter tree.
const ROOT_PARENT: &str = "#";

/// Single metered resource: an electricity meter, a water meter, and so on.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display)]
#[display("{text} ({id})")]
pub struct Utility {
    pub id: String,
    pub text: String,

    /// Stable unique identifier used downstream.
    pub title: String,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtilityGroup {
    pub id: String,
    pub text: String,
    pub utilities: Vec<Utility>,
}

impl UtilityGroup {
    /// Build the groups from the flat meter tree.
    ///
    /// Root nodes must come before their children.
    pub fn try_from_nodes(nodes: Vec<Node>) -> Result<Vec<Self>> {
        ensure!(!nodes.is_empty(), "no utility groups found");

        let mut groups: Vec<Self> = Vec::new();
        let mut positions = HashMap::new();

        for node in nodes {
            if node.parent == ROOT_PARENT {
                ensure!(
                    positions.insert(node.id.clone(), groups.len()).is_none(),
                    "duplicate utility group `{}`",
                    node.id,
                );
                groups.push(Self { id: node.id, text: node.text, utilities: Vec::new() });
            } else {
                let position = *positions.get(&node.parent).with_context(|| {
                    format!("node `{}` refers to unknown group `{}`", node.id, node.parent)
                })?;
                let title = node
                    .attributes
                    .and_then(|attributes| attributes.title)
                    .with_context(|| format!("node `{}` has no title", node.id))?;
                groups[position].utilities.push(Utility { id: node.id, text: node.text, title });
            }
        }

        Ok(groups)
    }
}

/// Utility types known to the portal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum UtilityKind {
    #[display("Electricity")]
    Electricity,

    #[display("Cold Water")]
    ColdWater,

    #[display("Hot Water")]
    HotWater,

    #[display("Cooling")]
    Cooling,

    #[display("Heating")]
    Heating,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Energy,
    Water,
}

impl UtilityKind {
    pub const ALL: [Self; 5] =
        [Self::Electricity, Self::ColdWater, Self::HotWater, Self::Cooling, Self::Heating];

    pub const KILOWATT_HOURS: &'static str = "kWh";
    pub const CUBIC_METERS: &'static str = "m³";

    /// Look up the kind by the cleaned utility name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.to_string() == name)
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Electricity | Self::Cooling | Self::Heating => Self::KILOWATT_HOURS,
            Self::ColdWater | Self::HotWater => Self::CUBIC_METERS,
        }
    }

    #[must_use]
    pub const fn device_class(self) -> DeviceClass {
        match self {
            Self::Electricity | Self::Cooling | Self::Heating => DeviceClass::Energy,
            Self::ColdWater | Self::HotWater => DeviceClass::Water,
        }
    }

    /// Hours it takes the portal to publish the newest hourly reading.
    #[must_use]
    pub const fn reporting_delay_hours(self) -> u32 {
        match self {
            Self::Electricity => 24,
            Self::ColdWater | Self::HotWater | Self::Cooling | Self::Heating => 2,
        }
    }
}

/// Unit for the cleaned utility name, empty for unknown utilities.
#[must_use]
pub fn units_for(utility_name: &str) -> &'static str {
    UtilityKind::from_name(utility_name).map_or("", UtilityKind::unit)
}

/// Strip the trailing parenthetical: `Electricity (Main Meter)` becomes `Electricity`.
#[must_use]
pub fn clean_utility_name(name: &str) -> &str {
    static PATTERN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^(.*)\s\(.*\)$").expect("the pattern must be valid"));
    PATTERN
        .captures(name)
        .and_then(|captures| captures.get(1))
        .map_or(name, |prefix| prefix.as_str())
}
