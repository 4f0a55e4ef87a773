//! Blood component kinds and their storage characteristics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The component kinds a whole-blood donation can be separated into, plus
/// whole blood itself for units that are stored unseparated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    WholeBlood,
    RedCells,
    Plasma,
    Platelets,
    Cryoprecipitate,
}

impl ComponentType {
    /// Default shelf life in days, used when a separation request does not
    /// specify an explicit expiry. Red cells 42 days, plasma and
    /// cryoprecipitate a year frozen, platelets 5 days at room temperature,
    /// whole blood 35 days in CPDA-1.
    pub fn default_shelf_life_days(self) -> u32 {
        match self {
            ComponentType::WholeBlood => 35,
            ComponentType::RedCells => 42,
            ComponentType::Plasma => 365,
            ComponentType::Platelets => 5,
            ComponentType::Cryoprecipitate => 365,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentType::WholeBlood => "whole blood",
            ComponentType::RedCells => "red cells",
            ComponentType::Plasma => "plasma",
            ComponentType::Platelets => "platelets",
            ComponentType::Cryoprecipitate => "cryoprecipitate",
        };
        write!(f, "{label}")
    }
}
