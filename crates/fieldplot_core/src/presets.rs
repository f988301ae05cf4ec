//! Point-charge arrangements offered by the electric-field demo.

use crate::field::{add, charge_field, subtract, SharedField};
use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldPreset {
    /// One unit charge at the origin.
    #[default]
    Single,
    /// `+1` at `(-1, 0)` and `-1` at `(1, 0)`.
    Dipole,
    /// `+1` at both `(-1, 0)` and `(1, 0)`.
    Double,
    /// `+2` at `(-1, 0)` and `-1` at `(1, 0)`.
    ImbalancedDipole,
}

impl FieldPreset {
    pub const ALL: [FieldPreset; 4] = [
        FieldPreset::Single,
        FieldPreset::Dipole,
        FieldPreset::Double,
        FieldPreset::ImbalancedDipole,
    ];

    /// The identifier used in serialized settings and `<select>` values.
    pub fn name(self) -> &'static str {
        match self {
            FieldPreset::Single => "single",
            FieldPreset::Dipole => "dipole",
            FieldPreset::Double => "double",
            FieldPreset::ImbalancedDipole => "imbalancedDipole",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldPreset::Single => "Single Charge",
            FieldPreset::Dipole => "Dipole",
            FieldPreset::Double => "Double Charge",
            FieldPreset::ImbalancedDipole => "Imbalanced Dipole",
        }
    }

    pub fn field(self) -> SharedField {
        match self {
            FieldPreset::Single => Arc::new(charge_field(1.0, 0.0, 0.0)),
            FieldPreset::Dipole => Arc::new(subtract(
                charge_field(1.0, -1.0, 0.0),
                charge_field(1.0, 1.0, 0.0),
            )),
            FieldPreset::Double => Arc::new(add(
                charge_field(1.0, -1.0, 0.0),
                charge_field(1.0, 1.0, 0.0),
            )),
            FieldPreset::ImbalancedDipole => Arc::new(subtract(
                charge_field(2.0, -1.0, 0.0),
                charge_field(1.0, 1.0, 0.0),
            )),
        }
    }
}

impl fmt::Display for FieldPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match FieldPreset::ALL.into_iter().find(|p| p.name() == s) {
            Some(preset) => Ok(preset),
            None => bail!("unknown field preset '{s}'"),
        }
    }
}
