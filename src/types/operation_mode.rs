// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater operation modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operation mode of the water heater.
///
/// Only the two modes every smart-home frontend understands are exposed;
/// cruise and half-pipe recirculation are separate boolean controls.
///
/// # Examples
///
/// ```
/// use ailink_lib::types::OperationMode;
///
/// assert_eq!(OperationMode::from_power_status(Some("1")), OperationMode::Heat);
/// assert_eq!(OperationMode::from_power_status(Some("0")), OperationMode::Off);
/// assert_eq!(OperationMode::from_power_status(None), OperationMode::Off);
/// assert_eq!("heat".parse::<OperationMode>().unwrap(), OperationMode::Heat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    /// Heater is powered off.
    Off,
    /// Heater is powered and heating on demand.
    Heat,
}

impl OperationMode {
    /// All modes in display order.
    pub const ALL: [Self; 2] = [Self::Off, Self::Heat];

    /// Returns the internal mode key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
        }
    }

    /// Derives the mode from the vendor `powerStatus` field.
    #[must_use]
    pub fn from_power_status(power_status: Option<&str>) -> Self {
        if power_status == Some("1") {
            Self::Heat
        } else {
            Self::Off
        }
    }

    /// Returns the `powerStatus` value that selects this mode.
    #[must_use]
    pub const fn power_status(&self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::Heat => "1",
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            _ => Err(ValueError::UnknownOperationMode(s.to_string())),
        }
    }
}
