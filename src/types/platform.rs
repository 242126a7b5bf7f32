// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity platform a projection is exposed on.
///
/// The serialized names match the section names of the field mapping
/// document (`entity.sensor`, `entity.switch`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Water heater with target temperature and operation mode.
    WaterHeater,
    /// Read-only sensor.
    Sensor,
    /// On/off switch.
    Switch,
    /// Open/closed valve.
    Valve,
    /// Numeric control.
    Number,
    /// Option list.
    Select,
    /// Fan with a percentage.
    Fan,
}

impl Platform {
    /// All platforms.
    pub const ALL: [Self; 7] = [
        Self::WaterHeater,
        Self::Sensor,
        Self::Switch,
        Self::Valve,
        Self::Number,
        Self::Select,
        Self::Fan,
    ];

    /// Returns the platform name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaterHeater => "water_heater",
            Self::Sensor => "sensor",
            Self::Switch => "switch",
            Self::Valve => "valve",
            Self::Number => "number",
            Self::Select => "select",
            Self::Fan => "fan",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
