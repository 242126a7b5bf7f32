// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity states and requests.

use serde::Serialize;

use crate::types::{FieldValue, OperationMode};

/// Water heater view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterHeaterState {
    /// Measured water temperature, `None` without a reading.
    pub current_temperature: Option<f64>,
    /// Target temperature, optimistic value first.
    pub target_temperature: Option<f64>,
    /// Off or heat.
    pub operation_mode: OperationMode,
    /// Human readable status folding in the recirculation features,
    /// e.g. `"heat (cruise, half_pipe)"`.
    pub status: String,
}

/// The state an entity renders.
///
/// A device that disappeared from the device list is
/// [`Unavailable`](Self::Unavailable); a device without telemetry renders
/// its variant with unknown (`None`) values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityState {
    /// The device is not in the latest device list.
    Unavailable,
    /// Water heater.
    WaterHeater(WaterHeaterState),
    /// Switch: on/off.
    Switch(Option<bool>),
    /// Valve: open/closed.
    Valve(Option<bool>),
    /// Numeric control value.
    Number(Option<f64>),
    /// Selected option.
    Select(Option<String>),
    /// Fan on/off and speed percentage.
    Fan {
        /// Whether the fan is on.
        is_on: Option<bool>,
        /// Speed percentage.
        percentage: Option<u8>,
    },
    /// Sensor value after coercion or label lookup.
    Sensor(Option<FieldValue>),
}

impl EntityState {
    /// Returns `true` unless the device is unavailable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// A write request to an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityCommand {
    /// Water heater target temperature in °C.
    SetTemperature(f64),
    /// Water heater operation mode, by name or configured label.
    SetOperationMode(String),
    /// Switch on or valve open.
    TurnOn,
    /// Switch off or valve close.
    TurnOff,
    /// Numeric control value.
    SetValue(f64),
    /// Select option.
    SelectOption(String),
    /// Fan speed percentage.
    SetPercentage(u8),
}

impl EntityCommand {
    /// Operation name used in `Unsupported` errors.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SetTemperature(_) => "set_temperature",
            Self::SetOperationMode(_) => "set_operation_mode",
            Self::TurnOn => "turn_on",
            Self::TurnOff => "turn_off",
            Self::SetValue(_) => "set_value",
            Self::SelectOption(_) => "select_option",
            Self::SetPercentage(_) => "set_percentage",
        }
    }
}
