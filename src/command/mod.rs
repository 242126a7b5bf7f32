// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor control commands.
//!
//! A vendor command is a *service identifier* plus an `inputData` object,
//! wrapped by the client into the invoke envelope.
//!
//! | Command | Service | inputData |
//! |---------|---------|-----------|
//! | [`HeaterCommand::SetCruise`] | `WaterCruiseOnOff` | `{"cruiseStatus": "1"}` |
//! | [`HeaterCommand::SetHalfPipe`] | `setHalfPipeCircle` | `{"setHalfPipeCircle": "1"}` |
//! | [`HeaterCommand::SetCruiseTimer`] | `WaterCruiseTimer` | `{"WaterCruiseTimer": "10"}` |
//! | [`HeaterCommand::SetTemperature`] | `setTemp` | `{"setTemp": "50"}` |
//! | [`HeaterCommand::SetOperationMode`] | `powerOnOff` | `{"powerStatus": "1"}` |
//!
//! # Examples
//!
//! ```
//! use ailink_lib::command::{Command, HeaterCommand};
//! use serde_json::json;
//!
//! let cmd = HeaterCommand::SetCruise(true);
//! assert_eq!(cmd.service_identifier(), "WaterCruiseOnOff");
//! assert_eq!(cmd.input_data(), json!({"cruiseStatus": "1"}).as_object().cloned().unwrap());
//! ```

use serde_json::{Map, Value};

use crate::types::{CruiseTimer, OperationMode, Temperature};

/// A command that can be invoked on a device.
pub trait Command {
    /// Returns the vendor service identifier.
    fn service_identifier(&self) -> &'static str;

    /// Returns the `inputData` object.
    fn input_data(&self) -> Map<String, Value>;
}

/// Commands understood by Ai-Link water heaters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaterCommand {
    /// Turn zero-cold-water cruise on or off.
    SetCruise(bool),
    /// Turn half-pipe recirculation on or off.
    SetHalfPipe(bool),
    /// Set the cruise recirculation duration.
    SetCruiseTimer(CruiseTimer),
    /// Set the target water temperature.
    SetTemperature(Temperature),
    /// Power the heater on (heat) or off.
    SetOperationMode(OperationMode),
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

impl Command for HeaterCommand {
    fn service_identifier(&self) -> &'static str {
        match self {
            Self::SetCruise(_) => "WaterCruiseOnOff",
            Self::SetHalfPipe(_) => "setHalfPipeCircle",
            Self::SetCruiseTimer(_) => "WaterCruiseTimer",
            Self::SetTemperature(_) => "setTemp",
            Self::SetOperationMode(_) => "powerOnOff",
        }
    }

    fn input_data(&self) -> Map<String, Value> {
        let (key, value) = match self {
            Self::SetCruise(on) => ("cruiseStatus", flag(*on).to_string()),
            Self::SetHalfPipe(on) => ("setHalfPipeCircle", flag(*on).to_string()),
            Self::SetCruiseTimer(timer) => ("WaterCruiseTimer", timer.command_value()),
            Self::SetTemperature(t) => ("setTemp", t.command_value()),
            Self::SetOperationMode(mode) => ("powerStatus", mode.power_status().to_string()),
        };
        let mut data = Map::new();
        data.insert(key.to_string(), Value::String(value));
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(cmd: HeaterCommand) -> Value {
        Value::Object(cmd.input_data())
    }

    #[test]
    fn cruise_and_half_pipe() {
        assert_eq!(data(HeaterCommand::SetCruise(false)), json!({"cruiseStatus": "0"}));
        assert_eq!(
            data(HeaterCommand::SetHalfPipe(true)),
            json!({"setHalfPipeCircle": "1"})
        );
        assert_eq!(
            HeaterCommand::SetHalfPipe(true).service_identifier(),
            "setHalfPipeCircle"
        );
    }

    #[test]
    fn cruise_timer() {
        let cmd = HeaterCommand::SetCruiseTimer(CruiseTimer::new(12).unwrap());
        assert_eq!(cmd.service_identifier(), "WaterCruiseTimer");
        assert_eq!(data(cmd), json!({"WaterCruiseTimer": "12"}));
    }

    #[test]
    fn temperature_and_mode() {
        let cmd = HeaterCommand::SetTemperature(Temperature::new(50.0).unwrap());
        assert_eq!(data(cmd), json!({"setTemp": "50"}));
        let cmd = HeaterCommand::SetOperationMode(OperationMode::Heat);
        assert_eq!(data(cmd), json!({"powerStatus": "1"}));
    }
}
