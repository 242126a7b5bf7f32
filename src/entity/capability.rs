// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability strategies: how each entity kind reads a snapshot.
//!
//! Reads are pure functions of a snapshot and the field mapping. Optimistic
//! overlay values take precedence over vendor telemetry.

use serde_json::Value;

use crate::mapping::FieldMapping;
use crate::state::DeviceSnapshot;
use crate::types::{CruiseTimer, FieldValue, OperationMode, Platform, SwitchKind};

use super::state::{EntityState, WaterHeaterState};

/// Telemetry key of the measured water temperature.
pub const WATER_TEMP_KEY: &str = "waterTemp";
/// Telemetry key of the reported target temperature.
pub const SET_TEMP_KEY: &str = "setTemp";
/// Telemetry key of the power state.
pub const POWER_STATUS_KEY: &str = "powerStatus";
/// Telemetry keys of the cruise timer, in priority order.
pub const CRUISE_TIMER_KEYS: [&str; 3] = ["WaterCruiseTimer", "waterCruiseTimer", "cruiseTimer"];
/// Mapping document key of the cruise timer controls.
pub const CRUISE_TIMER_MAPPING_KEY: &str = "cruise_timer";

/// How a boolean feature is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchStyle {
    /// On/off switch.
    Switch,
    /// Open/closed valve.
    Valve,
}

/// How the cruise timer is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerStyle {
    /// Numeric control in minutes.
    Number,
    /// Option list of minute values.
    Select,
    /// Fan whose percentage is the minute value and which is on while
    /// cruise is active.
    Fan,
}

/// What an entity projects from its device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Target temperature control plus off/heat mode.
    WaterHeater,
    /// A recirculation feature as a boolean.
    Switch {
        /// Which feature.
        kind: SwitchKind,
        /// Switch or valve.
        style: SwitchStyle,
    },
    /// Cruise recirculation duration as a numeric range.
    CruiseTimer(TimerStyle),
    /// A telemetry field with a mapping entry.
    MappedSensor(String),
    /// A telemetry field without a mapping entry, passed through.
    RawSensor(String),
}

impl Capability {
    /// Returns the entity platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        match self {
            Self::WaterHeater => Platform::WaterHeater,
            Self::Switch {
                style: SwitchStyle::Switch,
                ..
            } => Platform::Switch,
            Self::Switch {
                style: SwitchStyle::Valve,
                ..
            } => Platform::Valve,
            Self::CruiseTimer(TimerStyle::Number) => Platform::Number,
            Self::CruiseTimer(TimerStyle::Select) => Platform::Select,
            Self::CruiseTimer(TimerStyle::Fan) => Platform::Fan,
            Self::MappedSensor(_) | Self::RawSensor(_) => Platform::Sensor,
        }
    }

    /// Returns the unique id of this capability on a device.
    #[must_use]
    pub fn unique_id(&self, device_id: &str) -> String {
        match self {
            Self::WaterHeater => format!("ailink_aosmith_water_heater_{device_id}"),
            Self::Switch {
                kind,
                style: SwitchStyle::Switch,
            } => format!("{device_id}_{kind}"),
            Self::Switch {
                kind,
                style: SwitchStyle::Valve,
            } => format!("{device_id}_{kind}_valve"),
            Self::CruiseTimer(TimerStyle::Number) => format!("{device_id}_cruise_timer"),
            Self::CruiseTimer(TimerStyle::Select) => format!("{device_id}_cruise_timer_select"),
            Self::CruiseTimer(TimerStyle::Fan) => format!("{device_id}_cruise_timer_fan"),
            Self::MappedSensor(key) | Self::RawSensor(key) => {
                format!("ailink_aosmith_{key}_{device_id}")
            }
        }
    }

    /// Derives the entity state from a snapshot.
    #[must_use]
    pub fn read(&self, snapshot: &DeviceSnapshot, mapping: &FieldMapping) -> EntityState {
        match self {
            Self::WaterHeater => EntityState::WaterHeater(WaterHeaterState {
                current_temperature: current_temperature(snapshot),
                target_temperature: target_temperature(snapshot),
                operation_mode: operation_mode(snapshot),
                status: composite_status(snapshot, mapping),
            }),
            Self::Switch {
                kind,
                style: SwitchStyle::Switch,
            } => EntityState::Switch(switch_state(snapshot, *kind)),
            Self::Switch {
                kind,
                style: SwitchStyle::Valve,
            } => EntityState::Valve(switch_state(snapshot, *kind)),
            Self::CruiseTimer(TimerStyle::Number) => EntityState::Number(cruise_timer(snapshot)),
            Self::CruiseTimer(TimerStyle::Select) => {
                EntityState::Select(cruise_timer_option(snapshot))
            }
            Self::CruiseTimer(TimerStyle::Fan) => EntityState::Fan {
                is_on: switch_state(snapshot, SwitchKind::Cruise),
                percentage: cruise_timer(snapshot).map(percentage),
            },
            Self::MappedSensor(key) => EntityState::Sensor(mapped_value(snapshot, key, mapping)),
            Self::RawSensor(key) => EntityState::Sensor(snapshot.field(key)),
        }
    }
}

/// Measured water temperature; `None` without a reading.
#[must_use]
pub fn current_temperature(snapshot: &DeviceSnapshot) -> Option<f64> {
    snapshot
        .field(WATER_TEMP_KEY)
        .as_ref()
        .and_then(FieldValue::as_f64)
}

/// Target temperature: overlay, then reported target, then measured.
#[must_use]
pub fn target_temperature(snapshot: &DeviceSnapshot) -> Option<f64> {
    if let Some(t) = snapshot.overlay().target_temperature() {
        return Some(t.celsius());
    }
    snapshot
        .field(SET_TEMP_KEY)
        .as_ref()
        .and_then(FieldValue::as_f64)
        .or_else(|| current_temperature(snapshot))
}

/// Operation mode: overlay, then `powerStatus == "1"`.
#[must_use]
pub fn operation_mode(snapshot: &DeviceSnapshot) -> OperationMode {
    if let Some(mode) = snapshot.overlay().operation_mode() {
        return mode;
    }
    if snapshot
        .field(POWER_STATUS_KEY)
        .is_some_and(|v| v.is_truthy())
    {
        OperationMode::Heat
    } else {
        OperationMode::Off
    }
}

/// Switch state: overlay, then the first candidate key with a value.
#[must_use]
pub fn switch_state(snapshot: &DeviceSnapshot, kind: SwitchKind) -> Option<bool> {
    snapshot.overlay().switch(kind).or_else(|| {
        snapshot
            .first_field(kind.read_keys())
            .map(|v| v.is_truthy())
    })
}

/// Cruise timer minutes: overlay, then the first candidate key.
#[must_use]
pub fn cruise_timer(snapshot: &DeviceSnapshot) -> Option<f64> {
    if let Some(timer) = snapshot.overlay().cruise_timer() {
        return Some(f64::from(timer.minutes()));
    }
    snapshot
        .first_field(&CRUISE_TIMER_KEYS)
        .as_ref()
        .and_then(FieldValue::as_f64)
}

fn cruise_timer_option(snapshot: &DeviceSnapshot) -> Option<String> {
    if let Some(timer) = snapshot.overlay().cruise_timer() {
        return Some(timer.minutes().to_string());
    }
    snapshot
        .first_field(&CRUISE_TIMER_KEYS)
        .map(|v| v.to_string())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage(minutes: f64) -> u8 {
    minutes.round().clamp(0.0, 100.0) as u8
}

/// Mapped sensor value: the configured label if the entry enumerates the
/// raw value, else the coerced value.
///
/// The label lookup tries the vendor's string first (`"01"`), then the
/// coerced form (`"1"`).
#[must_use]
pub fn mapped_value(
    snapshot: &DeviceSnapshot,
    key: &str,
    mapping: &FieldMapping,
) -> Option<FieldValue> {
    let raw = snapshot.raw_field(key)?;
    let value = FieldValue::from_raw(&raw)?;
    let label = mapping.entry(Platform::Sensor, key).and_then(|entry| {
        let raw_text = match &raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        entry
            .label_for(&raw_text)
            .or_else(|| entry.label_for(&value.to_string()))
    });
    Some(match label {
        Some(label) => FieldValue::Text(label.to_string()),
        None => value,
    })
}

/// Mode label plus active recirculation features, e.g. `"heat (cruise)"`.
///
/// The label comes from the mapping's operation modes when configured.
#[must_use]
pub fn composite_status(snapshot: &DeviceSnapshot, mapping: &FieldMapping) -> String {
    let mode = operation_mode(snapshot);
    let label = mapping
        .mode_label(mode.power_status())
        .unwrap_or(mode.as_str());
    let active: Vec<&str> = SwitchKind::ALL
        .into_iter()
        .filter(|kind| switch_state(snapshot, *kind) == Some(true))
        .map(SwitchKind::as_str)
        .collect();
    if active.is_empty() {
        label.to_string()
    } else {
        format!("{label} ({})", active.join(", "))
    }
}

/// Clamps a fan percentage into the cruise timer range.
#[must_use]
pub fn timer_from_percentage(percentage: u8) -> CruiseTimer {
    let minutes = percentage.clamp(CruiseTimer::MIN.minutes(), CruiseTimer::MAX.minutes());
    // In range by construction.
    CruiseTimer::new(minutes).unwrap_or(CruiseTimer::MIN)
}
