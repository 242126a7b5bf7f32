// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for water heater state and control.
//!
//! Control values are validated at construction time so that an entity write
//! path can reject a request before it touches the device snapshot.
//!
//! # Types
//!
//! - [`Temperature`] - Target water temperature (35-70 °C, whole degrees)
//! - [`CruiseTimer`] - Zero-cold-water recirculation duration (1-30 minutes)
//! - [`OperationMode`] - Off/Heat operation of the heater
//! - [`FieldValue`] - A telemetry value after numeric coercion
//! - [`Platform`] - Entity platform kinds
//! - [`SwitchKind`] - Cruise and half-pipe recirculation switches

mod cruise_timer;
mod field_value;
mod operation_mode;
mod platform;
mod switch_kind;
mod temperature;

pub use cruise_timer::CruiseTimer;
pub use field_value::FieldValue;
pub use operation_mode::OperationMode;
pub use platform::Platform;
pub use switch_kind::SwitchKind;
pub use temperature::Temperature;
