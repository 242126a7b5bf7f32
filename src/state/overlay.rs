// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Optimistic overlay fields.
//!
//! An entity that issues a command writes the intended value into the
//! device's overlay before the command round-trip completes, so reads in the
//! meantime show the new value. The overlay lives beside the vendor record,
//! never inside it, so an overlay field can never shadow or be shadowed by a
//! vendor `outputData` key. A failed command clears the field again; a
//! successful one is superseded by the next refresh, which builds fresh
//! snapshots with an empty overlay.
//!
//! # Examples
//!
//! ```
//! use ailink_lib::state::{Overlay, OverlayField, OverlayWrite};
//! use ailink_lib::types::Temperature;
//!
//! let mut overlay = Overlay::new();
//! let write = OverlayWrite::TargetTemperature(Temperature::new(50.0).unwrap());
//! assert!(overlay.apply(&write));
//! assert_eq!(overlay.target_temperature().map(|t| t.celsius()), Some(50.0));
//!
//! overlay.clear(write.field());
//! assert!(overlay.is_empty());
//! ```

use crate::types::{CruiseTimer, OperationMode, SwitchKind, Temperature};

/// Identifies one overlay field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayField {
    /// Target water temperature.
    TargetTemperature,
    /// Heater operation mode.
    OperationMode,
    /// Cruise recirculation duration.
    CruiseTimer,
    /// A recirculation switch.
    Switch(SwitchKind),
}

/// An optimistic write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayWrite {
    /// Target water temperature.
    TargetTemperature(Temperature),
    /// Heater operation mode.
    OperationMode(OperationMode),
    /// Cruise recirculation duration.
    CruiseTimer(CruiseTimer),
    /// A recirculation switch.
    Switch(SwitchKind, bool),
}

impl OverlayWrite {
    /// Returns the field this write targets.
    #[must_use]
    pub fn field(&self) -> OverlayField {
        match self {
            Self::TargetTemperature(_) => OverlayField::TargetTemperature,
            Self::OperationMode(_) => OverlayField::OperationMode,
            Self::CruiseTimer(_) => OverlayField::CruiseTimer,
            Self::Switch(kind, _) => OverlayField::Switch(*kind),
        }
    }
}

/// Locally written values awaiting confirmation by the next refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    target_temperature: Option<Temperature>,
    operation_mode: Option<OperationMode>,
    cruise_timer: Option<CruiseTimer>,
    cruise: Option<bool>,
    half_pipe: Option<bool>,
}

impl Overlay {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a write. Returns `true` if the overlay changed.
    pub fn apply(&mut self, write: &OverlayWrite) -> bool {
        match *write {
            OverlayWrite::TargetTemperature(t) => replace(&mut self.target_temperature, t),
            OverlayWrite::OperationMode(m) => replace(&mut self.operation_mode, m),
            OverlayWrite::CruiseTimer(t) => replace(&mut self.cruise_timer, t),
            OverlayWrite::Switch(kind, on) => replace(self.switch_slot(kind), on),
        }
    }

    /// Removes a field. Returns `true` if it was set.
    pub fn clear(&mut self, field: OverlayField) -> bool {
        match field {
            OverlayField::TargetTemperature => self.target_temperature.take().is_some(),
            OverlayField::OperationMode => self.operation_mode.take().is_some(),
            OverlayField::CruiseTimer => self.cruise_timer.take().is_some(),
            OverlayField::Switch(kind) => self.switch_slot(kind).take().is_some(),
        }
    }

    /// Removes the field `write` targets, but only while it still holds the
    /// value `write` put there. Returns `true` if the field was removed.
    pub fn retract(&mut self, write: &OverlayWrite) -> bool {
        self.holds(write) && self.clear(write.field())
    }

    /// Returns `true` if the overlay currently holds `write`'s value.
    #[must_use]
    pub fn holds(&self, write: &OverlayWrite) -> bool {
        match *write {
            OverlayWrite::TargetTemperature(t) => self.target_temperature == Some(t),
            OverlayWrite::OperationMode(m) => self.operation_mode == Some(m),
            OverlayWrite::CruiseTimer(t) => self.cruise_timer == Some(t),
            OverlayWrite::Switch(kind, on) => self.switch(kind) == Some(on),
        }
    }

    /// Optimistic target temperature.
    #[must_use]
    pub fn target_temperature(&self) -> Option<Temperature> {
        self.target_temperature
    }

    /// Optimistic operation mode.
    #[must_use]
    pub fn operation_mode(&self) -> Option<OperationMode> {
        self.operation_mode
    }

    /// Optimistic cruise timer.
    #[must_use]
    pub fn cruise_timer(&self) -> Option<CruiseTimer> {
        self.cruise_timer
    }

    /// Optimistic switch state.
    #[must_use]
    pub fn switch(&self, kind: SwitchKind) -> Option<bool> {
        match kind {
            SwitchKind::Cruise => self.cruise,
            SwitchKind::HalfPipe => self.half_pipe,
        }
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn switch_slot(&mut self, kind: SwitchKind) -> &mut Option<bool> {
        match kind {
            SwitchKind::Cruise => &mut self.cruise,
            SwitchKind::HalfPipe => &mut self.half_pipe,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        false
    } else {
        *slot = Some(value);
        true
    }
}
