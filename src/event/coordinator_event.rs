// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator event types.

use crate::state::OverlayField;

/// Events emitted by the coordinator and its entities.
///
/// Hosts re-render entities on [`Refreshed`](Self::Refreshed) and
/// [`StateWritten`](Self::StateWritten); the latter is emitted both when an
/// optimistic value is written and when it is rolled back.
///
/// # Examples
///
/// ```
/// use ailink_lib::event::CoordinatorEvent;
///
/// let added = CoordinatorEvent::device_added("dev-1");
/// assert_eq!(added.device_id(), Some("dev-1"));
/// assert!(added.is_lifecycle());
///
/// let refreshed = CoordinatorEvent::Refreshed { device_count: 3 };
/// assert_eq!(refreshed.device_id(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    /// A refresh completed and the store was replaced.
    Refreshed {
        /// Number of devices in the new store.
        device_count: usize,
    },

    /// A refresh failed; the previous store is kept.
    RefreshFailed {
        /// Error description.
        error: String,
    },

    /// A device appeared in the device list.
    DeviceAdded {
        /// Vendor device id.
        device_id: String,
    },

    /// A device disappeared from the device list.
    DeviceRemoved {
        /// Vendor device id.
        device_id: String,
    },

    /// A telemetry field without a mapping entry was seen for the first time.
    FieldDiscovered {
        /// Vendor device id.
        device_id: String,
        /// Vendor field key.
        key: String,
    },

    /// An optimistic overlay field was written or rolled back.
    StateWritten {
        /// Vendor device id.
        device_id: String,
        /// The field that changed.
        field: OverlayField,
        /// `true` if the write was reverted after a failed command.
        rolled_back: bool,
    },
}

impl CoordinatorEvent {
    /// Returns the device id for device-scoped events.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::DeviceAdded { device_id }
            | Self::DeviceRemoved { device_id }
            | Self::FieldDiscovered { device_id, .. }
            | Self::StateWritten { device_id, .. } => Some(device_id),
            Self::Refreshed { .. } | Self::RefreshFailed { .. } => None,
        }
    }

    /// Returns `true` if this is a device lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: impl Into<String>) -> Self {
        Self::DeviceAdded {
            device_id: device_id.into(),
        }
    }

    /// Creates a device removed event.
    #[must_use]
    pub fn device_removed(device_id: impl Into<String>) -> Self {
        Self::DeviceRemoved {
            device_id: device_id.into(),
        }
    }

    /// Creates a state written event.
    #[must_use]
    pub fn state_written(device_id: impl Into<String>, field: OverlayField) -> Self {
        Self::StateWritten {
            device_id: device_id.into(),
            field,
            rolled_back: false,
        }
    }

    /// Creates a rollback event.
    #[must_use]
    pub fn rolled_back(device_id: impl Into<String>, field: OverlayField) -> Self {
        Self::StateWritten {
            device_id: device_id.into(),
            field,
            rolled_back: true,
        }
    }
}
