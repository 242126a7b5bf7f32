// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Aggregate store of device snapshots.

use std::collections::BTreeMap;

use super::DeviceSnapshot;

/// Map of device id to snapshot.
///
/// Built in full by each refresh and swapped in as a whole; it is never
/// patched device by device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStore {
    devices: BTreeMap<String, DeviceSnapshot>,
}

impl AggregateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a snapshot.
    pub fn insert(&mut self, device_id: impl Into<String>, snapshot: DeviceSnapshot) {
        self.devices.insert(device_id.into(), snapshot);
    }

    /// Returns a device's snapshot.
    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<&DeviceSnapshot> {
        self.devices.get(device_id)
    }

    /// Returns a device's snapshot for an optimistic write.
    pub fn get_mut(&mut self, device_id: &str) -> Option<&mut DeviceSnapshot> {
        self.devices.get_mut(device_id)
    }

    /// Returns `true` if the device is present.
    #[must_use]
    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    /// Iterates device ids in sorted order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Iterates snapshots in device id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DeviceSnapshot)> {
        self.devices.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// Number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if there are no devices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Ids present here but not in `previous`, and ids present in
    /// `previous` but not here.
    #[must_use]
    pub fn diff(&self, previous: &Self) -> (Vec<String>, Vec<String>) {
        let added = self
            .device_ids()
            .filter(|id| !previous.contains(id))
            .map(str::to_string)
            .collect();
        let removed = previous
            .device_ids()
            .filter(|id| !self.contains(id))
            .map(str::to_string)
            .collect();
        (added, removed)
    }
}

impl FromIterator<(String, DeviceSnapshot)> for AggregateStore {
    fn from_iter<I: IntoIterator<Item = (String, DeviceSnapshot)>>(iter: I) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}
