// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of unmapped telemetry fields.

use std::collections::BTreeSet;

use crate::mapping::FieldMapping;
use crate::state::DeviceSnapshot;
use crate::types::Platform;

/// An unmapped telemetry field of one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DynamicField {
    /// Vendor device id.
    pub device_id: String,
    /// Vendor field key.
    pub key: String,
}

/// Stable set of dynamic fields, grown as refreshes reveal new keys.
///
/// A field stays registered when a later refresh omits it, so entity
/// identity does not flicker with sparse telemetry.
#[derive(Debug, Clone, Default)]
pub(crate) struct DynamicFieldRegistry {
    fields: BTreeSet<DynamicField>,
}

impl DynamicFieldRegistry {
    /// Registers every unmapped key of `snapshot`; returns the new ones.
    pub(crate) fn discover(
        &mut self,
        device_id: &str,
        snapshot: &DeviceSnapshot,
        mapping: &FieldMapping,
    ) -> Vec<DynamicField> {
        snapshot
            .output_data()
            .keys()
            .filter(|key| !mapping.contains(Platform::Sensor, key))
            .filter_map(|key| {
                let field = DynamicField {
                    device_id: device_id.to_string(),
                    key: key.clone(),
                };
                self.fields.insert(field.clone()).then_some(field)
            })
            .collect()
    }

    /// Drops fields that `mapping` now maps; returns how many were dropped.
    pub(crate) fn retain_unmapped(&mut self, mapping: &FieldMapping) -> usize {
        let before = self.fields.len();
        self.fields
            .retain(|field| !mapping.contains(Platform::Sensor, &field.key));
        before - self.fields.len()
    }

    /// All fields in `(device_id, key)` order.
    pub(crate) fn all(&self) -> Vec<DynamicField> {
        self.fields.iter().cloned().collect()
    }

    /// Keys registered for one device, sorted.
    pub(crate) fn keys_for(&self, device_id: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.device_id == device_id)
            .map(|f| f.key.clone())
            .collect()
    }
}
