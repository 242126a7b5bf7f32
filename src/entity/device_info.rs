// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

use crate::state::DeviceSnapshot;

/// Manufacturer shown for every device.
pub const BRAND: &str = "Ai-Link A.O. Smith";

/// Device name used when the record has no product name.
pub const DEFAULT_DEVICE_NAME: &str = "A.O. Smith Device";

/// Registry information shared by all entities of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Vendor device id.
    pub identifier: String,
    /// Product name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: &'static str,
    /// Model.
    pub model: String,
    /// Firmware version, if the status profile lists one.
    pub sw_version: Option<String>,
}

impl DeviceInfo {
    /// Derives device info from a snapshot.
    #[must_use]
    pub fn from_snapshot(device_id: &str, snapshot: &DeviceSnapshot) -> Self {
        Self {
            identifier: device_id.to_string(),
            name: snapshot
                .product_name()
                .unwrap_or(DEFAULT_DEVICE_NAME)
                .to_string(),
            manufacturer: BRAND,
            model: snapshot.model(),
            sw_version: snapshot.firmware_version(),
        }
    }
}
