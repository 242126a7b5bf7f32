// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device profile embedded in `statusInfo`.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::parse_status_info;

/// Firmware type the vendor uses for the main controller board.
const MAIN_FIRMWARE_TYPE: &str = "3";

/// The `profile` section of a `statusInfo` document.
///
/// Carries model and firmware details that the device list sometimes omits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    #[serde(default)]
    device_type: Option<String>,
    #[serde(default)]
    device_model: Option<String>,
    #[serde(default)]
    device_firmware: Vec<Firmware>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Firmware {
    #[serde(rename = "type", default, deserialize_with = "string_or_number")]
    kind: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl DeviceProfile {
    /// Reads the profile from a device record, if the status document has one.
    #[must_use]
    pub fn from_record(record: &Map<String, Value>) -> Option<Self> {
        let doc = parse_status_info(record)?;
        let profile = doc.get("profile")?.clone();
        match serde_json::from_value(profile) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed device profile");
                None
            }
        }
    }

    /// Returns the model, preferring `deviceType` over `deviceModel`.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.device_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.device_model.as_deref().filter(|s| !s.is_empty()))
    }

    /// Returns the main board firmware version, else the first listed one.
    #[must_use]
    pub fn firmware_version(&self) -> Option<&str> {
        self.device_firmware
            .iter()
            .find(|fw| fw.kind.as_deref() == Some(MAIN_FIRMWARE_TYPE))
            .or_else(|| self.device_firmware.first())
            .and_then(|fw| fw.version.as_deref())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
