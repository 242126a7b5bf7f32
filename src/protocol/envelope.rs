// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response envelope and device list shapes.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// A device record as returned by the device list or status endpoint.
///
/// Kept as a JSON object: the vendor adds fields freely and every field is
/// surfaced to diagnostics.
pub type DeviceRecord = Map<String, Value>;

/// Application status that signals success.
pub const SUCCESS_STATUS: i64 = 200;

/// The vendor response envelope `{status, msg, info}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiResponse {
    /// Application status; `200` is success.
    pub status: i64,
    /// Vendor message, usually set on failure.
    #[serde(default)]
    pub msg: Option<String>,
    /// Payload.
    #[serde(default)]
    pub info: Value,
}

impl ApiResponse {
    /// Returns `true` if the envelope reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Converts a non-success envelope into an error.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Api` with the vendor message.
    pub fn into_result(self) -> Result<Self, ProtocolError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProtocolError::Api {
                status: self.status,
                message: self.msg.unwrap_or_default(),
            })
        }
    }
}

/// Device list key of the flat layout.
const FLAT_DEVICES_KEY: &str = "devInfoItemInfoList";
/// Room list key of the nested layout.
const ROOMS_KEY: &str = "roomInfoItemInfoList";
/// Device list key inside a room.
const ROOM_DEVICES_KEY: &str = "deviceList";

/// Extracts device records from a device list `info` object.
///
/// The flat list wins whenever it is non-empty; rooms are only consulted when
/// it is missing or empty. Entries that are not objects are skipped.
#[must_use]
pub fn devices_from_info(info: &Value) -> Vec<DeviceRecord> {
    let flat = objects(info.get(FLAT_DEVICES_KEY));
    if !flat.is_empty() {
        return flat;
    }

    info.get(ROOMS_KEY)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .flat_map(|room| objects(room.get(ROOM_DEVICES_KEY)))
        .collect()
}

fn objects(list: Option<&Value>) -> Vec<DeviceRecord> {
    list.and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(devices: &[DeviceRecord]) -> Vec<&str> {
        devices
            .iter()
            .filter_map(|d| d.get("deviceId").and_then(Value::as_str))
            .collect()
    }

    #[test]
    fn flat_list_wins_over_rooms() {
        let info = json!({
            "devInfoItemInfoList": [{"deviceId": "a"}],
            "roomInfoItemInfoList": [{"deviceList": [{"deviceId": "b"}]}]
        });
        assert_eq!(ids(&devices_from_info(&info)), ["a"]);
    }

    #[test]
    fn empty_flat_list_falls_back_to_rooms() {
        let info = json!({
            "devInfoItemInfoList": [],
            "roomInfoItemInfoList": [
                {"deviceList": [{"deviceId": "b"}]},
                {"roomName": "empty"},
                {"deviceList": [{"deviceId": "c"}, "junk"]}
            ]
        });
        assert_eq!(ids(&devices_from_info(&info)), ["b", "c"]);
    }

    #[test]
    fn missing_lists_yield_nothing() {
        assert!(devices_from_info(&json!({})).is_empty());
        assert!(devices_from_info(&Value::Null).is_empty());
    }

    #[test]
    fn envelope_status() {
        let ok: ApiResponse =
            serde_json::from_value(json!({"status": 200, "msg": "ok", "info": {}})).unwrap();
        assert!(ok.into_result().is_ok());

        let err: ApiResponse =
            serde_json::from_value(json!({"status": 401, "msg": "token invalid"})).unwrap();
        assert!(matches!(
            err.into_result(),
            Err(ProtocolError::Api { status: 401, ref message }) if message == "token invalid"
        ));
    }
}
