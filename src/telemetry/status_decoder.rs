// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `statusInfo` extraction.

use serde_json::{Map, Value};

use super::OutputData;

/// Key of the telemetry document in a merged device record.
pub const STATUS_INFO_KEY: &str = "statusInfo";
/// Wrapper object some status responses nest `statusInfo` under.
pub const APP_STATUS_ENTITY_KEY: &str = "appDeviceStatusInfoEntity";
/// Event identifier carrying the telemetry map.
const POST_EVENT: &str = "post";

/// Returns the raw `statusInfo` value of a device record.
///
/// Looks at the top-level key first, then inside
/// `appDeviceStatusInfoEntity`. Null, empty strings and empty objects count
/// as absent.
#[must_use]
pub fn raw_status_info(record: &Map<String, Value>) -> Option<&Value> {
    record
        .get(STATUS_INFO_KEY)
        .filter(|v| is_present(v))
        .or_else(|| {
            record
                .get(APP_STATUS_ENTITY_KEY)
                .and_then(Value::as_object)
                .and_then(|entity| entity.get(STATUS_INFO_KEY))
                .filter(|v| is_present(v))
        })
}

/// Parses the `statusInfo` document of a device record into a JSON object.
///
/// Accepts both the string-encoded form and an already-decoded object.
/// Returns `None` when the value is absent, not valid JSON, or not an object.
#[must_use]
pub fn parse_status_info(record: &Map<String, Value>) -> Option<Map<String, Value>> {
    match raw_status_info(record)? {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(doc)) => Some(doc),
            Ok(_) => None,
            Err(e) => {
                tracing::trace!(error = %e, "statusInfo is not valid JSON");
                None
            }
        },
        Value::Object(doc) => Some(doc.clone()),
        _ => None,
    }
}

/// Extracts the `outputData` telemetry map from a device record.
///
/// 1. `statusInfo` (or `appDeviceStatusInfoEntity.statusInfo`) is decoded.
/// 2. If it has an `events` list, the first event with identifier `post`
///    supplies `outputData`.
/// 3. Without an `events` list, a top-level `outputData` is used.
///
/// Never fails and never returns a partially filled map.
#[must_use]
pub fn extract_output_data(record: &Map<String, Value>) -> OutputData {
    let Some(doc) = parse_status_info(record) else {
        return OutputData::new();
    };

    let output = match doc.get("events").and_then(Value::as_array) {
        Some(events) => events
            .iter()
            .find(|event| {
                event.get("identifier").and_then(Value::as_str) == Some(POST_EVENT)
            })
            .and_then(|event| event.get("outputData")),
        None => doc.get("outputData"),
    };

    output
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}
