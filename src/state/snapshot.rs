// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device snapshot.

use serde_json::Value;

use crate::protocol::DeviceRecord;
use crate::telemetry::{self, DeviceProfile, OutputData};
use crate::types::FieldValue;

use super::{Overlay, OverlayField, OverlayWrite};

/// Model reported when no source names one.
pub const UNKNOWN_MODEL: &str = "Unknown Model";

/// Product name fragment identifying gas water heaters ("gas water heater").
const GAS_HEATER_NAME: &str = "燃气热水器";

/// Returns the string form of a device record's `deviceId`.
///
/// The vendor sends ids as strings, but numeric ids are accepted too.
#[must_use]
pub fn record_id(record: &DeviceRecord) -> Option<String> {
    match record.get("deviceId")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Latest known identity and telemetry of one device.
///
/// The vendor record is kept verbatim; typed views are derived on demand.
/// Optimistic writes go to a separate [`Overlay`].
///
/// # Examples
///
/// ```
/// use ailink_lib::state::DeviceSnapshot;
/// use serde_json::json;
///
/// let device = json!({"deviceId": "d1", "productName": "Heater", "waterTemp": "old"});
/// let status = json!({
///     "statusInfo": r#"{"events":[{"identifier":"post","outputData":{"waterTemp":"45"}}]}"#
/// });
/// let snapshot = DeviceSnapshot::merge(
///     device.as_object().unwrap().clone(),
///     status.as_object().cloned(),
/// );
/// assert_eq!(snapshot.device_id().as_deref(), Some("d1"));
/// assert_eq!(snapshot.field("waterTemp").and_then(|v| v.as_f64()), Some(45.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    record: DeviceRecord,
    overlay: Overlay,
}

impl DeviceSnapshot {
    /// Wraps a vendor record.
    #[must_use]
    pub fn new(record: DeviceRecord) -> Self {
        Self {
            record,
            overlay: Overlay::new(),
        }
    }

    /// Merges a device list record with its status; status keys win.
    ///
    /// Without a status the snapshot holds the bare identity record.
    #[must_use]
    pub fn merge(device: DeviceRecord, status: Option<DeviceRecord>) -> Self {
        let mut record = device;
        if let Some(status) = status {
            record.extend(status);
        }
        Self::new(record)
    }

    /// Returns the vendor record.
    #[must_use]
    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> Option<String> {
        record_id(&self.record)
    }

    /// Returns the product name.
    #[must_use]
    pub fn product_name(&self) -> Option<&str> {
        self.str_field("productName")
    }

    /// Returns the product model from the device record.
    #[must_use]
    pub fn product_model(&self) -> Option<&str> {
        self.str_field("productModel")
    }

    /// Returns the device category as a string.
    #[must_use]
    pub fn category(&self) -> Option<String> {
        match self.record.get("deviceCategory")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns `true` if the record carries a status document.
    #[must_use]
    pub fn has_telemetry(&self) -> bool {
        telemetry::raw_status_info(&self.record).is_some()
    }

    /// Decodes the telemetry map. Re-derived on every call.
    #[must_use]
    pub fn output_data(&self) -> OutputData {
        telemetry::extract_output_data(&self.record)
    }

    /// Returns one telemetry field exactly as the vendor sent it.
    #[must_use]
    pub fn raw_field(&self, key: &str) -> Option<Value> {
        self.output_data().remove(key)
    }

    /// Returns one telemetry field after numeric coercion.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        self.output_data().get(key).and_then(FieldValue::from_raw)
    }

    /// Returns the first of `keys` that has a value.
    #[must_use]
    pub fn first_field(&self, keys: &[&str]) -> Option<FieldValue> {
        let output = self.output_data();
        keys.iter()
            .find_map(|key| output.get(*key).and_then(FieldValue::from_raw))
    }

    /// Returns the status document's profile.
    #[must_use]
    pub fn profile(&self) -> Option<DeviceProfile> {
        DeviceProfile::from_record(&self.record)
    }

    /// Resolves the model: record, then status profile, then product name.
    #[must_use]
    pub fn model(&self) -> String {
        if let Some(model) = self.product_model().filter(|m| *m != UNKNOWN_MODEL) {
            return model.to_string();
        }
        if let Some(model) = self.profile().as_ref().and_then(DeviceProfile::model) {
            return model.to_string();
        }
        if self
            .product_name()
            .is_some_and(|name| name.contains(GAS_HEATER_NAME))
        {
            return GAS_HEATER_NAME.to_string();
        }
        tracing::debug!(
            device_id = ?self.device_id(),
            keys = ?self.record.keys().collect::<Vec<_>>(),
            "Could not determine device model"
        );
        UNKNOWN_MODEL.to_string()
    }

    /// Returns the firmware version from the status profile.
    #[must_use]
    pub fn firmware_version(&self) -> Option<String> {
        self.profile()
            .as_ref()
            .and_then(DeviceProfile::firmware_version)
            .map(str::to_string)
    }

    /// Returns the optimistic overlay.
    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Applies an optimistic write. Returns `true` if the overlay changed.
    pub fn apply(&mut self, write: &OverlayWrite) -> bool {
        self.overlay.apply(write)
    }

    /// Removes an optimistic field. Returns `true` if it was set.
    pub fn clear(&mut self, field: OverlayField) -> bool {
        self.overlay.clear(field)
    }

    /// Removes `write`'s field if it still holds `write`'s value.
    pub fn retract(&mut self, write: &OverlayWrite) -> bool {
        self.overlay.retract(write)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.record
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Temperature;
    use serde_json::json;

    fn record(value: Value) -> DeviceRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn merge_prefers_status_keys() {
        let snapshot = DeviceSnapshot::merge(
            record(json!({"deviceId": "d1", "productName": "A", "online": "0"})),
            Some(record(json!({"online": "1"}))),
        );
        assert_eq!(snapshot.record()["online"], "1");
        assert_eq!(snapshot.product_name(), Some("A"));
    }

    #[test]
    fn merge_without_status_keeps_identity() {
        let snapshot = DeviceSnapshot::merge(record(json!({"deviceId": 42})), None);
        assert_eq!(snapshot.device_id().as_deref(), Some("42"));
        assert!(!snapshot.has_telemetry());
        assert!(snapshot.output_data().is_empty());
    }

    #[test]
    fn first_field_skips_missing_and_empty() {
        let snapshot = DeviceSnapshot::new(record(json!({
            "statusInfo": r#"{"events":[{"identifier":"post","outputData":{"halfPipeStatus":"","halfPipeCircle":"1"}}]}"#
        })));
        assert_eq!(
            snapshot.first_field(&["halfPipeStatus", "setHalfPipeCircle", "halfPipeCircle"]),
            Some(FieldValue::Int(1))
        );
    }

    #[test]
    fn model_resolution_order() {
        let from_record = DeviceSnapshot::new(record(json!({"productModel": "JSQ31"})));
        assert_eq!(from_record.model(), "JSQ31");

        let from_profile = DeviceSnapshot::new(record(json!({
            "statusInfo": r#"{"profile":{"deviceType":"JSQ31-VJS","deviceFirmware":[{"type":"1","version":"1.0"},{"type":"3","version":"3.2"}]}}"#
        })));
        assert_eq!(from_profile.model(), "JSQ31-VJS");
        assert_eq!(from_profile.firmware_version().as_deref(), Some("3.2"));

        let from_name = DeviceSnapshot::new(record(json!({"productName": "史密斯燃气热水器"})));
        assert_eq!(from_name.model(), "燃气热水器");

        assert_eq!(DeviceSnapshot::default().model(), UNKNOWN_MODEL);
    }

    #[test]
    fn category_accepts_string_or_number() {
        let s = DeviceSnapshot::new(record(json!({"deviceCategory": "19"})));
        let n = DeviceSnapshot::new(record(json!({"deviceCategory": 19})));
        assert_eq!(s.category().as_deref(), Some("19"));
        assert_eq!(n.category().as_deref(), Some("19"));
    }

    #[test]
    fn overlay_is_separate_from_record() {
        let mut snapshot = DeviceSnapshot::new(record(json!({"deviceId": "d1"})));
        let before = snapshot.record().clone();
        snapshot.apply(&OverlayWrite::TargetTemperature(Temperature::new(50.0).unwrap()));
        assert_eq!(snapshot.record(), &before);
        assert!(snapshot.clear(OverlayField::TargetTemperature));
        assert!(snapshot.overlay().is_empty());
    }
}
