// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of vendor status telemetry.
//!
//! The cloud reports device telemetry as a `statusInfo` document, usually a
//! JSON object *encoded as a string* inside the device record:
//!
//! ```json
//! {
//!   "statusInfo": "{\"events\":[{\"identifier\":\"post\",\"outputData\":{\"waterTemp\":\"45\"}}]}"
//! }
//! ```
//!
//! [`extract_output_data`] flattens that into the `outputData` map. It is
//! total: any malformed or missing shape yields an empty map. The decoder is
//! re-run on every read instead of caching a parsed copy, so a snapshot never
//! disagrees with its own decoded view.
//!
//! # Examples
//!
//! ```
//! use ailink_lib::telemetry::extract_output_data;
//! use serde_json::json;
//!
//! let record = json!({
//!     "deviceId": "dev-1",
//!     "statusInfo": r#"{"events":[{"identifier":"post","outputData":{"waterTemp":"45"}}]}"#
//! });
//! let output = extract_output_data(record.as_object().unwrap());
//! assert_eq!(output.get("waterTemp"), Some(&json!("45")));
//! ```

mod profile;
mod status_decoder;

pub use profile::DeviceProfile;
pub use status_decoder::{extract_output_data, parse_status_info, raw_status_info};

/// Flat telemetry map from a `post` event: vendor field key to raw value.
pub type OutputData = serde_json::Map<String, serde_json::Value>;
