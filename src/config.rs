// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration configuration.
//!
//! Credentials and options arrive from the host's key-value configuration
//! store. Both types deserialize directly from that store's JSON form.
//!
//! # Examples
//!
//! ```
//! use ailink_lib::config::{Credentials, IntegrationOptions};
//! use serde_json::json;
//!
//! let credentials: Credentials = serde_json::from_value(json!({
//!     "access_token": "Bearer 1234",
//!     "user_id": "u1",
//!     "family_id": "f1"
//! })).unwrap();
//! assert_eq!(credentials.bearer(), "Bearer 1234");
//!
//! let options: IntegrationOptions = serde_json::from_value(json!({
//!     "update_interval": 120
//! })).unwrap();
//! assert_eq!(options.update_interval().as_secs(), 120);
//! assert!(options.enable_raw_sensors);
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValueError;

/// Language used when neither the options nor the host pick one.
pub const DEFAULT_LANGUAGE: &str = "zh-Hans";

/// Pre-obtained credentials for the vendor cloud.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    access_token: String,
    user_id: String,
    family_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mobile: Option<String>,
}

impl Credentials {
    /// Creates credentials from the three required values.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        user_id: impl Into<String>,
        family_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
            family_id: family_id.into(),
            cookie: None,
            mobile: None,
        }
    }

    /// Sets the session cookie.
    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    /// Sets the account mobile number.
    #[must_use]
    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    /// Returns the `Authorization` header value.
    ///
    /// Tokens copied from the app often already carry the `Bearer ` prefix;
    /// it is not doubled.
    #[must_use]
    pub fn bearer(&self) -> String {
        let token = self.access_token.trim();
        if token.starts_with("Bearer ") {
            token.to_string()
        } else {
            format!("Bearer {token}")
        }
    }

    /// Returns the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the family id.
    #[must_use]
    pub fn family_id(&self) -> &str {
        &self.family_id
    }

    /// Returns the session cookie, if set.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Returns the mobile number, if set.
    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("family_id", &self.family_id)
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("mobile", &self.mobile)
            .finish()
    }
}

/// Which devices get heater entities.
///
/// Devices are matched on the string form of `record[key]`, so `"19"` and
/// `19` both match a value of `"19"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFilter {
    /// Device record key to compare.
    pub key: String,
    /// Expected value.
    pub value: String,
}

impl DeviceFilter {
    /// Filter on `deviceCategory == "19"`, the vendor's water heater category.
    #[must_use]
    pub fn water_heaters() -> Self {
        Self {
            key: "deviceCategory".to_string(),
            value: "19".to_string(),
        }
    }

    /// Returns `true` if the device record matches.
    #[must_use]
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        match record.get(&self.key) {
            Some(Value::String(s)) => *s == self.value,
            Some(Value::Number(n)) => n.to_string() == self.value,
            _ => false,
        }
    }
}

impl Default for DeviceFilter {
    fn default() -> Self {
        Self::water_heaters()
    }
}

/// Language selection option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LanguageSelection {
    /// Follow the host language.
    #[default]
    Auto,
    /// A fixed language code such as `en` or `zh-Hans`.
    Code(String),
}

impl LanguageSelection {
    /// Resolves the language to load.
    ///
    /// A fixed code wins; otherwise the host language, then [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn resolve(&self, host_language: Option<&str>) -> String {
        match self {
            Self::Code(code) => code.clone(),
            Self::Auto => host_language
                .filter(|l| !l.is_empty())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
        }
    }
}

impl From<String> for LanguageSelection {
    fn from(value: String) -> Self {
        if value.is_empty() || value == "auto" {
            Self::Auto
        } else {
            Self::Code(value)
        }
    }
}

impl From<LanguageSelection> for String {
    fn from(value: LanguageSelection) -> Self {
        match value {
            LanguageSelection::Auto => "auto".to_string(),
            LanguageSelection::Code(code) => code,
        }
    }
}

/// User-adjustable integration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationOptions {
    /// Seconds between refresh cycles.
    pub update_interval: u64,
    /// Language of the field mapping document.
    pub language: LanguageSelection,
    /// Expose unmapped telemetry fields as raw sensors.
    pub enable_raw_sensors: bool,
    /// Device filter for heater entities; `None` keeps every device.
    pub device_filter: Option<DeviceFilter>,
    /// Seconds to wait for one device's status before degrading it.
    pub status_timeout: u64,
}

impl IntegrationOptions {
    /// Default refresh interval in seconds.
    pub const DEFAULT_UPDATE_INTERVAL: u64 = 60;
    /// Shortest accepted refresh interval in seconds.
    pub const MIN_UPDATE_INTERVAL: u64 = 10;
    /// Longest accepted refresh interval in seconds.
    pub const MAX_UPDATE_INTERVAL: u64 = 3600;
    /// Default per-device status timeout in seconds.
    pub const DEFAULT_STATUS_TIMEOUT: u64 = 10;

    /// Checks option ranges.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` for an update interval outside
    /// 10-3600 seconds or a zero status timeout.
    #[allow(clippy::cast_precision_loss)]
    pub fn validate(&self) -> Result<(), ValueError> {
        let range = Self::MIN_UPDATE_INTERVAL..=Self::MAX_UPDATE_INTERVAL;
        if !range.contains(&self.update_interval) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN_UPDATE_INTERVAL as f64,
                max: Self::MAX_UPDATE_INTERVAL as f64,
                actual: self.update_interval as f64,
            });
        }
        if self.status_timeout == 0 {
            return Err(ValueError::OutOfRange {
                min: 1.0,
                max: f64::MAX,
                actual: 0.0,
            });
        }
        Ok(())
    }

    /// Refresh interval as a duration.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// Per-device status timeout as a duration.
    #[must_use]
    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.status_timeout)
    }

    /// Returns `true` if the record passes the device filter.
    #[must_use]
    pub fn accepts(&self, record: &Map<String, Value>) -> bool {
        self.device_filter
            .as_ref()
            .is_none_or(|filter| filter.matches(record))
    }
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            update_interval: Self::DEFAULT_UPDATE_INTERVAL,
            language: LanguageSelection::Auto,
            enable_raw_sensors: true,
            device_filter: Some(DeviceFilter::default()),
            status_timeout: Self::DEFAULT_STATUS_TIMEOUT,
        }
    }
}
