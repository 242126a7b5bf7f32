// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the Ai-Link cloud.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value, json};

use crate::config::Credentials;
use crate::error::{Error, ProtocolError};
use crate::protocol::envelope::{ApiResponse, DeviceRecord, devices_from_info};
use crate::protocol::signing::{self, HeaderBuilder, RequestStamp};
use crate::protocol::VendorApi;

const DEVICE_LIST_PATH: &str = "/appDevice/getHomepageV2";
const DEVICE_STATUS_PATH: &str = "/appDevice/getDeviceCurrInfo";
const INVOKE_PATH: &str = "/device/invokeMethod";

const HOME_PAGE_VERSION: &str = "3";
const APP_SOURCE: i64 = 2;
const COMMAND_SOURCE: i64 = 1;
const PRODUCT_TYPE: &str = "19";
const DEVICE_TYPE: &str = "JSQ31-VJS";
const INVOKE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// ApiConfig
// ============================================================================

/// Configuration for an [`AiLinkClient`].
///
/// # Examples
///
/// ```
/// use ailink_lib::config::Credentials;
/// use ailink_lib::protocol::ApiConfig;
/// use std::time::Duration;
///
/// let config = ApiConfig::new(Credentials::new("token", "u1", "f1"))
///     .with_timeout(Duration::from_secs(5))
///     .without_validation();
/// assert_eq!(config.base_url(), ApiConfig::DEFAULT_BASE_URL);
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    validate_on_authenticate: bool,
}

impl ApiConfig {
    /// Production service root.
    pub const DEFAULT_BASE_URL: &'static str = "https://ailink-api.hotwater.com.cn/AiLinkService";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the production service.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            validate_on_authenticate: true,
        }
    }

    /// Overrides the service root. A trailing slash is ignored.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Skips the validating device list request in `authenticate`.
    #[must_use]
    pub fn without_validation(mut self) -> Self {
        self.validate_on_authenticate = false;
        self
    }

    /// Returns the service root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the credentials.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Creates an unauthenticated client from this configuration.
    #[must_use]
    pub fn into_client(self) -> AiLinkClient {
        AiLinkClient {
            headers: HeaderBuilder::new(self.credentials),
            base_url: self.base_url,
            timeout: self.timeout,
            validate_on_authenticate: self.validate_on_authenticate,
            session: RwLock::new(None),
        }
    }
}

// ============================================================================
// AiLinkClient
// ============================================================================

/// Client for the Ai-Link vendor cloud.
///
/// The HTTP session is opened by [`VendorApi::authenticate`] and released by
/// [`VendorApi::close`]. Requests made without a session fail with
/// [`ProtocolError::NotConnected`], which read operations turn into empty
/// results like any other failure.
///
/// # Examples
///
/// ```no_run
/// use ailink_lib::config::Credentials;
/// use ailink_lib::protocol::{ApiConfig, VendorApi};
///
/// # async fn example() -> ailink_lib::Result<()> {
/// let client = ApiConfig::new(Credentials::new("token", "u1", "f1")).into_client();
/// client.authenticate().await?;
/// for device in client.get_devices().await {
///     println!("{:?}", device.get("deviceId"));
/// }
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AiLinkClient {
    headers: HeaderBuilder,
    base_url: String,
    timeout: Duration,
    validate_on_authenticate: bool,
    session: RwLock<Option<Client>>,
}

impl AiLinkClient {
    /// Returns the service root.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_id(&self) -> &str {
        self.headers.credentials().user_id()
    }

    fn family_id(&self) -> &str {
        self.headers.credentials().family_id()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn encode(input: &str) -> String {
        signing::encode_field(input, chrono::Utc::now().timestamp())
    }

    fn header_map(&self, payload: &Value) -> Result<HeaderMap, ProtocolError> {
        let built = self.headers.build(payload, &RequestStamp::now());
        let mut headers = HeaderMap::with_capacity(built.len());
        for (name, value) in built {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ProtocolError::InvalidHeader(name.to_string()))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| ProtocolError::InvalidHeader(name.to_string()))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Posts `payload` and decodes the response envelope.
    ///
    /// The body is sent as the exact compact bytes that `md5data` was
    /// computed over.
    async fn post(&self, path: &str, payload: &Value) -> Result<ApiResponse, ProtocolError> {
        let client = self
            .session
            .read()
            .clone()
            .ok_or(ProtocolError::NotConnected)?;
        let headers = self.header_map(payload)?;
        let body = serde_json::to_vec(payload)
            .map_err(|e| ProtocolError::InvalidResponse(e.to_string()))?;

        tracing::debug!(path, "Sending API request");

        let response = client
            .post(self.url(path))
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ProtocolError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        tracing::trace!(path, body = %text, "Received API response");

        let envelope: ApiResponse = serde_json::from_str(&text)
            .map_err(|e| ProtocolError::InvalidResponse(e.to_string()))?;
        envelope.into_result()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transport_error(&self, e: reqwest::Error) -> ProtocolError {
        if e.is_timeout() {
            ProtocolError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProtocolError::Http(e)
        }
    }

    async fn fetch_devices(&self) -> Result<Vec<DeviceRecord>, ProtocolError> {
        let payload = json!({
            "encode": Self::encode(self.user_id()),
            "homePageVersion": HOME_PAGE_VERSION,
            "userId": self.user_id(),
            "familyId": self.family_id(),
        });
        let response = self.post(DEVICE_LIST_PATH, &payload).await?;
        Ok(devices_from_info(&response.info))
    }

    /// Builds the invoke request body.
    ///
    /// `payLoad` is itself a JSON document serialized to a string, using the
    /// spaced separators the vendor app produces.
    fn invoke_payload(
        &self,
        device_id: &str,
        service_identifier: &str,
        input_data: Map<String, Value>,
    ) -> Result<Value, ProtocolError> {
        let inner = json!({
            "profile": {
                "deviceId": device_id,
                "productType": PRODUCT_TYPE,
                "deviceType": DEVICE_TYPE,
            },
            "service": {
                "identifier": service_identifier,
                "inputData": input_data,
            },
        });
        let pay_load = signing::to_spaced_json(&inner)
            .map_err(|e| ProtocolError::InvalidResponse(e.to_string()))?;

        Ok(json!({
            "userId": self.user_id(),
            "familyId": self.family_id(),
            "appSource": APP_SOURCE,
            "commandSource": COMMAND_SOURCE,
            "invokeTime": chrono::Local::now().format(INVOKE_TIME_FORMAT).to_string(),
            "payLoad": pay_load,
        }))
    }
}

impl VendorApi for AiLinkClient {
    async fn authenticate(&self) -> Result<(), Error> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;
        *self.session.write() = Some(client);

        if !self.validate_on_authenticate {
            return Ok(());
        }

        let outcome = match self.fetch_devices().await {
            Ok(devices) if devices.is_empty() => {
                Err(Error::Authentication("account lists no devices".to_string()))
            }
            Ok(devices) => {
                tracing::debug!(count = devices.len(), "Credentials validated");
                Ok(())
            }
            Err(e) => Err(Error::Authentication(e.to_string())),
        };

        if outcome.is_err() {
            self.session.write().take();
        }
        outcome
    }

    fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    async fn get_devices(&self) -> Vec<DeviceRecord> {
        match self.fetch_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get devices");
                Vec::new()
            }
        }
    }

    async fn get_device_status(&self, device_id: &str) -> Option<DeviceRecord> {
        let payload = json!({
            "userId": self.user_id(),
            "familyId": self.family_id(),
            "deviceId": device_id,
            "encode": Self::encode(device_id),
        });
        match self.post(DEVICE_STATUS_PATH, &payload).await {
            Ok(response) => match response.info {
                Value::Object(info) => Some(info),
                Value::Null => Some(Map::new()),
                other => {
                    tracing::warn!(device_id, info = %other, "Device status is not an object");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(device_id, error = %e, "Failed to get device status");
                None
            }
        }
    }

    async fn invoke(
        &self,
        device_id: &str,
        service_identifier: &str,
        input_data: Map<String, Value>,
    ) -> Result<ApiResponse, ProtocolError> {
        let payload = self.invoke_payload(device_id, service_identifier, input_data)?;
        match self.post(INVOKE_PATH, &payload).await {
            Ok(response) => {
                tracing::debug!(device_id, service = service_identifier, "Command accepted");
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    device_id,
                    service = service_identifier,
                    error = %e,
                    "Command failed"
                );
                Err(e)
            }
        }
    }

    async fn close(&self) {
        if self.session.write().take().is_some() {
            tracing::debug!("Closed API session");
        }
    }
}
