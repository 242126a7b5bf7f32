// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-request authentication headers for the vendor API.
//!
//! Every request carries the bearer token, a millisecond timestamp, an
//! uppercase nonce and `md5data`, the MD5 hex digest of the compact JSON
//! body. The server compares `md5data` against the body it received, so the
//! digest must be computed over exactly the bytes that are sent.

use std::collections::BTreeMap;
use std::io;

use md5::{Digest, Md5};
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::config::Credentials;

/// Digest sent when the payload cannot be serialized.
///
/// The server then fails its integrity check for that request instead of the
/// client aborting before sending.
pub const FALLBACK_MD5: &str = "";

const APP_VERSION: &str = "V1.0.1";
const SOURCE: &str = "IOS";
const ACCEPT_LANGUAGE: &str = "zh-Hans-CN;q=1";
const USER_AGENT: &str = "AI jia zhi kong/2.2.5 (iPhone; iOS 26.0; Scale/3.00)";
const TRACE_SESSION: &str = "69861";

/// Time and randomness inputs of a single request.
///
/// Kept separate so that [`HeaderBuilder::build`] stays a pure function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestStamp {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Uppercase UUID nonce.
    pub nonce: String,
}

impl RequestStamp {
    /// Stamps a request with the current time and a fresh v4 nonce.
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            nonce: uuid::Uuid::new_v4().to_string().to_uppercase(),
        }
    }
}

/// Builds the header set the vendor API expects.
///
/// # Examples
///
/// ```
/// use ailink_lib::config::Credentials;
/// use ailink_lib::protocol::signing::{HeaderBuilder, RequestStamp};
/// use serde_json::json;
///
/// let builder = HeaderBuilder::new(Credentials::new("token", "u1", "f1"));
/// let stamp = RequestStamp { timestamp_ms: 1_700_000_000_000, nonce: "ABC".into() };
/// let headers = builder.build(&json!({"userId": "u1"}), &stamp);
///
/// assert_eq!(headers["Authorization"], "Bearer token");
/// assert_eq!(headers["traceId"], "1700000000000-69861-u1-00");
/// ```
#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    credentials: Credentials,
}

impl HeaderBuilder {
    /// Creates a builder for the given credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Returns the credentials used for signing.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Builds headers for `payload` using the given stamp.
    ///
    /// Never fails: unavailable values become empty strings and a payload that
    /// cannot be serialized gets [`FALLBACK_MD5`].
    #[must_use]
    pub fn build<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        stamp: &RequestStamp,
    ) -> BTreeMap<&'static str, String> {
        let user_id = self.credentials.user_id();
        let timestamp = stamp.timestamp_ms.to_string();

        let mut headers = BTreeMap::new();
        headers.insert("Authorization", self.credentials.bearer());
        headers.insert("version", APP_VERSION.to_string());
        headers.insert("familyUk", String::new());
        headers.insert("UserId", user_id.to_string());
        headers.insert("timestamp", timestamp.clone());
        headers.insert("nonce", stamp.nonce.clone());
        headers.insert("Accept", "*/*".to_string());
        headers.insert("source", SOURCE.to_string());
        headers.insert("md5data", md5data(payload));
        headers.insert("Accept-Language", ACCEPT_LANGUAGE.to_string());
        headers.insert("Content-Type", "application/json".to_string());
        headers.insert("traceId", format!("{timestamp}-{TRACE_SESSION}-{user_id}-00"));
        headers.insert("User-Agent", USER_AGENT.to_string());
        headers.insert(
            "Cookie",
            self.credentials.cookie().unwrap_or_default().to_string(),
        );
        headers.insert("sign", String::new());
        headers
    }
}

/// MD5 hex digest of the compact JSON serialization of `payload`.
///
/// Compact means `,` and `:` separators without whitespace and non-ASCII
/// characters left unescaped; keys keep their insertion order.
#[must_use]
pub fn md5data<T: Serialize + ?Sized>(payload: &T) -> String {
    match serde_json::to_vec(payload) {
        Ok(bytes) => md5_hex(&bytes),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize payload for md5data");
            FALLBACK_MD5.to_string()
        }
    }
}

/// Value of the `encode` request field: MD5 of `input` followed by the Unix
/// time in seconds.
#[must_use]
pub fn encode_field(input: &str, unix_seconds: i64) -> String {
    md5_hex(format!("{input}{unix_seconds}").as_bytes())
}

/// Lowercase MD5 hex digest.
#[must_use]
pub fn md5_hex(bytes: &[u8]) -> String {
    hex::encode(Md5::digest(bytes))
}

/// Serializes a value the way the vendor app does for nested documents:
/// `", "` and `": "` separators, non-ASCII unescaped.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, SpacedFormatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8.
    String::from_utf8(out).map_err(|e| serde::ser::Error::custom(e.to_string()))
}

/// Formatter with a space after item and key separators.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}
