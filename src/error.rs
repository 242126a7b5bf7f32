// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ailink_lib` library.
//!
//! Read paths against the vendor cloud degrade instead of failing, so most of
//! these errors surface from three places only: authentication during setup,
//! a refresh cycle that could not complete, and control commands that the
//! vendor rejected.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred during protocol communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing a response or configuration document.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Credentials were rejected or the account exposes no devices.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A refresh cycle failed; the scheduler should retry on its own interval.
    #[error("update failed: {0}")]
    UpdateFailed(String),

    /// Setup could not complete; the host should retry setup later.
    #[error("integration not ready: {0}")]
    NotReady(String),

    /// The vendor did not accept a control command.
    #[error("command {service} failed for device {device_id}: {reason}")]
    CommandFailed {
        /// The device the command targeted.
        device_id: String,
        /// The vendor service identifier.
        service: String,
        /// Why the command is considered failed.
        reason: String,
    },

    /// Device is not present in the latest device list.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The entity does not support the requested operation.
    #[error("{entity} does not support {operation}")]
    Unsupported {
        /// Entity unique id.
        entity: String,
        /// The rejected operation.
        operation: &'static str,
    },
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// A numeric value does not sit on the control's step grid.
    #[error("value {actual} is not a multiple of step {step}")]
    OffStep {
        /// Step size of the control.
        step: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// A value is not a finite number.
    #[error("value is not a finite number")]
    NotFinite,

    /// An option is not part of the enumerated set.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// An operation mode label or key is unknown.
    #[error("unknown operation mode: {0}")]
    UnknownOperationMode(String),
}

/// Errors related to HTTP communication with the vendor cloud.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The response envelope carried a non-success application status.
    #[error("API status {status}: {message}")]
    Api {
        /// Application-level status code from the envelope.
        status: i64,
        /// Vendor supplied message.
        message: String,
    },

    /// The response body is not a valid envelope.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No session is open; `authenticate` has not been called or `close` was.
    #[error("client is not connected")]
    NotConnected,

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// A header value could not be encoded.
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

/// Errors related to parsing vendor responses and configuration documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing.
    #[error("missing field: {0}")]
    MissingField(String),

    /// Unexpected document shape.
    #[error("unexpected format: {0}")]
    UnexpectedFormat(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
