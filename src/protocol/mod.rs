// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the Ai-Link vendor cloud.
//!
//! - [`signing`]: per-request authentication headers
//! - [`AiLinkClient`]: the HTTP client for the three endpoints in use
//! - [`VendorApi`]: the seam the coordinator and entities talk through, so
//!   they can be driven by any implementation (including test doubles)
//!
//! # Failure semantics
//!
//! Read operations never fail: transport, protocol and application errors are
//! logged and turn into `None` or an empty list, so one broken device cannot
//! abort a refresh. Authentication and commands return errors, because setup
//! must abort cleanly and entities must be able to roll back.

mod envelope;
#[cfg(feature = "http")]
mod http;
pub mod signing;

pub use envelope::{ApiResponse, DeviceRecord, devices_from_info};
#[cfg(feature = "http")]
pub use http::{AiLinkClient, ApiConfig};

use serde_json::{Map, Value};

use crate::command::Command;
use crate::error::{Error, ProtocolError};

/// Operations of the vendor cloud used by this library.
#[allow(async_fn_in_trait)]
pub trait VendorApi {
    /// Opens the session and optionally validates the credentials.
    ///
    /// # Errors
    ///
    /// Returns `Error::Authentication` if validation is enabled and the
    /// account lists no devices or the API reports a failure.
    async fn authenticate(&self) -> Result<(), Error>;

    /// Returns `true` once [`authenticate`](Self::authenticate) succeeded
    /// and the session has not been closed.
    fn is_authenticated(&self) -> bool;

    /// Lists the account's devices; empty on any failure.
    async fn get_devices(&self) -> Vec<DeviceRecord>;

    /// Fetches one device's status `info` object; `None` on any failure.
    async fn get_device_status(&self, device_id: &str) -> Option<DeviceRecord>;

    /// Invokes a service on a device.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    async fn invoke(
        &self,
        device_id: &str,
        service_identifier: &str,
        input_data: Map<String, Value>,
    ) -> Result<ApiResponse, ProtocolError>;

    /// Sends a typed command.
    ///
    /// # Errors
    ///
    /// See [`invoke`](Self::invoke).
    async fn send_command<C: Command + Sync>(
        &self,
        device_id: &str,
        command: &C,
    ) -> Result<ApiResponse, ProtocolError> {
        self.invoke(device_id, command.service_identifier(), command.input_data())
            .await
    }

    /// Releases the session. Safe to call more than once.
    async fn close(&self);
}
