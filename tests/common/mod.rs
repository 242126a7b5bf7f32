// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted vendor API shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ailink_lib::error::{Error, ProtocolError};
use ailink_lib::protocol::{ApiResponse, DeviceRecord, VendorApi};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tokio::sync::Notify;

/// How the mock answers one device's status request.
#[derive(Debug, Clone)]
pub enum StatusReply {
    /// Answers with this status record.
    Ok(DeviceRecord),
    /// Answers with no status.
    Missing,
    /// Never answers.
    Hang,
}

/// A command the mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct SentCommand {
    pub device_id: String,
    pub service: String,
    pub input_data: Map<String, Value>,
}

/// In-memory [`VendorApi`] driven by the test.
#[derive(Debug, Default)]
pub struct MockApi {
    devices: Mutex<Vec<DeviceRecord>>,
    statuses: Mutex<HashMap<String, StatusReply>>,
    authenticated: AtomicBool,
    reject_auth: AtomicBool,
    fail_commands: AtomicBool,
    command_gate: Mutex<Option<Arc<Notify>>>,
    commands: Mutex<Vec<SentCommand>>,
    status_requests: AtomicUsize,
    closed: AtomicBool,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_devices(&self, devices: Vec<DeviceRecord>) {
        *self.devices.lock() = devices;
    }

    pub fn set_status(&self, device_id: &str, reply: StatusReply) {
        self.statuses.lock().insert(device_id.to_string(), reply);
    }

    pub fn reject_auth(&self, reject: bool) {
        self.reject_auth.store(reject, Ordering::SeqCst);
    }

    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    /// Holds every command until the returned notify is signalled.
    pub fn gate_commands(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.command_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn commands(&self) -> Vec<SentCommand> {
        self.commands.lock().clone()
    }

    pub fn status_requests(&self) -> usize {
        self.status_requests.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl VendorApi for MockApi {
    async fn authenticate(&self) -> Result<(), Error> {
        if self.reject_auth.load(Ordering::SeqCst) {
            return Err(Error::Authentication("rejected".to_string()));
        }
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn get_devices(&self) -> Vec<DeviceRecord> {
        self.devices.lock().clone()
    }

    async fn get_device_status(&self, device_id: &str) -> Option<DeviceRecord> {
        self.status_requests.fetch_add(1, Ordering::SeqCst);
        let reply = self.statuses.lock().get(device_id).cloned();
        match reply {
            Some(StatusReply::Ok(status)) => Some(status),
            Some(StatusReply::Hang) => std::future::pending().await,
            Some(StatusReply::Missing) | None => None,
        }
    }

    async fn invoke(
        &self,
        device_id: &str,
        service_identifier: &str,
        input_data: Map<String, Value>,
    ) -> Result<ApiResponse, ProtocolError> {
        self.commands.lock().push(SentCommand {
            device_id: device_id.to_string(),
            service: service_identifier.to_string(),
            input_data,
        });

        let gate = self.command_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(ProtocolError::Api {
                status: 500,
                message: "device offline".to_string(),
            });
        }
        Ok(ApiResponse {
            status: 200,
            msg: Some("ok".to_string()),
            info: Value::Null,
        })
    }

    async fn close(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// A device list record.
pub fn device(id: &str, category: &str, name: &str) -> DeviceRecord {
    json!({
        "deviceId": id,
        "deviceCategory": category,
        "productName": name,
        "productModel": "JSQ31-VJS",
    })
    .as_object()
    .cloned()
    .expect("object")
}

/// A status record whose `statusInfo` is a JSON string holding one post event.
pub fn status(output: Value) -> DeviceRecord {
    let info = json!({"events": [{"identifier": "post", "outputData": output}]});
    json!({"statusInfo": info.to_string()})
        .as_object()
        .cloned()
        .expect("object")
}
