// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device aggregation and periodic refresh.
//!
//! The [`Coordinator`] owns the [`AggregateStore`]. Each refresh runs:
//!
//! 1. re-authenticate if the client has no session
//! 2. list devices
//! 3. fetch each device's status under the status timeout; a device whose
//!    status fails or times out keeps its bare identity record
//! 4. merge record and status into a snapshot (status keys win)
//! 5. swap the complete new store in at once
//!
//! Readers never see a half-built store. Entities read through the
//! coordinator on every access and keep no copies of their own.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use ailink_lib::config::{Credentials, IntegrationOptions};
//! use ailink_lib::coordinator::Coordinator;
//! use ailink_lib::mapping::FieldMapping;
//! use ailink_lib::protocol::ApiConfig;
//!
//! # async fn example() -> ailink_lib::Result<()> {
//! let client = ApiConfig::new(Credentials::new("token", "u1", "f1")).into_client();
//! let coordinator = Arc::new(Coordinator::new(
//!     client,
//!     Arc::new(FieldMapping::new()),
//!     IntegrationOptions::default(),
//! ));
//! coordinator.setup().await?;
//! println!("{} devices", coordinator.device_ids().len());
//! # Ok(())
//! # }
//! ```

mod dynamic_fields;

pub use dynamic_fields::DynamicField;

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::config::IntegrationOptions;
use crate::error::{Error, Result};
use crate::event::{CoordinatorEvent, EventBus};
use crate::mapping::FieldMapping;
use crate::protocol::VendorApi;
use crate::state::{AggregateStore, DeviceSnapshot, OverlayWrite, record_id};

use dynamic_fields::DynamicFieldRegistry;

/// Owns the device store and drives refreshes through a [`VendorApi`].
///
/// Futures returned by the coordinator are `Send` only if the API's are;
/// run them on the host's executor the same way the API is used.
#[derive(Debug)]
pub struct Coordinator<A> {
    api: A,
    options: IntegrationOptions,
    mapping: RwLock<Arc<FieldMapping>>,
    store: RwLock<AggregateStore>,
    dynamic_fields: RwLock<DynamicFieldRegistry>,
    event_bus: EventBus,
}

impl<A: VendorApi> Coordinator<A> {
    /// Creates a coordinator with an empty store.
    #[must_use]
    pub fn new(api: A, mapping: Arc<FieldMapping>, options: IntegrationOptions) -> Self {
        Self {
            api,
            options,
            mapping: RwLock::new(mapping),
            store: RwLock::new(AggregateStore::new()),
            dynamic_fields: RwLock::new(DynamicFieldRegistry::default()),
            event_bus: EventBus::new(),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Authenticates and runs the first refresh.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` for invalid options, and `Error::NotReady` if
    /// authentication or the first refresh fails. `NotReady` is retryable:
    /// the host should call `setup` again later.
    pub async fn setup(&self) -> Result<()> {
        self.options.validate()?;

        let result = async {
            if !self.api.is_authenticated() {
                self.api.authenticate().await?;
            }
            self.refresh().await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(devices = self.store.read().len(), "Integration ready");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Integration not ready");
                Err(Error::NotReady(e.to_string()))
            }
        }
    }

    /// Closes the API session.
    pub async fn unload(&self) {
        self.api.close().await;
        tracing::info!("Integration unloaded");
    }

    /// Refreshes every update interval until `shutdown` turns `true` or its
    /// sender is dropped.
    ///
    /// The first refresh happens one interval after the call, since
    /// [`setup`](Self::setup) already ran one. Failures are logged and
    /// published; the loop keeps going. Invalid options stop the loop before
    /// it starts, with an error log.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.options.validate() {
            tracing::error!(error = %e, "Invalid options, refresh loop not started");
            return;
        }
        let period = self.options.update_interval();
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Already logged and published by refresh.
                    let _ = self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Refresh loop stopped");
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Runs one refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns `Error::UpdateFailed` if re-authentication fails or the device
    /// list comes back empty while devices were known. The previous store is
    /// kept in both cases.
    pub async fn refresh(&self) -> Result<()> {
        match self.build_store().await {
            Ok(next) => {
                self.swap_store(next);
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    Error::UpdateFailed(reason) => reason,
                    other => other.to_string(),
                };
                tracing::error!(error = %reason, "Refresh failed");
                self.event_bus.publish(CoordinatorEvent::RefreshFailed {
                    error: reason.clone(),
                });
                Err(Error::UpdateFailed(reason))
            }
        }
    }

    async fn build_store(&self) -> Result<AggregateStore> {
        if !self.api.is_authenticated() {
            tracing::debug!("Session closed, re-authenticating");
            self.api.authenticate().await?;
        }

        let devices = self.api.get_devices().await;
        if devices.is_empty() && !self.store.read().is_empty() {
            return Err(Error::UpdateFailed(
                "device list is empty, keeping last known devices".to_string(),
            ));
        }

        let timeout = self.options.status_timeout();
        let mut next = AggregateStore::new();
        for device in devices {
            let Some(device_id) = record_id(&device) else {
                tracing::warn!("Skipping device record without deviceId");
                continue;
            };

            let status =
                match tokio::time::timeout(timeout, self.api.get_device_status(&device_id)).await {
                    Ok(Some(status)) => Some(status),
                    Ok(None) => {
                        tracing::warn!(device_id = %device_id, "No status, keeping identity record");
                        None
                    }
                    Err(_) => {
                        tracing::warn!(
                            device_id = %device_id,
                            timeout_secs = timeout.as_secs(),
                            "Status request timed out, keeping identity record"
                        );
                        None
                    }
                };

            tracing::debug!(device_id = %device_id, has_status = status.is_some(), "Merged device");
            next.insert(device_id, DeviceSnapshot::merge(device, status));
        }
        Ok(next)
    }

    fn swap_store(&self, next: AggregateStore) {
        let discovered = if self.options.enable_raw_sensors {
            let mapping = self.mapping();
            let mut registry = self.dynamic_fields.write();
            next.iter()
                .filter(|(_, snapshot)| self.options.accepts(snapshot.record()))
                .flat_map(|(id, snapshot)| registry.discover(id, snapshot, &mapping))
                .collect()
        } else {
            Vec::new()
        };

        let device_count = next.len();
        let previous = std::mem::replace(&mut *self.store.write(), next);
        let (added, removed) = self.store.read().diff(&previous);

        for device_id in added {
            tracing::info!(device_id = %device_id, "Device added");
            self.event_bus.publish(CoordinatorEvent::DeviceAdded { device_id });
        }
        for device_id in removed {
            tracing::info!(device_id = %device_id, "Device removed");
            self.event_bus.publish(CoordinatorEvent::DeviceRemoved { device_id });
        }
        for DynamicField { device_id, key } in discovered {
            tracing::debug!(device_id = %device_id, key = %key, "Discovered unmapped field");
            self.event_bus
                .publish(CoordinatorEvent::FieldDiscovered { device_id, key });
        }

        tracing::debug!(devices = device_count, "Refresh complete");
        self.event_bus
            .publish(CoordinatorEvent::Refreshed { device_count });
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the API client.
    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &IntegrationOptions {
        &self.options
    }

    /// Returns the current field mapping.
    #[must_use]
    pub fn mapping(&self) -> Arc<FieldMapping> {
        Arc::clone(&self.mapping.read())
    }

    /// Replaces the field mapping, e.g. after a language change.
    ///
    /// Dynamic fields the new mapping covers are dropped, since they are now
    /// projected as mapped sensors. The others are kept.
    pub fn set_mapping(&self, mapping: Arc<FieldMapping>) {
        let dropped = self.dynamic_fields.write().retain_unmapped(&mapping);
        if dropped > 0 {
            tracing::debug!(dropped, "Dynamic fields now mapped");
        }
        *self.mapping.write() = mapping;
    }

    /// Returns a copy of the whole store.
    #[must_use]
    pub fn store(&self) -> AggregateStore {
        self.store.read().clone()
    }

    /// Returns a copy of one device's snapshot.
    #[must_use]
    pub fn snapshot(&self, device_id: &str) -> Option<DeviceSnapshot> {
        self.store.read().get(device_id).cloned()
    }

    /// Runs `f` on a device's snapshot without copying it.
    pub fn with_snapshot<R>(
        &self,
        device_id: &str,
        f: impl FnOnce(&DeviceSnapshot) -> R,
    ) -> Option<R> {
        self.store.read().get(device_id).map(f)
    }

    /// Returns the ids of all known devices.
    #[must_use]
    pub fn device_ids(&self) -> Vec<String> {
        self.store.read().device_ids().map(str::to_string).collect()
    }

    /// Returns `true` if the device was in the latest device list.
    #[must_use]
    pub fn is_available(&self, device_id: &str) -> bool {
        self.store.read().contains(device_id)
    }

    /// Returns all discovered dynamic fields.
    #[must_use]
    pub fn dynamic_fields(&self) -> Vec<DynamicField> {
        self.dynamic_fields.read().all()
    }

    /// Returns the dynamic field keys of one device.
    #[must_use]
    pub fn dynamic_fields_for(&self, device_id: &str) -> Vec<String> {
        self.dynamic_fields.read().keys_for(device_id)
    }

    /// Subscribes to coordinator events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.event_bus.subscribe()
    }

    // =========================================================================
    // Optimistic writes
    // =========================================================================

    /// Writes an overlay field and publishes `StateWritten`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if the device is not in the store.
    pub(crate) fn write_overlay(&self, device_id: &str, write: &OverlayWrite) -> Result<()> {
        {
            let mut store = self.store.write();
            let snapshot = store
                .get_mut(device_id)
                .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
            snapshot.apply(write);
        }
        self.event_bus
            .publish(CoordinatorEvent::state_written(device_id, write.field()));
        Ok(())
    }

    /// Removes the overlay value `write` put there and publishes a rollback
    /// `StateWritten`.
    ///
    /// Nothing happens if a newer write has replaced the value in the
    /// meantime, or if the device vanished.
    pub(crate) fn rollback_overlay(&self, device_id: &str, write: &OverlayWrite) {
        let retracted = self
            .store
            .write()
            .get_mut(device_id)
            .is_some_and(|snapshot| snapshot.retract(write));
        if !retracted {
            tracing::debug!(
                device_id = %device_id,
                field = ?write.field(),
                "Overlay already superseded, nothing to roll back"
            );
            return;
        }
        self.event_bus
            .publish(CoordinatorEvent::rolled_back(device_id, write.field()));
    }
}
