// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state held by the coordinator.
//!
//! A [`DeviceSnapshot`] wraps the merged vendor record of one device plus an
//! [`Overlay`] of optimistic writes. The [`AggregateStore`] maps device ids to
//! snapshots and is replaced wholesale on every refresh.
//!
//! # Examples
//!
//! ```
//! use ailink_lib::state::{AggregateStore, DeviceSnapshot, OverlayWrite};
//! use ailink_lib::types::SwitchKind;
//! use serde_json::json;
//!
//! let mut store = AggregateStore::new();
//! store.insert("d1", DeviceSnapshot::new(json!({"deviceId": "d1"}).as_object().cloned().unwrap()));
//!
//! let snapshot = store.get_mut("d1").unwrap();
//! snapshot.apply(&OverlayWrite::Switch(SwitchKind::Cruise, true));
//! assert_eq!(store.get("d1").unwrap().overlay().switch(SwitchKind::Cruise), Some(true));
//! ```

mod overlay;
mod snapshot;
mod store;

pub use overlay::{Overlay, OverlayField, OverlayWrite};
pub use snapshot::{DeviceSnapshot, UNKNOWN_MODEL, record_id};
pub use store::AggregateStore;
