// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `AiLink` Lib - A Rust library bridging Ai-Link (A.O. Smith) cloud water
//! heaters to a smart-home entity model.
//!
//! The vendor exposes no local protocol. Every read and write goes through
//! its HTTPS API, authenticated with a user's bearer token and signed
//! per request.
//!
//! # Components
//!
//! - **Header builder** ([`protocol::signing`]): per-request signature
//!   headers (nonce, timestamp, MD5 of the body)
//! - **Vendor API client** ([`protocol::AiLinkClient`]): device list, device
//!   status and command invocation; failures degrade to empty results
//! - **Status decoder** ([`telemetry`]): extracts the telemetry map from the
//!   vendor's status document
//! - **Field mapping** ([`mapping`]): per-language display metadata for
//!   telemetry keys
//! - **Coordinator** ([`coordinator::Coordinator`]): periodic refresh of the
//!   device store
//! - **Entities** ([`entity`]): water heater, switch, valve, number, select,
//!   fan and sensor projections with optimistic writes
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use ailink_lib::config::{Credentials, IntegrationOptions};
//! use ailink_lib::coordinator::Coordinator;
//! use ailink_lib::entity::build_entities;
//! use ailink_lib::mapping;
//! use ailink_lib::protocol::ApiConfig;
//!
//! #[tokio::main]
//! async fn main() -> ailink_lib::Result<()> {
//!     let options = IntegrationOptions::default();
//!     let language = options.language.resolve(Some("en"));
//!     let mapping = Arc::new(mapping::load(Path::new("translations"), &language));
//!
//!     let client = ApiConfig::new(Credentials::new("token", "user-id", "family-id"))
//!         .into_client();
//!     let coordinator = Arc::new(Coordinator::new(client, mapping, options));
//!     coordinator.setup().await?;
//!
//!     for entity in build_entities(&coordinator) {
//!         println!("{} = {:?}", entity.name(), entity.state());
//!     }
//!
//!     let (stop, shutdown) = tokio::sync::watch::channel(false);
//!     let runner = Arc::clone(&coordinator);
//!     let handle = tokio::spawn(async move { runner.run(shutdown).await });
//!     // ...
//!     let _ = stop.send(true);
//!     let _ = handle.await;
//!     coordinator.unload().await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod event;
pub mod mapping;
pub mod protocol;
pub mod state;
pub mod telemetry;
pub mod types;

pub use command::{Command, HeaterCommand};
pub use config::{Credentials, DeviceFilter, IntegrationOptions, LanguageSelection};
pub use coordinator::Coordinator;
pub use entity::{Entity, EntityCommand, EntityState, build_entities};
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{CoordinatorEvent, EventBus};
pub use mapping::FieldMapping;
#[cfg(feature = "http")]
pub use protocol::{AiLinkClient, ApiConfig};
pub use protocol::{ApiResponse, DeviceRecord, VendorApi};
pub use types::{CruiseTimer, FieldValue, OperationMode, Platform, SwitchKind, Temperature};
