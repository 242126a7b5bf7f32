// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity projections over the coordinator's store.
//!
//! An [`Entity`] is one host-facing view of a device: the water heater
//! itself, a recirculation switch or valve, a cruise timer control or a
//! sensor. Entities hold no state; every [`Entity::state`] call reads the
//! coordinator's current snapshot through the entity's [`Capability`].
//!
//! # Writes
//!
//! Writes are optimistic. [`Entity::apply`] validates the request, writes the
//! new value into the device's overlay (visible to every entity of that
//! device at once), then sends the vendor command. If the command fails the
//! overlay field is removed again and the entity reads telemetry as before.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use ailink_lib::config::{Credentials, IntegrationOptions};
//! use ailink_lib::coordinator::Coordinator;
//! use ailink_lib::entity::{EntityCommand, build_entities};
//! use ailink_lib::mapping::FieldMapping;
//! use ailink_lib::protocol::ApiConfig;
//! use ailink_lib::types::Platform;
//!
//! # async fn example() -> ailink_lib::Result<()> {
//! let client = ApiConfig::new(Credentials::new("token", "u1", "f1")).into_client();
//! let coordinator = Arc::new(Coordinator::new(
//!     client,
//!     Arc::new(FieldMapping::new()),
//!     IntegrationOptions::default(),
//! ));
//! coordinator.setup().await?;
//!
//! for entity in build_entities(&coordinator) {
//!     if entity.platform() == Platform::WaterHeater {
//!         entity.apply(EntityCommand::SetTemperature(50.0)).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod capability;
mod device_info;
mod state;

pub use capability::{Capability, SwitchStyle, TimerStyle};
pub use device_info::{BRAND, DEFAULT_DEVICE_NAME, DeviceInfo};
pub use state::{EntityCommand, EntityState, WaterHeaterState};

use std::fmt;
use std::sync::Arc;

use crate::command::{Command, HeaterCommand};
use crate::coordinator::Coordinator;
use crate::error::{Error, Result, ValueError};
use crate::mapping::{DEFAULT_GROUP, FieldMapping};
use crate::protocol::VendorApi;
use crate::state::OverlayWrite;
use crate::types::{CruiseTimer, OperationMode, Platform, SwitchKind, Temperature};

use capability::{CRUISE_TIMER_MAPPING_KEY, timer_from_percentage};

/// Water heater name used when the record has no product name.
pub const DEFAULT_WATER_HEATER_NAME: &str = "Ai-Link A.O. Smith Water Heater";
/// Prefix of switch names when the record has no product name.
const DEFAULT_SWITCH_PREFIX: &str = "Water Heater";
/// Cruise timer name used when the mapping has no entry.
pub const DEFAULT_CRUISE_TIMER_NAME: &str = "Cruise Timer";
/// Icon of raw passthrough sensors.
pub const RAW_SENSOR_ICON: &str = "mdi:information-outline";
/// Group of raw passthrough sensors.
pub const RAW_SENSOR_GROUP: &str = "dynamic";
/// Unit of temperatures.
pub const CELSIUS: &str = "°C";
/// Unit of the cruise timer.
pub const MINUTES: &str = "min";

/// One projection of a device.
pub struct Entity<A> {
    coordinator: Arc<Coordinator<A>>,
    mapping: Arc<FieldMapping>,
    device_id: String,
    capability: Capability,
    unique_id: String,
    name: String,
    icon: Option<String>,
    unit: Option<String>,
    group: String,
}

impl<A> fmt::Debug for Entity<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("unique_id", &self.unique_id)
            .field("device_id", &self.device_id)
            .field("capability", &self.capability)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<A: VendorApi> Entity<A> {
    /// Creates an entity, deriving its presentation from the coordinator's
    /// current mapping and snapshot.
    #[must_use]
    pub fn new(
        coordinator: Arc<Coordinator<A>>,
        device_id: impl Into<String>,
        capability: Capability,
    ) -> Self {
        let device_id = device_id.into();
        let mapping = coordinator.mapping();
        let product_name = coordinator
            .with_snapshot(&device_id, |s| s.product_name().map(str::to_string))
            .flatten();

        let mut icon = None;
        let mut unit = None;
        let mut group = DEFAULT_GROUP.to_string();

        let name = match &capability {
            Capability::WaterHeater => {
                unit = Some(CELSIUS.to_string());
                product_name.unwrap_or_else(|| DEFAULT_WATER_HEATER_NAME.to_string())
            }
            Capability::Switch { kind, .. } => {
                let entry = mapping.get(capability.platform(), kind.as_str());
                icon.clone_from(&entry.icon);
                let prefix = product_name.as_deref().unwrap_or(DEFAULT_SWITCH_PREFIX);
                format!("{prefix} {}", entry.name)
            }
            Capability::CruiseTimer(_) => {
                unit = Some(MINUTES.to_string());
                match mapping.entry(capability.platform(), CRUISE_TIMER_MAPPING_KEY) {
                    Some(entry) => {
                        icon.clone_from(&entry.icon);
                        entry.name.clone()
                    }
                    None => DEFAULT_CRUISE_TIMER_NAME.to_string(),
                }
            }
            Capability::MappedSensor(key) => {
                let entry = mapping.get(Platform::Sensor, key);
                icon.clone_from(&entry.icon);
                unit.clone_from(&entry.unit);
                group.clone_from(&entry.group);
                entry.name.clone()
            }
            Capability::RawSensor(key) => {
                icon = Some(RAW_SENSOR_ICON.to_string());
                group = RAW_SENSOR_GROUP.to_string();
                let prefix = product_name.as_deref().unwrap_or(DEFAULT_DEVICE_NAME);
                format!("{prefix} {key}")
            }
        };

        Self {
            unique_id: capability.unique_id(&device_id),
            coordinator,
            mapping,
            device_id,
            capability,
            name,
            icon,
            unit,
            group,
        }
    }

    /// Returns the unique id, stable across restarts.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Returns the vendor device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the capability.
    #[must_use]
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Returns the platform.
    #[must_use]
    pub fn platform(&self) -> Platform {
        self.capability.platform()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the icon identifier.
    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    /// Returns the unit of measurement.
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Returns the group tag.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Returns the select options, for select entities.
    #[must_use]
    pub fn options(&self) -> Option<Vec<String>> {
        matches!(self.capability, Capability::CruiseTimer(TimerStyle::Select))
            .then(CruiseTimer::options)
    }

    /// Returns the operation mode labels, for the water heater entity.
    ///
    /// Labels come from the mapping document; unmapped modes use their
    /// plain name.
    #[must_use]
    pub fn operation_list(&self) -> Option<Vec<String>> {
        matches!(self.capability, Capability::WaterHeater).then(|| {
            OperationMode::ALL
                .iter()
                .map(|mode| {
                    self.mapping
                        .mode_label(mode.power_status())
                        .unwrap_or(mode.as_str())
                        .to_string()
                })
                .collect()
        })
    }

    /// Returns `true` while the device is in the latest device list.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.coordinator.is_available(&self.device_id)
    }

    /// Returns the device registry information.
    #[must_use]
    pub fn device_info(&self) -> Option<DeviceInfo> {
        self.coordinator
            .with_snapshot(&self.device_id, |s| DeviceInfo::from_snapshot(&self.device_id, s))
    }

    /// Reads the current state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.coordinator
            .with_snapshot(&self.device_id, |s| self.capability.read(s, &self.mapping))
            .unwrap_or(EntityState::Unavailable)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Applies a write request optimistically.
    ///
    /// # Errors
    ///
    /// - `Error::Unsupported` if the capability has no such operation
    /// - `Error::Value` if the value fails validation; nothing is sent
    /// - `Error::DeviceNotFound` if the device left the store
    /// - `Error::CommandFailed` if the vendor rejected the command; the
    ///   optimistic value has been rolled back
    pub async fn apply(&self, command: EntityCommand) -> Result<()> {
        let (write, vendor_command) = self.plan(&command)?;
        self.write_optimistic(write, vendor_command).await
    }

    /// Sets the water heater target temperature.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub async fn set_temperature(&self, celsius: f64) -> Result<()> {
        self.apply(EntityCommand::SetTemperature(celsius)).await
    }

    /// Turns a switch on or opens a valve.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub async fn turn_on(&self) -> Result<()> {
        self.apply(EntityCommand::TurnOn).await
    }

    /// Turns a switch off or closes a valve.
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub async fn turn_off(&self) -> Result<()> {
        self.apply(EntityCommand::TurnOff).await
    }

    fn plan(&self, command: &EntityCommand) -> Result<(OverlayWrite, HeaterCommand)> {
        let planned = match (&self.capability, command) {
            (Capability::WaterHeater, EntityCommand::SetTemperature(celsius)) => {
                let t = Temperature::new(*celsius)?;
                (
                    OverlayWrite::TargetTemperature(t),
                    HeaterCommand::SetTemperature(t),
                )
            }
            (Capability::WaterHeater, EntityCommand::SetOperationMode(label)) => {
                let mode = self.resolve_mode(label)?;
                (
                    OverlayWrite::OperationMode(mode),
                    HeaterCommand::SetOperationMode(mode),
                )
            }
            (Capability::Switch { kind, .. }, EntityCommand::TurnOn | EntityCommand::TurnOff) => {
                let on = matches!(command, EntityCommand::TurnOn);
                let vendor = match kind {
                    SwitchKind::Cruise => HeaterCommand::SetCruise(on),
                    SwitchKind::HalfPipe => HeaterCommand::SetHalfPipe(on),
                };
                (OverlayWrite::Switch(*kind, on), vendor)
            }
            (Capability::CruiseTimer(TimerStyle::Number), EntityCommand::SetValue(value)) => {
                timer_write(CruiseTimer::from_f64(*value)?)
            }
            (Capability::CruiseTimer(TimerStyle::Select), EntityCommand::SelectOption(option)) => {
                timer_write(CruiseTimer::from_option(option)?)
            }
            (Capability::CruiseTimer(TimerStyle::Fan), EntityCommand::SetPercentage(p)) => {
                timer_write(timer_from_percentage(*p))
            }
            _ => {
                return Err(Error::Unsupported {
                    entity: self.unique_id.clone(),
                    operation: command.operation(),
                });
            }
        };
        Ok(planned)
    }

    /// Resolves a mode by plain name first, then by mapped label.
    fn resolve_mode(&self, label: &str) -> Result<OperationMode> {
        if let Ok(mode) = label.parse::<OperationMode>() {
            return Ok(mode);
        }
        match self.mapping.mode_key_for_label(label) {
            Some("1") => Ok(OperationMode::Heat),
            Some("0") => Ok(OperationMode::Off),
            _ => Err(ValueError::UnknownOperationMode(label.to_string()).into()),
        }
    }

    async fn write_optimistic(&self, write: OverlayWrite, command: HeaterCommand) -> Result<()> {
        self.coordinator.write_overlay(&self.device_id, &write)?;

        let service = command.service_identifier();
        tracing::info!(
            device_id = %self.device_id,
            entity = %self.unique_id,
            service,
            "Sending command"
        );

        match self
            .coordinator
            .api()
            .send_command(&self.device_id, &command)
            .await
        {
            Ok(_) => {
                tracing::debug!(entity = %self.unique_id, service, "Command accepted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    device_id = %self.device_id,
                    entity = %self.unique_id,
                    service,
                    error = %e,
                    "Command failed, rolling back"
                );
                self.coordinator.rollback_overlay(&self.device_id, &write);
                Err(Error::CommandFailed {
                    device_id: self.device_id.clone(),
                    service: service.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn timer_write(timer: CruiseTimer) -> (OverlayWrite, HeaterCommand) {
    (
        OverlayWrite::CruiseTimer(timer),
        HeaterCommand::SetCruiseTimer(timer),
    )
}

/// Builds every entity for the devices in the store.
///
/// Devices rejected by the device filter get no entities. Mapped sensors
/// come from the mapping's sensor table; raw sensors from the discovered
/// dynamic fields the mapping does not cover, when raw sensors are enabled.
#[must_use]
pub fn build_entities<A: VendorApi>(coordinator: &Arc<Coordinator<A>>) -> Vec<Entity<A>> {
    let mapping = coordinator.mapping();
    let options = coordinator.options();
    let store = coordinator.store();

    let mut entities = Vec::new();
    for (device_id, snapshot) in store.iter() {
        if !options.accepts(snapshot.record()) {
            tracing::debug!(device_id = %device_id, category = ?snapshot.category(), "Device filtered out");
            continue;
        }

        let mut capabilities = vec![Capability::WaterHeater];
        for kind in SwitchKind::ALL {
            capabilities.push(Capability::Switch {
                kind,
                style: SwitchStyle::Switch,
            });
            capabilities.push(Capability::Switch {
                kind,
                style: SwitchStyle::Valve,
            });
        }
        capabilities.extend(
            [TimerStyle::Number, TimerStyle::Select, TimerStyle::Fan].map(Capability::CruiseTimer),
        );
        capabilities.extend(
            mapping
                .keys(Platform::Sensor)
                .map(|key| Capability::MappedSensor(key.to_string())),
        );
        if options.enable_raw_sensors {
            capabilities.extend(
                coordinator
                    .dynamic_fields_for(device_id)
                    .into_iter()
                    .filter(|key| !mapping.contains(Platform::Sensor, key))
                    .map(Capability::RawSensor),
            );
        }

        entities.extend(
            capabilities
                .into_iter()
                .map(|capability| Entity::new(Arc::clone(coordinator), device_id, capability)),
        );
    }

    tracing::debug!(entities = entities.len(), "Built entities");
    entities
}
