// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field mapping registry.
//!
//! A language-specific document maps vendor field keys to display metadata:
//!
//! ```json
//! {
//!   "entity": {
//!     "sensor": {
//!       "waterTemp": {"name": "Water temperature", "group": "temperature"},
//!       "errorCode": "Error code",
//!       "cruiseStatus": {"name": "Cruise", "value_map": {"0": "off", "1": "on"}}
//!     },
//!     "switch": {"cruise": {"name": "Cruise", "icon": "mdi:water-sync"}},
//!     "water_heater": {"operation_mode": {"0": "Off", "1": "Heat"}}
//!   },
//!   "unit_of_measurement": {"waterTemp": "°C"},
//!   "icon_mapping": {"waterTemp": "mdi:thermometer"}
//! }
//! ```
//!
//! Entries may be a bare name or an object. Units and icons come from the
//! entry itself or, failing that, from the shared `unit_of_measurement` and
//! `icon_mapping` tables. The registry is immutable once built; a new
//! language means a new registry.

mod loader;

pub use loader::load;

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::error::ParseError;
use crate::types::Platform;

/// Group assigned to entries that do not name one.
pub const DEFAULT_GROUP: &str = "default";

/// Display metadata for one vendor field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Display name.
    pub name: String,
    /// Unit of measurement.
    pub unit: Option<String>,
    /// Icon identifier.
    pub icon: Option<String>,
    /// Group tag.
    pub group: String,
    /// Raw value to label enumeration.
    pub value_map: BTreeMap<String, String>,
}

impl MappingEntry {
    /// Fallback entry for an unmapped key: the key is its own name.
    #[must_use]
    pub fn fallback(key: &str) -> Self {
        Self {
            name: key.to_string(),
            unit: None,
            icon: None,
            group: DEFAULT_GROUP.to_string(),
            value_map: BTreeMap::new(),
        }
    }

    /// Returns the label for a raw value, if the entry enumerates one.
    #[must_use]
    pub fn label_for(&self, raw: &str) -> Option<&str> {
        self.value_map.get(raw).map(String::as_str)
    }
}

/// Immutable field mapping registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    tables: HashMap<Platform, BTreeMap<String, MappingEntry>>,
    operation_modes: BTreeMap<String, String>,
}

impl FieldMapping {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a mapping document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the text is not valid JSON or a section
    /// has the wrong shape.
    pub fn from_json_str(text: &str) -> Result<Self, ParseError> {
        let document: Document = serde_json::from_str(text)?;
        Ok(document.into())
    }

    /// Builds a registry from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if a section has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, ParseError> {
        let document: Document = serde_json::from_value(value)?;
        Ok(document.into())
    }

    /// Returns the configured entry for `key`.
    #[must_use]
    pub fn entry(&self, platform: Platform, key: &str) -> Option<&MappingEntry> {
        self.tables.get(&platform).and_then(|table| table.get(key))
    }

    /// Returns the entry for `key`, or [`MappingEntry::fallback`].
    #[must_use]
    pub fn get(&self, platform: Platform, key: &str) -> Cow<'_, MappingEntry> {
        self.entry(platform, key)
            .map_or_else(|| Cow::Owned(MappingEntry::fallback(key)), Cow::Borrowed)
    }

    /// Returns `true` if `key` is mapped for `platform`.
    #[must_use]
    pub fn contains(&self, platform: Platform, key: &str) -> bool {
        self.entry(platform, key).is_some()
    }

    /// Iterates the mapped keys of a platform in sorted order.
    pub fn keys(&self, platform: Platform) -> impl Iterator<Item = &str> {
        self.tables
            .get(&platform)
            .into_iter()
            .flat_map(|table| table.keys().map(String::as_str))
    }

    /// Returns the label configured for a vendor operation mode key.
    #[must_use]
    pub fn mode_label(&self, mode_key: &str) -> Option<&str> {
        self.operation_modes.get(mode_key).map(String::as_str)
    }

    /// Finds the vendor mode key whose label is `label`.
    ///
    /// Labels are expected to be unique per document; with duplicates the
    /// first key in sorted order wins.
    #[must_use]
    pub fn mode_key_for_label(&self, label: &str) -> Option<&str> {
        self.operation_modes
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(key, _)| key.as_str())
    }

    /// Returns `true` if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(BTreeMap::is_empty) && self.operation_modes.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Document shape
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    entity: EntitySection,
    unit_of_measurement: HashMap<String, String>,
    icon_mapping: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EntitySection {
    sensor: BTreeMap<String, RawEntry>,
    switch: BTreeMap<String, RawEntry>,
    valve: BTreeMap<String, RawEntry>,
    number: BTreeMap<String, RawEntry>,
    select: BTreeMap<String, RawEntry>,
    fan: BTreeMap<String, RawEntry>,
    water_heater: WaterHeaterSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaterHeaterSection {
    operation_mode: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Name(String),
    Detailed(DetailedEntry),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailedEntry {
    name: Option<String>,
    group: Option<String>,
    unit: Option<String>,
    icon: Option<String>,
    value_map: BTreeMap<String, Value>,
}

fn label(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl From<Document> for FieldMapping {
    fn from(document: Document) -> Self {
        let Document {
            entity,
            unit_of_measurement,
            icon_mapping,
        } = document;

        let build = |table: BTreeMap<String, RawEntry>| -> BTreeMap<String, MappingEntry> {
            table
                .into_iter()
                .map(|(key, raw)| {
                    let detailed = match raw {
                        RawEntry::Name(name) => DetailedEntry {
                            name: Some(name),
                            ..DetailedEntry::default()
                        },
                        RawEntry::Detailed(d) => d,
                    };
                    let entry = MappingEntry {
                        name: detailed.name.unwrap_or_else(|| key.clone()),
                        unit: detailed
                            .unit
                            .or_else(|| unit_of_measurement.get(&key).cloned()),
                        icon: detailed.icon.or_else(|| icon_mapping.get(&key).cloned()),
                        group: detailed.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
                        value_map: detailed
                            .value_map
                            .into_iter()
                            .map(|(raw, l)| (raw, label(l)))
                            .collect(),
                    };
                    (key, entry)
                })
                .collect()
        };

        let mut tables = HashMap::new();
        tables.insert(Platform::Sensor, build(entity.sensor));
        tables.insert(Platform::Switch, build(entity.switch));
        tables.insert(Platform::Valve, build(entity.valve));
        tables.insert(Platform::Number, build(entity.number));
        tables.insert(Platform::Select, build(entity.select));
        tables.insert(Platform::Fan, build(entity.fan));

        let operation_modes = entity
            .water_heater
            .operation_mode
            .into_iter()
            .map(|(key, l)| (key, label(l)))
            .collect();

        Self {
            tables,
            operation_modes,
        }
    }
}
