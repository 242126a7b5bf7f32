// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Boolean recirculation features of a water heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    /// Zero-cold-water cruise.
    Cruise,
    /// Half-pipe recirculation.
    HalfPipe,
}

impl SwitchKind {
    /// All switch kinds.
    pub const ALL: [Self; 2] = [Self::Cruise, Self::HalfPipe];

    /// Returns the key used in mapping documents and entity ids.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cruise => "cruise",
            Self::HalfPipe => "half_pipe",
        }
    }

    /// Telemetry keys carrying the state, in priority order.
    ///
    /// Firmware revisions renamed the half-pipe field; the first key with a
    /// value wins.
    #[must_use]
    pub const fn read_keys(self) -> &'static [&'static str] {
        match self {
            Self::Cruise => &["cruiseStatus"],
            Self::HalfPipe => &["halfPipeStatus", "setHalfPipeCircle", "halfPipeCircle"],
        }
    }
}

impl fmt::Display for SwitchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
