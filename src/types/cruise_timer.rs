// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cruise (zero-cold-water) recirculation timer.

use std::fmt;

use crate::error::ValueError;

/// Recirculation duration in minutes for cruise mode.
///
/// # Examples
///
/// ```
/// use ailink_lib::types::CruiseTimer;
///
/// let timer = CruiseTimer::new(10).unwrap();
/// assert_eq!(timer.minutes(), 10);
/// assert_eq!(timer.command_value(), "10");
///
/// assert!(CruiseTimer::new(0).is_err());
/// assert!(CruiseTimer::from_f64(12.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CruiseTimer(u8);

impl CruiseTimer {
    /// Shortest timer.
    pub const MIN: Self = Self(1);
    /// Longest timer.
    pub const MAX: Self = Self(30);
    /// Step between accepted values, in minutes.
    pub const STEP: u8 = 1;

    /// Creates a validated timer.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` outside 1-30 minutes.
    pub fn new(minutes: u8) -> Result<Self, ValueError> {
        if minutes < Self::MIN.0 || minutes > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: f64::from(Self::MIN.0),
                max: f64::from(Self::MAX.0),
                actual: f64::from(minutes),
            });
        }
        Ok(Self(minutes))
    }

    /// Creates a timer from a numeric control value.
    ///
    /// # Errors
    ///
    /// Returns an error for non-finite values, values off the step grid and
    /// values out of range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_f64(value: f64) -> Result<Self, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::NotFinite);
        }
        let min = f64::from(Self::MIN.0);
        let max = f64::from(Self::MAX.0);
        if !(min..=max).contains(&value) {
            return Err(ValueError::OutOfRange {
                min,
                max,
                actual: value,
            });
        }
        if (value - min) % f64::from(Self::STEP) != 0.0 {
            return Err(ValueError::OffStep {
                step: f64::from(Self::STEP),
                actual: value,
            });
        }
        // Range checked above, so the cast cannot truncate.
        Self::new(value as u8)
    }

    /// Creates a timer from a select option string such as `"15"`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidOption` when the option is not one of
    /// [`CruiseTimer::options`].
    pub fn from_option(option: &str) -> Result<Self, ValueError> {
        option
            .parse::<u8>()
            .ok()
            .and_then(|m| Self::new(m).ok())
            // `u8` parsing also accepts "+5" and "05", which are not options.
            .filter(|timer| timer.command_value() == option)
            .ok_or_else(|| ValueError::InvalidOption(option.to_string()))
    }

    /// Returns every accepted value as a select option string.
    #[must_use]
    pub fn options() -> Vec<String> {
        (Self::MIN.0..=Self::MAX.0)
            .step_by(usize::from(Self::STEP))
            .map(|m| m.to_string())
            .collect()
    }

    /// Returns the duration in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u8 {
        self.0
    }

    /// Returns the string form sent inside a vendor command.
    #[must_use]
    pub fn command_value(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for CruiseTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}
