// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Target water temperature.

use std::fmt;

use crate::error::ValueError;

/// Target water temperature in degrees Celsius.
///
/// The heater accepts whole degrees between 35 °C and 70 °C. Fractional
/// inputs are rounded to the nearest degree before the range check.
///
/// # Examples
///
/// ```
/// use ailink_lib::types::Temperature;
///
/// let t = Temperature::new(50.0).unwrap();
/// assert_eq!(t.celsius(), 50.0);
/// assert_eq!(t.command_value(), "50");
///
/// assert!(Temperature::new(80.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    /// Lowest accepted target temperature.
    pub const MIN_CELSIUS: f64 = 35.0;
    /// Highest accepted target temperature.
    pub const MAX_CELSIUS: f64 = 70.0;
    /// Control precision.
    pub const PRECISION: f64 = 1.0;

    /// Creates a validated target temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinite input and
    /// `ValueError::OutOfRange` outside 35-70 °C.
    pub fn new(celsius: f64) -> Result<Self, ValueError> {
        if !celsius.is_finite() {
            return Err(ValueError::NotFinite);
        }
        let rounded = (celsius / Self::PRECISION).round() * Self::PRECISION;
        if !(Self::MIN_CELSIUS..=Self::MAX_CELSIUS).contains(&rounded) {
            return Err(ValueError::OutOfRange {
                min: Self::MIN_CELSIUS,
                max: Self::MAX_CELSIUS,
                actual: celsius,
            });
        }
        Ok(Self(rounded))
    }

    /// Returns the temperature in degrees Celsius.
    #[must_use]
    pub const fn celsius(&self) -> f64 {
        self.0
    }

    /// Returns the string form sent inside a vendor command.
    #[must_use]
    pub fn command_value(&self) -> String {
        format!("{:.0}", self.0)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} °C", self.0)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Temperature::new(35.0).unwrap().celsius(), 35.0);
        assert_eq!(Temperature::new(70.0).unwrap().celsius(), 70.0);
    }

    #[test]
    fn rejects_out_of_range() {
        let err = Temperature::new(34.0).unwrap_err();
        assert!(matches!(err, ValueError::OutOfRange { actual, .. } if actual == 34.0));
        assert!(Temperature::new(71.0).is_err());
    }

    #[test]
    fn rejects_nan() {
        assert_eq!(Temperature::new(f64::NAN), Err(ValueError::NotFinite));
    }

    #[test]
    fn rounds_to_precision() {
        assert_eq!(Temperature::new(49.6).unwrap().celsius(), 50.0);
        assert_eq!(Temperature::new(49.6).unwrap().command_value(), "50");
    }

    #[test]
    fn display() {
        assert_eq!(Temperature::new(42.0).unwrap().to_string(), "42 °C");
    }
}
