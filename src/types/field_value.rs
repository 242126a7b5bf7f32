// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed telemetry values.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A telemetry value after numeric coercion.
///
/// The vendor encodes most numbers as strings (`"45"`, `"38.5"`). Coercion
/// turns a string made only of ASCII digits and at most one decimal point
/// into [`FieldValue::Int`] or [`FieldValue::Float`]; every other string is
/// kept verbatim as [`FieldValue::Text`] so enum-like fields survive.
/// Empty strings and JSON `null` mean "no reading".
///
/// # Examples
///
/// ```
/// use ailink_lib::types::FieldValue;
/// use serde_json::json;
///
/// assert_eq!(FieldValue::from_raw(&json!("45")), Some(FieldValue::Int(45)));
/// assert_eq!(FieldValue::from_raw(&json!("38.5")), Some(FieldValue::Float(38.5)));
/// assert_eq!(FieldValue::from_raw(&json!("E1")), Some(FieldValue::Text("E1".into())));
/// assert_eq!(FieldValue::from_raw(&json!("")), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Whole number.
    Int(i64),
    /// Number with a fractional part.
    Float(f64),
    /// Boolean reported as a JSON boolean.
    Bool(bool),
    /// Anything that is not numeric.
    Text(String),
}

impl FieldValue {
    /// Coerces a raw vendor value.
    ///
    /// Returns `None` for `null` and the empty string.
    #[must_use]
    pub fn from_raw(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Self::from_str_value(s),
            Value::Array(_) | Value::Object(_) => Some(Self::Text(value.to_string())),
        }
    }

    fn from_str_value(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        if !is_decimal_literal(s) {
            return Some(Self::Text(s.to_string()));
        }
        let number = if s.contains('.') {
            s.parse::<f64>().ok().map(Self::Float)
        } else {
            s.parse::<i64>()
                .map(Self::Int)
                .or_else(|_| s.parse::<f64>().map(Self::Float))
                .ok()
        };
        number.or_else(|| Some(Self::Text(s.to_string())))
    }

    /// Returns the value as a float when it is numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    /// Returns `true` for the vendor's "on" encodings (`"1"`, `1`, `true`).
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(i) => *i == 1,
            Self::Float(f) => (*f - 1.0).abs() < f64::EPSILON,
            Self::Bool(b) => *b,
            Self::Text(s) => s == "1",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Digits with at most one `.` and at least one digit.
fn is_decimal_literal(s: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for c in s.chars() {
        match c {
            '.' => dots += 1,
            '0'..='9' => digits += 1,
            _ => return false,
        }
    }
    dots <= 1 && digits > 0
}
