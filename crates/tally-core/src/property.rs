//! # Static Property Values
//!
//! The closed set of typed values that authoring tools can attach to
//! catalog entries as static properties. Consumers read these as opaque
//! typed values; nothing in the runtime mutates them.
//!
//! ## Value Kinds
//!
//! - [`Long`](PropertyValue::Long) / [`Double`](PropertyValue::Double) —
//!   numeric values.
//! - [`Bool`](PropertyValue::Bool) / [`Text`](PropertyValue::Text) —
//!   flags and display strings.
//! - [`AssetPath`](PropertyValue::AssetPath) /
//!   [`AssetAddress`](PropertyValue::AssetAddress) — string-encoded asset
//!   references, resolved by the client's asset pipeline (outside this
//!   crate's scope).

use serde::{Deserialize, Serialize};

/// A typed static property value.
///
/// Serializes with an explicit type tag, e.g.
/// `{"type": "long", "value": 25}`, so config files stay unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// 64-bit signed integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// Boolean flag.
    Bool(bool),
    /// Plain text.
    Text(String),
    /// String-encoded reference to a bundled asset (e.g. a resource path).
    AssetPath(String),
    /// String-encoded reference to an addressable asset.
    AssetAddress(String),
}

/// Discriminates the kinds of [`PropertyValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Long,
    Double,
    Bool,
    Text,
    AssetPath,
    AssetAddress,
}

impl PropertyValue {
    /// The kind of this value.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Long(_) => PropertyKind::Long,
            PropertyValue::Double(_) => PropertyKind::Double,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Text(_) => PropertyKind::Text,
            PropertyValue::AssetPath(_) => PropertyKind::AssetPath,
            PropertyValue::AssetAddress(_) => PropertyKind::AssetAddress,
        }
    }

    /// The integer value, if this is a [`Long`](PropertyValue::Long).
    pub fn as_long(&self) -> Option<i64> {
        match self {
            PropertyValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// The float value. A [`Long`](PropertyValue::Long) widens losslessly
    /// enough for catalog-scale numbers, so it is accepted here too.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            PropertyValue::Double(v) => Some(*v),
            PropertyValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The boolean value, if this is a [`Bool`](PropertyValue::Bool).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The text value, if this is a [`Text`](PropertyValue::Text).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The asset path, if this is an [`AssetPath`](PropertyValue::AssetPath).
    pub fn as_asset_path(&self) -> Option<&str> {
        match self {
            PropertyValue::AssetPath(v) => Some(v),
            _ => None,
        }
    }

    /// The asset address, if this is an
    /// [`AssetAddress`](PropertyValue::AssetAddress).
    pub fn as_asset_address(&self) -> Option<&str> {
        match self {
            PropertyValue::AssetAddress(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}
