use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;

/// AttrValue represents a value written to an element attribute or a native property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(SmartString),
}

impl AttrValue {
    /// Compare values, treating two NaNs as equal
    pub fn eq_value(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Float(a), AttrValue::Float(b)) if a.is_nan() && b.is_nan() => true,
            _ => self == other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to string for display
    pub fn to_display_string(&self) -> String {
        match self {
            AttrValue::Nil => "nil".to_string(),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => f.to_string(),
            AttrValue::String(s) => s.to_string(),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.into())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value.into())
    }
}

impl From<SmartString> for AttrValue {
    fn from(value: SmartString) -> Self {
        AttrValue::String(value)
    }
}
