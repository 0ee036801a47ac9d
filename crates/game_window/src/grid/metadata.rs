//! Named, typed values attached to a grid

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{GridError, GridResult};
use crate::foundation::math::Vec3;

/// A single metadata value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetaValue {
    /// Single precision float
    Float(f32),
    /// Double precision float
    Double(f64),
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Int64(i64),
    /// Boolean
    Bool(bool),
    /// String
    String(String),
    /// Single precision vector
    Vec3(Vec3),
}

impl MetaValue {
    /// Name of the contained type
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Int(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Vec3(_) => "vec3s",
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::Vec3(v) => write!(f, "[{}, {}, {}]", v.x, v.y, v.z),
        }
    }
}

/// Rust types that map onto a [`MetaValue`] variant
pub trait MetaType: Sized {
    /// Variant type name
    const TYPE_NAME: &'static str;

    /// Extract the value if the variant matches
    fn from_meta(value: &MetaValue) -> Option<Self>;
}

macro_rules! meta_type {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl From<$ty> for MetaValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl MetaType for $ty {
                const TYPE_NAME: &'static str = $name;

                fn from_meta(value: &MetaValue) -> Option<Self> {
                    match value {
                        MetaValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

meta_type! {
    f32 => Float, "float";
    f64 => Double, "double";
    i32 => Int, "int32";
    i64 => Int64, "int64";
    bool => Bool, "bool";
    String => String, "string";
    Vec3 => Vec3, "vec3s";
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Ordered map of metadata entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaMap {
    entries: BTreeMap<String, MetaValue>,
}

impl MetaMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert_meta(&mut self, name: impl Into<String>, value: impl Into<MetaValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&MetaValue> {
        self.entries.get(name)
    }

    /// Look up an entry and convert it to `T`
    ///
    /// Returns `Ok(None)` for a missing entry and an error when the entry
    /// holds a different type.
    pub fn get_as<T: MetaType>(&self, name: &str) -> GridResult<Option<T>> {
        match self.entries.get(name) {
            None => Ok(None),
            Some(value) => T::from_meta(value).map(Some).ok_or_else(|| GridError::MetadataTypeMismatch {
                name: name.to_string(),
                expected: T::TYPE_NAME,
                found: value.type_name(),
            }),
        }
    }

    /// Remove an entry, returning it
    pub fn remove_meta(&mut self, name: &str) -> Option<MetaValue> {
        self.entries.remove(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for MetaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut meta = MetaMap::new();
        meta.insert_meta("radius", 50.0_f32);
        meta.insert_meta("radius", 25.0_f32);
        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get_as::<f32>("radius").unwrap(), Some(25.0));
    }

    #[test]
    fn test_typed_lookup_mismatch() {
        let mut meta = MetaMap::new();
        meta.insert_meta("name", "sphere");
        let err = meta.get_as::<f32>("name").unwrap_err();
        assert!(matches!(
            err,
            GridError::MetadataTypeMismatch { expected: "float", found: "string", .. }
        ));
        assert_eq!(meta.get_as::<i32>("missing").unwrap(), None);
    }

    #[test]
    fn test_display_is_sorted_by_name() {
        let mut meta = MetaMap::new();
        meta.insert_meta("b", 2_i32);
        meta.insert_meta("a", true);
        meta.insert_meta("c", Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(meta.to_string(), "a: true, b: 2, c: [1, 2, 3]");
    }
}
