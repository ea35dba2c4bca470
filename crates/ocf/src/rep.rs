use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};

/// The type of a [`RepValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepType {
    /// Null.
    Null,
    /// Boolean.
    Bool,
    /// Integer.
    Int,
    /// Floating point number.
    Double,
    /// Text string.
    String,
    /// Byte string.
    ByteString,
    /// Array of values.
    Array,
    /// Nested representation.
    Object,
}

impl RepType {
    const fn description(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
            Self::ByteString => "byte string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl core::fmt::Display for RepType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.description().fmt(f)
    }
}

/// A value contained in a [`Representation`].
#[derive(Debug, Clone, PartialEq)]
pub enum RepValue {
    /// Null value.
    Null,
    /// A [`bool`] value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Double(f64),
    /// A text string.
    String(Cow<'static, str>),
    /// A byte string.
    ByteString(Vec<u8>),
    /// An array of values.
    Array(Vec<RepValue>),
    /// A nested [`Representation`].
    Object(Representation),
}

impl RepValue {
    /// Returns the [`RepType`] of this value.
    #[must_use]
    pub const fn value_type(&self) -> RepType {
        match self {
            Self::Null => RepType::Null,
            Self::Bool(_) => RepType::Bool,
            Self::Int(_) => RepType::Int,
            Self::Double(_) => RepType::Double,
            Self::String(_) => RepType::String,
            Self::ByteString(_) => RepType::ByteString,
            Self::Array(_) => RepType::Array,
            Self::Object(_) => RepType::Object,
        }
    }

    /// Returns the text if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&'static str> for RepValue {
    fn from(value: &'static str) -> Self {
        Self::String(Cow::Borrowed(value))
    }
}

impl From<String> for RepValue {
    fn from(value: String) -> Self {
        Self::String(Cow::Owned(value))
    }
}

impl From<bool> for RepValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for RepValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for RepValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Representation> for RepValue {
    fn from(value: Representation) -> Self {
        Self::Object(value)
    }
}

impl<T: Into<RepValue>> From<Vec<T>> for RepValue {
    fn from(values: Vec<T>) -> Self {
        Self::Array(values.into_iter().map(Into::into).collect())
    }
}

impl Serialize for RepValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Int(value) => serializer.serialize_i64(*value),
            Self::Double(value) => serializer.serialize_f64(*value),
            Self::String(value) => serializer.serialize_str(value),
            Self::ByteString(value) => serializer.serialize_bytes(value),
            Self::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Self::Object(rep) => rep.serialize(serializer),
        }
    }
}

/// A named value of a [`Representation`].
#[derive(Debug, Clone, PartialEq)]
pub struct RepEntry {
    /// Name.
    pub name: Cow<'static, str>,
    /// Value.
    pub value: RepValue,
}

/// A request or response payload.
///
/// A sequence of named values which keeps the order in which they were
/// received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Representation(Vec<RepEntry>);

impl Representation {
    /// Creates an empty [`Representation`].
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a named value.
    #[must_use]
    #[inline]
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<RepValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Appends a named value in place.
    #[inline]
    pub fn push(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<RepValue>) {
        self.0.push(RepEntry {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Returns the value of the first entry with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RepValue> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.value)
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> core::slice::Iter<'_, RepEntry> {
        self.0.iter()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether the [`Representation`] is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Representation {
    type Item = &'a RepEntry;
    type IntoIter = core::slice::Iter<'a, RepEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Representation {
    type Item = RepEntry;
    type IntoIter = alloc::vec::IntoIter<RepEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for Representation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(entry.name.as_ref(), &entry.value)?;
        }
        map.end()
    }
}

#[cfg(feature = "deserialize")]
mod de {
    use alloc::borrow::Cow;
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde::de::{Deserialize, Deserializer, Error, MapAccess, SeqAccess, Visitor};

    use super::{RepValue, Representation};

    struct RepValueVisitor;

    impl<'de> Visitor<'de> for RepValueVisitor {
        type Value = RepValue;

        fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            f.write_str("a representation value")
        }

        fn visit_unit<E: Error>(self) -> Result<RepValue, E> {
            Ok(RepValue::Null)
        }

        fn visit_none<E: Error>(self) -> Result<RepValue, E> {
            Ok(RepValue::Null)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RepValue, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_bool<E: Error>(self, value: bool) -> Result<RepValue, E> {
            Ok(RepValue::Bool(value))
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<RepValue, E> {
            Ok(RepValue::Int(value))
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<RepValue, E> {
            // Integers beyond the signed range degrade to doubles.
            Ok(i64::try_from(value).map_or(RepValue::Double(value as f64), RepValue::Int))
        }

        fn visit_f64<E: Error>(self, value: f64) -> Result<RepValue, E> {
            Ok(RepValue::Double(value))
        }

        fn visit_str<E: Error>(self, value: &str) -> Result<RepValue, E> {
            Ok(RepValue::String(Cow::Owned(String::from(value))))
        }

        fn visit_string<E: Error>(self, value: String) -> Result<RepValue, E> {
            Ok(RepValue::String(Cow::Owned(value)))
        }

        fn visit_bytes<E: Error>(self, value: &[u8]) -> Result<RepValue, E> {
            Ok(RepValue::ByteString(value.to_vec()))
        }

        fn visit_byte_buf<E: Error>(self, value: Vec<u8>) -> Result<RepValue, E> {
            Ok(RepValue::ByteString(value))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RepValue, A::Error> {
            let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(value) = seq.next_element()? {
                values.push(value);
            }
            Ok(RepValue::Array(values))
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<RepValue, A::Error> {
            RepresentationVisitor.visit_map(map).map(RepValue::Object)
        }
    }

    impl<'de> Deserialize<'de> for RepValue {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(RepValueVisitor)
        }
    }

    struct RepresentationVisitor;

    impl<'de> Visitor<'de> for RepresentationVisitor {
        type Value = Representation;

        fn expecting(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            f.write_str("a map of named values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Representation, A::Error> {
            let mut rep = Representation::new();
            while let Some((name, value)) = map.next_entry::<String, RepValue>()? {
                rep.push(name, value);
            }
            Ok(rep)
        }
    }

    impl<'de> Deserialize<'de> for Representation {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(RepresentationVisitor)
        }
    }
}
