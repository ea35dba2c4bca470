use serde::Serialize;
use serde::ser::{SerializeSeq, Serializer};

/// A resource interface.
///
/// An interface defines the view of a resource a request operates on and
/// which methods are meaningful for that view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum Interface {
    /// Baseline, the full representation of a resource.
    #[serde(rename = "oic.if.baseline")]
    Baseline,
    /// Links list.
    #[serde(rename = "oic.if.ll")]
    LinkedList,
    /// Batch.
    #[serde(rename = "oic.if.b")]
    Batch,
    /// Read-only.
    #[serde(rename = "oic.if.r")]
    ReadOnly,
    /// Read-write.
    #[serde(rename = "oic.if.rw")]
    ReadWrite,
    /// Actuator.
    #[serde(rename = "oic.if.a")]
    Actuator,
    /// Sensor.
    #[serde(rename = "oic.if.s")]
    Sensor,
}

impl core::fmt::Display for Interface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.name().fmt(f)
    }
}

impl Interface {
    const ALL: [Self; 7] = [
        Self::Baseline,
        Self::LinkedList,
        Self::Batch,
        Self::ReadOnly,
        Self::ReadWrite,
        Self::Actuator,
        Self::Sensor,
    ];

    /// Returns the interface name as it appears in requests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Baseline => "oic.if.baseline",
            Self::LinkedList => "oic.if.ll",
            Self::Batch => "oic.if.b",
            Self::ReadOnly => "oic.if.r",
            Self::ReadWrite => "oic.if.rw",
            Self::Actuator => "oic.if.a",
            Self::Sensor => "oic.if.s",
        }
    }

    /// Looks up an [`Interface`] by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|interface| interface.name() == name)
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of [`Interface`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interfaces(u8);

impl Interfaces {
    /// Creates an empty [`Interfaces`] set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates an [`Interfaces`] set containing a single [`Interface`].
    #[must_use]
    pub const fn init(interface: Interface) -> Self {
        Self(interface.bit())
    }

    /// Adds an [`Interface`] to the set.
    #[must_use]
    pub const fn insert(self, interface: Interface) -> Self {
        Self(self.0 | interface.bit())
    }

    /// Checks whether the set contains the given [`Interface`].
    #[must_use]
    pub const fn contains(&self, interface: Interface) -> bool {
        self.0 & interface.bit() != 0
    }

    /// Checks whether the set is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the [`Interface`]s in the set.
    pub fn iter(&self) -> impl Iterator<Item = Interface> + '_ {
        Interface::ALL
            .into_iter()
            .filter(|interface| self.contains(*interface))
    }
}

impl Serialize for Interfaces {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for interface in self.iter() {
            seq.serialize_element(&interface)?;
        }
        seq.end()
    }
}

#[cfg(feature = "deserialize")]
impl<'de> serde::Deserialize<'de> for Interfaces {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let interfaces = alloc::vec::Vec::<Interface>::deserialize(deserializer)?;
        Ok(interfaces
            .into_iter()
            .fold(Self::new(), |set, interface| set.insert(interface)))
    }
}
