use alloc::borrow::Cow;

use hashbrown::DefaultHashBuilder;

use indexmap::IndexMap;

use serde::Serialize;

use crate::rep::Representation;

/// Default path of the device resource.
pub const DEVICE_URI: &str = "/oic/d";

/// Default path of the platform resource.
pub const PLATFORM_URI: &str = "/oic/p";

/// Path of the resource listing all discoverable resources.
pub const RESOURCES_URI: &str = "/oic/res";

/// Platform information.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct PlatformInfo {
    /// Manufacturer name.
    #[serde(rename = "mnmn")]
    pub manufacturer_name: Cow<'static, str>,
}

impl PlatformInfo {
    /// Creates a [`PlatformInfo`].
    #[must_use]
    #[inline]
    pub fn new(manufacturer_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            manufacturer_name: manufacturer_name.into(),
        }
    }

    /// Returns the platform [`Representation`].
    #[must_use]
    pub fn to_representation(&self) -> Representation {
        Representation::new()
            .with("rt", alloc::vec!["oic.wk.p"])
            .with("mnmn", self.manufacturer_name.clone().into_owned())
    }
}

/// Device information.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct DeviceInfo {
    /// Device resource path.
    pub uri: Cow<'static, str>,
    /// Device type.
    #[serde(rename = "rt")]
    pub device_type: Cow<'static, str>,
    /// Human readable name.
    #[serde(rename = "n")]
    pub name: Cow<'static, str>,
    /// Specification version.
    #[serde(rename = "icv")]
    pub spec_version: Cow<'static, str>,
    /// Data model version.
    #[serde(rename = "dmv")]
    pub data_model_version: Cow<'static, str>,
    /// Custom device properties.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    #[serde(default)]
    pub properties: IndexMap<Cow<'static, str>, Cow<'static, str>, DefaultHashBuilder>,
}

impl DeviceInfo {
    /// Creates a [`DeviceInfo`] reachable at [`DEVICE_URI`].
    #[must_use]
    #[inline]
    pub fn new(
        device_type: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
        spec_version: impl Into<Cow<'static, str>>,
        data_model_version: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            uri: Cow::Borrowed(DEVICE_URI),
            device_type: device_type.into(),
            name: name.into(),
            spec_version: spec_version.into(),
            data_model_version: data_model_version.into(),
            properties: IndexMap::with_hasher(DefaultHashBuilder::default()),
        }
    }

    /// Sets a custom device property.
    ///
    /// Setting an existing property replaces its value.
    #[must_use]
    #[inline]
    pub fn property(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Returns the device [`Representation`].
    ///
    /// Custom properties follow the standard ones.
    #[must_use]
    pub fn to_representation(&self) -> Representation {
        let mut rep = Representation::new()
            .with("rt", alloc::vec![self.device_type.clone().into_owned()])
            .with("n", self.name.clone().into_owned())
            .with("icv", self.spec_version.clone().into_owned())
            .with("dmv", self.data_model_version.clone().into_owned());

        for (name, value) in &self.properties {
            rep.push(name.clone(), value.clone().into_owned());
        }

        rep
    }
}
