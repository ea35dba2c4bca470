use alloc::borrow::Cow;
use alloc::vec::Vec;

use log::warn;

use serde::Serialize;

use crate::interface::{Interface, Interfaces};
use crate::rep::{RepValue, Representation};

/// The method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum Method {
    /// `GET` request.
    Get,
    /// `PUT` request.
    Put,
    /// `POST` request.
    Post,
    /// `DELETE` request.
    Delete,
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
        .fmt(f)
    }
}

/// A resource definition.
///
/// Describes where a resource is reachable and how it can be discovered and
/// accessed. Request handlers are bound by the device stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    // Path.
    uri: Cow<'static, str>,
    // Resource types.
    resource_types: Vec<Cow<'static, str>>,
    // Bound interfaces.
    interfaces: Interfaces,
    // Interface used when a request does not name one.
    default_interface: Interface,
    // Whether the resource is listed by discovery.
    discoverable: bool,
    // Observation period in seconds, `0` when not periodically observable.
    observe_period: u16,
    // Whether the resource requires a secure connection.
    secure: bool,
}

impl Resource {
    /// Creates a [`Resource`] reachable at the given path.
    ///
    /// The resource starts with the baseline interface only, which is also
    /// its default interface.
    #[must_use]
    #[inline]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self {
            uri: uri.into(),
            resource_types: Vec::new(),
            interfaces: Interfaces::init(Interface::Baseline),
            default_interface: Interface::Baseline,
            discoverable: false,
            observe_period: 0,
            secure: false,
        }
    }

    /// Binds a resource type.
    #[must_use]
    #[inline]
    pub fn resource_type(mut self, resource_type: impl Into<Cow<'static, str>>) -> Self {
        let resource_type = resource_type.into();
        if self.resource_types.contains(&resource_type) {
            warn!("Resource type `{resource_type}` already bound to `{}`", self.uri);
        } else {
            self.resource_types.push(resource_type);
        }
        self
    }

    /// Binds an interface.
    #[must_use]
    pub const fn interface(mut self, interface: Interface) -> Self {
        self.interfaces = self.interfaces.insert(interface);
        self
    }

    /// Sets the default interface.
    #[must_use]
    pub const fn default_interface(mut self, interface: Interface) -> Self {
        self.default_interface = interface;
        self
    }

    /// Sets whether the resource can be discovered.
    #[must_use]
    pub const fn discoverable(mut self, discoverable: bool) -> Self {
        self.discoverable = discoverable;
        self
    }

    /// Makes the resource periodically observable every `seconds`.
    #[must_use]
    pub const fn periodic_observable(mut self, seconds: u16) -> Self {
        self.observe_period = seconds;
        self
    }

    /// Requires a secure connection to access the resource.
    #[must_use]
    pub const fn secure(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Returns the resource path.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns the bound resource types.
    #[must_use]
    pub fn resource_types(&self) -> &[Cow<'static, str>] {
        &self.resource_types
    }

    /// Returns the bound [`Interfaces`].
    #[must_use]
    pub const fn interfaces(&self) -> Interfaces {
        self.interfaces
    }

    /// Returns the default [`Interface`].
    #[must_use]
    pub const fn get_default_interface(&self) -> Interface {
        self.default_interface
    }

    /// Checks whether the resource can be discovered.
    #[must_use]
    pub const fn is_discoverable(&self) -> bool {
        self.discoverable
    }

    /// Returns the observation period in seconds, if any.
    #[must_use]
    pub const fn observe_period(&self) -> Option<u16> {
        if self.observe_period == 0 {
            None
        } else {
            Some(self.observe_period)
        }
    }

    /// Checks whether the resource requires a secure connection.
    #[must_use]
    pub const fn is_secure(&self) -> bool {
        self.secure
    }

    /// Serializes [`Resource`] data.
    #[must_use]
    pub fn serialize_data(&self) -> ResourceData {
        ResourceData {
            href: self.uri.clone(),
            resource_types: self.resource_types.clone(),
            interfaces: self.interfaces,
            secure: self.secure,
            observe_period: self.observe_period,
        }
    }
}

/// Resource data, as listed by discovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct ResourceData {
    /// Path.
    pub href: Cow<'static, str>,
    /// Resource types.
    #[serde(rename = "rt")]
    pub resource_types: Vec<Cow<'static, str>>,
    /// Interfaces.
    #[serde(rename = "if")]
    pub interfaces: Interfaces,
    /// Secure access.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    #[serde(default)]
    pub secure: bool,
    /// Observation period in seconds.
    #[serde(skip_serializing_if = "is_zero")]
    #[serde(default)]
    pub observe_period: u16,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &u16) -> bool {
    *value == 0
}

impl ResourceData {
    /// Returns the discovery link [`Representation`] of a resource.
    #[must_use]
    pub fn to_representation(&self) -> Representation {
        let resource_types: Vec<RepValue> = self
            .resource_types
            .iter()
            .map(|resource_type| RepValue::String(resource_type.clone()))
            .collect();
        let interfaces: Vec<RepValue> = self
            .interfaces
            .iter()
            .map(|interface| RepValue::from(interface.name()))
            .collect();

        let mut rep = Representation::new()
            .with("href", RepValue::String(self.href.clone()))
            .with("rt", resource_types)
            .with("if", interfaces);
        if self.secure {
            rep.push("sec", true);
        }
        if self.observe_period > 0 {
            rep.push("pmax", i64::from(self.observe_period));
        }
        rep
    }
}
