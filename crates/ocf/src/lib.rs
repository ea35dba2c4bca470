//! `ocf` describes the data shared between an OCF server application and the
//! device stack that serves it.
//!
//! A server is made of a platform, a device and a set of resources. Each
//! resource is reachable through a path, is bound to one or more resource
//! types and interfaces, and answers requests whose payloads are
//! representations, an ordered sequence of named values.
//!
//! This crate only describes those entities. It does not implement any
//! network protocol, payload encoding or discovery mechanism, so it can be
//! used on any target, including `no_std` environments with an allocator.
//!
//! Time is expressed in clock ticks, the unit a device stack uses to report
//! when its next internally scheduled action is due.

#![no_std]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

/// Clock ticks and their conversions.
pub mod clock;
/// Platform and device descriptions.
pub mod device;
/// Resource interfaces.
pub mod interface;
/// Request payloads.
pub mod rep;
/// Resource descriptions and request methods.
pub mod resource;
/// Response statuses.
pub mod status;

#[cfg(test)]
#[cfg(feature = "deserialize")]
pub(crate) fn serialize<T: serde::Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap()
}

#[cfg(test)]
#[cfg(feature = "deserialize")]
pub(crate) fn deserialize<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap()
}
