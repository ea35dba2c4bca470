//! A text scroller device.
//!
//! The device exposes a single writable resource holding a short text.
//! Every textual field of a `PUT` or `POST` payload overwrites the text,
//! which is truncated to [`text::MAX_TEXT_SIZE`] `- 1` bytes.
//!
//! The [`app::TextScroller`] application is served by an
//! [`ocf_os::stack::DeviceStack`] driven by an
//! [`ocf_os::event_loop::EventLoop`].

#![deny(unsafe_code)]
#![deny(missing_docs)]

/// The text scroller application.
pub mod app;
/// The text resource write handler.
pub mod handler;
/// The text buffer.
pub mod text;
