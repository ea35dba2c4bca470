//! `ocf-os` runs OCF servers on operating systems.
//!
//! A server is an [`stack::Application`] served by a [`stack::DeviceStack`].
//! The application describes the platform and the device, then registers
//! its resources along with their request handlers.
//!
//! The device stack is driven by an [`event_loop::EventLoop`] running on a
//! dedicated thread. At each iteration the loop polls the stack, which
//! dispatches pending requests, runs due delayed callbacks and reports the
//! delay until its next scheduled action. The loop then sleeps until that
//! deadline elapses or until it is woken through a [`wake::WakeSignal`].
//!
//! Every state change which may move the next deadline earlier, such as a
//! new request, a new delayed callback or a stop request, raises the wake
//! signal, so the loop never oversleeps and never busy-polls.
//!
//! Requests reach the stack through [`stack::StackClient`]s, either directly
//! from other threads or through the `HTTP` bridge provided by
//! [`server::Server`].

#![deny(unsafe_code)]
#![deny(missing_docs)]

/// Error management.
pub mod error;
/// The event loop driving a device stack.
pub mod event_loop;
/// Requests, responses and request handlers.
pub mod request;
/// The `HTTP` bridge to a device stack.
pub mod server;
/// The device stack.
pub mod stack;
/// The credential storage of secure devices.
pub mod storage;
/// The deadline-or-signal wake primitive.
pub mod wake;
