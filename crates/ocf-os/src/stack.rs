use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use ocf::clock::{ClockTime, duration_to_ticks};
use ocf::device::{DeviceInfo, PLATFORM_URI, PlatformInfo, RESOURCES_URI};
use ocf::interface::Interface;
use ocf::rep::{RepValue, Representation};
use ocf::resource::{Method, Resource};
use ocf::status::Status;

use indexmap::IndexMap;

use tokio::sync::oneshot;

use tracing::{debug, info, warn};

use crate::error::{Error, ErrorKind, Result};
use crate::request::{Request, RequestHandler, Response};
use crate::storage::CredentialStorage;
use crate::wake::WakeSignal;

/// A device stack driven by an [`crate::event_loop::EventLoop`].
pub trait Stack {
    /// Initializes the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack cannot serve any request.
    fn init(&mut self) -> Result<()>;

    /// Runs every pending action and returns the number of clock ticks until
    /// the next scheduled one, or `0` when nothing is scheduled.
    fn poll(&mut self) -> ClockTime;

    /// Releases every stack resource.
    fn shutdown(&mut self);
}

/// An application served by a [`DeviceStack`].
pub trait Application: Send {
    /// Describes the platform and the device, and configures the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be configured.
    fn init(&mut self, stack: &mut DeviceStack) -> Result<()>;

    /// Registers the application resources.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be registered.
    fn register_resources(&mut self, stack: &mut DeviceStack) -> Result<()>;
}

/// What happens to a delayed callback after it ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackResult {
    /// Run the callback again after the same delay.
    Continue,
    /// Drop the callback.
    Done,
}

/// A callback run by the event loop once its delay elapsed.
pub type DelayedCallback = Box<dyn FnMut() -> CallbackResult + Send>;

struct Timer {
    // `None` when the delay reaches beyond the clock range: never due.
    deadline: Option<Instant>,
    delay: Duration,
    callback: DelayedCallback,
}

/// A [`Resource`] along with its request handlers.
pub struct ServedResource {
    resource: Resource,
    handlers: HashMap<Method, RequestHandler>,
}

impl ServedResource {
    /// Creates a [`ServedResource`] without handlers.
    #[must_use]
    #[inline]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            handlers: HashMap::new(),
        }
    }

    /// Binds a request handler to a [`Method`].
    ///
    /// Binding a method twice replaces the previous handler.
    #[must_use]
    #[inline]
    pub fn request_handler<H>(mut self, method: Method, handler: H) -> Self
    where
        H: FnMut(&Request, Interface) -> Response + Send + 'static,
    {
        self.handlers.insert(method, Box::new(handler));
        self
    }

    /// Returns the [`Resource`].
    #[must_use]
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Checks whether a handler is bound to the given [`Method`].
    #[must_use]
    pub fn handles(&self, method: Method) -> bool {
        self.handlers.contains_key(&method)
    }
}

impl std::fmt::Debug for ServedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServedResource")
            .field("resource", &self.resource)
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

enum Command {
    Request(Request, oneshot::Sender<Response>),
    Schedule(Duration, DelayedCallback),
}

struct Inbox {
    commands: VecDeque<Command>,
    open: bool,
}

impl Inbox {
    fn close(&mut self) -> VecDeque<Command> {
        self.open = false;
        std::mem::take(&mut self.commands)
    }
}

fn lock_inbox(inbox: &Mutex<Inbox>) -> MutexGuard<'_, Inbox> {
    inbox.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reject(commands: VecDeque<Command>) {
    for command in commands {
        if let Command::Request(_, reply) = command {
            let _ = reply.send(Response::new(Status::ServiceUnavailable));
        }
    }
}

/// A handle to submit requests and callbacks to a [`DeviceStack`] from any
/// thread.
///
/// Every submission wakes the event loop.
#[derive(Clone)]
pub struct StackClient {
    inbox: Arc<Mutex<Inbox>>,
    wake: WakeSignal,
}

impl StackClient {
    /// Submits a [`Request`], returning a receiver for its [`Response`].
    ///
    /// When the stack has been shut down, the response is immediately
    /// [`Status::ServiceUnavailable`].
    pub fn submit(&self, request: Request) -> oneshot::Receiver<Response> {
        let (sender, receiver) = oneshot::channel();

        let mut inbox = lock_inbox(&self.inbox);
        if inbox.open {
            inbox.commands.push_back(Command::Request(request, sender));
            drop(inbox);
            self.wake.signal();
        } else {
            drop(inbox);
            let _ = sender.send(Response::new(Status::ServiceUnavailable));
        }

        receiver
    }

    /// Sends a [`Request`] and waits for its [`Response`].
    ///
    /// # Errors
    ///
    /// Returns an error if the stack is dropped before answering.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.submit(request).await.map_err(|_| dropped_request())
    }

    /// Sends a [`Request`] and blocks the current thread until its
    /// [`Response`] arrives.
    ///
    /// Must not be called from an asynchronous context.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack is dropped before answering.
    pub fn send_blocking(&self, request: Request) -> Result<Response> {
        self.submit(request)
            .blocking_recv()
            .map_err(|_| dropped_request())
    }

    /// Schedules `callback` to run on the event loop after `delay`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack has been shut down.
    pub fn set_delayed_callback<C>(&self, delay: Duration, callback: C) -> Result<()>
    where
        C: FnMut() -> CallbackResult + Send + 'static,
    {
        let mut inbox = lock_inbox(&self.inbox);
        if !inbox.open {
            return Err(Error::new(
                ErrorKind::Stack,
                "Device stack shut down, callback discarded",
            ));
        }
        inbox
            .commands
            .push_back(Command::Schedule(delay, Box::new(callback)));
        drop(inbox);

        // The new callback may be due before the current deadline.
        self.wake.signal();
        Ok(())
    }
}

impl std::fmt::Debug for StackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackClient")
            .field("open", &lock_inbox(&self.inbox).open)
            .finish_non_exhaustive()
    }
}

fn dropped_request() -> Error {
    Error::new(ErrorKind::Stack, "Device stack dropped the request")
}

/// A device stack serving a single device.
///
/// The stack owns the platform and device descriptions, the registered
/// resources and the delayed callbacks. Requests reach it through
/// [`StackClient`]s and are dispatched to the resource handlers on each
/// [`Stack::poll`].
///
/// The core resources `/oic/p`, `/oic/d` and `/oic/res` are served by the
/// stack itself.
pub struct DeviceStack {
    // Application, consumed by `init`.
    application: Option<Box<dyn Application>>,
    // Platform description.
    platform: Option<PlatformInfo>,
    // Device description.
    device: Option<DeviceInfo>,
    // Credential storage, for secure devices.
    storage: Option<CredentialStorage>,
    // Application resources, in registration order.
    resources: IndexMap<String, ServedResource>,
    // Pending delayed callbacks.
    timers: Vec<Timer>,
    // Commands submitted by clients.
    inbox: Arc<Mutex<Inbox>>,
    // Event loop wake primitive.
    wake: WakeSignal,
}

impl DeviceStack {
    /// Creates a [`DeviceStack`] for the given [`Application`].
    ///
    /// Clients wake the event loop through `wake`.
    #[must_use]
    pub fn new(application: impl Application + 'static, wake: WakeSignal) -> Self {
        Self {
            application: Some(Box::new(application)),
            platform: None,
            device: None,
            storage: None,
            resources: IndexMap::new(),
            timers: Vec::new(),
            inbox: Arc::new(Mutex::new(Inbox {
                commands: VecDeque::new(),
                open: true,
            })),
            wake,
        }
    }

    /// Returns a new [`StackClient`].
    #[must_use]
    pub fn client(&self) -> StackClient {
        StackClient {
            inbox: Arc::clone(&self.inbox),
            wake: self.wake.clone(),
        }
    }

    /// Sets the platform description.
    pub fn init_platform(&mut self, platform: PlatformInfo) {
        info!("Platform manufacturer: {}", platform.manufacturer_name);
        self.platform = Some(platform);
    }

    /// Adds the device.
    ///
    /// # Errors
    ///
    /// Returns an error if a device has already been added.
    pub fn add_device(&mut self, device: DeviceInfo) -> Result<()> {
        if let Some(current) = &self.device {
            return Err(Error::new(
                ErrorKind::Init,
                format!("Device `{}` already added", current.name),
            ));
        }

        info!("Device: {} [{}] at {}", device.name, device.device_type, device.uri);
        self.device = Some(device);
        Ok(())
    }

    /// Configures the credential storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be opened.
    pub fn storage_config(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.storage = Some(CredentialStorage::open(path)?);
        Ok(())
    }

    /// Registers a [`ServedResource`].
    ///
    /// # Errors
    ///
    /// Returns an error if the resource path is invalid or already taken,
    /// if the resource has no resource type, or if its default interface is
    /// not bound.
    pub fn add_resource(&mut self, served: ServedResource) -> Result<()> {
        let resource = served.resource();
        let uri = resource.uri();

        if !uri.starts_with('/') {
            return Err(resource_error(format!("`{uri}` is not an absolute path")));
        }

        if self.is_reserved(uri) || self.resources.contains_key(uri) {
            return Err(resource_error(format!("`{uri}` is already registered")));
        }

        if resource.resource_types().is_empty() {
            return Err(resource_error(format!("`{uri}` has no resource type")));
        }

        if !resource
            .interfaces()
            .contains(resource.get_default_interface())
        {
            return Err(resource_error(format!(
                "`{uri}` default interface `{}` is not bound",
                resource.get_default_interface()
            )));
        }

        if resource.is_secure() && self.storage.is_none() {
            warn!("Secure resource `{uri}` registered without credential storage");
        }

        for method in [Method::Get, Method::Put, Method::Post, Method::Delete] {
            if served.handles(method) {
                info!("Resource route: [{method}, \"{uri}\"]");
            }
        }

        let uri = uri.to_owned();
        self.resources.insert(uri, served);
        Ok(())
    }

    /// Schedules `callback` to run after `delay`.
    pub fn set_delayed_callback<C>(&mut self, delay: Duration, callback: C)
    where
        C: FnMut() -> CallbackResult + Send + 'static,
    {
        self.schedule(delay, Box::new(callback));
    }

    /// Returns the platform description.
    #[must_use]
    pub const fn platform(&self) -> Option<&PlatformInfo> {
        self.platform.as_ref()
    }

    /// Returns the device description.
    #[must_use]
    pub const fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    /// Returns the credential storage, if configured.
    #[must_use]
    pub const fn storage(&self) -> Option<&CredentialStorage> {
        self.storage.as_ref()
    }

    /// Iterates over the registered resources.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values().map(ServedResource::resource)
    }

    fn schedule(&mut self, delay: Duration, callback: DelayedCallback) {
        let deadline = Instant::now().checked_add(delay);
        if deadline.is_none() {
            warn!("Delayed callback after {delay:?} is beyond the clock range, it never runs");
        }

        self.timers.push(Timer {
            deadline,
            delay,
            callback,
        });
    }

    fn is_reserved(&self, uri: &str) -> bool {
        uri == PLATFORM_URI
            || uri == RESOURCES_URI
            || self.device.as_ref().is_some_and(|device| device.uri == uri)
    }

    fn dispatch(&mut self, request: &Request) -> Response {
        debug!("Request: [{}, \"{}\"]", request.method, request.uri);

        if self.is_reserved(&request.uri) {
            return self.core_resource(request);
        }

        let Some(served) = self.resources.get_mut(request.uri.as_str()) else {
            return Response::new(Status::NotFound);
        };

        let interface = match request.interface {
            None => served.resource.get_default_interface(),
            Some(interface) if served.resource.interfaces().contains(interface) => interface,
            Some(interface) => {
                warn!("Interface `{interface}` not bound to `{}`", request.uri);
                return Response::new(Status::BadRequest);
            }
        };

        match served.handlers.get_mut(&request.method) {
            Some(handler) => handler(request, interface),
            None => Response::new(Status::MethodNotAllowed),
        }
    }

    fn core_resource(&self, request: &Request) -> Response {
        if request.method != Method::Get {
            return Response::new(Status::MethodNotAllowed);
        }

        if request.uri == PLATFORM_URI {
            return self.platform.as_ref().map_or_else(
                || Response::new(Status::NotFound),
                |platform| Response::ok(platform.to_representation()),
            );
        }

        if request.uri == RESOURCES_URI {
            let links: Vec<RepValue> = self
                .resources
                .values()
                .filter(|served| served.resource.is_discoverable())
                .map(|served| RepValue::Object(served.resource.serialize_data().to_representation()))
                .collect();
            return Response::ok(Representation::new().with("links", links));
        }

        self.device.as_ref().map_or_else(
            || Response::new(Status::NotFound),
            |device| Response::ok(device.to_representation()),
        )
    }

    fn run_timers(&mut self) {
        let now = Instant::now();
        let mut rescheduled = Vec::new();

        let mut index = 0;
        while index < self.timers.len() {
            if self.timers[index]
                .deadline
                .is_none_or(|deadline| deadline > now)
            {
                index += 1;
                continue;
            }

            let mut timer = self.timers.swap_remove(index);
            if (timer.callback)() == CallbackResult::Continue {
                timer.deadline = now.checked_add(timer.delay);
                rescheduled.push(timer);
            }
        }

        self.timers.extend(rescheduled);
    }

    fn next_event(&self) -> ClockTime {
        let now = Instant::now();
        self.timers
            .iter()
            .filter_map(|timer| timer.deadline)
            .min()
            .map_or(0, |deadline| {
                // A due callback must not be reported as "nothing scheduled".
                duration_to_ticks(deadline.saturating_duration_since(now)).max(1)
            })
    }

    fn close(&mut self) {
        let commands = lock_inbox(&self.inbox).close();
        reject(commands);
    }
}

impl Stack for DeviceStack {
    fn init(&mut self) -> Result<()> {
        let Some(mut application) = self.application.take() else {
            return Err(Error::new(ErrorKind::Init, "Device stack already initialized"));
        };

        application.init(self)?;

        if self.device.is_none() {
            return Err(Error::new(ErrorKind::Init, "No device added"));
        }

        application.register_resources(self)?;

        info!(
            "Device stack initialized with {} resource(s)",
            self.resources.len()
        );

        Ok(())
    }

    fn poll(&mut self) -> ClockTime {
        let commands = std::mem::take(&mut lock_inbox(&self.inbox).commands);

        for command in commands {
            match command {
                Command::Request(request, reply) => {
                    let response = self.dispatch(&request);
                    debug!("Response: {} to \"{}\"", response.status, request.uri);
                    if reply.send(response).is_err() {
                        debug!("Client gone before the response to \"{}\"", request.uri);
                    }
                }
                Command::Schedule(delay, callback) => self.schedule(delay, callback),
            }
        }

        self.run_timers();

        self.next_event()
    }

    fn shutdown(&mut self) {
        self.close();
        self.timers.clear();
        self.resources.clear();
        info!("Device stack shut down");
    }
}

impl Drop for DeviceStack {
    fn drop(&mut self) {
        // Pending clients must never wait for a stack which is gone.
        self.close();
    }
}

fn resource_error(description: String) -> Error {
    Error::new(ErrorKind::Resource, description)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use ocf::clock::CLOCK_SECOND;
    use ocf::device::{DeviceInfo, PlatformInfo};
    use ocf::interface::Interface;
    use ocf::rep::{RepValue, Representation};
    use ocf::resource::{Method, Resource};
    use ocf::status::Status;

    use crate::error::{ErrorKind, Result};
    use crate::request::{Request, Response};
    use crate::wake::{Wake, WakeSignal};

    use super::{Application, CallbackResult, DeviceStack, ServedResource, Stack};

    const ECHO_URI: &str = "/echo";

    struct Echo {
        resource: Option<Resource>,
        with_device: bool,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                resource: Some(
                    Resource::new(ECHO_URI)
                        .resource_type("x.echo")
                        .interface(Interface::ReadWrite)
                        .default_interface(Interface::ReadWrite)
                        .discoverable(true),
                ),
                with_device: true,
            }
        }

        fn with_resource(resource: Resource) -> Self {
            Self {
                resource: Some(resource),
                with_device: true,
            }
        }

        fn without_device() -> Self {
            Self {
                resource: None,
                with_device: false,
            }
        }
    }

    impl Application for Echo {
        fn init(&mut self, stack: &mut DeviceStack) -> Result<()> {
            stack.init_platform(PlatformInfo::new("Tester"));
            if self.with_device {
                stack.add_device(DeviceInfo::new("x.d.echo", "Echo", "1.0", "1.0"))?;
            }
            Ok(())
        }

        fn register_resources(&mut self, stack: &mut DeviceStack) -> Result<()> {
            let Some(resource) = self.resource.take() else {
                return Ok(());
            };
            stack.add_resource(ServedResource::new(resource).request_handler(
                Method::Post,
                |request: &Request, interface: Interface| {
                    let payload = request.payload.clone().with("if", interface.name());
                    Response {
                        status: Status::Changed,
                        payload: Some(payload),
                    }
                },
            ))
        }
    }

    fn stack(application: impl Application + 'static) -> DeviceStack {
        let mut stack = DeviceStack::new(application, WakeSignal::new());
        stack.init().unwrap();
        stack
    }

    fn roundtrip(stack: &mut DeviceStack, request: Request) -> Response {
        let mut receiver = stack.client().submit(request);
        stack.poll();
        receiver.try_recv().unwrap()
    }

    #[test]
    fn dispatch_to_handler() {
        let mut stack = stack(Echo::new());

        let response = roundtrip(
            &mut stack,
            Request::post(ECHO_URI).payload(Representation::new().with("text", "hi")),
        );

        assert_eq!(response.status, Status::Changed);
        assert_eq!(
            response.payload,
            Some(
                Representation::new()
                    .with("text", "hi")
                    .with("if", "oic.if.rw")
            )
        );
    }

    #[test]
    fn dispatch_errors() {
        let mut stack = stack(Echo::new());

        assert_eq!(
            roundtrip(&mut stack, Request::post("/missing")).status,
            Status::NotFound
        );
        assert_eq!(
            roundtrip(&mut stack, Request::put(ECHO_URI)).status,
            Status::MethodNotAllowed
        );
        assert_eq!(
            roundtrip(
                &mut stack,
                Request::post(ECHO_URI).interface(Interface::Sensor)
            )
            .status,
            Status::BadRequest
        );
        assert_eq!(
            roundtrip(
                &mut stack,
                Request::post(ECHO_URI).interface(Interface::Baseline)
            )
            .status,
            Status::Changed
        );
    }

    #[test]
    fn core_resources() {
        let mut stack = stack(Echo::new());

        let device = roundtrip(&mut stack, Request::get("/oic/d"));
        assert_eq!(device.status, Status::Ok);
        assert_eq!(
            device.payload.unwrap().get("n"),
            Some(&RepValue::from("Echo"))
        );

        let platform = roundtrip(&mut stack, Request::get("/oic/p"));
        assert_eq!(
            platform.payload.unwrap().get("mnmn"),
            Some(&RepValue::from("Tester"))
        );

        let links = roundtrip(&mut stack, Request::get("/oic/res"))
            .payload
            .unwrap();
        let Some(RepValue::Array(links)) = links.get("links") else {
            panic!("missing links");
        };
        assert_eq!(links.len(), 1);

        assert_eq!(
            roundtrip(&mut stack, Request::post("/oic/d")).status,
            Status::MethodNotAllowed
        );
    }

    #[test]
    fn hidden_resource_is_not_listed() {
        let mut stack = stack(Echo::with_resource(
            Resource::new("/hidden")
                .resource_type("x.hidden")
                .discoverable(false),
        ));

        let links = roundtrip(&mut stack, Request::get("/oic/res"))
            .payload
            .unwrap();

        assert_eq!(links.get("links"), Some(&RepValue::Array(Vec::new())));
    }

    #[test]
    fn init_requires_a_device() {
        let mut stack = DeviceStack::new(Echo::without_device(), WakeSignal::new());

        let error = stack.init().unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Init);
    }

    #[test]
    fn init_runs_once() {
        let mut stack = stack(Echo::new());

        assert_eq!(stack.init().unwrap_err().kind(), ErrorKind::Init);
    }

    #[test]
    fn invalid_resources_are_rejected() {
        for resource in [
            Resource::new("relative").resource_type("x.r"),
            Resource::new("/untyped"),
            Resource::new("/oic/d").resource_type("x.r"),
            Resource::new("/rw")
                .resource_type("x.r")
                .default_interface(Interface::ReadWrite),
        ] {
            let mut stack = DeviceStack::new(Echo::with_resource(resource), WakeSignal::new());

            assert_eq!(stack.init().unwrap_err().kind(), ErrorKind::Resource);
        }
    }

    #[test]
    fn duplicated_resource_is_rejected() {
        let mut stack = stack(Echo::new());

        let error = stack
            .add_resource(ServedResource::new(
                Resource::new(ECHO_URI).resource_type("x.echo"),
            ))
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Resource);
    }

    #[test]
    fn no_callback_means_no_event() {
        let mut stack = stack(Echo::new());

        assert_eq!(stack.poll(), 0);
    }

    #[test]
    fn delayed_callbacks() {
        let mut stack = stack(Echo::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        stack.set_delayed_callback(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CallbackResult::Done
        });

        let ticks = stack.poll();
        assert!(ticks > 0 && ticks <= 60 * CLOCK_SECOND);
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        let counter = Arc::clone(&runs);
        stack.set_delayed_callback(Duration::ZERO, move || {
            counter.fetch_add(10, Ordering::SeqCst);
            CallbackResult::Done
        });

        // The due callback runs once and is dropped.
        let ticks = stack.poll();
        assert_eq!(runs.load(Ordering::SeqCst), 10);
        assert!(ticks > 0 && ticks <= 60 * CLOCK_SECOND);
    }

    #[test]
    fn repeating_callback_stays_scheduled() {
        let mut stack = stack(Echo::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        stack.set_delayed_callback(Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CallbackResult::Continue
        });

        assert!(stack.poll() >= 1);
        assert!(stack.poll() >= 1);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unreachable_delay_never_runs() {
        let mut stack = stack(Echo::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        stack
            .client()
            .set_delayed_callback(Duration::MAX, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                CallbackResult::Done
            })
            .unwrap();

        // Nothing reachable is scheduled and the stack keeps serving.
        assert_eq!(stack.poll(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(
            roundtrip(&mut stack, Request::post(ECHO_URI)).status,
            Status::Changed
        );

        stack.set_delayed_callback(Duration::from_secs(60), || CallbackResult::Done);
        let ticks = stack.poll();
        assert!(ticks > 0 && ticks <= 60 * CLOCK_SECOND);
    }

    #[test]
    fn repeating_callback_with_unreachable_delay_stops() {
        let mut stack = stack(Echo::new());
        let runs = Arc::new(AtomicUsize::new(0));

        // Due right away, rescheduled beyond the clock range.
        let counter = Arc::clone(&runs);
        stack.set_delayed_callback(Duration::ZERO, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            CallbackResult::Continue
        });
        stack.timers[0].delay = Duration::MAX;

        assert_eq!(stack.poll(), 0);
        assert_eq!(stack.poll(), 0);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn client_submissions_wake_the_loop() {
        let wake = WakeSignal::new();
        let mut stack = DeviceStack::new(Echo::new(), wake.clone());
        stack.init().unwrap();
        let client = stack.client();

        client
            .set_delayed_callback(Duration::from_secs(5), || CallbackResult::Done)
            .unwrap();

        assert_eq!(wake.wait(None), Wake::Signaled);
        assert!(stack.poll() > 0);
    }

    #[test]
    fn shutdown_rejects_requests() {
        let mut stack = stack(Echo::new());
        let client = stack.client();

        let mut pending = client.submit(Request::post(ECHO_URI));
        stack.shutdown();

        assert_eq!(
            pending.try_recv().unwrap().status,
            Status::ServiceUnavailable
        );
        assert_eq!(
            client.send_blocking(Request::post(ECHO_URI)).unwrap().status,
            Status::ServiceUnavailable
        );
        assert_eq!(
            client
                .set_delayed_callback(Duration::ZERO, || CallbackResult::Done)
                .unwrap_err()
                .kind(),
            ErrorKind::Stack
        );
        assert_eq!(stack.resources().count(), 0);
    }

    #[test]
    fn dropped_stack_releases_clients() {
        let stack = stack(Echo::new());
        let client = stack.client();

        let mut pending = client.submit(Request::get("/oic/d"));
        drop(stack);

        assert_eq!(
            pending.try_recv().unwrap().status,
            Status::ServiceUnavailable
        );
    }
}
