use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ocf::device::{DeviceInfo, PlatformInfo};
use ocf::interface::Interface;
use ocf::resource::{Method, Resource};

use ocf_os::error::Result;
use ocf_os::request::{Request, Response};
use ocf_os::stack::{Application, DeviceStack, ServedResource};

use tracing::info;

use crate::handler::write_text;
use crate::text::TextBuffer;

/// Default path of the text resource.
pub const DEFAULT_RESOURCE_URI: &str = "/TextScrollerResURI";

/// Default device name.
pub const DEFAULT_DEVICE_NAME: &str = "Text Scroller";

/// Default credential storage directory.
pub const DEFAULT_STORAGE: &str = "./creds";

/// Type of the text resource.
pub const TEXT_RESOURCE_TYPE: &str = "oic.r.text.scroller";

/// Type of the text scroller device.
pub const DEVICE_TYPE: &str = "oic.d.text.scroller";

// Platform manufacturer.
const MANUFACTURER: &str = "Intel";

// Specification and data model versions.
const SPEC_VERSION: &str = "1.0";
const DATA_MODEL_VERSION: &str = "1.0";

// Custom device property.
const PURPOSE: (&str, &str) = ("purpose", "Smart text scroller");

/// The text scroller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollerConfig {
    resource_uri: Cow<'static, str>,
    device_name: Cow<'static, str>,
    storage: PathBuf,
    secure: bool,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollerConfig {
    /// Creates a [`ScrollerConfig`] with the default values.
    ///
    /// The text resource is secure when the `security` feature is enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resource_uri: Cow::Borrowed(DEFAULT_RESOURCE_URI),
            device_name: Cow::Borrowed(DEFAULT_DEVICE_NAME),
            storage: PathBuf::from(DEFAULT_STORAGE),
            secure: cfg!(feature = "security"),
        }
    }

    /// Sets the path of the text resource.
    #[must_use]
    #[inline]
    pub fn resource_uri(mut self, resource_uri: impl Into<Cow<'static, str>>) -> Self {
        self.resource_uri = resource_uri.into();
        self
    }

    /// Sets the device name.
    #[must_use]
    #[inline]
    pub fn device_name(mut self, device_name: impl Into<Cow<'static, str>>) -> Self {
        self.device_name = device_name.into();
        self
    }

    /// Sets the credential storage directory, used by a secure device.
    #[must_use]
    #[inline]
    pub fn storage(mut self, storage: impl Into<PathBuf>) -> Self {
        self.storage = storage.into();
        self
    }

    /// Marks the text resource as secure.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns the path of the text resource.
    #[must_use]
    pub fn get_resource_uri(&self) -> &str {
        &self.resource_uri
    }
}

/// The text scroller application.
///
/// The text buffer is written by the resource handlers on the event loop
/// thread. Clones share the same buffer, so a clone kept outside the device
/// stack observes every write.
#[derive(Debug, Clone, Default)]
pub struct TextScroller {
    config: ScrollerConfig,
    text: Arc<Mutex<TextBuffer>>,
}

impl TextScroller {
    /// Creates a [`TextScroller`] with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ScrollerConfig::new())
    }

    /// Creates a [`TextScroller`] with the given configuration.
    #[must_use]
    pub fn with_config(config: ScrollerConfig) -> Self {
        Self {
            config,
            text: Arc::new(Mutex::new(TextBuffer::new())),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    /// Returns a copy of the current text.
    #[must_use]
    pub fn text(&self) -> TextBuffer {
        lock_text(&self.text).clone()
    }

    fn text_resource(&self) -> Resource {
        let resource = Resource::new(self.config.resource_uri.clone())
            .resource_type(TEXT_RESOURCE_TYPE)
            .interface(Interface::ReadWrite)
            .default_interface(Interface::ReadWrite)
            .discoverable(true);

        if self.config.secure {
            resource.secure()
        } else {
            resource
        }
    }
}

impl Application for TextScroller {
    fn init(&mut self, stack: &mut DeviceStack) -> Result<()> {
        stack.init_platform(PlatformInfo::new(MANUFACTURER));

        stack.add_device(
            DeviceInfo::new(
                DEVICE_TYPE,
                self.config.device_name.clone(),
                SPEC_VERSION,
                DATA_MODEL_VERSION,
            )
            .property(PURPOSE.0, PURPOSE.1),
        )?;

        if self.config.secure {
            stack.storage_config(&self.config.storage)?;
        }

        Ok(())
    }

    fn register_resources(&mut self, stack: &mut DeviceStack) -> Result<()> {
        let put_text = Arc::clone(&self.text);
        let post_text = Arc::clone(&self.text);

        stack.add_resource(
            ServedResource::new(self.text_resource())
                .request_handler(Method::Put, move |request, _| {
                    info!("PUT text");
                    post(&put_text, request)
                })
                .request_handler(Method::Post, move |request, _| post(&post_text, request)),
        )
    }
}

fn post(text: &Mutex<TextBuffer>, request: &Request) -> Response {
    info!("POST text");
    Response::new(write_text(&mut lock_text(text), &request.payload))
}

fn lock_text(text: &Mutex<TextBuffer>) -> MutexGuard<'_, TextBuffer> {
    text.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use ocf::device::{DEVICE_URI, RESOURCES_URI};
    use ocf::interface::Interface;
    use ocf::rep::{RepValue, Representation};
    use ocf::status::Status;

    use ocf_os::request::Request;
    use ocf_os::stack::{DeviceStack, Stack};
    use ocf_os::wake::WakeSignal;

    use super::{DEFAULT_RESOURCE_URI, ScrollerConfig, TEXT_RESOURCE_TYPE, TextScroller};

    fn insecure() -> TextScroller {
        TextScroller::with_config(ScrollerConfig::new().secure(false))
    }

    fn stack(scroller: &TextScroller) -> DeviceStack {
        let mut stack = DeviceStack::new(scroller.clone(), WakeSignal::new());
        stack.init().unwrap();
        stack
    }

    fn roundtrip(stack: &mut DeviceStack, request: Request) -> ocf_os::request::Response {
        let mut receiver = stack.client().submit(request);
        stack.poll();
        receiver.try_recv().unwrap()
    }

    #[test]
    fn default_config() {
        let config = ScrollerConfig::new();

        assert_eq!(config.get_resource_uri(), DEFAULT_RESOURCE_URI);
        assert_eq!(config.secure, cfg!(feature = "security"));
    }

    #[test]
    fn registers_device_and_resource() {
        let stack = stack(&insecure());

        let device = stack.device().unwrap();
        assert_eq!(device.uri, DEVICE_URI);
        assert_eq!(device.device_type, "oic.d.text.scroller");
        assert_eq!(device.name, "Text Scroller");
        assert_eq!(device.spec_version, "1.0");
        assert_eq!(device.data_model_version, "1.0");
        assert_eq!(
            device.properties.get("purpose").map(|purpose| &**purpose),
            Some("Smart text scroller")
        );
        assert_eq!(stack.platform().unwrap().manufacturer_name, "Intel");
        assert!(stack.storage().is_none());

        let resources: Vec<_> = stack.resources().collect();
        assert_eq!(resources.len(), 1);

        let resource = resources[0];
        assert_eq!(resource.uri(), DEFAULT_RESOURCE_URI);
        assert_eq!(resource.resource_types(), [TEXT_RESOURCE_TYPE]);
        assert!(resource.interfaces().contains(Interface::ReadWrite));
        assert_eq!(resource.get_default_interface(), Interface::ReadWrite);
        assert!(resource.is_discoverable());
        assert_eq!(resource.observe_period(), None);
        assert!(!resource.is_secure());
    }

    #[test]
    fn secure_device_opens_storage() {
        let storage = std::env::temp_dir().join(format!("text-scroller-{}", std::process::id()));
        let scroller =
            TextScroller::with_config(ScrollerConfig::new().secure(true).storage(&storage));
        let stack = stack(&scroller);

        assert!(stack.resources().all(ocf::resource::Resource::is_secure));
        assert_eq!(stack.storage().unwrap().path(), storage.as_path());
        assert!(storage.is_dir());

        drop(stack);
        std::fs::remove_dir_all(storage).unwrap();
    }

    #[test]
    fn put_and_post_write_text() {
        let scroller = insecure();
        let mut stack = stack(&scroller);

        let response = roundtrip(
            &mut stack,
            Request::put(DEFAULT_RESOURCE_URI).payload(Representation::new().with("text", "Hello")),
        );
        assert_eq!(response.status, Status::Changed);
        assert_eq!(scroller.text().as_bytes_with_nul(), b"Hello\0");

        let response = roundtrip(
            &mut stack,
            Request::post(DEFAULT_RESOURCE_URI).payload(Representation::new().with("text", "World")),
        );
        assert_eq!(response.status, Status::Changed);
        assert_eq!(scroller.text().as_bytes(), b"World");
    }

    #[test]
    fn non_textual_write_is_rejected() {
        let scroller = insecure();
        let mut stack = stack(&scroller);

        let response = roundtrip(
            &mut stack,
            Request::post(DEFAULT_RESOURCE_URI).payload(
                Representation::new()
                    .with("a", "X")
                    .with("n", 5_i64)
                    .with("c", "Z"),
            ),
        );

        assert_eq!(response.status, Status::BadRequest);
        assert_eq!(scroller.text().as_bytes(), b"X");
    }

    #[test]
    fn text_is_not_readable() {
        let scroller = insecure();
        let mut stack = stack(&scroller);

        assert_eq!(
            roundtrip(&mut stack, Request::get(DEFAULT_RESOURCE_URI)).status,
            Status::MethodNotAllowed
        );
    }

    #[test]
    fn resource_is_discoverable() {
        let scroller = insecure();
        let mut stack = stack(&scroller);

        let links = roundtrip(&mut stack, Request::get(RESOURCES_URI))
            .payload
            .unwrap();
        let Some(RepValue::Array(links)) = links.get("links") else {
            panic!("missing links");
        };
        let Some(RepValue::Object(link)) = links.first() else {
            panic!("missing link");
        };

        assert_eq!(link.get("href"), Some(&RepValue::from(DEFAULT_RESOURCE_URI)));
    }

    #[test]
    fn custom_resource_uri() {
        let scroller = TextScroller::with_config(
            ScrollerConfig::new()
                .resource_uri("/text")
                .device_name("Marquee")
                .secure(false),
        );
        let mut stack = stack(&scroller);

        let response = roundtrip(
            &mut stack,
            Request::post("/text").payload(Representation::new().with("text", "Hi")),
        );

        assert_eq!(response.status, Status::Changed);
        assert_eq!(stack.device().unwrap().name, "Marquee");
    }
}
