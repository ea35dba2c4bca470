use ocf::interface::Interface;
use ocf::rep::Representation;
use ocf::resource::Method;
use ocf::status::Status;

/// A request addressed to a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request method.
    pub method: Method,
    /// Target resource path.
    pub uri: String,
    /// Requested interface, if any.
    pub interface: Option<Interface>,
    /// Request payload.
    pub payload: Representation,
}

impl Request {
    /// Creates a [`Request`] with an empty payload.
    #[must_use]
    #[inline]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            interface: None,
            payload: Representation::new(),
        }
    }

    /// Creates a `GET` [`Request`].
    #[must_use]
    #[inline]
    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::Get, uri)
    }

    /// Creates a `PUT` [`Request`].
    #[must_use]
    #[inline]
    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::Put, uri)
    }

    /// Creates a `POST` [`Request`].
    #[must_use]
    #[inline]
    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::Post, uri)
    }

    /// Sets the requested [`Interface`].
    #[must_use]
    pub const fn interface(mut self, interface: Interface) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Sets the request payload.
    #[must_use]
    #[inline]
    pub fn payload(mut self, payload: Representation) -> Self {
        self.payload = payload;
        self
    }
}

/// A response to a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Response status.
    pub status: Status,
    /// Response payload, if any.
    pub payload: Option<Representation>,
}

impl Response {
    /// Creates a [`Response`] without payload.
    #[must_use]
    pub const fn new(status: Status) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Creates a [`Status::Ok`] [`Response`] carrying the given payload.
    #[must_use]
    pub const fn ok(payload: Representation) -> Self {
        Self {
            status: Status::Ok,
            payload: Some(payload),
        }
    }
}

impl From<Status> for Response {
    fn from(status: Status) -> Self {
        Self::new(status)
    }
}

/// A request handler bound to a resource method.
///
/// Handlers always run on the event loop thread, one at a time.
pub type RequestHandler = Box<dyn FnMut(&Request, Interface) -> Response + Send>;
