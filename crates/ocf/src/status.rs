use serde::Serialize;

/// The status of a response sent back to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum Status {
    /// The request succeeded.
    Ok,
    /// A new resource has been created.
    Created,
    /// The resource state has been changed.
    Changed,
    /// The resource has been deleted.
    Deleted,
    /// The resource has not been modified.
    NotModified,
    /// The request was malformed.
    BadRequest,
    /// The client is not authorized.
    Unauthorized,
    /// The request contained an unrecognized option.
    BadOption,
    /// The client is not allowed to access the resource.
    Forbidden,
    /// No resource exists at the requested path.
    NotFound,
    /// The resource does not handle the requested method.
    MethodNotAllowed,
    /// The requested content format is not available.
    NotAcceptable,
    /// The request payload is too large.
    RequestEntityTooLarge,
    /// The request payload format is not supported.
    UnsupportedMediaType,
    /// The server failed while handling the request.
    InternalServerError,
    /// The server does not implement the requested functionality.
    NotImplemented,
    /// An upstream server answered with an invalid response.
    BadGateway,
    /// The server cannot handle the request right now.
    ServiceUnavailable,
    /// An upstream server did not answer in time.
    GatewayTimeout,
    /// Proxying is not supported.
    ProxyingNotSupported,
}

impl Status {
    const fn description(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Created => "Created",
            Self::Changed => "Changed",
            Self::Deleted => "Deleted",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::BadOption => "Bad Option",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::NotAcceptable => "Not Acceptable",
            Self::RequestEntityTooLarge => "Request Entity Too Large",
            Self::UnsupportedMediaType => "Unsupported Media Type",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::ProxyingNotSupported => "Proxying Not Supported",
        }
    }

    /// Returns the closest `HTTP` status code.
    #[must_use]
    pub const fn http_code(self) -> u16 {
        match self {
            Self::Ok | Self::Changed => 200,
            Self::Created => 201,
            Self::Deleted => 204,
            Self::NotModified => 304,
            Self::BadRequest | Self::BadOption => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::NotAcceptable => 406,
            Self::RequestEntityTooLarge => 413,
            Self::UnsupportedMediaType => 415,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::BadGateway | Self::ProxyingNotSupported => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.description().fmt(f)
    }
}
