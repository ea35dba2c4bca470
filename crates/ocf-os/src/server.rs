use std::future::Future;
use std::net::Ipv4Addr;

use ocf::device::RESOURCES_URI;
use ocf::interface::Interface;
use ocf::rep::Representation;
use ocf::resource::Method;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{self, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect};
use axum::{Json, Router};

use tracing::{info, warn};

use crate::error::Result;
use crate::request::{Request, Response};
use crate::stack::StackClient;

// Default HTTP address.
//
// The entire local network is considered, so the Ipv4 unspecified address is
// used.
const DEFAULT_HTTP_ADDRESS: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

// Default port.
pub(crate) const DEFAULT_SERVER_PORT: u16 = 3000;

// Query parameter selecting an interface.
const INTERFACE_QUERY: &str = "if";

#[derive(Debug)]
struct ServerData {
    // HTTP address.
    http_address: Ipv4Addr,
    // Server port.
    port: u16,
    // Device stack client.
    client: StackClient,
}

/// An `HTTP` bridge to a device stack.
///
/// Every `HTTP` request is forwarded to the device stack as a [`Request`]
/// addressed to the request path, and the stack [`Response`] is sent back
/// as `JSON`.
#[derive(Debug)]
pub struct Server {
    data: ServerData,
}

impl Server {
    /// Creates a [`Server`] forwarding requests through the given
    /// [`StackClient`].
    #[must_use]
    pub const fn new(client: StackClient) -> Self {
        Self {
            data: ServerData {
                http_address: DEFAULT_HTTP_ADDRESS,
                port: DEFAULT_SERVER_PORT,
                client,
            },
        }
    }

    /// Sets the server `IPv4` address.
    #[must_use]
    pub const fn address(mut self, http_address: Ipv4Addr) -> Self {
        self.data.http_address = http_address;
        self
    }

    /// Sets the server port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.data.port = port;
        self
    }

    /// Transforms the server into a [`GracefulShutdownServer`].
    ///
    /// The [`Future`] passed as input manages the graceful shutdown of
    /// the server.
    #[must_use]
    #[inline]
    pub fn with_graceful_shutdown<F>(self, signal: F) -> GracefulShutdownServer<F>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        GracefulShutdownServer {
            data: self.data,
            signal,
        }
    }

    /// Runs the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start.
    pub async fn run(self) -> Result<()> {
        self.with_graceful_shutdown(std::future::pending())
            .run()
            .await
    }
}

/// A server with graceful shutdown.
///
/// Aside from the graceful shutdown functionality, it behaves the same as
/// [`Server`].
#[derive(Debug)]
pub struct GracefulShutdownServer<F> {
    // Server data.
    data: ServerData,
    // Graceful shutdown signal.
    signal: F,
}

impl<F> GracefulShutdownServer<F>
where
    F: Future<Output = ()> + Send + 'static,
{
    /// Runs the server with graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start.
    pub async fn run(self) -> Result<()> {
        // Create listener bind.
        let listener_bind = format!("{}:{}", self.data.http_address, self.data.port);

        info!("Server route: [GET, \"/\"] -> \"{RESOURCES_URI}\"");

        // The root redirects to the resources list, every other path is
        // forwarded to the device stack.
        let router = Router::new()
            .route(
                "/",
                axum::routing::get(|| async { Redirect::to(RESOURCES_URI) }),
            )
            .fallback(forward)
            .with_state(self.data.client);

        // Print server Ip and port.
        info!("Device reachable at this HTTP address: {listener_bind}");

        // Create a new TCP socket which responds to the specified HTTP address
        // and port.
        let listener = tokio::net::TcpListener::bind(listener_bind).await?;

        // Print server start message
        info!("Starting server...");

        // Start the server
        axum::serve(listener, router)
            .with_graceful_shutdown(self.signal)
            .await?;

        Ok(())
    }
}

async fn forward(
    State(client): State<StackClient>,
    method: http::Method,
    uri: Uri,
    body: Bytes,
) -> axum::response::Response {
    let Some(method) = stack_method(&method) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    let interface = match requested_interface(uri.query()) {
        Ok(interface) => interface,
        Err(name) => {
            warn!("Unknown interface `{name}` requested on \"{}\"", uri.path());
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed payload on \"{}\": {e}", uri.path());
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let mut request = Request::new(method, uri.path()).payload(payload);
    if let Some(interface) = interface {
        request = request.interface(interface);
    }

    match client.send(request).await {
        Ok(response) => http_response(response),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

fn stack_method(method: &http::Method) -> Option<Method> {
    [
        (http::Method::GET, Method::Get),
        (http::Method::PUT, Method::Put),
        (http::Method::POST, Method::Post),
        (http::Method::DELETE, Method::Delete),
    ]
    .into_iter()
    .find_map(|(http_method, stack_method)| (*method == http_method).then_some(stack_method))
}

fn requested_interface(query: Option<&str>) -> std::result::Result<Option<Interface>, &str> {
    let Some(query) = query else {
        return Ok(None);
    };

    for pair in query.split('&') {
        if let Some((INTERFACE_QUERY, name)) = pair.split_once('=') {
            return Interface::from_name(name).map(Some).ok_or(name);
        }
    }

    Ok(None)
}

fn parse_payload(body: &[u8]) -> serde_json::Result<Representation> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Representation::new());
    }
    serde_json::from_slice(body)
}

fn http_response(response: Response) -> axum::response::Response {
    let status = StatusCode::from_u16(response.status.http_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match response.payload {
        Some(payload) => (status, Json(payload)).into_response(),
        None => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use ocf::interface::Interface;
    use ocf::rep::Representation;
    use ocf::resource::Method;
    use ocf::status::Status;

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{self, StatusCode, Uri};

    use crate::event_loop::EventLoop;
    use crate::request::{Request, Response};
    use crate::stack::{Application, DeviceStack, ServedResource};
    use crate::wake::WakeSignal;

    use ocf::device::{DeviceInfo, PlatformInfo};
    use ocf::resource::Resource;

    use super::{forward, http_response, parse_payload, requested_interface, stack_method};

    struct Counter;

    impl Application for Counter {
        fn init(&mut self, stack: &mut DeviceStack) -> crate::error::Result<()> {
            stack.init_platform(PlatformInfo::new("Tester"));
            stack.add_device(DeviceInfo::new("x.d.counter", "Counter", "1.0", "1.0"))
        }

        fn register_resources(&mut self, stack: &mut DeviceStack) -> crate::error::Result<()> {
            stack.add_resource(
                ServedResource::new(
                    Resource::new("/count")
                        .resource_type("x.counter")
                        .interface(Interface::ReadWrite)
                        .default_interface(Interface::ReadWrite),
                )
                .request_handler(Method::Post, |request: &Request, _| {
                    Response::ok(Representation::new().with("fields", request.payload.len() as i64))
                }),
            )
        }
    }

    #[test]
    fn methods() {
        assert_eq!(stack_method(&http::Method::PUT), Some(Method::Put));
        assert_eq!(stack_method(&http::Method::POST), Some(Method::Post));
        assert_eq!(stack_method(&http::Method::PATCH), None);
    }

    #[test]
    fn interface_query() {
        assert_eq!(requested_interface(None), Ok(None));
        assert_eq!(requested_interface(Some("a=b")), Ok(None));
        assert_eq!(
            requested_interface(Some("a=b&if=oic.if.rw")),
            Ok(Some(Interface::ReadWrite))
        );
        assert_eq!(requested_interface(Some("if=oic.if.nope")), Err("oic.if.nope"));
    }

    #[test]
    fn payloads() {
        assert_eq!(parse_payload(b"").unwrap(), Representation::new());
        assert_eq!(parse_payload(b" \n").unwrap(), Representation::new());
        assert_eq!(
            parse_payload(br#"{"text": "Hello"}"#).unwrap(),
            Representation::new().with("text", "Hello")
        );
        assert!(parse_payload(b"{").is_err());
        assert!(parse_payload(b"[1]").is_err());
    }

    #[test]
    fn statuses() {
        assert_eq!(
            http_response(Response::new(Status::Changed)).status(),
            StatusCode::OK
        );
        assert_eq!(
            http_response(Response::new(Status::BadRequest)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_response(Response::ok(Representation::new().with("n", "x"))).status(),
            StatusCode::OK
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn forward_to_running_stack() {
        let wake = WakeSignal::new();
        let stack = DeviceStack::new(Counter, wake.clone());
        let client = stack.client();
        let handle = EventLoop::new(stack, wake).spawn().unwrap();

        let response = forward(
            State(client.clone()),
            http::Method::POST,
            Uri::from_static("/count?if=oic.if.rw"),
            Bytes::from_static(br#"{"a": 1, "b": "two"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = forward(
            State(client.clone()),
            http::Method::PATCH,
            Uri::from_static("/count"),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = forward(
            State(client.clone()),
            http::Method::POST,
            Uri::from_static("/count"),
            Bytes::from_static(b"{"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = forward(
            State(client.clone()),
            http::Method::GET,
            Uri::from_static("/missing"),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        handle.stop();
        handle.join().unwrap();

        let response = forward(
            State(client),
            http::Method::POST,
            Uri::from_static("/count"),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
