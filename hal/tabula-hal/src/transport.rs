//! HTTPS transport abstraction
//!
//! The pipeline issues exactly one request shape: a POST with a small JSON
//! body and a response body that is read incrementally into a bounded
//! buffer. Implementations own the TCP connection, TLS session and HTTP
//! framing.

use embedded_io_async::Read;

/// Request header as (name, value)
pub type Header<'a> = (&'a str, &'a str);

/// One outbound request
#[derive(Debug, Clone, Copy)]
pub struct HttpsRequest<'a> {
    /// Absolute `https://` URL
    pub url: &'a str,
    pub headers: &'a [Header<'a>],
    pub body: &'a [u8],
    /// Verify the server certificate chain
    ///
    /// Disabling verification is an explicit opt-in.
    pub verify_tls: bool,
    /// Deadline for establishing the connection, including the handshake
    pub connect_timeout_ms: u32,
    /// Deadline for the whole transfer once connected
    pub timeout_ms: u32,
}

/// Response head plus a body to read from
pub struct HttpsResponse<B> {
    /// HTTP status code
    pub status: u16,
    /// Declared `Content-Length`, if the server sent one
    pub content_length: Option<usize>,
    pub body: B,
}

/// Errors from establishing or sending a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No network link
    NotConnected,
    /// TCP connect failed
    Connect,
    /// Certificate or handshake failure
    Tls,
    /// Connect or transfer deadline passed
    Timeout,
    /// Read or write failed
    Io,
}

/// HTTPS client
///
/// Async trait for posting a request and streaming the response body.
pub trait HttpsTransport {
    /// Response body reader, borrowing the transport
    type Body<'a>: Read
    where
        Self: 'a;

    /// Send a POST request and return once the response head is received
    fn post<'a>(
        &'a mut self,
        request: &HttpsRequest<'_>,
    ) -> impl core::future::Future<Output = Result<HttpsResponse<Self::Body<'a>>, TransportError>>;
}
