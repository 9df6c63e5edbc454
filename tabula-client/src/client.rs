//! Query client
//!
//! Sends one query request and reads the response body into a buffer
//! allocated once at construction. A body is returned only when it was read
//! completely; anything larger than the buffer is a `BufferOverflow`, never a
//! truncated success.

use alloc::vec;
use alloc::vec::Vec;

use embedded_io_async::{Error as _, ErrorKind, Read};
use tabula_core::config::DatabaseSettings;
use tabula_core::error::{FetchError, NetworkFailure};
use tabula_core::Cursor;
use tabula_hal::{HttpsRequest, HttpsTransport, TransportError, Watchdog};
use tabula_protocol::QueryRequest;

/// HTTP status of a successful query
const STATUS_OK: u16 = 200;

/// Map a transport failure into the fetch taxonomy
pub fn transport_failure(err: TransportError) -> FetchError {
    match err {
        TransportError::NotConnected => FetchError::Network(NetworkFailure::NotConnected),
        TransportError::Connect => FetchError::Network(NetworkFailure::Connect),
        TransportError::Timeout => FetchError::Network(NetworkFailure::Timeout),
        TransportError::Io => FetchError::Network(NetworkFailure::Transfer),
        TransportError::Tls => FetchError::Tls,
    }
}

fn read_failure<E: embedded_io_async::Error>(err: E) -> FetchError {
    match err.kind() {
        ErrorKind::TimedOut => FetchError::Network(NetworkFailure::Timeout),
        _ => FetchError::Network(NetworkFailure::Transfer),
    }
}

/// HTTPS query client with a bounded body buffer
pub struct QueryClient<T: HttpsTransport> {
    transport: T,
    buffer: Vec<u8>,
    verify_tls: bool,
    connect_timeout_ms: u32,
    timeout_ms: u32,
}

impl<T: HttpsTransport> QueryClient<T> {
    pub fn new(transport: T, settings: &DatabaseSettings) -> Self {
        Self {
            transport,
            buffer: vec![0; settings.buffer_size],
            verify_tls: settings.verify_tls,
            connect_timeout_ms: settings.connect_timeout_ms,
            timeout_ms: settings.timeout_ms,
        }
    }

    /// Body buffer capacity in bytes
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Post the query and read the full response body
    ///
    /// The watchdog is fed after the response head arrives and after every
    /// chunk of body.
    pub async fn execute<W: Watchdog>(
        &mut self,
        request: &QueryRequest,
        cursor: Option<&Cursor>,
        watchdog: &mut W,
    ) -> Result<&[u8], FetchError> {
        let capacity = self.buffer.len();
        let body = request.body(cursor);
        let headers = request.headers();
        let https = HttpsRequest {
            url: request.url(),
            headers: &headers,
            body: &body,
            verify_tls: self.verify_tls,
            connect_timeout_ms: self.connect_timeout_ms,
            timeout_ms: self.timeout_ms,
        };

        let response = self.transport.post(&https).await.map_err(transport_failure)?;
        watchdog.feed();

        if response.status != STATUS_OK {
            return Err(FetchError::HttpStatus(response.status));
        }
        if response.content_length.is_some_and(|len| len > capacity) {
            return Err(FetchError::BufferOverflow { capacity });
        }

        let mut reader = response.body;
        let mut filled = 0;
        while filled < capacity {
            let n = reader
                .read(&mut self.buffer[filled..])
                .await
                .map_err(read_failure)?;
            if n == 0 {
                return Ok(&self.buffer[..filled]);
            }
            filled += n;
            watchdog.feed();
        }

        // Buffer is full: the body must end here
        let mut extra = [0u8; 1];
        match reader.read(&mut extra).await.map_err(read_failure)? {
            0 => Ok(&self.buffer[..filled]),
            _ => Err(FetchError::BufferOverflow { capacity }),
        }
    }
}
