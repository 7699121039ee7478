// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! WebSocket Transport
//!
//! Relay transport over tungstenite WebSockets. Frames travel as JSON text
//! messages. Supports both native-tls and rustls TLS backends.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

#[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
use native_tls::TlsConnector;

#[cfg(feature = "network-rustls")]
use rustls::pki_types::ServerName;
#[cfg(feature = "network-rustls")]
use std::sync::Arc;

use tracing::debug;
use tungstenite::client::IntoClientRequest;
use tungstenite::handshake::client::Request;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::error::NetworkError;
use super::message::RelayFrame;
use super::protocol::{decode_frame, encode_frame};
use super::transport::{Transport, TransportConfig, TransportResult};

/// WebSocket transport for relay communication.
///
/// Supports both ws:// (plaintext) and wss:// (TLS) connections.
///
/// # Example
///
/// ```ignore
/// use parlor_core::network::{TransportConfig, WebSocketTransport};
///
/// let mut transport = WebSocketTransport::new();
/// transport.connect(&TransportConfig::new("wss://relay.example.com"))?;
/// ```
pub struct WebSocketTransport {
    socket: Option<WebSocket<MaybeTlsStream<TcpStream>>>,
}

struct Endpoint {
    request: Request,
    host: String,
    port: u16,
    tls: bool,
}

impl WebSocketTransport {
    /// Creates a new, unconnected WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { socket: None }
    }

    /// Resolves a relay URL into its handshake request and socket address.
    fn endpoint(url: &str) -> Result<Endpoint, NetworkError> {
        let request = url.into_client_request().map_err(|e| {
            NetworkError::ConnectionFailed(format!("Invalid relay URL {url}: {e}"))
        })?;

        let uri = request.uri();
        let tls = match uri.scheme_str() {
            Some("wss") => true,
            Some("ws") => false,
            _ => {
                return Err(NetworkError::ConnectionFailed(
                    "Invalid URL scheme (expected ws:// or wss://)".into(),
                ))
            }
        };
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| NetworkError::ConnectionFailed("Missing host".into()))?
            .to_string();
        let port = uri.port_u16().unwrap_or(if tls { 443 } else { 80 });

        Ok(Endpoint {
            request,
            host,
            port,
            tls,
        })
    }

    /// Opens a TCP stream, trying each resolved address within the timeout.
    fn open_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, NetworkError> {
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?
            .collect();

        let mut last_error = NetworkError::ConnectionFailed(format!("No address for {}", host));
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    last_error = NetworkError::ConnectionTimeout;
                }
                Err(e) => last_error = NetworkError::ConnectionFailed(e.to_string()),
            }
        }
        Err(last_error)
    }

    /// Create a TLS stream using native-tls
    #[cfg(all(feature = "network-native-tls", not(feature = "network-rustls")))]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let connector = TlsConnector::new()
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS error: {}", e)))?;
        let tls_stream = connector
            .connect(host, tcp_stream)
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS handshake failed: {}", e)))?;
        Ok(MaybeTlsStream::NativeTls(tls_stream))
    }

    /// Create a TLS stream using rustls
    #[cfg(feature = "network-rustls")]
    fn create_tls_stream(
        host: &str,
        tcp_stream: TcpStream,
    ) -> Result<MaybeTlsStream<TcpStream>, NetworkError> {
        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        let config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let server_name: ServerName<'_> = host.try_into().map_err(|_| {
            NetworkError::ConnectionFailed(format!("Invalid server name: {}", host))
        })?;

        let tls_conn = rustls::ClientConnection::new(Arc::new(config), server_name.to_owned())
            .map_err(|e| NetworkError::ConnectionFailed(format!("TLS setup failed: {}", e)))?;

        let tls_stream = rustls::StreamOwned::new(tls_conn, tcp_stream);
        Ok(MaybeTlsStream::Rustls(tls_stream))
    }

    fn closed(&mut self) -> NetworkError {
        self.socket = None;
        NetworkError::ConnectionClosed
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self, config: &TransportConfig) -> TransportResult<()> {
        if self.socket.is_some() {
            return Ok(());
        }

        let endpoint = Self::endpoint(&config.server_url)?;
        let tcp_stream = Self::open_tcp(
            &endpoint.host,
            endpoint.port,
            Duration::from_millis(config.connect_timeout_ms),
        )?;

        // Handshake under the connect timeout, then switch to the I/O timeout.
        let handshake_timeout = Some(Duration::from_millis(config.connect_timeout_ms));
        tcp_stream
            .set_read_timeout(handshake_timeout)
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        tcp_stream
            .set_write_timeout(handshake_timeout)
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        let io_stream = tcp_stream
            .try_clone()
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        let stream: MaybeTlsStream<TcpStream> = if endpoint.tls {
            Self::create_tls_stream(&endpoint.host, tcp_stream)?
        } else {
            MaybeTlsStream::Plain(tcp_stream)
        };

        let (socket, _response) = tungstenite::client(endpoint.request, stream).map_err(|e| {
            NetworkError::ConnectionFailed(format!("WebSocket handshake failed: {}", e))
        })?;

        let io_timeout = Some(Duration::from_millis(config.io_timeout_ms.max(1)));
        io_stream
            .set_read_timeout(io_timeout)
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;
        io_stream
            .set_write_timeout(io_timeout)
            .map_err(|e| NetworkError::ConnectionFailed(e.to_string()))?;

        self.socket = Some(socket);
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        if let Some(mut socket) = self.socket.take() {
            let _ = socket.close(None);
            let _ = socket.flush();
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn send(&mut self, frame: &RelayFrame) -> TransportResult<()> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;
        let encoded = encode_frame(frame)?;

        let result = socket
            .send(Message::Text(encoded))
            .and_then(|_| socket.flush());

        match result {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Err(self.closed())
            }
            Err(tungstenite::Error::Io(ref e)) if e.kind() != std::io::ErrorKind::WouldBlock => {
                Err(self.closed())
            }
            Err(e) => Err(NetworkError::SendFailed(e.to_string())),
        }
    }

    fn receive(&mut self) -> TransportResult<Option<RelayFrame>> {
        let socket = self.socket.as_mut().ok_or(NetworkError::NotConnected)?;

        match socket.read() {
            Ok(Message::Text(text)) => decode_frame(&text).map(Some),
            Ok(Message::Binary(data)) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| NetworkError::InvalidMessage(e.to_string()))?;
                decode_frame(text).map(Some)
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {
                // tungstenite queues the pong reply itself
                Ok(None)
            }
            Ok(Message::Close(reason)) => {
                debug!(?reason, "relay closed the connection");
                Err(self.closed())
            }
            Err(tungstenite::Error::Io(ref e))
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Err(self.closed())
            }
            Err(tungstenite::Error::Io(_)) => Err(self.closed()),
            Err(e) => Err(NetworkError::ReceiveFailed(e.to_string())),
        }
    }

    fn has_pending(&self) -> bool {
        // WebSocket doesn't provide a non-blocking check easily;
        // callers rely on receive() with the I/O timeout.
        false
    }
}
