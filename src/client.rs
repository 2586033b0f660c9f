// file: src/client.rs
// description: websocket transport for the wallet server's push-event channel

use crate::{
    client_state::SharedClientState,
    config::Config,
    error::WalletUiError,
    events::{ClientEvent, EventSender},
    monitoring::{CONNECTED_GAUGE, INVALID_PACKETS_COUNTER, PACKETS_RECEIVED_COUNTER, RECONNECT_COUNTER},
    types::Packet,
};
use anyhow::Result;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use fastwebsockets::{FragmentCollector, OpCode, Role, WebSocket};
use sha1::{Digest, Sha1};
use std::{sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    time::{sleep, timeout},
};
use tracing::{debug, error, info, trace, warn};
use url::Url;

const MAX_HANDSHAKE_RESPONSE: usize = 8 * 1024;
const MAX_RECONNECT_JITTER_MS: u64 = 250;
const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

pub struct WalletSocketClient {
    pub config: Arc<Config>,
    event_sender: EventSender,
    pub state: SharedClientState,
}

impl WalletSocketClient {
    pub fn new(config: Arc<Config>, event_sender: EventSender, state: SharedClientState) -> Self {
        Self {
            config,
            event_sender,
            state,
        }
    }

    /// Keeps a session open until the UI side hangs up, reconnecting after
    /// failures. Fails once `max_reconnects` consecutive attempts failed.
    pub async fn run(&mut self) -> Result<()> {
        let _ = self.send_event(ClientEvent::Starting).await;

        loop {
            match self.connect_and_run().await {
                Ok(()) => {
                    info!("Event receiver closed, stopping transport");
                    break;
                }
                Err(e) => {
                    if self.event_sender.is_closed() {
                        debug!("Connection ended after UI shutdown: {}", e);
                        break;
                    }
                    error!("Connection error: {}", e);
                    if let Err(fatal) = self.handle_connection_error(e).await {
                        let _ = self.send_event(ClientEvent::Stopping).await;
                        return Err(fatal);
                    }
                }
            }
        }

        let _ = self.send_event(ClientEvent::Stopping).await;
        Ok(())
    }

    async fn connect_and_run(&mut self) -> Result<()> {
        let url = self.config.websocket.url.clone();
        let connect_timeout = self.config.websocket.timeout;

        let _ = self
            .send_event(ClientEvent::Connecting {
                url: url.to_string(),
            })
            .await;

        let (host, port) = endpoint(&url)?;
        let tcp = timeout(connect_timeout, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| WalletUiError::Timeout)??;
        tcp.set_nodelay(true)?;

        if url.scheme() == "wss" {
            let tls = timeout(connect_timeout, tls_connect(&host, tcp))
                .await
                .map_err(|_| WalletUiError::Timeout)??;
            self.run_session(tls, &url).await
        } else {
            self.run_session(tcp, &url).await
        }
    }

    async fn run_session<S>(&mut self, mut stream: S, url: &Url) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        timeout(
            self.config.websocket.timeout,
            perform_handshake(&mut stream, url),
        )
        .await
        .map_err(|_| WalletUiError::Timeout)??;

        let connection_id = {
            let mut state = self.state.lock().await;
            state.reset_connection();
            state.connection_id.clone()
        };
        CONNECTED_GAUGE.set(1.0);
        info!(%connection_id, "Push channel connected to {}", url);

        if self
            .send_event(ClientEvent::Connected { connection_id })
            .await
            .is_err()
        {
            return Ok(());
        }

        let mut ws = WebSocket::after_handshake(stream, Role::Client);
        ws.set_auto_close(true);
        ws.set_auto_pong(true);
        let mut ws = FragmentCollector::new(ws);

        loop {
            let frame = ws.read_frame().await.map_err(|e| {
                error!("WebSocket stream error: {}", e);
                WalletUiError::WebSocketError(e)
            })?;

            match frame.opcode {
                OpCode::Text => {
                    let text = String::from_utf8_lossy(&frame.payload).to_string();
                    if !self.handle_text(&text).await {
                        return Ok(());
                    }
                }
                OpCode::Binary => {
                    warn!("Binary frames are not part of the push channel ({} bytes)", frame.payload.len());
                }
                OpCode::Close => {
                    let _ = self.send_event(ClientEvent::Disconnected).await;
                    warn!("Server closed the push channel");
                    return Err(WalletUiError::ConnectionClosed.into());
                }
                _ => {
                    trace!("Ignoring control frame");
                }
            }
        }
    }

    /// Returns false once nobody is listening for events anymore.
    async fn handle_text(&mut self, text: &str) -> bool {
        trace!("Received text frame: {}", text);
        PACKETS_RECEIVED_COUNTER.increment(1);

        match Packet::from_text(text) {
            Ok(packet) => {
                self.state.lock().await.record_packet();
                debug!(event = %packet.event, "Packet received");
                self.send_event(ClientEvent::PacketReceived(packet))
                    .await
                    .is_ok()
            }
            Err(e) => {
                self.state.lock().await.record_invalid_packet();
                INVALID_PACKETS_COUNTER.increment(1);
                warn!(
                    "Failed to decode packet: {}. Message: {}",
                    e,
                    text.chars().take(100).collect::<String>()
                );
                true
            }
        }
    }

    async fn handle_connection_error(&mut self, error: anyhow::Error) -> Result<()> {
        let (attempt, (received, invalid)) = {
            let state = self.state.lock().await;
            (state.increment_reconnect(), state.packet_totals())
        };
        RECONNECT_COUNTER.increment(1);
        CONNECTED_GAUGE.set(0.0);
        info!(received, invalid, "Packets so far");

        let _ = self
            .send_event(ClientEvent::ConnectionFailed(error.to_string()))
            .await;

        let max_reconnects = self.config.websocket.max_reconnects;
        if max_reconnects > 0 && attempt > max_reconnects {
            error!("Maximum reconnection attempts ({}) reached", max_reconnects);
            return Err(WalletUiError::MaxReconnectsExceeded.into());
        }

        let delay = self.config.websocket.reconnect_delay
            + Duration::from_millis(fastrand::u64(0..=MAX_RECONNECT_JITTER_MS));
        warn!(
            "Reconnecting in {} ms (attempt {})",
            delay.as_millis(),
            attempt
        );

        let _ = self
            .send_event(ClientEvent::Reconnecting {
                attempt,
                delay_secs: delay.as_secs(),
            })
            .await;

        sleep(delay).await;
        Ok(())
    }

    async fn send_event(&self, event: ClientEvent) -> Result<(), WalletUiError> {
        self.event_sender
            .send(event)
            .await
            .map_err(|e| WalletUiError::EventSendError(e.to_string()))
    }
}

fn endpoint(url: &Url) -> Result<(String, u16), WalletUiError> {
    let host = url
        .host_str()
        .ok_or_else(|| WalletUiError::UnsupportedUrl(format!("{} has no host", url)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| WalletUiError::UnsupportedUrl(format!("{} has no port", url)))?;
    Ok((host.to_string(), port))
}

async fn tls_connect(
    host: &str,
    tcp: TcpStream,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>, WalletUiError> {
    let config = rustls::ClientConfig::builder_with_provider(
        rustls::crypto::ring::default_provider().into(),
    )
    .with_safe_default_protocol_versions()?
    .with_root_certificates(rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    })
    .with_no_client_auth();

    let connector = tokio_rustls::TlsConnector::from(Arc::new(config));
    let domain = rustls::pki_types::ServerName::try_from(host.to_string())
        .map_err(|e| WalletUiError::UnsupportedUrl(format!("{}: {}", host, e)))?;

    Ok(connector.connect(domain, tcp).await?)
}

/// Client opening handshake for `url` (RFC 6455 §4.1).
pub fn handshake_request(url: &Url, key: &str) -> String {
    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };
    let target = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    format!(
        "GET {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n",
        target, host, key
    )
}

async fn perform_handshake<S>(stream: &mut S, url: &Url) -> Result<(), WalletUiError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = fastwebsockets::handshake::generate_key();
    stream
        .write_all(handshake_request(url, &key).as_bytes())
        .await?;

    // Byte-wise so that no frame data following the headers is consumed.
    let mut response = Vec::with_capacity(256);
    while !response.ends_with(b"\r\n\r\n") {
        if response.len() >= MAX_HANDSHAKE_RESPONSE {
            return Err(WalletUiError::HandshakeFailed {
                status_line: "response headers too large".to_string(),
            });
        }
        response.push(stream.read_u8().await?);
    }

    let response = String::from_utf8_lossy(&response);
    let status_line = response.lines().next().unwrap_or_default();
    if !is_switching_protocols(status_line) {
        return Err(WalletUiError::HandshakeFailed {
            status_line: status_line.to_string(),
        });
    }

    let expected = accept_key(&key);
    match header_value(&response, "sec-websocket-accept") {
        Some(accept) if accept == expected => {}
        other => {
            return Err(WalletUiError::AcceptKeyMismatch {
                received: other.unwrap_or_default().to_string(),
            });
        }
    }

    debug!("Handshake accepted: {}", status_line);
    Ok(())
}

/// `Sec-WebSocket-Accept` value a server must answer `key` with (RFC 6455 §4.2.2).
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// First value of header `name` in a raw HTTP head, matched case-insensitively.
fn header_value<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().skip(1).find_map(|line| {
        let (header, value) = line.split_once(':')?;
        header
            .trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

fn is_switching_protocols(status_line: &str) -> bool {
    let mut parts = status_line.split_whitespace();
    matches!(
        (parts.next(), parts.next()),
        (Some(version), Some("101")) if version.starts_with("HTTP/1.")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cli::Args,
        client_state::ClientState,
        events::create_event_channel,
        types::UPDATE_BALANCE,
    };
    use clap::Parser;
    use fastwebsockets::{Frame, Payload};
    use tokio::{net::TcpListener, sync::Mutex};

    #[test]
    fn test_handshake_request_shape() {
        let url = Url::parse("ws://127.0.0.1:7778/ws").unwrap();
        let request = handshake_request(&url, "dGhlIHNhbXBsZSBub25jZQ==");

        assert!(request.starts_with("GET /ws HTTP/1.1\r\n"));
        assert!(request.contains("Host: 127.0.0.1:7778\r\n"));
        assert!(request.contains("Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_handshake_request_keeps_query_and_default_port() {
        let url = Url::parse("wss://wallet.example.org/ws?token=abc").unwrap();
        let request = handshake_request(&url, "k");

        assert!(request.starts_with("GET /ws?token=abc HTTP/1.1\r\n"));
        assert!(request.contains("Host: wallet.example.org\r\n"));
    }

    #[test]
    fn test_status_line_check() {
        assert!(is_switching_protocols("HTTP/1.1 101 Switching Protocols"));
        assert!(!is_switching_protocols("HTTP/1.1 404 Not Found"));
        assert!(!is_switching_protocols(""));
    }

    #[test]
    fn test_accept_key_matches_rfc_sample() {
        assert_eq!(
            accept_key("dGhlIHNhbXBsZSBub25jZQ=="),
            "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        );
    }

    #[test]
    fn test_header_lookup_ignores_case_and_status_line() {
        let head = "HTTP/1.1 101 Switching Protocols\r\nsec-websocket-accept:  abc= \r\n\r\n";
        assert_eq!(header_value(head, "Sec-WebSocket-Accept"), Some("abc="));
        assert_eq!(header_value(head, "Upgrade"), None);
    }

    #[test]
    fn test_endpoint_defaults_port() {
        let url = Url::parse("wss://wallet.example.org/ws").unwrap();
        assert_eq!(endpoint(&url).unwrap(), ("wallet.example.org".to_string(), 443));
    }

    async fn read_request_key(stream: &mut TcpStream) -> String {
        let mut request = Vec::new();
        while !request.ends_with(b"\r\n\r\n") {
            request.push(stream.read_u8().await.unwrap());
        }
        let request = String::from_utf8_lossy(&request).to_string();
        header_value(&request, "Sec-WebSocket-Key").unwrap().to_string()
    }

    fn switching_protocols(accept: &str) -> String {
        format!(
            "HTTP/1.1 101 Switching Protocols\r\n\
             Upgrade: websocket\r\n\
             Connection: Upgrade\r\n\
             Sec-WebSocket-Accept: {}\r\n\r\n",
            accept
        )
    }

    /// Accepts one connection, upgrades it, pushes the given frames and
    /// closes. Later connection attempts are refused.
    async fn push_server(frames: Vec<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            drop(listener);

            let key = read_request_key(&mut stream).await;
            stream
                .write_all(switching_protocols(&accept_key(&key)).as_bytes())
                .await
                .unwrap();

            let mut ws = WebSocket::after_handshake(stream, Role::Server);
            for text in frames {
                ws.write_frame(Frame::text(Payload::Borrowed(text.as_bytes())))
                    .await
                    .unwrap();
            }
            let _ = ws.write_frame(Frame::close(1000, b"")).await;
            // wait for the client's close reply before dropping the socket
            let _ = ws.read_frame().await;
        });

        format!("http://{}", addr)
    }

    fn client_for(server: &str, events: EventSender) -> WalletSocketClient {
        let args = Args::parse_from([
            "wallet-ui",
            "--server",
            server,
            "--reconnect-delay",
            "0",
            "--max-reconnects",
            "1",
            "--timeout",
            "5",
        ]);
        let config = Arc::new(Config::from_args(&args).unwrap());
        WalletSocketClient::new(config, events, Arc::new(Mutex::new(ClientState::new())))
    }

    #[tokio::test]
    async fn test_pushed_packets_reach_event_channel() {
        let server = push_server(vec![
            r#"{"event":"updateBalance","message":"12.5 DCR"}"#,
            "not json",
            r#"{"event":"updateConnInfo","message":{"peersConnected":4}}"#,
        ])
        .await;
        let (tx, mut rx) = create_event_channel();
        let mut client = client_for(&server, tx);
        let state = client.state.clone();

        let outcome = tokio::spawn(async move { client.run().await });

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let result = outcome.await.unwrap();

        let packets: Vec<Packet> = events
            .iter()
            .filter_map(|event| match event {
                ClientEvent::PacketReceived(packet) => Some(packet.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].event, UPDATE_BALANCE);
        assert_eq!(packets[1].message["peersConnected"], 4);

        assert!(matches!(events.first(), Some(ClientEvent::Starting)));
        assert!(events.iter().any(|e| matches!(e, ClientEvent::Connected { .. })));
        assert!(events.iter().any(|e| matches!(e, ClientEvent::Reconnecting { attempt: 1, .. })));
        assert!(matches!(events.last(), Some(ClientEvent::Stopping)));

        let error = result.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<WalletUiError>(),
            Some(WalletUiError::MaxReconnectsExceeded)
        ));
        assert_eq!(state.lock().await.packet_totals(), (2, 1));
    }

    #[tokio::test]
    async fn test_wrong_accept_key_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = read_request_key(&mut stream).await;
            stream
                .write_all(switching_protocols("s3pPLMBiTxaQ9kYGzzhZRbK+xOo=").as_bytes())
                .await
                .unwrap();
        });

        let url = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let result = perform_handshake(&mut stream, &url).await;

        assert!(matches!(
            result,
            Err(WalletUiError::AcceptKeyMismatch { received }) if received == "s3pPLMBiTxaQ9kYGzzhZRbK+xOo="
        ));
    }

    #[tokio::test]
    async fn test_rejected_handshake_is_reported() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            while !request.ends_with(b"\r\n\r\n") {
                request.push(stream.read_u8().await.unwrap());
            }
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n")
                .await
                .unwrap();
        });

        let url = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let result = perform_handshake(&mut stream, &url).await;

        assert!(matches!(
            result,
            Err(WalletUiError::HandshakeFailed { status_line }) if status_line == "HTTP/1.1 404 Not Found"
        ));
    }
}
