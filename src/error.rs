use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletUiError {
    #[error("WebSocket connection error: {0}")]
    WebSocketError(#[from] fastwebsockets::WebSocketError),

    #[error("WebSocket handshake rejected: {status_line}")]
    HandshakeFailed { status_line: String },

    #[error("WebSocket handshake accept key mismatch: '{received}'")]
    AcceptKeyMismatch { received: String },

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    TlsError(#[from] rustls::Error),

    #[error("Connection timeout")]
    Timeout,

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    #[error("Maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,

    #[error("Event channel closed: {0}")]
    EventSendError(String),

    #[error("Metrics server error: {0}")]
    MetricsError(String),
}

/// Failure of a settings request before a usable response body was obtained.
///
/// Application-level failures (a well-formed body that reports an error) are
/// not transport errors; they travel inside the decoded response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("request could not be built: {0}")]
    InvalidRequest(String),
}
