/// file: src/config.rs
/// description: runtime configuration derived from command-line arguments
use crate::{cli::Args, error::WalletUiError, formatter::OutputFormat};
use anyhow::Result;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub websocket: WebSocketConfig,
    pub http: HttpConfig,
    pub metrics: MetricsConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    pub url: Url,
    pub timeout: Duration,
    pub reconnect_delay: Duration,
    pub max_reconnects: u32,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub format: OutputFormat,
    pub colored: bool,
    pub quiet: bool,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let base_url = Url::parse(&args.server)?;
        let url = websocket_url(&base_url, &args.ws_path)?;
        let timeout = Duration::from_secs(args.timeout);

        Ok(Config {
            websocket: WebSocketConfig {
                url,
                timeout,
                reconnect_delay: Duration::from_secs(args.reconnect_delay),
                max_reconnects: args.max_reconnects,
            },
            http: HttpConfig { base_url, timeout },
            metrics: MetricsConfig {
                enabled: args.metrics,
                port: args.metrics_port,
            },
            display: DisplayConfig {
                format: OutputFormat::from(args.format.as_str()),
                colored: !args.no_color,
                quiet: args.quiet,
            },
        })
    }
}

/// Maps the server's HTTP(S) base URL onto the matching WS(S) endpoint.
pub fn websocket_url(base_url: &Url, path: &str) -> Result<Url, WalletUiError> {
    let scheme = match base_url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(WalletUiError::UnsupportedUrl(format!("scheme '{}'", other))),
    };

    let mut url = base_url.join(path)?;
    url.set_scheme(scheme)
        .map_err(|_| WalletUiError::UnsupportedUrl(base_url.to_string()))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_websocket_url_from_http() {
        let base = Url::parse("http://127.0.0.1:7778").unwrap();
        let url = websocket_url(&base, "/ws").unwrap();
        assert_eq!(url.as_str(), "ws://127.0.0.1:7778/ws");
    }

    #[test]
    fn test_websocket_url_from_https() {
        let base = Url::parse("https://wallet.example.org/").unwrap();
        let url = websocket_url(&base, "/ws").unwrap();
        assert_eq!(url.as_str(), "wss://wallet.example.org/ws");
    }

    #[test]
    fn test_websocket_url_rejects_other_schemes() {
        let base = Url::parse("ftp://example.org/").unwrap();
        assert!(matches!(
            websocket_url(&base, "/ws"),
            Err(WalletUiError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn test_from_args() {
        let args = Args::parse_from([
            "wallet-ui",
            "--server",
            "http://localhost:9000",
            "--timeout",
            "3",
            "--no-color",
            "--format",
            "json",
        ]);
        let config = Config::from_args(&args).unwrap();

        assert_eq!(config.websocket.url.as_str(), "ws://localhost:9000/ws");
        assert_eq!(config.http.base_url.as_str(), "http://localhost:9000/");
        assert_eq!(config.http.timeout, Duration::from_secs(3));
        assert!(!config.display.colored);
        assert!(matches!(config.display.format, OutputFormat::Json));
    }

    #[test]
    fn test_from_args_rejects_bad_url() {
        let args = Args::parse_from(["wallet-ui", "--server", "not a url"]);
        assert!(Config::from_args(&args).is_err());
    }
}
