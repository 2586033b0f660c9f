use crate::error::WalletUiError;
use anyhow::Result;
use metrics::{Counter, Gauge, counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::LazyLock};
use tracing::{error, info};

// Global metrics
pub static PACKETS_RECEIVED_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_packets_received_total"));
pub static PACKETS_DISPATCHED_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_packets_dispatched_total"));
pub static INVALID_PACKETS_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_invalid_packets_total"));
pub static RECONNECT_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_reconnects_total"));
pub static CONNECTED_GAUGE: LazyLock<Gauge> = LazyLock::new(|| gauge!("wallet_ui_connected"));
pub static MUTATIONS_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_mutations_total"));
pub static ROLLBACK_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_rollbacks_total"));
pub static VALIDATION_FAILURE_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("wallet_ui_validation_failures_total"));

pub async fn setup_metrics(port: u16) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", "wallet-ui")
        .add_global_label("version", env!("CARGO_PKG_VERSION"));

    match builder.install() {
        Ok(_handle) => {
            info!(
                "Prometheus metrics server started on http://{}/metrics",
                addr
            );

            PACKETS_RECEIVED_COUNTER.absolute(0);
            PACKETS_DISPATCHED_COUNTER.absolute(0);
            INVALID_PACKETS_COUNTER.absolute(0);
            RECONNECT_COUNTER.absolute(0);
            MUTATIONS_COUNTER.absolute(0);
            ROLLBACK_COUNTER.absolute(0);
            VALIDATION_FAILURE_COUNTER.absolute(0);
            CONNECTED_GAUGE.set(0.0);

            Ok(())
        }
        Err(e) => {
            error!("Failed to start metrics server: {}", e);
            Err(WalletUiError::MetricsError(e.to_string()).into())
        }
    }
}
