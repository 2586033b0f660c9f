/// file: src/client_state.rs
/// description: connection state shared between the transport and its caller
use std::sync::{
    Arc,
    atomic::{AtomicU32, AtomicU64, Ordering},
};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct ClientState {
    pub connection_id: String,
    pub reconnect_count: AtomicU32,
    pub total_packets_received: AtomicU64,
    pub invalid_packets: AtomicU64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            connection_id: uuid::Uuid::new_v4().to_string(),
            reconnect_count: AtomicU32::new(0),
            total_packets_received: AtomicU64::new(0),
            invalid_packets: AtomicU64::new(0),
        }
    }
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the handshake succeeded; a fresh session resets the
    /// consecutive failure count.
    pub fn reset_connection(&mut self) {
        self.connection_id = uuid::Uuid::new_v4().to_string();
        self.reconnect_count.store(0, Ordering::Relaxed);
    }

    /// Returns the attempt number of the upcoming reconnect.
    pub fn increment_reconnect(&self) -> u32 {
        self.reconnect_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn record_packet(&self) {
        self.total_packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_packet(&self) {
        self.invalid_packets.fetch_add(1, Ordering::Relaxed);
    }

    /// `(received, invalid)` packet totals across all sessions.
    pub fn packet_totals(&self) -> (u64, u64) {
        (
            self.total_packets_received.load(Ordering::Relaxed),
            self.invalid_packets.load(Ordering::Relaxed),
        )
    }
}

pub type SharedClientState = Arc<Mutex<ClientState>>;
