/// file: src/events.rs
/// description: events passed from the websocket transport to the UI loop
use crate::types::Packet;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Starting,
    Connecting { url: String },
    Connected { connection_id: String },
    PacketReceived(Packet),
    ConnectionFailed(String),
    Reconnecting { attempt: u32, delay_secs: u64 },
    Disconnected,
    Stopping,
}

// Status pushes arrive a few times per block; this only has to absorb bursts
// while the UI is rendering.
const EVENT_CHANNEL_CAPACITY: usize = 1_024;

pub type EventSender = mpsc::Sender<ClientEvent>;
pub type EventReceiver = mpsc::Receiver<ClientEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}
