/// file: src/ui.rs
/// description: ui loop that feeds transport events into the push-channel handlers
use crate::{
    config::DisplayConfig,
    connection_info::{ConnectionInfoController, ConnectionInfoView},
    events::{ClientEvent, EventReceiver},
    formatter::{Colors, ViewFormatter},
    message_socket::MessageSocket,
};
use std::rc::Rc;
use tracing::{debug, info};

pub struct UIController {
    event_receiver: EventReceiver,
    socket: MessageSocket,
    connection_info: Rc<ConnectionInfoController>,
    formatter: ViewFormatter,
    colored: bool,
    quiet_mode: bool,
}

impl UIController {
    pub fn new(event_receiver: EventReceiver, display: &DisplayConfig) -> Self {
        let socket = MessageSocket::new();
        let connection_info = ConnectionInfoController::new(ConnectionInfoView::default());
        connection_info.attach(&socket);

        Self {
            event_receiver,
            socket,
            connection_info,
            formatter: ViewFormatter::new(display.format.clone(), display.colored),
            colored: display.colored,
            quiet_mode: display.quiet,
        }
    }

    pub fn view(&self) -> &ConnectionInfoView {
        self.connection_info.view()
    }

    pub async fn run(&mut self) {
        self.print_startup_banner();
        while let Some(event) = self.event_receiver.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
        self.connection_info.detach();
    }

    /// Returns false when the loop should stop.
    pub fn handle_event(&mut self, event: ClientEvent) -> bool {
        match event {
            ClientEvent::Starting => {
                info!("Client starting...");
            }
            ClientEvent::Connecting { url } => {
                self.print_connection_status("CONNECTING", &url);
            }
            ClientEvent::Connected { connection_id } => {
                self.print_connection_status("CONNECTED", &format!("ID: {}", connection_id));
            }
            ClientEvent::PacketReceived(packet) => {
                if self.socket.dispatch(&packet) > 0 {
                    self.formatter.print(self.connection_info.view());
                } else {
                    debug!(event = %packet.event, "Packet not handled by any view");
                }
            }
            ClientEvent::ConnectionFailed(error) => {
                self.print_error("CONNECTION FAILED", &error);
            }
            ClientEvent::Reconnecting {
                attempt,
                delay_secs,
            } => {
                self.print_reconnect_info(delay_secs, attempt);
            }
            ClientEvent::Disconnected => {
                self.print_connection_status("DISCONNECTED", "Connection closed");
            }
            ClientEvent::Stopping => {
                self.print_connection_status("STOPPING", "Client shutting down");
                return false;
            }
        }

        true
    }

    fn paint(&self, color: &'static str) -> (&'static str, &'static str, &'static str) {
        if self.colored {
            (Colors::BOLD, color, Colors::RESET)
        } else {
            ("", "", "")
        }
    }

    fn print_startup_banner(&self) {
        if self.quiet_mode {
            return;
        }

        let (bold, cyan, reset) = self.paint(Colors::BRIGHT_CYAN);
        println!();
        println!(
            "{}{}== WALLET STATUS v{} =={}",
            bold,
            cyan,
            env!("CARGO_PKG_VERSION"),
            reset
        );
        println!();
    }

    fn print_connection_status(&self, status: &str, message: &str) {
        if self.quiet_mode {
            return;
        }

        let (color, symbol) = match status {
            "CONNECTING" => (Colors::BRIGHT_YELLOW, "*"),
            "CONNECTED" => (Colors::BRIGHT_GREEN, "+"),
            "DISCONNECTED" => (Colors::BRIGHT_RED, "X"),
            "STOPPING" => (Colors::BRIGHT_MAGENTA, "!"),
            _ => (Colors::BRIGHT_BLUE, "-"),
        };
        let (bold, color, reset) = self.paint(color);

        println!("{}{}[{}]{} {} {}", bold, color, status, reset, symbol, message);
    }

    fn print_error(&self, error_type: &str, message: &str) {
        let (bold, color, reset) = self.paint(Colors::BRIGHT_RED);
        let red = if self.colored { Colors::RED } else { "" };
        println!(
            "{}{}[{}]{} ! {}{}{}",
            bold, color, error_type, reset, red, message, reset
        );
    }

    fn print_reconnect_info(&self, delay_secs: u64, attempt: u32) {
        let (bold, color, reset) = self.paint(Colors::BRIGHT_YELLOW);
        let dim = if self.colored { Colors::DIM } else { "" };
        println!(
            "{}{}[RECONNECTING]{} {}> Attempt {} in {}s...{}",
            bold, color, reset, dim, attempt, delay_secs, reset
        );
    }
}
