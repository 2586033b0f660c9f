use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wallet-ui",
    about = "live wallet status view and settings forms for a wallet web server",
    version
)]
pub struct Args {
    /// Base URL of the wallet web server
    #[arg(short, long, default_value = "http://127.0.0.1:7778")]
    pub server: String,

    /// Path of the push-event websocket on the server
    #[arg(long, default_value = "/ws")]
    pub ws_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Enable metrics server
    #[arg(long)]
    pub metrics: bool,

    /// Metrics server port
    #[arg(long, default_value = "9090")]
    pub metrics_port: u16,

    /// Request and connection timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Reconnection delay in seconds
    #[arg(long, default_value = "5")]
    pub reconnect_delay: u64,

    /// Maximum number of reconnection attempts (0 for unlimited)
    #[arg(long, default_value = "0")]
    pub max_reconnects: u32,

    /// Output format for the status view: table, json, minimal
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Disable colored output (useful for piping to files)
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode - only render the view, no connection chatter
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show connection info and balance as the server pushes updates
    Watch,

    /// Submit the change-password form once
    ChangePassword {
        /// Current password
        #[arg(long = "old", default_value = "")]
        old_password: String,

        /// New password
        #[arg(long = "new", default_value = "")]
        new_password: String,

        /// New password, repeated
        #[arg(long = "confirm", default_value = "")]
        confirm_password: String,
    },

    /// Toggle the spend-unconfirmed-funds checkbox to the given value
    SpendUnconfirmed {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}
