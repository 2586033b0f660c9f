#![doc = include_str!("../docs/rustdoc.md")]

/// Settings requests over HTTP.
pub mod api;
/// Element handles injected into controllers.
pub mod bindings;
/// Command-line argument definitions.
pub mod cli;
/// WebSocket transport for the push channel.
pub mod client;
/// Shared transport state and counters.
pub mod client_state;
/// Runtime configuration model.
pub mod config;
/// Connection-info view driven by push events.
pub mod connection_info;
/// Error types used across the crate.
pub mod error;
/// Event bus messages between transport and UI.
pub mod events;
/// Terminal output formatters.
pub mod formatter;
/// Push-channel handler registry.
pub mod message_socket;
/// Metrics and exporter setup.
pub mod monitoring;
/// Toast notifications.
pub mod notify;
/// Settings form controller.
pub mod settings;
/// Test doubles for the settings API.
pub mod test_utils;
/// Tracing/logging initialization.
pub mod tracing_setup;
/// Wire data models.
pub mod types;
/// UI loop and status presentation.
pub mod ui;

/// Primary crate error type.
pub use error::{TransportError, WalletUiError};
