/// file: src/types.rs
/// description: wire types for push-channel packets and settings requests/responses
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event name carrying connection status (peers, balance, block, network).
pub const UPDATE_CONN_INFO: &str = "updateConnInfo";
/// Event name carrying the wallet's total balance.
pub const UPDATE_BALANCE: &str = "updateBalance";

/// Envelope of every push-channel message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub event: String,
    #[serde(default)]
    pub message: Value,
}

impl Packet {
    pub fn new(event: impl Into<String>, message: Value) -> Self {
        Self {
            event: event.into(),
            message,
        }
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Payload of `updateConnInfo`.
///
/// Fields stay raw so they can be displayed exactly as the server sent them.
/// Missing fields decode to `None`; a payload that is not an object decodes
/// to all `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusEvent {
    #[serde(default)]
    pub peers_connected: Option<Value>,
    #[serde(default)]
    pub total_balance: Option<Value>,
    #[serde(default)]
    pub latest_block: Option<Value>,
    #[serde(default)]
    pub network_type: Option<Value>,
}

impl ConnectionStatusEvent {
    pub fn from_payload(payload: &Value) -> Self {
        // serde would also fill the fields from an array, by position
        if !payload.is_object() {
            return Self::default();
        }
        serde_json::from_value(payload.clone()).unwrap_or_default()
    }
}

/// Renders a payload value the way assigning it to an element's text would:
/// strings without quotes, numbers and booleans as written, nothing for a
/// missing value or `null`.
pub fn text_content(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Credential triple submitted by the change-password form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Body of a `POST /change-password` response. Any `error` means failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChangePasswordResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Form body of `PUT /settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub spend_unconfirmed: bool,
}

impl SettingsUpdate {
    /// `spendUnconfirmed=true` or `spendUnconfirmed=false`.
    pub fn to_form_body(&self) -> String {
        format!("spendUnconfirmed={}", self.spend_unconfirmed)
    }
}

/// Body of a `PUT /settings` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_packet_from_wire_text() {
        let packet = Packet::from_text(
            r#"{"event":"updateConnInfo","message":{"peersConnected":3,"networkType":"testnet3"}}"#,
        )
        .unwrap();

        assert_eq!(packet.event, UPDATE_CONN_INFO);
        assert_eq!(packet.message["peersConnected"], json!(3));
    }

    #[test]
    fn test_packet_without_message_defaults_to_null() {
        let packet = Packet::from_text(r#"{"event":"updateBalance"}"#).unwrap();
        assert_eq!(packet.message, Value::Null);
    }

    #[test]
    fn test_packet_missing_event_is_rejected() {
        assert!(Packet::from_text(r#"{"message":1}"#).is_err());
    }

    #[test]
    fn test_connection_status_event_keeps_raw_values() {
        let event = ConnectionStatusEvent::from_payload(&json!({
            "peersConnected": 5,
            "totalBalance": "10.5",
            "latestBlock": 123,
        }));

        assert_eq!(event.peers_connected, Some(json!(5)));
        assert_eq!(event.total_balance, Some(json!("10.5")));
        assert_eq!(event.latest_block, Some(json!(123)));
        assert_eq!(event.network_type, None);
    }

    #[test]
    fn test_connection_status_event_from_non_object() {
        let event = ConnectionStatusEvent::from_payload(&json!("garbage"));
        assert_eq!(event, ConnectionStatusEvent::default());
    }

    #[test]
    fn test_connection_status_event_ignores_positional_array() {
        let event = ConnectionStatusEvent::from_payload(&json!([5, "10.5", "123", "mainnet"]));
        assert_eq!(event, ConnectionStatusEvent::default());
    }

    #[test]
    fn test_text_content_is_verbatim() {
        assert_eq!(text_content(Some(&json!("10.5 DCR"))), "10.5 DCR");
        assert_eq!(text_content(Some(&json!(42))), "42");
        assert_eq!(text_content(Some(&json!(1.25))), "1.25");
        assert_eq!(text_content(Some(&json!(true))), "true");
        assert_eq!(text_content(Some(&Value::Null)), "");
        assert_eq!(text_content(None), "");
        assert_eq!(text_content(Some(&json!({"total": "1 DCR"}))), r#"{"total":"1 DCR"}"#);
    }

    #[test]
    fn test_settings_update_form_body() {
        assert_eq!(
            SettingsUpdate { spend_unconfirmed: true }.to_form_body(),
            "spendUnconfirmed=true"
        );
        assert_eq!(
            SettingsUpdate { spend_unconfirmed: false }.to_form_body(),
            "spendUnconfirmed=false"
        );
    }

    #[test]
    fn test_change_password_response_error_presence() {
        let failed: ChangePasswordResponse =
            serde_json::from_str(r#"{"error":"wrong old password"}"#).unwrap();
        assert_eq!(failed.error.as_deref(), Some("wrong old password"));

        let ok: ChangePasswordResponse = serde_json::from_str("{}").unwrap();
        assert!(ok.error.is_none());
    }

    #[test]
    fn test_settings_response_defaults_to_failure() {
        let response: SettingsResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);
        assert!(response.error.is_none());
    }
}
