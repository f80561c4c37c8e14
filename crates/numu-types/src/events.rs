use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{BookingStatus, Notification};

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Server confirms successful authentication
    Ready { user_id: Uuid, name: String },

    /// A notification was appended to the user's feed
    NotificationCreate { notification: Notification },

    /// A booking the user takes part in changed status
    BookingStatusChanged {
        booking_id: Uuid,
        status: BookingStatus,
    },
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Authenticate the WebSocket connection
    Identify { token: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identify_uses_adjacent_tagging() {
        let cmd: GatewayCommand =
            serde_json::from_str(r#"{"type":"Identify","data":{"token":"abc"}}"#).unwrap();
        let GatewayCommand::Identify { token } = cmd;
        assert_eq!(token, "abc");
    }

    #[test]
    fn status_change_serializes_snake_case_status() {
        let event = GatewayEvent::BookingStatusChanged {
            booking_id: Uuid::nil(),
            status: BookingStatus::Confirmed,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "BookingStatusChanged");
        assert_eq!(json["data"]["status"], "confirmed");
    }
}
