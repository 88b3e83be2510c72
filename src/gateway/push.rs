//! Push notifications through the Expo push service.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{rejected, GatewayError, GatewayFuture};

/// The push endpoint is fixed by the provider and not configurable.
pub const EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub sound: &'static str,
}

impl PushMessage {
    #[must_use]
    pub fn new(to: String, title: String, body: String, data: Value) -> Self {
        Self {
            to,
            title,
            body,
            data,
            sound: "default",
        }
    }
}

pub trait PushGateway: Send + Sync {
    fn send<'a>(&'a self, message: &'a PushMessage) -> GatewayFuture<'a, ()>;
}

#[derive(Deserialize)]
struct PushTicket {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct PushReceipt {
    data: PushTicket,
}

#[derive(Clone, Debug)]
pub struct ExpoPush {
    client: Client,
}

impl ExpoPush {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn deliver(&self, message: &PushMessage) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(EXPO_PUSH_URL)
            .json(message)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(format!("push request failed: {err}")))?;

        if !response.status().is_success() {
            return Err(rejected("Expo", response).await);
        }

        let receipt: PushReceipt = response
            .json()
            .await
            .map_err(|err| GatewayError::Transport(format!("invalid push response: {err}")))?;

        ticket_result(receipt.data)
    }
}

fn ticket_result(ticket: PushTicket) -> Result<(), GatewayError> {
    if ticket.status == "ok" {
        Ok(())
    } else {
        Err(GatewayError::Rejected {
            status: 200,
            message: ticket
                .message
                .unwrap_or_else(|| "push ticket rejected".to_string()),
        })
    }
}

impl PushGateway for ExpoPush {
    fn send<'a>(&'a self, message: &'a PushMessage) -> GatewayFuture<'a, ()> {
        Box::pin(self.deliver(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn message_serializes_expo_fields() -> Result<()> {
        let message = PushMessage::new(
            "ExponentPushToken[abc]".to_string(),
            "Booking confirmed".to_string(),
            "See you soon".to_string(),
            json!({ "booking_id": "b-1" }),
        );
        let value = serde_json::to_value(&message)?;
        assert_eq!(value["to"], "ExponentPushToken[abc]");
        assert_eq!(value["sound"], "default");
        assert_eq!(value["data"]["booking_id"], "b-1");
        Ok(())
    }

    #[test]
    fn ok_ticket_is_success() -> Result<()> {
        let receipt: PushReceipt = serde_json::from_value(json!({
            "data": { "status": "ok", "id": "ticket-1" }
        }))?;
        assert!(ticket_result(receipt.data).is_ok());
        Ok(())
    }

    #[test]
    fn error_ticket_carries_provider_message() -> Result<()> {
        let receipt: PushReceipt = serde_json::from_value(json!({
            "data": {
                "status": "error",
                "message": "\"ExponentPushToken[x]\" is not a registered push notification recipient",
                "details": { "error": "DeviceNotRegistered" }
            }
        }))?;
        let result = ticket_result(receipt.data);
        assert!(matches!(
            result,
            Err(GatewayError::Rejected { message, .. }) if message.contains("not a registered")
        ));
        Ok(())
    }
}
