//! WhatsApp Cloud API text messages

use serde::Serialize;

use crate::error::BoxError;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct TextMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Clone)]
pub struct WhatsAppClient {
    http: reqwest::Client,
    token: String,
    phone_number_id: String,
}

impl WhatsAppClient {
    pub fn new(http: reqwest::Client, token: String, phone_number_id: String) -> Self {
        Self {
            http,
            token,
            phone_number_id,
        }
    }

    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), BoxError> {
        let message = TextMessage {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        };

        let resp = self
            .http
            .post(format!("{GRAPH_API_BASE}/{}/messages", self.phone_number_id))
            .bearer_auth(&self.token)
            .json(&message)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(format!("WhatsApp send failed ({status}): {detail}").into());
        }
        Ok(())
    }
}
