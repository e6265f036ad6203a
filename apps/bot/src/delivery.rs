use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;

const DEFAULT_BASE_API: &str = "https://api.line.me";

/// Outbound side of the chat platform: reply to an inbound event, or push
/// an unsolicited message to a recipient.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str, image_url: Option<&str>) -> Result<()>;
    async fn push(&self, to: &str, text: &str, image_url: Option<&str>) -> Result<()>;
}

/// LINE Messaging API client.
pub struct LineClient {
    client: Client,
    base_api: String,
}

impl LineClient {
    pub fn new(base_api: String, channel_token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {channel_token}"))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_api })
    }

    /// Expects LINE_CHANNEL_ACCESS_TOKEN to be set; LINE_API_BASE_URL
    /// overrides the host.
    pub fn from_env() -> Result<Self> {
        let base_api = std::env::var("LINE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_API.to_string());
        let channel_token = std::env::var("LINE_CHANNEL_ACCESS_TOKEN")
            .context("LINE_CHANNEL_ACCESS_TOKEN environment variable not set")?;

        Self::new(base_api, &channel_token)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_api.trim_end_matches('/'), path)
    }

    /// The sender's profile, used for the greeting line.
    pub async fn profile(&self, user_id: &str) -> Result<Profile> {
        self.client
            .get(self.endpoint(&format!("/v2/bot/profile/{user_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    async fn send(&self, path: &str, body: serde_json::Value) -> Result<()> {
        self.client
            .post(self.endpoint(path))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl Delivery for LineClient {
    async fn reply(&self, reply_token: &str, text: &str, image_url: Option<&str>) -> Result<()> {
        self.send(
            "/v2/bot/message/reply",
            json!({
                "replyToken": reply_token,
                "messages": messages(text, image_url),
            }),
        )
        .await
    }

    async fn push(&self, to: &str, text: &str, image_url: Option<&str>) -> Result<()> {
        self.send(
            "/v2/bot/message/push",
            json!({
                "to": to,
                "messages": messages(text, image_url),
            }),
        )
        .await
    }
}

fn messages(text: &str, image_url: Option<&str>) -> Vec<OutMessage> {
    let mut messages = vec![OutMessage::Text {
        text: text.to_string(),
    }];

    if let Some(url) = image_url {
        messages.push(OutMessage::Image {
            original_content_url: url.to_string(),
            preview_image_url: url.to_string(),
        });
    }

    messages
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
}

//
// Match LINE Messaging API message objects
// https://developers.line.biz/en/reference/messaging-api/#message-objects
//
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_image_messages_match_the_wire_shape() {
        let value =
            serde_json::to_value(messages("hi", Some("https://i.imgur.com/a.png"))).unwrap();

        assert_eq!(
            value,
            serde_json::json!([
                {"type": "text", "text": "hi"},
                {
                    "type": "image",
                    "originalContentUrl": "https://i.imgur.com/a.png",
                    "previewImageUrl": "https://i.imgur.com/a.png"
                }
            ])
        );
    }

    #[test]
    fn text_only_when_there_is_no_image() {
        assert_eq!(messages("hi", None).len(), 1);
    }

    #[test]
    fn profile_parses_display_name() {
        let profile: Profile =
            serde_json::from_str(r#"{"userId":"U1","displayName":"小明"}"#).unwrap();

        assert_eq!(profile.display_name, "小明");
    }
}
