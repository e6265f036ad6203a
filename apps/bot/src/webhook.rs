use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use chrono::Utc;
use chrono_tz::Asia::Taipei;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::Data;
use crate::command::Reply;
use crate::delivery::Delivery;
use crate::push::run_push;

const USAGE_FALLBACK: &str = "指令格式錯誤, 請輸入 h 查看使用說明";
const FAILURE_FALLBACK: &str = "系統忙碌中, 請稍後再試";

pub fn router(data: Data) -> Router {
    Router::new()
        .route("/callback", post(callback))
        .route("/push_notification", put(push_notification))
        .with_state(data)
}

/// Inbound webhook events. Always answers 200 so the platform does not
/// retry a delivery whose handling failed on our side.
async fn callback(State(data): State<Data>, Json(payload): Json<WebhookPayload>) -> StatusCode {
    info!(events = payload.events.len(), "callback received");

    for event in &payload.events {
        if let Err(e) = handle_event(&data, event).await {
            error!(error = ?e, "event handling failed");
        }
    }

    StatusCode::OK
}

async fn handle_event(data: &Data, event: &WebhookEvent) -> anyhow::Result<()> {
    if event.kind != "message" {
        return Ok(());
    }

    let (Some(reply_token), Some(source), Some(message)) =
        (&event.reply_token, &event.source, &event.message)
    else {
        return Ok(());
    };

    if message.kind != "text" {
        return Ok(());
    }

    let (Some(user_id), Some(text)) = (&source.user_id, &message.text) else {
        return Ok(());
    };

    let reply = build_reply(data, user_id, text).await;

    data.line
        .reply(reply_token, &reply.text, reply.image_url.as_deref())
        .await
}

async fn build_reply(data: &Data, user_id: &str, text: &str) -> Reply {
    let display_name = match data.line.profile(user_id).await {
        Ok(profile) => profile.display_name,
        Err(e) => {
            error!(user_id = %user_id, error = ?e, "profile fetch failed");
            return Reply {
                text: FAILURE_FALLBACK.to_string(),
                image_url: None,
            };
        }
    };

    match data.interpreter.handle(user_id, &display_name, text).await {
        Ok(reply) => reply,
        Err(e) if e.is_user_error() => {
            warn!(user_id = %user_id, error = %e, "malformed command");
            Reply {
                text: USAGE_FALLBACK.to_string(),
                image_url: None,
            }
        }
        Err(e) => {
            error!(user_id = %user_id, error = ?e, "command handling failed");
            Reply {
                text: FAILURE_FALLBACK.to_string(),
                image_url: None,
            }
        }
    }
}

/// External scheduled trigger. The weekend check lives inside the push
/// path, so extra firings on weekends have no observable effect.
async fn push_notification(State(data): State<Data>) -> (StatusCode, &'static str) {
    let today = Utc::now().with_timezone(&Taipei).date_naive();

    match run_push(
        today,
        data.subscriptions.as_ref(),
        data.quotes.as_ref(),
        data.line.as_ref(),
    )
    .await
    {
        Ok(()) => (StatusCode::OK, ""),
        Err(e) => {
            error!(error = ?e, "push trigger failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "推播功能異常")
        }
    }
}

//
// Match LINE webhook event JSON
// https://developers.line.biz/en/reference/messaging-api/#webhook-event-objects
//
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub reply_token: Option<String>,

    #[serde(default)]
    pub source: Option<EventSource>,

    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}
