//! WebSocket 实时投递
//!
//! 连接只用于接收推送：发给当前用户的新消息以 JSON 文本帧转发。
//! 客户端发出的帧（除关闭外）被忽略，消息持久化只走 HTTP 接口。

use application::{dto::MessageDto, MessageBroadcast, MessageStream};
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct WebSocketQuery {
    /// JWT access token；也可以放在 Authorization 头中
    pub token: Option<String>,
}

/// 推送给客户端的事件。
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LiveEvent {
    NewMessage { match_id: Uuid, message: MessageDto },
}

impl From<&MessageBroadcast> for LiveEvent {
    fn from(broadcast: &MessageBroadcast) -> Self {
        LiveEvent::NewMessage {
            match_id: Uuid::from(broadcast.match_id),
            message: MessageDto::from(&broadcast.message),
        }
    }
}

pub async fn websocket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WebSocketQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let claims = match query.token.as_deref() {
        Some(token) => state.jwt_service.verify_token(token)?,
        None => state.jwt_service.extract_claims_from_headers(&headers)?,
    };
    let auth = AuthUser::try_from(claims)?;

    // 升级前订阅，避免握手期间的消息丢失
    let stream = state.broadcaster.subscribe(auth.user_id.clone());
    tracing::info!(user_id = %auth.user_id, "WebSocket 连接已建立");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, auth, stream)))
}

async fn handle_socket(socket: WebSocket, auth: AuthUser, mut stream: MessageStream) {
    let (mut sender, mut incoming) = socket.split();
    let user_id = auth.user_id;

    let mut send_task = tokio::spawn(async move {
        while let Some(broadcast) = stream.recv().await {
            let payload = match serde_json::to_string(&LiveEvent::from(&broadcast)) {
                Ok(json) => json,
                Err(err) => {
                    tracing::warn!(error = %err, "failed to serialize websocket payload");
                    continue;
                }
            };
            if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = incoming.next().await {
            if matches!(message, WsMessage::Close(_)) {
                break;
            }
        }
    });

    // 任一方向结束即关闭连接
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::info!(user_id = %user_id, "WebSocket 连接已关闭");
}
