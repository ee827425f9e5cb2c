use async_trait::async_trait;
use domain::{MatchId, MessageView, UserId};
use thiserror::Error;

/// 推送给在线对端的新消息通知。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MessageBroadcast {
    pub match_id: MatchId,
    pub recipient_id: UserId,
    pub message: MessageView,
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast failed: {0}")]
    Failed(String),
}

impl BroadcastError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 实时投递通道。只在持久化成功之后调用，失败不影响已写入的消息。
#[async_trait]
pub trait MessageBroadcaster: Send + Sync {
    async fn broadcast(&self, payload: MessageBroadcast) -> Result<(), BroadcastError>;
}
