// 简单的本地广播器实现
use crate::{broadcaster::BroadcastError, MessageBroadcast, MessageBroadcaster};
use async_trait::async_trait;
use domain::UserId;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct LocalMessageBroadcaster {
    sender: broadcast::Sender<MessageBroadcast>,
}

impl LocalMessageBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self, user_id: UserId) -> MessageStream {
        MessageStream::new(self.sender.subscribe(), user_id)
    }
}

impl Default for LocalMessageBroadcaster {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl MessageBroadcaster for LocalMessageBroadcaster {
    async fn broadcast(&self, payload: MessageBroadcast) -> Result<(), BroadcastError> {
        // 没有任何订阅者时 send 会返回错误，这对离线对端是正常情况
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(payload)
            .map_err(|err| BroadcastError::failed(err.to_string()))?;
        Ok(())
    }
}

/// 单个用户的消息流，只产出收件人为该用户的通知。
pub struct MessageStream {
    receiver: broadcast::Receiver<MessageBroadcast>,
    user_id: UserId,
}

impl MessageStream {
    pub fn new(receiver: broadcast::Receiver<MessageBroadcast>, user_id: UserId) -> Self {
        Self { receiver, user_id }
    }

    pub async fn recv(&mut self) -> Option<MessageBroadcast> {
        loop {
            match self.receiver.recv().await {
                Ok(broadcast) => {
                    if broadcast.recipient_id == self.user_id {
                        return Some(broadcast);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %self.user_id, skipped, "消息流落后，部分实时通知被丢弃");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::{MatchId, MessageId, MessageView};
    use uuid::Uuid;

    fn broadcast_to(recipient: &str, content: &str) -> MessageBroadcast {
        let match_id = MatchId::new(Uuid::new_v4());
        MessageBroadcast {
            match_id,
            recipient_id: UserId::new(recipient),
            message: MessageView {
                id: MessageId::new(Uuid::new_v4()),
                match_id,
                sender_id: UserId::new("sender"),
                sender_name: "Sender".into(),
                content: content.into(),
                sent_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn stream_only_yields_messages_for_its_user() {
        let broadcaster = LocalMessageBroadcaster::new(16);
        let mut stream = broadcaster.subscribe(UserId::new("bob"));

        broadcaster.broadcast(broadcast_to("carol", "not for bob")).await.unwrap();
        broadcaster.broadcast(broadcast_to("bob", "for bob")).await.unwrap();

        let received = stream.recv().await.unwrap();
        assert_eq!(received.message.content, "for bob");
    }

    #[tokio::test]
    async fn broadcasting_without_subscribers_is_not_an_error() {
        let broadcaster = LocalMessageBroadcaster::new(16);
        assert!(broadcaster.broadcast(broadcast_to("bob", "offline")).await.is_ok());
    }
}
