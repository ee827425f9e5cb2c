use serde::{Deserialize, Serialize};

use crate::value_objects::{MatchId, MessageContent, MessageId, Timestamp, UserId};

/// 配对内的一条消息，创建后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub match_id: MatchId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub sent_at: Timestamp,
}

impl Message {
    pub fn new(
        id: MessageId,
        match_id: MatchId,
        sender_id: UserId,
        content: MessageContent,
        sent_at: Timestamp,
    ) -> Self {
        Self {
            id,
            match_id,
            sender_id,
            content,
            sent_at,
        }
    }
}

/// 带发送者名称的消息读模型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: MessageId,
    pub match_id: MatchId,
    pub sender_id: UserId,
    pub sender_name: String,
    pub content: String,
    pub sent_at: Timestamp,
}

impl MessageView {
    pub fn from_message(message: &Message, sender_name: impl Into<String>) -> Self {
        Self {
            id: message.id,
            match_id: message.match_id,
            sender_id: message.sender_id.clone(),
            sender_name: sender_name.into(),
            content: message.content.as_str().to_owned(),
            sent_at: message.sent_at,
        }
    }
}

/// 按发送时间升序排列；时间相同时按ID保证稳定。
pub fn sort_chronologically(messages: &mut [MessageView]) {
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then_with(|| a.id.cmp(&b.id)));
}
