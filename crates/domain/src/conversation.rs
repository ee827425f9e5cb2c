//! 会话摘要与未读数计算。
//!
//! 未读数不依赖持久化的已读游标：每次读取时重新计算，
//! 统计对方在「我最后一次发言」之后发送的消息数量（从未发言则从纪元起算）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::matching::Match;
use crate::message::Message;
use crate::user::UserProfile;
use crate::value_objects::{MatchId, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub match_id: MatchId,
    pub other_user: UserProfile,
    pub last_message: Option<String>,
    pub last_message_at: Option<Timestamp>,
    /// max(配对创建时间, 最后一条消息时间)
    pub last_activity: Timestamp,
    pub unread_count: u64,
    pub matched_at: Timestamp,
}

impl ConversationSummary {
    /// 由配对及其全部消息计算摘要。`messages` 无需有序。
    pub fn summarize(
        viewer: &UserId,
        matched: &Match,
        other_user: UserProfile,
        messages: &[Message],
    ) -> Self {
        let last = messages
            .iter()
            .filter(|m| m.match_id == matched.id)
            .max_by(|a, b| a.sent_at.cmp(&b.sent_at).then_with(|| a.id.cmp(&b.id)));

        let unread_count = unread_count(viewer, matched.id, messages);
        let last_message_at = last.map(|m| m.sent_at);
        let last_activity = last_message_at
            .map_or(matched.created_at, |at| at.max(matched.created_at));

        Self {
            match_id: matched.id,
            other_user,
            last_message: last.map(|m| m.content.as_str().to_owned()),
            last_message_at,
            last_activity,
            unread_count,
            matched_at: matched.created_at,
        }
    }
}

/// 高水位未读数：对方在 `viewer` 最后发言时间之后发送的消息条数。
pub fn unread_count(viewer: &UserId, match_id: MatchId, messages: &[Message]) -> u64 {
    let high_water_mark = messages
        .iter()
        .filter(|m| m.match_id == match_id && &m.sender_id == viewer)
        .map(|m| m.sent_at)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    messages
        .iter()
        .filter(|m| m.match_id == match_id && &m.sender_id != viewer && m.sent_at > high_water_mark)
        .count() as u64
}

/// 最近活跃的会话排在前面；并列时较新的配对在前，再按ID稳定排序。
pub fn sort_by_activity(conversations: &mut [ConversationSummary]) {
    conversations.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| b.matched_at.cmp(&a.matched_at))
            .then_with(|| a.match_id.cmp(&b.match_id))
    });
}
