use std::sync::Arc;

use domain::{
    sort_by_activity, ConversationSummary, DomainError, Match, MatchId, MatchSummary, Message,
    MessageContent, MessageId, MessageView, RepositoryError, UserId, UserProfile,
};
use uuid::Uuid;

use crate::{
    broadcaster::{MessageBroadcast, MessageBroadcaster},
    clock::Clock,
    error::ApplicationError,
    repository::{MatchRepository, MessageRepository, UserRepository},
};

#[derive(Debug, Clone)]
pub struct CreateMatchRequest {
    pub requester_id: UserId,
    pub other_user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub match_id: MatchId,
    pub sender_id: UserId,
    pub content: String,
}

pub struct ChatServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub match_repository: Arc<dyn MatchRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
    pub clock: Arc<dyn Clock>,
    pub broadcaster: Arc<dyn MessageBroadcaster>,
}

pub struct ChatService {
    deps: ChatServiceDependencies,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        Self { deps }
    }

    /// 发现页：除调用者之外的所有用户。
    pub async fn list_users(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserProfile>, ApplicationError> {
        Ok(self.deps.user_repository.list_except(user_id).await?)
    }

    /// 创建配对。
    ///
    /// 依次检查：不能自配对、双方用户存在、两种顺序下都没有已有配对。
    /// 存储层对无序用户对有唯一约束，并发的重复请求同样得到冲突错误。
    pub async fn create_match(
        &self,
        request: CreateMatchRequest,
    ) -> Result<Match, ApplicationError> {
        let CreateMatchRequest {
            requester_id,
            other_user_id,
        } = request;

        if requester_id == other_user_id {
            return Err(DomainError::SelfMatch.into());
        }

        for user_id in [&requester_id, &other_user_id] {
            if !self.deps.user_repository.exists(user_id).await? {
                return Err(DomainError::UserNotFound(user_id.clone()).into());
            }
        }

        if self
            .deps
            .match_repository
            .find_between(&requester_id, &other_user_id)
            .await?
            .is_some()
        {
            tracing::warn!(user1 = %requester_id, user2 = %other_user_id, "重复的配对请求");
            return Err(DomainError::MatchAlreadyExists(requester_id, other_user_id).into());
        }

        let matched = Match::new(
            MatchId::from(Uuid::new_v4()),
            requester_id.clone(),
            other_user_id.clone(),
            self.deps.clock.now(),
        )?;

        let stored = match self.deps.match_repository.create(matched).await {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                tracing::warn!(user1 = %requester_id, user2 = %other_user_id, "并发创建配对冲突");
                return Err(DomainError::MatchAlreadyExists(requester_id, other_user_id).into());
            }
            Err(err) => return Err(err.into()),
        };

        tracing::info!(
            match_id = %stored.id,
            user1 = %stored.user1_id,
            user2 = %stored.user2_id,
            "配对已创建"
        );
        Ok(stored)
    }

    /// 成员关系判断。配对不存在时返回 false。
    pub async fn is_user_in_match(
        &self,
        user_id: &UserId,
        match_id: MatchId,
    ) -> Result<bool, ApplicationError> {
        let matched = self.deps.match_repository.find_by_id(match_id).await?;
        Ok(matched.is_some_and(|m| m.involves(user_id)))
    }

    /// 授权守卫：调用者不是参与者时返回拒绝访问（而不是不存在）。
    pub async fn ensure_participant(
        &self,
        user_id: &UserId,
        match_id: MatchId,
    ) -> Result<Match, ApplicationError> {
        match self.deps.match_repository.find_by_id(match_id).await? {
            Some(matched) if matched.involves(user_id) => Ok(matched),
            _ => {
                tracing::warn!(user_id = %user_id, match_id = %match_id, "非参与者访问配对被拒绝");
                Err(DomainError::NotMatchParticipant {
                    user_id: user_id.clone(),
                    match_id,
                }
                .into())
            }
        }
    }

    /// 调用者的配对列表，每项只包含对方的资料。
    pub async fn get_user_matches(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<MatchSummary>, ApplicationError> {
        Ok(self.deps.match_repository.list_for_user(user_id).await?)
    }

    /// 发送消息：先做成员检查，再校验内容，然后持久化。
    ///
    /// 持久化成功后尝试实时推送给对方；推送失败只记录日志，不影响已写入的消息。
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<MessageView, ApplicationError> {
        let matched = self
            .ensure_participant(&request.sender_id, request.match_id)
            .await?;
        let content = MessageContent::new(request.content)?;

        let sender = self
            .deps
            .user_repository
            .find_by_id(&request.sender_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(request.sender_id.clone()))?;

        let message = Message::new(
            MessageId::from(Uuid::new_v4()),
            matched.id,
            request.sender_id.clone(),
            content,
            self.deps.clock.now(),
        );
        let stored = self.deps.message_repository.create(message).await?;
        let view = MessageView::from_message(&stored, sender.name.as_str());

        tracing::info!(
            match_id = %matched.id,
            message_id = %stored.id,
            sender_id = %stored.sender_id,
            "消息已保存"
        );

        if let Some(recipient_id) = matched.other_participant(&request.sender_id) {
            let payload = MessageBroadcast {
                match_id: matched.id,
                recipient_id: recipient_id.clone(),
                message: view.clone(),
            };
            if let Err(err) = self.deps.broadcaster.broadcast(payload).await {
                tracing::warn!(
                    match_id = %matched.id,
                    message_id = %stored.id,
                    error = %err,
                    "消息已保存到数据库，但实时推送失败"
                );
            }
        }

        Ok(view)
    }

    /// 配对内全部消息，按发送时间升序。需要调用者是参与者。
    pub async fn get_messages(
        &self,
        user_id: &UserId,
        match_id: MatchId,
    ) -> Result<Vec<MessageView>, ApplicationError> {
        self.ensure_participant(user_id, match_id).await?;
        let messages = self.deps.message_repository.list_by_match(match_id).await?;
        tracing::debug!(match_id = %match_id, count = messages.len(), "读取消息历史");
        Ok(messages)
    }

    /// 会话摘要列表，最近活跃的在前。
    pub async fn get_conversations(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, ApplicationError> {
        let mut conversations = self
            .deps
            .message_repository
            .conversations_for_user(user_id)
            .await?;
        sort_by_activity(&mut conversations);
        Ok(conversations)
    }
}
