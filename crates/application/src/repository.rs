//! 仓储接口。每个方法对应一个具名查询，关系连接的逻辑在实现中显式表达。

use async_trait::async_trait;
use domain::{
    ConversationSummary, Eligibility, Match, MatchId, MatchSummary, Message, MessageView,
    RepositoryError, Skill, SkillId, SkillName, SkillRelation, SkillVerification, TaughtSkill,
    Timestamp, User, UserId, UserProfile,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError>;
    // 资料投影：id, email, name, bio, city, country, profile_picture
    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
    // 除指定用户之外的所有用户，按名称排序
    async fn list_except(&self, id: &UserId) -> Result<Vec<UserProfile>, RepositoryError>;
}

#[async_trait]
pub trait SkillRepository: Send + Sync {
    async fn create(&self, skill: Skill) -> Result<Skill, RepositoryError>;
    // 名称不区分大小写
    async fn find_by_name(&self, name: &SkillName) -> Result<Option<Skill>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Skill>, RepositoryError>;

    async fn has_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError>;
    async fn add_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
        at: Timestamp,
    ) -> Result<(), RepositoryError>;
    /// 删除声明关系；删除教授关系时一并删除其验证记录。返回是否存在该关系。
    async fn remove_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError>;

    /// 用户教授的全部技能，左连接验证记录（缺失时 verified = false）。
    async fn taught_skills(&self, user_id: &UserId) -> Result<Vec<TaughtSkill>, RepositoryError>;
    async fn interests(&self, user_id: &UserId) -> Result<Vec<String>, RepositoryError>;

    async fn upsert_verification(
        &self,
        verification: SkillVerification,
    ) -> Result<SkillVerification, RepositoryError>;

    /// 是否至少有一项已验证的教授技能、是否至少有一项学习兴趣。
    async fn eligibility(&self, user_id: &UserId) -> Result<Eligibility, RepositoryError>;

    /// 双向互换连接：存在 S 使得我教（已验证）且对方想学，
    /// 并且存在 T 使得对方教（已验证）且我想学。结果去重且不含自己。
    async fn find_candidate_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, RepositoryError>;
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// 插入配对；同一无序用户对已存在时返回 `RepositoryError::Conflict`。
    async fn create(&self, matched: Match) -> Result<Match, RepositoryError>;
    async fn find_by_id(&self, id: MatchId) -> Result<Option<Match>, RepositoryError>;
    // 两种存储顺序都会检查
    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Match>, RepositoryError>;
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<MatchSummary>, RepositoryError>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError>;
    /// 配对内全部消息，连接发送者名称，按发送时间升序。
    async fn list_by_match(&self, match_id: MatchId) -> Result<Vec<MessageView>, RepositoryError>;
    /// 用户参与的每个配对的会话摘要（最后一条消息、最近活跃时间、未读数）。
    async fn conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError>;
}
