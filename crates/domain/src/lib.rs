//! MindMate 技能交换平台核心领域模型
//!
//! 包含用户、技能、配对、消息等实体，以及资格判定和未读数计算等纯业务规则。

pub mod conversation;
pub mod errors;
pub mod matching;
pub mod message;
pub mod skill;
pub mod user;
pub mod value_objects;

pub use conversation::{sort_by_activity, unread_count, ConversationSummary};
pub use errors::{DomainError, DomainResult, RepositoryError};
pub use matching::{Eligibility, Match, MatchCandidate, MatchOutcome, MatchSummary};
pub use message::{sort_chronologically, Message, MessageView};
pub use skill::{Skill, SkillRelation, SkillVerification, TaughtSkill};
pub use user::{ProfileUpdate, User, UserProfile};
pub use value_objects::{
    DisplayName, MatchId, MessageContent, MessageId, SkillId, SkillName, Timestamp, UserEmail,
    UserId, VerificationScore,
};
