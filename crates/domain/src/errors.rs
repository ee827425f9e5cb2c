//! 领域模型错误定义
//!
//! `DomainError` 描述业务规则被违反的情形，`RepositoryError` 描述存储层失败。

use thiserror::Error;

use crate::value_objects::{MatchId, UserId};

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 参数校验失败
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 用户不存在，携带缺失的用户ID
    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// 技能关系不存在（用户未声明该技能）
    #[error("skill '{skill}' is not declared by user {user_id}")]
    SkillNotDeclared { user_id: UserId, skill: String },

    /// 用户不能与自己配对
    #[error("a user cannot match with themselves")]
    SelfMatch,

    /// 同一无序用户对已存在配对
    #[error("users {0} and {1} are already matched")]
    MatchAlreadyExists(UserId, UserId),

    /// 调用者不是该配对的参与者
    #[error("user {user_id} is not a participant of match {match_id}")]
    NotMatchParticipant { user_id: UserId, match_id: MatchId },
}

impl DomainError {
    /// 创建参数校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    /// 唯一约束冲突
    #[error("record conflicts with an existing row")]
    Conflict,

    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
