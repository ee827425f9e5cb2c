use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::broadcaster::BroadcastError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// 调用方用于映射响应状态的错误类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    AccessDenied,
    Conflict,
    Unexpected,
}

impl ApplicationError {
    /// 创建基础设施错误
    pub fn infrastructure(message: impl Into<String>) -> Self {
        ApplicationError::Infrastructure(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(err) => match err {
                DomainError::InvalidArgument { .. } | DomainError::SelfMatch => {
                    ErrorKind::Validation
                }
                DomainError::UserNotFound(_)
                | DomainError::MatchNotFound(_)
                | DomainError::SkillNotDeclared { .. } => ErrorKind::NotFound,
                DomainError::NotMatchParticipant { .. } => ErrorKind::AccessDenied,
                DomainError::MatchAlreadyExists(_, _) => ErrorKind::Conflict,
            },
            ApplicationError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            ApplicationError::Repository(RepositoryError::Conflict) => ErrorKind::Conflict,
            ApplicationError::Repository(RepositoryError::Storage { .. })
            | ApplicationError::Broadcast(_)
            | ApplicationError::Infrastructure(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{MatchId, UserId};
    use uuid::Uuid;

    #[test]
    fn kinds_follow_the_error_taxonomy() {
        let denied = ApplicationError::from(DomainError::NotMatchParticipant {
            user_id: UserId::new("c"),
            match_id: MatchId::new(Uuid::nil()),
        });
        assert_eq!(denied.kind(), ErrorKind::AccessDenied);

        let conflict = ApplicationError::from(DomainError::MatchAlreadyExists(
            UserId::new("a"),
            UserId::new("b"),
        ));
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let missing = ApplicationError::from(DomainError::UserNotFound(UserId::new("ghost")));
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(missing.to_string().contains("ghost"));

        let storage = ApplicationError::from(RepositoryError::storage("connection refused"));
        assert_eq!(storage.kind(), ErrorKind::Unexpected);
    }
}
