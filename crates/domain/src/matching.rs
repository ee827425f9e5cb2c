//! 配对、候选人与资格判定。

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::skill::TaughtSkill;
use crate::user::UserProfile;
use crate::value_objects::{MatchId, Timestamp, UserId};

/// 两个用户之间的配对，是会话的寻址单元。
///
/// (user1, user2) 按创建请求的顺序保存，但同一无序用户对至多存在一条。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub user1_id: UserId,
    pub user2_id: UserId,
    pub created_at: Timestamp,
}

impl Match {
    pub fn new(
        id: MatchId,
        user1_id: UserId,
        user2_id: UserId,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        if user1_id == user2_id {
            return Err(DomainError::SelfMatch);
        }
        Ok(Self {
            id,
            user1_id,
            user2_id,
            created_at,
        })
    }

    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.user1_id == user_id || &self.user2_id == user_id
    }

    /// 返回另一位参与者；`user_id` 不在配对中时返回 `None`。
    pub fn other_participant(&self, user_id: &UserId) -> Option<&UserId> {
        if &self.user1_id == user_id {
            Some(&self.user2_id)
        } else if &self.user2_id == user_id {
            Some(&self.user1_id)
        } else {
            None
        }
    }

    /// 与存储顺序无关地判断是否为同一用户对。
    pub fn is_pair(&self, a: &UserId, b: &UserId) -> bool {
        (&self.user1_id == a && &self.user2_id == b) || (&self.user1_id == b && &self.user2_id == a)
    }
}

/// 从请求者视角看到的配对：只包含对方的资料。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub created_at: Timestamp,
    pub other_user: UserProfile,
}

/// 配对候选人，附带其完整的技能和兴趣列表（不只是匹配上的那一项）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub profile: UserProfile,
    pub skills: Vec<TaughtSkill>,
    pub interests: Vec<String>,
}

/// 资格检查结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Eligibility {
    pub has_verified_teach_skill: bool,
    pub has_declared_interest: bool,
}

pub const MISSING_BOTH_REASON: &str =
    "To find matches you need at least one verified skill you can teach and at least one skill you want to learn.";
pub const MISSING_VERIFIED_SKILL_REASON: &str =
    "To find matches you need at least one verified skill you can teach. Verify one of your teaching skills first.";
pub const MISSING_INTEREST_REASON: &str =
    "To find matches you need at least one skill you want to learn. Add a learning interest first.";
pub const NO_MATCHES_MESSAGE: &str = "No matches found yet. Check back later as more people join.";

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        self.has_verified_teach_skill && self.has_declared_interest
    }

    /// 不满足条件时返回面向用户的原因，三种情况的文案互不相同。
    pub fn ineligibility_reason(&self) -> Option<&'static str> {
        match (self.has_verified_teach_skill, self.has_declared_interest) {
            (true, true) => None,
            (false, false) => Some(MISSING_BOTH_REASON),
            (false, true) => Some(MISSING_VERIFIED_SKILL_REASON),
            (true, false) => Some(MISSING_INTEREST_REASON),
        }
    }
}

/// 一次配对查找的结果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Ineligible { reason: String },
    NoMatches,
    Matches { candidates: Vec<MatchCandidate> },
}

impl MatchOutcome {
    pub fn from_eligibility(eligibility: Eligibility) -> Option<Self> {
        eligibility.ineligibility_reason().map(|reason| Self::Ineligible {
            reason: reason.to_owned(),
        })
    }

    pub fn from_candidates(candidates: Vec<MatchCandidate>) -> Self {
        if candidates.is_empty() {
            Self::NoMatches
        } else {
            Self::Matches { candidates }
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Ineligible { reason } => reason.clone(),
            Self::NoMatches => NO_MATCHES_MESSAGE.to_owned(),
            Self::Matches { candidates } if candidates.len() == 1 => "Found 1 match.".to_owned(),
            Self::Matches { candidates } => format!("Found {} matches.", candidates.len()),
        }
    }

    pub fn candidates(&self) -> &[MatchCandidate] {
        match self {
            Self::Matches { candidates } => candidates,
            Self::Ineligible { .. } | Self::NoMatches => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<MatchCandidate> {
        match self {
            Self::Matches { candidates } => candidates,
            Self::Ineligible { .. } | Self::NoMatches => Vec::new(),
        }
    }
}
