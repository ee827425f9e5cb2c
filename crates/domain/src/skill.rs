use serde::{Deserialize, Serialize};

use crate::value_objects::{SkillId, SkillName, Timestamp, UserId, VerificationScore};

/// 技能目录项，所有用户共享，创建后不可修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: SkillName,
    pub created_at: Timestamp,
}

impl Skill {
    pub fn new(id: SkillId, name: SkillName, now: Timestamp) -> Self {
        Self {
            id,
            name,
            created_at: now,
        }
    }
}

/// 用户声明可以教授的技能及其验证状态。
///
/// 没有验证记录时 `verified` 为 `false`，`score` 为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaughtSkill {
    pub skill_id: SkillId,
    pub name: String,
    pub verified: bool,
    pub score: Option<f64>,
}

/// 技能验证结果，每个 (用户, 技能) 至多一条。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillVerification {
    pub user_id: UserId,
    pub skill_id: SkillId,
    pub verified: bool,
    pub score: VerificationScore,
    pub recorded_at: Timestamp,
}

/// 用户声明关系（教授或学习）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillRelation {
    Teaches,
    Learns,
}
