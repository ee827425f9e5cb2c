//! 资格检查与配对候选人解析。

use std::sync::Arc;

use domain::{Eligibility, MatchCandidate, MatchOutcome, UserId};
use futures::{stream, StreamExt, TryStreamExt};

use crate::{
    error::ApplicationError,
    repository::{SkillRepository, UserRepository},
};

/// 同时加载的候选人数量上限。每个候选人并发三个查询，需低于连接池容量。
pub(crate) const CANDIDATE_LOAD_CONCURRENCY: usize = 3;

pub struct MatchServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub skill_repository: Arc<dyn SkillRepository>,
}

pub struct MatchService {
    deps: MatchServiceDependencies,
}

impl MatchService {
    pub fn new(deps: MatchServiceDependencies) -> Self {
        Self { deps }
    }

    /// 没有任何技能记录的用户返回 false/false，不视为错误。
    pub async fn check_eligibility(
        &self,
        user_id: &UserId,
    ) -> Result<Eligibility, ApplicationError> {
        let eligibility = self.deps.skill_repository.eligibility(user_id).await?;
        tracing::debug!(
            user_id = %user_id,
            has_verified_teach_skill = eligibility.has_verified_teach_skill,
            has_declared_interest = eligibility.has_declared_interest,
            "资格检查完成"
        );
        Ok(eligibility)
    }

    /// 计算互换配对候选人。候选人的技能和兴趣是完整列表，不只包含匹配的那一项。
    pub async fn find_matches(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<MatchCandidate>, ApplicationError> {
        let candidate_ids = self.deps.skill_repository.find_candidate_ids(user_id).await?;
        if candidate_ids.is_empty() {
            return Ok(Vec::new());
        }

        let pending: Vec<_> = candidate_ids
            .iter()
            .filter(|candidate| *candidate != user_id)
            .map(|candidate| self.load_candidate(candidate))
            .collect();
        let loaded: Vec<Option<MatchCandidate>> = stream::iter(pending)
        .buffered(CANDIDATE_LOAD_CONCURRENCY)
        .try_collect()
        .await?;
        let mut candidates: Vec<MatchCandidate> = loaded.into_iter().flatten().collect();

        candidates.sort_by(|a, b| {
            a.profile
                .name
                .cmp(&b.profile.name)
                .then_with(|| a.profile.id.cmp(&b.profile.id))
        });

        tracing::info!(user_id = %user_id, count = candidates.len(), "配对候选人解析完成");
        Ok(candidates)
    }

    /// 先检查资格，不满足时不运行候选人解析。
    pub async fn run_matching(&self, user_id: &UserId) -> Result<MatchOutcome, ApplicationError> {
        let eligibility = self.check_eligibility(user_id).await?;
        if let Some(outcome) = MatchOutcome::from_eligibility(eligibility) {
            tracing::info!(user_id = %user_id, "用户不满足配对条件");
            return Ok(outcome);
        }

        let candidates = self.find_matches(user_id).await?;
        Ok(MatchOutcome::from_candidates(candidates))
    }

    // 资料不存在的候选人被跳过（用户在查询之间被移除）
    async fn load_candidate(
        &self,
        candidate: &UserId,
    ) -> Result<Option<MatchCandidate>, ApplicationError> {
        let (profile, skills, interests) = futures::try_join!(
            self.deps.user_repository.find_profile(candidate),
            self.deps.skill_repository.taught_skills(candidate),
            self.deps.skill_repository.interests(candidate),
        )?;

        Ok(profile.map(|profile| MatchCandidate {
            profile,
            skills,
            interests,
        }))
    }
}
