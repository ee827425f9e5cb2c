//! 用户资料、技能声明与技能验证记录。

use std::sync::Arc;

use domain::{
    DisplayName, DomainError, ProfileUpdate, RepositoryError, Skill, SkillId, SkillName,
    SkillRelation, SkillVerification, TaughtSkill, User, UserEmail, UserId, VerificationScore,
};
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::ApplicationError,
    repository::{SkillRepository, UserRepository},
};

#[derive(Debug, Clone)]
pub struct SyncUserRequest {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordVerificationRequest {
    pub user_id: UserId,
    pub skill_name: String,
    pub verified: bool,
    pub score: f64,
}

/// 用户资料及其技能、兴趣。
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: User,
    pub teaches: Vec<TaughtSkill>,
    pub learns: Vec<String>,
}

pub struct ProfileServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub skill_repository: Arc<dyn SkillRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct ProfileService {
    deps: ProfileServiceDependencies,
}

impl ProfileService {
    pub fn new(deps: ProfileServiceDependencies) -> Self {
        Self { deps }
    }

    /// 首次登录时创建用户；已存在时原样返回。
    pub async fn sync_user(&self, request: SyncUserRequest) -> Result<User, ApplicationError> {
        if let Some(existing) = self.deps.user_repository.find_by_id(&request.user_id).await? {
            return Ok(existing);
        }

        let email = UserEmail::parse(request.email)?;
        let name = match request.name.filter(|name| !name.trim().is_empty()) {
            Some(name) => DisplayName::parse(name)?,
            None => DisplayName::parse(email.local_part())?,
        };

        let user = User::register(request.user_id, email, name, self.deps.clock.now());
        // 邮箱已被其他账号占用时返回冲突
        let created = self.deps.user_repository.create(user).await?;

        tracing::info!(user_id = %created.id, "新用户已创建");
        Ok(created)
    }

    pub async fn get_profile(&self, user_id: &UserId) -> Result<Profile, ApplicationError> {
        let user = self.require_user(user_id).await?;
        let (teaches, learns) = futures::try_join!(
            self.deps.skill_repository.taught_skills(user_id),
            self.deps.skill_repository.interests(user_id),
        )?;
        Ok(Profile {
            user,
            teaches,
            learns,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, ApplicationError> {
        let mut user = self.require_user(user_id).await?;
        let update = ProfileUpdate {
            name: request.name.map(DisplayName::parse).transpose()?,
            bio: request.bio,
            city: request.city,
            country: request.country,
            profile_picture: request.profile_picture,
        };
        user.apply_update(update);

        let updated = self.deps.user_repository.update(user).await?;
        tracing::info!(user_id = %updated.id, "用户资料已更新");
        Ok(updated)
    }

    pub async fn list_skills(&self) -> Result<Vec<Skill>, ApplicationError> {
        Ok(self.deps.skill_repository.list().await?)
    }

    pub async fn add_teach_skill(
        &self,
        user_id: &UserId,
        skill_name: &str,
    ) -> Result<Skill, ApplicationError> {
        self.declare(user_id, skill_name, SkillRelation::Teaches).await
    }

    pub async fn add_learn_skill(
        &self,
        user_id: &UserId,
        skill_name: &str,
    ) -> Result<Skill, ApplicationError> {
        self.declare(user_id, skill_name, SkillRelation::Learns).await
    }

    pub async fn remove_teach_skill(
        &self,
        user_id: &UserId,
        skill_name: &str,
    ) -> Result<(), ApplicationError> {
        self.retract(user_id, skill_name, SkillRelation::Teaches).await
    }

    pub async fn remove_learn_skill(
        &self,
        user_id: &UserId,
        skill_name: &str,
    ) -> Result<(), ApplicationError> {
        self.retract(user_id, skill_name, SkillRelation::Learns).await
    }

    /// 记录外部验证流程的结果。评分本身不在此处计算。
    pub async fn record_verification(
        &self,
        request: RecordVerificationRequest,
    ) -> Result<SkillVerification, ApplicationError> {
        let name = SkillName::parse(request.skill_name)?;
        let score = VerificationScore::new(request.score)?;
        let not_declared = || DomainError::SkillNotDeclared {
            user_id: request.user_id.clone(),
            skill: name.as_str().to_owned(),
        };

        let skill = self
            .deps
            .skill_repository
            .find_by_name(&name)
            .await?
            .ok_or_else(not_declared)?;
        if !self
            .deps
            .skill_repository
            .has_relation(&request.user_id, skill.id, SkillRelation::Teaches)
            .await?
        {
            return Err(not_declared().into());
        }

        let verification = SkillVerification {
            user_id: request.user_id.clone(),
            skill_id: skill.id,
            verified: request.verified,
            score,
            recorded_at: self.deps.clock.now(),
        };
        let stored = self
            .deps
            .skill_repository
            .upsert_verification(verification)
            .await?;

        tracing::info!(
            user_id = %stored.user_id,
            skill = %name,
            verified = stored.verified,
            score = stored.score.value(),
            "技能验证结果已记录"
        );
        Ok(stored)
    }

    async fn require_user(&self, user_id: &UserId) -> Result<User, ApplicationError> {
        self.deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(user_id.clone()).into())
    }

    // 技能目录项在首次被引用时隐式创建
    async fn find_or_create_skill(&self, name: SkillName) -> Result<Skill, ApplicationError> {
        if let Some(skill) = self.deps.skill_repository.find_by_name(&name).await? {
            return Ok(skill);
        }

        let skill = Skill::new(SkillId::from(Uuid::new_v4()), name.clone(), self.deps.clock.now());
        match self.deps.skill_repository.create(skill).await {
            Ok(created) => {
                tracing::info!(skill = %created.name, "技能目录新增条目");
                Ok(created)
            }
            // 并发创建同名技能，读取胜出的那一条
            Err(RepositoryError::Conflict) => self
                .deps
                .skill_repository
                .find_by_name(&name)
                .await?
                .ok_or_else(|| ApplicationError::from(RepositoryError::NotFound)),
            Err(err) => Err(err.into()),
        }
    }

    /// 重复声明是幂等的：关系已存在时直接返回。
    async fn declare(
        &self,
        user_id: &UserId,
        skill_name: &str,
        relation: SkillRelation,
    ) -> Result<Skill, ApplicationError> {
        let name = SkillName::parse(skill_name)?;
        if !self.deps.user_repository.exists(user_id).await? {
            return Err(DomainError::UserNotFound(user_id.clone()).into());
        }

        let skill = self.find_or_create_skill(name).await?;
        if self
            .deps
            .skill_repository
            .has_relation(user_id, skill.id, relation)
            .await?
        {
            return Ok(skill);
        }

        match self
            .deps
            .skill_repository
            .add_relation(user_id, skill.id, relation, self.deps.clock.now())
            .await
        {
            Ok(()) | Err(RepositoryError::Conflict) => {}
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user_id = %user_id, skill = %skill.name, relation = ?relation, "技能声明已添加");
        Ok(skill)
    }

    async fn retract(
        &self,
        user_id: &UserId,
        skill_name: &str,
        relation: SkillRelation,
    ) -> Result<(), ApplicationError> {
        let name = SkillName::parse(skill_name)?;
        let not_declared = || DomainError::SkillNotDeclared {
            user_id: user_id.clone(),
            skill: name.as_str().to_owned(),
        };

        let skill = self
            .deps
            .skill_repository
            .find_by_name(&name)
            .await?
            .ok_or_else(not_declared)?;
        if !self
            .deps
            .skill_repository
            .remove_relation(user_id, skill.id, relation)
            .await?
        {
            return Err(not_declared().into());
        }

        tracing::info!(user_id = %user_id, skill = %skill.name, relation = ?relation, "技能声明已移除");
        Ok(())
    }
}
