//! 内存仓储实现，用于测试和本地开发。
//!
//! 与 PostgreSQL 实现保持相同的语义：唯一约束、连接规则和排序。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use domain::{
    sort_chronologically, ConversationSummary, Eligibility, Match, MatchId, MatchSummary, Message,
    MessageView, RepositoryError, Skill, SkillId, SkillName, SkillRelation, SkillVerification,
    TaughtSkill, Timestamp, User, UserId, UserProfile,
};
use tokio::sync::RwLock;

use crate::repository::{MatchRepository, MessageRepository, SkillRepository, UserRepository};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    skills: Vec<Skill>,
    teaches: HashSet<(UserId, SkillId)>,
    learns: HashSet<(UserId, SkillId)>,
    verifications: HashMap<(UserId, SkillId), SkillVerification>,
    matches: Vec<Match>,
    messages: Vec<Message>,
}

impl State {
    fn relations(&self, relation: SkillRelation) -> &HashSet<(UserId, SkillId)> {
        match relation {
            SkillRelation::Teaches => &self.teaches,
            SkillRelation::Learns => &self.learns,
        }
    }

    fn relations_mut(&mut self, relation: SkillRelation) -> &mut HashSet<(UserId, SkillId)> {
        match relation {
            SkillRelation::Teaches => &mut self.teaches,
            SkillRelation::Learns => &mut self.learns,
        }
    }

    fn skill_name(&self, skill_id: SkillId) -> Option<&str> {
        self.skills
            .iter()
            .find(|skill| skill.id == skill_id)
            .map(|skill| skill.name.as_str())
    }

    fn verified_teaching(&self, user_id: &UserId) -> HashSet<SkillId> {
        self.teaches
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .filter(|(owner, skill)| {
                self.verifications
                    .get(&(owner.clone(), *skill))
                    .is_some_and(|v| v.verified)
            })
            .map(|(_, skill)| *skill)
            .collect()
    }

    fn learning(&self, user_id: &UserId) -> HashSet<SkillId> {
        self.learns
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, skill)| *skill)
            .collect()
    }

    fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        self.users.get(user_id).map(User::profile)
    }
}

/// 实现全部仓储接口的内存存储。
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        let email_taken = state
            .users
            .values()
            .any(|existing| existing.email.as_str().eq_ignore_ascii_case(user.email.as_str()));
        if state.users.contains_key(&user.id) || email_taken {
            return Err(RepositoryError::Conflict);
        }
        state.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state.read().await.users.get(id).cloned())
    }

    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self.state.read().await.users.contains_key(id))
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.state.read().await.profile(id))
    }

    async fn list_except(&self, id: &UserId) -> Result<Vec<UserProfile>, RepositoryError> {
        let state = self.state.read().await;
        let mut users: Vec<UserProfile> = state
            .users
            .values()
            .filter(|user| &user.id != id)
            .map(User::profile)
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl SkillRepository for MemoryStore {
    async fn create(&self, skill: Skill) -> Result<Skill, RepositoryError> {
        let mut state = self.state.write().await;
        if state.skills.iter().any(|s| s.name.key() == skill.name.key()) {
            return Err(RepositoryError::Conflict);
        }
        state.skills.push(skill.clone());
        Ok(skill)
    }

    async fn find_by_name(&self, name: &SkillName) -> Result<Option<Skill>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.skills.iter().find(|s| s.name.key() == name.key()).cloned())
    }

    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        let mut skills = self.state.read().await.skills.clone();
        skills.sort_by(|a, b| a.name.key().cmp(&b.name.key()));
        Ok(skills)
    }

    async fn has_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.relations(relation).contains(&(user_id.clone(), skill_id)))
    }

    async fn add_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
        _at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(user_id) || state.skill_name(skill_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        if !state.relations_mut(relation).insert((user_id.clone(), skill_id)) {
            return Err(RepositoryError::Conflict);
        }
        Ok(())
    }

    async fn remove_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let key = (user_id.clone(), skill_id);
        let removed = state.relations_mut(relation).remove(&key);
        if removed && relation == SkillRelation::Teaches {
            state.verifications.remove(&key);
        }
        Ok(removed)
    }

    async fn taught_skills(&self, user_id: &UserId) -> Result<Vec<TaughtSkill>, RepositoryError> {
        let state = self.state.read().await;
        let mut skills: Vec<TaughtSkill> = state
            .teaches
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .filter_map(|(owner, skill_id)| {
                let name = state.skill_name(*skill_id)?;
                let verification = state.verifications.get(&(owner.clone(), *skill_id));
                Some(TaughtSkill {
                    skill_id: *skill_id,
                    name: name.to_owned(),
                    verified: verification.is_some_and(|v| v.verified),
                    score: verification.map(|v| v.score.value()),
                })
            })
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }

    async fn interests(&self, user_id: &UserId) -> Result<Vec<String>, RepositoryError> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .learning(user_id)
            .into_iter()
            .filter_map(|skill_id| state.skill_name(skill_id).map(str::to_owned))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn upsert_verification(
        &self,
        verification: SkillVerification,
    ) -> Result<SkillVerification, RepositoryError> {
        let mut state = self.state.write().await;
        let key = (verification.user_id.clone(), verification.skill_id);
        if !state.teaches.contains(&key) {
            return Err(RepositoryError::NotFound);
        }
        state.verifications.insert(key, verification.clone());
        Ok(verification)
    }

    async fn eligibility(&self, user_id: &UserId) -> Result<Eligibility, RepositoryError> {
        let state = self.state.read().await;
        Ok(Eligibility {
            has_verified_teach_skill: !state.verified_teaching(user_id).is_empty(),
            has_declared_interest: !state.learning(user_id).is_empty(),
        })
    }

    async fn find_candidate_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, RepositoryError> {
        let state = self.state.read().await;
        let my_teaching = state.verified_teaching(user_id);
        let my_learning = state.learning(user_id);

        let mut candidates: Vec<UserId> = state
            .users
            .keys()
            .filter(|other| *other != user_id)
            .filter(|other| {
                let they_learn = state.learning(other);
                let they_teach = state.verified_teaching(other);
                !my_teaching.is_disjoint(&they_learn) && !they_teach.is_disjoint(&my_learning)
            })
            .cloned()
            .collect();
        candidates.sort();
        Ok(candidates)
    }
}

#[async_trait]
impl MatchRepository for MemoryStore {
    async fn create(&self, matched: Match) -> Result<Match, RepositoryError> {
        let mut state = self.state.write().await;
        if matched.user1_id == matched.user2_id {
            return Err(RepositoryError::storage("match participants must differ"));
        }
        if state
            .matches
            .iter()
            .any(|m| m.is_pair(&matched.user1_id, &matched.user2_id))
        {
            return Err(RepositoryError::Conflict);
        }
        state.matches.push(matched.clone());
        Ok(matched)
    }

    async fn find_by_id(&self, id: MatchId) -> Result<Option<Match>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.id == id).cloned())
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Match>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.is_pair(a, b)).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<MatchSummary>, RepositoryError> {
        let state = self.state.read().await;
        let mut summaries: Vec<MatchSummary> = state
            .matches
            .iter()
            .filter_map(|m| {
                let other = m.other_participant(user_id)?;
                Some(MatchSummary {
                    match_id: m.id,
                    created_at: m.created_at,
                    other_user: state.profile(other)?,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(matched) = state.matches.iter().find(|m| m.id == message.match_id) else {
            return Err(RepositoryError::NotFound);
        };
        if !matched.involves(&message.sender_id) {
            return Err(RepositoryError::storage("sender is not a match participant"));
        }
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn list_by_match(&self, match_id: MatchId) -> Result<Vec<MessageView>, RepositoryError> {
        let state = self.state.read().await;
        let mut views: Vec<MessageView> = state
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .map(|m| {
                let sender_name = state
                    .users
                    .get(&m.sender_id)
                    .map(|u| u.name.as_str().to_owned())
                    .unwrap_or_default();
                MessageView::from_message(m, sender_name)
            })
            .collect();
        sort_chronologically(&mut views);
        Ok(views)
    }

    async fn conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .iter()
            .filter_map(|m| {
                let other = state.profile(m.other_participant(user_id)?)?;
                Some(ConversationSummary::summarize(
                    user_id,
                    m,
                    other,
                    &state.messages,
                ))
            })
            .collect())
    }
}
