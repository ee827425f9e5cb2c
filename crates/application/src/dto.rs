use domain::{
    ConversationSummary, Match, MatchCandidate, MatchOutcome, MatchSummary, MessageView, Skill,
    SkillVerification, TaughtSkill, Timestamp, User, UserProfile,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::Profile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: Timestamp,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            name: user.name.as_str().to_owned(),
            bio: user.bio.clone(),
            city: user.city.clone(),
            country: user.country.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileDto {
    pub id: String,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
}

impl From<&UserProfile> for UserProfileDto {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.as_str().to_owned(),
            email: profile.email.clone(),
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            city: profile.city.clone(),
            country: profile.country.clone(),
            profile_picture: profile.profile_picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaughtSkillDto {
    pub skill_name: String,
    pub verified: bool,
    pub score: Option<f64>,
}

impl From<&TaughtSkill> for TaughtSkillDto {
    fn from(skill: &TaughtSkill) -> Self {
        Self {
            skill_name: skill.name.clone(),
            verified: skill.verified,
            score: skill.score,
        }
    }
}

/// 配对候选人：资料字段平铺，附带完整技能与兴趣列表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidateDto {
    #[serde(flatten)]
    pub profile: UserProfileDto,
    pub skills: Vec<TaughtSkillDto>,
    pub interests: Vec<String>,
}

impl From<&MatchCandidate> for MatchCandidateDto {
    fn from(candidate: &MatchCandidate) -> Self {
        Self {
            profile: UserProfileDto::from(&candidate.profile),
            skills: candidate.skills.iter().map(TaughtSkillDto::from).collect(),
            interests: candidate.interests.clone(),
        }
    }
}

/// `POST /api/matches` 的响应体。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchCandidateDto>,
    pub message: String,
}

impl From<&MatchOutcome> for FindMatchesResponse {
    fn from(outcome: &MatchOutcome) -> Self {
        Self {
            matches: outcome.candidates().iter().map(MatchCandidateDto::from).collect(),
            message: outcome.message(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDto {
    pub id: Uuid,
    pub user1_id: String,
    pub user2_id: String,
    pub created_at: Timestamp,
}

impl From<&Match> for MatchDto {
    fn from(matched: &Match) -> Self {
        Self {
            id: Uuid::from(matched.id),
            user1_id: matched.user1_id.as_str().to_owned(),
            user2_id: matched.user2_id.as_str().to_owned(),
            created_at: matched.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummaryDto {
    pub match_id: Uuid,
    pub created_at: Timestamp,
    pub other_user: UserProfileDto,
}

impl From<&MatchSummary> for MatchSummaryDto {
    fn from(summary: &MatchSummary) -> Self {
        Self {
            match_id: Uuid::from(summary.match_id),
            created_at: summary.created_at,
            other_user: UserProfileDto::from(&summary.other_user),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub sent_at: Timestamp,
}

impl From<&MessageView> for MessageDto {
    fn from(message: &MessageView) -> Self {
        Self {
            id: Uuid::from(message.id),
            match_id: Uuid::from(message.match_id),
            sender_id: message.sender_id.as_str().to_owned(),
            sender_name: message.sender_name.clone(),
            content: message.content.clone(),
            sent_at: message.sent_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDto {
    pub match_id: Uuid,
    pub other_user: UserProfileDto,
    pub last_message: Option<String>,
    pub last_message_at: Option<Timestamp>,
    pub last_activity: Timestamp,
    pub unread_count: u64,
}

impl From<&ConversationSummary> for ConversationDto {
    fn from(summary: &ConversationSummary) -> Self {
        Self {
            match_id: Uuid::from(summary.match_id),
            other_user: UserProfileDto::from(&summary.other_user),
            last_message: summary.last_message.clone(),
            last_message_at: summary.last_message_at,
            last_activity: summary.last_activity,
            unread_count: summary.unread_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDto {
    pub id: Uuid,
    pub name: String,
}

impl From<&Skill> for SkillDto {
    fn from(skill: &Skill) -> Self {
        Self {
            id: Uuid::from(skill.id),
            name: skill.name.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDto {
    pub user: UserDto,
    pub teaches: Vec<TaughtSkillDto>,
    pub learns: Vec<String>,
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            user: UserDto::from(&profile.user),
            teaches: profile.teaches.iter().map(TaughtSkillDto::from).collect(),
            learns: profile.learns.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationDto {
    pub user_id: String,
    pub skill_id: Uuid,
    pub verified: bool,
    pub score: f64,
    pub recorded_at: Timestamp,
}

impl From<&SkillVerification> for VerificationDto {
    fn from(verification: &SkillVerification) -> Self {
        Self {
            user_id: verification.user_id.as_str().to_owned(),
            skill_id: Uuid::from(verification.skill_id),
            verified: verification.verified,
            score: verification.score.value(),
            recorded_at: verification.recorded_at,
        }
    }
}
