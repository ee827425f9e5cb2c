use std::{sync::Arc, time::Duration};

use application::repository::{MatchRepository, MessageRepository, SkillRepository, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{
    ConversationSummary, DisplayName, Eligibility, Match, MatchId, MatchSummary, Message,
    MessageContent, MessageId, MessageView, RepositoryError, Skill, SkillId, SkillName,
    SkillRelation, SkillVerification, TaughtSkill, Timestamp, User, UserEmail, UserId,
    UserProfile, VerificationScore,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use uuid::Uuid;

/// 唯一约束冲突映射为 `Conflict`，外键缺失映射为 `NotFound`。
fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict;
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::storage(err.to_string())
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

fn relation_table(relation: SkillRelation) -> &'static str {
    match relation {
        SkillRelation::Teaches => "user_teaches",
        SkillRelation::Learns => "user_learns",
    }
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: String,
    email: String,
    name: String,
    bio: Option<String>,
    city: Option<String>,
    country: Option<String>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let name = DisplayName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::new(value.id),
            email,
            name,
            bio: value.bio,
            city: value.city,
            country: value.country,
            profile_picture: value.profile_picture,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProfileRecord {
    id: String,
    email: String,
    name: String,
    bio: Option<String>,
    city: Option<String>,
    country: Option<String>,
    profile_picture: Option<String>,
}

impl From<ProfileRecord> for UserProfile {
    fn from(value: ProfileRecord) -> Self {
        UserProfile {
            id: UserId::new(value.id),
            email: value.email,
            name: value.name,
            bio: value.bio,
            city: value.city,
            country: value.country,
            profile_picture: value.profile_picture,
        }
    }
}

#[derive(Debug, FromRow)]
struct SkillRecord {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SkillRecord> for Skill {
    type Error = RepositoryError;

    fn try_from(value: SkillRecord) -> Result<Self, Self::Error> {
        let name = SkillName::parse(value.name).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Skill::new(SkillId::from(value.id), name, value.created_at))
    }
}

#[derive(Debug, FromRow)]
struct TaughtSkillRecord {
    skill_id: Uuid,
    name: String,
    verified: bool,
    score: Option<f64>,
}

impl From<TaughtSkillRecord> for TaughtSkill {
    fn from(value: TaughtSkillRecord) -> Self {
        TaughtSkill {
            skill_id: SkillId::from(value.skill_id),
            name: value.name,
            verified: value.verified,
            score: value.score,
        }
    }
}

#[derive(Debug, FromRow)]
struct VerificationRecord {
    user_id: String,
    skill_id: Uuid,
    verified: bool,
    score: f64,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<VerificationRecord> for SkillVerification {
    type Error = RepositoryError;

    fn try_from(value: VerificationRecord) -> Result<Self, Self::Error> {
        let score =
            VerificationScore::new(value.score).map_err(|err| invalid_data(err.to_string()))?;
        Ok(SkillVerification {
            user_id: UserId::new(value.user_id),
            skill_id: SkillId::from(value.skill_id),
            verified: value.verified,
            score,
            recorded_at: value.recorded_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EligibilityRecord {
    has_verified_teach_skill: bool,
    has_declared_interest: bool,
}

impl From<EligibilityRecord> for Eligibility {
    fn from(value: EligibilityRecord) -> Self {
        Eligibility {
            has_verified_teach_skill: value.has_verified_teach_skill,
            has_declared_interest: value.has_declared_interest,
        }
    }
}

#[derive(Debug, FromRow)]
struct MatchRecord {
    id: Uuid,
    user1_id: String,
    user2_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MatchRecord> for Match {
    type Error = RepositoryError;

    fn try_from(value: MatchRecord) -> Result<Self, Self::Error> {
        Match::new(
            MatchId::from(value.id),
            UserId::new(value.user1_id),
            UserId::new(value.user2_id),
            value.created_at,
        )
        .map_err(|err| invalid_data(err.to_string()))
    }
}

#[derive(Debug, FromRow)]
struct MatchSummaryRecord {
    match_id: Uuid,
    created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    other_user: ProfileRecord,
}

impl From<MatchSummaryRecord> for MatchSummary {
    fn from(value: MatchSummaryRecord) -> Self {
        MatchSummary {
            match_id: MatchId::from(value.match_id),
            created_at: value.created_at,
            other_user: value.other_user.into(),
        }
    }
}

#[derive(Debug, FromRow)]
struct MessageRecord {
    id: Uuid,
    match_id: Uuid,
    sender_id: String,
    content: String,
    sent_at: DateTime<Utc>,
}

impl TryFrom<MessageRecord> for Message {
    type Error = RepositoryError;

    fn try_from(value: MessageRecord) -> Result<Self, Self::Error> {
        let content =
            MessageContent::new(value.content).map_err(|err| invalid_data(err.to_string()))?;
        Ok(Message::new(
            MessageId::from(value.id),
            MatchId::from(value.match_id),
            UserId::new(value.sender_id),
            content,
            value.sent_at,
        ))
    }
}

#[derive(Debug, FromRow)]
struct MessageViewRecord {
    id: Uuid,
    match_id: Uuid,
    sender_id: String,
    sender_name: String,
    content: String,
    sent_at: DateTime<Utc>,
}

impl From<MessageViewRecord> for MessageView {
    fn from(value: MessageViewRecord) -> Self {
        MessageView {
            id: MessageId::from(value.id),
            match_id: MatchId::from(value.match_id),
            sender_id: UserId::new(value.sender_id),
            sender_name: value.sender_name,
            content: value.content,
            sent_at: value.sent_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ConversationRecord {
    match_id: Uuid,
    matched_at: DateTime<Utc>,
    #[sqlx(flatten)]
    other_user: ProfileRecord,
    last_message: Option<String>,
    last_message_at: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
    unread_count: i64,
}

impl From<ConversationRecord> for ConversationSummary {
    fn from(value: ConversationRecord) -> Self {
        ConversationSummary {
            match_id: MatchId::from(value.match_id),
            other_user: value.other_user.into(),
            last_message: value.last_message,
            last_message_at: value.last_message_at,
            last_activity: value.last_activity,
            unread_count: u64::try_from(value.unread_count).unwrap_or_default(),
            matched_at: value.matched_at,
        }
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, name, bio, city, country, profile_picture, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email, name, bio, city, country, profile_picture, created_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.email.as_str())
        .bind(user.name.as_str())
        .bind(&user.bio)
        .bind(&user.city)
        .bind(&user.country)
        .bind(&user.profile_picture)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        User::try_from(record)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET name = $2, bio = $3, city = $4, country = $5, profile_picture = $6
            WHERE id = $1
            RETURNING id, email, name, bio, city, country, profile_picture, created_at
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.name.as_str())
        .bind(&user.bio)
        .bind(&user.city)
        .bind(&user.country)
        .bind(&user.profile_picture)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record
            .ok_or(RepositoryError::NotFound)
            .and_then(User::try_from)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, name, bio, city, country, profile_picture, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(User::try_from).transpose()
    }

    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT id, email, name, bio, city, country, profile_picture
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.map(UserProfile::from))
    }

    async fn list_except(&self, id: &UserId) -> Result<Vec<UserProfile>, RepositoryError> {
        let records = sqlx::query_as::<_, ProfileRecord>(
            r#"
            SELECT id, email, name, bio, city, country, profile_picture
            FROM users
            WHERE id <> $1
            ORDER BY name, id
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(UserProfile::from).collect())
    }
}

#[derive(Clone)]
pub struct PgSkillRepository {
    pool: PgPool,
}

impl PgSkillRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillRepository for PgSkillRepository {
    async fn create(&self, skill: Skill) -> Result<Skill, RepositoryError> {
        let record = sqlx::query_as::<_, SkillRecord>(
            r#"
            INSERT INTO skills (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::from(skill.id))
        .bind(skill.name.as_str())
        .bind(skill.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Skill::try_from(record)
    }

    async fn find_by_name(&self, name: &SkillName) -> Result<Option<Skill>, RepositoryError> {
        let record = sqlx::query_as::<_, SkillRecord>(
            "SELECT id, name, created_at FROM skills WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Skill::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Skill>, RepositoryError> {
        let records = sqlx::query_as::<_, SkillRecord>(
            "SELECT id, name, created_at FROM skills ORDER BY LOWER(name)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        records.into_iter().map(Skill::try_from).collect()
    }

    async fn has_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND skill_id = $2)",
            relation_table(relation)
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(user_id.as_str())
            .bind(Uuid::from(skill_id))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_err)
    }

    async fn add_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
        at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (user_id, skill_id, created_at) VALUES ($1, $2, $3)",
            relation_table(relation)
        );
        sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(Uuid::from(skill_id))
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn remove_relation(
        &self,
        user_id: &UserId,
        skill_id: SkillId,
        relation: SkillRelation,
    ) -> Result<bool, RepositoryError> {
        // skill_verifications 通过外键级联删除
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND skill_id = $2",
            relation_table(relation)
        );
        let result = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(Uuid::from(skill_id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn taught_skills(&self, user_id: &UserId) -> Result<Vec<TaughtSkill>, RepositoryError> {
        let records = sqlx::query_as::<_, TaughtSkillRecord>(
            r#"
            SELECT s.id AS skill_id,
                   s.name,
                   COALESCE(v.verified, FALSE) AS verified,
                   v.score
            FROM user_teaches t
            JOIN skills s ON s.id = t.skill_id
            LEFT JOIN skill_verifications v
                   ON v.user_id = t.user_id AND v.skill_id = t.skill_id
            WHERE t.user_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(TaughtSkill::from).collect())
    }

    async fn interests(&self, user_id: &UserId) -> Result<Vec<String>, RepositoryError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.name
            FROM user_learns l
            JOIN skills s ON s.id = l.skill_id
            WHERE l.user_id = $1
            ORDER BY s.name
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)
    }

    async fn upsert_verification(
        &self,
        verification: SkillVerification,
    ) -> Result<SkillVerification, RepositoryError> {
        let record = sqlx::query_as::<_, VerificationRecord>(
            r#"
            INSERT INTO skill_verifications (user_id, skill_id, verified, score, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, skill_id) DO UPDATE
            SET verified = EXCLUDED.verified,
                score = EXCLUDED.score,
                recorded_at = EXCLUDED.recorded_at
            RETURNING user_id, skill_id, verified, score, recorded_at
            "#,
        )
        .bind(verification.user_id.as_str())
        .bind(Uuid::from(verification.skill_id))
        .bind(verification.verified)
        .bind(verification.score.value())
        .bind(verification.recorded_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        SkillVerification::try_from(record)
    }

    async fn eligibility(&self, user_id: &UserId) -> Result<Eligibility, RepositoryError> {
        let record = sqlx::query_as::<_, EligibilityRecord>(
            r#"
            SELECT
                EXISTS(
                    SELECT 1
                    FROM user_teaches t
                    JOIN skill_verifications v
                      ON v.user_id = t.user_id AND v.skill_id = t.skill_id
                    WHERE t.user_id = $1 AND v.verified
                ) AS has_verified_teach_skill,
                EXISTS(
                    SELECT 1 FROM user_learns WHERE user_id = $1
                ) AS has_declared_interest
            "#,
        )
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(record.into())
    }

    async fn find_candidate_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, RepositoryError> {
        // 我教（已验证）且对方想学 S，对方教（已验证）且我想学 T
        let ids = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT b_learn.user_id
            FROM user_teaches a_teach
            JOIN skill_verifications a_ver
              ON a_ver.user_id = a_teach.user_id
             AND a_ver.skill_id = a_teach.skill_id
             AND a_ver.verified
            JOIN user_learns b_learn
              ON b_learn.skill_id = a_teach.skill_id
            JOIN user_teaches b_teach
              ON b_teach.user_id = b_learn.user_id
            JOIN skill_verifications b_ver
              ON b_ver.user_id = b_teach.user_id
             AND b_ver.skill_id = b_teach.skill_id
             AND b_ver.verified
            JOIN user_learns a_learn
              ON a_learn.user_id = a_teach.user_id
             AND a_learn.skill_id = b_teach.skill_id
            WHERE a_teach.user_id = $1
              AND b_learn.user_id <> $1
            ORDER BY b_learn.user_id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(ids.into_iter().map(UserId::new).collect())
    }
}

#[derive(Clone)]
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn create(&self, matched: Match) -> Result<Match, RepositoryError> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            INSERT INTO matches (id, user1_id, user2_id, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user1_id, user2_id, created_at
            "#,
        )
        .bind(Uuid::from(matched.id))
        .bind(matched.user1_id.as_str())
        .bind(matched.user2_id.as_str())
        .bind(matched.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Match::try_from(record)
    }

    async fn find_by_id(&self, id: MatchId) -> Result<Option<Match>, RepositoryError> {
        let record = sqlx::query_as::<_, MatchRecord>(
            "SELECT id, user1_id, user2_id, created_at FROM matches WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Match::try_from).transpose()
    }

    async fn find_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<Match>, RepositoryError> {
        let record = sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT id, user1_id, user2_id, created_at
            FROM matches
            WHERE (user1_id = $1 AND user2_id = $2)
               OR (user1_id = $2 AND user2_id = $1)
            "#,
        )
        .bind(a.as_str())
        .bind(b.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        record.map(Match::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<MatchSummary>, RepositoryError> {
        let records = sqlx::query_as::<_, MatchSummaryRecord>(
            r#"
            SELECT m.id AS match_id,
                   m.created_at,
                   u.id, u.email, u.name, u.bio, u.city, u.country, u.profile_picture
            FROM matches m
            JOIN users u
              ON u.id = CASE WHEN m.user1_id = $1 THEN m.user2_id ELSE m.user1_id END
            WHERE m.user1_id = $1 OR m.user2_id = $1
            ORDER BY m.created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(MatchSummary::from).collect())
    }
}

#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn create(&self, message: Message) -> Result<Message, RepositoryError> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            INSERT INTO messages (id, match_id, sender_id, content, sent_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, match_id, sender_id, content, sent_at
            "#,
        )
        .bind(Uuid::from(message.id))
        .bind(Uuid::from(message.match_id))
        .bind(message.sender_id.as_str())
        .bind(message.content.as_str())
        .bind(message.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Message::try_from(record)
    }

    async fn list_by_match(&self, match_id: MatchId) -> Result<Vec<MessageView>, RepositoryError> {
        let records = sqlx::query_as::<_, MessageViewRecord>(
            r#"
            SELECT msg.id, msg.match_id, msg.sender_id, u.name AS sender_name, msg.content, msg.sent_at
            FROM messages msg
            JOIN users u ON u.id = msg.sender_id
            WHERE msg.match_id = $1
            ORDER BY msg.sent_at ASC, msg.id ASC
            "#,
        )
        .bind(Uuid::from(match_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(MessageView::from).collect())
    }

    async fn conversations_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        // 未读数：对方在我最后一次发言之后的消息数，从未发言时从纪元起算
        let records = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT m.id AS match_id,
                   m.created_at AS matched_at,
                   u.id, u.email, u.name, u.bio, u.city, u.country, u.profile_picture,
                   last.content AS last_message,
                   last.sent_at AS last_message_at,
                   GREATEST(m.created_at, COALESCE(last.sent_at, m.created_at)) AS last_activity,
                   (
                       SELECT COUNT(*)
                       FROM messages unread
                       WHERE unread.match_id = m.id
                         AND unread.sender_id <> $1
                         AND unread.sent_at > COALESCE(
                             (SELECT MAX(own.sent_at)
                              FROM messages own
                              WHERE own.match_id = m.id AND own.sender_id = $1),
                             'epoch'::timestamptz
                         )
                   ) AS unread_count
            FROM matches m
            JOIN users u
              ON u.id = CASE WHEN m.user1_id = $1 THEN m.user2_id ELSE m.user1_id END
            LEFT JOIN LATERAL (
                SELECT content, sent_at
                FROM messages
                WHERE match_id = m.id
                ORDER BY sent_at DESC, id DESC
                LIMIT 1
            ) last ON TRUE
            WHERE m.user1_id = $1 OR m.user2_id = $1
            ORDER BY last_activity DESC, m.created_at DESC, m.id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(records.into_iter().map(ConversationSummary::from).collect())
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub skill_repository: Arc<PgSkillRepository>,
    pub match_repository: Arc<PgMatchRepository>,
    pub message_repository: Arc<PgMessageRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            skill_repository: Arc::new(PgSkillRepository::new(pool.clone())),
            match_repository: Arc::new(PgMatchRepository::new(pool.clone())),
            message_repository: Arc::new(PgMessageRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}
