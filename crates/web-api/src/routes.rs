use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use application::dto::{
    ConversationDto, FindMatchesResponse, MatchDto, MatchSummaryDto, MessageDto, ProfileDto,
    SkillDto, UserDto, UserProfileDto, VerificationDto,
};
use application::services::{
    CreateMatchRequest, RecordVerificationRequest, SendMessageRequest, SyncUserRequest,
    UpdateProfileRequest,
};
use domain::{MatchId, UserId};

use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    state::AppState,
    websocket::websocket_upgrade,
};

const VERIFIER_KEY_HEADER: &str = "x-verifier-key";

#[derive(Debug, Deserialize)]
struct CreateMatchPayload {
    #[serde(rename = "otherUserId", alias = "other_user_id")]
    other_user_id: String,
}

#[derive(Debug, Deserialize)]
struct SendMessagePayload {
    content: String,
}

#[derive(Debug, Deserialize)]
struct SyncUserPayload {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateProfilePayload {
    name: Option<String>,
    bio: Option<String>,
    city: Option<String>,
    country: Option<String>,
    #[serde(alias = "profilePicture")]
    profile_picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkillPayload {
    #[serde(rename = "skillName", alias = "skill_name")]
    skill_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationPayload {
    #[serde(alias = "user_id")]
    user_id: String,
    #[serde(alias = "skill_name")]
    skill_name: String,
    verified: bool,
    score: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/internal/verifications", put(record_verification))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/matches", post(find_matches))
        .route("/chat/users", get(list_users))
        .route("/chat/matches", get(list_matches).post(create_match))
        .route(
            "/chat/matches/{match_id}/messages",
            get(get_messages).post(send_message),
        )
        .route("/chat/conversations", get(get_conversations))
        .route("/users/sync", post(sync_user))
        .route("/users/me", get(get_profile).put(update_profile))
        .route("/skills", get(list_skills))
        .route("/users/me/teaches", post(add_teach_skill))
        .route("/users/me/teaches/{skill_name}", delete(remove_teach_skill))
        .route("/users/me/learns", post(add_learn_skill))
        .route("/users/me/learns/{skill_name}", delete(remove_learn_skill))
        .route("/ws", get(websocket_upgrade))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// 先检查资格；不满足时返回 200、空列表和原因说明。
async fn find_matches(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<FindMatchesResponse>, ApiError> {
    let outcome = state.match_service.run_matching(&auth.user_id).await?;
    Ok(Json(FindMatchesResponse::from(&outcome)))
}

async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserProfileDto>>, ApiError> {
    let users = state.chat_service.list_users(&auth.user_id).await?;
    Ok(Json(users.iter().map(UserProfileDto::from).collect()))
}

async fn list_matches(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<MatchSummaryDto>>, ApiError> {
    let matches = state.chat_service.get_user_matches(&auth.user_id).await?;
    Ok(Json(matches.iter().map(MatchSummaryDto::from).collect()))
}

async fn create_match(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateMatchPayload>,
) -> Result<(StatusCode, Json<MatchDto>), ApiError> {
    let other_user_id = UserId::parse(payload.other_user_id)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let matched = state
        .chat_service
        .create_match(CreateMatchRequest {
            requester_id: auth.user_id,
            other_user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MatchDto::from(&matched))))
}

async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(match_id): ApiPath<Uuid>,
) -> Result<Json<Vec<MessageDto>>, ApiError> {
    let messages = state
        .chat_service
        .get_messages(&auth.user_id, MatchId::from(match_id))
        .await?;
    Ok(Json(messages.iter().map(MessageDto::from).collect()))
}

async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(match_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SendMessagePayload>,
) -> Result<(StatusCode, Json<MessageDto>), ApiError> {
    let message = state
        .chat_service
        .send_message(SendMessageRequest {
            match_id: MatchId::from(match_id),
            sender_id: auth.user_id,
            content: payload.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MessageDto::from(&message))))
}

async fn get_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ConversationDto>>, ApiError> {
    let conversations = state.chat_service.get_conversations(&auth.user_id).await?;
    Ok(Json(conversations.iter().map(ConversationDto::from).collect()))
}

/// 请求体中的邮箱和名称优先，缺省时使用令牌中的声明。
async fn sync_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SyncUserPayload>,
) -> Result<Json<UserDto>, ApiError> {
    let email = payload
        .email
        .or(auth.email)
        .ok_or_else(|| ApiError::bad_request("invalid email: cannot be empty"))?;

    let user = state
        .profile_service
        .sync_user(SyncUserRequest {
            user_id: auth.user_id,
            email,
            name: payload.name.or(auth.name),
        })
        .await?;
    Ok(Json(UserDto::from(&user)))
}

async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileDto>, ApiError> {
    let profile = state.profile_service.get_profile(&auth.user_id).await?;
    Ok(Json(ProfileDto::from(&profile)))
}

async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfilePayload>,
) -> Result<Json<UserDto>, ApiError> {
    let user = state
        .profile_service
        .update_profile(
            &auth.user_id,
            UpdateProfileRequest {
                name: payload.name,
                bio: payload.bio,
                city: payload.city,
                country: payload.country,
                profile_picture: payload.profile_picture,
            },
        )
        .await?;
    Ok(Json(UserDto::from(&user)))
}

async fn list_skills(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<SkillDto>>, ApiError> {
    let skills = state.profile_service.list_skills().await?;
    Ok(Json(skills.iter().map(SkillDto::from).collect()))
}

async fn add_teach_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SkillPayload>,
) -> Result<(StatusCode, Json<SkillDto>), ApiError> {
    let skill = state
        .profile_service
        .add_teach_skill(&auth.user_id, &payload.skill_name)
        .await?;
    Ok((StatusCode::CREATED, Json(SkillDto::from(&skill))))
}

async fn remove_teach_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(skill_name): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state
        .profile_service
        .remove_teach_skill(&auth.user_id, &skill_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_learn_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SkillPayload>,
) -> Result<(StatusCode, Json<SkillDto>), ApiError> {
    let skill = state
        .profile_service
        .add_learn_skill(&auth.user_id, &payload.skill_name)
        .await?;
    Ok((StatusCode::CREATED, Json(SkillDto::from(&skill))))
}

async fn remove_learn_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(skill_name): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state
        .profile_service
        .remove_learn_skill(&auth.user_id, &skill_name)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 外部技能验证流程的回调，使用共享密钥而不是用户令牌。
async fn record_verification(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<VerificationPayload>,
) -> Result<Json<VerificationDto>, ApiError> {
    let provided = headers
        .get(VERIFIER_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing verifier key"))?;
    if provided != &*state.verifier_key {
        tracing::warn!("技能验证回调使用了无效的密钥");
        return Err(ApiError::unauthorized("invalid verifier key"));
    }

    let user_id =
        UserId::parse(payload.user_id).map_err(|err| ApiError::bad_request(err.to_string()))?;
    let verification = state
        .profile_service
        .record_verification(RecordVerificationRequest {
            user_id,
            skill_name: payload.skill_name,
            verified: payload.verified,
            score: payload.score,
        })
        .await?;
    Ok(Json(VerificationDto::from(&verification)))
}
