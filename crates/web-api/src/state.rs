use std::sync::Arc;

use application::{
    ChatService, ChatServiceDependencies, Clock, LocalMessageBroadcaster, MatchRepository,
    MatchService, MatchServiceDependencies, MessageBroadcaster, MessageRepository, ProfileService,
    ProfileServiceDependencies, SkillRepository, UserRepository,
};

use crate::JwtService;

/// 组装服务所需的存储实现。
#[derive(Clone)]
pub struct Repositories {
    pub user_repository: Arc<dyn UserRepository>,
    pub skill_repository: Arc<dyn SkillRepository>,
    pub match_repository: Arc<dyn MatchRepository>,
    pub message_repository: Arc<dyn MessageRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub profile_service: Arc<ProfileService>,
    pub match_service: Arc<MatchService>,
    pub chat_service: Arc<ChatService>,
    pub broadcaster: Arc<LocalMessageBroadcaster>,
    pub jwt_service: Arc<JwtService>,
    pub verifier_key: Arc<str>,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        clock: Arc<dyn Clock>,
        broadcaster: Arc<LocalMessageBroadcaster>,
        jwt_service: Arc<JwtService>,
        verifier_key: impl Into<Arc<str>>,
    ) -> Self {
        let Repositories {
            user_repository,
            skill_repository,
            match_repository,
            message_repository,
        } = repositories;

        let profile_service = ProfileService::new(ProfileServiceDependencies {
            user_repository: user_repository.clone(),
            skill_repository: skill_repository.clone(),
            clock: clock.clone(),
        });
        let match_service = MatchService::new(MatchServiceDependencies {
            user_repository: user_repository.clone(),
            skill_repository,
        });
        let chat_service = ChatService::new(ChatServiceDependencies {
            user_repository,
            match_repository,
            message_repository,
            clock,
            broadcaster: broadcaster.clone() as Arc<dyn MessageBroadcaster>,
        });

        Self {
            profile_service: Arc::new(profile_service),
            match_service: Arc::new(match_service),
            chat_service: Arc::new(chat_service),
            broadcaster,
            jwt_service,
            verifier_key: verifier_key.into(),
        }
    }
}
