//! 服务测试共用的装配与数据准备工具。

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use domain::{Timestamp, User, UserId};

use crate::{
    broadcaster::MessageBroadcaster,
    clock::ManualClock,
    local_broadcast::LocalMessageBroadcaster,
    memory::MemoryStore,
    services::{
        ChatService, ChatServiceDependencies, MatchService, MatchServiceDependencies,
        ProfileService, ProfileServiceDependencies, RecordVerificationRequest, SyncUserRequest,
    },
};

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub broadcaster: Arc<LocalMessageBroadcaster>,
    pub profiles: ProfileService,
    pub matching: MatchService,
    pub chat: ChatService,
}

impl TestContext {
    pub fn new() -> Self {
        let broadcaster = Arc::new(LocalMessageBroadcaster::new(64));
        Self::with_broadcaster(broadcaster.clone(), broadcaster)
    }

    /// 使用指定的推送实现构建聊天服务，其余依赖与默认一致。
    pub fn with_broadcaster(
        local: Arc<LocalMessageBroadcaster>,
        broadcaster: Arc<dyn MessageBroadcaster>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start_time(), Duration::seconds(1)));

        let profiles = ProfileService::new(ProfileServiceDependencies {
            user_repository: store.clone(),
            skill_repository: store.clone(),
            clock: clock.clone(),
        });
        let matching = MatchService::new(MatchServiceDependencies {
            user_repository: store.clone(),
            skill_repository: store.clone(),
        });
        let chat = ChatService::new(ChatServiceDependencies {
            user_repository: store.clone(),
            match_repository: store.clone(),
            message_repository: store.clone(),
            clock: clock.clone(),
            broadcaster,
        });

        Self {
            store,
            clock,
            broadcaster: local,
            profiles,
            matching,
            chat,
        }
    }

    pub async fn user(&self, id: &str, name: &str) -> User {
        self.profiles
            .sync_user(SyncUserRequest {
                user_id: UserId::new(id),
                email: format!("{id}@example.com"),
                name: Some(name.to_owned()),
            })
            .await
            .unwrap()
    }

    pub async fn teaches(&self, id: &str, skill: &str) {
        self.profiles
            .add_teach_skill(&UserId::new(id), skill)
            .await
            .unwrap();
    }

    pub async fn teaches_verified(&self, id: &str, skill: &str) {
        self.teaches(id, skill).await;
        self.verify(id, skill, true).await;
    }

    pub async fn verify(&self, id: &str, skill: &str, verified: bool) {
        self.profiles
            .record_verification(RecordVerificationRequest {
                user_id: UserId::new(id),
                skill_name: skill.to_owned(),
                verified,
                score: if verified { 85.0 } else { 40.0 },
            })
            .await
            .unwrap();
    }

    pub async fn learns(&self, id: &str, skill: &str) {
        self.profiles
            .add_learn_skill(&UserId::new(id), skill)
            .await
            .unwrap();
    }
}
