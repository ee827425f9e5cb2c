mod chat_service;
mod match_service;
mod profile_service;

#[cfg(test)]
mod profile_service_tests;
#[cfg(test)]
mod test_support;

pub use chat_service::{
    ChatService, ChatServiceDependencies, CreateMatchRequest, SendMessageRequest,
};
pub use match_service::{MatchService, MatchServiceDependencies};
pub use profile_service::{
    Profile, ProfileService, ProfileServiceDependencies, RecordVerificationRequest,
    SyncUserRequest, UpdateProfileRequest,
};
