//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：资格检查、配对解析、配对登记、消息与会话，
//! 以及对外部适配器（存储、时钟、实时推送）的抽象。

pub mod broadcaster;
pub mod clock;
pub mod dto;
pub mod error;
pub mod local_broadcast;
pub mod memory;
pub mod repository;
pub mod services;

pub use broadcaster::{BroadcastError, MessageBroadcast, MessageBroadcaster};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApplicationError, ErrorKind};
pub use local_broadcast::{LocalMessageBroadcaster, MessageStream};
pub use memory::MemoryStore;
pub use repository::{MatchRepository, MessageRepository, SkillRepository, UserRepository};
pub use services::{
    ChatService, ChatServiceDependencies, MatchService, MatchServiceDependencies, ProfileService,
    ProfileServiceDependencies,
};
