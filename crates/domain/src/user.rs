use serde::{Deserialize, Serialize};

use crate::value_objects::{DisplayName, Timestamp, UserEmail, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    pub name: DisplayName,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// 首次登录时根据身份声明创建用户。
    pub fn register(id: UserId, email: UserEmail, name: DisplayName, now: Timestamp) -> Self {
        Self {
            id,
            email,
            name,
            bio: None,
            city: None,
            country: None,
            profile_picture: None,
            created_at: now,
        }
    }

    /// 应用部分更新，未提供的字段保持不变。
    pub fn apply_update(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(bio) = update.bio {
            self.bio = non_blank(bio);
        }
        if let Some(city) = update.city {
            self.city = non_blank(city);
        }
        if let Some(country) = update.country {
            self.country = non_blank(country);
        }
        if let Some(picture) = update.profile_picture {
            self.profile_picture = non_blank(picture);
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.as_str().to_owned(),
            name: self.name.as_str().to_owned(),
            bio: self.bio.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            profile_picture: self.profile_picture.clone(),
        }
    }
}

// 空字符串表示清空该字段
fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// 资料部分更新。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
}

/// 对外展示的用户资料投影。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn apply_update_keeps_missing_fields_and_clears_blank_ones() {
        let mut user = User::register(
            UserId::new("u1"),
            UserEmail::parse("ada@example.com").unwrap(),
            DisplayName::parse("Ada").unwrap(),
            Utc::now(),
        );
        user.bio = Some("old bio".into());
        user.city = Some("Paris".into());

        user.apply_update(ProfileUpdate {
            country: Some("France".into()),
            city: Some("  ".into()),
            ..ProfileUpdate::default()
        });

        assert_eq!(user.name.as_str(), "Ada");
        assert_eq!(user.bio.as_deref(), Some("old bio"));
        assert_eq!(user.city, None);
        assert_eq!(user.country.as_deref(), Some("France"));
    }
}
