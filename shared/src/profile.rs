//! 本地个人资料存储
//!
//! 资料保存在 `userProfile` 键下，每次变更后立即持久化。

use crate::STORAGE_USER_PROFILE;
use crate::models::{AvatarKind, DEFAULT_AVATARS, Role, UPLOADED_AVATAR_INDEX, UserProfile};
use crate::storage::{KeyValueStore, load_json, save_json};

/// 部分更新；`None` 的字段保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub avatar_kind: Option<AvatarKind>,
    pub selected_avatar_index: Option<i32>,
    pub role: Option<Option<Role>>,
    pub is_logged_in: Option<bool>,
}

impl ProfileUpdate {
    /// 选择第 `index` 个预置渐变头像；越界时回退到第一个
    pub fn gradient(index: usize) -> Self {
        let index = if index < DEFAULT_AVATARS.len() { index } else { 0 };
        Self {
            avatar: Some(DEFAULT_AVATARS[index].to_string()),
            avatar_kind: Some(AvatarKind::Gradient),
            selected_avatar_index: Some(index as i32),
            ..Self::default()
        }
    }

    /// 使用上传的图片（data URL）作为头像
    pub fn uploaded(data_url: impl Into<String>) -> Self {
        Self {
            avatar: Some(data_url.into()),
            avatar_kind: Some(AvatarKind::Image),
            selected_avatar_index: Some(UPLOADED_AVATAR_INDEX),
            ..Self::default()
        }
    }

    fn apply(self, profile: &mut UserProfile) {
        if let Some(v) = self.username {
            profile.username = v;
        }
        if let Some(v) = self.email {
            profile.email = v;
        }
        if let Some(v) = self.avatar {
            profile.avatar = v;
        }
        if let Some(v) = self.avatar_kind {
            profile.avatar_kind = v;
        }
        if let Some(v) = self.selected_avatar_index {
            profile.selected_avatar_index = v;
        }
        if let Some(v) = self.role {
            profile.role = v;
        }
        if let Some(v) = self.is_logged_in {
            profile.is_logged_in = v;
        }
    }
}

pub struct ProfileStore<S: KeyValueStore> {
    store: S,
    profile: UserProfile,
}

impl<S: KeyValueStore> ProfileStore<S> {
    /// 读取已保存的资料；不存在或解析失败时使用默认资料，并立即写回
    pub fn load(store: S) -> Self {
        let profile = load_json(&store, STORAGE_USER_PROFILE).unwrap_or_default();
        let this = Self { store, profile };
        this.persist();
        this
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn update(&mut self, update: ProfileUpdate) {
        update.apply(&mut self.profile);
        self.persist();
    }

    /// 登录后同步身份字段
    pub fn sign_in(&mut self, username: &str, email: &str, role: Role) {
        self.update(ProfileUpdate {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            role: Some(Some(role)),
            is_logged_in: Some(true),
            ..ProfileUpdate::default()
        });
    }

    /// 恢复默认资料，但保留头像选择
    pub fn sign_out(&mut self) {
        let UserProfile {
            avatar,
            avatar_kind,
            selected_avatar_index,
            ..
        } = std::mem::take(&mut self.profile);
        self.profile = UserProfile {
            avatar,
            avatar_kind,
            selected_avatar_index,
            ..UserProfile::default()
        };
        self.persist();
    }

    /// 删除存储键并回到内存中的默认资料（会话登出时使用）
    pub fn clear(&mut self) {
        self.store.remove(STORAGE_USER_PROFILE);
        self.profile = UserProfile::default();
    }

    /// 从存储重新读取（其他标签页修改后）
    pub fn reload(&mut self) {
        self.profile = load_json(&self.store, STORAGE_USER_PROFILE).unwrap_or_default();
    }

    fn persist(&self) {
        save_json(&self.store, STORAGE_USER_PROFILE, &self.profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn corrupt_profile_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set(STORAGE_USER_PROFILE, "][");
        let profiles = ProfileStore::load(store.clone());
        assert_eq!(profiles.profile(), &UserProfile::default());

        // 默认资料已被写回
        let saved: UserProfile = load_json(&store, STORAGE_USER_PROFILE).unwrap();
        assert_eq!(saved.username, "Guest");
    }

    #[test]
    fn sign_out_keeps_avatar_choice() {
        let store = MemoryStore::new();
        let mut profiles = ProfileStore::load(store.clone());
        profiles.sign_in("john", "john@test.com", Role::Tester);
        profiles.update(ProfileUpdate::gradient(3));
        profiles.sign_out();

        let p = profiles.profile();
        assert_eq!(p.username, "Guest");
        assert_eq!(p.role, None);
        assert!(!p.is_logged_in);
        assert_eq!(p.selected_avatar_index, 3);
        assert_eq!(p.avatar, DEFAULT_AVATARS[3]);

        let reloaded = ProfileStore::load(store);
        assert_eq!(reloaded.profile().selected_avatar_index, 3);
    }

    #[test]
    fn uploaded_avatar_uses_sentinel_index() {
        let mut profiles = ProfileStore::load(MemoryStore::new());
        profiles.update(ProfileUpdate::uploaded("data:image/png;base64,AAAA"));
        assert_eq!(profiles.profile().avatar_kind, AvatarKind::Image);
        assert_eq!(profiles.profile().selected_avatar_index, UPLOADED_AVATAR_INDEX);

        profiles.update(ProfileUpdate::gradient(99));
        assert_eq!(profiles.profile().selected_avatar_index, 0);
    }

    #[test]
    fn clear_removes_key() {
        let store = MemoryStore::new();
        let mut profiles = ProfileStore::load(store.clone());
        profiles.sign_in("admin", "admin@testops.com", Role::Admin);
        profiles.clear();
        assert!(!store.contains(STORAGE_USER_PROFILE));
        assert!(!profiles.profile().is_logged_in);
    }
}
