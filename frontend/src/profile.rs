//! 个人资料上下文
//!
//! `ProfileStore` 为唯一写入方，信号只保存快照供视图读取。

use crate::web::BrowserStorage;
use leptos::prelude::*;
use testhub_shared::STORAGE_USER_PROFILE;
use testhub_shared::models::{AuthUser, UserProfile};
use testhub_shared::profile::{ProfileStore, ProfileUpdate};
use testhub_shared::storage::KeyValueStore;

#[derive(Clone, Copy)]
pub struct ProfileContext {
    pub profile: RwSignal<UserProfile>,
    store: StoredValue<ProfileStore<BrowserStorage>, LocalStorage>,
}

impl ProfileContext {
    pub fn new(storage: BrowserStorage) -> Self {
        let store = ProfileStore::load(storage.clone());
        let ctx = Self {
            profile: RwSignal::new(store.profile().clone()),
            store: StoredValue::new_local(store),
        };

        // 其他标签页修改资料后刷新快照
        storage.subscribe(Box::new(move |key| {
            if key.is_empty() || key == STORAGE_USER_PROFILE {
                ctx.mutate(|s| s.reload());
            }
        }));
        ctx
    }

    fn mutate(&self, f: impl FnOnce(&mut ProfileStore<BrowserStorage>)) {
        if self.store.try_update_value(f).is_some() {
            if let Some(snapshot) = self.store.try_with_value(|s| s.profile().clone()) {
                self.profile.set(snapshot);
            }
        }
    }

    pub fn update(&self, update: ProfileUpdate) {
        self.mutate(|s| s.update(update));
    }

    /// 登录后同步用户名、邮箱和角色；已同步时不重复写入
    pub fn sign_in(&self, user: &AuthUser) {
        let synced = self.profile.with_untracked(|p| {
            p.is_logged_in && p.email == user.email && p.role == Some(user.role)
        });
        if !synced {
            self.mutate(|s| s.sign_in(&user.username, &user.email, user.role));
        }
    }

    /// 会话结束时调用：令牌和资料键已由认证客户端删除
    pub fn clear(&self) {
        self.mutate(|s| s.clear());
    }
}

pub fn use_profile() -> ProfileContext {
    expect_context::<ProfileContext>()
}
