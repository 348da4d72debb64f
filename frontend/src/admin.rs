//! 用户管理上下文（前端模拟数据）
//!
//! 包装 `UserManagementStore`，每次变更后刷新两个列表快照。

use crate::web::BrowserStorage;
use leptos::prelude::*;
use testhub_shared::models::{
    ManagedUser, ManagedUserPatch, NewManagedUser, Role, SignupRequest,
};
use testhub_shared::storage::KeyValueStore;
use testhub_shared::user_admin::UserManagementStore;
use testhub_shared::{STORAGE_MANAGED_USERS, STORAGE_SIGNUP_REQUESTS};

#[derive(Clone, Copy)]
pub struct AdminContext {
    pub users: RwSignal<Vec<ManagedUser>>,
    pub signup_requests: RwSignal<Vec<SignupRequest>>,
    store: StoredValue<UserManagementStore<BrowserStorage>, LocalStorage>,
}

impl AdminContext {
    pub fn new(storage: BrowserStorage) -> Self {
        let store = UserManagementStore::load(storage.clone());
        let ctx = Self {
            users: RwSignal::new(store.users().to_vec()),
            signup_requests: RwSignal::new(store.signup_requests().to_vec()),
            store: StoredValue::new_local(store),
        };

        storage.subscribe(Box::new(move |key| {
            if key.is_empty() || key == STORAGE_MANAGED_USERS || key == STORAGE_SIGNUP_REQUESTS {
                ctx.mutate(|s| s.reload());
            }
        }));
        ctx
    }

    /// 对存储执行一次变更并刷新快照；所属 Owner 已销毁时返回 `None`
    fn mutate<R>(&self, f: impl FnOnce(&mut UserManagementStore<BrowserStorage>) -> R) -> Option<R> {
        let out = self.store.try_update_value(f);
        self.store.try_with_value(|s| {
            self.users.set(s.users().to_vec());
            self.signup_requests.set(s.signup_requests().to_vec());
        });
        out
    }

    pub fn add_user(&self, new: NewManagedUser) -> Option<ManagedUser> {
        self.mutate(|s| s.add_user(new))
    }

    pub fn update_user(&self, id: i64, patch: ManagedUserPatch) -> bool {
        self.mutate(|s| s.update_user(id, patch)).unwrap_or(false)
    }

    pub fn delete_user(&self, id: i64) -> bool {
        self.mutate(|s| s.delete_user(id)).unwrap_or(false)
    }

    pub fn approve_signup_request(&self, id: i64, role: Role) -> Option<ManagedUser> {
        self.mutate(|s| s.approve_signup_request(id, role)).flatten()
    }

    pub fn reject_signup_request(&self, id: i64) -> bool {
        self.mutate(|s| s.reject_signup_request(id)).unwrap_or(false)
    }
}

pub fn use_admin() -> AdminContext {
    expect_context::<AdminContext>()
}
