//! 用户管理 Mock 存储
//!
//! 模拟后端的用户和注册申请资源。数据保存在浏览器本地
//! (`testhub_users` / `testhub_signup_requests`)，每次变更后两份列表都会写回。
//! 密码以明文保存，仅用于演示数据。

use crate::date::{Clock, SystemClock, display_date};
use crate::models::{
    ManagedUser, ManagedUserPatch, NewManagedUser, NewSignupRequest, Role, SignupRequest,
    SignupStatus, UserStatus,
};
use crate::storage::{KeyValueStore, load_json, save_json};
use crate::{STORAGE_MANAGED_USERS, STORAGE_SIGNUP_REQUESTS};

const JUST_NOW: &str = "Just now";

pub fn default_users() -> Vec<ManagedUser> {
    let user = |id, name: &str, email: &str, password: &str, role, last_active: &str, joined: &str| {
        ManagedUser {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
            status: UserStatus::Active,
            last_active: last_active.to_string(),
            joined_date: joined.to_string(),
            company: None,
        }
    };
    vec![
        user(1, "Imran Admin", "imran@gmail.com", "123", Role::Admin, JUST_NOW, "Jan 12, 2024"),
        user(2, "John Smith", "john@test.com", "test123", Role::Tester, "2h ago", "Feb 04, 2024"),
        user(3, "Alice Johnson", "alice@test.com", "test123", Role::Tester, "1d ago", "Mar 20, 2024"),
    ]
}

pub fn default_signup_requests() -> Vec<SignupRequest> {
    let request = |id, name: &str, email: &str, password: &str, date: &str| SignupRequest {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        request_date: date.to_string(),
        status: SignupStatus::Pending,
    };
    vec![
        request(1, "Sarah Wilson", "sarah@company.com", "sarah123", "Nov 28, 2025"),
        request(2, "Mike Brown", "mike@startup.io", "mike123", "Nov 29, 2025"),
    ]
}

pub struct UserManagementStore<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    users: Vec<ManagedUser>,
    requests: Vec<SignupRequest>,
}

impl<S: KeyValueStore> UserManagementStore<S, SystemClock> {
    pub fn load(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> UserManagementStore<S, C> {
    /// 读取两份列表；缺失或损坏时使用默认数据，并立即写回
    pub fn with_clock(store: S, clock: C) -> Self {
        let users = load_json(&store, STORAGE_MANAGED_USERS).unwrap_or_else(default_users);
        let requests =
            load_json(&store, STORAGE_SIGNUP_REQUESTS).unwrap_or_else(default_signup_requests);
        let this = Self {
            store,
            clock,
            users,
            requests,
        };
        this.persist();
        this
    }

    pub fn users(&self) -> &[ManagedUser] {
        &self.users
    }

    pub fn signup_requests(&self) -> &[SignupRequest] {
        &self.requests
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &SignupRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == SignupStatus::Pending)
    }

    pub fn find_user(&self, id: i64) -> Option<&ManagedUser> {
        self.users.iter().find(|u| u.id == id)
    }

    /// 新 id 取当前毫秒时间戳，不处理冲突
    pub fn add_user(&mut self, new: NewManagedUser) -> ManagedUser {
        let now = self.clock.now();
        let user = ManagedUser {
            id: now.as_millis(),
            name: new.name,
            email: new.email,
            password: new.password,
            role: new.role,
            status: new.status,
            last_active: JUST_NOW.to_string(),
            joined_date: display_date(now),
            company: new.company,
        };
        self.users.push(user.clone());
        self.persist();
        user
    }

    /// 未知 id 不做任何事，返回 `false`
    pub fn update_user(&mut self, id: i64, patch: ManagedUserPatch) -> bool {
        let Some(user) = self.users.iter_mut().find(|u| u.id == id) else {
            return false;
        };
        patch.apply(user);
        self.persist();
        true
    }

    pub fn delete_user(&mut self, id: i64) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        let removed = self.users.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn add_signup_request(&mut self, new: NewSignupRequest) -> SignupRequest {
        let now = self.clock.now();
        let request = SignupRequest {
            id: now.as_millis(),
            name: new.name,
            email: new.email,
            password: new.password,
            request_date: display_date(now),
            status: SignupStatus::Pending,
        };
        self.requests.push(request.clone());
        self.persist();
        request
    }

    /// 以指定角色创建 Active 用户，并将申请标记为 Approved。
    /// 只处理仍为 Pending 的申请。
    pub fn approve_signup_request(&mut self, id: i64, role: Role) -> Option<ManagedUser> {
        let request = self
            .requests
            .iter()
            .find(|r| r.id == id && r.status == SignupStatus::Pending)?
            .clone();

        let user = self.add_user(NewManagedUser {
            name: request.name,
            email: request.email,
            password: request.password,
            role,
            status: UserStatus::Active,
            company: None,
        });
        self.set_request_status(id, SignupStatus::Approved);
        Some(user)
    }

    pub fn reject_signup_request(&mut self, id: i64) -> bool {
        let pending = self
            .requests
            .iter()
            .any(|r| r.id == id && r.status == SignupStatus::Pending);
        if pending {
            self.set_request_status(id, SignupStatus::Rejected);
        }
        pending
    }

    /// 邮箱和密码完全匹配且状态为 Active 的第一个用户
    pub fn validate_login(&self, email: &str, password: &str) -> Option<&ManagedUser> {
        self.users.iter().find(|u| {
            u.email == email && u.password == password && u.status == UserStatus::Active
        })
    }

    /// 从存储重新读取（其他标签页修改后）
    pub fn reload(&mut self) {
        self.users = load_json(&self.store, STORAGE_MANAGED_USERS).unwrap_or_else(default_users);
        self.requests =
            load_json(&self.store, STORAGE_SIGNUP_REQUESTS).unwrap_or_else(default_signup_requests);
    }

    fn set_request_status(&mut self, id: i64, status: SignupStatus) {
        if let Some(r) = self.requests.iter_mut().find(|r| r.id == id) {
            r.status = status;
        }
        self.persist();
    }

    fn persist(&self) {
        save_json(&self.store, STORAGE_MANAGED_USERS, &self.users);
        save_json(&self.store, STORAGE_SIGNUP_REQUESTS, &self.requests);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;
    use crate::storage::MemoryStore;

    // 2025-12-01T10:00:00Z
    const NOW_MS: i64 = 1_764_583_200_000;

    fn setup() -> (MemoryStore, UserManagementStore<MemoryStore, FixedClock>) {
        let store = MemoryStore::new();
        let admin = UserManagementStore::with_clock(store.clone(), FixedClock::at(NOW_MS));
        (store, admin)
    }

    #[test]
    fn first_load_seeds_defaults() {
        let (store, admin) = setup();
        assert_eq!(admin.users().len(), 3);
        assert_eq!(admin.pending_requests().count(), 2);
        assert!(store.contains(STORAGE_MANAGED_USERS));
        assert!(store.contains(STORAGE_SIGNUP_REQUESTS));
    }

    #[test]
    fn added_user_survives_reload() {
        let (store, mut admin) = setup();
        let created = admin.add_user(NewManagedUser {
            name: "Dana Lee".into(),
            email: "dana@test.com".into(),
            password: "pw1234".into(),
            role: Role::Tester,
            status: UserStatus::Active,
            company: Some("Acme".into()),
        });
        assert_eq!(created.id, NOW_MS);
        assert_eq!(created.last_active, "Just now");
        assert_eq!(created.joined_date, "Dec 01, 2025");

        let reloaded = UserManagementStore::with_clock(store, FixedClock::at(0));
        assert_eq!(reloaded.users(), admin.users());
        assert_eq!(reloaded.signup_requests(), admin.signup_requests());
    }

    #[test]
    fn approving_sarah_creates_active_tester() {
        let (_, mut admin) = setup();
        let user = admin.approve_signup_request(1, Role::Tester).unwrap();

        assert_eq!(user.name, "Sarah Wilson");
        assert_eq!(user.role, Role::Tester);
        assert_eq!(user.status, UserStatus::Active);
        assert!(default_users().iter().all(|u| u.id != user.id));
        assert_eq!(admin.signup_requests()[0].status, SignupStatus::Approved);
        assert_eq!(admin.pending_requests().count(), 1);

        // 已处理的申请不会再次生成用户
        assert!(admin.approve_signup_request(1, Role::Admin).is_none());
        assert_eq!(admin.users().len(), 4);
    }

    #[test]
    fn reject_marks_request() {
        let (_, mut admin) = setup();
        assert!(admin.reject_signup_request(2));
        assert_eq!(admin.signup_requests()[1].status, SignupStatus::Rejected);
        assert!(!admin.reject_signup_request(2));
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (_, mut admin) = setup();
        assert!(!admin.update_user(42, ManagedUserPatch::default()));
        assert!(!admin.delete_user(42));
        assert!(!admin.reject_signup_request(42));
        assert!(admin.approve_signup_request(42, Role::Tester).is_none());
        assert_eq!(admin.users(), default_users().as_slice());
    }

    #[test]
    fn update_patches_only_given_fields() {
        let (_, mut admin) = setup();
        assert!(admin.update_user(
            2,
            ManagedUserPatch {
                status: Some(UserStatus::Inactive),
                ..ManagedUserPatch::default()
            }
        ));
        let john = admin.find_user(2).unwrap();
        assert_eq!(john.status, UserStatus::Inactive);
        assert_eq!(john.password, "test123");
    }

    #[test]
    fn validate_login_requires_active_status() {
        let (_, mut admin) = setup();
        assert_eq!(
            admin.validate_login("john@test.com", "test123").map(|u| u.id),
            Some(2)
        );
        assert!(admin.validate_login("john@test.com", "wrong").is_none());

        admin.update_user(
            2,
            ManagedUserPatch {
                status: Some(UserStatus::Inactive),
                ..ManagedUserPatch::default()
            },
        );
        assert!(admin.validate_login("john@test.com", "test123").is_none());
    }

    #[test]
    fn signup_request_gets_pending_status_and_date() {
        let (_, mut admin) = setup();
        let req = admin.add_signup_request(NewSignupRequest {
            name: "Eve".into(),
            email: "eve@test.com".into(),
            password: "eve123".into(),
        });
        assert_eq!(req.status, SignupStatus::Pending);
        assert_eq!(req.request_date, "Dec 01, 2025");
        assert_eq!(admin.pending_requests().count(), 3);
    }
}
