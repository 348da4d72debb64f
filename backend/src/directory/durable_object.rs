use super::protocol::*;
use super::storage_adapter::{StorageAdapter, WorkerStorage};
use super::{Directory, StoredUser};
use crate::error::{ApiError, ApiResult};
use crate::password::hash_password;
use crate::utils::rpc::{RpcCommand, RpcHandler};
use std::cell::Cell;
use testhub_shared::date::{Clock, SystemClock, Timestamp};
use testhub_shared::models::Role;
use worker::*;

const PREFIX_USER: &str = "user:";
const PREFIX_EMAIL: &str = "email:";
const PREFIX_USERNAME: &str = "username:";
/// 集合标记：存在即代表种子已经写入过
const COLLECTION_MARKER: &str = "meta:users";

pub const MSG_EMAIL_TAKEN: &str = "email already registered";
pub const MSG_USERNAME_TAKEN: &str = "username already taken";
pub const MSG_USER_NOT_FOUND: &str = "user not found";

// =========================================================
// 种子数据
// =========================================================

pub struct SeedAccount {
    pub username: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub role: Role,
}

pub const SAMPLE_ACCOUNTS: [SeedAccount; 2] = [
    SeedAccount {
        username: "testuser",
        email: "test@example.com",
        password: "test123",
        role: Role::Tester,
    },
    SeedAccount {
        username: "admin",
        email: "admin@testops.com",
        password: "admin123",
        role: Role::Admin,
    },
];

// =========================================================
// 业务逻辑层 (Logic)
// =========================================================

pub struct UserDirectoryLogic<S: StorageAdapter> {
    storage: S,
}

impl<S: StorageAdapter> UserDirectoryLogic<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    fn user_key(id: &str) -> String {
        format!("{}{}", PREFIX_USER, id)
    }

    fn email_key(email: &str) -> String {
        format!("{}{}", PREFIX_EMAIL, email)
    }

    fn username_key(username: &str) -> String {
        format!("{}{}", PREFIX_USERNAME, username)
    }

    pub async fn insert_user(&self, cmd: InsertUserCmd) -> ApiResult<StoredUser> {
        let user = cmd.user;
        let email_key = Self::email_key(&user.email);
        let username_key = Self::username_key(&user.username);

        if self.storage.get::<String>(&email_key).await?.is_some() {
            return Err(ApiError::conflict(MSG_EMAIL_TAKEN).in_op_with("directory.insert", &user.email));
        }
        if self.storage.get::<String>(&username_key).await?.is_some() {
            return Err(
                ApiError::conflict(MSG_USERNAME_TAKEN).in_op_with("directory.insert", &user.username)
            );
        }

        self.storage.put(&Self::user_key(&user.id), &user).await?;
        self.storage.put(&email_key, &user.id).await?;
        self.storage.put(&username_key, &user.id).await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, cmd: FindUserByIdCmd) -> ApiResult<Option<StoredUser>> {
        self.storage.get(&Self::user_key(&cmd.id)).await
    }

    pub async fn find_by_email(&self, cmd: FindUserByEmailCmd) -> ApiResult<Option<StoredUser>> {
        match self.storage.get::<String>(&Self::email_key(&cmd.email)).await? {
            Some(id) => self.find_by_id(FindUserByIdCmd { id }).await,
            None => Ok(None),
        }
    }

    pub async fn username_exists(&self, cmd: UsernameExistsCmd) -> ApiResult<bool> {
        Ok(self
            .storage
            .get::<String>(&Self::username_key(&cmd.username))
            .await?
            .is_some())
    }

    pub async fn set_password_hash(&self, cmd: SetPasswordHashCmd) -> ApiResult<StoredUser> {
        let mut user = self
            .find_by_email(FindUserByEmailCmd {
                email: cmd.email.clone(),
            })
            .await?
            .ok_or_else(|| ApiError::not_found(MSG_USER_NOT_FOUND).in_op_with("directory.set_password", &cmd.email))?;

        user.password_hash = Some(cmd.password_hash);
        user.updated_at = cmd.at.to_datetime();
        self.storage.put(&Self::user_key(&user.id), &user).await?;
        Ok(user)
    }

    pub async fn list_users(&self, cmd: ListUsersCmd) -> ApiResult<Vec<StoredUser>> {
        let map = self.storage.list_map::<StoredUser>(PREFIX_USER).await?;
        let mut users: Vec<StoredUser> = map
            .into_values()
            .filter(|u| cmd.role.is_none_or(|role| u.role == role))
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// 幂等种子：集合标记已存在则跳过；邮箱已注册的示例账号不会重复写入。
    /// 返回本次新写入的账号数。
    pub async fn seed(&self, accounts: &[SeedAccount], now: Timestamp) -> ApiResult<usize> {
        if self.storage.get::<i64>(COLLECTION_MARKER).await?.is_some() {
            return Ok(0);
        }

        let mut inserted = 0;
        for account in accounts {
            let existing = self
                .find_by_email(FindUserByEmailCmd {
                    email: account.email.to_string(),
                })
                .await?;
            if existing.is_some() {
                continue;
            }

            let user = StoredUser::new(
                account.username,
                account.email,
                Some(hash_password(account.password)?),
                account.role,
                now,
            );
            match self.insert_user(InsertUserCmd { user }).await {
                Ok(_) => inserted += 1,
                // 用户名被真实用户占用时不覆盖
                Err(e) if e.status_code() == 409 => continue,
                Err(e) => return Err(e.in_op("directory.seed")),
            }
        }

        self.storage.put(COLLECTION_MARKER, &now.as_millis()).await?;
        Ok(inserted)
    }
}

// 逻辑层直接实现目录接口：测试中无需经过 RPC
#[async_trait::async_trait(?Send)]
impl<S: StorageAdapter> Directory for UserDirectoryLogic<S> {
    async fn insert(&self, user: StoredUser) -> ApiResult<StoredUser> {
        self.insert_user(InsertUserCmd { user }).await
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<StoredUser>> {
        UserDirectoryLogic::find_by_email(
            self,
            FindUserByEmailCmd {
                email: email.to_string(),
            },
        )
        .await
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StoredUser>> {
        UserDirectoryLogic::find_by_id(self, FindUserByIdCmd { id: id.to_string() }).await
    }

    async fn username_exists(&self, username: &str) -> ApiResult<bool> {
        UserDirectoryLogic::username_exists(
            self,
            UsernameExistsCmd {
                username: username.to_string(),
            },
        )
        .await
    }

    async fn set_password_hash(
        &self,
        email: &str,
        password_hash: String,
        at: Timestamp,
    ) -> ApiResult<StoredUser> {
        UserDirectoryLogic::set_password_hash(
            self,
            SetPasswordHashCmd {
                email: email.to_string(),
                password_hash,
                at,
            },
        )
        .await
    }

    async fn list(&self, role: Option<Role>) -> ApiResult<Vec<StoredUser>> {
        self.list_users(ListUsersCmd { role }).await
    }
}

// =========================================================
// Durable Object 绑定层 (Worker)
// =========================================================

#[durable_object]
pub struct UserDirectory {
    logic: UserDirectoryLogic<WorkerStorage>,
    seed_enabled: bool,
    /// 本实例生命周期内是否已检查过种子
    seed_checked: Cell<bool>,
}

impl DurableObject for UserDirectory {
    fn new(state: State, env: Env) -> Self {
        let raw = env.var("SEED_SAMPLE_USERS").ok().map(|v| v.to_string());
        let seed_enabled = seed_flag(raw.as_deref());
        Self {
            logic: UserDirectoryLogic::new(WorkerStorage(state.storage())),
            seed_enabled,
            seed_checked: Cell::new(false),
        }
    }

    async fn fetch(&self, req: Request) -> Result<Response> {
        self.ensure_seeded().await;

        let logic = &self.logic;
        match req.path().as_str() {
            InsertUserCmd::PATH => RpcHandler::handle(req, |c| logic.insert_user(c)).await,
            FindUserByEmailCmd::PATH => RpcHandler::handle(req, |c| logic.find_by_email(c)).await,
            FindUserByIdCmd::PATH => RpcHandler::handle(req, |c| logic.find_by_id(c)).await,
            UsernameExistsCmd::PATH => {
                RpcHandler::handle(req, |c| logic.username_exists(c)).await
            }
            SetPasswordHashCmd::PATH => {
                RpcHandler::handle(req, |c| logic.set_password_hash(c)).await
            }
            ListUsersCmd::PATH => RpcHandler::handle(req, |c| logic.list_users(c)).await,
            _ => Response::error("Not Found", 404),
        }
    }
}

/// `SEED_SAMPLE_USERS`：未配置时开启，只有 `false` / `0` / `off` 关闭
pub(crate) fn seed_flag(raw: Option<&str>) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) => !matches!(v.as_str(), "false" | "0" | "off"),
        None => true,
    }
}

impl UserDirectory {
    async fn ensure_seeded(&self) {
        if !self.seed_enabled || self.seed_checked.get() {
            return;
        }
        match self.logic.seed(&SAMPLE_ACCOUNTS, SystemClock.now()).await {
            Ok(inserted) => {
                self.seed_checked.set(true);
                if inserted > 0 {
                    log_info!("[Directory] seeded {} sample accounts", inserted);
                }
            }
            // 下次请求重试
            Err(e) => log_error!("[Directory] seed failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests;
