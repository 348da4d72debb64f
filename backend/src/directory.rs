//! 用户目录 (`users` 集合)
//!
//! 所有写入都经过同一个 `UserDirectory` Durable Object 实例，
//! 邮箱 / 用户名唯一索引在对象内部串行检查。

mod durable_object;
pub mod protocol;
pub mod storage_adapter;

pub use durable_object::{
    MSG_EMAIL_TAKEN, MSG_USER_NOT_FOUND, MSG_USERNAME_TAKEN, SAMPLE_ACCOUNTS, UserDirectory,
    UserDirectoryLogic,
};

use crate::error::ApiResult;
use crate::utils::rpc::RpcClient;
use chrono::{DateTime, Utc};
use protocol::*;
use serde::{Deserialize, Serialize};
use testhub_shared::date::Timestamp;
use testhub_shared::models::{AuthUser, Role};
use worker::Env;

/// DO 实例名，整个集合只有一个
pub const DIRECTORY_INSTANCE: &str = "users";

// =========================================================
// 存储模型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Google 创建的账号在设置密码前为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn new(
        username: &str,
        email: &str,
        password_hash: Option<String>,
        role: Role,
        now: Timestamp,
    ) -> Self {
        let at = now.to_datetime();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            picture: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn with_picture(mut self, picture: Option<String>) -> Self {
        self.picture = picture;
        self
    }

    pub fn to_auth_user(&self) -> AuthUser {
        AuthUser {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            picture: self.picture.clone(),
        }
    }
}

// =========================================================
// 目录接口
// =========================================================

#[async_trait::async_trait(?Send)]
pub trait Directory {
    /// 邮箱或用户名已存在时返回 Conflict
    async fn insert(&self, user: StoredUser) -> ApiResult<StoredUser>;
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<StoredUser>>;
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StoredUser>>;
    async fn username_exists(&self, username: &str) -> ApiResult<bool>;
    /// 用户不存在时返回 NotFound
    async fn set_password_hash(
        &self,
        email: &str,
        password_hash: String,
        at: Timestamp,
    ) -> ApiResult<StoredUser>;
    /// 按 created_at 倒序
    async fn list(&self, role: Option<Role>) -> ApiResult<Vec<StoredUser>>;
}

// =========================================================
// Durable Object 客户端
// =========================================================

pub struct DoDirectory {
    client: RpcClient,
}

impl DoDirectory {
    pub fn new(env: &Env, binding_name: &str) -> ApiResult<Self> {
        let namespace = env.durable_object(binding_name)?;
        let id = namespace.id_from_name(DIRECTORY_INSTANCE)?;
        let stub = id.get_stub()?;
        Ok(Self {
            client: RpcClient::new(stub, "http://directory"),
        })
    }
}

#[async_trait::async_trait(?Send)]
impl Directory for DoDirectory {
    async fn insert(&self, user: StoredUser) -> ApiResult<StoredUser> {
        self.client.send(&InsertUserCmd { user }).await
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<StoredUser>> {
        self.client
            .send(&FindUserByEmailCmd {
                email: email.to_string(),
            })
            .await
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<StoredUser>> {
        self.client
            .send(&FindUserByIdCmd { id: id.to_string() })
            .await
    }

    async fn username_exists(&self, username: &str) -> ApiResult<bool> {
        self.client
            .send(&UsernameExistsCmd {
                username: username.to_string(),
            })
            .await
    }

    async fn set_password_hash(
        &self,
        email: &str,
        password_hash: String,
        at: Timestamp,
    ) -> ApiResult<StoredUser> {
        self.client
            .send(&SetPasswordHashCmd {
                email: email.to_string(),
                password_hash,
                at,
            })
            .await
    }

    async fn list(&self, role: Option<Role>) -> ApiResult<Vec<StoredUser>> {
        self.client.send(&ListUsersCmd { role }).await
    }
}
