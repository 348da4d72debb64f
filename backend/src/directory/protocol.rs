use super::StoredUser;
use crate::utils::rpc::RpcCommand;
use serde::{Deserialize, Serialize};
use testhub_shared::date::Timestamp;
use testhub_shared::models::Role;

// =========================================================
// Directory 指令定义
// =========================================================

/// 写入新用户，并建立邮箱 / 用户名索引
#[derive(Serialize, Deserialize)]
pub struct InsertUserCmd {
    pub user: StoredUser,
}

impl RpcCommand for InsertUserCmd {
    type Response = StoredUser;
    const PATH: &'static str = "/directory/insert";
}

#[derive(Serialize, Deserialize)]
pub struct FindUserByEmailCmd {
    pub email: String,
}

impl RpcCommand for FindUserByEmailCmd {
    type Response = Option<StoredUser>;
    const PATH: &'static str = "/directory/by-email";
}

#[derive(Serialize, Deserialize)]
pub struct FindUserByIdCmd {
    pub id: String,
}

impl RpcCommand for FindUserByIdCmd {
    type Response = Option<StoredUser>;
    const PATH: &'static str = "/directory/by-id";
}

#[derive(Serialize, Deserialize)]
pub struct UsernameExistsCmd {
    pub username: String,
}

impl RpcCommand for UsernameExistsCmd {
    type Response = bool;
    const PATH: &'static str = "/directory/username-exists";
}

/// 更新密码哈希，`at` 写入 updated_at
#[derive(Serialize, Deserialize)]
pub struct SetPasswordHashCmd {
    pub email: String,
    pub password_hash: String,
    pub at: Timestamp,
}

impl RpcCommand for SetPasswordHashCmd {
    type Response = StoredUser;
    const PATH: &'static str = "/directory/set-password";
}

/// `role` 为空时列出全部
#[derive(Serialize, Deserialize)]
pub struct ListUsersCmd {
    #[serde(default)]
    pub role: Option<Role>,
}

impl RpcCommand for ListUsersCmd {
    type Response = Vec<StoredUser>;
    const PATH: &'static str = "/directory/list";
}
