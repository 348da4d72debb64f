//! TESTHUB 共享层
//!
//! 前后端共用的领域模型、线协议与不依赖 DOM 的客户端逻辑。

pub mod auth_client;
pub mod date;
pub mod forms;
pub mod http;
pub mod models;
pub mod profile;
pub mod protocol;
pub mod route;
pub mod storage;
pub mod user_admin;
pub mod views;

pub use models::*;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 浏览器存储键
pub const STORAGE_AUTH_TOKEN: &str = "authToken";
pub const STORAGE_USER_PROFILE: &str = "userProfile";
pub const STORAGE_MANAGED_USERS: &str = "testhub_users";
pub const STORAGE_SIGNUP_REQUESTS: &str = "testhub_signup_requests";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer";

pub const MIN_PASSWORD_LEN: usize = 6;
