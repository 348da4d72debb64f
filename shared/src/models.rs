use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =========================================================
// 角色 (Role)
// =========================================================

/// 用户角色
///
/// 认证 API 使用小写 (`"admin"` / `"tester"`)；本地存储的记录经 `stored_role`
/// 写成 `"Admin"` / `"Tester"`。反序列化时忽略大小写。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Tester,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "tester" => Some(Role::Tester),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tester => "tester",
        }
    }

    /// 界面显示用的名称
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Tester => "Tester",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Role::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("unknown role: {raw}")))
    }
}

/// localStorage 中的角色写法 (`"Admin"` / `"Tester"`)
mod stored_role {
    use super::Role;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(role: &Role, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(role.label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Role, D::Error> {
        Role::deserialize(deserializer)
    }

    pub mod option {
        use super::Role;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            role: &Option<Role>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match role {
                Some(role) => serializer.serialize_some(role.label()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Role>, D::Error> {
            Option::<Role>::deserialize(deserializer)
        }
    }
}

// =========================================================
// 会话 (Session)
// =========================================================

/// 认证 API 返回的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

/// 已认证会话：令牌与用户同时存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: AuthUser,
}

// =========================================================
// 个人资料 (UserProfile)
// =========================================================

/// 预置的渐变头像
pub const DEFAULT_AVATARS: [&str; 5] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
    "linear-gradient(135deg, #fa709a 0%, #fee140 100%)",
];

/// 上传图片时 `selected_avatar_index` 的取值
pub const UPLOADED_AVATAR_INDEX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    #[default]
    Gradient,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    /// 渐变 CSS 或图片 data URL
    pub avatar: String,
    #[serde(rename = "avatarType")]
    pub avatar_kind: AvatarKind,
    pub selected_avatar_index: i32,
    #[serde(default, with = "stored_role::option")]
    pub role: Option<Role>,
    pub is_logged_in: bool,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: "Guest".to_string(),
            email: String::new(),
            avatar: DEFAULT_AVATARS[0].to_string(),
            avatar_kind: AvatarKind::Gradient,
            selected_avatar_index: 0,
            role: None,
            is_logged_in: false,
        }
    }
}

impl UserProfile {
    /// 头像占位文字（用户名首字母）
    pub fn initials(&self) -> String {
        self.username
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

// =========================================================
// 用户管理 (Mock Store)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
        }
    }
}

/// 管理界面中的用户记录（仅存在于浏览器本地）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(with = "stored_role")]
    pub role: Role,
    pub status: UserStatus,
    pub last_active: String,
    pub joined_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewManagedUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub company: Option<String>,
}

/// 部分更新；`None` 的字段保持不变
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManagedUserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl ManagedUserPatch {
    pub fn apply(self, user: &mut ManagedUser) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SignupStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub request_date: String,
    pub status: SignupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =========================================================
// 测试运行 (Mock)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub name: String,
    pub status: RunStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifacts {
    pub screenshots: u32,
    pub video: bool,
    pub logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    pub id: String,
    pub suite: String,
    pub browser: String,
    pub status: RunStatus,
    pub date: String,
    pub time: String,
    pub duration: String,
    pub scripts: Vec<ScriptStep>,
    pub artifacts: Artifacts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_both_casings() {
        let lower: Role = serde_json::from_str("\"admin\"").unwrap();
        let upper: Role = serde_json::from_str("\"Tester\"").unwrap();
        assert_eq!(lower, Role::Admin);
        assert_eq!(upper, Role::Tester);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn profile_uses_camel_case_layout() {
        let json = serde_json::to_value(UserProfile::default()).unwrap();
        assert_eq!(json["username"], "Guest");
        assert_eq!(json["avatarType"], "gradient");
        assert_eq!(json["selectedAvatarIndex"], 0);
        assert_eq!(json["isLoggedIn"], false);
        assert!(json["role"].is_null());
    }

    #[test]
    fn stored_records_write_capitalized_roles() {
        let profile = UserProfile {
            role: Some(Role::Admin),
            ..UserProfile::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "Admin");
        let back: UserProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back.role, Some(Role::Admin));

        let user = ManagedUser {
            id: 1,
            name: "Sam".into(),
            email: "sam@test.com".into(),
            password: "pw1234".into(),
            role: Role::Tester,
            status: UserStatus::Active,
            last_active: "Just now".into(),
            joined_date: "Dec 1, 2025".into(),
            company: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "Tester");

        // 旧版小写记录仍可读取
        let mut legacy = json.clone();
        legacy["role"] = "admin".into();
        let read: ManagedUser = serde_json::from_value(legacy).unwrap();
        assert_eq!(read.role, Role::Admin);
    }

    #[test]
    fn initials_take_first_two_words() {
        let profile = UserProfile {
            username: "alice johnson smith".into(),
            ..UserProfile::default()
        };
        assert_eq!(profile.initials(), "AJ");
    }
}
