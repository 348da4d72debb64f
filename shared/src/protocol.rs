use crate::models::{AuthUser, Role};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize + DeserializeOwned {
    /// 成功时 `data` 字段的类型
    type Response: Serialize + DeserializeOwned;
    const PATH: &'static str;
    const METHOD: HttpMethod;
}

// =========================================================
// 统一响应信封
// =========================================================

/// `{ success, message?, data?, error? }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: Some(message.clone()),
            data: None,
            error: Some(message),
        }
    }

    /// 服务端给出的说明文字，优先 `message`
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.error.as_deref())
    }
}

// =========================================================
// 载荷 (Payloads)
// =========================================================

/// 登录 / 注册 / 验证密码成功后的数据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthPayload {
    pub token: String,
    pub user: AuthUser,
}

/// Google 流程的数据：注册返回 `token + needsPassword`，
/// 登录只返回 `requiresPassword`，不带令牌
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub user: AuthUser,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub needs_password: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_password: bool,
}

// =========================================================
// Request Definitions
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for LoginRequest {
    type Response = AuthPayload;
    const PATH: &'static str = "/api/auth/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 注册请求体；`name` 即用户名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignupRequestBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl ApiRequest for SignupRequestBody {
    type Response = AuthPayload;
    const PATH: &'static str = "/api/users/signup";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoogleCredential {
    pub credential: String,
}

/// 统一入口：新用户自动创建
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GoogleAuthRequest(pub GoogleCredential);

impl ApiRequest for GoogleAuthRequest {
    type Response = GoogleAuthPayload;
    const PATH: &'static str = "/api/auth/google";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GoogleSignupRequest(pub GoogleCredential);

impl ApiRequest for GoogleSignupRequest {
    type Response = GoogleAuthPayload;
    const PATH: &'static str = "/api/auth/google/signup";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct GoogleLoginRequest(pub GoogleCredential);

impl ApiRequest for GoogleLoginRequest {
    type Response = GoogleAuthPayload;
    const PATH: &'static str = "/api/auth/google/login";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyPasswordRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for VerifyPasswordRequest {
    type Response = AuthPayload;
    const PATH: &'static str = "/api/auth/google/verify-password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

/// 需要携带注册时拿到的令牌，且令牌邮箱与请求邮箱一致
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetPasswordRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for SetPasswordRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "/api/users/set-password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MeRequest;

impl ApiRequest for MeRequest {
    type Response = AuthUser;
    const PATH: &'static str = "/api/auth/me";
    const METHOD: HttpMethod = HttpMethod::Get;
}

/// 管理员查看服务端账户；`role` 经查询串传入，缺省返回全部
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListUsersRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl ListUsersRequest {
    /// 从查询参数 `role=admin|tester` 解析，未知取值视为不过滤
    pub fn from_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let role = pairs
            .into_iter()
            .find(|(k, _)| *k == "role")
            .and_then(|(_, v)| Role::parse(v));
        Self { role }
    }
}

impl ApiRequest for ListUsersRequest {
    type Response = Vec<AuthUser>;
    const PATH: &'static str = "/api/users";
    const METHOD: HttpMethod = HttpMethod::Get;
}

pub const HEALTH_PATH: &str = "/health";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_login_payload_has_no_token() {
        let raw = r#"{
            "success": true,
            "message": "Google account found - please enter your password",
            "data": {
                "requiresPassword": true,
                "user": {"id": "u1", "email": "a@b.c", "username": "A", "role": "tester"}
            }
        }"#;
        let env: ApiEnvelope<GoogleAuthPayload> = serde_json::from_str(raw).unwrap();
        let data = env.data.unwrap();
        assert!(data.requires_password);
        assert!(!data.needs_password);
        assert_eq!(data.token, None);
        assert_eq!(data.user.role, Role::Tester);
    }

    #[test]
    fn list_users_reads_role_from_query() {
        let req = ListUsersRequest::from_query([("page", "2"), ("role", "Admin")]);
        assert_eq!(req.role, Some(Role::Admin));
        assert_eq!(ListUsersRequest::from_query([("role", "owner")]).role, None);
        assert_eq!(ListUsersRequest::from_query(Vec::<(&str, &str)>::new()).role, None);
    }

    #[test]
    fn failure_envelope_reason_prefers_message() {
        let env: ApiEnvelope<AuthPayload> =
            serde_json::from_str(r#"{"success": false, "error": "invalid email or password"}"#)
                .unwrap();
        assert_eq!(env.reason(), Some("invalid email or password"));

        let env = ApiEnvelope::<AuthPayload>::fail("username already taken");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["message"], "username already taken");
        assert!(json.get("data").is_none());
    }
}
