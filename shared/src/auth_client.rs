//! 认证客户端
//!
//! 封装登录、注册、Google 握手和会话恢复。令牌保存在 `authToken` 键下，
//! 受保护请求统一经过 `authorized()`：遇到 401 立即清除会话。
//!
//! 不做重试、刷新令牌、超时或请求去重。

use crate::forms::{FormIssue, GooglePasswordForm, LoginForm, SignupForm, Validation};
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::models::{AuthUser, Role, Session};
use crate::protocol::{
    ApiEnvelope, ApiRequest, GoogleAuthPayload, GoogleCredential, GoogleLoginRequest,
    GoogleSignupRequest, HttpMethod, MeRequest, SetPasswordRequest, VerifyPasswordRequest,
};
use crate::storage::KeyValueStore;
use crate::{BEARER_PREFIX, HEADER_AUTHORIZATION, STORAGE_AUTH_TOKEN, STORAGE_USER_PROFILE};
use std::fmt;

// =========================================================
// 提示文案
// =========================================================

pub const MSG_CONNECT_FAILED_RETRY: &str = "Failed to connect to server. Please try again.";
pub const MSG_CONNECT_FAILED: &str = "Failed to connect to server";
pub const MSG_LOGIN_REJECTED: &str = "Invalid email or password. Please try again.";
pub const MSG_SIGNUP_REJECTED: &str = "Signup failed. Please try again.";
pub const MSG_GOOGLE_SIGNUP_REJECTED: &str = "Google signup failed";
pub const MSG_GOOGLE_LOGIN_REJECTED: &str = "Google login failed";
pub const MSG_GOOGLE_VERIFY_REJECTED: &str = "Invalid password. Please try again.";
pub const MSG_SET_PASSWORD_REJECTED: &str = "Failed to set password";
pub const MSG_SESSION_EXPIRED: &str = "Session expired. Please log in again.";

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// 本地校验未通过，未发出请求
    Invalid(FormIssue),
    /// 请求未完成或响应不可读
    Network {
        message: &'static str,
        detail: String,
    },
    /// 服务端拒绝
    Rejected { status: u16, message: String },
    /// 受保护请求返回 401，本地会话已清除
    SessionExpired,
}

impl ClientError {
    fn network(message: &'static str, e: HttpError) -> Self {
        ClientError::Network {
            message,
            detail: e.to_string(),
        }
    }

    /// 直接展示给用户的文字
    pub fn message(&self) -> String {
        match self {
            ClientError::Invalid(issue) => issue.message.to_string(),
            ClientError::Network { message, .. } => message.to_string(),
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::SessionExpired => MSG_SESSION_EXPIRED.to_string(),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network { message, detail } => write!(f, "{} ({})", message, detail),
            ClientError::Rejected { status, message } => write!(f, "[{}] {}", status, message),
            other => f.write_str(&other.message()),
        }
    }
}

impl std::error::Error for ClientError {}

fn check(validation: Validation) -> Result<(), ClientError> {
    match validation {
        Validation::Valid => Ok(()),
        Validation::Invalid(issue) => Err(ClientError::Invalid(issue)),
    }
}

// =========================================================
// 会话状态
// =========================================================

/// 启动时为 `Loading`，直到 `restore()` 完成
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            SessionState::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }
}

// =========================================================
// Google 握手
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GooglePasswordMode {
    /// 新账号：设置密码，注册时拿到的令牌在成功后生效
    SetPassword,
    /// 已有账号：验证密码后才签发令牌
    VerifyPassword,
}

/// Google 认证通过、等待密码步骤的账号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGoogleAccount {
    pub mode: GooglePasswordMode,
    pub user: AuthUser,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleOutcome {
    NeedsPassword(PendingGoogleAccount),
    Authenticated(Session),
}

// =========================================================
// 客户端
// =========================================================

#[derive(Clone)]
pub struct AuthClient<C: HttpClient, S: KeyValueStore> {
    http: C,
    store: S,
    base_url: String,
}

impl<C: HttpClient, S: KeyValueStore> AuthClient<C, S> {
    pub fn new(http: C, store: S, base_url: &str) -> Self {
        Self {
            http,
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.get(STORAGE_AUTH_TOKEN).filter(|t| !t.is_empty())
    }

    async fn call<T: ApiRequest>(
        &self,
        req: &T,
        bearer: Option<&str>,
    ) -> Result<(u16, ApiEnvelope<T::Response>), HttpError> {
        let mut http_req = HttpRequest::new(&self.url(T::PATH), T::METHOD);
        if T::METHOD != HttpMethod::Get {
            http_req = http_req.with_json(req)?;
        }
        if let Some(token) = bearer {
            http_req = http_req.with_header(HEADER_AUTHORIZATION, &bearer_value(token));
        }
        let resp = self.http.send(http_req).await?;
        let envelope = resp.json::<ApiEnvelope<T::Response>>()?;
        Ok((resp.status, envelope))
    }

    fn commit(&self, token: String, user: AuthUser) -> Session {
        self.store.set(STORAGE_AUTH_TOKEN, &token);
        Session { token, user }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Session, ClientError> {
        check(form.validate())?;

        let (status, env) = self
            .call(&form.to_request(), None)
            .await
            .map_err(|e| ClientError::network(MSG_CONNECT_FAILED_RETRY, e))?;

        match env.data {
            Some(payload) if env.success && !payload.token.is_empty() => {
                Ok(self.commit(payload.token, payload.user))
            }
            _ => Err(rejected(status, env.reason(), MSG_LOGIN_REJECTED)),
        }
    }

    /// 注册成功后不自动登录，由界面切回登录表单
    pub async fn signup(&self, form: &SignupForm) -> Result<(), ClientError> {
        check(form.validate())?;

        let (status, env) = self
            .call(&form.to_request(), None)
            .await
            .map_err(|e| ClientError::network(MSG_CONNECT_FAILED_RETRY, e))?;

        if env.success && (200..300).contains(&status) {
            Ok(())
        } else {
            Err(rejected(status, env.reason(), MSG_SIGNUP_REJECTED))
        }
    }

    pub async fn google_signup(&self, credential: &str) -> Result<GoogleOutcome, ClientError> {
        let req = GoogleSignupRequest(GoogleCredential {
            credential: credential.to_string(),
        });
        let (status, env) = self
            .call(&req, None)
            .await
            .map_err(|e| ClientError::network(MSG_CONNECT_FAILED, e))?;

        match env.data {
            Some(GoogleAuthPayload {
                token: Some(token),
                user,
                needs_password: true,
                ..
            }) if env.success => Ok(GoogleOutcome::NeedsPassword(PendingGoogleAccount {
                mode: GooglePasswordMode::SetPassword,
                user,
                token: Some(token),
            })),
            _ => Err(rejected(status, env.reason(), MSG_GOOGLE_SIGNUP_REJECTED)),
        }
    }

    pub async fn google_login(&self, credential: &str) -> Result<GoogleOutcome, ClientError> {
        let req = GoogleLoginRequest(GoogleCredential {
            credential: credential.to_string(),
        });
        let (status, env) = self
            .call(&req, None)
            .await
            .map_err(|e| ClientError::network(MSG_CONNECT_FAILED, e))?;

        match env.data {
            Some(payload) if env.success && payload.requires_password => {
                Ok(GoogleOutcome::NeedsPassword(PendingGoogleAccount {
                    mode: GooglePasswordMode::VerifyPassword,
                    user: payload.user,
                    token: None,
                }))
            }
            Some(GoogleAuthPayload {
                token: Some(token),
                user,
                ..
            }) if env.success => Ok(GoogleOutcome::Authenticated(self.commit(token, user))),
            _ => Err(rejected(status, env.reason(), MSG_GOOGLE_LOGIN_REJECTED)),
        }
    }

    /// Google 握手的密码步骤：登录模式验证密码，注册模式设置密码
    pub async fn complete_google_password(
        &self,
        pending: &PendingGoogleAccount,
        form: &GooglePasswordForm,
    ) -> Result<Session, ClientError> {
        check(form.validate())?;

        match pending.mode {
            GooglePasswordMode::VerifyPassword => {
                let req = VerifyPasswordRequest {
                    email: pending.user.email.clone(),
                    password: form.password.clone(),
                };
                let (status, env) = self
                    .call(&req, None)
                    .await
                    .map_err(|e| ClientError::network(MSG_CONNECT_FAILED, e))?;

                match env.data {
                    Some(payload) if env.success && !payload.token.is_empty() => {
                        Ok(self.commit(payload.token, payload.user))
                    }
                    _ => Err(rejected(status, env.reason(), MSG_GOOGLE_VERIFY_REJECTED)),
                }
            }
            GooglePasswordMode::SetPassword => {
                let token = pending.token.clone().unwrap_or_default();
                let req = SetPasswordRequest {
                    email: pending.user.email.clone(),
                    password: form.password.clone(),
                };
                let (status, env) = self
                    .call(&req, Some(&token))
                    .await
                    .map_err(|e| ClientError::network(MSG_CONNECT_FAILED, e))?;

                if env.success && !token.is_empty() {
                    Ok(self.commit(token, pending.user.clone()))
                } else {
                    Err(rejected(status, env.reason(), MSG_SET_PASSWORD_REJECTED))
                }
            }
        }
    }

    /// 启动时调用一次：校验已保存的令牌，任何失败都会删除令牌
    pub async fn restore(&self) -> SessionState {
        let Some(token) = self.stored_token() else {
            return SessionState::Anonymous;
        };

        match self.call(&MeRequest, Some(&token)).await {
            Ok((status, env)) if (200..300).contains(&status) && env.success => match env.data {
                Some(user) => SessionState::Authenticated(Session { token, user }),
                None => self.discard_token(),
            },
            _ => self.discard_token(),
        }
    }

    fn discard_token(&self) -> SessionState {
        self.store.remove(STORAGE_AUTH_TOKEN);
        SessionState::Anonymous
    }

    /// 携带令牌发送请求；401 时清除本地会话并返回 `SessionExpired`
    pub async fn authorized(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut req = req.with_header("Content-Type", "application/json");
        if let Some(token) = self.stored_token() {
            req = req.with_header(HEADER_AUTHORIZATION, &bearer_value(&token));
        }

        let resp = self
            .http
            .send(req)
            .await
            .map_err(|e| ClientError::network(MSG_CONNECT_FAILED, e))?;

        if resp.status == 401 {
            self.logout();
            return Err(ClientError::SessionExpired);
        }
        Ok(resp)
    }

    /// 删除令牌和个人资料
    pub fn logout(&self) {
        self.store.remove(STORAGE_AUTH_TOKEN);
        self.store.remove(STORAGE_USER_PROFILE);
    }
}

pub fn bearer_value(token: &str) -> String {
    format!("{} {}", BEARER_PREFIX, token)
}

fn rejected(status: u16, reason: Option<&str>, fallback: &str) -> ClientError {
    ClientError::Rejected {
        status,
        message: reason.unwrap_or(fallback).to_string(),
    }
}

#[cfg(test)]
mod tests;
