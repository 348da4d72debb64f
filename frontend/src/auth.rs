//! 认证上下文
//!
//! 持有会话信号和 `AuthClient`。路由服务只拿到会话信号，
//! 登录、登出、令牌失效都通过修改信号驱动重定向。

use crate::config;
use crate::web::{BrowserStorage, FetchClient};
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use testhub_shared::auth_client::{
    AuthClient, ClientError, GoogleOutcome, PendingGoogleAccount, SessionState,
};
use testhub_shared::forms::{GooglePasswordForm, LoginForm, SignupForm};
use testhub_shared::http::HttpRequest;
use testhub_shared::models::{AuthUser, Session};
use testhub_shared::protocol::{ApiEnvelope, ApiRequest, MeRequest};

type Client = AuthClient<FetchClient, BrowserStorage>;

/// 认证上下文，`Copy` 后在组件间共享
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态，启动时为 `Loading`
    pub session: RwSignal<SessionState>,
    /// Google 握手中等待密码步骤的账号
    pub pending_google: RwSignal<Option<PendingGoogleAccount>>,
    client: StoredValue<Client, LocalStorage>,
}

impl AuthContext {
    pub fn new(storage: BrowserStorage) -> Self {
        let client = AuthClient::new(FetchClient, storage, config::api_base_url());
        Self {
            session: RwSignal::new(SessionState::Loading),
            pending_google: RwSignal::new(None),
            client: StoredValue::new_local(client),
        }
    }

    /// 只读会话信号（注入路由服务）
    pub fn session_signal(&self) -> Signal<SessionState> {
        self.session.into()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.session.with(|s| s.user().cloned())
    }

    /// 启动时恢复会话，完成前路由只显示加载
    pub fn restore(&self) {
        let client = self.client.get_value();
        let session = self.session;
        spawn_local(async move {
            let state = client.restore().await;
            if let SessionState::Authenticated(s) = &state {
                log!("[Auth] Session restored for {}", s.user.email);
            }
            session.set(state);
        });
    }

    fn commit(&self, session: Session) {
        log!("[Auth] Signed in as {} ({})", session.user.email, session.user.role);
        self.pending_google.set(None);
        self.session.set(SessionState::Authenticated(session));
    }

    pub async fn login(&self, form: LoginForm) -> Result<(), ClientError> {
        let client = self.client.get_value();
        let session = client.login(&form).await.inspect_err(|e| warn!("[Auth] Login failed: {}", e))?;
        self.commit(session);
        Ok(())
    }

    pub async fn signup(&self, form: SignupForm) -> Result<(), ClientError> {
        let client = self.client.get_value();
        client
            .signup(&form)
            .await
            .inspect_err(|e| warn!("[Auth] Signup failed: {}", e))
    }

    pub async fn google_signup(&self, credential: String) -> Result<(), ClientError> {
        let client = self.client.get_value();
        let outcome = client
            .google_signup(&credential)
            .await
            .inspect_err(|e| warn!("[Auth] Google signup failed: {}", e))?;
        self.apply_google(outcome);
        Ok(())
    }

    pub async fn google_login(&self, credential: String) -> Result<(), ClientError> {
        let client = self.client.get_value();
        let outcome = client
            .google_login(&credential)
            .await
            .inspect_err(|e| warn!("[Auth] Google login failed: {}", e))?;
        self.apply_google(outcome);
        Ok(())
    }

    fn apply_google(&self, outcome: GoogleOutcome) {
        match outcome {
            GoogleOutcome::NeedsPassword(pending) => self.pending_google.set(Some(pending)),
            GoogleOutcome::Authenticated(session) => self.commit(session),
        }
    }

    /// Google 握手的密码步骤
    pub async fn complete_google_password(&self, form: GooglePasswordForm) -> Result<(), ClientError> {
        let Some(pending) = self.pending_google.get_untracked() else {
            return Ok(());
        };
        let client = self.client.get_value();
        let session = client.complete_google_password(&pending, &form).await?;
        self.commit(session);
        Ok(())
    }

    pub fn cancel_google(&self) {
        self.pending_google.set(None);
    }

    /// 向 `/api/auth/me` 重新拉取账号信息；401 会直接结束会话
    pub async fn refresh_account(&self) -> Result<AuthUser, ClientError> {
        let client = self.client.get_value();
        let req = HttpRequest::get(&client.url(MeRequest::PATH));

        let resp = match client.authorized(req).await {
            Ok(resp) => resp,
            Err(ClientError::SessionExpired) => {
                warn!("[Auth] Token rejected, signing out");
                self.session.set(SessionState::Anonymous);
                return Err(ClientError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        let envelope: ApiEnvelope<AuthUser> = resp.json().map_err(|e| ClientError::Rejected {
            status: resp.status,
            message: e.to_string(),
        })?;
        let user = match envelope.data {
            Some(user) if envelope.success => user,
            _ => {
                return Err(ClientError::Rejected {
                    status: resp.status,
                    message: envelope.reason().unwrap_or("Failed to load account").to_string(),
                });
            }
        };

        self.session.update(|s| {
            if let SessionState::Authenticated(session) = s {
                session.user = user.clone();
            }
        });
        Ok(user)
    }

    /// 删除令牌与资料，路由服务随后把受保护页面重定向到 `/auth`
    pub fn logout(&self) {
        self.client.with_value(|c| c.logout());
        self.pending_google.set(None);
        self.session.set(SessionState::Anonymous);
        log!("[Auth] Signed out");
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}
