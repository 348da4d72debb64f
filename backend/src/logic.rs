use crate::directory::{Directory, StoredUser};
use crate::error::{ApiError, ApiResult};
use crate::google::GoogleVerifier;
use crate::service::AccountService;
use crate::token::{JwtService, bearer_token};
use serde::Serialize;
use testhub_shared::MIN_PASSWORD_LEN;
use testhub_shared::date::Clock;
use testhub_shared::models::AuthUser;
use testhub_shared::protocol::{
    ApiEnvelope, AuthPayload, GoogleAuthPayload, ListUsersRequest, LoginRequest,
    SetPasswordRequest, SignupRequestBody, VerifyPasswordRequest,
};

pub const MSG_USER_CREATED: &str = "User created successfully";
pub const MSG_LOGIN_OK: &str = "Login successful";
pub const MSG_GOOGLE_AUTH_OK: &str = "Google authentication successful";
pub const MSG_GOOGLE_ACCOUNT_FOUND: &str = "Google account found - please enter your password";
pub const MSG_GOOGLE_NO_ACCOUNT: &str =
    "No account found with this Google email. Please sign up first.";
pub const MSG_GOOGLE_LOGIN_OK: &str = "Google login successful";
pub const MSG_GOOGLE_BAD_PASSWORD: &str = "Invalid password. Please try again.";
pub const MSG_PASSWORD_SET: &str = "Password set successfully";
pub const MSG_EMAIL_PASSWORD_REQUIRED: &str = "Email and password are required";
pub const MSG_PASSWORD_MIN_LEN: &str = "Password must be at least 6 characters";
pub const MSG_ME_OK: &str = "User retrieved successfully";
pub const MSG_TOKEN_EMAIL_MISMATCH: &str = "Token does not match the requested account";
pub const MSG_USERS_OK: &str = "Users retrieved successfully";
pub const MSG_ADMIN_REQUIRED: &str = "Admin access required";

/// 成功响应：状态码 + 信封
#[derive(Debug)]
pub struct Reply<T> {
    pub status: u16,
    pub body: ApiEnvelope<T>,
}

impl<T: Serialize> Reply<T> {
    pub fn ok(data: T, message: &str) -> Self {
        Self {
            status: 200,
            body: ApiEnvelope::ok(data, message),
        }
    }

    pub fn created(data: T, message: &str) -> Self {
        Self {
            status: 201,
            body: ApiEnvelope::ok(data, message),
        }
    }
}

/// 认证业务控制器
///
/// 不依赖 worker 的 Request / Response，目录、令牌、Google 校验和时钟都由外部注入，
/// 测试时换成内存实现即可。
pub struct AuthLogic<'a, D: Directory, G: GoogleVerifier, K: Clock> {
    accounts: AccountService<'a, D, K>,
    jwt: &'a JwtService,
    google: &'a G,
    clock: &'a K,
}

impl<'a, D: Directory, G: GoogleVerifier, K: Clock> AuthLogic<'a, D, G, K> {
    pub fn new(directory: &'a D, jwt: &'a JwtService, google: &'a G, clock: &'a K) -> Self {
        Self {
            accounts: AccountService::new(directory, clock),
            jwt,
            google,
            clock,
        }
    }

    fn issue(&self, user: &StoredUser) -> ApiResult<AuthPayload> {
        let user = user.to_auth_user();
        let token = self
            .jwt
            .issue(&user, self.clock.now())
            .map_err(|e| e.in_op_with("auth.issue", &user.email))?;
        Ok(AuthPayload { token, user })
    }

    pub async fn signup(&self, req: SignupRequestBody) -> ApiResult<Reply<AuthPayload>> {
        let user = self.accounts.create_user(req).await?;
        Ok(Reply::created(self.issue(&user)?, MSG_USER_CREATED))
    }

    pub async fn login(&self, req: LoginRequest) -> ApiResult<Reply<AuthPayload>> {
        let user = self.accounts.login_user(&req.email, &req.password).await?;
        Ok(Reply::ok(self.issue(&user)?, MSG_LOGIN_OK))
    }

    /// 统一 Google 入口：不存在则创建，始终签发令牌并提示设置密码
    pub async fn google_auth(&self, credential: &str) -> ApiResult<Reply<GoogleAuthPayload>> {
        let identity = self.google.verify(credential).await?;
        let (user, created) = self.accounts.find_or_create_google_user(&identity).await?;
        if created {
            log_info!("[Auth] created Google account {}", user.email);
        }

        let payload = self.issue(&user)?;
        Ok(Reply::ok(
            GoogleAuthPayload {
                token: Some(payload.token),
                user: payload.user,
                needs_password: true,
                requires_password: false,
            },
            MSG_GOOGLE_AUTH_OK,
        ))
    }

    /// Google 登录第一步：只确认账号存在，不签发令牌
    pub async fn google_login(&self, credential: &str) -> ApiResult<Reply<GoogleAuthPayload>> {
        let identity = self.google.verify(credential).await?;
        let user = self
            .accounts
            .find_by_email(&identity.email)
            .await?
            .ok_or_else(|| ApiError::not_found(MSG_GOOGLE_NO_ACCOUNT))?;

        Ok(Reply::ok(
            GoogleAuthPayload {
                token: None,
                user: user.to_auth_user(),
                needs_password: false,
                requires_password: true,
            },
            MSG_GOOGLE_ACCOUNT_FOUND,
        ))
    }

    /// Google 登录第二步：校验密码后签发令牌
    pub async fn verify_password(
        &self,
        req: VerifyPasswordRequest,
    ) -> ApiResult<Reply<AuthPayload>> {
        let user = self
            .accounts
            .login_user(&req.email, &req.password)
            .await
            .map_err(|e| match e.status_code() {
                401 => ApiError::unauthorized(MSG_GOOGLE_BAD_PASSWORD),
                _ => e,
            })?;
        Ok(Reply::ok(self.issue(&user)?, MSG_GOOGLE_LOGIN_OK))
    }

    /// 需要 Bearer 令牌，且令牌中的邮箱与请求邮箱一致
    pub async fn set_password(
        &self,
        auth_header: Option<&str>,
        req: SetPasswordRequest,
    ) -> ApiResult<Reply<serde_json::Value>> {
        let token = bearer_token(auth_header)?;
        let claims = self.jwt.verify(token, self.clock.now())?;

        if req.email.is_empty() || req.password.is_empty() {
            return Err(ApiError::invalid_input(MSG_EMAIL_PASSWORD_REQUIRED));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid_input(MSG_PASSWORD_MIN_LEN));
        }
        if claims.email != req.email {
            return Err(
                ApiError::unauthorized(MSG_TOKEN_EMAIL_MISMATCH).in_op_with("auth.set_password", &req.email)
            );
        }

        self.accounts.set_password(&req.email, &req.password).await?;
        Ok(Reply {
            status: 200,
            body: ApiEnvelope {
                success: true,
                message: Some(MSG_PASSWORD_SET.to_string()),
                data: None,
                error: None,
            },
        })
    }

    /// 当前登录用户：以令牌为准，头像按令牌中的 id 从目录补全
    pub async fn me(&self, auth_header: Option<&str>) -> ApiResult<Reply<AuthUser>> {
        let token = bearer_token(auth_header)?;
        let claims = self.jwt.verify(token, self.clock.now())?;

        let mut user = claims.to_user();
        if let Ok(Some(stored)) = self.accounts.find_by_id(&claims.user_id).await {
            user.picture = stored.picture;
        }
        Ok(Reply::ok(user, MSG_ME_OK))
    }

    /// 仅管理员令牌可用
    pub async fn list_users(
        &self,
        auth_header: Option<&str>,
        req: ListUsersRequest,
    ) -> ApiResult<Reply<Vec<AuthUser>>> {
        let token = bearer_token(auth_header)?;
        let claims = self.jwt.verify(token, self.clock.now())?;
        if !claims.role.is_admin() {
            return Err(ApiError::forbidden(MSG_ADMIN_REQUIRED).in_op_with("auth.list_users", &claims.email));
        }

        let users = self
            .accounts
            .list(req.role)
            .await?
            .iter()
            .map(StoredUser::to_auth_user)
            .collect();
        Ok(Reply::ok(users, MSG_USERS_OK))
    }
}

// =========================================================
// 单元测试 (无需 Miniflare/Wasm 环境)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{SAMPLE_ACCOUNTS, UserDirectoryLogic};
    use crate::directory::storage_adapter::MockStorage;
    use crate::google::tests::MockGoogleVerifier;
    use crate::token::{MSG_BAD_AUTH_FORMAT, MSG_INVALID_TOKEN, MSG_MISSING_AUTH_HEADER};
    use std::time::Duration;
    use testhub_shared::date::FixedClock;
    use testhub_shared::models::Role;

    const SECRET: &str = "unit-test-secret";

    struct Fixture {
        dir: UserDirectoryLogic<MockStorage>,
        jwt: JwtService,
        google: MockGoogleVerifier,
        clock: FixedClock,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: UserDirectoryLogic::new(MockStorage::new()),
                jwt: JwtService::new(SECRET, 24),
                google: MockGoogleVerifier::default()
                    .with("cred-new", "new@gmail.com", "New Person")
                    .with("cred-alice", "alice@example.com", "Alice")
                    .with("cred-pic", "pic@gmail.com", "Pic Person")
                    .with_picture("cred-pic", "https://img/pic.png"),
                clock: FixedClock::at(1_700_000_000_000),
            }
        }

        fn logic(&self) -> AuthLogic<'_, UserDirectoryLogic<MockStorage>, MockGoogleVerifier, FixedClock> {
            AuthLogic::new(&self.dir, &self.jwt, &self.google, &self.clock)
        }
    }

    fn signup_alice() -> SignupRequestBody {
        SignupRequestBody {
            name: "alice".into(),
            email: "alice@example.com".into(),
            password: "secret1".into(),
        }
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let fx = Fixture::new();
        let logic = fx.logic();

        let reply = logic.signup(signup_alice()).await.unwrap();
        assert_eq!(reply.status, 201);
        assert_eq!(reply.body.message.as_deref(), Some(MSG_USER_CREATED));
        let data = reply.body.data.unwrap();
        assert_eq!(data.user.role, Role::Tester);

        let claims = fx.jwt.verify(&data.token, fx.clock.now()).unwrap();
        assert_eq!(claims.user_id, data.user.id);

        let reply = logic
            .login(LoginRequest {
                email: "alice@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.message.as_deref(), Some(MSG_LOGIN_OK));
        assert_eq!(reply.body.data.unwrap().user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_conflict() {
        let fx = Fixture::new();
        let logic = fx.logic();
        logic.signup(signup_alice()).await.unwrap();

        let err = logic.signup(signup_alice()).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.message(), "email already registered");
    }

    #[tokio::test]
    async fn test_unified_google_creates_and_issues_token() {
        let fx = Fixture::new();
        let logic = fx.logic();

        let reply = logic.google_auth("cred-new").await.unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_GOOGLE_AUTH_OK));
        let data = reply.body.data.unwrap();
        assert!(data.needs_password);
        assert!(data.token.is_some());
        assert_eq!(data.user.username, "New Person");

        // 第二次走已有账号
        let again = logic.google_auth("cred-new").await.unwrap();
        assert_eq!(again.body.data.unwrap().user.id, data.user.id);

        let err = logic.google_auth("forged").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_google_login_requires_existing_account() {
        let fx = Fixture::new();
        let logic = fx.logic();

        let err = logic.google_login("cred-alice").await.unwrap_err();
        assert_eq!(err.message(), MSG_GOOGLE_NO_ACCOUNT);

        logic.signup(signup_alice()).await.unwrap();
        let reply = logic.google_login("cred-alice").await.unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_GOOGLE_ACCOUNT_FOUND));
        let data = reply.body.data.unwrap();
        assert!(data.requires_password);
        assert!(data.token.is_none());
    }

    #[tokio::test]
    async fn test_verify_password_messages() {
        let fx = Fixture::new();
        let logic = fx.logic();
        logic.signup(signup_alice()).await.unwrap();

        let err = logic
            .verify_password(VerifyPasswordRequest {
                email: "alice@example.com".into(),
                password: "nope".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_GOOGLE_BAD_PASSWORD);

        let reply = logic
            .verify_password(VerifyPasswordRequest {
                email: "alice@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_GOOGLE_LOGIN_OK));
    }

    #[tokio::test]
    async fn test_set_password_flow_for_google_account() {
        let fx = Fixture::new();
        let logic = fx.logic();
        let token = logic
            .google_auth("cred-new")
            .await
            .unwrap()
            .body
            .data
            .unwrap()
            .token
            .unwrap();
        let header = bearer(&token);

        let req = |pw: &str| SetPasswordRequest {
            email: "new@gmail.com".into(),
            password: pw.into(),
        };

        let err = logic.set_password(None, req("123456")).await.unwrap_err();
        assert_eq!(err.message(), MSG_MISSING_AUTH_HEADER);

        let err = logic
            .set_password(Some(&header), req("123"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_PASSWORD_MIN_LEN);

        let err = logic
            .set_password(
                Some(&header),
                SetPasswordRequest {
                    email: "alice@example.com".into(),
                    password: "123456".into(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);

        let reply = logic
            .set_password(Some(&header), req("123456"))
            .await
            .unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_PASSWORD_SET));

        let login = logic
            .login(LoginRequest {
                email: "new@gmail.com".into(),
                password: "123456".into(),
            })
            .await
            .unwrap();
        assert!(login.body.success);
    }

    #[tokio::test]
    async fn test_me_header_handling() {
        let fx = Fixture::new();
        let logic = fx.logic();
        let token = logic.signup(signup_alice()).await.unwrap().body.data.unwrap().token;

        let err = logic.me(None).await.unwrap_err();
        assert_eq!(err.message(), MSG_MISSING_AUTH_HEADER);

        let err = logic.me(Some(&format!("Token {}", token))).await.unwrap_err();
        assert_eq!(err.message(), MSG_BAD_AUTH_FORMAT);

        let err = logic.me(Some("Bearer not-a-jwt")).await.unwrap_err();
        assert_eq!(err.message(), MSG_INVALID_TOKEN);

        let reply = logic.me(Some(&bearer(&token))).await.unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_ME_OK));
        assert_eq!(reply.body.data.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_me_rejects_expired_token() {
        let fx = Fixture::new();
        let logic = fx.logic();
        let token = logic.signup(signup_alice()).await.unwrap().body.data.unwrap().token;

        fx.clock.advance(Duration::from_secs(25 * 3600));
        let err = logic.me(Some(&bearer(&token))).await.unwrap_err();
        assert_eq!(err.message(), MSG_INVALID_TOKEN);
    }

    #[tokio::test]
    async fn test_me_fills_picture_from_directory() {
        let fx = Fixture::new();
        let logic = fx.logic();
        let token = logic
            .google_auth("cred-pic")
            .await
            .unwrap()
            .body
            .data
            .unwrap()
            .token
            .unwrap();

        let user = logic.me(Some(&bearer(&token))).await.unwrap().body.data.unwrap();
        assert_eq!(user.email, "pic@gmail.com");
        assert_eq!(user.picture.as_deref(), Some("https://img/pic.png"));
    }

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let fx = Fixture::new();
        fx.dir.seed(&SAMPLE_ACCOUNTS, fx.clock.now()).await.unwrap();
        let logic = fx.logic();

        let tester = logic.signup(signup_alice()).await.unwrap().body.data.unwrap().token;
        let err = logic
            .list_users(Some(&bearer(&tester)), ListUsersRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), MSG_ADMIN_REQUIRED);

        let err = logic
            .list_users(None, ListUsersRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_MISSING_AUTH_HEADER);

        let admin = logic
            .login(LoginRequest {
                email: "admin@testops.com".into(),
                password: "admin123".into(),
            })
            .await
            .unwrap()
            .body
            .data
            .unwrap()
            .token;

        let reply = logic
            .list_users(Some(&bearer(&admin)), ListUsersRequest::default())
            .await
            .unwrap();
        assert_eq!(reply.body.message.as_deref(), Some(MSG_USERS_OK));
        assert_eq!(reply.body.data.unwrap().len(), 3);

        let testers = logic
            .list_users(
                Some(&bearer(&admin)),
                ListUsersRequest {
                    role: Some(Role::Tester),
                },
            )
            .await
            .unwrap()
            .body
            .data
            .unwrap();
        assert_eq!(testers.len(), 2);
        assert!(testers.iter().all(|u| u.role == Role::Tester));
    }
}
