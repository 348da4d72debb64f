//! 账号服务：注册、登录、Google 账号、设置密码
//!
//! 只依赖 `Directory` 和 `Clock`，不接触 worker 的 Request / Response。

use crate::directory::{
    Directory, MSG_EMAIL_TAKEN, MSG_USER_NOT_FOUND, MSG_USERNAME_TAKEN, StoredUser,
};
use crate::error::{ApiError, ApiResult};
use crate::google::GoogleIdentity;
use crate::password::{hash_password, verify_password};
use testhub_shared::MIN_PASSWORD_LEN;
use testhub_shared::date::Clock;
use testhub_shared::models::Role;
use testhub_shared::protocol::SignupRequestBody;

pub const MSG_USERNAME_REQUIRED: &str = "username is required";
pub const MSG_EMAIL_REQUIRED: &str = "email is required";
pub const MSG_PASSWORD_REQUIRED: &str = "password is required";
pub const MSG_NAME_REQUIRED: &str = "name is required";
pub const MSG_BAD_CREDENTIALS: &str = "invalid email or password";
pub const MSG_PASSWORD_TOO_SHORT: &str = "password must be at least 6 characters";

fn require(value: &str, message: &'static str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_input(message));
    }
    Ok(())
}

pub struct AccountService<'a, D: Directory, K: Clock> {
    directory: &'a D,
    clock: &'a K,
}

impl<'a, D: Directory, K: Clock> AccountService<'a, D, K> {
    pub fn new(directory: &'a D, clock: &'a K) -> Self {
        Self { directory, clock }
    }

    /// 邮箱注册，角色固定为 tester
    pub async fn create_user(&self, req: SignupRequestBody) -> ApiResult<StoredUser> {
        require(&req.name, MSG_USERNAME_REQUIRED)?;
        require(&req.email, MSG_EMAIL_REQUIRED)?;
        require(&req.password, MSG_PASSWORD_REQUIRED)?;

        if self.directory.find_by_email(&req.email).await?.is_some() {
            return Err(ApiError::conflict(MSG_EMAIL_TAKEN));
        }
        if self.directory.username_exists(&req.name).await? {
            return Err(ApiError::conflict(MSG_USERNAME_TAKEN));
        }

        let user = StoredUser::new(
            &req.name,
            &req.email,
            Some(hash_password(&req.password)?),
            Role::Tester,
            self.clock.now(),
        );
        self.directory
            .insert(user)
            .await
            .map_err(|e| e.in_op_with("account.create", &req.email))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> ApiResult<StoredUser> {
        require(email, MSG_EMAIL_REQUIRED)?;
        require(password, MSG_PASSWORD_REQUIRED)?;

        let user = self
            .directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(MSG_BAD_CREDENTIALS))?;

        // 未设置密码的 Google 账号同样视为密码错误
        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));
        if !matches {
            return Err(ApiError::unauthorized(MSG_BAD_CREDENTIALS));
        }
        Ok(user)
    }

    /// 返回 `(用户, 是否新建)`。新建账号以 Google 名字作为用户名，没有密码。
    pub async fn find_or_create_google_user(
        &self,
        identity: &GoogleIdentity,
    ) -> ApiResult<(StoredUser, bool)> {
        require(&identity.email, MSG_EMAIL_REQUIRED)?;
        require(&identity.name, MSG_NAME_REQUIRED)?;

        if let Some(existing) = self.directory.find_by_email(&identity.email).await? {
            return Ok((existing, false));
        }

        let user = StoredUser::new(
            &identity.name,
            &identity.email,
            None,
            Role::Tester,
            self.clock.now(),
        )
        .with_picture(identity.picture.clone());
        let created = self
            .directory
            .insert(user)
            .await
            .map_err(|e| e.in_op_with("account.google_create", &identity.email))?;
        Ok((created, true))
    }

    pub async fn find_by_email(&self, email: &str) -> ApiResult<Option<StoredUser>> {
        require(email, MSG_EMAIL_REQUIRED)?;
        self.directory.find_by_email(email).await
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<StoredUser>> {
        self.directory.find_by_id(id).await
    }

    /// 按创建时间倒序
    pub async fn list(&self, role: Option<Role>) -> ApiResult<Vec<StoredUser>> {
        self.directory.list(role).await
    }

    pub async fn set_password(&self, email: &str, password: &str) -> ApiResult<StoredUser> {
        require(email, MSG_EMAIL_REQUIRED)?;
        require(password, MSG_PASSWORD_REQUIRED)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid_input(MSG_PASSWORD_TOO_SHORT));
        }

        if self.directory.find_by_email(email).await?.is_none() {
            return Err(ApiError::not_found(MSG_USER_NOT_FOUND));
        }

        let hash = hash_password(password)?;
        self.directory
            .set_password_hash(email, hash, self.clock.now())
            .await
            .map_err(|e| e.in_op_with("account.set_password", email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserDirectoryLogic;
    use crate::directory::storage_adapter::MockStorage;
    use crate::error::ApiErrorStatus;
    use testhub_shared::date::FixedClock;

    fn signup(name: &str, email: &str, password: &str) -> SignupRequestBody {
        SignupRequestBody {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn google(email: &str, name: &str) -> GoogleIdentity {
        GoogleIdentity {
            email: email.into(),
            name: name.into(),
            picture: Some("https://lh3.example/p.png".into()),
            email_verified: true,
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(1_700_000_000_000);
        let svc = AccountService::new(&dir, &clock);

        let user = svc
            .create_user(signup("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.role, Role::Tester);
        let hash = user.password_hash.as_deref().unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", hash));
        assert_eq!(user.created_at, clock.now().to_datetime());
    }

    #[tokio::test]
    async fn test_create_user_validation_order() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(0);
        let svc = AccountService::new(&dir, &clock);

        let cases = [
            (signup(" ", "", ""), MSG_USERNAME_REQUIRED),
            (signup("a", "", ""), MSG_EMAIL_REQUIRED),
            (signup("a", "a@b.c", ""), MSG_PASSWORD_REQUIRED),
        ];
        for (req, expected) in cases {
            let err = svc.create_user(req).await.unwrap_err();
            assert_eq!(err.message(), expected);
            assert_eq!(err.status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_create_user_conflicts() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(0);
        let svc = AccountService::new(&dir, &clock);
        svc.create_user(signup("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        let err = svc
            .create_user(signup("bob", "alice@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_EMAIL_TAKEN);

        let err = svc
            .create_user(signup("alice", "bob@example.com", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password_and_unknown_email() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(0);
        let svc = AccountService::new(&dir, &clock);
        svc.create_user(signup("alice", "alice@example.com", "secret1"))
            .await
            .unwrap();

        assert!(svc.login_user("alice@example.com", "secret1").await.is_ok());

        for (email, pw) in [("alice@example.com", "wrong"), ("nobody@example.com", "secret1")] {
            let err = svc.login_user(email, pw).await.unwrap_err();
            assert_eq!(err.message(), MSG_BAD_CREDENTIALS);
            assert_eq!(err.status_code(), 401);
        }

        let err = svc.login_user("", "x").await.unwrap_err();
        assert_eq!(err.message(), MSG_EMAIL_REQUIRED);
    }

    #[tokio::test]
    async fn test_google_user_created_once_without_password() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(0);
        let svc = AccountService::new(&dir, &clock);

        let (user, created) = svc
            .find_or_create_google_user(&google("g@example.com", "Gina G"))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(user.username, "Gina G");
        assert!(user.password_hash.is_none());
        assert_eq!(user.picture.as_deref(), Some("https://lh3.example/p.png"));

        let (again, created) = svc
            .find_or_create_google_user(&google("g@example.com", "Gina G"))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, user.id);

        // 无密码账号不能走邮箱登录
        let err = svc.login_user("g@example.com", "anything").await.unwrap_err();
        assert_eq!(err.message(), MSG_BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_set_password_rules() {
        let dir = UserDirectoryLogic::new(MockStorage::new());
        let clock = FixedClock::at(0);
        let svc = AccountService::new(&dir, &clock);
        svc.find_or_create_google_user(&google("g@example.com", "Gina"))
            .await
            .unwrap();

        let err = svc.set_password("g@example.com", "12345").await.unwrap_err();
        assert_eq!(err.message(), MSG_PASSWORD_TOO_SHORT);

        let err = svc
            .set_password("ghost@example.com", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err.status, ApiErrorStatus::NotFound));

        clock.advance(std::time::Duration::from_secs(60));
        let updated = svc.set_password("g@example.com", "123456").await.unwrap();
        assert_eq!(updated.updated_at, clock.now().to_datetime());
        assert!(svc.login_user("g@example.com", "123456").await.is_ok());
    }
}
