//! Google ID Token 校验
//!
//! 通过 Google `tokeninfo` 端点校验前端拿到的 credential。配置了客户端 ID 时
//! 还要求 `aud` 与之相同。

use crate::error::{ApiError, ApiResult};
use serde::Deserialize;
use testhub_shared::http::{HttpClient, HttpRequest};

pub const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// 从 ID Token 中取出的用户资料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub email_verified: bool,
}

#[async_trait::async_trait(?Send)]
pub trait GoogleVerifier {
    async fn verify(&self, credential: &str) -> ApiResult<GoogleIdentity>;
}

/// tokeninfo 的布尔字段以字符串返回
#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(default)]
    email_verified: Option<String>,
}

pub struct TokenInfoVerifier<'a, C: HttpClient> {
    client: &'a C,
    client_id: Option<String>,
}

impl<'a, C: HttpClient> TokenInfoVerifier<'a, C> {
    pub fn new(client: &'a C, client_id: Option<String>) -> Self {
        Self { client, client_id }
    }
}

fn verify_failed(reason: impl std::fmt::Display) -> ApiError {
    ApiError::unauthorized(format!("Failed to verify Google token: {}", reason))
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> GoogleVerifier for TokenInfoVerifier<'_, C> {
    async fn verify(&self, credential: &str) -> ApiResult<GoogleIdentity> {
        if credential.trim().is_empty() {
            return Err(verify_failed("missing credential"));
        }

        let url = format!("{}?id_token={}", TOKENINFO_URL, credential);
        let resp = self
            .client
            .send(HttpRequest::get(&url))
            .await
            .map_err(|e| ApiError::from(e).in_op("google.tokeninfo"))?;

        if !resp.ok() {
            return Err(verify_failed(format!("tokeninfo returned {}", resp.status)));
        }

        let info: TokenInfo = resp
            .json()
            .map_err(|e| ApiError::from(e).in_op("google.decode"))?;

        if self
            .client_id
            .as_ref()
            .is_some_and(|expected| info.aud != *expected)
        {
            return Err(verify_failed("audience mismatch"));
        }

        let email = info
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| verify_failed("token has no email"))?;

        Ok(GoogleIdentity {
            name: info.name.unwrap_or_default(),
            picture: info.picture.filter(|p| !p.is_empty()),
            email_verified: info.email_verified.as_deref() == Some("true"),
            email,
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::ApiErrorStatus;
    use serde_json::json;
    use std::collections::HashMap;
    use testhub_shared::http::MockHttpClient;

    /// 固定 credential -> 身份映射，供上层逻辑测试使用
    #[derive(Default)]
    pub struct MockGoogleVerifier {
        identities: HashMap<String, GoogleIdentity>,
    }

    impl MockGoogleVerifier {
        pub fn with(mut self, credential: &str, email: &str, name: &str) -> Self {
            self.identities.insert(
                credential.to_string(),
                GoogleIdentity {
                    email: email.to_string(),
                    name: name.to_string(),
                    picture: None,
                    email_verified: true,
                },
            );
            self
        }

        pub fn with_picture(mut self, credential: &str, url: &str) -> Self {
            if let Some(identity) = self.identities.get_mut(credential) {
                identity.picture = Some(url.to_string());
            }
            self
        }
    }

    #[async_trait::async_trait(?Send)]
    impl GoogleVerifier for MockGoogleVerifier {
        async fn verify(&self, credential: &str) -> ApiResult<GoogleIdentity> {
            self.identities
                .get(credential)
                .cloned()
                .ok_or_else(|| verify_failed("invalid token"))
        }
    }

    fn tokeninfo(cred: &str) -> String {
        format!("{}?id_token={}", TOKENINFO_URL, cred)
    }

    #[tokio::test]
    async fn reads_identity_from_tokeninfo() {
        let http = MockHttpClient::new();
        http.mock_response(
            &tokeninfo("cred-1"),
            200,
            json!({"aud": "client-1", "email": "jane@gmail.com", "name": "Jane Doe",
                   "picture": "https://img/jane.png", "email_verified": "true"}),
        );

        let verifier = TokenInfoVerifier::new(&http, Some("client-1".into()));
        let identity = verifier.verify("cred-1").await.unwrap();
        assert_eq!(identity.email, "jane@gmail.com");
        assert_eq!(identity.name, "Jane Doe");
        assert!(identity.email_verified);
        assert_eq!(identity.picture.as_deref(), Some("https://img/jane.png"));
    }

    #[tokio::test]
    async fn audience_must_match_configured_client() {
        let http = MockHttpClient::new();
        http.mock_response(
            &tokeninfo("cred-2"),
            200,
            json!({"aud": "someone-else", "email": "jane@gmail.com", "name": "Jane"}),
        );

        let err = TokenInfoVerifier::new(&http, Some("client-1".into()))
            .verify("cred-2")
            .await
            .unwrap_err();
        assert_eq!(err.status, ApiErrorStatus::Unauthorized);
        assert!(err.message().starts_with("Failed to verify Google token"));

        // 未配置客户端 ID 时不检查 aud
        assert!(TokenInfoVerifier::new(&http, None).verify("cred-2").await.is_ok());
    }

    #[tokio::test]
    async fn rejected_credential_is_unauthorized() {
        let http = MockHttpClient::new();
        http.mock_response(&tokeninfo("bad"), 400, json!({"error": "invalid_token"}));

        let err = TokenInfoVerifier::new(&http, None).verify("bad").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn unreachable_google_is_upstream_error() {
        let http = MockHttpClient::new();
        http.set_unreachable(true);

        let err = TokenInfoVerifier::new(&http, None).verify("x").await.unwrap_err();
        assert_eq!(err.status, ApiErrorStatus::ExternalApi);
    }
}
