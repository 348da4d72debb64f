//! JWT 令牌服务
//!
//! HS256 签名。Workers 运行时没有可用的 `SystemTime`，因此过期时间由调用方
//! 传入的 `Timestamp` 显式检查，不交给 jsonwebtoken 校验。

use crate::error::{ApiError, ApiResult};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use testhub_shared::BEARER_PREFIX;
use testhub_shared::date::Timestamp;
use testhub_shared::models::{AuthUser, Role};

pub const TOKEN_ISSUER: &str = "testops-backend";

pub const MSG_MISSING_AUTH_HEADER: &str = "Missing authorization header";
pub const MSG_BAD_AUTH_FORMAT: &str = "Invalid authorization format. Expected: Bearer <token>";
pub const MSG_INVALID_TOKEN: &str = "Invalid or expired token";

/// 令牌内携带的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    pub fn to_user(&self) -> AuthUser {
        AuthUser {
            id: self.user_id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            picture: None,
        }
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn issue(&self, user: &AuthUser, now: Timestamp) -> ApiResult<String> {
        let iat = now.as_secs();
        let claims = Claims {
            user_id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            exp: iat + self.ttl_hours * 3600,
            iat,
            iss: TOKEN_ISSUER.to_string(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn verify(&self, token: &str, now: Timestamp) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iat", "iss"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| ApiError::unauthorized(MSG_INVALID_TOKEN).with_source(e))?;

        if data.claims.exp <= now.as_secs() {
            return Err(ApiError::unauthorized(MSG_INVALID_TOKEN).in_op("token.expired"));
        }
        Ok(data.claims)
    }
}

/// 解析 `Authorization` 头，必须恰好是 `Bearer <token>` 两段
pub fn bearer_token(header: Option<&str>) -> ApiResult<&str> {
    let header = header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ApiError::unauthorized(MSG_MISSING_AUTH_HEADER))?;

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_PREFIX => Ok(*token),
        _ => Err(ApiError::unauthorized(MSG_BAD_AUTH_FORMAT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorStatus;

    const NOW: Timestamp = Timestamp::new(1_764_583_200_000);

    fn user() -> AuthUser {
        AuthUser {
            id: "u-1".into(),
            email: "admin@testops.com".into(),
            username: "admin".into(),
            role: Role::Admin,
            picture: None,
        }
    }

    #[test]
    fn issued_token_decodes_to_same_user() {
        let jwt = JwtService::new("secret", 24);
        let token = jwt.issue(&user(), NOW).unwrap();
        let claims = jwt.verify(&token, NOW).unwrap();
        assert_eq!(claims.to_user(), user());
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret", 24);
        let token = jwt.issue(&user(), NOW).unwrap();
        let later = Timestamp::new(NOW.as_millis() + 24 * 3600 * 1000);
        let err = jwt.verify(&token, later).unwrap_err();
        assert_eq!(err.status, ApiErrorStatus::Unauthorized);
        assert_eq!(err.message(), MSG_INVALID_TOKEN);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = JwtService::new("other", 24).issue(&user(), NOW).unwrap();
        assert!(JwtService::new("secret", 24).verify(&token, NOW).is_err());
        assert!(JwtService::new("secret", 24).verify("not.a.jwt", NOW).is_err());
    }

    #[test]
    fn bearer_header_shapes() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(
            bearer_token(None).unwrap_err().message(),
            MSG_MISSING_AUTH_HEADER
        );
        for bad in ["abc", "Basic abc", "Bearer a b", "bearer abc"] {
            assert_eq!(bearer_token(Some(bad)).unwrap_err().message(), MSG_BAD_AUTH_FORMAT);
        }
    }
}
