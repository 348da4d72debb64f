use std::fmt;

use serde::{Deserialize, Serialize};
use testhub_shared::http::HttpError;
use worker::wasm_bindgen::JsValue;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorStatus {
    /// 500: 底层基础设施错误 (DO 存储读写失败、哈希失败等)
    Store,
    /// 404: 用户不存在
    NotFound,
    /// 400: 请求字段校验失败
    InvalidInput,
    /// 401: 凭据或令牌无效
    Unauthorized,
    /// 403: 令牌有效但角色不足
    Forbidden,
    /// 400: 请求体不是合法 JSON
    Serialization,
    /// 502: Google tokeninfo 不可达
    ExternalApi,
    /// 409: 邮箱或用户名已被占用
    Conflict,
}

impl ApiErrorStatus {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiErrorStatus::InvalidInput | ApiErrorStatus::Serialization => 400,
            ApiErrorStatus::Unauthorized => 401,
            ApiErrorStatus::Forbidden => 403,
            ApiErrorStatus::NotFound => 404,
            ApiErrorStatus::Conflict => 409,
            ApiErrorStatus::Store => 500,
            ApiErrorStatus::ExternalApi => 502,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorStatus::InvalidInput => "INVALID_INPUT",
            ApiErrorStatus::Serialization => "JSON_PARSE_ERROR",
            ApiErrorStatus::Unauthorized => "UNAUTHORIZED",
            ApiErrorStatus::Forbidden => "FORBIDDEN",
            ApiErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorStatus::Conflict => "RESOURCE_CONFLICT",
            ApiErrorStatus::Store => "INTERNAL_STORE_ERROR",
            ApiErrorStatus::ExternalApi => "UPSTREAM_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "directory.insert", "google.verify"
    pub operation: String,
    /// 额外的细节信息，如 key 名称、邮箱等
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 后端统一错误
///
/// - status: 错误类型/语义
/// - message: 直接展示给客户端的消息（4xx）
/// - source: 原始错误（可选，用于错误链）
/// - spans: 结构化的调用追踪栈
#[derive(Debug)]
pub struct ApiError {
    pub status: ApiErrorStatus,
    pub message: String,
    /// 原始错误源（供调试用，不参与序列化）
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    spans: Vec<ErrorSpan>,
}

impl ApiError {
    pub fn new(status: ApiErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            source: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Store, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::InvalidInput, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Forbidden, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Serialization, message)
    }

    pub fn external_api(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::ExternalApi, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Conflict, message)
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // --- Accessors ---

    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 传输用错误类型
// =========================================================

/// 用于在 HTTP Header 中标识该 Response Body 是一个 ErrorResponse
pub const RPC_ERROR_HEADER: &str = "X-Rpc-Error";

/// 跨 Durable Object 边界传输的错误
///
/// 序列化为 JSON 放在响应体中，由 `RpcClient` 还原为 `ApiError`，
/// 这样目录对象里产生的 409 / 404 能原样传回 Worker。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: ApiErrorStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<ErrorSpan>,
}

impl ErrorResponse {
    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }
}

// =========================================================
// 类型转换实现
// =========================================================

impl From<ApiError> for ErrorResponse {
    fn from(e: ApiError) -> Self {
        Self {
            status: e.status,
            message: e.message,
            spans: e.spans,
        }
    }
}

impl From<ErrorResponse> for ApiError {
    fn from(e: ErrorResponse) -> Self {
        Self {
            status: e.status,
            message: e.message,
            source: None, // source 不可序列化，跨边界传输时丢失
            spans: e.spans,
        }
    }
}

impl From<worker::Error> for ApiError {
    fn from(e: worker::Error) -> Self {
        ApiError::store(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::serialization(e.to_string()).with_source(e)
    }
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Decode(msg) => ApiError::external_api(format!("unexpected response: {}", msg)),
            other => ApiError::external_api(other.to_string()).with_source(other),
        }
    }
}

impl From<argon2::password_hash::Error> for ApiError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ApiError::store(format!("password hashing failed: {}", e))
    }
}

impl From<jsonwebtoken::errors::Error> for ApiError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        ApiError::store(format!("token encoding failed: {}", e))
    }
}

impl From<JsValue> for ApiError {
    fn from(e: JsValue) -> Self {
        let msg = e.as_string().unwrap_or_else(|| format!("{:?}", e));
        ApiError::store(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_trace() {
        let err = ApiError::conflict("email already registered")
            .in_op_with("directory.insert", "a@b.c")
            .in_op("rpc.call");
        assert_eq!(
            err.to_string(),
            "[RESOURCE_CONFLICT] email already registered | trace: directory.insert(a@b.c) -> rpc.call"
        );
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn error_response_keeps_status_across_boundary() {
        let original = ApiError::not_found("user not found").in_op("directory.set_password");
        let wire = serde_json::to_string(&ErrorResponse::from(original)).unwrap();
        let back: ApiError = serde_json::from_str::<ErrorResponse>(&wire).unwrap().into();
        assert_eq!(back.status, ApiErrorStatus::NotFound);
        assert_eq!(back.message(), "user not found");
        assert_eq!(back.spans().len(), 1);
    }

    #[test]
    fn http_errors_map_to_upstream() {
        let err: ApiError = HttpError::Network("refused".into()).into();
        assert_eq!(err.status_code(), 502);
    }
}
