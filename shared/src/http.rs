//! HTTP 抽象层
//!
//! 前端用 `fetch` 实现，后端用 Worker `Fetch` 实现，测试用 `MockHttpClient`。

use crate::protocol::HttpMethod;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fmt;

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// 请求构建失败
    RequestBuild(String),
    /// 网络不可达、CORS 被拒等
    Network(String),
    /// 响应体无法按预期解析
    Decode(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::RequestBuild(msg) => write!(f, "request build failed: {}", msg),
            HttpError::Network(msg) => write!(f, "network error: {}", msg),
            HttpError::Decode(msg) => write!(f, "response decode failed: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

// =========================================================
// 请求 / 响应
// =========================================================

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(url, HttpMethod::Get)
    }

    pub fn post(url: &str) -> Self {
        Self::new(url, HttpMethod::Post)
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// 序列化为 JSON 请求体并设置 Content-Type
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, HttpError> {
        let raw = serde_json::to_string(body).map_err(|e| HttpError::RequestBuild(e.to_string()))?;
        self.body = Some(raw);
        Ok(self.with_header("Content-Type", "application/json"))
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockHttpClient, RecordedRequest};

#[cfg(any(test, feature = "mock"))]
mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub method: HttpMethod,
        pub headers: HashMap<String, String>,
        pub body: Option<String>,
    }

    #[derive(Default)]
    struct Inner {
        // URL -> (Status, Body)
        responses: HashMap<String, (u16, String)>,
        unreachable: bool,
        requests: Vec<RecordedRequest>,
    }

    /// 按 URL 返回预设响应，并记录所有发出的请求。克隆后共享状态。
    #[derive(Clone, Default)]
    pub struct MockHttpClient(Rc<RefCell<Inner>>);

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn mock_response(&self, url: &str, status: u16, body: serde_json::Value) {
            self.0
                .borrow_mut()
                .responses
                .insert(url.to_string(), (status, body.to_string()));
        }

        /// 之后的所有请求都以网络错误失败
        pub fn set_unreachable(&self, unreachable: bool) {
            self.0.borrow_mut().unreachable = unreachable;
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.0.borrow().requests.clone()
        }

        pub fn request_count(&self) -> usize {
            self.0.borrow().requests.len()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl HttpClient for MockHttpClient {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut inner = self.0.borrow_mut();
            inner.requests.push(RecordedRequest {
                url: req.url.clone(),
                method: req.method,
                headers: req.headers.clone(),
                body: req.body.clone(),
            });

            if inner.unreachable {
                return Err(HttpError::Network("connection refused".to_string()));
            }

            match inner.responses.get(&req.url) {
                Some((status, body)) => Ok(HttpResponse {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(HttpResponse {
                    status: 404,
                    body: "Not Found".to_string(),
                }),
            }
        }
    }
}
