//! Worker 与 `UserDirectory` 之间的内部 RPC
//!
//! 每条指令是一个 POST 请求：路径来自 `RpcCommand::PATH`，请求体和响应体都是 JSON。
//! 业务错误以 `ErrorResponse` 返回，并带上 `X-Rpc-Error` 标记头。

use crate::error::{ApiError, ApiResult, ErrorResponse, RPC_ERROR_HEADER};

use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use worker::{Headers, Method, Request, RequestInit, Response, Stub, wasm_bindgen::JsValue};

/// 目录对象的一条指令及其响应类型
pub trait RpcCommand: Serialize + DeserializeOwned {
    type Response: Serialize + DeserializeOwned;
    const PATH: &'static str;
}

// =========================================================
// 调用方
// =========================================================

pub struct RpcClient {
    stub: Stub,
    /// 仅用于拼接 URL，如 "http://directory"
    base_url: String,
}

impl RpcClient {
    pub fn new(stub: Stub, base_url: &str) -> Self {
        Self {
            stub,
            base_url: base_url.to_string(),
        }
    }

    fn build_request<T: RpcCommand>(&self, cmd: &T) -> ApiResult<Request> {
        let body = serde_json::to_string(cmd)
            .map_err(|e| ApiError::from(e).in_op_with("rpc.serialize", T::PATH))?;

        let headers = Headers::new();
        headers
            .set("Content-Type", "application/json")
            .map_err(|e| ApiError::from(e).in_op("rpc.headers"))?;

        let mut init = RequestInit::new();
        init.with_method(Method::Post)
            .with_headers(headers)
            .with_body(Some(JsValue::from_str(&body)));

        Request::new_with_init(&format!("{}{}", self.base_url, T::PATH), &init)
            .map_err(|e| ApiError::from(e).in_op_with("rpc.request", T::PATH))
    }

    pub async fn send<T: RpcCommand>(&self, cmd: &T) -> ApiResult<T::Response> {
        let request = self.build_request(cmd)?;
        let mut response = self
            .stub
            .fetch_with_request(request)
            .await
            .map_err(|e| ApiError::from(e).in_op_with("rpc.fetch", T::PATH))?;

        let status = response.status_code();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from(e).in_op_with("rpc.read", T::PATH))?;

        if status == 200 {
            return serde_json::from_str::<T::Response>(&text)
                .map_err(|e| ApiError::from(e).in_op_with("rpc.deserialize", T::PATH));
        }

        // 没有标记头的是平台错误页，不按 ErrorResponse 解析
        let tagged = matches!(response.headers().get(RPC_ERROR_HEADER), Ok(Some(_)));
        if tagged {
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&text) {
                return Err(ApiError::from(err).in_op_with("rpc.call", T::PATH));
            }
        }

        log_warn!("[RPC] {} answered {} without error payload", T::PATH, status);
        Err(ApiError::store(format!("directory call failed [{}]: {}", status, text))
            .in_op_with("rpc.call", T::PATH))
    }
}

// =========================================================
// 对象内处理
// =========================================================

pub struct RpcHandler;

impl RpcHandler {
    fn error_reply(err: ApiError) -> worker::Result<Response> {
        let payload = ErrorResponse::from(err);
        let status = payload.status_code();
        match Response::from_json(&payload) {
            Ok(mut resp) => {
                resp.headers_mut().set(RPC_ERROR_HEADER, "true")?;
                Ok(resp.with_status(status))
            }
            Err(e) => Response::error(format!("Failed to serialize error: {}", e), 500),
        }
    }

    /// 解析指令、调用处理函数并把结果编码为响应
    pub async fn handle<T, F, Fut>(mut req: Request, handler: F) -> worker::Result<Response>
    where
        T: RpcCommand,
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = ApiResult<T::Response>>,
    {
        if req.method() != Method::Post {
            return Response::error("Method Not Allowed", 405);
        }

        let text = req.text().await?;
        // 无参数指令允许空请求体
        let raw = if text.trim().is_empty() { "null" } else { text.as_str() };
        let cmd: T = match serde_json::from_str(raw) {
            Ok(cmd) => cmd,
            Err(e) => return Response::error(format!("Invalid command body: {}", e), 400),
        };

        match handler(cmd).await {
            Ok(result) => Response::from_json(&result),
            Err(e) => Self::error_reply(e),
        }
    }
}
