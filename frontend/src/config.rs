//! 构建期配置
//!
//! 通过环境变量在 `trunk build` 时注入，未设置时使用本地开发默认值。

const DEFAULT_API_URL: &str = "http://localhost:8080";

/// 后端 API 根地址
pub fn api_base_url() -> &'static str {
    match option_env!("TESTHUB_API_URL") {
        Some(url) if !url.is_empty() => url,
        _ => DEFAULT_API_URL,
    }
}

/// Google OAuth Client ID；未配置时不渲染 Google 按钮
pub fn google_client_id() -> Option<&'static str> {
    option_env!("TESTHUB_GOOGLE_CLIENT_ID").filter(|id| !id.is_empty())
}
