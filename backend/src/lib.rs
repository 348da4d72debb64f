use worker::*;

// =========================================================
// 宏定义 (日志需在子模块之前声明)
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info { ($($t:tt)*) => (worker::console_log!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info { ($($t:tt)*) => (println!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn { ($($t:tt)*) => (worker::console_warn!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn { ($($t:tt)*) => (eprintln!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_error { ($($t:tt)*) => (worker::console_error!($($t)*)) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error { ($($t:tt)*) => (eprintln!($($t)*)) }

pub mod directory;
pub mod error;
pub mod google;
pub mod logic;
pub mod password;
pub mod service;
pub mod token;

pub(crate) mod utils {
    pub mod request;
    pub mod rpc;
}

use directory::DoDirectory;
use error::{ApiError, ApiResult};
use google::TokenInfoVerifier;
use logic::{AuthLogic, Reply};
use serde::Serialize;
use testhub_shared::HEADER_AUTHORIZATION;
use testhub_shared::date::SystemClock;
use testhub_shared::protocol::ApiRequest as _;
use testhub_shared::protocol::{
    ApiEnvelope, GoogleAuthRequest, GoogleCredential, GoogleLoginRequest, GoogleSignupRequest,
    HEALTH_PATH, ListUsersRequest, LoginRequest, MeRequest, SetPasswordRequest,
    SignupRequestBody, VerifyPasswordRequest,
};
use token::JwtService;
use utils::request::WorkerHttpClient;

// =========================================================
// 常量定义
// =========================================================
const DEFAULT_DIRECTORY_BINDING: &str = "USER_DIRECTORY";
const DEFAULT_JWT_SECRET_NAME: &str = "JWT_SECRET";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const HEADER_ORIGIN: &str = "Origin";
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:3456",
    "http://localhost:3457",
];
/// 未配置密钥时使用，仅供本地开发
const DEV_JWT_SECRET: &str = "testhub-dev-secret-change-me";

const MSG_INVALID_BODY: &str = "Invalid request body";

// =========================================================
// 响应处理
// =========================================================

fn envelope_response<T: Serialize>(body: &ApiEnvelope<T>, status: u16) -> Result<Response> {
    Ok(Response::from_json(body)?.with_status(status))
}

// 将 ApiError 映射为统一信封
fn map_error_to_response(e: ApiError) -> Result<Response> {
    let status = e.status_code();

    // 5xx 只记录日志，不向客户端暴露细节
    if status >= 500 {
        log_error!("Internal Error [{}]: {}", e.error_code(), e);
        return envelope_response(&ApiEnvelope::<()>::fail("Internal Server Error"), status);
    }

    envelope_response(&ApiEnvelope::<()>::fail(e.message()), status)
}

// 统一响应宏
macro_rules! respond {
    ($expr:expr) => {
        match $expr {
            Ok(Reply { status, body }) => envelope_response(&body, status),
            Err(e) => map_error_to_response(e),
        }
    };
}

// 辅助宏：ApiResult 直接透传，其他错误类型经 mapper 转换
macro_rules! unwrap_or_resp {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return map_error_to_response(e),
        }
    };
    ($expr:expr, $err_mapper:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => return map_error_to_response($err_mapper(e.to_string())),
        }
    };
}

fn invalid_body(_: String) -> ApiError {
    ApiError::serialization(MSG_INVALID_BODY)
}

// =========================================================
// 运行时配置
// =========================================================

struct RuntimeConfig {
    directory_binding: String,
    jwt_secret_name: String,
    google_client_id: Option<String>,
    token_ttl_hours: i64,
    allowed_origins: Vec<String>,
}

impl RuntimeConfig {
    fn new(env: &Env) -> Self {
        let var = |name: &str| env.var(name).map(|v| v.to_string()).ok();

        Self {
            directory_binding: var("DIRECTORY_BINDING")
                .unwrap_or_else(|| DEFAULT_DIRECTORY_BINDING.to_string()),
            jwt_secret_name: var("JWT_SECRET_NAME")
                .unwrap_or_else(|| DEFAULT_JWT_SECRET_NAME.to_string()),
            google_client_id: var("GOOGLE_CLIENT_ID").filter(|v| !v.is_empty()),
            token_ttl_hours: var("TOKEN_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_HOURS),
            allowed_origins: parse_origins(var("ALLOWED_ORIGINS").as_deref()),
        }
    }

    fn jwt_service(&self, env: &Env) -> JwtService {
        let secret = env
            .secret(&self.jwt_secret_name)
            .map(|s| s.to_string())
            .ok()
            .filter(|s| !s.is_empty());

        match secret {
            Some(secret) => JwtService::new(&secret, self.token_ttl_hours),
            None => {
                log_warn!(
                    "[Config] secret {} not set, using development JWT secret",
                    self.jwt_secret_name
                );
                JwtService::new(DEV_JWT_SECRET, self.token_ttl_hours)
            }
        }
    }

    /// 请求来源在白名单内时原样回显；浏览器只接受单个来源
    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        let origin = origin.map(str::trim).filter(|o| !o.is_empty())?;
        self.allowed_origins
            .iter()
            .any(|o| o == origin)
            .then(|| origin.to_string())
    }

    /// 来源不在白名单时不写 Allow-Origin / Allow-Credentials
    fn cors(&self, origin: Option<&str>) -> Cors {
        let cors = Cors::new()
            .with_methods(vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ])
            .with_allowed_headers(vec!["Content-Type", HEADER_AUTHORIZATION]);

        match self.allow_origin(origin) {
            Some(origin) => cors.with_origins(vec![origin]).with_credentials(true),
            None => cors,
        }
    }
}

/// `ALLOWED_ORIGINS` 为逗号分隔列表，未配置时使用本地开发来源
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect(),
        None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
    }
}

fn with_cors(resp: Response, cors: &Cors) -> Result<Response> {
    let mut resp = resp.with_cors(cors)?;
    // 回显的来源随请求变化，缓存需区分
    resp.headers_mut().append("Vary", HEADER_ORIGIN)?;
    Ok(resp)
}

fn auth_header(req: &Request) -> Option<String> {
    req.headers().get(HEADER_AUTHORIZATION).ok().flatten()
}

// 每个请求构建一次依赖，Durable Object stub 不跨请求复用
struct Deps {
    directory: DoDirectory,
    jwt: JwtService,
    http: WorkerHttpClient,
    google_client_id: Option<String>,
}

impl Deps {
    fn new(env: &Env) -> ApiResult<Self> {
        let cfg = RuntimeConfig::new(env);
        Ok(Self {
            directory: DoDirectory::new(env, &cfg.directory_binding)
                .map_err(|e| e.in_op("deps.directory"))?,
            jwt: cfg.jwt_service(env),
            http: WorkerHttpClient,
            google_client_id: cfg.google_client_id,
        })
    }

    fn google(&self) -> TokenInfoVerifier<'_, WorkerHttpClient> {
        TokenInfoVerifier::new(&self.http, self.google_client_id.clone())
    }
}

// =========================================================
// API Controllers (适配层)
// =========================================================

async fn signup(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: SignupRequestBody = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.signup(body).await)
}

async fn login(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: LoginRequest = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.login(body).await)
}

/// `/api/auth/google` 与 `/api/auth/google/signup` 共用
async fn google_auth(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: GoogleCredential = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.google_auth(&body.credential).await)
}

async fn google_login(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: GoogleCredential = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.google_login(&body.credential).await)
}

async fn verify_password(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let body: VerifyPasswordRequest = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.verify_password(body).await)
}

async fn set_password(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let header = auth_header(&req);
    let body: SetPasswordRequest = unwrap_or_resp!(req.json().await, invalid_body);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.set_password(header.as_deref(), body).await)
}

async fn me(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let header = auth_header(&req);
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.me(header.as_deref()).await)
}

async fn list_users(req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let header = auth_header(&req);
    let url = req.url()?;
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let query = ListUsersRequest::from_query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let deps = unwrap_or_resp!(Deps::new(&ctx.env));
    let google = deps.google();

    let logic = AuthLogic::new(&deps.directory, &deps.jwt, &google, &SystemClock);
    respond!(logic.list_users(header.as_deref(), query).await)
}

// =========================================================
// Entry Points
// =========================================================

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let origin = req.headers().get(HEADER_ORIGIN).ok().flatten();
    let cors = RuntimeConfig::new(&env).cors(origin.as_deref());

    // 预检请求统一处理
    if req.method() == Method::Options {
        return with_cors(Response::empty()?, &cors);
    }

    let router = Router::new();
    router
        .get(HEALTH_PATH, |_, _| Response::ok("OK"))
        .post_async(SignupRequestBody::PATH, signup)
        .post_async(LoginRequest::PATH, login)
        .get_async(MeRequest::PATH, me)
        .get_async(ListUsersRequest::PATH, list_users)
        .post_async(SetPasswordRequest::PATH, set_password)
        .post_async(GoogleAuthRequest::PATH, google_auth)
        .post_async(GoogleSignupRequest::PATH, google_auth)
        .post_async(GoogleLoginRequest::PATH, google_login)
        .post_async(VerifyPasswordRequest::PATH, verify_password)
        .run(req, env)
        .await
        .and_then(|resp| with_cors(resp, &cors))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(origins: &[&str]) -> RuntimeConfig {
        RuntimeConfig {
            directory_binding: DEFAULT_DIRECTORY_BINDING.to_string(),
            jwt_secret_name: DEFAULT_JWT_SECRET_NAME.to_string(),
            google_client_id: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
        }
    }

    #[test]
    fn test_allow_origin_echoes_single_listed_origin() {
        let cfg = config(&DEFAULT_ALLOWED_ORIGINS);

        assert_eq!(
            cfg.allow_origin(Some("http://localhost:3000")).as_deref(),
            Some("http://localhost:3000")
        );
        assert_eq!(cfg.allow_origin(Some("https://evil.example")), None);
        assert_eq!(cfg.allow_origin(Some("")), None);
        assert_eq!(cfg.allow_origin(None), None);
        // 不做前缀匹配
        assert_eq!(cfg.allow_origin(Some("http://localhost:30001")), None);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(Some(" https://app.testhub.dev , ,http://localhost:8080")),
            vec!["https://app.testhub.dev", "http://localhost:8080"]
        );
        assert_eq!(parse_origins(None).len(), DEFAULT_ALLOWED_ORIGINS.len());
        assert!(parse_origins(Some("")).is_empty());
    }
}
