//! TESTHUB 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `testhub_shared::route`: 路由定义与守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth` / `profile` / `admin`: 在根组件创建并注入的状态上下文
//! - `components`: UI 组件层

mod admin;
mod auth;
mod config;
mod profile;
mod components {
    pub mod admin_dashboard;
    pub mod auth;
    pub mod create_suite;
    pub mod dashboard;
    pub mod history;
    mod icons;
    pub mod landing;
    pub mod layout;
    pub mod monitor;
    pub mod profile;
    pub mod user_work;
    pub mod users;
}

use crate::admin::AdminContext;
use crate::auth::AuthContext;
use crate::components::admin_dashboard::AdminDashboardPage;
use crate::components::auth::AuthPage;
use crate::components::create_suite::CreateSuitePage;
use crate::components::dashboard::DashboardPage;
use crate::components::history::HistoryPage;
use crate::components::landing::LandingPage;
use crate::components::layout::AppShell;
use crate::components::monitor::MonitorPage;
use crate::components::profile::ProfilePage;
use crate::components::user_work::UserWorkPage;
use crate::components::users::UsersPage;
use crate::profile::ProfileContext;

use leptos::prelude::*;
use testhub_shared::auth_client::SessionState;

// 浏览器 API 适配层：实现共享层的 KeyValueStore / HttpClient
pub(crate) mod web {
    pub mod file;
    pub mod google;
    mod http;
    pub mod router;
    mod storage;

    pub use http::FetchClient;
    pub use storage::BrowserStorage;
}

use testhub_shared::route::AppRoute;
use web::BrowserStorage;
use web::router::{Link, Router, RouterOutlet};

/// 受保护页面统一套上侧边栏布局
fn shell(page: AnyView) -> AnyView {
    view! { <AppShell>{page}</AppShell> }.into_any()
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Landing => view! { <LandingPage /> }.into_any(),
        AppRoute::Auth => view! { <AuthPage /> }.into_any(),
        AppRoute::Dashboard => shell(view! { <DashboardPage /> }.into_any()),
        AppRoute::Admin => shell(view! { <AdminDashboardPage /> }.into_any()),
        AppRoute::AdminCreate | AppRoute::Create => {
            shell(view! { <CreateSuitePage /> }.into_any())
        }
        AppRoute::AdminHistory | AppRoute::History => shell(view! { <HistoryPage /> }.into_any()),
        AppRoute::AdminUserWork => shell(view! { <UserWorkPage /> }.into_any()),
        AppRoute::Monitor => shell(view! { <MonitorPage /> }.into_any()),
        AppRoute::Users => shell(view! { <UsersPage /> }.into_any()),
        AppRoute::Profile => shell(view! { <ProfilePage /> }.into_any()),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center space-y-4">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl">"Page not found"</p>
                    <Link route=AppRoute::Landing class="btn btn-primary">
                        "Back to home"
                    </Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建各上下文，三者共享同一个存储句柄
    let storage = BrowserStorage::new();
    let auth_ctx = AuthContext::new(storage.clone());
    let profile_ctx = ProfileContext::new(storage.clone());
    let admin_ctx = AdminContext::new(storage);
    provide_context(auth_ctx);
    provide_context(profile_ctx);
    provide_context(admin_ctx);

    // 2. 校验已保存的令牌，完成前会话为 Loading
    auth_ctx.restore();

    // 3. 会话变化时同步个人资料
    Effect::new(move |_| {
        auth_ctx.session.with(|state| match state {
            SessionState::Authenticated(session) => profile_ctx.sign_in(&session.user),
            SessionState::Anonymous => {
                if profile_ctx.profile.with_untracked(|p| p.is_logged_in) {
                    profile_ctx.clear();
                }
            }
            SessionState::Loading => {}
        });
    });

    let session = auth_ctx.session_signal();

    view! {
        // 4. 路由器组件：注入会话信号实现守卫
        <Router session=session>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
