//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程，
//! 验证规则统一由 `AppRoute::check` 给出。

use leptos::logging::log;
use leptos::prelude::*;
use testhub_shared::auth_client::SessionState;
use testhub_shared::route::{AppRoute, GuardDecision};
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

fn write_history(path: &str, use_push: bool) {
    if use_push {
        push_history_state(path);
    } else {
        replace_history_state(path);
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 会话状态以信号注入，路由层不直接依赖认证实现。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 会话状态（注入的信号）
    session: Signal<SessionState>,
}

impl RouterService {
    fn new(session: Signal<SessionState>) -> Self {
        // 初始路由从 URL 解析；守卫在会话恢复完成后由 Effect 执行
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn go(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let decision = target_route.check(&self.session.get_untracked());

        let route = match decision {
            GuardDecision::Redirect(redirect) => {
                log!("[Router] {} denied, redirecting to {}", target_route, redirect);
                redirect
            }
            // Loading 时先切换，恢复完成后由 Effect 重新判定
            GuardDecision::Loading | GuardDecision::Render => target_route,
        };

        write_history(route.to_path(), use_push);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target_route = AppRoute::from_path(&current_path());
            // popstate 时也执行守卫逻辑，历史记录已经变化，只能替换
            router.navigate_to_route(target_route, false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话状态变化（恢复完成、登录、登出、令牌失效）时重新执行守卫
    fn setup_session_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let session = self.session;

        Effect::new(move |_| {
            let decision = session.with(|s| current_route.get_untracked().check(s));

            if let GuardDecision::Redirect(redirect) = decision {
                log!(
                    "[Router] Session changed on {}, redirecting to {}",
                    current_route.get_untracked(),
                    redirect
                );
                replace_history_state(redirect.to_path());
                set_route.set(redirect);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<SessionState>) -> RouterService {
    let router = RouterService::new(session);

    router.init_popstate_listener();
    router.setup_session_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    expect_context::<RouterService>()
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话状态信号
    session: Signal<SessionState>,
    children: Children,
) -> impl IntoView {
    provide_router(session);

    children()
}

/// 加载指示（会话恢复期间）
#[component]
pub fn FullPageSpinner() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 路由出口组件
///
/// 根据当前路由与守卫判定渲染组件，受保护内容不会在判定前出现。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();
    let session = router.session;

    // 只在路由或判定变化时重建页面，会话内的用户信息更新不触发重渲染
    let decision = Memo::new(move |_| {
        let current = router.current_route().get();
        (current, session.with(|s| current.check(s)))
    });

    move || {
        let (current, decision) = decision.get();
        match decision {
            GuardDecision::Render => matcher(current),
            // Redirect 由 Effect 处理，这一帧只显示加载
            GuardDecision::Loading | GuardDecision::Redirect(_) => {
                view! { <FullPageSpinner /> }.into_any()
            }
        }
    }
}

/// 站内链接：拦截点击，走路由服务而非整页刷新
#[component]
pub fn Link(
    route: AppRoute,
    #[prop(into, optional)] class: MaybeProp<String>,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.go(route);
    };

    view! {
        <a href=route.to_path() class=move || class.get().unwrap_or_default() on:click=on_click>
            {children()}
        </a>
    }
}
