//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑，不依赖 DOM。定义所有路由、守卫规则和各角色的导航项。

use crate::auth_client::SessionState;
use crate::models::Role;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 落地页
    #[default]
    Landing,
    Auth,
    /// Tester 首页
    Dashboard,
    /// Admin 首页
    Admin,
    AdminCreate,
    AdminHistory,
    AdminUserWork,
    Create,
    Monitor,
    History,
    Users,
    Profile,
    NotFound,
}

/// 守卫类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// 无限制
    Open,
    /// 未登录用户可见，已登录用户被送回首页
    Public,
    /// 需要登录
    Protected,
}

/// 守卫判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// 会话仍在恢复，只显示加载指示
    Loading,
    Render,
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("/");
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" => Self::Landing,
            "/auth" => Self::Auth,
            "/dashboard" => Self::Dashboard,
            "/admin" => Self::Admin,
            "/admin/create" => Self::AdminCreate,
            "/admin/history" => Self::AdminHistory,
            "/admin/user-work" => Self::AdminUserWork,
            "/create" => Self::Create,
            "/monitor" => Self::Monitor,
            "/history" => Self::History,
            "/users" => Self::Users,
            "/profile" => Self::Profile,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Landing => "/",
            Self::Auth => "/auth",
            Self::Dashboard => "/dashboard",
            Self::Admin => "/admin",
            Self::AdminCreate => "/admin/create",
            Self::AdminHistory => "/admin/history",
            Self::AdminUserWork => "/admin/user-work",
            Self::Create => "/create",
            Self::Monitor => "/monitor",
            Self::History => "/history",
            Self::Users => "/users",
            Self::Profile => "/profile",
            Self::NotFound => "/404",
        }
    }

    pub fn guard(&self) -> Guard {
        match self {
            Self::Landing | Self::NotFound => Guard::Open,
            Self::Auth => Guard::Public,
            _ => Guard::Protected,
        }
    }

    /// 认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Auth
    }

    /// 已登录用户的首页：Admin 进入管理面板，其余进入测试面板
    pub fn home_for(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => Self::Admin,
            _ => Self::Dashboard,
        }
    }

    /// **核心守卫逻辑**
    ///
    /// 会话加载期间两种守卫都只返回 `Loading`，受保护内容不会被部分渲染。
    pub fn check(&self, session: &SessionState) -> GuardDecision {
        match (self.guard(), session) {
            (Guard::Open, _) => GuardDecision::Render,
            (_, SessionState::Loading) => GuardDecision::Loading,
            (Guard::Protected, SessionState::Authenticated(_)) => GuardDecision::Render,
            (Guard::Protected, SessionState::Anonymous) => {
                GuardDecision::Redirect(Self::auth_failure_redirect())
            }
            (Guard::Public, SessionState::Authenticated(s)) => {
                GuardDecision::Redirect(Self::home_for(Some(s.user.role)))
            }
            (Guard::Public, SessionState::Anonymous) => GuardDecision::Render,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 导航
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub route: AppRoute,
}

const ADMIN_NAV: &[NavItem] = &[
    NavItem { label: "Dashboard", route: AppRoute::Admin },
    NavItem { label: "Users", route: AppRoute::Users },
    NavItem { label: "Create Suite", route: AppRoute::AdminCreate },
    NavItem { label: "History", route: AppRoute::AdminHistory },
    NavItem { label: "User Work", route: AppRoute::AdminUserWork },
];

const TESTER_NAV: &[NavItem] = &[
    NavItem { label: "Dashboard", route: AppRoute::Dashboard },
    NavItem { label: "Create", route: AppRoute::Create },
    NavItem { label: "History", route: AppRoute::History },
];

pub fn nav_items(role: Option<Role>) -> &'static [NavItem] {
    match role {
        Some(Role::Admin) => ADMIN_NAV,
        _ => TESTER_NAV,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, Session};

    fn signed_in(role: Role) -> SessionState {
        SessionState::Authenticated(Session {
            token: "t".into(),
            user: AuthUser {
                id: "1".into(),
                email: "e@x.io".into(),
                username: "u".into(),
                role,
                picture: None,
            },
        })
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            AppRoute::Landing,
            AppRoute::Auth,
            AppRoute::Dashboard,
            AppRoute::Admin,
            AppRoute::AdminCreate,
            AppRoute::AdminHistory,
            AppRoute::AdminUserWork,
            AppRoute::Create,
            AppRoute::Monitor,
            AppRoute::History,
            AppRoute::Users,
            AppRoute::Profile,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path("/users/"), AppRoute::Users);
        assert_eq!(AppRoute::from_path("/auth?next=1"), AppRoute::Auth);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
    }

    #[test]
    fn protected_route_redirects_anonymous_to_auth() {
        assert_eq!(
            AppRoute::Users.check(&SessionState::Anonymous),
            GuardDecision::Redirect(AppRoute::Auth)
        );
        assert_eq!(AppRoute::Users.check(&signed_in(Role::Tester)), GuardDecision::Render);
    }

    #[test]
    fn auth_page_sends_signed_in_users_home_by_role() {
        assert_eq!(
            AppRoute::Auth.check(&signed_in(Role::Admin)),
            GuardDecision::Redirect(AppRoute::Admin)
        );
        assert_eq!(
            AppRoute::Auth.check(&signed_in(Role::Tester)),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(AppRoute::Auth.check(&SessionState::Anonymous), GuardDecision::Render);
    }

    #[test]
    fn loading_session_blocks_guarded_routes_only() {
        assert_eq!(AppRoute::Admin.check(&SessionState::Loading), GuardDecision::Loading);
        assert_eq!(AppRoute::Auth.check(&SessionState::Loading), GuardDecision::Loading);
        assert_eq!(AppRoute::Landing.check(&SessionState::Loading), GuardDecision::Render);
    }

    #[test]
    fn nav_depends_on_role() {
        assert_eq!(nav_items(Some(Role::Admin)).len(), 5);
        assert_eq!(nav_items(Some(Role::Tester))[1].route, AppRoute::Create);
        assert_eq!(nav_items(None)[0].route, AppRoute::Dashboard);
    }
}
