//! 登录后的页面框架：侧边导航、头像入口、登出，以及页面通用的提示框

use crate::auth::use_auth;
use crate::components::icons::*;
use crate::profile::use_profile;
use crate::web::router::{Link, use_router};
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use testhub_shared::models::{AvatarKind, UserProfile};
use testhub_shared::route::{AppRoute, nav_items};

const NOTICE_MS: u32 = 3_000;

// =========================================================
// 提示框
// =========================================================

/// 页面级提示：消息内容与是否出错，3 秒后自动消失
#[derive(Clone, Copy)]
pub struct Notice {
    current: RwSignal<Option<(String, bool)>>,
}

impl Notice {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
        }
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.show(msg.into(), false);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.show(msg.into(), true);
    }

    fn show(&self, msg: String, is_err: bool) {
        let current = self.current;
        current.set(Some((msg.clone(), is_err)));
        Timeout::new(NOTICE_MS, move || {
            // 期间出现了新提示则保留新提示；页面已卸载时信号不可用
            let same = current.try_with_untracked(|c| c.as_ref().is_some_and(|(m, _)| *m == msg));
            if same == Some(true) {
                current.try_set(None);
            }
        })
        .forget();
    }
}

#[component]
pub fn NoticeToast(notice: Notice) -> impl IntoView {
    view! {
        {move || {
            notice
                .current
                .get()
                .map(|(msg, is_err)| {
                    let class = if is_err {
                        "alert alert-error shadow-lg"
                    } else {
                        "alert alert-success shadow-lg"
                    };
                    view! {
                        <div class="toast toast-top toast-end z-50">
                            <div class=class>
                                <span>{msg}</span>
                            </div>
                        </div>
                    }
                })
        }}
    }
}

// =========================================================
// 头像
// =========================================================

/// 渐变或上传图片头像；渐变头像显示首字母
#[component]
pub fn Avatar(profile: Signal<UserProfile>, #[prop(optional)] large: bool) -> impl IntoView {
    let size = if large { "w-24 h-24 text-3xl" } else { "w-9 h-9 text-sm" };

    move || {
        let p = profile.get();
        match p.avatar_kind {
            AvatarKind::Image => view! {
                <div class="avatar">
                    <div class=format!("{} rounded-full", size)>
                        <img src=p.avatar.clone() alt="avatar" />
                    </div>
                </div>
            }
            .into_any(),
            AvatarKind::Gradient => view! {
                <div class="avatar placeholder">
                    <div
                        class=format!("{} rounded-full text-white font-bold", size)
                        style=format!("background: {}", p.avatar)
                    >
                        <span>{p.initials()}</span>
                    </div>
                </div>
            }
            .into_any(),
        }
    }
}

// =========================================================
// 框架
// =========================================================

fn nav_icon(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Users => view! { <UsersIcon attr:class="h-4 w-4" /> }.into_any(),
        AppRoute::AdminCreate | AppRoute::Create => {
            view! { <FlaskConical attr:class="h-4 w-4" /> }.into_any()
        }
        AppRoute::AdminHistory | AppRoute::History => {
            view! { <HistoryIcon attr:class="h-4 w-4" /> }.into_any()
        }
        AppRoute::AdminUserWork => view! { <Briefcase attr:class="h-4 w-4" /> }.into_any(),
        _ => view! { <LayoutDashboard attr:class="h-4 w-4" /> }.into_any(),
    }
}

#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let profile = use_profile();
    let router = use_router();

    let role = move || auth.session.with(|s| s.role());
    let profile_signal: Signal<UserProfile> = profile.profile.into();

    let on_logout = move |_| {
        auth.logout();
        profile.clear();
        router.go(AppRoute::Auth);
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200 font-sans">
            <input id="testhub-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content flex flex-col">
                <div class="navbar bg-base-100 shadow lg:hidden">
                    <label for="testhub-drawer" class="btn btn-ghost drawer-button">"☰"</label>
                    <span class="text-xl font-bold tracking-wider">"TESTHUB"</span>
                </div>
                <main class="p-4 md:p-8 max-w-7xl w-full mx-auto">{children()}</main>
            </div>
            <div class="drawer-side z-40">
                <label for="testhub-drawer" class="drawer-overlay"></label>
                <aside class="w-64 min-h-full bg-base-100 flex flex-col border-r border-base-300">
                    <div class="flex items-center gap-2 px-6 h-16 border-b border-base-300">
                        <div class="p-2 bg-primary/10 rounded-lg text-primary">
                            <ShieldCheck attr:class="h-5 w-5" />
                        </div>
                        <span class="text-xl font-bold tracking-wider">"TESTHUB"</span>
                    </div>
                    <ul class="menu flex-1 p-4 gap-1">
                        {move || {
                            let current = router.current_route().get();
                            nav_items(role())
                                .iter()
                                .map(|item| {
                                    let class = if item.route == current {
                                        "active"
                                    } else {
                                        ""
                                    };
                                    view! {
                                        <li>
                                            <Link route=item.route class=class>
                                                {nav_icon(item.route)}
                                                {item.label}
                                            </Link>
                                        </li>
                                    }
                                })
                                .collect_view()
                        }}
                    </ul>
                    <div class="p-4 border-t border-base-300 space-y-2">
                        <Link
                            route=AppRoute::Profile
                            class="flex items-center gap-3 p-2 rounded-lg hover:bg-base-200"
                        >
                            <Avatar profile=profile_signal />
                            <div class="min-w-0">
                                <p class="font-medium truncate">
                                    {move || profile.profile.with(|p| p.username.clone())}
                                </p>
                                <p class="text-xs text-base-content/60 truncate">
                                    {move || role().map(|r| r.label()).unwrap_or_default()}
                                </p>
                            </div>
                        </Link>
                        <button on:click=on_logout class="btn btn-outline btn-error btn-sm w-full gap-2">
                            <LogOut attr:class="h-4 w-4" />
                            "Sign Out"
                        </button>
                    </div>
                </aside>
            </div>
        </div>
    }
}

/// 页面标题区
#[component]
pub fn PageHeader(
    #[prop(into)] title: String,
    #[prop(into)] subtitle: String,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4 mb-8">
            <div>
                <h1 class="text-3xl font-bold">{title}</h1>
                <p class="text-base-content/70">{subtitle}</p>
            </div>
            {children.map(|c| c())}
        </div>
    }
}

/// 删除类操作的二次确认框
#[component]
pub fn ConfirmDialog(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: String,
    message: Signal<String>,
    #[prop(into)] confirm_label: String,
    on_confirm: Callback<()>,
    on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">{title.clone()}</h3>
                    <p class="py-4">{move || message.get()}</p>
                    <div class="modal-action">
                        <button class="btn" on:click=move |_| on_cancel.run(())>"Cancel"</button>
                        <button class="btn btn-error gap-2" on:click=move |_| on_confirm.run(())>
                            <Trash2 attr:class="h-4 w-4" />
                            {confirm_label.clone()}
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
