//! 个人资料设置
//!
//! 头像与用户名只保存在本地；账户信息可从服务器重新拉取。

use crate::auth::use_auth;
use crate::components::icons::*;
use crate::components::layout::{Avatar, Notice, NoticeToast, PageHeader};
use crate::profile::use_profile;
use crate::web::file::read_as_data_url;
use leptos::prelude::*;
use leptos::task::spawn_local;
use testhub_shared::models::{AvatarKind, DEFAULT_AVATARS, UserProfile};
use testhub_shared::profile::ProfileUpdate;
use web_sys::HtmlInputElement;

/// 尚未保存的头像选择
#[derive(Debug, Clone, PartialEq)]
enum AvatarChoice {
    Gradient(usize),
    Image(String),
}

impl AvatarChoice {
    fn of(profile: &UserProfile) -> Self {
        match profile.avatar_kind {
            AvatarKind::Image => AvatarChoice::Image(profile.avatar.clone()),
            AvatarKind::Gradient => {
                AvatarChoice::Gradient(usize::try_from(profile.selected_avatar_index).unwrap_or(0))
            }
        }
    }

    fn to_update(&self) -> ProfileUpdate {
        match self {
            AvatarChoice::Gradient(idx) => ProfileUpdate::gradient(*idx),
            AvatarChoice::Image(url) => ProfileUpdate::uploaded(url.clone()),
        }
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let profile = use_profile();
    let notice = Notice::new();

    let snapshot = profile.profile.get_untracked();
    let username = RwSignal::new(snapshot.username.clone());
    let email = RwSignal::new(snapshot.email.clone());
    let choice = RwSignal::new(AvatarChoice::of(&snapshot));
    let refreshing = RwSignal::new(false);

    // 其他标签页修改资料后同步表单
    Effect::new(move |_| {
        let p = profile.profile.get();
        username.set(p.username.clone());
        email.set(p.email.clone());
        choice.set(AvatarChoice::of(&p));
    });

    let preview = Signal::derive(move || {
        let mut p = profile.profile.get();
        p.username = username.get();
        match choice.get() {
            AvatarChoice::Gradient(idx) => {
                p.avatar = DEFAULT_AVATARS.get(idx).copied().unwrap_or(DEFAULT_AVATARS[0]).to_string();
                p.avatar_kind = AvatarKind::Gradient;
            }
            AvatarChoice::Image(url) => {
                p.avatar = url;
                p.avatar_kind = AvatarKind::Image;
            }
        }
        p
    });

    let on_upload = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|list| list.get(0)) {
            read_as_data_url(&file, move |url| {
                choice.try_set(AvatarChoice::Image(url));
            });
        }
        input.set_value("");
    };

    let on_save = move |_| {
        let mut update = choice.get_untracked().to_update();
        update.username = Some(username.get_untracked().trim().to_string());
        update.email = Some(email.get_untracked().trim().to_string());
        profile.update(update);
        notice.success("Changes saved successfully!");
    };

    let on_refresh = move |_| {
        refreshing.set(true);
        spawn_local(async move {
            match auth.refresh_account().await {
                Ok(user) => notice.success(format!("Account synced for {}", user.email)),
                Err(e) => notice.error(e.message()),
            }
            refreshing.try_set(false);
        });
    };

    let role_label = move || {
        auth.user()
            .map(|u| u.role.label())
            .unwrap_or("-")
    };

    view! {
        <NoticeToast notice=notice />
        <PageHeader title="Profile Settings" subtitle="Manage your account information and preferences." />

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body items-center text-center">
                    <h3 class="card-title self-start">"Profile Picture"</h3>
                    <Avatar profile=preview large=true />
                    <label class="btn btn-outline btn-sm gap-2 mt-4">
                        <Upload attr:class="h-4 w-4" />
                        "Upload Image"
                        <input type="file" class="hidden" accept="image/*" on:change=on_upload />
                    </label>
                    <p class="text-sm text-base-content/60 mt-4">"Choose a default avatar"</p>
                    <div class="flex gap-2 flex-wrap justify-center">
                        {DEFAULT_AVATARS
                            .iter()
                            .enumerate()
                            .map(|(idx, gradient)| {
                                let ring = move || {
                                    if choice.get() == AvatarChoice::Gradient(idx) {
                                        "w-10 h-10 rounded-full ring-2 ring-primary ring-offset-2"
                                    } else {
                                        "w-10 h-10 rounded-full"
                                    }
                                };
                                view! {
                                    <button
                                        type="button"
                                        class=ring
                                        style=format!("background: {}", gradient)
                                        title=format!("Avatar {}", idx + 1)
                                        on:click=move |_| choice.set(AvatarChoice::Gradient(idx))
                                    ></button>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl lg:col-span-2">
                <div class="card-body space-y-2">
                    <h3 class="card-title gap-2">
                        <UserIcon attr:class="h-5 w-5" />
                        "Basic Information"
                    </h3>
                    <fieldset class="fieldset">
                        <legend class="fieldset-legend">"Username"</legend>
                        <input
                            type="text"
                            class="input w-full"
                            prop:value=move || username.get()
                            on:input=move |ev| username.set(event_target_value(&ev))
                        />
                    </fieldset>
                    <fieldset class="fieldset">
                        <legend class="fieldset-legend">"Email Address"</legend>
                        <label class="input w-full">
                            <Mail attr:class="h-4 w-4 opacity-50" />
                            <input
                                type="email"
                                class="grow"
                                prop:value=move || email.get()
                                on:input=move |ev| email.set(event_target_value(&ev))
                            />
                        </label>
                    </fieldset>
                    <div class="card-actions justify-end">
                        <button class="btn btn-primary gap-2" on:click=on_save>
                            <Check attr:class="h-4 w-4" />
                            "Save Changes"
                        </button>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl lg:col-span-3">
                <div class="card-body">
                    <h3 class="card-title">"Account Actions"</h3>
                    <div class="grid grid-cols-1 md:grid-cols-3 gap-4 text-sm">
                        <div>
                            <p class="text-base-content/60">"Role"</p>
                            <p class="font-medium">{role_label}</p>
                        </div>
                        <div>
                            <p class="text-base-content/60">"Account Status"</p>
                            <p class="font-medium text-success">"Active"</p>
                        </div>
                        <div>
                            <p class="text-base-content/60">"Signed in as"</p>
                            <p class="font-medium">
                                {move || auth.user().map(|u| u.email).unwrap_or_default()}
                            </p>
                        </div>
                    </div>
                    <div class="card-actions justify-end mt-4">
                        <button
                            class="btn btn-outline gap-2"
                            disabled=move || refreshing.get()
                            on:click=on_refresh
                        >
                            <Show
                                when=move || refreshing.get()
                                fallback=|| view! { <Activity attr:class="h-4 w-4" /> }
                            >
                                <span class="loading loading-spinner loading-xs"></span>
                            </Show>
                            "Refresh from server"
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
