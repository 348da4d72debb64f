//! 登录 / 注册页
//!
//! 同一路由下切换四种视图：登录、注册、忘记密码、Google 密码步骤。
//! 登录成功后无需手动跳转，路由服务会按角色重定向。

mod forgot_password;
mod google_button;
mod google_password;
mod login_form;
mod signup_form;

use crate::auth::use_auth;
use crate::components::icons::*;
use forgot_password::ForgotPasswordForm;
use google_password::GooglePasswordStep;
use leptos::prelude::*;
use login_form::LoginFormView;
use signup_form::SignupFormView;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuthMode {
    Login,
    Signup,
    ForgotPassword,
}

/// 带显示/隐藏切换的密码输入框
#[component]
pub(crate) fn PasswordField(
    #[prop(into)] label: String,
    #[prop(into)] placeholder: String,
    value: RwSignal<String>,
) -> impl IntoView {
    let visible = RwSignal::new(false);

    view! {
        <fieldset class="fieldset">
            <legend class="fieldset-legend">{label}</legend>
            <label class="input w-full">
                <Lock attr:class="h-4 w-4 opacity-50" />
                <input
                    type=move || if visible.get() { "text" } else { "password" }
                    class="grow"
                    placeholder=placeholder
                    prop:value=move || value.get()
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
                <button
                    type="button"
                    class="btn btn-ghost btn-xs btn-circle"
                    on:click=move |_| visible.update(|v| *v = !*v)
                >
                    {move || {
                        if visible.get() {
                            view! { <EyeOff attr:class="h-4 w-4" /> }.into_any()
                        } else {
                            view! { <Eye attr:class="h-4 w-4" /> }.into_any()
                        }
                    }}
                </button>
            </label>
        </fieldset>
    }
}

/// 错误提示条
#[component]
pub(crate) fn FormError(error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.with(|e| e.is_some())>
            <div role="alert" class="alert alert-error alert-soft text-sm py-2">
                <XCircle attr:class="h-5 w-5" />
                <span>{move || error.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

#[component]
pub fn AuthPage() -> impl IntoView {
    let auth = use_auth();
    let mode = RwSignal::new(AuthMode::Login);

    let tab_class = move |target: AuthMode| {
        move || {
            if mode.get() == target {
                "tab tab-active"
            } else {
                "tab"
            }
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ShieldCheck attr:class="h-8 w-8" />
                        </div>
                        <h1 class="text-3xl font-bold tracking-wider">"TESTHUB"</h1>
                        <p class="text-base-content/70">"Automated Testing Platform"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    {move || {
                        if auth.pending_google.with(|p| p.is_some()) {
                            return view! { <GooglePasswordStep /> }.into_any();
                        }
                        match mode.get() {
                            AuthMode::ForgotPassword => {
                                view! { <ForgotPasswordForm mode=mode /> }.into_any()
                            }
                            current => {
                                view! {
                                    <div class="card-body">
                                        <div role="tablist" class="tabs tabs-box mb-2">
                                            <a
                                                role="tab"
                                                class=tab_class(AuthMode::Login)
                                                on:click=move |_| mode.set(AuthMode::Login)
                                            >
                                                "Log In"
                                            </a>
                                            <a
                                                role="tab"
                                                class=tab_class(AuthMode::Signup)
                                                on:click=move |_| mode.set(AuthMode::Signup)
                                            >
                                                "Sign Up"
                                            </a>
                                        </div>
                                        {if current == AuthMode::Login {
                                            view! { <LoginFormView mode=mode /> }.into_any()
                                        } else {
                                            view! { <SignupFormView mode=mode /> }.into_any()
                                        }}
                                    </div>
                                }
                                .into_any()
                            }
                        }
                    }}
                </div>
            </div>
        </div>
    }
}
