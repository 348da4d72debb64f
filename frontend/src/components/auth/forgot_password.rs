use super::AuthMode;
use crate::components::icons::{ArrowLeft, Mail};
use leptos::prelude::*;

/// 重置密码表单：目前不发送邮件，提交后回到登录
#[component]
pub fn ForgotPasswordForm(mode: RwSignal<AuthMode>) -> impl IntoView {
    let email = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        mode.set(AuthMode::Login);
    };

    view! {
        <form class="card-body space-y-2" on:submit=on_submit>
            <button
                type="button"
                class="btn btn-ghost btn-sm self-start gap-2"
                on:click=move |_| mode.set(AuthMode::Login)
            >
                <ArrowLeft attr:class="h-4 w-4" />
                "Back to login"
            </button>
            <h2 class="text-xl font-bold">"Reset Password"</h2>
            <p class="text-base-content/70 text-sm">
                "Enter your email address and we'll send you a reset link"
            </p>
            <fieldset class="fieldset">
                <legend class="fieldset-legend">"Email Address"</legend>
                <label class="input w-full">
                    <Mail attr:class="h-4 w-4 opacity-50" />
                    <input
                        type="email"
                        class="grow"
                        placeholder="user@thex.com"
                        required=true
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>
            </fieldset>
            <button type="submit" class="btn btn-primary w-full">"Send Reset Link"</button>
        </form>
    }
}
