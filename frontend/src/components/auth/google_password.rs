use super::{FormError, PasswordField};
use crate::auth::use_auth;
use crate::components::icons::Mail;
use leptos::prelude::*;
use leptos::task::spawn_local;
use testhub_shared::auth_client::GooglePasswordMode;
use testhub_shared::forms::GooglePasswordForm;

/// Google 握手的第二步：新账号设置密码，已有账号输入密码
#[component]
pub fn GooglePasswordStep() -> impl IntoView {
    let auth = use_auth();

    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let is_submitting = RwSignal::new(false);
    let error = RwSignal::new(Option::<String>::None);

    // 进入该步骤时模式已确定，组件在 pending 变化时会整体重建
    let Some(pending) = auth.pending_google.get_untracked() else {
        return ().into_any();
    };
    let is_verify = pending.mode == GooglePasswordMode::VerifyPassword;
    let name = pending.user.username.clone();
    let google_email = pending.user.email.clone();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = GooglePasswordForm {
            password: password.get_untracked(),
            confirm_password: confirm.get_untracked(),
        };

        is_submitting.set(true);
        error.set(None);
        spawn_local(async move {
            if let Err(e) = auth.complete_google_password(form).await {
                error.try_set(Some(e.message()));
            }
            is_submitting.try_set(false);
        });
    };

    view! {
        <form class="card-body space-y-2" on:submit=on_submit>
            <h2 class="text-xl font-bold">
                {if is_verify { "Enter Your Password" } else { "Set Your Password" }}
            </h2>
            <p class="text-base-content/70 text-sm">
                {if is_verify {
                    format!("Welcome back, {}! Please enter your password to continue.", name)
                } else {
                    format!(
                        "Welcome, {}! Set a password to access your account with email/password login.",
                        name,
                    )
                }}
            </p>

            <FormError error=error />

            <fieldset class="fieldset">
                <legend class="fieldset-legend">"Email (from Google)"</legend>
                <label class="input w-full input-disabled">
                    <Mail attr:class="h-4 w-4 opacity-50" />
                    <input
                        type="email"
                        class="grow"
                        readonly=true
                        prop:value=google_email
                    />
                </label>
            </fieldset>

            <PasswordField
                label={if is_verify { "Password" } else { "Create Password" }}
                placeholder="Enter password (min 6 characters)"
                value=password
            />
            <PasswordField label="Confirm Password" placeholder="Re-enter password" value=confirm />

            <button type="submit" class="btn btn-primary w-full" disabled=move || is_submitting.get()>
                <Show when=move || is_submitting.get()>
                    <span class="loading loading-spinner loading-sm"></span>
                </Show>
                {if is_verify { "Verify & Continue" } else { "Set Password & Continue" }}
            </button>
            <button type="button" class="btn btn-ghost w-full" on:click=move |_| auth.cancel_google()>
                "Cancel"
            </button>
        </form>
    }
    .into_any()
}
