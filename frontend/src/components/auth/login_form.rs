use super::google_button::GoogleButton;
use super::{AuthMode, FormError, PasswordField};
use crate::auth::use_auth;
use crate::components::icons::Mail;
use crate::web::google::GoogleButtonText;
use leptos::prelude::*;
use leptos::task::spawn_local;
use testhub_shared::forms::LoginForm;

const MSG_GOOGLE_LOGIN_FAILED: &str = "Google login failed. Please try again.";

#[component]
pub fn LoginFormView(mode: RwSignal<AuthMode>) -> impl IntoView {
    let auth = use_auth();

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let remember = RwSignal::new(false);
    let is_submitting = RwSignal::new(false);
    let error = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = LoginForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
        };

        is_submitting.set(true);
        error.set(None);
        spawn_local(async move {
            // 成功后路由服务根据角色重定向
            if let Err(e) = auth.login(form).await {
                error.try_set(Some(e.message()));
            }
            is_submitting.try_set(false);
        });
    };

    let on_google = Callback::new(move |credential: String| {
        if credential.is_empty() {
            error.set(Some(MSG_GOOGLE_LOGIN_FAILED.to_string()));
            return;
        }
        is_submitting.set(true);
        error.set(None);
        spawn_local(async move {
            if let Err(e) = auth.google_login(credential).await {
                error.try_set(Some(e.message()));
            }
            is_submitting.try_set(false);
        });
    });

    view! {
        <form class="space-y-2" on:submit=on_submit>
            <FormError error=error />

            <fieldset class="fieldset">
                <legend class="fieldset-legend">"Email Address"</legend>
                <label class="input w-full">
                    <Mail attr:class="h-4 w-4 opacity-50" />
                    <input
                        type="email"
                        class="grow"
                        placeholder="user@thex.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>
            </fieldset>

            <PasswordField label="Password" placeholder="Enter your password" value=password />

            <div class="flex items-center justify-between text-sm">
                <label class="label cursor-pointer gap-2">
                    <input
                        type="checkbox"
                        class="checkbox checkbox-sm"
                        prop:checked=move || remember.get()
                        on:change=move |ev| remember.set(event_target_checked(&ev))
                    />
                    "Remember Me"
                </label>
                <a
                    class="link link-primary"
                    on:click=move |_| mode.set(AuthMode::ForgotPassword)
                >
                    "Forgot Password?"
                </a>
            </div>

            <button type="submit" class="btn btn-primary w-full" disabled=move || is_submitting.get()>
                <Show when=move || is_submitting.get()>
                    <span class="loading loading-spinner loading-sm"></span>
                </Show>
                "Sign In"
            </button>

            <div class="divider text-xs">"OR"</div>
            <GoogleButton text=GoogleButtonText::SignIn on_credential=on_google />
        </form>
    }
}
