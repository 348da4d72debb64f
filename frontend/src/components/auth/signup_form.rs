use super::google_button::GoogleButton;
use super::{AuthMode, FormError, PasswordField};
use crate::auth::use_auth;
use crate::components::icons::{CheckCircle, Mail, UserIcon};
use crate::web::google::GoogleButtonText;
use leptos::prelude::*;
use leptos::task::spawn_local;
use testhub_shared::forms::SignupForm;

const MSG_GOOGLE_SIGNUP_FAILED: &str = "Google signup failed. Please try again.";

#[component]
pub fn SignupFormView(mode: RwSignal<AuthMode>) -> impl IntoView {
    let auth = use_auth();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let accept_terms = RwSignal::new(false);
    let is_submitting = RwSignal::new(false);
    let succeeded = RwSignal::new(false);
    let error = RwSignal::new(Option::<String>::None);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = SignupForm {
            name: name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            confirm_password: confirm.get_untracked(),
            accept_terms: accept_terms.get_untracked(),
        };

        error.set(None);
        // 本地校验失败时不发请求
        if let Some(msg) = form.validate().message() {
            error.set(Some(msg.to_string()));
            return;
        }

        is_submitting.set(true);
        spawn_local(async move {
            match auth.signup(form).await {
                Ok(()) => {
                    for field in [name, email, password, confirm] {
                        field.try_set(String::new());
                    }
                    accept_terms.try_set(false);
                    succeeded.try_set(true);
                }
                Err(e) => {
                    error.try_set(Some(e.message()));
                }
            }
            is_submitting.try_set(false);
        });
    };

    let on_google = Callback::new(move |credential: String| {
        if credential.is_empty() {
            error.set(Some(MSG_GOOGLE_SIGNUP_FAILED.to_string()));
            return;
        }
        is_submitting.set(true);
        error.set(None);
        spawn_local(async move {
            if let Err(e) = auth.google_signup(credential).await {
                error.try_set(Some(e.message()));
            }
            is_submitting.try_set(false);
        });
    });

    let mismatch = move || {
        confirm.with(|c| !c.is_empty()) && password.with(|p| confirm.with(|c| p != c))
    };

    view! {
        <Show
            when=move || !succeeded.get()
            fallback=move || {
                view! {
                    <div class="text-center space-y-4 py-4">
                        <CheckCircle attr:class="h-12 w-12 text-success mx-auto" />
                        <h2 class="text-xl font-bold">"Account Created Successfully!"</h2>
                        <p class="text-base-content/70">"You can now log in with your email and password."</p>
                        <button class="btn btn-primary w-full" on:click=move |_| mode.set(AuthMode::Login)>
                            "Go to Login"
                        </button>
                    </div>
                }
            }
        >
            <form class="space-y-2" on:submit=on_submit>
                <FormError error=error />

                <fieldset class="fieldset">
                    <legend class="fieldset-legend">"Full Name"</legend>
                    <label class="input w-full">
                        <UserIcon attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="text"
                            class="grow"
                            placeholder="John Doe"
                            prop:value=move || name.get()
                            on:input=move |ev| name.set(event_target_value(&ev))
                        />
                    </label>
                </fieldset>

                <fieldset class="fieldset">
                    <legend class="fieldset-legend">"Email Address"</legend>
                    <label class="input w-full">
                        <Mail attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="email"
                            class="grow"
                            placeholder="john@company.com"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                    </label>
                </fieldset>

                <PasswordField label="Password" placeholder="Create a password" value=password />
                <PasswordField label="Confirm Password" placeholder="Confirm your password" value=confirm />
                <Show when=mismatch>
                    <p class="text-error text-xs">"Passwords do not match"</p>
                </Show>

                <label class="label cursor-pointer gap-2 text-sm">
                    <input
                        type="checkbox"
                        class="checkbox checkbox-sm"
                        prop:checked=move || accept_terms.get()
                        on:change=move |ev| accept_terms.set(event_target_checked(&ev))
                    />
                    <span>
                        "I agree to the " <a class="link link-primary">"Terms & Conditions"</a>
                        " and " <a class="link link-primary">"Privacy Policy"</a>
                    </span>
                </label>

                <button type="submit" class="btn btn-primary w-full" disabled=move || is_submitting.get()>
                    <Show when=move || is_submitting.get()>
                        <span class="loading loading-spinner loading-sm"></span>
                    </Show>
                    "Create Account"
                </button>

                <div class="divider text-xs">"OR"</div>
                <GoogleButton text=GoogleButtonText::SignUp on_credential=on_google />
            </form>
        </Show>
    }
}
