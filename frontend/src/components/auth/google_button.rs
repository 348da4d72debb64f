use crate::config;
use crate::web::google::{GoogleButtonText, render_button};
use leptos::html::Div;
use leptos::logging::warn;
use leptos::prelude::*;

/// Google 登录按钮；收到空 credential 表示 Google 侧失败
#[component]
pub fn GoogleButton(text: GoogleButtonText, on_credential: Callback<String>) -> impl IntoView {
    let container = NodeRef::<Div>::new();
    let unavailable = RwSignal::new(false);

    Effect::new(move |_| {
        let Some(el) = container.get() else {
            return;
        };
        let Some(client_id) = config::google_client_id() else {
            unavailable.set(true);
            return;
        };
        if !render_button(&el, client_id, text, move |cred| on_credential.run(cred)) {
            warn!("[Auth] Google Identity Services script not loaded");
            unavailable.set(true);
        }
    });

    view! {
        <div class="flex justify-center">
            <div node_ref=container></div>
            <Show when=move || unavailable.get()>
                <button type="button" class="btn btn-outline w-full" disabled=true>
                    "Google sign-in unavailable"
                </button>
            </Show>
        </div>
    }
}
