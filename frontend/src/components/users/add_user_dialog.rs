use super::RoleSelect;
use crate::admin::use_admin;
use crate::components::auth::{FormError, PasswordField};
use crate::components::icons::*;
use crate::components::layout::Notice;
use leptos::prelude::*;
use testhub_shared::forms::AddUserForm;
use testhub_shared::models::Role;

#[component]
pub fn AddUserDialog(open: RwSignal<bool>, notice: Notice) -> impl IntoView {
    let admin = use_admin();

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(Role::Tester);
    let error = RwSignal::new(None::<String>);

    let reset = move || {
        name.set(String::new());
        email.set(String::new());
        password.set(String::new());
        role.set(Role::Tester);
        error.set(None);
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let form = AddUserForm {
            name: name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            role: role.get_untracked(),
        };
        if let Some(msg) = form.validate().message() {
            error.set(Some(msg.to_string()));
            return;
        }
        if let Some(user) = admin.add_user(form.to_new_user()) {
            notice.success(format!("{} added", user.name));
        }
        reset();
        open.set(false);
    };

    let on_cancel = move |_| {
        reset();
        open.set(false);
    };

    view! {
        <Show when=move || open.get()>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg flex items-center gap-2">
                        <Plus attr:class="h-5 w-5" />
                        "Add New User"
                    </h3>
                    <p class="text-sm text-base-content/60">"Create a new user account with credentials"</p>
                    <form class="space-y-2 mt-4" on:submit=on_submit>
                        <FormError error=error />
                        <fieldset class="fieldset">
                            <legend class="fieldset-legend">"Full Name"</legend>
                            <input
                                type="text"
                                class="input w-full"
                                placeholder="Enter full name"
                                prop:value=move || name.get()
                                on:input=move |ev| name.set(event_target_value(&ev))
                            />
                        </fieldset>
                        <fieldset class="fieldset">
                            <legend class="fieldset-legend">"Email Address"</legend>
                            <input
                                type="email"
                                class="input w-full"
                                placeholder="user@example.com"
                                prop:value=move || email.get()
                                on:input=move |ev| email.set(event_target_value(&ev))
                            />
                        </fieldset>
                        <PasswordField label="Password" placeholder="Set a password" value=password />
                        <RoleSelect value=role />
                        <div class="modal-action">
                            <button type="button" class="btn" on:click=on_cancel>"Cancel"</button>
                            <button type="submit" class="btn btn-primary">"Create User"</button>
                        </div>
                    </form>
                </div>
            </div>
        </Show>
    }
}
