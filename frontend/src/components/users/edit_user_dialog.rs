use super::RoleSelect;
use crate::admin::use_admin;
use crate::components::auth::{FormError, PasswordField};
use crate::components::icons::*;
use crate::components::layout::Notice;
use leptos::prelude::*;
use testhub_shared::forms::EditUserForm;
use testhub_shared::models::{ManagedUser, UserStatus};

/// 编辑对话框；`editing` 为 `Some` 时显示
#[component]
pub fn EditUserDialog(editing: RwSignal<Option<ManagedUser>>, notice: Notice) -> impl IntoView {
    move || {
        editing
            .get()
            .map(|user| view! { <EditUserBody user=user editing=editing notice=notice /> })
    }
}

#[component]
fn EditUserBody(user: ManagedUser, editing: RwSignal<Option<ManagedUser>>, notice: Notice) -> impl IntoView {
    let admin = use_admin();
    let initial = EditUserForm::from_user(&user);

    let name = RwSignal::new(initial.name);
    let email = RwSignal::new(initial.email);
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(initial.role);
    let status = RwSignal::new(initial.status);
    let error = RwSignal::new(None::<String>);

    let user_id = user.id;
    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let form = EditUserForm {
            name: name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            role: role.get_untracked(),
            status: status.get_untracked(),
        };
        if let Some(msg) = form.validate().message() {
            error.set(Some(msg.to_string()));
            return;
        }
        if admin.update_user(user_id, form.to_patch()) {
            notice.success("User updated");
        } else {
            notice.error("User not found");
        }
        editing.set(None);
    };

    view! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg flex items-center gap-2">
                    <Pencil attr:class="h-5 w-5" />
                    "Edit User"
                </h3>
                <p class="text-sm text-base-content/60">"Update user information and credentials"</p>
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
                    <PasswordField
                        label="New Password (leave blank to keep current)"
                        placeholder="Enter new password"
                        value=password
                    />
                    <div class="grid grid-cols-2 gap-4">
                        <RoleSelect value=role />
                        <fieldset class="fieldset">
                            <legend class="fieldset-legend">"Status"</legend>
                            <select
                                class="select w-full"
                                on:change=move |ev| {
                                    let next = if event_target_value(&ev) == "Inactive" {
                                        UserStatus::Inactive
                                    } else {
                                        UserStatus::Active
                                    };
                                    status.set(next);
                                }
                            >
                                {[UserStatus::Active, UserStatus::Inactive]
                                    .into_iter()
                                    .map(|s| {
                                        view! {
                                            <option value=s.label() selected=move || status.get() == s>
                                                {s.label()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                        </fieldset>
                    </div>
                    <div class="modal-action">
                        <button type="button" class="btn" on:click=move |_| editing.set(None)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary">"Save Changes"</button>
                    </div>
                </form>
            </div>
        </div>
    }
}
