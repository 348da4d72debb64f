use super::RoleSelect;
use crate::admin::use_admin;
use crate::components::icons::*;
use crate::components::layout::Notice;
use leptos::prelude::*;
use testhub_shared::models::{Role, SignupRequest};

/// 审批注册申请：管理员为新账户指定角色
#[component]
pub fn ApproveRequestDialog(approving: RwSignal<Option<SignupRequest>>, notice: Notice) -> impl IntoView {
    let admin = use_admin();
    let role = RwSignal::new(Role::Tester);

    let on_approve = move |_| {
        let Some(req) = approving.get_untracked() else {
            return;
        };
        match admin.approve_signup_request(req.id, role.get_untracked()) {
            Some(user) => notice.success(format!("{} approved as {}", user.name, user.role.label())),
            None => notice.error("Request is no longer pending"),
        }
        approving.set(None);
        role.set(Role::Tester);
    };

    view! {
        {move || {
            approving
                .get()
                .map(|req| {
                    view! {
                        <div class="modal modal-open">
                            <div class="modal-box">
                                <h3 class="font-bold text-lg flex items-center gap-2">
                                    <CheckCircle attr:class="h-5 w-5 text-success" />
                                    "Approve User Request"
                                </h3>
                                <div class="mt-4 p-3 bg-base-200 rounded-lg">
                                    <p class="font-medium">{req.name}</p>
                                    <p class="text-sm text-base-content/60">{req.email}</p>
                                </div>
                                <p class="text-sm mt-4">"Assign Role"</p>
                                <RoleSelect value=role />
                                <div class="modal-action">
                                    <button
                                        class="btn"
                                        on:click=move |_| {
                                            approving.set(None);
                                            role.set(Role::Tester);
                                        }
                                    >
                                        "Cancel"
                                    </button>
                                    <button class="btn btn-success gap-2" on:click=on_approve>
                                        <Check attr:class="h-4 w-4" />
                                        "Approve"
                                    </button>
                                </div>
                            </div>
                        </div>
                    }
                })
        }}
    }
}
