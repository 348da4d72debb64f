//! 用户管理：账户列表、待审批注册申请及增删改

mod add_user_dialog;
mod approve_dialog;
mod edit_user_dialog;

use crate::admin::use_admin;
use crate::components::icons::*;
use crate::components::layout::{ConfirmDialog, Notice, NoticeToast, PageHeader};
use add_user_dialog::AddUserDialog;
use approve_dialog::ApproveRequestDialog;
use edit_user_dialog::EditUserDialog;
use leptos::prelude::*;
use testhub_shared::models::{ManagedUser, Role, SignupRequest, UserStatus};
use testhub_shared::views::{UserSummary, search_pending_requests, search_users};

/// 角色下拉框（新增、编辑、审批共用）
#[component]
fn RoleSelect(value: RwSignal<Role>) -> impl IntoView {
    view! {
        <fieldset class="fieldset">
            <legend class="fieldset-legend">"Role"</legend>
            <select
                class="select w-full"
                on:change=move |ev| {
                    if let Some(role) = Role::parse(&event_target_value(&ev)) {
                        value.set(role);
                    }
                }
            >
                {[Role::Tester, Role::Admin]
                    .into_iter()
                    .map(|role| {
                        view! {
                            <option value=role.as_str() selected=move || value.get() == role>
                                {role.label()}
                            </option>
                        }
                    })
                    .collect_view()}
            </select>
        </fieldset>
    }
}

fn role_badge(role: Role) -> impl IntoView {
    let class = if role.is_admin() {
        "badge badge-secondary badge-soft"
    } else {
        "badge badge-info badge-soft"
    };
    view! { <span class=class>{role.label()}</span> }
}

fn status_badge(status: UserStatus) -> impl IntoView {
    let class = match status {
        UserStatus::Active => "badge badge-success badge-soft",
        UserStatus::Inactive => "badge badge-ghost",
    };
    view! { <span class=class>{status.label()}</span> }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let admin = use_admin();
    let notice = Notice::new();

    let user_query = RwSignal::new(String::new());
    let request_query = RwSignal::new(String::new());
    let add_open = RwSignal::new(false);
    let editing = RwSignal::new(None::<ManagedUser>);
    let viewing = RwSignal::new(None::<ManagedUser>);
    let deleting = RwSignal::new(None::<ManagedUser>);
    let approving = RwSignal::new(None::<SignupRequest>);

    let summary = Memo::new(move |_| {
        admin
            .users
            .with(|users| admin.signup_requests.with(|reqs| UserSummary::of(users, reqs)))
    });
    let users = move || {
        admin.users.with(|all| {
            user_query.with(|q| search_users(all, q).into_iter().cloned().collect::<Vec<_>>())
        })
    };
    let requests = move || {
        admin.signup_requests.with(|all| {
            request_query
                .with(|q| search_pending_requests(all, q).into_iter().cloned().collect::<Vec<_>>())
        })
    };

    let reject = move |req: SignupRequest| {
        if admin.reject_signup_request(req.id) {
            notice.success(format!("Request from {} rejected", req.name));
        }
    };

    let confirm_delete = Callback::new(move |_| {
        if let Some(user) = deleting.get_untracked() {
            if admin.delete_user(user.id) {
                notice.success(format!("{} deleted", user.name));
            } else {
                notice.error("User not found");
            }
        }
        deleting.set(None);
    });

    view! {
        <NoticeToast notice=notice />
        <PageHeader title="User Management" subtitle="Manage users, roles, and access requests.">
            <button class="btn btn-primary gap-2" on:click=move |_| add_open.set(true)>
                <Plus attr:class="h-4 w-4" />
                "Add User"
            </button>
        </PageHeader>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100 mb-6">
            <div class="stat">
                <div class="stat-title">"Total Users"</div>
                <div class="stat-value">{move || summary.get().total}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Active"</div>
                <div class="stat-value text-success">{move || summary.get().active}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Pending Requests"</div>
                <div class="stat-value text-warning">{move || summary.get().pending}</div>
            </div>
        </div>

        // 待审批申请
        <Show when=move || { summary.get().pending > 0 }>
            <div class="card bg-base-100 shadow-xl mb-6">
                <div class="card-body">
                    <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4">
                        <h2 class="card-title gap-2">
                            <Clock attr:class="h-5 w-5 text-warning" />
                            "Pending Requests"
                            <span class="badge badge-warning">{move || summary.get().pending}</span>
                        </h2>
                        <label class="input md:w-72">
                            <Search attr:class="h-4 w-4 opacity-50" />
                            <input
                                type="search"
                                class="grow"
                                placeholder="Search requests..."
                                prop:value=move || request_query.get()
                                on:input=move |ev| request_query.set(event_target_value(&ev))
                            />
                        </label>
                    </div>
                    <div class="space-y-2 mt-4">
                        <For
                            each=requests
                            key=|r| r.id
                            children=move |req| {
                                let approve_req = req.clone();
                                let reject_req = req.clone();
                                view! {
                                    <div class="flex flex-col md:flex-row md:items-center gap-3 p-3 bg-base-200 rounded-lg">
                                        <div class="flex-1 min-w-0">
                                            <p class="font-medium">{req.name.clone()}</p>
                                            <p class="text-xs text-base-content/60">
                                                {format!("{} · requested {}", req.email, req.request_date)}
                                            </p>
                                        </div>
                                        <div class="flex gap-2">
                                            <button
                                                class="btn btn-success btn-sm gap-1"
                                                on:click=move |_| approving.set(Some(approve_req.clone()))
                                            >
                                                <Check attr:class="h-4 w-4" />
                                                "Approve"
                                            </button>
                                            <button
                                                class="btn btn-outline btn-error btn-sm gap-1"
                                                on:click=move |_| reject(reject_req.clone())
                                            >
                                                <XIcon attr:class="h-4 w-4" />
                                                "Reject"
                                            </button>
                                        </div>
                                    </div>
                                }
                            }
                        />
                    </div>
                </div>
            </div>
        </Show>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4 mb-4">
                    <h2 class="card-title">"All Users"</h2>
                    <label class="input md:w-80">
                        <Search attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="search"
                            class="grow"
                            placeholder="Search by name, email, or role..."
                            prop:value=move || user_query.get()
                            on:input=move |ev| user_query.set(event_target_value(&ev))
                        />
                    </label>
                </div>
                <div class="overflow-x-auto">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"User"</th>
                                <th>"Role"</th>
                                <th>"Status"</th>
                                <th>"Last Active"</th>
                                <th class="text-right">"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            // 行内容随编辑变化，整表重新渲染
                            {move || {
                                users()
                                    .into_iter()
                                    .map(|user| {
                                        let for_view = user.clone();
                                        let for_edit = user.clone();
                                        let for_delete = user.clone();
                                        view! {
                                            <tr class="hover">
                                                <td>
                                                    <div class="font-medium">{user.name.clone()}</div>
                                                    <div class="text-xs text-base-content/60">
                                                        {user.email.clone()}
                                                    </div>
                                                </td>
                                                <td>{role_badge(user.role)}</td>
                                                <td>{status_badge(user.status)}</td>
                                                <td class="text-base-content/60">{user.last_active.clone()}</td>
                                                <td class="text-right space-x-1">
                                                    <button
                                                        class="btn btn-ghost btn-xs btn-square"
                                                        title="View"
                                                        on:click=move |_| viewing.set(Some(for_view.clone()))
                                                    >
                                                        <Eye attr:class="h-4 w-4" />
                                                    </button>
                                                    <button
                                                        class="btn btn-ghost btn-xs btn-square"
                                                        title="Edit"
                                                        on:click=move |_| editing.set(Some(for_edit.clone()))
                                                    >
                                                        <Pencil attr:class="h-4 w-4" />
                                                    </button>
                                                    <button
                                                        class="btn btn-ghost btn-xs btn-square text-error"
                                                        title="Delete"
                                                        on:click=move |_| deleting.set(Some(for_delete.clone()))
                                                    >
                                                        <Trash2 attr:class="h-4 w-4" />
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </tbody>
                    </table>
                </div>
            </div>
        </div>

        <AddUserDialog open=add_open notice=notice />
        <EditUserDialog editing=editing notice=notice />
        <ApproveRequestDialog approving=approving notice=notice />
        <UserDetailDialog viewing=viewing />
        <ConfirmDialog
            open=Signal::derive(move || deleting.with(Option::is_some))
            title="Delete User"
            message=Signal::derive(move || {
                deleting
                    .with(|u| {
                        u.as_ref()
                            .map(|u| {
                                format!(
                                    "Are you sure you want to delete {}? This action cannot be undone.",
                                    u.name,
                                )
                            })
                            .unwrap_or_default()
                    })
            })
            confirm_label="Delete"
            on_confirm=confirm_delete
            on_cancel=Callback::new(move |_| deleting.set(None))
        />
    }
}

/// 用户详情（只读）
#[component]
fn UserDetailDialog(viewing: RwSignal<Option<ManagedUser>>) -> impl IntoView {
    move || {
        viewing.get().map(|user| {
            let rows = [
                ("Full Name", user.name.clone()),
                ("Email Address", user.email.clone()),
                ("Role", user.role.label().to_string()),
                ("Status", user.status.label().to_string()),
                ("Joined Date", user.joined_date.clone()),
                ("Last Activity", user.last_active.clone()),
                ("Company", user.company.clone().unwrap_or_else(|| "-".to_string())),
            ];
            view! {
                <div class="modal modal-open">
                    <div class="modal-box">
                        <h3 class="font-bold text-lg flex items-center gap-2">
                            <UserIcon attr:class="h-5 w-5" />
                            "User Profile"
                        </h3>
                        <p class="text-sm text-base-content/60">"View user details and information"</p>
                        <dl class="mt-4 divide-y divide-base-300">
                            {rows
                                .into_iter()
                                .map(|(label, value)| {
                                    view! {
                                        <div class="flex justify-between py-2 text-sm">
                                            <dt class="text-base-content/60">{label}</dt>
                                            <dd class="font-medium">{value}</dd>
                                        </div>
                                    }
                                })
                                .collect_view()}
                        </dl>
                        <div class="modal-action">
                            <button class="btn" on:click=move |_| viewing.set(None)>"Close"</button>
                        </div>
                    </div>
                </div>
            }
        })
    }
}
