//! 管理员查看各测试人员的执行记录

use crate::admin::use_admin;
use crate::components::history::{RunCard, RunSummaryBar};
use crate::components::icons::*;
use crate::components::layout::{ConfirmDialog, Notice, NoticeToast, PageHeader};
use leptos::prelude::*;
use std::collections::BTreeMap;
use testhub_shared::models::{ManagedUser, TestRun, UserStatus};
use testhub_shared::views::{
    RunSummary, remove_run, search_runs_by_suite, search_testers, user_work_runs,
};

/// 等待确认的删除操作
#[derive(Debug, Clone, PartialEq)]
enum PendingDelete {
    AllOf { user_id: i64, name: String },
    Run { user_id: i64, run_id: String },
}

fn summary_for(work: &BTreeMap<i64, Vec<TestRun>>, user_id: i64) -> RunSummary {
    RunSummary::of(work.get(&user_id).map(Vec::as_slice).unwrap_or_default())
}

#[component]
pub fn UserWorkPage() -> impl IntoView {
    let admin = use_admin();
    let work = RwSignal::new(user_work_runs());
    let selected = RwSignal::new(None::<i64>);
    let pending = RwSignal::new(None::<PendingDelete>);
    let notice = Notice::new();

    let selected_user = Memo::new(move |_| {
        let id = selected.get()?;
        admin.users.with(|users| users.iter().find(|u| u.id == id).cloned())
    });

    let confirm = Callback::new(move |_| {
        let Some(action) = pending.get_untracked() else {
            return;
        };
        match action {
            PendingDelete::AllOf { user_id, .. } => {
                work.update(|w| {
                    w.insert(user_id, Vec::new());
                });
                notice.success("All test cases deleted");
            }
            PendingDelete::Run { user_id, run_id } => {
                let removed = work
                    .try_update(|w| w.get_mut(&user_id).is_some_and(|runs| remove_run(runs, &run_id)))
                    .unwrap_or(false);
                if removed {
                    notice.success("Test case deleted");
                }
            }
        }
        pending.set(None);
    });

    let dialog_title = move || match pending.get() {
        Some(PendingDelete::AllOf { .. }) => "Delete All Test Cases",
        _ => "Delete Test Case",
    };
    let dialog_message = Signal::derive(move || match pending.get() {
        Some(PendingDelete::AllOf { name, .. }) => format!(
            "Are you sure you want to delete all test cases for {}? This action cannot be undone.",
            name
        ),
        _ => "Are you sure you want to delete this test case? This action cannot be undone."
            .to_string(),
    });

    view! {
        <NoticeToast notice=notice />
        {move || match selected_user.get() {
            None => view! { <TesterList work=work selected=selected pending=pending /> }.into_any(),
            Some(user) => {
                view! { <TesterWork user=user work=work selected=selected pending=pending /> }
                    .into_any()
            }
        }}
        {move || {
            view! {
                <ConfirmDialog
                    open=Signal::derive(move || pending.with(Option::is_some))
                    title=dialog_title()
                    message=dialog_message
                    confirm_label="Delete"
                    on_confirm=confirm
                    on_cancel=Callback::new(move |_| pending.set(None))
                />
            }
        }}
    }
}

// =========================================================
// 测试人员列表
// =========================================================

#[component]
fn TesterList(
    work: RwSignal<BTreeMap<i64, Vec<TestRun>>>,
    selected: RwSignal<Option<i64>>,
    pending: RwSignal<Option<PendingDelete>>,
) -> impl IntoView {
    let admin = use_admin();
    let query = RwSignal::new(String::new());

    let tester_count = move || {
        admin
            .users
            .with(|users| search_testers(users, "").len())
    };
    let testers = move || {
        admin.users.with(|users| {
            query.with(|q| search_testers(users, q).into_iter().cloned().collect::<Vec<_>>())
        })
    };

    view! {
        <PageHeader title="User Work" subtitle="Select a user to view their test execution history">
            <span class="badge badge-info badge-lg gap-2">
                <UsersIcon attr:class="h-4 w-4" />
                {move || format!("{} Testers", tester_count())}
            </span>
        </PageHeader>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4 mb-4">
                    <h2 class="card-title">"All Testers"</h2>
                    <label class="input md:w-80">
                        <Search attr:class="h-4 w-4 opacity-50" />
                        <input
                            type="search"
                            class="grow"
                            placeholder="Search by name or email..."
                            prop:value=move || query.get()
                            on:input=move |ev| query.set(event_target_value(&ev))
                        />
                    </label>
                </div>
                <div class="overflow-x-auto">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Tester"</th>
                                <th class="text-center">"Total Tests"</th>
                                <th class="text-center">"Passed"</th>
                                <th class="text-center">"Failed"</th>
                                <th>"Status"</th>
                                <th>"Last Active"</th>
                                <th class="text-right">"Actions"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=testers
                                key=|u| u.id
                                children=move |user| {
                                    view! {
                                        <TesterRow user=user work=work selected=selected pending=pending />
                                    }
                                }
                            />
                        </tbody>
                    </table>
                </div>
            </div>
        </div>
    }
}

#[component]
fn TesterRow(
    user: ManagedUser,
    work: RwSignal<BTreeMap<i64, Vec<TestRun>>>,
    selected: RwSignal<Option<i64>>,
    pending: RwSignal<Option<PendingDelete>>,
) -> impl IntoView {
    let user_id = user.id;
    let name = user.name.clone();
    let summary = move || work.with(|w| summary_for(w, user_id));
    let status_class = match user.status {
        UserStatus::Active => "badge badge-success badge-soft",
        UserStatus::Inactive => "badge badge-ghost",
    };

    view! {
        <tr class="hover cursor-pointer" on:click=move |_| selected.set(Some(user_id))>
            <td>
                <div class="font-medium">{user.name.clone()}</div>
                <div class="text-xs text-base-content/60">{user.email.clone()}</div>
            </td>
            <td class="text-center">{move || summary().total}</td>
            <td class="text-center text-success">{move || summary().passed}</td>
            <td class="text-center text-error">{move || summary().failed}</td>
            <td>
                <span class=status_class>{user.status.label()}</span>
            </td>
            <td class="text-base-content/60">{user.last_active.clone()}</td>
            <td class="text-right space-x-1">
                <button class="btn btn-ghost btn-xs gap-1" on:click=move |_| selected.set(Some(user_id))>
                    <Eye attr:class="h-4 w-4" />
                    "View"
                </button>
                <button
                    class="btn btn-ghost btn-xs gap-1 text-error"
                    disabled=move || summary().total == 0
                    on:click=move |ev| {
                        ev.stop_propagation();
                        pending
                            .set(
                                Some(PendingDelete::AllOf {
                                    user_id,
                                    name: name.clone(),
                                }),
                            );
                    }
                >
                    <Trash2 attr:class="h-4 w-4" />
                    "Delete All"
                </button>
            </td>
        </tr>
    }
}

// =========================================================
// 单个测试人员的执行记录
// =========================================================

#[component]
fn TesterWork(
    user: ManagedUser,
    work: RwSignal<BTreeMap<i64, Vec<TestRun>>>,
    selected: RwSignal<Option<i64>>,
    pending: RwSignal<Option<PendingDelete>>,
) -> impl IntoView {
    let user_id = user.id;
    let suite_query = RwSignal::new(String::new());

    let summary = Memo::new(move |_| work.with(|w| summary_for(w, user_id)));
    let has_runs = move || summary.get().total > 0;
    let runs = move || {
        work.with(|w| {
            let all = w.get(&user_id).map(Vec::as_slice).unwrap_or_default();
            suite_query.with(|q| search_runs_by_suite(all, q).into_iter().cloned().collect::<Vec<_>>())
        })
    };
    let no_match = move || {
        suite_query.with(|q| {
            if q.trim().is_empty() {
                "This user hasn't run any tests yet.".to_string()
            } else {
                format!("No test suites match \"{}\"", q)
            }
        })
    };

    let on_delete = Callback::new(move |run_id: String| {
        pending.set(Some(PendingDelete::Run { user_id, run_id }));
    });
    let name = user.name.clone();
    let delete_all = move |_| {
        pending.set(Some(PendingDelete::AllOf {
            user_id,
            name: name.clone(),
        }));
    };

    view! {
        <div class="flex items-center gap-4 mb-8">
            <button class="btn btn-ghost btn-square" on:click=move |_| selected.set(None)>
                <ArrowLeft attr:class="h-5 w-5" />
            </button>
            <div class="flex-1">
                <h1 class="text-3xl font-bold">{format!("{}'s Work", user.name)}</h1>
                <p class="text-base-content/70">
                    {format!("View all test executions by {}", user.name)}
                </p>
            </div>
            <Show when=has_runs>
                <button class="btn btn-outline btn-error gap-2" on:click=delete_all.clone()>
                    <Trash2 attr:class="h-4 w-4" />
                    "Delete All Tests"
                </button>
            </Show>
        </div>

        <Show
            when=has_runs
            fallback=|| {
                view! {
                    <div class="card bg-base-100 shadow text-center py-12">
                        <h3 class="text-lg font-semibold mb-2">"No Test Executions"</h3>
                        <p class="text-base-content/60">"This user hasn't run any tests yet."</p>
                    </div>
                }
            }
        >
            <RunSummaryBar summary=summary.into() />

            <div class="flex flex-col md:flex-row md:items-center md:justify-between gap-4 mb-4">
                <h2 class="text-lg font-semibold flex items-center gap-2">
                    <FlaskConical attr:class="h-5 w-5 text-primary" />
                    "Test Suites"
                </h2>
                <label class="input md:w-80">
                    <Search attr:class="h-4 w-4 opacity-50" />
                    <input
                        type="search"
                        class="grow"
                        placeholder="Search by test suite name..."
                        prop:value=move || suite_query.get()
                        on:input=move |ev| suite_query.set(event_target_value(&ev))
                    />
                </label>
            </div>

            <div class="space-y-3">
                <Show when=move || runs().is_empty()>
                    <div class="card bg-base-100 shadow text-center py-12">
                        <h3 class="text-lg font-semibold mb-2">"No Test Suites Found"</h3>
                        <p class="text-base-content/60">{no_match}</p>
                    </div>
                </Show>
                <For
                    each=runs
                    key=|run| run.id.clone()
                    children=move |run| view! { <RunCard run=run on_delete=on_delete /> }
                />
            </div>
        </Show>
    }
}
