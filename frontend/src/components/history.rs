//! 执行历史
//!
//! 列表只存在于内存，删除操作刷新页面后恢复。

use crate::components::dashboard::status_badge;
use crate::components::icons::*;
use crate::components::layout::{ConfirmDialog, Notice, NoticeToast, PageHeader};
use leptos::prelude::*;
use testhub_shared::models::{RunStatus, TestRun};
use testhub_shared::views::{RunSummary, history_runs, remove_run, search_runs};

/// 可展开的运行记录卡片（历史页与用户作业页共用）
#[component]
pub fn RunCard(run: TestRun, on_delete: Callback<String>) -> impl IntoView {
    let expanded = RwSignal::new(false);
    let id = run.id.clone();

    let steps = run.scripts.clone();
    let render_steps = move || {
        steps
            .iter()
            .map(|step| {
                let icon = match step.status {
                    RunStatus::Passed => {
                        view! { <CheckCircle attr:class="h-4 w-4 text-success" /> }.into_any()
                    }
                    RunStatus::Failed => view! { <XCircle attr:class="h-4 w-4 text-error" /> }.into_any(),
                };
                view! {
                    <li class="flex items-center gap-2 text-sm">
                        {icon}
                        <span>{step.name.clone()}</span>
                    </li>
                }
            })
            .collect_view()
    };

    let artifacts = format!(
        "{} screenshots · {} · {}",
        run.artifacts.screenshots,
        if run.artifacts.video { "video" } else { "no video" },
        if run.artifacts.logs { "logs" } else { "no logs" },
    );

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body p-4">
                <div class="flex items-center gap-4">
                    <button
                        class="btn btn-ghost btn-sm btn-square"
                        on:click=move |_| expanded.update(|e| *e = !*e)
                    >
                        {move || {
                            if expanded.get() {
                                view! { <ChevronDown attr:class="h-4 w-4" /> }.into_any()
                            } else {
                                view! { <ChevronRight attr:class="h-4 w-4" /> }.into_any()
                            }
                        }}
                    </button>
                    <div class="flex-1 min-w-0">
                        <p class="font-semibold truncate">{run.suite.clone()}</p>
                        <p class="text-xs text-base-content/60">
                            {format!("{} · {} {} · {}", run.browser, run.date, run.time, run.duration)}
                        </p>
                    </div>
                    {status_badge(run.status)}
                    <button
                        class="btn btn-ghost btn-sm btn-square text-error"
                        title="Delete run"
                        on:click=move |_| on_delete.run(id.clone())
                    >
                        <Trash2 attr:class="h-4 w-4" />
                    </button>
                </div>
                <Show when=move || expanded.get()>
                    <div class="pl-12 pt-2 space-y-2">
                        <ul class="space-y-1">{render_steps.clone()}</ul>
                        <p class="text-xs text-base-content/60">{artifacts.clone()}</p>
                    </div>
                </Show>
            </div>
        </div>
    }
}

/// 运行统计条
#[component]
pub fn RunSummaryBar(summary: Signal<RunSummary>) -> impl IntoView {
    view! {
        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100 mb-6">
            <div class="stat">
                <div class="stat-title">"Total Runs"</div>
                <div class="stat-value">{move || summary.get().total}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Passed"</div>
                <div class="stat-value text-success">{move || summary.get().passed}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Failed"</div>
                <div class="stat-value text-error">{move || summary.get().failed}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Pass Rate"</div>
                <div class="stat-value text-primary">
                    {move || format!("{}%", summary.get().pass_rate())}
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn HistoryPage() -> impl IntoView {
    let runs = RwSignal::new(history_runs());
    let query = RwSignal::new(String::new());
    let confirm_clear = RwSignal::new(false);
    let notice = Notice::new();

    let summary = Memo::new(move |_| runs.with(|r| RunSummary::of(r)));
    let filtered = move || {
        runs.with(|r| {
            query.with(|q| search_runs(r, q).into_iter().cloned().collect::<Vec<_>>())
        })
    };

    let on_delete = Callback::new(move |id: String| {
        let removed = runs.try_update(|r| remove_run(r, &id)).unwrap_or(false);
        if removed {
            notice.success("Test run deleted");
        }
    });

    let clear_all = Callback::new(move |_| {
        runs.set(Vec::new());
        confirm_clear.set(false);
        notice.success("All test runs deleted");
    });

    view! {
        <NoticeToast notice=notice />
        <PageHeader title="History" subtitle="View all test execution results and artifacts.">
            <button
                class="btn btn-outline btn-error gap-2"
                disabled=move || runs.with(|r| r.is_empty())
                on:click=move |_| confirm_clear.set(true)
            >
                <Trash2 attr:class="h-4 w-4" />
                "Delete All"
            </button>
        </PageHeader>

        <RunSummaryBar summary=summary.into() />

        <label class="input w-full mb-6">
            <Search attr:class="h-4 w-4 opacity-50" />
            <input
                type="search"
                class="grow"
                placeholder="Search by suite, browser, status..."
                prop:value=move || query.get()
                on:input=move |ev| query.set(event_target_value(&ev))
            />
        </label>

        <div class="space-y-3">
            <Show when=move || runs.with(|r| r.is_empty())>
                <div class="text-center py-12 text-base-content/50">"No test runs recorded."</div>
            </Show>
            <For
                each=filtered
                key=|run| run.id.clone()
                children=move |run| view! { <RunCard run=run on_delete=on_delete /> }
            />
        </div>

        <ConfirmDialog
            open=confirm_clear
            title="Delete all test runs?"
            message=Signal::derive(|| "This removes every run from the list.".to_string())
            confirm_label="Delete All"
            on_confirm=clear_all
            on_cancel=Callback::new(move |_| confirm_clear.set(false))
        />
    }
}
