use crate::auth::use_auth;
use crate::components::icons::*;
use crate::components::layout::PageHeader;
use crate::web::router::Link;
use leptos::prelude::*;
use testhub_shared::models::RunStatus;
use testhub_shared::route::AppRoute;
use testhub_shared::views::{BROWSER_RESULTS, RECENT_RUNS, StatCard, TESTER_KPIS};

/// 统计卡片（测试与管理面板共用）
#[component]
pub fn StatTile(card: StatCard) -> impl IntoView {
    view! {
        <div class="stat">
            <div class="stat-title">{card.title}</div>
            <div class="stat-value text-primary">{card.value}</div>
            <div class="stat-desc">{card.note}</div>
        </div>
    }
}

pub fn status_badge(status: RunStatus) -> impl IntoView {
    let class = match status {
        RunStatus::Passed => "badge badge-success badge-soft gap-1",
        RunStatus::Failed => "badge badge-error badge-soft gap-1",
    };
    view! { <span class=class>{status.as_str()}</span> }
}

/// 测试人员首页
#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let greeting = move || {
        auth.user()
            .map(|u| format!("Welcome back, {}", u.username))
            .unwrap_or_else(|| "Your automated test execution environment".to_string())
    };

    view! {
        <PageHeader title="Dashboard" subtitle=greeting()>
            <div class="flex gap-2">
                <Link route=AppRoute::Monitor class="btn btn-outline gap-2">
                    <Activity attr:class="h-4 w-4" />
                    "Live Monitor"
                </Link>
                <Link route=AppRoute::Create class="btn btn-primary gap-2">
                    <Plus attr:class="h-4 w-4" />
                    "New Test Suite"
                </Link>
            </div>
        </PageHeader>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100 mb-8">
            {TESTER_KPIS.iter().map(|card| view! { <StatTile card=*card /> }).collect_view()}
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Browser-wise Performance"</h3>
                    <p class="text-base-content/70 text-sm">"Pass/Fail distribution across browsers"</p>
                    <div class="space-y-4 mt-4">
                        {BROWSER_RESULTS
                            .iter()
                            .map(|r| {
                                let total = r.passed + r.failed;
                                view! {
                                    <div>
                                        <div class="flex justify-between text-sm mb-1">
                                            <span class="font-medium">{r.browser}</span>
                                            <span class="text-base-content/60">
                                                {format!("{} passed / {} failed", r.passed, r.failed)}
                                            </span>
                                        </div>
                                        <progress
                                            class="progress progress-success w-full"
                                            value=r.passed.to_string()
                                            max=total.to_string()
                                        ></progress>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <h3 class="card-title p-6 pb-2">"Recent Runs"</h3>
                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Suite"</th>
                                    <th>"Browser"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Duration"</th>
                                    <th class="hidden md:table-cell">"When"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {RECENT_RUNS
                                    .iter()
                                    .map(|run| {
                                        view! {
                                            <tr>
                                                <td class="font-medium">{run.suite}</td>
                                                <td>{run.browser}</td>
                                                <td>{status_badge(run.status)}</td>
                                                <td class="hidden md:table-cell">{run.duration}</td>
                                                <td class="hidden md:table-cell text-base-content/60">
                                                    {run.time}
                                                </td>
                                            </tr>
                                        }
                                    })
                                    .collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}
