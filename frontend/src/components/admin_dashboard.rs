use crate::admin::use_admin;
use crate::components::dashboard::StatTile;
use crate::components::icons::*;
use crate::components::layout::PageHeader;
use crate::web::router::Link;
use leptos::prelude::*;
use testhub_shared::route::AppRoute;
use testhub_shared::views::{ADMIN_STATS, NODE_LOADS, UserSummary};

struct SystemAlert {
    level: &'static str,
    msg: &'static str,
    time: &'static str,
}

const SYSTEM_ALERTS: [SystemAlert; 4] = [
    SystemAlert { level: "warning", msg: "Node 4 approaching memory limit (91%)", time: "10m ago" },
    SystemAlert { level: "info", msg: "Database backup completed successfully", time: "1h ago" },
    SystemAlert { level: "error", msg: "Failed login attempts detected", time: "2h ago" },
    SystemAlert { level: "info", msg: "New deployment v1.0.0 live", time: "1d ago" },
];

fn alert_dot(level: &str) -> &'static str {
    match level {
        "error" => "mt-1 w-2 h-2 rounded-full bg-error",
        "warning" => "mt-1 w-2 h-2 rounded-full bg-warning",
        _ => "mt-1 w-2 h-2 rounded-full bg-info",
    }
}

#[component]
pub fn AdminDashboardPage() -> impl IntoView {
    let admin = use_admin();

    let summary = Memo::new(move |_| {
        admin
            .users
            .with(|users| admin.signup_requests.with(|reqs| UserSummary::of(users, reqs)))
    });

    view! {
        <PageHeader title="Admin Control" subtitle="System Infrastructure & User Management">
            <Link route=AppRoute::Users class="btn btn-primary gap-2">
                <UsersIcon attr:class="h-4 w-4" />
                {move || format!("Pending requests: {}", summary.get().pending)}
            </Link>
        </PageHeader>

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100 mb-8">
            {ADMIN_STATS.iter().map(|card| view! { <StatTile card=*card /> }).collect_view()}
            <div class="stat">
                <div class="stat-title">"Managed Accounts"</div>
                <div class="stat-value text-secondary">{move || summary.get().total}</div>
                <div class="stat-desc">{move || format!("{} active", summary.get().active)}</div>
            </div>
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title gap-2">
                        <Activity attr:class="h-5 w-5 text-primary" />
                        "Node Resource Usage"
                    </h3>
                    <div class="space-y-3 mt-4">
                        {NODE_LOADS
                            .iter()
                            .map(|node| {
                                let bar = if node.is_hot() {
                                    "progress progress-error w-full"
                                } else {
                                    "progress progress-primary w-full"
                                };
                                view! {
                                    <div>
                                        <div class="flex justify-between text-sm mb-1">
                                            <span class="flex items-center gap-2">
                                                <Server attr:class="h-4 w-4 opacity-60" />
                                                {node.name}
                                            </span>
                                            <span>{format!("{}%", node.load)}</span>
                                        </div>
                                        <progress class=bar value=node.load.to_string() max="100"></progress>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"System Alerts"</h3>
                    <div class="space-y-3 mt-4">
                        {SYSTEM_ALERTS
                            .iter()
                            .map(|alert| {
                                view! {
                                    <div class="flex items-start gap-3 p-3 bg-base-200 rounded-lg">
                                        <div class=alert_dot(alert.level)></div>
                                        <div class="flex-1">
                                            <p class="text-sm">{alert.msg}</p>
                                            <p class="text-xs text-base-content/60 mt-1">{alert.time}</p>
                                        </div>
                                    </div>
                                }
                            })
                            .collect_view()}
                    </div>
                </div>
            </div>
        </div>
    }
}
