use crate::components::icons::*;
use crate::components::layout::PageHeader;
use leptos::prelude::*;
use testhub_shared::views::{MONITOR_LOGS, MONITOR_STEPS, StepState, monitor_progress};

fn step_icon(state: StepState) -> AnyView {
    match state {
        StepState::Completed => view! { <CheckCircle attr:class="h-5 w-5 text-success" /> }.into_any(),
        StepState::Running => {
            view! { <span class="loading loading-spinner loading-sm text-primary"></span> }.into_any()
        }
        StepState::Pending => view! { <Clock attr:class="h-5 w-5 text-base-content/40" /> }.into_any(),
    }
}

fn level_class(level: &str) -> &'static str {
    match level {
        "DEBUG" => "text-base-content/50",
        "WARN" => "text-warning",
        "ERROR" => "text-error",
        _ => "text-info",
    }
}

/// 执行监控（静态演示数据）
#[component]
pub fn MonitorPage() -> impl IntoView {
    let progress = monitor_progress(&MONITOR_STEPS);

    view! {
        <PageHeader title="Live Execution" subtitle="Session ID: #EXE-8829-XJ">
            <span class="badge badge-success gap-2">
                <span class="w-2 h-2 rounded-full bg-success-content animate-pulse"></span>
                "Live Stream Active"
            </span>
        </PageHeader>

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="card bg-base-100 shadow-xl lg:col-span-2">
                <div class="card-body">
                    <div class="mockup-code text-sm">
                        {MONITOR_LOGS
                            .iter()
                            .map(|line| {
                                view! {
                                    <pre data-prefix=line.time>
                                        <code>
                                            <span class=level_class(line.level)>{line.level}</span>
                                            " "
                                            {line.message}
                                        </code>
                                    </pre>
                                }
                            })
                            .collect_view()}
                        <pre data-prefix=">" class="text-warning">
                            <code>"Typing into input[name=\"password\"]..."</code>
                        </pre>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Execution Timeline"</h3>
                    <progress class="progress progress-primary w-full" value=progress.to_string() max="100"></progress>
                    <p class="text-sm text-base-content/60">{format!("{}% complete", progress)}</p>
                    <ul class="space-y-3 mt-2">
                        {MONITOR_STEPS
                            .iter()
                            .map(|step| {
                                view! {
                                    <li class="flex items-center gap-3">
                                        {step_icon(step.state)}
                                        <span class="flex-1">{step.name}</span>
                                        <span class="text-xs text-base-content/60">{step.time}</span>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </div>
            </div>
        </div>
    }
}
