//! 创建测试套件表单
//!
//! 仅做本地配置展示，不会真正触发执行。

use crate::components::icons::*;
use crate::components::layout::{Notice, NoticeToast, PageHeader};
use leptos::prelude::*;
use testhub_shared::views::{BROWSERS, ScriptFile, initial_script_files, remove_file, toggle_browser};
use web_sys::HtmlInputElement;

fn browser_list(selected: &[String], empty: &str) -> String {
    if selected.is_empty() {
        empty.to_string()
    } else {
        selected.join(", ").to_uppercase()
    }
}

#[component]
pub fn CreateSuitePage() -> impl IntoView {
    let suite_name = RwSignal::new(String::new());
    let base_url = RwSignal::new(String::new());
    let browsers = RwSignal::new(Vec::<String>::new());
    let files = RwSignal::new(initial_script_files());
    let notice = Notice::new();

    let on_files = move |ev: leptos::ev::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(list) = input.files() {
            let added: Vec<ScriptFile> = (0..list.length())
                .filter_map(|i| list.get(i))
                .map(|f| ScriptFile::from_upload(&f.name(), f.size() as u64))
                .collect();
            files.update(|fs| fs.extend(added));
        }
        // 允许再次选择同一文件
        input.set_value("");
    };

    let parallel = move || browsers.with(Vec::len) * files.with(Vec::len);

    let on_run = move |_| {
        let name = suite_name.with(|n| n.trim().to_string());
        let label = if name.is_empty() { "Untitled suite".to_string() } else { name };
        notice.success(format!(
            "{}: {} parallel executions queued",
            label,
            parallel()
        ));
    };
    let on_draft = move |_| notice.success("Draft saved");

    view! {
        <NoticeToast notice=notice />
        <PageHeader title="Create Test Suite" subtitle="Set up a new automated testing configuration." />

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="lg:col-span-2 space-y-6">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body space-y-4">
                        <h3 class="card-title">"Suite Configuration"</h3>
                        <fieldset class="fieldset">
                            <legend class="fieldset-legend">"Suite Name"</legend>
                            <input
                                type="text"
                                class="input w-full"
                                placeholder="e.g., Login & Checkout Flow"
                                prop:value=move || suite_name.get()
                                on:input=move |ev| suite_name.set(event_target_value(&ev))
                            />
                            <p class="label">"A unique name for your test suite"</p>
                        </fieldset>
                        <fieldset class="fieldset">
                            <legend class="fieldset-legend">"Website URL (Base URL)"</legend>
                            <input
                                type="url"
                                class="input w-full"
                                placeholder="e.g., https://www.example.com"
                                prop:value=move || base_url.get()
                                on:input=move |ev| base_url.set(event_target_value(&ev))
                            />
                            <p class="label">"The target website to test against"</p>
                        </fieldset>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Select Browsers"</h3>
                        <div class="grid grid-cols-2 gap-4 mt-2">
                            {BROWSERS
                                .iter()
                                .map(|&browser| {
                                    let checked = move || browsers.with(|b| b.iter().any(|x| x == browser));
                                    view! {
                                        <label class="flex items-center gap-3 p-4 rounded-lg border border-base-300 cursor-pointer hover:bg-base-200">
                                            <input
                                                type="checkbox"
                                                class="checkbox checkbox-primary"
                                                prop:checked=checked
                                                on:change=move |_| browsers.update(|b| toggle_browser(b, browser))
                                            />
                                            <div>
                                                <p class="font-medium">{browser}</p>
                                                <p class="text-xs text-base-content/60">"Latest version"</p>
                                            </div>
                                        </label>
                                    }
                                })
                                .collect_view()}
                        </div>
                        <p class="text-xs text-base-content/60 mt-4">
                            {move || format!("Selected: {}", browsers.with(|b| browser_list(b, "None")))}
                        </p>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Upload Test Scripts"</h3>
                        <label class="flex flex-col items-center justify-center gap-2 p-8 border-2 border-dashed border-base-300 rounded-lg cursor-pointer hover:bg-base-200">
                            <Upload attr:class="h-8 w-8 text-primary" />
                            <span class="font-medium">"Click to upload test scripts"</span>
                            <span class="text-xs text-base-content/60">
                                "Select multiple files (.py, .js, .java)"
                            </span>
                            <input
                                type="file"
                                class="hidden"
                                multiple=true
                                accept=".py,.js,.java"
                                on:change=on_files
                            />
                        </label>
                        <p class="text-xs text-base-content/60">
                            "Supported: Python, JavaScript, Java with Selenium actions"
                        </p>
                        <ul class="space-y-2 mt-2">
                            {move || {
                                files
                                    .get()
                                    .into_iter()
                                    .enumerate()
                                    .map(|(idx, file)| {
                                        view! {
                                            <li class="flex items-center gap-3 p-3 bg-base-200 rounded-lg">
                                                <FileCode attr:class="h-5 w-5 text-primary" />
                                                <div class="flex-1 min-w-0">
                                                    <p class="text-sm font-medium truncate">{file.name}</p>
                                                    <p class="text-xs text-base-content/60">
                                                        {format!("{} · {}", file.language, file.size)}
                                                    </p>
                                                </div>
                                                <button
                                                    class="btn btn-ghost btn-xs btn-square"
                                                    title="Remove file"
                                                    on:click=move |_| {
                                                        files
                                                            .update(|fs| {
                                                                remove_file(fs, idx);
                                                            })
                                                    }
                                                >
                                                    <XIcon attr:class="h-4 w-4" />
                                                </button>
                                            </li>
                                        }
                                    })
                                    .collect_view()
                            }}
                        </ul>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl h-fit">
                <div class="card-body space-y-4">
                    <h3 class="card-title">"Execution Summary"</h3>
                    <div>
                        <p class="text-xs text-base-content/60">"Browsers Selected"</p>
                        <p class="text-sm font-mono">
                            {move || browsers.with(|b| browser_list(b, "None selected"))}
                        </p>
                    </div>
                    <div>
                        <p class="text-xs text-base-content/60">"Test Scripts"</p>
                        <p class="text-sm font-mono">{move || files.with(Vec::len)}</p>
                    </div>
                    <div>
                        <p class="text-xs text-base-content/60">"Parallel Executions"</p>
                        <p class="text-sm font-mono text-success">{parallel}</p>
                    </div>
                    <div>
                        <p class="text-xs text-base-content/60">"Est. Duration"</p>
                        <p class="text-sm font-mono">"~2-5 min"</p>
                    </div>
                    <button
                        class="btn btn-primary w-full gap-2"
                        disabled=move || browsers.with(Vec::is_empty)
                        on:click=on_run
                    >
                        <Play attr:class="h-4 w-4" />
                        "Run Test Suite"
                    </button>
                    <button class="btn btn-outline w-full" on:click=on_draft>
                        "Save as Draft"
                    </button>
                </div>
            </div>
        </div>
    }
}
