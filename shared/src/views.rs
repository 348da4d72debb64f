//! 页面视图数据
//!
//! 仪表盘、历史、执行监控与创建套件页面使用的演示数据，以及页面上的
//! 检索、统计和列表操作。这些都是纯函数，组件只负责渲染。

use crate::models::{
    Artifacts, ManagedUser, Role, RunStatus, ScriptStep, SignupRequest, SignupStatus, TestRun,
    UserStatus,
};
use std::collections::BTreeMap;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// =========================================================
// 测试运行 (History / User Work)
// =========================================================

#[allow(clippy::too_many_arguments)]
fn run(
    id: &str,
    suite: &str,
    browser: &str,
    status: RunStatus,
    date: &str,
    time: &str,
    duration: &str,
    steps: [(&str, RunStatus); 3],
    screenshots: u32,
    video: bool,
) -> TestRun {
    TestRun {
        id: id.to_string(),
        suite: suite.to_string(),
        browser: browser.to_string(),
        status,
        date: date.to_string(),
        time: time.to_string(),
        duration: duration.to_string(),
        scripts: steps
            .into_iter()
            .map(|(name, status)| ScriptStep {
                name: name.to_string(),
                status,
            })
            .collect(),
        artifacts: Artifacts {
            screenshots,
            video,
            logs: true,
        },
    }
}

use RunStatus::{Failed, Passed};

fn login_checkout(id: &str) -> TestRun {
    run(
        id,
        "Login & Checkout Flow",
        "Chrome",
        Passed,
        "Nov 29, 2025",
        "10:30 AM",
        "45s",
        [
            ("Navigate to Login", Passed),
            ("Enter Credentials", Passed),
            ("Verify Dashboard", Passed),
        ],
        8,
        true,
    )
}

fn payment_gateway(id: &str) -> TestRun {
    run(
        id,
        "Payment Gateway",
        "Firefox",
        Failed,
        "Nov 29, 2025",
        "09:15 AM",
        "52s",
        [
            ("Navigate to Cart", Passed),
            ("Add Item", Passed),
            ("Process Payment", Failed),
        ],
        12,
        true,
    )
}

fn user_registration(id: &str) -> TestRun {
    run(
        id,
        "User Registration",
        "Chrome",
        Passed,
        "Nov 28, 2025",
        "02:45 PM",
        "38s",
        [
            ("Fill Form", Passed),
            ("Validate Email", Passed),
            ("Complete Registration", Passed),
        ],
        6,
        false,
    )
}

fn dashboard_analytics(id: &str) -> TestRun {
    run(
        id,
        "Dashboard Analytics",
        "Chrome",
        Passed,
        "Nov 27, 2025",
        "11:00 AM",
        "41s",
        [
            ("Load Dashboard", Passed),
            ("Verify Charts", Passed),
            ("Check Data Accuracy", Passed),
        ],
        7,
        true,
    )
}

fn search_functionality(id: &str) -> TestRun {
    run(
        id,
        "Search Functionality",
        "Firefox",
        Failed,
        "Nov 26, 2025",
        "03:15 PM",
        "35s",
        [
            ("Open Search", Passed),
            ("Enter Query", Passed),
            ("Verify Results", Failed),
        ],
        5,
        true,
    )
}

/// 历史页初始报告
pub fn history_runs() -> Vec<TestRun> {
    vec![
        login_checkout("1"),
        payment_gateway("2"),
        user_registration("3"),
        dashboard_analytics("4"),
        search_functionality("5"),
    ]
}

/// 按用户 ID 归档的运行记录
pub fn user_work_runs() -> BTreeMap<i64, Vec<TestRun>> {
    let mut work = BTreeMap::new();
    work.insert(
        1,
        vec![
            run(
                "admin-1",
                "System Health Check",
                "Chrome",
                Passed,
                "Nov 30, 2025",
                "08:00 AM",
                "32s",
                [
                    ("Check Database Connection", Passed),
                    ("Verify API Endpoints", Passed),
                    ("Test Authentication Flow", Passed),
                ],
                5,
                true,
            ),
            run(
                "admin-2",
                "Security Audit",
                "Firefox",
                Passed,
                "Nov 29, 2025",
                "02:30 PM",
                "58s",
                [
                    ("SQL Injection Test", Passed),
                    ("XSS Prevention Check", Passed),
                    ("Session Management", Passed),
                ],
                10,
                true,
            ),
        ],
    );
    work.insert(
        2,
        vec![
            login_checkout("john-1"),
            payment_gateway("john-2"),
            run(
                "john-3",
                "User Profile Update",
                "Chrome",
                Passed,
                "Nov 28, 2025",
                "04:20 PM",
                "28s",
                [
                    ("Open Profile Settings", Passed),
                    ("Update Information", Passed),
                    ("Save Changes", Passed),
                ],
                4,
                false,
            ),
        ],
    );
    work.insert(
        3,
        vec![
            user_registration("alice-1"),
            dashboard_analytics("alice-2"),
            search_functionality("alice-3"),
        ],
    );
    work
}

/// 历史检索：套件、浏览器、状态、日期任一包含关键字即命中
pub fn search_runs<'a>(runs: &'a [TestRun], query: &str) -> Vec<&'a TestRun> {
    runs.iter()
        .filter(|r| {
            contains_ci(&r.suite, query)
                || contains_ci(&r.browser, query)
                || contains_ci(r.status.as_str(), query)
                || contains_ci(&r.date, query)
        })
        .collect()
}

/// 用户作业检索只看套件名；空白关键字返回全部
pub fn search_runs_by_suite<'a>(runs: &'a [TestRun], query: &str) -> Vec<&'a TestRun> {
    if query.trim().is_empty() {
        return runs.iter().collect();
    }
    runs.iter().filter(|r| contains_ci(&r.suite, query)).collect()
}

pub fn remove_run(runs: &mut Vec<TestRun>, id: &str) -> bool {
    let before = runs.len();
    runs.retain(|r| r.id != id);
    runs.len() != before
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn of(runs: &[TestRun]) -> Self {
        runs.iter().fold(Self::default(), |mut acc, r| {
            acc.total += 1;
            match r.status {
                Passed => acc.passed += 1,
                Failed => acc.failed += 1,
            }
            acc
        })
    }

    /// 百分比，无数据时为 0
    pub fn pass_rate(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.passed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

// =========================================================
// 用户管理
// =========================================================

pub fn search_users<'a>(users: &'a [ManagedUser], query: &str) -> Vec<&'a ManagedUser> {
    users
        .iter()
        .filter(|u| {
            contains_ci(&u.name, query)
                || contains_ci(&u.email, query)
                || contains_ci(u.role.label(), query)
        })
        .collect()
}

/// 只检索待审批的申请
pub fn search_pending_requests<'a>(
    requests: &'a [SignupRequest],
    query: &str,
) -> Vec<&'a SignupRequest> {
    requests
        .iter()
        .filter(|r| r.status == SignupStatus::Pending)
        .filter(|r| contains_ci(&r.name, query) || contains_ci(&r.email, query))
        .collect()
}

/// User Work 页只列出 Tester
pub fn search_testers<'a>(users: &'a [ManagedUser], query: &str) -> Vec<&'a ManagedUser> {
    users
        .iter()
        .filter(|u| u.role == Role::Tester)
        .filter(|u| contains_ci(&u.name, query) || contains_ci(&u.email, query))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserSummary {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
}

impl UserSummary {
    pub fn of(users: &[ManagedUser], requests: &[SignupRequest]) -> Self {
        Self {
            total: users.len(),
            active: users
                .iter()
                .filter(|u| u.status == UserStatus::Active)
                .count(),
            pending: requests
                .iter()
                .filter(|r| r.status == SignupStatus::Pending)
                .count(),
        }
    }
}

// =========================================================
// 仪表盘
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: &'static str,
    pub note: &'static str,
}

pub const TESTER_KPIS: [StatCard; 4] = [
    StatCard { title: "Total Executions", value: "892", note: "+45 this week" },
    StatCard { title: "Pass Rate", value: "94.3%", note: "+1.2% this month" },
    StatCard { title: "Failed Runs", value: "52", note: "5 critical failures" },
    StatCard { title: "Avg Execution", value: "48s", note: "-3s optimization" },
];

pub const ADMIN_STATS: [StatCard; 3] = [
    StatCard { title: "Active Users", value: "842", note: "70%" },
    StatCard { title: "Test Suites", value: "1,205", note: "45%" },
    StatCard { title: "Server Load", value: "42%", note: "42%" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserResult {
    pub browser: &'static str,
    pub passed: u32,
    pub failed: u32,
}

pub const BROWSER_RESULTS: [BrowserResult; 2] = [
    BrowserResult { browser: "Chrome", passed: 28, failed: 2 },
    BrowserResult { browser: "Firefox", passed: 26, failed: 4 },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentRun {
    pub id: u32,
    pub suite: &'static str,
    pub browser: &'static str,
    pub status: RunStatus,
    pub time: &'static str,
    pub duration: &'static str,
}

pub const RECENT_RUNS: [RecentRun; 4] = [
    RecentRun { id: 1, suite: "Login & Checkout Flow", browser: "Chrome", status: Passed, time: "2m ago", duration: "45s" },
    RecentRun { id: 2, suite: "Payment Gateway", browser: "Firefox", status: Failed, time: "15m ago", duration: "52s" },
    RecentRun { id: 3, suite: "Dashboard Validation", browser: "Chrome", status: Passed, time: "1h ago", duration: "38s" },
    RecentRun { id: 4, suite: "User Registration", browser: "Both", status: Passed, time: "2h ago", duration: "1m 20s" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLoad {
    pub name: &'static str,
    pub load: u32,
}

impl NodeLoad {
    /// 超过 80% 时标红
    pub fn is_hot(&self) -> bool {
        self.load > 80
    }
}

pub const NODE_LOADS: [NodeLoad; 5] = [
    NodeLoad { name: "Node 1", load: 45 },
    NodeLoad { name: "Node 2", load: 72 },
    NodeLoad { name: "Node 3", load: 28 },
    NodeLoad { name: "Node 4", load: 91 },
    NodeLoad { name: "Node 5", load: 55 },
];

// =========================================================
// 执行监控
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Completed,
    Running,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStep {
    pub id: u32,
    pub name: &'static str,
    pub state: StepState,
    pub time: &'static str,
}

pub const MONITOR_STEPS: [MonitorStep; 6] = [
    MonitorStep { id: 1, name: "Initialize Browser", state: StepState::Completed, time: "0.8s" },
    MonitorStep { id: 2, name: "Navigate to /login", state: StepState::Completed, time: "1.2s" },
    MonitorStep { id: 3, name: "Input Credentials", state: StepState::Completed, time: "0.5s" },
    MonitorStep { id: 4, name: "Submit Form", state: StepState::Running, time: "..." },
    MonitorStep { id: 5, name: "Verify Dashboard", state: StepState::Pending, time: "-" },
    MonitorStep { id: 6, name: "Check User Profile", state: StepState::Pending, time: "-" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine {
    pub time: &'static str,
    pub level: &'static str,
    pub message: &'static str,
}

pub const MONITOR_LOGS: [LogLine; 5] = [
    LogLine { time: "10:42:01", level: "INFO", message: "Starting Test Suite: Auth Flow" },
    LogLine { time: "10:42:02", level: "INFO", message: "Browser context initialized" },
    LogLine { time: "10:42:03", level: "DEBUG", message: "Navigating to https://staging.app.com/login" },
    LogLine { time: "10:42:04", level: "INFO", message: "Page loaded successfully" },
    LogLine { time: "10:42:05", level: "INFO", message: "Found selector #email-input" },
];

/// 已完成步骤占比，用于进度条
pub fn monitor_progress(steps: &[MonitorStep]) -> u32 {
    if steps.is_empty() {
        return 0;
    }
    let done = steps
        .iter()
        .filter(|s| s.state == StepState::Completed)
        .count();
    ((done * 100) / steps.len()) as u32
}

// =========================================================
// 创建测试套件
// =========================================================

pub const BROWSERS: [&str; 2] = ["Chrome", "Firefox"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub name: String,
    pub size: String,
    pub language: &'static str,
}

impl ScriptFile {
    pub fn from_upload(name: &str, bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            size: format_file_size(bytes),
            language: script_language(name),
        }
    }
}

pub fn initial_script_files() -> Vec<ScriptFile> {
    [
        ("login_test.py", "2.4 KB", "Python"),
        ("checkout_flow.js", "3.1 KB", "JavaScript"),
        ("user_registration.java", "4.8 KB", "Java"),
    ]
    .into_iter()
    .map(|(name, size, language)| ScriptFile {
        name: name.to_string(),
        size: size.to_string(),
        language,
    })
    .collect()
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

pub fn script_language(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "py" => "Python",
        "js" => "JavaScript",
        "java" => "Java",
        _ => "Script",
    }
}

/// 勾选 / 取消勾选浏览器，保持选择顺序
pub fn toggle_browser(selected: &mut Vec<String>, browser: &str) {
    if let Some(pos) = selected.iter().position(|b| b == browser) {
        selected.remove(pos);
    } else {
        selected.push(browser.to_string());
    }
}

pub fn remove_file(files: &mut Vec<ScriptFile>, index: usize) -> Option<ScriptFile> {
    (index < files.len()).then(|| files.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user_admin::{default_signup_requests, default_users};

    #[test]
    fn history_search_matches_any_column() {
        let runs = history_runs();
        assert_eq!(search_runs(&runs, "firefox").len(), 2);
        assert_eq!(search_runs(&runs, "FAILED").len(), 2);
        assert_eq!(search_runs(&runs, "nov 29").len(), 2);
        assert_eq!(search_runs(&runs, "").len(), 5);
        assert!(search_runs(&runs, "safari").is_empty());
    }

    #[test]
    fn deleting_runs() {
        let mut runs = history_runs();
        assert!(remove_run(&mut runs, "2"));
        assert!(!remove_run(&mut runs, "2"));
        assert_eq!(runs.len(), 4);
        assert_eq!(RunSummary::of(&runs).failed, 1);
    }

    #[test]
    fn summary_counts_and_rate() {
        let work = user_work_runs();
        let john = RunSummary::of(&work[&2]);
        assert_eq!(john, RunSummary { total: 3, passed: 2, failed: 1 });
        assert_eq!(john.pass_rate(), 67);
        assert_eq!(RunSummary::of(&[]).pass_rate(), 0);
    }

    #[test]
    fn user_work_search_uses_suite_only() {
        let work = user_work_runs();
        let alice = &work[&3];
        assert_eq!(search_runs_by_suite(alice, "  ").len(), 3);
        assert_eq!(search_runs_by_suite(alice, "search").len(), 1);
        assert!(search_runs_by_suite(alice, "firefox").is_empty());
    }

    #[test]
    fn user_lists_filter() {
        let users = default_users();
        assert_eq!(search_users(&users, "admin").len(), 1);
        assert_eq!(search_users(&users, "tester").len(), 2);
        assert_eq!(search_testers(&users, "").len(), 2);
        assert_eq!(search_testers(&users, "imran").len(), 0);

        let requests = default_signup_requests();
        assert_eq!(search_pending_requests(&requests, "sarah").len(), 1);
        let summary = UserSummary::of(&users, &requests);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.pending, 2);
    }

    #[test]
    fn file_helpers() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2458), "2.4 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(script_language("Test.PY"), "Python");
        assert_eq!(script_language("flow.ts"), "Script");
        assert_eq!(script_language("README"), "Script");

        let mut files = initial_script_files();
        assert_eq!(remove_file(&mut files, 1).unwrap().language, "JavaScript");
        assert!(remove_file(&mut files, 9).is_none());
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn browser_toggle() {
        let mut selected = Vec::new();
        toggle_browser(&mut selected, "Chrome");
        toggle_browser(&mut selected, "Firefox");
        toggle_browser(&mut selected, "Chrome");
        assert_eq!(selected, vec!["Firefox".to_string()]);
    }

    #[test]
    fn monitor_and_nodes() {
        assert_eq!(monitor_progress(&MONITOR_STEPS), 50);
        assert_eq!(NODE_LOADS.iter().filter(|n| n.is_hot()).count(), 1);
    }
}
