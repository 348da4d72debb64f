use crate::components::icons::*;
use crate::web::router::Link;
use leptos::prelude::*;
use testhub_shared::route::AppRoute;

struct Feature {
    title: &'static str,
    desc: &'static str,
}

const FEATURES: [Feature; 3] = [
    Feature {
        title: "Unified Framework",
        desc: "Write tests easily with Selenium, Playwright, & Cypress",
    },
    Feature {
        title: "Parallel Execution",
        desc: "Run multiple tests concurrently across browsers",
    },
    Feature {
        title: "Open-Source & Extensible",
        desc: "Full code access, integrate with any environment",
    },
];

const DEMO_LOG: [&str; 4] = [
    "✓ Running login test on Chrome...",
    "⟳ Executing payment flow...",
    "✓ Screenshot captured (342ms)",
    "✓ All validations passed!",
];

fn feature_icon(index: usize) -> AnyView {
    match index {
        0 => view! { <Code2 attr:class="h-6 w-6" /> }.into_any(),
        1 => view! { <Zap attr:class="h-6 w-6" /> }.into_any(),
        _ => view! { <Globe attr:class="h-6 w-6" /> }.into_any(),
    }
}

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-base-100 font-sans">
            <header class="navbar bg-base-100 border-b border-base-300 px-6">
                <div class="flex-1 gap-2">
                    <div class="p-2 bg-primary rounded-lg text-primary-content">
                        <ShieldCheck attr:class="h-6 w-6" />
                    </div>
                    <span class="text-2xl font-bold tracking-wider">"TESTHUB"</span>
                </div>
                <nav class="hidden md:flex gap-6 text-sm">
                    <a href="#features" class="link link-hover">"Features"</a>
                    <a href="#how-it-works" class="link link-hover">"How It Works"</a>
                </nav>
                <div class="flex-none gap-2 ml-4">
                    <Link route=AppRoute::Auth class="btn btn-ghost btn-sm">"Log In"</Link>
                    <Link route=AppRoute::Auth class="btn btn-primary btn-sm">"Sign Up Free"</Link>
                </div>
            </header>

            <section class="hero min-h-[70vh] bg-base-200">
                <div class="hero-content text-center">
                    <div class="max-w-2xl space-y-6">
                        <h1 class="text-5xl font-bold">"Automated Testing, Unified"</h1>
                        <p class="text-lg text-base-content/70">
                            "Building the next generation of automated testing for engineering teams"
                        </p>
                        <Link route=AppRoute::Auth class="btn btn-primary btn-lg gap-2">
                            <Play attr:class="h-5 w-5" />
                            "Get Started"
                        </Link>
                    </div>
                </div>
            </section>

            <section id="features" class="max-w-6xl mx-auto px-6 py-16">
                <h2 class="text-3xl font-bold text-center mb-10">"Why Choose TESTHUB?"</h2>
                <div class="grid md:grid-cols-3 gap-6">
                    {FEATURES
                        .iter()
                        .enumerate()
                        .map(|(i, f)| {
                            view! {
                                <div class="card bg-base-100 shadow-xl">
                                    <div class="card-body">
                                        <div class="text-primary">{feature_icon(i)}</div>
                                        <h3 class="card-title">{f.title}</h3>
                                        <p class="text-base-content/70">{f.desc}</p>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </section>

            <section id="how-it-works" class="bg-base-200 py-16">
                <div class="max-w-3xl mx-auto px-6">
                    <h2 class="text-3xl font-bold text-center mb-10">"See It In Action"</h2>
                    <div class="mockup-code">
                        {DEMO_LOG
                            .iter()
                            .map(|line| view! { <pre><code>{*line}</code></pre> })
                            .collect_view()}
                        <pre class="text-success"><code>"Total time: 2.45s"</code></pre>
                    </div>
                </div>
            </section>

            <section class="py-16 text-center space-y-4">
                <h2 class="text-3xl font-bold">"Ready to Automate Your Tests?"</h2>
                <Link route=AppRoute::Auth class="btn btn-primary">"Create your account"</Link>
            </section>

            <footer class="footer footer-center p-6 bg-base-300 text-base-content/70">
                <p>"© 2025 TESTHUB Inc. All rights reserved."</p>
            </footer>
        </div>
    }
}
