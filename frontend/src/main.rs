use leptos::prelude::*;
use testhub_frontend::App;

// WASM 体积优先：使用 lol_alloc 作为全局分配器
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

fn main() {
    console_error_panic_hook::set_once();
    leptos::logging::log!("[App] TESTHUB frontend starting");
    mount_to_body(App);
}
