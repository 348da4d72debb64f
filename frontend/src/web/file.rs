//! 读取用户选择的本地文件

use leptos::logging::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader, ProgressEvent};

/// 以 data URL 形式读取文件，完成后调用 `on_load`
pub fn read_as_data_url(file: &File, on_load: impl FnOnce(String) + 'static) {
    let reader = match FileReader::new() {
        Ok(r) => r,
        Err(e) => {
            warn!("[File] FileReader unavailable: {:?}", e);
            return;
        }
    };

    let handle = reader.clone();
    let done = Closure::once(move |_: ProgressEvent| {
        match handle.result().ok().and_then(|v| v.as_string()) {
            Some(url) => on_load(url),
            None => warn!("[File] read produced no data URL"),
        }
    });
    reader.set_onloadend(Some(done.as_ref().unchecked_ref()));
    // 读取结束前回调必须存活
    done.forget();

    if let Err(e) = reader.read_as_data_url(file) {
        warn!("[File] read failed: {:?}", e);
    }
}
