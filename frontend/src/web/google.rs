//! Google Identity Services 绑定
//!
//! 页面通过 `<script src="https://accounts.google.com/gsi/client">` 加载 GSI，
//! 这里只负责初始化并在指定元素上渲染按钮。回调收到的是 ID token (credential)。

use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = r#"
export function gsi_available() {
    return !!(window.google && window.google.accounts && window.google.accounts.id);
}

export function gsi_render_button(el, clientId, text, onCredential) {
    window.google.accounts.id.initialize({
        client_id: clientId,
        callback: (resp) => onCredential(resp && resp.credential ? resp.credential : ""),
    });
    window.google.accounts.id.renderButton(el, {
        theme: "outline",
        size: "large",
        text: text,
        width: 320,
    });
}
"#)]
extern "C" {
    fn gsi_available() -> bool;
    fn gsi_render_button(
        el: &web_sys::HtmlElement,
        client_id: &str,
        text: &str,
        on_credential: &Closure<dyn Fn(String)>,
    );
}

/// 按钮文案，对应 GSI 的 `text` 选项
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum GoogleButtonText {
    SignIn,
    SignUp,
}

impl GoogleButtonText {
    fn as_str(&self) -> &'static str {
        match self {
            GoogleButtonText::SignIn => "signin_with",
            GoogleButtonText::SignUp => "signup_with",
        }
    }
}

/// 渲染 Google 按钮。GSI 脚本未加载时返回 `false`。
///
/// 回调闭包会被泄漏，与按钮元素同寿命。空字符串表示 Google 侧失败。
pub fn render_button(
    el: &web_sys::HtmlElement,
    client_id: &str,
    text: GoogleButtonText,
    on_credential: impl Fn(String) + 'static,
) -> bool {
    if !gsi_available() {
        return false;
    }
    let closure = Closure::<dyn Fn(String)>::new(on_credential);
    gsi_render_button(el, client_id, text.as_str(), &closure);
    closure.forget();
    true
}
