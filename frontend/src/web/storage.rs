//! LocalStorage 适配器
//!
//! 用 `gloo-storage` 实现共享层的 `KeyValueStore`。
//! 其他标签页的写入通过 window 的 `storage` 事件转发给订阅者。

use gloo_storage::{LocalStorage, Storage};
use std::cell::RefCell;
use std::rc::Rc;
use testhub_shared::storage::{KeyValueStore, StorageListener, SubscriptionId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[derive(Default)]
struct Listeners {
    entries: Vec<(SubscriptionId, Rc<StorageListener>)>,
    next_id: SubscriptionId,
    /// 全局 `storage` 事件只注册一次
    attached: bool,
}

/// 浏览器 localStorage 句柄，克隆后共享订阅列表
#[derive(Clone, Default)]
pub struct BrowserStorage {
    listeners: Rc<RefCell<Listeners>>,
}

impl BrowserStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn attach(&self) {
        if self.listeners.borrow().attached {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let listeners = self.listeners.clone();
        let closure = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
            // `clear()` 触发的事件没有 key
            let key = ev.key().unwrap_or_default();
            // 先拷贝回调再调用，回调内部可能再次订阅
            let snapshot: Vec<Rc<StorageListener>> = listeners
                .borrow()
                .entries
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in snapshot {
                (*listener)(&key);
            }
        });

        if window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
            .is_ok()
        {
            self.listeners.borrow_mut().attached = true;
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        let raw = LocalStorage::raw();
        raw.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        LocalStorage::raw().set_item(key, value).is_ok()
    }

    fn remove(&self, key: &str) -> bool {
        LocalStorage::delete(key);
        true
    }

    fn subscribe(&self, listener: StorageListener) -> SubscriptionId {
        self.attach();
        let mut inner = self.listeners.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push((id, Rc::new(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
    }
}
