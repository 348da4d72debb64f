//! 可插拔的键值持久化
//!
//! 浏览器中由 `LocalStorage` 实现，测试和非浏览器环境使用 `MemoryStore`。
//! 所有读写都是同步的，后写覆盖先写。

use serde::{Serialize, de::DeserializeOwned};

pub type SubscriptionId = u64;

/// 存储变更回调，参数为发生变化的键
pub type StorageListener = Box<dyn Fn(&str)>;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 写入成功返回 `true`
    fn set(&self, key: &str, value: &str) -> bool;
    fn remove(&self, key: &str) -> bool;

    /// 订阅由其他写入方（如其他标签页）造成的变更。
    /// 本句柄自身的 `set` / `remove` 不会触发回调。
    fn subscribe(&self, listener: StorageListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// 读取并解析 JSON；键不存在或内容损坏时返回 `None`
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw).ok()
}

pub fn save_json<T: Serialize>(store: &impl KeyValueStore, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(_) => false,
    }
}

// =========================================================
// 内存实现 (MemoryStore)
// =========================================================

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryStore;

#[cfg(any(test, feature = "mock"))]
mod memory {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Inner {
        map: HashMap<String, String>,
        listeners: Vec<(SubscriptionId, StorageListener)>,
        next_id: SubscriptionId,
    }

    /// 克隆后共享同一份数据，模拟同一浏览器中的 localStorage
    #[derive(Clone, Default)]
    pub struct MemoryStore(Rc<RefCell<Inner>>);

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// 模拟其他标签页写入：写入后通知订阅者
        pub fn external_set(&self, key: &str, value: &str) {
            self.0
                .borrow_mut()
                .map
                .insert(key.to_string(), value.to_string());
            self.notify(key);
        }

        pub fn external_remove(&self, key: &str) {
            self.0.borrow_mut().map.remove(key);
            self.notify(key);
        }

        pub fn contains(&self, key: &str) -> bool {
            self.0.borrow().map.contains_key(key)
        }

        fn notify(&self, key: &str) {
            let inner = self.0.borrow();
            for (_, listener) in &inner.listeners {
                listener(key);
            }
        }
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.borrow().map.get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) -> bool {
            self.0
                .borrow_mut()
                .map
                .insert(key.to_string(), value.to_string());
            true
        }

        fn remove(&self, key: &str) -> bool {
            self.0.borrow_mut().map.remove(key);
            true
        }

        fn subscribe(&self, listener: StorageListener) -> SubscriptionId {
            let mut inner = self.0.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.listeners.push((id, listener));
            id
        }

        fn unsubscribe(&self, id: SubscriptionId) {
            self.0.borrow_mut().listeners.retain(|(i, _)| *i != id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn corrupt_json_reads_as_missing() {
        let store = MemoryStore::new();
        store.set("k", "{not json");
        assert_eq!(load_json::<Vec<u32>>(&store, "k"), None);

        assert!(save_json(&store, "k", &vec![1u32, 2]));
        assert_eq!(load_json::<Vec<u32>>(&store, "k"), Some(vec![1, 2]));
    }

    #[test]
    fn listeners_only_see_external_writes() {
        let store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::<String>::new()));
        let sink = seen.clone();
        let id = store.subscribe(Box::new(move |key| sink.borrow_mut().push(key.to_string())));

        store.set("local", "1");
        store.external_set("remote", "2");
        assert_eq!(*seen.borrow(), vec!["remote".to_string()]);

        store.unsubscribe(id);
        store.external_remove("remote");
        assert_eq!(seen.borrow().len(), 1);
    }
}
