use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;

// =========================================================
// 抽象接口定义
// =========================================================

#[async_trait(?Send)]
pub trait StorageAdapter {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> ApiResult<Option<T>>;
    async fn put<T: Serialize>(&self, key: &str, value: &T) -> ApiResult<()>;
    async fn list_map<T: DeserializeOwned>(&self, prefix: &str) -> ApiResult<HashMap<String, T>>;
}

// =========================================================
// 生产环境实现 (WorkerStorage)
// =========================================================

pub struct WorkerStorage(pub worker::Storage);

#[async_trait(?Send)]
impl StorageAdapter for WorkerStorage {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> ApiResult<Option<T>> {
        match self.0.get(key).await {
            Ok(v) => Ok(v),
            // 某些版本的 worker crate 在 key 不存在时会报错
            Err(e) if e.to_string().contains("No such value") => Ok(None),
            Err(e) => Err(ApiError::from(e).in_op_with("storage.get", key)),
        }
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> ApiResult<()> {
        self.0
            .put(key, value)
            .await
            .map_err(|e| ApiError::from(e).in_op_with("storage.put", key))
    }

    async fn list_map<T: DeserializeOwned>(&self, prefix: &str) -> ApiResult<HashMap<String, T>> {
        let opts = worker::ListOptions::new().prefix(prefix);
        let raw_map = self
            .0
            .list_with_options(opts)
            .await
            .map_err(|e| ApiError::from(e).in_op_with("storage.list", prefix))?;

        let mut result = HashMap::new();
        for key_res in raw_map.keys() {
            let key_js = key_res.map_err(|_| ApiError::store("JS Iterator Error"))?;
            let key_str = key_js
                .as_string()
                .ok_or_else(|| ApiError::store("Key is not string"))?;

            let val: T = serde_wasm_bindgen::from_value(raw_map.get(&key_js)).map_err(|e| {
                ApiError::serialization(e.to_string()).in_op_with("storage.list", &key_str)
            })?;
            result.insert(key_str, val);
        }

        Ok(result)
    }
}

// =========================================================
// 测试环境实现 (MockStorage)
// =========================================================

#[cfg(test)]
#[derive(Default)]
pub struct MockStorage {
    // 存储序列化后的 JSON 字符串，模拟真实存储的序列化边界
    pub map: std::cell::RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl StorageAdapter for MockStorage {
    async fn get<T: DeserializeOwned>(&self, key: &str) -> ApiResult<Option<T>> {
        let map = self.map.borrow();
        match map.get(key) {
            Some(val_str) => Ok(Some(serde_json::from_str(val_str)?)),
            None => Ok(None),
        }
    }

    async fn put<T: Serialize>(&self, key: &str, value: &T) -> ApiResult<()> {
        let val_str = serde_json::to_string(value)?;
        self.map.borrow_mut().insert(key.to_string(), val_str);
        Ok(())
    }

    async fn list_map<T: DeserializeOwned>(&self, prefix: &str) -> ApiResult<HashMap<String, T>> {
        let map = self.map.borrow();
        let mut result = HashMap::new();
        for (k, v_str) in map.iter() {
            if k.starts_with(prefix) {
                result.insert(k.clone(), serde_json::from_str(v_str)?);
            }
        }
        Ok(result)
    }
}
