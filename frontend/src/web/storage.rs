//! SessionStorage 封装模块
//!
//! 令牌只在当前标签页的生命周期内保存，关闭标签页即失效。

use serde::Serialize;
use serde::de::DeserializeOwned;

/// 会话存储操作封装
///
/// 提供静态方法访问浏览器 SessionStorage API。
pub struct SessionStore;

impl SessionStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.session_storage().ok()?
    }

    /// 获取存储的字符串值，键不存在或发生错误时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }

    /// 读取 JSON 值；内容损坏时视为不存在并删除
    pub fn get_json<T: DeserializeOwned>(key: &str) -> Option<T> {
        let raw = Self::get(key)?;
        match serde_json_wasm::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("[Storage] discarding corrupt entry {}: {}", key, e);
                Self::delete(key);
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(key: &str, value: &T) -> bool {
        match serde_json_wasm::to_string(value) {
            Ok(raw) => Self::set(key, &raw),
            Err(e) => {
                log::error!("[Storage] failed to encode {}: {}", key, e);
                false
            }
        }
    }
}
