// Durable key-value persistence for the mining fields
use std::cell::RefCell;
use std::collections::HashMap;

use crate::util::cwarn;

pub const KEY_STARTED_AT: &str = "start_mining_at";
pub const KEY_POINTS: &str = "mining_points";

pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    /// Fire-and-forget write.
    fn set(&self, key: &str, value: &str);
}

/// `window.localStorage`, scoped to this device and origin.
#[derive(Clone)]
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    /// `None` when storage is unavailable (private mode, sandboxed frame).
    pub fn open() -> Option<Self> {
        let win = web_sys::window()?;
        let storage = win.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl StateStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if self.storage.set_item(key, value).is_err() {
            cwarn(&format!("localStorage write failed for {key}"));
        }
    }
}

/// Process-local store; fallback when `localStorage` is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}
