use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use tokio::sync::watch;

/// Preference gating debounced auto-show of the assist widget.
pub const INLINE_ASSIST_AUTO_VISIBLE: &str = "inline.assist.auto.visible";

/// Host capabilities fixed for the lifetime of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistConfig {
    pub supports_inline_assist: bool,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            supports_inline_assist: true,
        }
    }
}

struct PreferenceEntry {
    value: bool,
    // Kept alive here so watch subscriptions outlive individual readers.
    tx: watch::Sender<bool>,
}

/// Boolean preferences with per-key change subscriptions. Readers either
/// sample with [`get_bool`](Self::get_bool) or hold a watch receiver that
/// always reflects the latest value.
#[derive(Default)]
pub struct PreferenceStore {
    entries: Mutex<HashMap<String, PreferenceEntry>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, PreferenceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.entries().get(key).map(|e| e.value).unwrap_or(default)
    }

    pub fn set_bool(&self, key: &str, value: bool) {
        let mut entries = self.entries();
        match entries.get_mut(key) {
            Some(entry) => {
                entry.value = value;
                entry.tx.send_replace(value);
            }
            None => {
                let (tx, _rx) = watch::channel(value);
                entries.insert(key.to_string(), PreferenceEntry { value, tx });
            }
        }
    }

    /// Live view of `key`, seeded with `default` when unset.
    pub fn watch_bool(&self, key: &str, default: bool) -> watch::Receiver<bool> {
        let mut entries = self.entries();
        let entry = entries.entry(key.to_string()).or_insert_with(|| {
            let (tx, _rx) = watch::channel(default);
            PreferenceEntry { value: default, tx }
        });
        entry.tx.subscribe()
    }
}
