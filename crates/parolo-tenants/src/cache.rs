//! Change-token keyed read cache.

use std::collections::HashMap;

use parking_lot::Mutex;
use parolo_store::ChangeToken;

#[derive(Clone, Debug)]
struct Entry {
    token: ChangeToken,
    text: String,
}

/// One cached text per prompt, valid while the prompt's token is unchanged.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TokenCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached text for `name` if it was stored under `token`.
    pub fn get(&self, name: &str, token: ChangeToken) -> Option<String> {
        self.entries
            .lock()
            .get(name)
            .filter(|e| e.token == token)
            .map(|e| e.text.clone())
    }

    /// Replace the entry for `name`.
    pub fn insert(&self, name: &str, token: ChangeToken, text: String) {
        let _ = self
            .entries
            .lock()
            .insert(name.to_owned(), Entry { token, text });
    }
}
