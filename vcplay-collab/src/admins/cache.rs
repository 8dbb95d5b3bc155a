use std::collections::HashMap;

use parking_lot::RwLock;
use vcplay_core::{ChatId, UserId};

/// Remembers the admins of every chat that was looked up.
/// Entries never expire, they are replaced by a reload.
#[derive(Debug, Default)]
pub struct AdminCache {
    entries: RwLock<HashMap<ChatId, Vec<UserId>>>,
}

impl AdminCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: ChatId) -> Option<Vec<UserId>> {
        self.entries.read().get(&chat_id).cloned()
    }

    /// Replaces the chat's entry. The list is sorted and deduplicated.
    pub fn set(&self, chat_id: ChatId, mut admins: Vec<UserId>) {
        admins.sort_unstable();
        admins.dedup();

        self.entries.write().insert(chat_id, admins);
    }

    /// Returns true if the user is in the chat's cached list.
    pub fn contains(&self, chat_id: ChatId, user_id: UserId) -> bool {
        self.entries
            .read()
            .get(&chat_id)
            .map(|admins| admins.binary_search(&user_id).is_ok())
            .unwrap_or(false)
    }

    pub fn invalidate(&self, chat_id: ChatId) {
        self.entries.write().remove(&chat_id);
    }

    /// Forgets every chat.
    pub fn reset(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_sorts_and_dedups() {
        let cache = AdminCache::new();
        cache.set(1, vec![5, 3, 5, 1]);

        assert_eq!(cache.get(1), Some(vec![1, 3, 5]));
        assert!(cache.contains(1, 3));
        assert!(!cache.contains(1, 4));
        assert!(!cache.contains(2, 3));
    }

    #[test]
    fn invalidate_and_reset() {
        let cache = AdminCache::new();
        cache.set(1, vec![1]);
        cache.set(2, vec![2]);

        cache.invalidate(1);
        assert_eq!(cache.get(1), None);
        assert_eq!(cache.get(2), Some(vec![2]));

        cache.reset();
        assert_eq!(cache.get(2), None);
    }
}
