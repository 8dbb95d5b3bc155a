use std::collections::VecDeque;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{ChatId, QueueItem};

/// Maps every chat to its ordered queue of items.
///
/// A chat has an entry if and only if its queue is not empty, so callers can use
/// [QueueStore::contains] as "something is streaming or about to be".
///
/// Each operation is atomic on its own, but sequences of operations are not.
/// The [crate::PlaybackController] serializes those per chat.
#[derive(Debug, Default)]
pub struct QueueStore {
    queues: DashMap<ChatId, VecDeque<QueueItem>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item, creating the queue if needed. Returns the index of the new item.
    pub fn enqueue(&self, chat_id: ChatId, item: QueueItem) -> usize {
        let mut queue = self.queues.entry(chat_id).or_default();
        queue.push_back(item);

        queue.len() - 1
    }

    /// Returns the head of the queue without removing it.
    pub fn peek(&self, chat_id: ChatId) -> Option<QueueItem> {
        self.get(chat_id, 0)
    }

    /// Returns the item at the given index, if any.
    pub fn get(&self, chat_id: ChatId, index: usize) -> Option<QueueItem> {
        self.queues
            .get(&chat_id)
            .and_then(|q| q.get(index).cloned())
    }

    /// Removes and returns the head of the queue.
    pub fn pop_head(&self, chat_id: ChatId) -> Option<QueueItem> {
        self.remove_at(chat_id, 0)
    }

    /// Removes the item at the given index. Out of bounds indices are a no-op.
    pub fn remove_at(&self, chat_id: ChatId, index: usize) -> Option<QueueItem> {
        match self.queues.entry(chat_id) {
            Entry::Vacant(_) => None,
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().remove(index);

                if entry.get().is_empty() {
                    entry.remove();
                }

                removed
            }
        }
    }

    /// Deletes the queue of a chat. Returns whether there was one.
    pub fn clear(&self, chat_id: ChatId) -> bool {
        self.queues.remove(&chat_id).is_some()
    }

    pub fn len(&self, chat_id: ChatId) -> usize {
        self.queues.get(&chat_id).map(|q| q.len()).unwrap_or_default()
    }

    pub fn contains(&self, chat_id: ChatId) -> bool {
        self.queues.contains_key(&chat_id)
    }

    /// Returns a snapshot of the queue, head first.
    pub fn items(&self, chat_id: ChatId) -> Vec<QueueItem> {
        self.queues
            .get(&chat_id)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns every chat that currently has a queue.
    pub fn chats(&self) -> Vec<ChatId> {
        self.queues.iter().map(|e| *e.key()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn item(title: &str) -> QueueItem {
        QueueItem::new(title, title).with_source(format!("https://cdn/{}", title))
    }

    #[test]
    fn enqueue_returns_previous_length() {
        let store = QueueStore::new();

        assert_eq!(store.enqueue(1, item("a")), 0);
        assert_eq!(store.enqueue(1, item("b")), 1);
        assert_eq!(store.enqueue(2, item("c")), 0);

        assert_eq!(store.len(1), 2);
        assert_eq!(store.len(2), 1);
        assert_eq!(store.peek(1).map(|i| i.title), Some("a".to_string()));
    }

    #[test]
    fn empty_queues_are_never_kept() {
        let store = QueueStore::new();
        store.enqueue(1, item("a"));

        assert_eq!(store.pop_head(1).map(|i| i.title), Some("a".to_string()));
        assert_eq!(store.len(1), 0);
        assert!(!store.contains(1));
        assert!(store.chats().is_empty());

        store.enqueue(1, item("a"));
        store.remove_at(1, 0);
        assert!(!store.contains(1));
    }

    #[test]
    fn remove_out_of_bounds_is_noop() {
        let store = QueueStore::new();

        assert_eq!(store.remove_at(7, 0), None);
        assert!(!store.contains(7));

        store.enqueue(7, item("a"));
        store.enqueue(7, item("b"));

        assert_eq!(store.remove_at(7, 2), None);
        assert_eq!(store.remove_at(7, usize::MAX), None);
        assert_eq!(store.len(7), 2);
    }

    #[test]
    fn remove_at_keeps_order() {
        let store = QueueStore::new();

        for title in ["a", "b", "c", "d"] {
            store.enqueue(3, item(title));
        }

        let removed = store.remove_at(3, 2).expect("item is removed");
        assert_eq!(removed.title, "c");

        let titles: Vec<_> = store.items(3).into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["a", "b", "d"]);
    }

    #[test]
    fn clear_reports_presence() {
        let store = QueueStore::new();

        assert!(!store.clear(5));
        store.enqueue(5, item("a"));
        assert!(store.clear(5));
        assert_eq!(store.len(5), 0);
        assert_eq!(store.peek(5), None);
    }
}
