//! Bounded notification queue

use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub variant: ToastVariant,
}

/// FIFO queue; the oldest toast is evicted when full
#[derive(Debug)]
pub struct ToastQueue {
    items: VecDeque<Toast>,
    capacity: usize,
    next_id: u64,
}

impl ToastQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Append a toast and return its id
    pub fn push(&mut self, message: impl Into<String>, variant: ToastVariant) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(Toast {
            id,
            message: message.into(),
            variant,
        });
        id
    }

    /// Remove by id. Returns false if it was already gone.
    pub fn expire(&mut self, id: u64) -> bool {
        match self.items.iter().position(|t| t.id == id) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn items(&self) -> Vec<Toast> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut queue = ToastQueue::new(2);
        queue.push("a", ToastVariant::Success);
        queue.push("b", ToastVariant::Success);
        queue.push("c", ToastVariant::Error);
        let messages: Vec<_> = queue.items().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn test_expire_by_id_not_position() {
        let mut queue = ToastQueue::new(5);
        let first = queue.push("first", ToastVariant::Success);
        let second = queue.push("second", ToastVariant::Success);
        assert!(queue.expire(second));
        assert_eq!(queue.items()[0].id, first);
        assert!(!queue.expire(second));
        assert_eq!(queue.len(), 1);
    }
}
