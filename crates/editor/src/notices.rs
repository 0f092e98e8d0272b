//! Dismissable notices shown after editor actions.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// Queue of notices, oldest first. Ids are never reused.
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
    next_id: u64,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        self.items.push(Notice {
            id: self.next_id,
            level,
            message: message.into(),
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    /// Returns false when the notice was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
