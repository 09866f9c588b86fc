//! Pagination controller: next/previous links of the page currently on screen.

use crate::models::PageInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Next => "next",
            Direction::Previous => "previous",
        }
    }
}

/// Stored link state. A control is enabled iff its URL is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    next: Option<String>,
    previous: Option<String>,
}

impl Pagination {
    /// Full replacement from a page's info block; blank links count as absent.
    pub fn from_info(info: &PageInfo) -> Self {
        Self {
            next: info.next.clone().filter(|u| !u.trim().is_empty()),
            previous: info.prev.clone().filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn previous_url(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// URL to fetch for the given control, `None` when it is disabled.
    pub fn url(&self, direction: Direction) -> Option<&str> {
        match direction {
            Direction::Next => self.next_url(),
            Direction::Previous => self.previous_url(),
        }
    }
}
