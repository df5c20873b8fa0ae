//! Pagination policy for list endpoints.
//!
//! Lists are unpaginated unless the caller asks for a window: the presence of
//! `limit` or `offset` (in any form) switches to limit/offset pagination.

use std::num::IntErrorKind;

/// Limit/offset bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaginationPolicy {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl PaginationPolicy {
    /// Decide the window for a list request from raw query values.
    ///
    /// `None` means "return everything, no envelope". Unparseable or
    /// non-positive limits fall back to the default; unparseable or negative
    /// offsets become 0.
    pub fn window(&self, limit: Option<&str>, offset: Option<&str>) -> Option<Window> {
        if limit.is_none() && offset.is_none() {
            return None;
        }

        let limit = limit
            .and_then(parse_int)
            .filter(|v| *v > 0)
            .map(|v| (v as u64).min(self.max_limit))
            .unwrap_or(self.default_limit);

        let offset = offset
            .and_then(parse_int)
            .filter(|v| *v >= 0)
            .map(|v| v as u64)
            .unwrap_or(0);

        Some(Window { offset, limit })
    }
}

/// Integers too large for `i64` saturate, so a huge limit still clamps.
fn parse_int(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(v) => Some(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// A page request already clamped by the policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

/// Where the "previous" link of a page points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Previous {
    /// The first page; the link carries no `offset` at all.
    FirstPage,
    Offset(u64),
}

impl Window {
    /// Offset of the following page, if `total` leaves anything after this one.
    pub fn next(&self, total: u64) -> Option<u64> {
        let next = self.offset.saturating_add(self.limit);
        (next < total).then_some(next)
    }

    pub fn previous(&self) -> Option<Previous> {
        if self.offset == 0 {
            None
        } else if self.offset <= self.limit {
            Some(Previous::FirstPage)
        } else {
            Some(Previous::Offset(self.offset - self.limit))
        }
    }

    /// Slice an already-ordered, fully materialized result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// One (possibly windowed) slice of a list plus the total it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> Listing<T> {
    /// Build a listing from the complete ordered result set.
    pub fn from_all(items: Vec<T>, window: Option<Window>) -> Self {
        let total = items.len() as u64;
        let items = match window {
            Some(w) => w.apply(items),
            None => items,
        };
        Self { total, items }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
