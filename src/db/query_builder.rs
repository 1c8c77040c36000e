use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, EntityTrait, QuerySelect, Select};

/// Largest OFFSET the database drivers bind
const MAX_OFFSET: u64 = i64::MAX as u64;

/// A 1-indexed page window with a bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    per_page: u64,
}

impl Pagination {
    /// Clamp a requested window: page 0 becomes page 1 and `per_page` lands in `1..=max_per_page`.
    ///
    /// Pages are also capped so the row offset fits a signed 64-bit SQL integer; anything past
    /// that cap is far beyond the last row and reads as an empty page.
    pub fn new(page: u64, per_page: u64, max_per_page: u64) -> Self {
        let per_page = per_page.clamp(1, max_per_page.max(1));
        let last_page = MAX_OFFSET / per_page + 1;
        Self {
            page: page.clamp(1, last_page),
            per_page,
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Zero-based row offset of the first record on this page
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Apply LIMIT/OFFSET to a select
    pub fn apply<E: EntityTrait>(&self, select: Select<E>) -> Select<E> {
        select.limit(self.per_page).offset(self.offset())
    }
}

/// Split a comma-separated query value into trimmed, non-empty parts
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// A text filter value: a comma anywhere makes it a list of exact values, otherwise it is one
/// case-insensitive pattern. `"Mint,"` is therefore the one-element list `["Mint"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    OneOf(Vec<String>),
    Pattern(String),
}

impl TextMatch {
    /// `None` when the value holds nothing to match
    pub fn parse(raw: &str) -> Option<Self> {
        let mut values = split_list(raw);
        if raw.contains(',') {
            (!values.is_empty()).then_some(TextMatch::OneOf(values))
        } else {
            values.pop().map(TextMatch::Pattern)
        }
    }
}

/// `LOWER(column) LIKE LOWER(pattern)`; portable across SQLite and Postgres, unlike `ILIKE`.
///
/// The pattern is passed through as-is, so `%` and `_` keep their wildcard meaning.
pub fn case_insensitive_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((column.entity_name(), column)))).like(pattern.to_lowercase())
}
