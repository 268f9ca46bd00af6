use std::cmp::Ordering;

use super::MovieRecord;

/// Listing order. Release year alone is not unique, so creation time and
/// then the id break ties to keep pages stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// Unrecognised or missing values fall back to `Newest`.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "oldest" => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }

    pub fn order_by_sql(&self) -> &'static str {
        match self {
            SortOrder::Newest => "m.year DESC, m.created_at DESC, m.id DESC",
            SortOrder::Oldest => "m.year ASC, m.created_at ASC, m.id ASC",
        }
    }

    pub fn compare(&self, a: &MovieRecord, b: &MovieRecord) -> Ordering {
        let ascending = a
            .year
            .cmp(&b.year)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id));
        match self {
            SortOrder::Newest => ascending.reverse(),
            SortOrder::Oldest => ascending,
        }
    }
}
