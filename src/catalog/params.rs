use uuid::Uuid;

use super::{MovieFilter, MovieStatus, SortOrder};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Listing parameters exactly as they arrive in a query string. Nothing in
/// here is trusted; [`CatalogQuery`] is the only thing the engine accepts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCatalogParams {
    pub status: Option<String>,
    pub genre: Vec<String>,
    pub year: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RawCatalogParams {
    /// Builds from decoded `key=value` pairs. `genre` may repeat (also as
    /// `genre[]`); for other keys the last occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = RawCatalogParams::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "status" => params.status = Some(value),
                "genre" | "genre[]" | "genres" => params.genre.push(value),
                "year" => params.year = Some(value),
                "search" => params.search = Some(value),
                "sort" => params.sort = Some(value),
                "page" => params.page = Some(value),
                "limit" => params.limit = Some(value),
                _ => {}
            }
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Clamps instead of rejecting: a bad page becomes 1, a bad limit
    /// becomes [`DEFAULT_PAGE_SIZE`].
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(1);
        let limit = parse_positive(limit).unwrap_or(DEFAULT_PAGE_SIZE);
        Pagination { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// True when matches remain after this page.
    pub fn has_more(&self, total: u64) -> bool {
        total > self.page as u64 * self.limit as u64
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    value?
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|value| *value >= 1)
        .map(|value| value.min(u32::MAX as i64) as u32)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub filter: MovieFilter,
    pub sort: SortOrder,
    pub pagination: Pagination,
    pub count_only: bool,
}

impl CatalogQuery {
    /// Public listing: only published movies, whatever `status` says.
    pub fn public(params: &RawCatalogParams) -> Self {
        let mut query = CatalogQuery::from_params(params);
        query.filter.status = Some(MovieStatus::Published);
        query
    }

    /// Admin listing: `status` is honoured when it names a known state.
    pub fn admin(params: &RawCatalogParams) -> Self {
        let mut query = CatalogQuery::from_params(params);
        query.filter.status = params
            .status
            .as_deref()
            .and_then(|status| status.parse().ok());
        query
    }

    pub fn counting(mut self) -> Self {
        self.count_only = true;
        self
    }

    fn from_params(params: &RawCatalogParams) -> Self {
        CatalogQuery {
            filter: MovieFilter {
                status: None,
                genres: parse_genres(&params.genre),
                year: parse_year(params.year.as_deref()),
                search: params
                    .search
                    .as_deref()
                    .map(str::trim)
                    .filter(|search| !search.is_empty())
                    .map(str::to_string),
            },
            sort: SortOrder::from_param(params.sort.as_deref()),
            pagination: Pagination::from_params(params.page.as_deref(), params.limit.as_deref()),
            count_only: false,
        }
    }
}

fn is_unset(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

fn parse_year(value: Option<&str>) -> Option<i32> {
    let value = value.filter(|value| !is_unset(value))?;
    match value.trim().parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => {
            tracing::debug!("Ignoring non numeric year filter {:?}", value);
            None
        }
    }
}

fn parse_genres(values: &[String]) -> Option<Vec<Uuid>> {
    let requested: Vec<&str> = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !is_unset(value))
        .collect();
    if requested.is_empty() {
        return None;
    }
    let mut ids: Vec<Uuid> = requested
        .into_iter()
        .filter_map(|value| Uuid::parse_str(value).ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Some(ids)
}
