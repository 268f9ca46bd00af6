//! Movie listing engine: typed filters, sort resolution, pagination and
//! counting over a pluggable movie store.
//!
//! Query-string input is normalised once into a [`CatalogQuery`]
//! ([`RawCatalogParams`] → [`CatalogQuery::public`] / [`CatalogQuery::admin`]);
//! malformed paging and sort values are clamped, never rejected. The engine
//! is read-only. Storage failures come back as [`CatalogError::FetchFailed`],
//! which callers can tell apart from an empty page.

mod filter;
mod memory;
mod params;
mod postgres;
mod record;
mod sort;

pub use filter::*;
pub use memory::*;
pub use params::*;
pub use postgres::*;
pub use record::*;
pub use sort::*;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// How many related titles the movie page shows.
pub const RELATED_MOVIES: usize = 3;
const RELATED_MOVIES_FETCH: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Movie not found")]
    NotFound,
    #[error("Failed to fetch movies")]
    FetchFailed(#[from] sqlx::Error),
}

#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Number of movies matching `filter`, ignoring pagination.
    async fn count(&self, filter: &MovieFilter) -> Result<u64, CatalogError>;

    /// One page of matching movies in `sort` order, genres resolved.
    async fn page(
        &self,
        filter: &MovieFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<MovieRecord>, CatalogError>;

    async fn find(&self, id: Uuid) -> Result<MovieRecord, CatalogError>;
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QueryOutcome {
    Page(Vec<MovieRecord>),
    Count(u64),
}

/// Runs a normalised query: the match count in count-only mode, one page
/// otherwise.
pub async fn query<C>(catalog: &C, query: &CatalogQuery) -> Result<QueryOutcome, CatalogError>
where
    C: MovieCatalog + ?Sized,
{
    let outcome = if query.count_only {
        catalog.count(&query.filter).await.map(QueryOutcome::Count)
    } else {
        catalog
            .page(&query.filter, query.sort, query.pagination)
            .await
            .map(QueryOutcome::Page)
    };
    if let Err(err) = &outcome {
        tracing::error!("Error fetching movies {:?}", err);
    }
    outcome
}

/// Looks up a movie by its textual id. Ids that are not UUIDs are reported as
/// not found, same as unknown ones.
pub async fn find_movie<C>(catalog: &C, id: &str) -> Result<MovieRecord, CatalogError>
where
    C: MovieCatalog + ?Sized,
{
    let id = match Uuid::parse_str(id.trim()) {
        Ok(id) => id,
        Err(_) => {
            tracing::info!("Invalid movie id format {:?}", id);
            return Err(CatalogError::NotFound);
        }
    };
    match catalog.find(id).await {
        Err(CatalogError::FetchFailed(err)) => {
            tracing::error!("Error fetching movie {} {:?}", id, err);
            Err(CatalogError::FetchFailed(err))
        }
        other => other,
    }
}

/// Published movies sharing at least one genre with `movie`, newest first.
pub async fn related_movies<C>(
    catalog: &C,
    movie: &MovieRecord,
) -> Result<Vec<MovieRecord>, CatalogError>
where
    C: MovieCatalog + ?Sized,
{
    let genres = movie.genre_ids();
    if genres.is_empty() {
        return Ok(Vec::new());
    }
    let request = CatalogQuery {
        filter: MovieFilter {
            genres: Some(genres),
            ..MovieFilter::published()
        },
        sort: SortOrder::Newest,
        pagination: Pagination {
            page: 1,
            limit: RELATED_MOVIES_FETCH,
        },
        count_only: false,
    };
    match query(catalog, &request).await? {
        QueryOutcome::Page(movies) => Ok(movies
            .into_iter()
            .filter(|related| related.id != movie.id)
            .take(RELATED_MOVIES)
            .collect()),
        QueryOutcome::Count(_) => Ok(Vec::new()),
    }
}

/// One listing page together with the unpaginated match count.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Listing {
    pub data: Vec<MovieRecord>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

pub async fn listing<C>(catalog: &C, request: &CatalogQuery) -> Result<Listing, CatalogError>
where
    C: MovieCatalog + ?Sized,
{
    let total = match query(catalog, &request.clone().counting()).await? {
        QueryOutcome::Count(total) => total,
        QueryOutcome::Page(movies) => movies.len() as u64,
    };
    let page = CatalogQuery {
        count_only: false,
        ..request.clone()
    };
    let data = match query(catalog, &page).await? {
        QueryOutcome::Page(movies) => movies,
        QueryOutcome::Count(_) => Vec::new(),
    };
    Ok(Listing {
        data,
        total,
        page: request.pagination.page,
        limit: request.pagination.limit,
        has_more: request.pagination.has_more(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn genre(name: &str) -> GenreSummary {
        GenreSummary {
            id: Uuid::new_v4(),
            name_english: name.to_string(),
            name_arabic: format!("{} (ar)", name),
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn movie(title: &str, year: i32, created_offset_minutes: i64) -> MovieRecord {
        let created_at = base_time() + Duration::minutes(created_offset_minutes);
        MovieRecord {
            id: Uuid::new_v4(),
            title_english: title.to_string(),
            title_arabic: "فيلم".to_string(),
            plot_english: "plot".to_string(),
            plot_arabic: "حبكة".to_string(),
            year,
            budget: None,
            rating: 0.0,
            genres: vec![],
            director_id: None,
            writer_ids: vec![],
            cast_ids: vec![],
            poster: None,
            cover: None,
            videos: vec![],
            status: MovieStatus::Published,
            created_at,
            updated_at: created_at,
        }
    }

    fn page_of(outcome: QueryOutcome) -> Vec<MovieRecord> {
        match outcome {
            QueryOutcome::Page(movies) => movies,
            QueryOutcome::Count(count) => panic!("expected a page, got count {}", count),
        }
    }

    fn count_of(outcome: QueryOutcome) -> u64 {
        match outcome {
            QueryOutcome::Count(count) => count,
            QueryOutcome::Page(_) => panic!("expected a count"),
        }
    }

    fn public(pairs: &[(&str, &str)]) -> CatalogQuery {
        CatalogQuery::public(&RawCatalogParams::from_pairs(
            pairs.iter().map(|(k, v)| (*k, v.to_string())),
        ))
    }

    #[actix_rt::test]
    async fn newest_breaks_year_ties_by_creation_time() {
        let first_2021 = movie("First", 2021, 0);
        let second_2021 = movie("Second", 2021, 10);
        let catalog = InMemoryCatalog::new(vec![
            movie("Old", 2020, 20),
            first_2021.clone(),
            second_2021.clone(),
        ]);

        let movies = page_of(
            query(&catalog, &public(&[("sort", "newest"), ("limit", "2")]))
                .await
                .unwrap(),
        );
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, second_2021.id);
        assert_eq!(movies[1].id, first_2021.id);
    }

    #[actix_rt::test]
    async fn oldest_sorts_ascending_and_unknown_sort_is_newest() {
        let catalog = InMemoryCatalog::new(vec![
            movie("B", 2021, 0),
            movie("C", 2021, 5),
            movie("A", 2019, 10),
        ]);

        let oldest = page_of(query(&catalog, &public(&[("sort", "oldest")])).await.unwrap());
        let titles: Vec<_> = oldest.iter().map(|m| m.title_english.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);

        let newest = page_of(query(&catalog, &public(&[("sort", "newest")])).await.unwrap());
        let unknown = page_of(query(&catalog, &public(&[("sort", "rating")])).await.unwrap());
        let titles: Vec<_> = newest.iter().map(|m| m.title_english.as_str()).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
        assert_eq!(newest, unknown);
    }

    #[actix_rt::test]
    async fn search_is_case_insensitive_over_both_titles() {
        let mut arabic_match = movie("Something else", 2010, 0);
        arabic_match.title_arabic = "بداية".to_string();
        let catalog = InMemoryCatalog::new(vec![
            movie("Inception", 2010, 1),
            arabic_match.clone(),
            movie("Interstellar", 2014, 2),
        ]);

        for text in ["incep", "INCEP", "ception"] {
            let movies = page_of(query(&catalog, &public(&[("search", text)])).await.unwrap());
            assert_eq!(movies.len(), 1, "search {:?}", text);
            assert_eq!(movies[0].title_english, "Inception");
        }

        let movies = page_of(query(&catalog, &public(&[("search", "بداية")])).await.unwrap());
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, arabic_match.id);
    }

    #[actix_rt::test]
    async fn genre_sets_are_a_union() {
        let genre_a = genre("Action");
        let genre_b = genre("Biography");
        let genre_c = genre("Comedy");
        let mut x = movie("X", 2020, 0);
        x.genres = vec![genre_a.clone()];
        let mut y = movie("Y", 2020, 1);
        y.genres = vec![genre_c];
        let mut z = movie("Z", 2020, 2);
        z.genres = vec![genre_b.clone()];
        let catalog = InMemoryCatalog::new(vec![x.clone(), y.clone(), z.clone()]);

        let request = public(&[
            ("genre", genre_a.id.to_string().as_str()),
            ("genre", genre_b.id.to_string().as_str()),
        ]);
        let movies = page_of(query(&catalog, &request).await.unwrap());
        let ids: Vec<_> = movies.iter().map(|m| m.id).collect();
        assert!(ids.contains(&x.id));
        assert!(ids.contains(&z.id));
        assert!(!ids.contains(&y.id));
    }

    #[actix_rt::test]
    async fn drafts_are_excluded_from_page_and_count() {
        let mut draft = movie("Draft", 2022, 0);
        draft.status = MovieStatus::Draft;
        let published = movie("Published", 2022, 1);
        let catalog = InMemoryCatalog::new(vec![draft, published.clone()]);

        let request = public(&[]);
        let movies = page_of(query(&catalog, &request).await.unwrap());
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, published.id);
        let total = count_of(query(&catalog, &request.clone().counting()).await.unwrap());
        assert_eq!(total, 1);
    }

    #[actix_rt::test]
    async fn count_matches_the_unpaginated_length_and_survives_overflowing_pages() {
        let movies: Vec<_> = (0..30)
            .map(|i| movie(&format!("Movie {}", i), 2000 + (i % 4), i as i64))
            .collect();
        let catalog = InMemoryCatalog::new(movies);

        let total = count_of(
            query(&catalog, &public(&[("year", "2001")]).counting())
                .await
                .unwrap(),
        );
        let everything = page_of(
            query(&catalog, &public(&[("year", "2001"), ("limit", "1000")]))
                .await
                .unwrap(),
        );
        assert_eq!(total, everything.len() as u64);
        assert_eq!(total, 8);

        let beyond = public(&[("year", "2001"), ("page", "9")]);
        assert!(page_of(query(&catalog, &beyond).await.unwrap()).is_empty());
        assert_eq!(count_of(query(&catalog, &beyond.counting()).await.unwrap()), 8);
    }

    #[actix_rt::test]
    async fn pages_never_exceed_the_limit_and_bad_input_is_clamped() {
        let movies: Vec<_> = (0..20).map(|i| movie("M", 2000, i)).collect();
        let catalog = InMemoryCatalog::new(movies);

        for limit in 1..=7u32 {
            for page in 1..=5u32 {
                let request = public(&[("limit", limit.to_string().as_str()), ("page", page.to_string().as_str())]);
                let movies = page_of(query(&catalog, &request).await.unwrap());
                assert!(movies.len() <= limit as usize);
            }
        }

        let clamped = page_of(
            query(&catalog, &public(&[("page", "-4"), ("limit", "zero")]))
                .await
                .unwrap(),
        );
        let first = page_of(query(&catalog, &public(&[])).await.unwrap());
        assert_eq!(clamped.len(), DEFAULT_PAGE_SIZE as usize);
        assert_eq!(clamped, first);
    }

    #[actix_rt::test]
    async fn malformed_ids_are_not_found() {
        let catalog = InMemoryCatalog::default();
        assert!(matches!(
            find_movie(&catalog, "1234").await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            find_movie(&catalog, &Uuid::new_v4().to_string()).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[actix_rt::test]
    async fn related_movies_share_a_genre_and_exclude_the_movie() {
        let action = genre("Action");
        let mut subject = movie("Subject", 2020, 0);
        subject.genres = vec![action.clone()];
        let mut catalog_movies = vec![subject.clone()];
        for i in 1..=5 {
            let mut related = movie(&format!("Related {}", i), 2020, i);
            related.genres = vec![action.clone()];
            catalog_movies.push(related);
        }
        catalog_movies.push(movie("Unrelated", 2024, 99));
        let catalog = InMemoryCatalog::new(catalog_movies);

        let related = related_movies(&catalog, &subject).await.unwrap();
        assert_eq!(related.len(), RELATED_MOVIES);
        assert!(related.iter().all(|m| m.id != subject.id));
        assert!(related.iter().all(|m| m.genres.contains(&action)));
    }

    #[actix_rt::test]
    async fn listing_reports_the_total_next_to_the_page() {
        let movies: Vec<_> = (0..25).map(|i| movie("M", 2000, i)).collect();
        let catalog = InMemoryCatalog::new(movies);

        let second = listing(&catalog, &public(&[("page", "2")])).await.unwrap();
        assert_eq!(second.data.len(), 12);
        assert_eq!(second.total, 25);
        assert_eq!((second.page, second.limit), (2, DEFAULT_PAGE_SIZE));
        assert!(second.has_more);

        let last = listing(&catalog, &public(&[("page", "3")])).await.unwrap();
        assert_eq!(last.data.len(), 1);
        assert!(!last.has_more);
    }
}
