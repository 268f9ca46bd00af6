use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::Instrument;
use uuid::Uuid;

use super::record::MovieRow;
use super::{
    CatalogError, GenreSummary, MovieCatalog, MovieFilter, MovieRecord, Pagination, SortOrder,
};

const MOVIE_COLUMNS: &str = "SELECT m.id, m.title_english, m.title_arabic, m.plot_english, \
     m.plot_arabic, m.year, m.budget, m.rating, m.director_id, m.writer_ids, m.cast_ids, \
     m.poster, m.cover, m.videos, m.status, m.created_at, m.updated_at FROM movies m";

#[derive(Debug, sqlx::FromRow)]
struct MovieGenreRow {
    movie_id: Uuid,
    id: Uuid,
    name_english: String,
    name_arabic: String,
}

/// Catalog backed by the `movies`, `genres` and `movie_genres` tables.
#[derive(Clone, Debug)]
pub struct PgMovieCatalog {
    pool: PgPool,
}

impl PgMovieCatalog {
    pub fn new(pool: PgPool) -> Self {
        PgMovieCatalog { pool }
    }

    async fn genres_by_movie(
        &self,
        movie_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, Vec<GenreSummary>>, sqlx::Error> {
        let mut genres: HashMap<Uuid, Vec<GenreSummary>> = HashMap::new();
        if movie_ids.is_empty() {
            return Ok(genres);
        }
        let rows = sqlx::query_as::<_, MovieGenreRow>(
            r#"
                SELECT mg.movie_id, g.id, g.name_english, g.name_arabic
                FROM movie_genres mg
                JOIN genres g ON g.id = mg.genre_id
                WHERE mg.movie_id = ANY($1)
                ORDER BY g.name_english
            "#,
        )
        .bind(movie_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            genres.entry(row.movie_id).or_default().push(GenreSummary {
                id: row.id,
                name_english: row.name_english,
                name_arabic: row.name_arabic,
            });
        }
        Ok(genres)
    }

    async fn resolve(&self, rows: Vec<MovieRow>) -> Result<Vec<MovieRecord>, sqlx::Error> {
        let mut genres = self
            .genres_by_movie(rows.iter().map(|row| row.id).collect())
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let movie_genres = genres.remove(&row.id).unwrap_or_default();
                row.into_record(movie_genres)
            })
            .collect())
    }
}

pub(crate) fn count_query(filter: &MovieFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM movies m");
    filter.push_where(&mut builder);
    builder
}

pub(crate) fn page_query(
    filter: &MovieFilter,
    sort: SortOrder,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(MOVIE_COLUMNS);
    filter.push_where(&mut builder);
    builder
        .push(" ORDER BY ")
        .push(sort.order_by_sql())
        .push(" LIMIT ")
        .push_bind(i64::from(pagination.limit))
        .push(" OFFSET ")
        .push_bind(bound_offset(pagination));
    builder
}

/// OFFSET as Postgres takes it. Offsets past `i64::MAX` saturate, which
/// still lands beyond the last row and yields an empty page.
pub(crate) fn bound_offset(pagination: Pagination) -> i64 {
    i64::try_from(pagination.offset()).unwrap_or(i64::MAX)
}

#[async_trait]
impl MovieCatalog for PgMovieCatalog {
    async fn count(&self, filter: &MovieFilter) -> Result<u64, CatalogError> {
        let query_span = tracing::info_span!("Counting catalog movies", ?filter);
        let mut builder = count_query(filter);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .instrument(query_span)
            .await?;
        Ok(total.max(0) as u64)
    }

    async fn page(
        &self,
        filter: &MovieFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<MovieRecord>, CatalogError> {
        let query_span = tracing::info_span!("Fetching catalog page", ?filter, ?sort, ?pagination);
        let mut builder = page_query(filter, sort, pagination);
        let rows = builder
            .build_query_as::<MovieRow>()
            .fetch_all(&self.pool)
            .instrument(query_span.clone())
            .await?;
        let movies = self.resolve(rows).instrument(query_span).await?;
        Ok(movies)
    }

    async fn find(&self, id: Uuid) -> Result<MovieRecord, CatalogError> {
        let query_span = tracing::info_span!("Fetching movie", %id);
        let sql = format!("{} WHERE m.id = $1", MOVIE_COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span.clone())
            .await?
            .ok_or(CatalogError::NotFound)?;
        let mut movies = self.resolve(vec![row]).instrument(query_span).await?;
        movies.pop().ok_or(CatalogError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogQuery, MovieStatus, RawCatalogParams};

    #[test]
    fn page_query_orders_then_paginates() {
        let filter = MovieFilter {
            status: Some(MovieStatus::Published),
            year: Some(2020),
            ..Default::default()
        };
        let builder = page_query(&filter, SortOrder::Oldest, Pagination { page: 3, limit: 5 });
        let sql = builder.sql();
        assert!(sql.starts_with("SELECT m.id, m.title_english"));
        assert!(sql.ends_with(
            " WHERE m.status = $1 AND m.year = $2 ORDER BY m.year ASC, m.created_at ASC, m.id ASC LIMIT $3 OFFSET $4"
        ));
    }

    #[test]
    fn count_query_ignores_sort_and_pagination() {
        let builder = count_query(&MovieFilter::published());
        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM movies m WHERE m.status = $1"
        );
    }

    #[test]
    fn oversized_pages_bind_a_non_negative_offset() {
        let request = CatalogQuery::public(&RawCatalogParams::from_pairs([
            ("page", u32::MAX.to_string()),
            ("limit", u32::MAX.to_string()),
        ]));
        assert_eq!(
            request.pagination,
            Pagination {
                page: u32::MAX,
                limit: u32::MAX
            }
        );
        assert!(request.pagination.offset() > i64::MAX as u64);
        assert_eq!(bound_offset(request.pagination), i64::MAX);
        assert!(!request.pagination.has_more(u64::MAX / 2));

        assert_eq!(bound_offset(Pagination { page: 3, limit: 5 }), 10);
    }
}
