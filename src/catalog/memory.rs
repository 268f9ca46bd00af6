use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogError, MovieCatalog, MovieFilter, MovieRecord, Pagination, SortOrder};

/// Catalog held in process memory. Applies the same typed filter and sort
/// as the Postgres catalog; used for seeded demos and tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    movies: RwLock<Vec<MovieRecord>>,
}

impl InMemoryCatalog {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        InMemoryCatalog {
            movies: RwLock::new(movies),
        }
    }

    pub async fn insert(&self, movie: MovieRecord) {
        self.movies.write().await.push(movie);
    }
}

#[async_trait]
impl MovieCatalog for InMemoryCatalog {
    async fn count(&self, filter: &MovieFilter) -> Result<u64, CatalogError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().filter(|movie| filter.matches(movie)).count() as u64)
    }

    async fn page(
        &self,
        filter: &MovieFilter,
        sort: SortOrder,
        pagination: Pagination,
    ) -> Result<Vec<MovieRecord>, CatalogError> {
        let movies = self.movies.read().await;
        let mut matching: Vec<&MovieRecord> =
            movies.iter().filter(|movie| filter.matches(movie)).collect();
        matching.sort_by(|a, b| sort.compare(a, b));
        Ok(matching
            .into_iter()
            .skip(pagination.offset().min(usize::MAX as u64) as usize)
            .take(pagination.limit as usize)
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> Result<MovieRecord, CatalogError> {
        let movies = self.movies.read().await;
        movies
            .iter()
            .find(|movie| movie.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MovieStatus;
    use chrono::Utc;

    fn draft(title: &str) -> MovieRecord {
        MovieRecord {
            id: Uuid::new_v4(),
            title_english: title.to_string(),
            title_arabic: "مسودة".to_string(),
            plot_english: "plot".to_string(),
            plot_arabic: "حبكة".to_string(),
            year: 2023,
            budget: None,
            rating: 0.0,
            genres: vec![],
            director_id: None,
            writer_ids: vec![],
            cast_ids: vec![],
            poster: None,
            cover: None,
            videos: vec![],
            status: MovieStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[actix_rt::test]
    async fn inserted_movies_are_visible_to_later_queries() {
        let catalog = InMemoryCatalog::default();
        let published_only = MovieFilter::published();
        assert_eq!(catalog.count(&MovieFilter::default()).await.unwrap(), 0);

        let mut movie = draft("Seeded");
        catalog.insert(movie.clone()).await;
        assert_eq!(catalog.count(&MovieFilter::default()).await.unwrap(), 1);
        assert_eq!(catalog.count(&published_only).await.unwrap(), 0);
        assert_eq!(catalog.find(movie.id).await.unwrap(), movie);

        movie.id = Uuid::new_v4();
        movie.status = MovieStatus::Published;
        catalog.insert(movie.clone()).await;
        let page = catalog
            .page(&published_only, SortOrder::Newest, Pagination::default())
            .await
            .unwrap();
        assert_eq!(page, vec![movie]);
    }

    #[actix_rt::test]
    async fn pages_past_the_end_are_empty() {
        let catalog = InMemoryCatalog::new(vec![draft("Only")]);
        let page = catalog
            .page(
                &MovieFilter::default(),
                SortOrder::Oldest,
                Pagination {
                    page: u32::MAX,
                    limit: u32::MAX,
                },
            )
            .await
            .unwrap();
        assert!(page.is_empty());
    }
}
