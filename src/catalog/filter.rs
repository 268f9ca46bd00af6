use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{MovieRecord, MovieStatus};

/// Typed listing constraints. Every field left `None` imposes nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub status: Option<MovieStatus>,
    /// Movie matches when it carries any of these genres. `Some(vec![])`
    /// matches no movie at all.
    pub genres: Option<Vec<Uuid>>,
    pub year: Option<i32>,
    /// Trimmed, non-empty search text.
    pub search: Option<String>,
}

impl MovieFilter {
    pub fn published() -> Self {
        MovieFilter {
            status: Some(MovieStatus::Published),
            ..Default::default()
        }
    }

    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if let Some(status) = self.status {
            if movie.status != status {
                return false;
            }
        }
        if let Some(genres) = &self.genres {
            if !movie.genres.iter().any(|genre| genres.contains(&genre.id)) {
                return false;
            }
        }
        if let Some(year) = self.year {
            if movie.year != year {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !movie.title_english.to_lowercase().contains(&needle)
                && !movie.title_arabic.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Appends the `WHERE` clause for this filter. The movies table must be
    /// aliased `m`.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut keyword = " WHERE ";

        if let Some(status) = self.status {
            builder.push(keyword).push("m.status = ").push_bind(status);
            keyword = " AND ";
        }
        if let Some(genres) = &self.genres {
            builder
                .push(keyword)
                .push(
                    "EXISTS (SELECT 1 FROM movie_genres mg WHERE mg.movie_id = m.id AND mg.genre_id = ANY(",
                )
                .push_bind(genres.clone())
                .push("))");
            keyword = " AND ";
        }
        if let Some(year) = self.year {
            builder.push(keyword).push("m.year = ").push_bind(year);
            keyword = " AND ";
        }
        if let Some(search) = &self.search {
            let pattern = like_pattern(search);
            builder
                .push(keyword)
                .push("(m.title_english ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR m.title_arabic ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
    }
}

/// `%text%` with LIKE wildcards in `text` matched literally.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
