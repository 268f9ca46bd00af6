use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "movie_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MovieStatus {
    Draft,
    Published,
}

impl MovieStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieStatus::Draft => "draft",
            MovieStatus::Published => "published",
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MovieStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(MovieStatus::Draft),
            "published" => Ok(MovieStatus::Published),
            _ => Err(()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Video {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub is_trailer: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GenreSummary {
    pub id: Uuid,
    pub name_english: String,
    pub name_arabic: String,
}

/// A movie as handed out by the catalog, genres resolved.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub id: Uuid,
    pub title_english: String,
    pub title_arabic: String,
    pub plot_english: String,
    pub plot_arabic: String,
    pub year: i32,
    pub budget: Option<i64>,
    pub rating: f32,
    pub genres: Vec<GenreSummary>,
    pub director_id: Option<Uuid>,
    pub writer_ids: Vec<Uuid>,
    pub cast_ids: Vec<Uuid>,
    pub poster: Option<String>,
    pub cover: Option<String>,
    pub videos: Vec<Video>,
    pub status: MovieStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    /// Drops every video that is not a trailer, for viewers without access.
    pub fn retain_trailers(mut self) -> Self {
        self.videos.retain(|video| video.is_trailer);
        self
    }

    pub fn genre_ids(&self) -> Vec<Uuid> {
        self.genres.iter().map(|genre| genre.id).collect()
    }

    /// Every media URL owned by this movie: poster, cover, then videos.
    pub fn media_urls(&self) -> Vec<&str> {
        self.poster
            .iter()
            .chain(self.cover.iter())
            .map(String::as_str)
            .chain(self.videos.iter().map(|video| video.url.as_str()))
            .collect()
    }
}

/// Row shape of the `movies` table, before genre resolution.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MovieRow {
    pub id: Uuid,
    pub title_english: String,
    pub title_arabic: String,
    pub plot_english: String,
    pub plot_arabic: String,
    pub year: i32,
    pub budget: Option<i64>,
    pub rating: f32,
    pub director_id: Option<Uuid>,
    pub writer_ids: Vec<Uuid>,
    pub cast_ids: Vec<Uuid>,
    pub poster: Option<String>,
    pub cover: Option<String>,
    pub videos: Json<Vec<Video>>,
    pub status: MovieStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRow {
    pub(crate) fn into_record(self, genres: Vec<GenreSummary>) -> MovieRecord {
        MovieRecord {
            id: self.id,
            title_english: self.title_english,
            title_arabic: self.title_arabic,
            plot_english: self.plot_english,
            plot_arabic: self.plot_arabic,
            year: self.year,
            budget: self.budget,
            rating: self.rating,
            genres,
            director_id: self.director_id,
            writer_ids: self.writer_ids,
            cast_ids: self.cast_ids,
            poster: self.poster,
            cover: self.cover,
            videos: self.videos.0,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Published".parse::<MovieStatus>(), Ok(MovieStatus::Published));
        assert_eq!(" draft ".parse::<MovieStatus>(), Ok(MovieStatus::Draft));
        assert!("archived".parse::<MovieStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MovieStatus::Published).unwrap(),
            "\"published\""
        );
    }
}
