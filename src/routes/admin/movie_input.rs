use std::borrow::Cow;

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::catalog::{MovieStatus, Video};

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("Title content error")
            .with_message(Cow::from("Title can't be empty")));
    }
    if title.chars().count() > 200 {
        return Err(ValidationError::new("Title length error")
            .with_message(Cow::from("Title must be less than 200 characters")));
    }
    Ok(())
}

fn validate_plot(plot: &str) -> Result<(), ValidationError> {
    if plot.trim().is_empty() {
        return Err(ValidationError::new("Plot content error")
            .with_message(Cow::from("Plot can't be empty")));
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct VideoInput {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(url(message = "Video url is not a valid url"))]
    pub url: String,
    #[serde(default)]
    pub is_trailer: bool,
}

impl From<VideoInput> for Video {
    fn from(input: VideoInput) -> Self {
        Video {
            title: input.title.trim().to_string(),
            url: input.url,
            is_trailer: input.is_trailer,
        }
    }
}

/// Body of the admin create and update endpoints. Updates replace every
/// editable field.
#[derive(Deserialize, Debug, Clone, Validate)]
pub struct MovieInput {
    #[validate(custom(function = "validate_title"))]
    pub title_english: String,
    #[validate(custom(function = "validate_title"))]
    pub title_arabic: String,
    #[validate(custom(function = "validate_plot"))]
    pub plot_english: String,
    #[validate(custom(function = "validate_plot"))]
    pub plot_arabic: String,
    #[validate(range(min = 1800, max = 2100, message = "Year must be between 1800 and 2100"))]
    pub year: i32,
    #[validate(range(min = 0, message = "Budget can't be negative"))]
    pub budget: Option<i64>,
    #[validate(range(min = 0.0, max = 10.0, message = "Rating must be between 0 and 10"))]
    pub rating: Option<f32>,
    #[serde(default)]
    pub genres: Vec<Uuid>,
    pub director_id: Option<Uuid>,
    #[serde(default)]
    pub writer_ids: Vec<Uuid>,
    #[serde(default)]
    pub cast_ids: Vec<Uuid>,
    #[validate(url(message = "Poster is not a valid url"))]
    pub poster: Option<String>,
    #[validate(url(message = "Cover is not a valid url"))]
    pub cover: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub videos: Vec<VideoInput>,
    #[serde(default = "default_status")]
    pub status: MovieStatus,
    #[serde(default)]
    pub notify_subscribers: bool,
}

fn default_status() -> MovieStatus {
    MovieStatus::Draft
}

impl MovieInput {
    /// Genre ids without repeats, in request order.
    pub fn genre_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(self.genres.len());
        for id in &self.genres {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    pub fn videos(&self) -> Vec<Video> {
        self.videos.iter().cloned().map(Video::from).collect()
    }
}
