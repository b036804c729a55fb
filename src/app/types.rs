// src/app/types.rs
use serde::Deserialize;

use crate::app::catalog::CatalogError;

// ---- catalog entities ----
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieSummary {
    /// Full poster URL, or `None` when the catalog has no artwork.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        let path = self.poster_path.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        let base = image_base_url.trim_end_matches('/');
        if path.starts_with('/') {
            Some(format!("{base}{path}"))
        } else {
            Some(format!("{base}/{path}"))
        }
    }

    pub fn rating_label(&self) -> String {
        match self.vote_average {
            Some(v) if v > 0.0 => format!("{v:.1}"),
            _ => "N/A".into(),
        }
    }

    pub fn year_label(&self) -> String {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
            .map_or_else(|| "N/A".into(), str::to_string)
    }

    pub fn language_label(&self) -> String {
        self.original_language
            .as_deref()
            .filter(|l| !l.is_empty())
            .map_or_else(|| "—".into(), str::to_ascii_uppercase)
    }
}

/// One fetch cycle's movies, in catalog order.
pub type SearchResult = Vec<MovieSummary>;

// ---- search display state ----
#[derive(Clone, Debug, PartialEq)]
pub enum FetchState {
    Idle,
    Loading,
    /// Catalog answered; may be empty ("No movies found").
    Shown(SearchResult),
    Errored(String),
}

// ---- popularity ledger ----
#[derive(Clone, Debug, PartialEq)]
pub struct PopularityRecord {
    pub id: i64,
    pub search_term: String,
    pub count: u64,
    pub movie_id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub updated_at: i64,
}

/// Top records by count, loaded once per session.
pub type TrendingList = Vec<PopularityRecord>;

// ---- cross-thread messages ----
pub struct CatalogDone {
    pub generation: u64,
    pub query: String,
    pub result: Result<SearchResult, CatalogError>,
}

pub struct PosterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub struct PosterDone {
    pub url: String,
    pub result: Result<PosterImage, String>,
}
