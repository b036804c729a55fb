// src/app/catalog.rs
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::app::types::{MovieSummary, SearchResult};
use crate::config::{ConfigError, Credential};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("catalog responded with HTTP {status}")]
    Http { status: u16 },
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("catalog client is misconfigured: {0}")]
    Misconfigured(#[from] ConfigError),
}

/// Anything that can answer a catalog lookup. Called from worker threads.
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self, query: &str) -> Result<SearchResult, CatalogError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogRequest<'a> {
    Search(&'a str),
    BrowsePopular,
}

impl<'a> CatalogRequest<'a> {
    /// An empty query browses the popular listing; any other text is searched as typed.
    pub fn for_query(query: &'a str) -> Self {
        if query.is_empty() {
            Self::BrowsePopular
        } else {
            Self::Search(query)
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::Search(q) => format!("{base}/search/movie?query={}", urlencoding::encode(q)),
            Self::BrowsePopular => format!("{base}/discover/movie?sort_by=popularity.desc"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    results: Option<Vec<MovieSummary>>,
}

/// A missing or empty `results` field is a successful empty lookup.
pub fn parse_results(body: &[u8]) -> Result<SearchResult, CatalogError> {
    let parsed: CatalogResponse =
        serde_json::from_slice(body).map_err(|e| CatalogError::Decode(e.to_string()))?;
    Ok(parsed.results.unwrap_or_default())
}

/// HTTP client for the TMDB-style movie catalog.
pub struct CatalogClient {
    http: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(
        base_url: impl Into<String>,
        credential: &Credential,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&credential.bearer())
            .map_err(|_| CatalogError::Misconfigured(ConfigError::InvalidCredential))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent("reelscout/catalog")
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::Transport(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl CatalogSource for CatalogClient {
    fn fetch_catalog(&self, query: &str) -> Result<SearchResult, CatalogError> {
        let url = CatalogRequest::for_query(query).url(&self.base_url);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp
            .bytes()
            .map_err(|e| CatalogError::Transport(format!("read body: {e}")))?;
        parse_results(&body)
    }
}

/// Stand-in used when no working client could be built: never touches the
/// network and answers every lookup with the setup error.
pub struct UnavailableCatalog(pub CatalogError);

impl CatalogSource for UnavailableCatalog {
    fn fetch_catalog(&self, _query: &str) -> Result<SearchResult, CatalogError> {
        Err(self.0.clone())
    }
}

/// Real client when a credential is present, otherwise a stand-in that reports
/// why searches cannot run.
pub fn catalog_for(
    base_url: &str,
    credential: Result<Credential, ConfigError>,
    timeout: Duration,
) -> Arc<dyn CatalogSource> {
    let cred = match credential {
        Ok(cred) => cred,
        Err(err) => {
            warn!("{err}; searches will report a configuration error");
            return Arc::new(UnavailableCatalog(err.into()));
        }
    };
    match CatalogClient::new(base_url, &cred, timeout) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            warn!("Catalog client unavailable: {err}");
            Arc::new(UnavailableCatalog(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.themoviedb.org/3";

    #[test]
    fn blank_query_browses_popular() {
        assert_eq!(CatalogRequest::for_query(""), CatalogRequest::BrowsePopular);
        assert_eq!(
            CatalogRequest::BrowsePopular.url(BASE),
            "https://api.themoviedb.org/3/discover/movie?sort_by=popularity.desc"
        );
    }

    #[test]
    fn whitespace_query_is_still_a_search() {
        let req = CatalogRequest::for_query("   ");
        assert_eq!(req, CatalogRequest::Search("   "));
        assert_eq!(
            req.url(BASE),
            "https://api.themoviedb.org/3/search/movie?query=%20%20%20"
        );
    }

    #[test]
    fn search_query_is_url_encoded() {
        let req = CatalogRequest::for_query("Amélie & friends?");
        assert_eq!(req, CatalogRequest::Search("Amélie & friends?"));
        assert_eq!(
            req.url("https://api.themoviedb.org/3/"),
            "https://api.themoviedb.org/3/search/movie?query=Am%C3%A9lie%20%26%20friends%3F"
        );
    }

    #[test]
    fn missing_and_empty_results_are_successful_empties() {
        assert_eq!(parse_results(br#"{"page": 1}"#), Ok(Vec::new()));
        assert_eq!(parse_results(br#"{"results": []}"#), Ok(Vec::new()));
        assert_eq!(parse_results(br#"{"results": null}"#), Ok(Vec::new()));
    }

    #[test]
    fn results_keep_catalog_order() {
        let body = br#"{"page":1,"results":[
            {"id": 2, "title": "Dune: Part Two", "poster_path": "/b.jpg"},
            {"id": 1, "title": "Dune", "poster_path": "/a.jpg"}
        ]}"#;
        let results = parse_results(body).unwrap();
        let ids: Vec<i64> = results.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            parse_results(b"<html>oops</html>"),
            Err(CatalogError::Decode(_))
        ));
    }

    #[test]
    fn missing_credential_yields_misconfigured_catalog() {
        let catalog = catalog_for(BASE, Err(ConfigError::MissingCredential), Duration::from_secs(1));
        assert_eq!(
            catalog.fetch_catalog("dune"),
            Err(CatalogError::Misconfigured(ConfigError::MissingCredential))
        );
    }

    #[test]
    fn client_setup_failure_is_not_reported_as_missing_key() {
        let catalog = UnavailableCatalog(CatalogError::Transport("http client: no tls backend".into()));
        assert_eq!(
            catalog.fetch_catalog(""),
            Err(CatalogError::Transport("http client: no tls backend".into()))
        );
    }
}
