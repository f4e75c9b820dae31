/// Sanity content lake repository implementation.
use super::{ContentError, ContentRepository, FilmRecord, FilmSummary};
use crate::config::SanityConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Single film by slug, with defaults for date and doors-open offset
const FILM_QUERY: &str = r#"*[
  _type == "film" &&
  slug.current == $slug
][0]{
  ...,
  "date": coalesce(date, now()),
  "doorsOpen": coalesce(doorsOpen, 0),
  image->,
  vimeo,
}"#;

/// All films that have a slug, newest first
const FILMS_QUERY: &str = r#"*[
  _type == "film"
  && defined(slug.current)
]{_id, title, slug, date}|order(date desc)"#;

/// Envelope of a GROQ query response.
#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: T,
    /// Server-side query time in milliseconds
    #[serde(default)]
    ms: Option<u64>,
}

/// Error body returned by the query endpoint on 4xx responses.
#[derive(Debug, Deserialize)]
struct QueryErrorResponse {
    error: QueryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct QueryErrorDetail {
    description: Option<String>,
}

/// Content repository backed by the Sanity HTTP query API.
#[derive(Debug)]
pub struct SanityRepository {
    client: reqwest::blocking::Client,
    config: SanityConfig,
}

impl SanityRepository {
    /// Creates a repository for the project and dataset in `config`.
    pub fn new(config: SanityConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// The GROQ query endpoint, on the CDN host when enabled.
    fn query_url(&self) -> String {
        let host = if self.config.use_cdn { "apicdn" } else { "api" };
        format!(
            "https://{}.{}.sanity.io/v{}/data/query/{}",
            self.config.project_id, host, self.config.api_version, self.config.dataset
        )
    }

    /// Runs a GROQ query with JSON-encoded parameters.
    fn run_query<T>(&self, query: &str, params: &[(&str, &str)]) -> Result<T, ContentError>
    where
        T: DeserializeOwned,
    {
        let mut pairs: Vec<(String, String)> = vec![("query".to_string(), query.to_string())];
        for (name, value) in params {
            let encoded = serde_json::to_string(value)
                .map_err(|e| ContentError::ParseError(e.to_string()))?;
            pairs.push((format!("${}", name), encoded));
        }

        let mut request = self.client.get(self.query_url()).query(&pairs);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| ContentError::RequestError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ContentError::RequestError(e.to_string()))?;

        if !status.is_success() {
            return Err(ContentError::HttpStatus {
                status: status.as_u16(),
                message: Self::error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string()),
            });
        }

        Self::parse_query_response(&body)
    }

    /// Extracts the result from a query response body.
    fn parse_query_response<T>(body: &str) -> Result<T, ContentError>
    where
        T: DeserializeOwned,
    {
        let response: QueryResponse<T> =
            serde_json::from_str(body).map_err(|e| ContentError::ParseError(e.to_string()))?;
        if let Some(ms) = response.ms {
            debug!(query_ms = ms, "Sanity query finished");
        }
        Ok(response.result)
    }

    fn error_message(body: &str) -> Option<String> {
        serde_json::from_str::<QueryErrorResponse>(body)
            .ok()
            .and_then(|response| response.error.description)
    }
}

impl ContentRepository for SanityRepository {
    #[instrument(level = "info", skip(self), fields(dataset = %self.config.dataset))]
    fn fetch_film(&self, slug: &str) -> Result<Option<FilmRecord>, ContentError> {
        let film: Option<FilmRecord> = self.run_query(FILM_QUERY, &[("slug", slug)])?;
        info!(found = film.is_some(), "Fetched film");
        Ok(film)
    }

    #[instrument(level = "info", skip(self), fields(dataset = %self.config.dataset))]
    fn list_films(&self) -> Result<Vec<FilmSummary>, ContentError> {
        let films: Vec<FilmSummary> = self.run_query(FILMS_QUERY, &[])?;
        info!(count = films.len(), "Fetched film listing");
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(use_cdn: bool) -> SanityConfig {
        SanityConfig {
            project_id: "abc123".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn,
            token: None,
        }
    }

    #[test]
    fn test_query_url() {
        let live = SanityRepository::new(config(false), Duration::from_secs(1)).unwrap();
        assert_eq!(
            live.query_url(),
            "https://abc123.api.sanity.io/v2024-01-01/data/query/production"
        );

        let cdn = SanityRepository::new(config(true), Duration::from_secs(1)).unwrap();
        assert_eq!(
            cdn.query_url(),
            "https://abc123.apicdn.sanity.io/v2024-01-01/data/query/production"
        );
    }

    #[test]
    fn test_parse_single_film_response() {
        let body = r#"{
            "ms": 4,
            "query": "*[...]",
            "result": {
                "_id": "film-1",
                "title": "Paris, Texas",
                "slug": { "current": "paris-texas" },
                "date": "2026-10-16T19:30:00Z",
                "doorsOpen": 0,
                "vimeo": "https://vimeo.com/123456789"
            }
        }"#;

        let film: Option<FilmRecord> = SanityRepository::parse_query_response(body).unwrap();
        let film = film.unwrap();
        assert_eq!(film.title.as_deref(), Some("Paris, Texas"));
        assert_eq!(film.vimeo.as_deref(), Some("https://vimeo.com/123456789"));
    }

    #[test]
    fn test_parse_missing_film_response() {
        let body = r#"{ "ms": 2, "query": "*[...]", "result": null }"#;
        let film: Option<FilmRecord> = SanityRepository::parse_query_response(body).unwrap();
        assert_eq!(film, None);
    }

    #[test]
    fn test_parse_listing_response() {
        let body = r#"{
            "result": [
                { "_id": "a", "title": "A", "slug": { "current": "a" }, "date": "2026-10-20T20:00:00Z" },
                { "_id": "b", "title": "B", "slug": { "current": "b" }, "date": null }
            ]
        }"#;
        let films: Vec<FilmSummary> = SanityRepository::parse_query_response(body).unwrap();
        assert_eq!(films.len(), 2);
        assert_eq!(films[0].slug(), Some("a"));
        assert_eq!(films[1].date, None);
    }

    #[test]
    fn test_parse_garbage_is_parse_error() {
        let result = SanityRepository::parse_query_response::<Vec<FilmSummary>>("not json");
        assert!(matches!(result, Err(ContentError::ParseError(_))));
    }

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{ "error": { "description": "expected '}' following object body", "type": "queryParseError" } }"#;
        assert_eq!(
            SanityRepository::error_message(body).as_deref(),
            Some("expected '}' following object body")
        );
        assert_eq!(SanityRepository::error_message("<html>"), None);
    }
}
