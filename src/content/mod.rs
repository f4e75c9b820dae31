/// Film records and the repository they are read from.
///
/// This module defines the shape of film documents as returned by the content
/// store, and the [`ContentRepository`] trait through which the render
/// pipeline reads them.
mod cached;
mod sanity;

pub use cached::{CachedContentRepository, FRESHNESS_WINDOW};
pub use sanity::SanityRepository;

use crate::rich_text::RichTextDocument;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

/// Errors that can occur while reading from the content store.
#[derive(Debug, Error)]
pub enum ContentError {
    /// Request to the content store failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The content store answered with an unexpected status
    #[error("Content store returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Failed to parse the content store's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

/// A URL-safe document slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// Reference to an image asset, either still a reference or already
/// dereferenced into the asset document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SanityImage {
    /// Asset document id, set when the image was dereferenced
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Asset URL, set when the image was dereferenced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Embedded asset reference of an image field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetReference>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetReference {
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SanityImage {
    /// The `image-...` asset id, wherever it is stored.
    pub fn asset_id(&self) -> Option<&str> {
        let from_asset = self
            .asset
            .as_ref()
            .and_then(|asset| asset.reference.as_deref().or(asset.id.as_deref()));
        from_asset.or(self.id.as_deref())
    }

    pub fn asset_url(&self) -> Option<&str> {
        self.asset
            .as_ref()
            .and_then(|asset| asset.url.as_deref())
            .or(self.url.as_deref())
    }
}

/// A complete film document as used by the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    /// Screening start
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub date: Option<DateTime<Utc>>,
    /// Minutes before `date` at which doors open
    #[serde(rename = "doorsOpen", default)]
    pub doors_open: Option<f64>,
    #[serde(default)]
    pub image: Option<SanityImage>,
    /// Category tag, e.g. `double-feature`
    #[serde(rename = "filmType", default)]
    pub film_type: Option<String>,
    /// CMS-authored description
    #[serde(default)]
    pub details: Option<RichTextDocument>,
    /// Free-form video reference, usually a Vimeo share URL
    #[serde(default)]
    pub vimeo: Option<String>,
}

impl FilmRecord {
    /// Event timestamp, defaulting to `now` when the document has none.
    pub fn event_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.date.unwrap_or(now)
    }

    /// Doors-open offset in minutes, defaulting to zero.
    pub fn doors_open_minutes(&self) -> f64 {
        self.doors_open.unwrap_or(0.0)
    }

    pub fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|slug| slug.current.as_str())
    }
}

/// The subset of a film document shown on the listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub date: Option<DateTime<Utc>>,
}

impl FilmSummary {
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_ref().map(|slug| slug.current.as_str())
    }
}

/// Trait for stores that can serve film documents.
///
/// Implementors return records with embedded references resolved one level
/// deep.
pub trait ContentRepository {
    /// Fetches the film with the given slug, `None` if there is none.
    fn fetch_film(&self, slug: &str) -> Result<Option<FilmRecord>, ContentError>;

    /// Lists all films that have a slug.
    fn list_films(&self) -> Result<Vec<FilmSummary>, ContentError>;
}

impl<R> ContentRepository for Box<R>
where
    R: ContentRepository + ?Sized,
{
    fn fetch_film(&self, slug: &str) -> Result<Option<FilmRecord>, ContentError> {
        (**self).fetch_film(slug)
    }

    fn list_films(&self) -> Result<Vec<FilmSummary>, ContentError> {
        (**self).list_films()
    }
}

/// Parses an RFC 3339 datetime, or a bare `YYYY-MM-DD` date as UTC midnight.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_film_record_from_query_result() {
        let film: FilmRecord = serde_json::from_value(json!({
            "_id": "film-1",
            "_type": "film",
            "_rev": "xyz",
            "title": "Stalker",
            "slug": { "_type": "slug", "current": "stalker" },
            "date": "2026-10-16T19:30:00.000Z",
            "doorsOpen": 30,
            "filmType": "double-feature",
            "vimeo": "https://vimeo.com/76979871",
            "details": [{ "_type": "block", "children": [{ "_type": "span", "text": "Tarkovsky." }] }],
            "image": null
        }))
        .unwrap();

        assert_eq!(film.slug(), Some("stalker"));
        assert_eq!(
            film.date,
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 19, 30, 0).unwrap())
        );
        assert_eq!(film.doors_open_minutes(), 30.0);
        assert_eq!(film.film_type.as_deref(), Some("double-feature"));
        assert_eq!(film.details.unwrap().len(), 1);
        assert_eq!(film.image, None);
    }

    #[test]
    fn test_film_record_defaults() {
        let film: FilmRecord = serde_json::from_value(json!({ "_id": "film-2" })).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        assert_eq!(film.event_at(now), now);
        assert_eq!(film.doors_open_minutes(), 0.0);
        assert_eq!(film.vimeo, None);
        assert_eq!(film.details, None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(
            parse_timestamp("2026-10-16T19:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 17, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2026-10-16"),
            Some(Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("next friday"), None);
    }

    #[test]
    fn test_invalid_date_is_a_parse_error() {
        let result = serde_json::from_value::<FilmSummary>(json!({ "_id": "x", "date": "soon" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_survives_cache_round_trip() {
        let film: FilmRecord = serde_json::from_value(json!({
            "_id": "film-3",
            "slug": { "current": "la-jetee" },
            "date": "2026-11-01",
            "image": { "asset": { "_ref": "image-abc-10x10-png" } }
        }))
        .unwrap();

        let stored = serde_json::to_string(&film).unwrap();
        let restored: FilmRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, film);
    }
}
