//! Cached content repository implementation
//!
//! Wraps another repository and serves its answers from a local cache for the
//! duration of the freshness window. Entries are never invalidated by writes;
//! they simply age out.

use super::{ContentError, ContentRepository, FilmRecord, FilmSummary};
use crate::cache::{CacheError, CacheStorage};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// How stale a repository answer may be before it is fetched again
pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(60);

const LISTING_KEY: &str = "listing";

/// A caching wrapper for content repositories
pub struct CachedContentRepository<R>
where
    R: ContentRepository,
{
    /// The underlying repository
    repository: R,
    /// Single films by slug; `None` entries remember misses
    films: CacheStorage<Option<FilmRecord>>,
    /// The listing query result
    listing: CacheStorage<Vec<FilmSummary>>,
}

impl<R> CachedContentRepository<R>
where
    R: ContentRepository,
{
    /// Wraps `repository` with a cache in the system cache directory.
    pub fn new(repository: R, ttl: Duration) -> Result<Self, CacheError> {
        Ok(Self {
            repository,
            films: CacheStorage::open("films", Some(ttl))?,
            listing: CacheStorage::open("listing", Some(ttl))?,
        })
    }

    /// Wraps `repository` with a cache below `base_dir`.
    pub fn new_in(repository: R, base_dir: &Path, ttl: Duration) -> Result<Self, CacheError> {
        Ok(Self {
            repository,
            films: CacheStorage::open_in(base_dir, "films", Some(ttl))?,
            listing: CacheStorage::open_in(base_dir, "listing", Some(ttl))?,
        })
    }

    /// Hex-encodes the slug so that keys stay distinct after file name
    /// sanitizing, which folds case and punctuation.
    fn film_key(slug: &str) -> String {
        let encoded: String = slug.bytes().map(|b| format!("{:02x}", b)).collect();
        format!("film_{}", encoded)
    }
}

impl<R> ContentRepository for CachedContentRepository<R>
where
    R: ContentRepository,
{
    fn fetch_film(&self, slug: &str) -> Result<Option<FilmRecord>, ContentError> {
        let key = Self::film_key(slug);

        match self.films.load(&key) {
            Ok(Some(film)) => {
                debug!(slug, "Film served from cache");
                return Ok(film);
            }
            Ok(None) => {}
            Err(e) => {
                // A broken cache must not prevent the page from rendering
                warn!(error = %e, "Ignoring unreadable film cache entry");
            }
        }

        let film = self.repository.fetch_film(slug)?;

        if let Err(e) = self.films.store(&key, &film) {
            warn!(error = %e, "Failed to cache film");
        }

        Ok(film)
    }

    fn list_films(&self) -> Result<Vec<FilmSummary>, ContentError> {
        match self.listing.load(LISTING_KEY) {
            Ok(Some(films)) => {
                debug!(count = films.len(), "Listing served from cache");
                return Ok(films);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Ignoring unreadable listing cache entry"),
        }

        let films = self.repository.list_films()?;

        if let Err(e) = self.listing.store(LISTING_KEY, &films) {
            warn!(error = %e, "Failed to cache listing");
        }

        Ok(films)
    }
}
