//! Film pages - render a film catalog from Sanity content and Vimeo metadata
//!
//! This library resolves everything a film detail page shows: the film
//! document from the content store, display-ready screening times, the
//! embeddable video and its description from Vimeo, and the single
//! description that wins between Vimeo and the CMS.
//!
//! # Examples
//!
//! ```no_run
//! use film_pages::{
//!     AppConfig, DisplayZone, RenderOptions, SanityRepository, VimeoProvider, render_film_page,
//! };
//! use std::time::Duration;
//!
//! let config = AppConfig::from_env()?;
//! let repository = SanityRepository::new(config.sanity, Duration::from_secs(10))?;
//! let provider = VimeoProvider::new(config.vimeo, Duration::from_secs(10))?;
//! let options = RenderOptions::new(DisplayZone::Local);
//!
//! let page = render_film_page(&repository, &provider, "stalker", &options)?;
//! println!("{} doors open {}", page.date_text, page.doors_open_time_text);
//! # Ok::<(), film_pages::FilmPagesError>(())
//! ```

mod cache;
mod config;
mod content;
mod description;
mod image;
mod render;
mod rich_text;
mod showtime;
mod video;

// Re-export error types
pub use cache::CacheError;
pub use config::ConfigError;
pub use content::ContentError;
pub use render::RenderError;
pub use showtime::InvalidZoneError;
pub use video::VideoResolutionError;

pub use cache::CacheStorage;
pub use config::{AppConfig, SanityConfig, VimeoCredentials, load_dotenv};
pub use content::{
    AssetReference, CachedContentRepository, ContentRepository, FRESHNESS_WINDOW, FilmRecord,
    FilmSummary, SanityImage, SanityRepository, Slug,
};
pub use description::{normalize_provider_description, reconcile};
pub use image::{DETAIL_IMAGE_HEIGHT, DETAIL_IMAGE_WIDTH, ImageUrlBuilder};
pub use render::{
    FilmIndex, FilmIndexItem, FilmPage, RenderOptions, VideoEnrichment, assemble,
    category_label, enrich_with_video, fetch_record, render_film_index, render_film_page,
};
pub use rich_text::{Block, RichTextDocument, Span};
pub use showtime::{DisplayZone, Showtimes, derive_showtimes, short_date};
pub use video::{VideoMetadata, VideoProvider, VimeoProvider, extract_video_id, resolve_video};

use thiserror::Error;

/// Top-level error type for film page operations
#[derive(Debug, Error)]
pub enum FilmPagesError {
    /// Configuration is incomplete or invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The page could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Error during cache operations
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// An HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Output could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
