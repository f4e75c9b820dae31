/// Video reference resolution.
///
/// Films point at their trailer or stream through a free-form reference field
/// (usually a share URL). This module extracts the provider's video identifier
/// from that field and looks the video up through a [`VideoProvider`].
mod vimeo;
mod vimeo_types;

pub use vimeo::VimeoProvider;

use crate::rich_text::RichTextDocument;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while resolving a video reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoResolutionError {
    /// The reference field is present but contains no usable identifier
    #[error("Video reference has no identifier: {0:?}")]
    InvalidReference(String),

    /// The request to the provider could not be completed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The provider has no video with this identifier
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    /// The provider answered with an unexpected status
    #[error("Provider returned HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

/// Metadata for one video as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Provider identifier the metadata was fetched for
    pub video_id: String,
    /// URL of the embeddable player
    pub embed_url: Option<String>,
    /// Description, already normalized into rich text
    pub description: Option<RichTextDocument>,
}

/// Trait for external video-metadata providers.
pub trait VideoProvider {
    /// Fetches metadata for a single video by its provider identifier.
    ///
    /// Implementations issue exactly one request and never retry.
    fn fetch_video(&self, video_id: &str) -> Result<VideoMetadata, VideoResolutionError>;
}

/// Extracts the provider identifier from a video reference.
///
/// The identifier is the last non-empty `/`-separated segment, ignoring any
/// query string or fragment. Returns `None` when no segment is left or the
/// segment is not a plain identifier (ASCII letters, digits, `_` and `-`).
///
/// ```
/// use film_pages::extract_video_id;
///
/// assert_eq!(extract_video_id("https://vimeo.com/123456789"), Some("123456789"));
/// assert_eq!(extract_video_id("123456789"), Some("123456789"));
/// ```
pub fn extract_video_id(reference: &str) -> Option<&str> {
    let path = reference.trim().split(['?', '#']).next().unwrap_or_default();
    path.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .filter(|segment| is_plain_identifier(segment))
}

/// Identifiers end up as a URL path segment, so `..` and friends are refused.
fn is_plain_identifier(segment: &str) -> bool {
    segment
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Resolves an optional video reference against `provider`.
///
/// An absent or blank reference yields `Ok(None)` without contacting the
/// provider.
pub fn resolve_video<P>(
    provider: &P,
    reference: Option<&str>,
) -> Result<Option<VideoMetadata>, VideoResolutionError>
where
    P: VideoProvider + ?Sized,
{
    let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
        debug!("Film has no video reference");
        return Ok(None);
    };

    let video_id = extract_video_id(reference)
        .ok_or_else(|| VideoResolutionError::InvalidReference(reference.to_string()))?;

    debug!(reference, video_id, "Resolving video reference");
    provider.fetch_video(video_id).map(Some)
}
