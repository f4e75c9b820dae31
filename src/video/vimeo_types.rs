/// Vimeo API response types for deserialization.
///
/// Only the fields the detail page needs are modelled; the API returns many
/// more.
use serde::Deserialize;

/// A video object from `GET /videos/{video_id}`.
#[derive(Debug, Deserialize)]
pub(super) struct VimeoVideo {
    /// Plain-text description written by the uploader (may be null)
    pub description: Option<String>,
    /// Player URL suitable for an iframe `src`
    pub player_embed_url: Option<String>,
}
