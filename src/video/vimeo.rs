/// Vimeo video provider implementation.
use super::vimeo_types::VimeoVideo;
use super::{VideoMetadata, VideoProvider, VideoResolutionError};
use crate::config::VimeoCredentials;
use crate::description::normalize_provider_description;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Media type pinning the API version the response types were written against
const VIMEO_ACCEPT: &str = "application/vnd.vimeo.*+json;version=3.4";

/// Video provider for the Vimeo REST API.
///
/// Requests are authenticated with the access token from the injected
/// credentials. Each lookup is a single request with the configured timeout.
#[derive(Debug)]
pub struct VimeoProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    credentials: VimeoCredentials,
}

impl VimeoProvider {
    /// Creates a provider bound to `credentials`.
    pub fn new(credentials: VimeoCredentials, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: "https://api.vimeo.com".to_string(),
            credentials,
        })
    }

    /// Points the provider at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Converts a Vimeo video to our internal metadata structure.
    fn convert_video(video_id: &str, video: VimeoVideo) -> VideoMetadata {
        VideoMetadata {
            video_id: video_id.to_string(),
            embed_url: video.player_embed_url.filter(|url| !url.trim().is_empty()),
            description: normalize_provider_description(video.description.as_deref()),
        }
    }

    /// Parses a raw `/videos/{id}` response body.
    fn parse_video(video_id: &str, body: &str) -> Result<VideoMetadata, VideoResolutionError> {
        let video: VimeoVideo = serde_json::from_str(body)
            .map_err(|e| VideoResolutionError::ParseError(e.to_string()))?;
        Ok(Self::convert_video(video_id, video))
    }
}

impl VideoProvider for VimeoProvider {
    #[instrument(level = "info", skip(self), fields(client_id = %self.credentials.client_id))]
    fn fetch_video(&self, video_id: &str) -> Result<VideoMetadata, VideoResolutionError> {
        let url = format!("{}/videos/{}", self.base_url, video_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.access_token)
            .header(ACCEPT, VIMEO_ACCEPT)
            .send()
            .map_err(|e| {
                warn!(error = %e, "Vimeo request failed");
                VideoResolutionError::RequestError(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VideoResolutionError::VideoNotFound(video_id.to_string()));
        }

        if !status.is_success() {
            return Err(VideoResolutionError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response
            .text()
            .map_err(|e| VideoResolutionError::RequestError(e.to_string()))?;
        debug!(bytes = body.len(), "Received Vimeo video body");

        Self::parse_video(video_id, &body)
    }
}
