//! Page assembly
//!
//! The detail page is built in two explicit stages: [`fetch_record`] reads
//! the film from the repository and ends the render when it does not exist,
//! then [`enrich_with_video`] looks up the film's video. Enrichment never
//! fails the render; its outcome is folded into the page by [`assemble`].

use crate::content::{ContentError, ContentRepository, FilmRecord};
use crate::description::reconcile;
use crate::image::{DETAIL_IMAGE_HEIGHT, DETAIL_IMAGE_WIDTH, ImageUrlBuilder};
use crate::rich_text::RichTextDocument;
use crate::showtime::{DisplayZone, derive_showtimes, short_date};
use crate::video::{VideoMetadata, VideoProvider, VideoResolutionError, resolve_video};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Errors that end a render
#[derive(Debug, Error)]
pub enum RenderError {
    /// No film has the requested slug
    #[error("Film not found: {0}")]
    NotFound(String),

    /// The content store could not be read
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
}

/// Outcome of the video enrichment stage.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoEnrichment {
    /// The provider returned metadata
    Resolved(VideoMetadata),
    /// The film has no video reference
    NoVideo,
    /// Resolution failed; the page renders without provider data
    Failed(VideoResolutionError),
}

/// Settings shared by all renders of one process.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Zone event times are displayed in
    pub zone: DisplayZone,
    /// Reference time for films without a date
    pub now: DateTime<Utc>,
    /// Image URL builder, `None` disables image URLs
    pub images: Option<ImageUrlBuilder>,
}

impl RenderOptions {
    pub fn new(zone: DisplayZone) -> Self {
        Self {
            zone,
            now: Utc::now(),
            images: None,
        }
    }

    pub fn with_images(mut self, images: ImageUrlBuilder) -> Self {
        self.images = Some(images);
        self
    }
}

/// View model of the detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmPage {
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub headline: Option<String>,
    /// Raw category tag
    pub category: Option<String>,
    /// Category tag as displayed
    pub category_label: Option<String>,
    pub image_url: Option<String>,
    pub date_text: String,
    pub time_text: String,
    pub doors_open_time_text: String,
    pub video_embed_url: Option<String>,
    pub description: Option<RichTextDocument>,
    /// Why the video could not be resolved, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_unavailable: Option<String>,
}

/// One entry on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmIndexItem {
    pub id: String,
    pub title: Option<String>,
    pub date_text: Option<String>,
    /// Link to the detail page
    pub href: String,
}

/// View model of the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilmIndex {
    pub items: Vec<FilmIndexItem>,
}

/// Stage one: reads the film or ends the render with [`RenderError::NotFound`].
pub fn fetch_record<R>(repository: &R, slug: &str) -> Result<FilmRecord, RenderError>
where
    R: ContentRepository + ?Sized,
{
    repository
        .fetch_film(slug)?
        .ok_or_else(|| RenderError::NotFound(slug.to_string()))
}

/// Stage two: resolves the film's video reference, absorbing failures.
pub fn enrich_with_video<P>(provider: &P, reference: Option<&str>) -> VideoEnrichment
where
    P: VideoProvider + ?Sized,
{
    match resolve_video(provider, reference) {
        Ok(Some(video)) => VideoEnrichment::Resolved(video),
        Ok(None) => VideoEnrichment::NoVideo,
        Err(e) => {
            warn!(error = %e, "Video enrichment failed, rendering without it");
            VideoEnrichment::Failed(e)
        }
    }
}

/// Combines a record and its enrichment into the detail page model.
pub fn assemble(record: FilmRecord, video: VideoEnrichment, options: &RenderOptions) -> FilmPage {
    let showtimes = derive_showtimes(
        record.event_at(options.now),
        record.doors_open_minutes(),
        &options.zone,
    );

    let image_url = match (&options.images, &record.image) {
        (Some(images), Some(image)) => images.url(image, DETAIL_IMAGE_WIDTH, DETAIL_IMAGE_HEIGHT),
        _ => None,
    };

    let (video_embed_url, provider_description, video_unavailable) = match video {
        VideoEnrichment::Resolved(video) => (video.embed_url, video.description, None),
        VideoEnrichment::NoVideo => (None, None, None),
        VideoEnrichment::Failed(e) => (None, None, Some(e.to_string())),
    };

    FilmPage {
        slug: record.slug().map(str::to_string),
        id: record.id,
        title: record.title,
        headline: record.headline,
        category_label: record.film_type.as_deref().map(category_label),
        category: record.film_type,
        image_url,
        date_text: showtimes.date_text,
        time_text: showtimes.time_text,
        doors_open_time_text: showtimes.doors_open_time_text,
        video_embed_url,
        description: reconcile(provider_description, record.details),
        video_unavailable,
    }
}

/// Renders the detail page for `slug`.
///
/// At most one repository read followed by at most one provider lookup. The
/// provider is not contacted when the film does not exist.
#[instrument(level = "info", skip(repository, provider, options))]
pub fn render_film_page<R, P>(
    repository: &R,
    provider: &P,
    slug: &str,
    options: &RenderOptions,
) -> Result<FilmPage, RenderError>
where
    R: ContentRepository + ?Sized,
    P: VideoProvider + ?Sized,
{
    let record = fetch_record(repository, slug)?;
    let video = enrich_with_video(provider, record.vimeo.as_deref());
    let page = assemble(record, video, options);
    info!(
        has_video = page.video_embed_url.is_some(),
        has_description = page.description.is_some(),
        "Rendered film page"
    );
    Ok(page)
}

/// Renders the listing page, newest screening first.
///
/// Films without a date sort last; films without a slug are skipped since
/// they cannot be linked.
#[instrument(level = "info", skip(repository, options))]
pub fn render_film_index<R>(repository: &R, options: &RenderOptions) -> Result<FilmIndex, RenderError>
where
    R: ContentRepository + ?Sized,
{
    let mut films = repository.list_films()?;
    films.sort_by(|a, b| b.date.cmp(&a.date));

    let items = films
        .into_iter()
        .filter_map(|film| {
            let href = format!("/films/{}", film.slug()?);
            Some(FilmIndexItem {
                date_text: film.date.map(|date| short_date(date, &options.zone)),
                id: film.id,
                title: film.title,
                href,
            })
        })
        .collect();

    Ok(FilmIndex { items })
}

/// Display form of a category tag: first hyphen becomes a space, each word
/// capitalized.
pub fn category_label(tag: &str) -> String {
    tag.replacen('-', " ", 1)
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
