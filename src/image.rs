//! Sanity image URLs
//!
//! Image assets are addressed by ids of the form
//! `image-<hash>-<width>x<height>-<format>`; the CDN serves them under
//! `https://cdn.sanity.io/images/<project>/<dataset>/<hash>-<width>x<height>.<format>`
//! and crops on the fly from `w`/`h` query parameters.

use crate::content::SanityImage;

/// Detail page image width in pixels
pub const DETAIL_IMAGE_WIDTH: u32 = 550;
/// Detail page image height in pixels
pub const DETAIL_IMAGE_HEIGHT: u32 = 310;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Builds CDN URLs for images stored in one project and dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Returns a URL for `image` cropped to `width` x `height`.
    ///
    /// Falls back to an already-resolved asset URL when the asset id cannot be
    /// parsed. Returns `None` when the image carries neither.
    pub fn url(&self, image: &SanityImage, width: u32, height: u32) -> Option<String> {
        if let Some(path) = image.asset_id().and_then(asset_path) {
            return Some(format!(
                "{}/{}/{}/{}?w={}&h={}",
                CDN_BASE, self.project_id, self.dataset, path, width, height
            ));
        }

        image
            .asset_url()
            .map(|url| {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}w={}&h={}", url, separator, width, height)
            })
    }
}

/// Turns `image-<hash>-<WxH>-<ext>` into `<hash>-<WxH>.<ext>`.
fn asset_path(asset_id: &str) -> Option<String> {
    let rest = asset_id.strip_prefix("image-")?;
    let (rest, format) = rest.rsplit_once('-')?;
    let (hash, dimensions) = rest.rsplit_once('-')?;

    let (w, h) = dimensions.split_once('x')?;
    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if hash.is_empty() || format.is_empty() || !numeric(w) || !numeric(h) {
        return None;
    }

    Some(format!("{}-{}.{}", hash, dimensions, format))
}
