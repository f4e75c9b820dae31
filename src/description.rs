//! Description reconciliation
//!
//! A film can carry two descriptions: the plain text stored with the video on
//! the provider, and the rich text authored in the CMS. The provider copy is
//! treated as the more current one and always wins when it has content.

use crate::rich_text::RichTextDocument;

/// Normalizes a provider description into rich text.
///
/// Absent and empty strings become `None`; anything else is wrapped into a
/// single block with a single span, text untouched.
pub fn normalize_provider_description(text: Option<&str>) -> Option<RichTextDocument> {
    match text {
        Some(text) if !text.is_empty() => Some(RichTextDocument::from_plain_text(text)),
        _ => None,
    }
}

/// Selects the description to present.
///
/// Precedence: non-empty provider description, then non-empty CMS details,
/// otherwise nothing.
pub fn reconcile(
    provider_description: Option<RichTextDocument>,
    cms_details: Option<RichTextDocument>,
) -> Option<RichTextDocument> {
    match provider_description {
        Some(doc) if !doc.is_empty() => Some(doc),
        _ => cms_details.filter(|doc| !doc.is_empty()),
    }
}
