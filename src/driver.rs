//! Apply the normalizer to every stylesheet and content document of a
//! container.
//!
//! Container access failures abort the run; the caller is expected to throw
//! away its working copy. Problems confined to one entry (oversized payload,
//! unscannable markup) are logged, the entry keeps its original content, and
//! the run continues.

use crate::container::{Container, ContainerEntry, MEDIA_TYPE_CSS, MEDIA_TYPE_PAGE_TEMPLATE};
use crate::error::{ErrorPhase, RestyleError};
use crate::markup::{rewrite_markup, MarkupFlavor};
use crate::normalize::StyleNormalizer;

/// Entry left untouched because of an entry-level error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Entry path.
    pub name: String,
    /// Error code explaining the skip.
    pub code: &'static str,
}

/// Outcome of normalizing one container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Stylesheet entries whose text changed.
    pub stylesheets_rewritten: usize,
    /// Markup entries whose text changed.
    pub documents_rewritten: usize,
    /// `<style>` elements rewritten across all markup entries.
    pub style_elements_rewritten: usize,
    /// `style` attributes rewritten across all markup entries.
    pub inline_styles_rewritten: usize,
    /// Adobe page-template entries removed.
    pub page_templates_removed: usize,
    /// Entries skipped because of entry-level errors.
    pub skipped: Vec<SkippedEntry>,
}

impl NormalizeReport {
    /// Whether the container was modified at all.
    ///
    /// When this is `false` the caller should discard its copy instead of
    /// writing out an identical package.
    pub fn modified(&self) -> bool {
        self.stylesheets_rewritten > 0
            || self.documents_rewritten > 0
            || self.page_templates_removed > 0
    }
}

/// Normalize every stylesheet and markup entry of `container` in place.
pub fn normalize_container<C: Container + ?Sized>(
    container: &mut C,
    normalizer: &StyleNormalizer,
) -> Result<NormalizeReport, RestyleError> {
    let mut report = NormalizeReport::default();
    for entry in container.entries() {
        let media_type = entry.media_type.trim().to_ascii_lowercase();
        if media_type == MEDIA_TYPE_PAGE_TEMPLATE {
            if normalizer.options().drop_page_templates {
                container.remove(&entry.name)?;
                log::debug!("removed page template {}", entry.name);
                report.page_templates_removed += 1;
            }
            continue;
        }
        let outcome = if media_type == MEDIA_TYPE_CSS {
            normalize_stylesheet_entry(container, normalizer, &entry, &mut report)
        } else if let Some(flavor) = MarkupFlavor::from_media_type(&media_type) {
            normalize_markup_entry(container, normalizer, &entry, flavor, &mut report)
        } else {
            Ok(())
        };
        match outcome {
            Ok(()) => {}
            Err(err) if err.phase == ErrorPhase::Container => return Err(err),
            Err(err) => {
                log::warn!("Skipping {}: {}", entry.name, err);
                report.skipped.push(SkippedEntry {
                    name: entry.name.clone(),
                    code: err.code,
                });
            }
        }
    }
    log::debug!(
        "normalized container: {} stylesheets, {} documents, {} templates removed, {} skipped",
        report.stylesheets_rewritten,
        report.documents_rewritten,
        report.page_templates_removed,
        report.skipped.len()
    );
    Ok(report)
}

fn normalize_stylesheet_entry<C: Container + ?Sized>(
    container: &mut C,
    normalizer: &StyleNormalizer,
    entry: &ContainerEntry,
    report: &mut NormalizeReport,
) -> Result<(), RestyleError> {
    let css = container.read_text(&entry.name)?;
    let limit = normalizer.options().limits.max_css_bytes;
    if css.len() > limit {
        return Err(RestyleError::new(
            ErrorPhase::Style,
            "STYLE_CSS_TOO_LARGE",
            format!("Stylesheet exceeds max_css_bytes ({} > {})", css.len(), limit),
        )
        .with_limit("max_css_bytes", css.len(), limit)
        .with_path(entry.name.as_str())
        .with_source("stylesheet entry"));
    }
    let normalized = normalizer.normalize_stylesheet(&css);
    if normalized != css {
        container.replace_text(&entry.name, &normalized)?;
        log::debug!("rewrote stylesheet {}", entry.name);
        report.stylesheets_rewritten += 1;
    }
    Ok(())
}

fn normalize_markup_entry<C: Container + ?Sized>(
    container: &mut C,
    normalizer: &StyleNormalizer,
    entry: &ContainerEntry,
    flavor: MarkupFlavor,
    report: &mut NormalizeReport,
) -> Result<(), RestyleError> {
    let markup = container.read_text(&entry.name)?;
    let limit = normalizer.options().limits.max_entry_bytes;
    if markup.len() > limit {
        return Err(RestyleError::new(
            ErrorPhase::Markup,
            "MARKUP_ENTRY_TOO_LARGE",
            format!("Document exceeds max_entry_bytes ({} > {})", markup.len(), limit),
        )
        .with_limit("max_entry_bytes", markup.len(), limit)
        .with_path(entry.name.as_str()));
    }
    let rewrite = rewrite_markup(normalizer, &markup, flavor)
        .map_err(|err| err.with_path(entry.name.as_str()))?;
    if rewrite.changed() {
        container.replace_text(&entry.name, &rewrite.text)?;
        log::debug!(
            "rewrote {} ({} style elements, {} inline styles)",
            entry.name,
            rewrite.style_elements,
            rewrite.inline_styles
        );
        report.documents_rewritten += 1;
        report.style_elements_rewritten += rewrite.style_elements;
        report.inline_styles_rewritten += rewrite.inline_styles;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{MemoryContainer, MEDIA_TYPE_XHTML};
    use crate::normalize::{NormalizeOptions, StyleLimits};

    #[test]
    fn unmodified_container_reports_no_change() {
        let mut container = MemoryContainer::new()
            .with_entry("style.css", MEDIA_TYPE_CSS, "")
            .with_entry("cover.jpg", "image/jpeg", vec![0xff, 0xd8]);
        let report = normalize_container(&mut container, &StyleNormalizer::default())
            .expect("normalize should succeed");
        assert!(!report.modified());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn page_templates_are_only_removed_when_requested() {
        let build = || {
            MemoryContainer::new().with_entry(
                "page-template.xpgt",
                MEDIA_TYPE_PAGE_TEMPLATE,
                "<template/>",
            )
        };
        let mut kept = build();
        let report = normalize_container(&mut kept, &StyleNormalizer::default())
            .expect("normalize should succeed");
        assert!(!report.modified());
        assert!(kept.contains("page-template.xpgt"));

        let mut dropped = build();
        let normalizer = StyleNormalizer::new(NormalizeOptions {
            drop_page_templates: true,
            ..NormalizeOptions::zero()
        });
        let report =
            normalize_container(&mut dropped, &normalizer).expect("normalize should succeed");
        assert!(report.modified());
        assert_eq!(report.page_templates_removed, 1);
        assert!(dropped.is_empty());
    }

    #[test]
    fn oversized_stylesheet_is_skipped_not_fatal() {
        let mut container = MemoryContainer::new()
            .with_entry("big.css", MEDIA_TYPE_CSS, "p { margin: 1em }")
            .with_entry(
                "ch1.xhtml",
                MEDIA_TYPE_XHTML,
                r#"<p style="margin: 1em">x</p>"#,
            );
        let normalizer = StyleNormalizer::new(NormalizeOptions {
            limits: StyleLimits {
                max_css_bytes: 4,
                ..StyleLimits::default()
            },
            ..NormalizeOptions::zero()
        });
        let report =
            normalize_container(&mut container, &normalizer).expect("normalize should succeed");
        assert_eq!(
            report.skipped,
            vec![SkippedEntry {
                name: "big.css".to_string(),
                code: "STYLE_CSS_TOO_LARGE",
            }]
        );
        assert_eq!(container.text("big.css"), Some("p { margin: 1em }"));
        assert_eq!(report.documents_rewritten, 1);
        assert!(report.modified());
    }

    #[test]
    fn undecodable_entry_aborts_the_run() {
        let mut container =
            MemoryContainer::new().with_entry("bad.css", MEDIA_TYPE_CSS, vec![0xc3, 0x28]);
        let err = normalize_container(&mut container, &StyleNormalizer::default())
            .expect_err("decode failure should abort");
        assert_eq!(err.code, "CONTAINER_DECODE_ERROR");
    }
}
