mod common;

use common::fixtures::{sample_container, BOOK_CSS};
use epub_restyle::container::MEDIA_TYPE_CSS;
use epub_restyle::{
    normalize_container, Container, ErrorPhase, MemoryContainer, NormalizeOptions, RestyleError,
    StyleNormalizer,
};

#[test]
fn zero_policy_rewrites_stylesheets_and_documents() {
    let mut container = sample_container();
    let report = normalize_container(&mut container, &StyleNormalizer::default())
        .expect("normalize should succeed");

    assert!(report.modified());
    assert_eq!(report.stylesheets_rewritten, 1);
    assert_eq!(report.documents_rewritten, 1);
    assert_eq!(report.style_elements_rewritten, 1);
    assert_eq!(report.inline_styles_rewritten, 2);
    assert_eq!(report.page_templates_removed, 0);
    assert!(report.skipped.is_empty(), "skipped: {:?}", report.skipped);

    assert_eq!(
        container.text("OEBPS/style.css"),
        Some(
            "p {\n    margin: 0 !important;\n    text-indent: 0em !important;\n}\n\
             h2.chapter {\n    margin-top: 3em;\n    margin-bottom: 0 !important;\n}\n\
             blockquote {\n    margin: 0 2em;\n}"
        )
    );

    let chapter = container.text("OEBPS/ch1.xhtml").expect("chapter text");
    assert!(chapter.contains(
        r#"<h1 class="chapter" style="margin-top: 4em; margin-bottom: 0 !important">"#
    ));
    assert!(chapter.contains(r#"<p style="margin: 0 !important; text-indent: 0em !important">"#));
    assert!(chapter.contains(r#"<blockquote style="margin: 1em 3em">"#));
    assert!(chapter.contains(
        "<style type=\"text/css\">\np.intro {\n    margin-bottom: 0 !important;\n}\n</style>"
    ));
    assert!(chapter.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE html>"));
    assert!(chapter.contains("<p>Unstyled.</p>"));

    assert!(container.contains("OEBPS/page-template.xpgt"));
    assert_eq!(
        container.bytes("OEBPS/cover.jpg"),
        Some(&[0xff, 0xd8, 0xff, 0xe0][..])
    );
}

#[test]
fn restore_policy_only_touches_headers_in_markup() {
    let mut container = sample_container();
    let normalizer = StyleNormalizer::new(NormalizeOptions::restore());
    let report =
        normalize_container(&mut container, &normalizer).expect("normalize should succeed");

    assert!(report.modified());
    assert_eq!(report.inline_styles_rewritten, 1);

    assert_eq!(
        container.text("OEBPS/style.css"),
        Some(
            "p {\n    margin: 1em 0;\n    text-indent: 0em !important;\n}\n\
             h2.chapter {\n    margin-top: 1em;\n    margin-bottom: 1em;\n}\n\
             blockquote {\n    margin: 0 2em;\n}"
        )
    );

    let chapter = container.text("OEBPS/ch1.xhtml").expect("chapter text");
    assert!(chapter.contains(
        r#"<h1 class="chapter" style="margin-top: 1em; margin-bottom: 2em">"#
    ));
    assert!(chapter.contains(r#"<p style="margin: 1em 0; text-indent: -1em">"#));
    assert!(chapter.contains(r#"<blockquote style="margin: 1em 3em">"#));
}

#[test]
fn page_templates_are_dropped_on_request() {
    let mut container = sample_container();
    let normalizer = StyleNormalizer::new(NormalizeOptions {
        drop_page_templates: true,
        ..NormalizeOptions::zero()
    });
    let report =
        normalize_container(&mut container, &normalizer).expect("normalize should succeed");
    assert_eq!(report.page_templates_removed, 1);
    assert!(!container.contains("OEBPS/page-template.xpgt"));
    assert_eq!(container.len(), 3);
}

#[test]
fn second_run_over_normalized_container_changes_nothing() {
    let normalizer = StyleNormalizer::default();
    let mut container = sample_container();
    normalize_container(&mut container, &normalizer).expect("first run");
    let snapshot = container.clone();

    let report = normalize_container(&mut container, &normalizer).expect("second run");
    assert!(!report.modified(), "second run modified: {:?}", report);
    assert_eq!(container, snapshot);
}

#[test]
fn unparsable_document_is_skipped_and_left_intact() {
    let broken = "<html><body><p style=\"margin: 1em\">x</p><!-- unterminated";
    let mut container = MemoryContainer::new()
        .with_entry("style.css", MEDIA_TYPE_CSS, BOOK_CSS)
        .with_entry("broken.xhtml", "application/xhtml+xml", broken);
    let report = normalize_container(&mut container, &StyleNormalizer::default())
        .expect("entry errors should not abort");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "broken.xhtml");
    assert_eq!(report.skipped[0].code, "MARKUP_PARSE_ERROR");
    assert_eq!(container.text("broken.xhtml"), Some(broken));
    assert_eq!(report.stylesheets_rewritten, 1);
}

/// Container whose writes always fail, e.g. a read-only archive.
struct ReadOnly(MemoryContainer);

impl Container for ReadOnly {
    fn entries(&self) -> Vec<epub_restyle::ContainerEntry> {
        self.0.entries()
    }

    fn read_text(&mut self, name: &str) -> Result<String, RestyleError> {
        self.0.read_text(name)
    }

    fn replace_text(&mut self, name: &str, _text: &str) -> Result<(), RestyleError> {
        Err(read_only(name))
    }

    fn remove(&mut self, name: &str) -> Result<(), RestyleError> {
        Err(read_only(name))
    }
}

fn read_only(name: &str) -> RestyleError {
    RestyleError::new(
        ErrorPhase::Container,
        "CONTAINER_READ_ONLY",
        "container is read-only",
    )
    .with_path(name)
}

#[test]
fn container_write_failure_aborts_the_run() {
    let mut container = ReadOnly(sample_container());
    let err = normalize_container(&mut container, &StyleNormalizer::default())
        .expect_err("write failure should abort");
    assert_eq!(err.phase, ErrorPhase::Container);
    assert_eq!(err.path.as_deref(), Some("OEBPS/ch1.xhtml"));
}

#[test]
fn one_normalizer_serves_many_threads() {
    let normalizer = StyleNormalizer::default();
    let results: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| normalizer.normalize_stylesheet(BOOK_CSS)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread"))
            .collect()
    });
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}
