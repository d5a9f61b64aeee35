//! Rule and element classification (quote / header / ordinary).
//!
//! Matching is keyword containment on lower-cased text, not selector
//! matching. `.title` matches `.title-page` and `h1` matches `.th1`; that
//! over-breadth is accepted.

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::{CssLength, Declaration, LengthUnit};

/// Default quote keywords.
pub const DEFAULT_QUOTE_KEYWORDS: &[&str] = &["blockquote", ".blockquote", ".quote", ".epigraph"];

/// Default header keywords used by the zero policy.
pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    ".chapter-title",
    ".section-title",
    ".title",
    ".ch-title",
    ".ch-num",
];

/// Additional header keywords used by the restore policy.
pub const RESTORE_EXTRA_HEADER_KEYWORDS: &[&str] = &[
    ".h1", ".h2", ".h3", ".h4", ".h5", ".h6", ".chapter", ".section", ".heading", ".header",
];

/// Default `font-size` (in `em`) at or above which a rule counts as a header.
pub const DEFAULT_HEADER_FONT_SIZE_THRESHOLD: f64 = 1.15;

/// Policy class governing how spacing declarations are rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Quotations: spacing and indent declarations are left alone.
    Quote,
    /// Headings: top margin is kept (zero policy) or restored (restore policy).
    Header,
    /// Everything else.
    #[default]
    None,
}

impl Classification {
    /// Whether this classification is an exemption of any kind.
    pub fn is_exempt(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Keyword tables and thresholds used to classify rules and elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Classifier {
    quote_keywords: Vec<String>,
    header_keywords: Vec<String>,
    header_font_size_threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_QUOTE_KEYWORDS.iter().map(|k| String::from(*k)).collect(),
            DEFAULT_HEADER_KEYWORDS.iter().map(|k| String::from(*k)).collect(),
            DEFAULT_HEADER_FONT_SIZE_THRESHOLD,
        )
    }
}

impl Classifier {
    /// Build a classifier; keywords are lower-cased once here.
    pub fn new(
        quote_keywords: Vec<String>,
        header_keywords: Vec<String>,
        header_font_size_threshold: f64,
    ) -> Self {
        Self {
            quote_keywords: lowercase_all(quote_keywords),
            header_keywords: lowercase_all(header_keywords),
            header_font_size_threshold,
        }
    }

    /// Classify a stylesheet rule from its selector and declarations.
    pub fn classify_rule<S: AsRef<str>>(
        &self,
        selector: &str,
        declarations: &[S],
    ) -> Classification {
        let selector = selector.to_ascii_lowercase();
        if self.quote_keywords.iter().any(|k| selector.contains(k.as_str())) {
            return Classification::Quote;
        }
        if self.header_keywords.iter().any(|k| selector.contains(k.as_str())) {
            return Classification::Header;
        }
        self.classify_by_font_size(declarations)
    }

    /// Classify an element from its tag, `class` attribute and inline declarations.
    ///
    /// Keywords without a leading `.` are compared against the local tag name;
    /// `.`-prefixed keywords are searched for in the class attribute.
    pub fn classify_element<S: AsRef<str>>(
        &self,
        tag: &str,
        class_attr: Option<&str>,
        declarations: &[S],
    ) -> Classification {
        let tag = local_tag_name(tag).to_ascii_lowercase();
        let classes = class_attr.unwrap_or_default().to_ascii_lowercase();
        if element_matches(&self.quote_keywords, &tag, &classes) {
            return Classification::Quote;
        }
        if element_matches(&self.header_keywords, &tag, &classes) {
            return Classification::Header;
        }
        self.classify_by_font_size(declarations)
    }

    fn classify_by_font_size<S: AsRef<str>>(&self, declarations: &[S]) -> Classification {
        match em_font_size(declarations) {
            Some(size) if size >= self.header_font_size_threshold => Classification::Header,
            _ => Classification::None,
        }
    }
}

/// First `font-size` declared in `em`, if any.
pub fn em_font_size<S: AsRef<str>>(declarations: &[S]) -> Option<f64> {
    declarations
        .iter()
        .filter_map(|raw| Declaration::split(raw.as_ref()))
        .filter(|decl| decl.property.eq_ignore_ascii_case("font-size"))
        .map(|decl| CssLength::parse(decl.value_and_importance().0))
        .find(|len| len.unit == LengthUnit::Em)
        .map(|len| len.magnitude)
}

fn element_matches(keywords: &[String], tag: &str, classes: &str) -> bool {
    keywords.iter().any(|keyword| match keyword.strip_prefix('.') {
        Some(class) => !class.is_empty() && classes.contains(class),
        None => keyword == tag,
    })
}

fn local_tag_name(tag: &str) -> &str {
    let tag = tag.rsplit('}').next().unwrap_or(tag);
    tag.rsplit(':').next().unwrap_or(tag)
}

fn lowercase_all(keywords: Vec<String>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.trim().to_ascii_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
