//! Engine facade: options plus the stylesheet and inline-style pipelines.
//!
//! ```rust
//! use epub_restyle::{NormalizeOptions, StyleNormalizer};
//!
//! let normalizer = StyleNormalizer::new(NormalizeOptions::default());
//! let css = normalizer.normalize_stylesheet("p { margin: 10px; padding: 5px; }");
//! assert_eq!(css, "p {\n    margin: 0 !important;\n    padding: 0 !important;\n}");
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::classify::{
    Classification, Classifier, DEFAULT_HEADER_FONT_SIZE_THRESHOLD, DEFAULT_HEADER_KEYWORDS,
    DEFAULT_QUOTE_KEYWORDS, RESTORE_EXTRA_HEADER_KEYWORDS,
};
use crate::css::{
    parse_stylesheet, serialize_inline, serialize_stylesheet, split_inline_declarations, Rule,
};
use crate::rewrite::{MarginPolicy, Rewriter, DEFAULT_RESTORE_MARGIN_TOP};

/// Byte limits enforced by the container and markup seams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleLimits {
    /// Maximum bytes for a stylesheet entry or `<style>` body.
    pub max_css_bytes: usize,
    /// Maximum bytes for a single inline `style="..."` attribute.
    pub max_inline_style_bytes: usize,
    /// Maximum bytes for a markup document entry.
    pub max_entry_bytes: usize,
}

impl Default for StyleLimits {
    fn default() -> Self {
        Self {
            max_css_bytes: 512 * 1024,
            max_inline_style_bytes: 16 * 1024,
            max_entry_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Normalizer configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizeOptions {
    /// Margin/padding rewrite strategy.
    pub policy: MarginPolicy,
    /// Top margin forced onto headers under [`MarginPolicy::Restore`].
    pub restore_target_margin_top: String,
    /// `font-size` in `em` at or above which a rule or element is a header.
    pub header_font_size_threshold: f64,
    /// Header tag (`h1`) and class (`.title`) keywords.
    pub header_keywords: Vec<String>,
    /// Quote tag and class keywords.
    pub quote_keywords: Vec<String>,
    /// Clamp `text-indent` to non-negative lengths.
    pub normalize_text_indent: bool,
    /// Remove Adobe page-template entries from containers.
    pub drop_page_templates: bool,
    /// Byte limits for the container and markup seams.
    pub limits: StyleLimits,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::zero()
    }
}

impl NormalizeOptions {
    /// Zero every margin and padding except header top margins.
    pub fn zero() -> Self {
        Self {
            policy: MarginPolicy::Zero,
            restore_target_margin_top: String::from(DEFAULT_RESTORE_MARGIN_TOP),
            header_font_size_threshold: DEFAULT_HEADER_FONT_SIZE_THRESHOLD,
            header_keywords: to_owned_keywords(DEFAULT_HEADER_KEYWORDS.iter()),
            quote_keywords: to_owned_keywords(DEFAULT_QUOTE_KEYWORDS.iter()),
            normalize_text_indent: true,
            drop_page_templates: false,
            limits: StyleLimits::default(),
        }
    }

    /// Restore a top margin on headers, with the extended header keyword set.
    pub fn restore() -> Self {
        Self {
            policy: MarginPolicy::Restore,
            header_keywords: to_owned_keywords(
                DEFAULT_HEADER_KEYWORDS
                    .iter()
                    .chain(RESTORE_EXTRA_HEADER_KEYWORDS.iter()),
            ),
            ..Self::zero()
        }
    }

    /// Options for a policy with that policy's default keywords.
    pub fn for_policy(policy: MarginPolicy) -> Self {
        match policy {
            MarginPolicy::Zero => Self::zero(),
            MarginPolicy::Restore => Self::restore(),
        }
    }
}

fn to_owned_keywords<'a>(keywords: impl Iterator<Item = &'a &'static str>) -> Vec<String> {
    keywords.map(|k| String::from(*k)).collect()
}

/// Stylesheet and inline-style normalizer.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads working on independent documents.
#[derive(Clone, Debug)]
pub struct StyleNormalizer {
    options: NormalizeOptions,
    classifier: Classifier,
    rewriter: Rewriter,
}

impl Default for StyleNormalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

impl StyleNormalizer {
    /// Create a normalizer with explicit options.
    pub fn new(options: NormalizeOptions) -> Self {
        let classifier = Classifier::new(
            options.quote_keywords.clone(),
            options.header_keywords.clone(),
            options.header_font_size_threshold,
        );
        let rewriter = Rewriter::new(
            options.policy,
            options.restore_target_margin_top.clone(),
            options.normalize_text_indent,
        );
        Self {
            options,
            classifier,
            rewriter,
        }
    }

    /// Options this normalizer was built with.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Rule/element classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Declaration rewriter.
    pub fn rewriter(&self) -> &Rewriter {
        &self.rewriter
    }

    /// Classify and rewrite one parsed rule.
    pub fn normalize_rule(&self, rule: &Rule) -> Rule {
        let class = self
            .classifier
            .classify_rule(&rule.selector, &rule.declarations);
        Rule {
            selector: rule.selector.clone(),
            declarations: self.rewriter.rewrite_declarations(&rule.declarations, class),
        }
    }

    /// Run the full pipeline over stylesheet text.
    ///
    /// Comments are dropped and formatting is normalized, so the output can
    /// differ from the input even when no declaration changed.
    pub fn normalize_stylesheet(&self, css: &str) -> String {
        let rules: Vec<Rule> = parse_stylesheet(css)
            .iter()
            .map(|rule| self.normalize_rule(rule))
            .collect();
        serialize_stylesheet(&rules)
    }

    /// Classify an element from its tag, class attribute and inline style.
    pub fn classify_element(
        &self,
        tag: &str,
        class_attr: Option<&str>,
        style: &str,
    ) -> Classification {
        let declarations = split_inline_declarations(style);
        self.classifier
            .classify_element(tag, class_attr, &declarations)
    }

    /// Rewrite an inline `style` attribute value.
    ///
    /// Returns `None` when the policy leaves this element alone (non-header
    /// elements under [`MarginPolicy::Restore`]).
    pub fn rewrite_inline_style(
        &self,
        tag: &str,
        class_attr: Option<&str>,
        style: &str,
    ) -> Option<String> {
        let declarations = split_inline_declarations(style);
        let class = self
            .classifier
            .classify_element(tag, class_attr, &declarations);
        if self.options.policy == MarginPolicy::Restore && class != Classification::Header {
            return None;
        }
        let rewritten = self.rewriter.rewrite_declarations(&declarations, class);
        Some(serialize_inline(&rewritten))
    }
}
