//! Declaration-level value rewriting.
//!
//! Spacing declarations (`margin*`, `padding*`) follow the configured
//! [`MarginPolicy`]; `text-indent` is clamped to a non-negative length.
//! Every rewrite is idempotent: feeding the output back in yields the same
//! output.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::classify::Classification;
use crate::value::{format_declaration, CssLength, Declaration, MarginSides};

const SPACING_PROPERTIES: &[&str] = &[
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
];

/// Default top margin forced onto headers by [`MarginPolicy::Restore`].
pub const DEFAULT_RESTORE_MARGIN_TOP: &str = "1em";

/// Strategy applied to margin and padding declarations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarginPolicy {
    /// Zero every margin/padding with `!important`, keeping header top margins.
    #[default]
    Zero,
    /// Leave ordinary rules alone and force a top margin onto headers.
    Restore,
}

impl MarginPolicy {
    /// Parse a policy name (`zero` or `restore`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "zero" => Some(Self::Zero),
            "restore" => Some(Self::Restore),
            _ => None,
        }
    }

    /// Stable policy name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Restore => "restore",
        }
    }
}

/// Rewrites declarations according to a policy and a classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rewriter {
    policy: MarginPolicy,
    target_margin_top: String,
    normalize_text_indent: bool,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(MarginPolicy::Zero, DEFAULT_RESTORE_MARGIN_TOP, true)
    }
}

impl Rewriter {
    /// Create a rewriter.
    pub fn new(
        policy: MarginPolicy,
        target_margin_top: impl Into<String>,
        normalize_text_indent: bool,
    ) -> Self {
        Self {
            policy,
            target_margin_top: target_margin_top.into(),
            normalize_text_indent,
        }
    }

    /// Active margin policy.
    pub fn policy(&self) -> MarginPolicy {
        self.policy
    }

    /// Rewrite one raw declaration.
    ///
    /// Declarations without a `:` come back unchanged. Everything else is at
    /// least whitespace-normalized to `property: value`.
    pub fn rewrite_declaration(&self, raw: &str, class: Classification) -> String {
        let Some(decl) = Declaration::split(raw) else {
            return raw.to_string();
        };
        let property = decl.property_lower();
        if SPACING_PROPERTIES.contains(&property.as_str()) {
            return self.rewrite_spacing(decl, &property, class);
        }
        if property == "text-indent" && self.normalize_text_indent {
            return rewrite_text_indent(decl, class);
        }
        decl.to_string()
    }

    /// Rewrite every declaration of a rule or inline style.
    ///
    /// Under [`MarginPolicy::Restore`] a header without any `margin-top` or
    /// `margin` declaration gets a synthesized `margin-top`.
    pub fn rewrite_declarations<S: AsRef<str>>(
        &self,
        declarations: &[S],
        class: Classification,
    ) -> Vec<String> {
        let mut out: Vec<String> = declarations
            .iter()
            .map(|raw| self.rewrite_declaration(raw.as_ref(), class))
            .collect();
        if self.policy == MarginPolicy::Restore
            && class == Classification::Header
            && !declarations.iter().any(|raw| declares_top_margin(raw.as_ref()))
        {
            out.push(format_declaration(
                "margin-top",
                &self.target_margin_top,
                false,
            ));
        }
        out
    }

    fn rewrite_spacing(
        &self,
        decl: Declaration<'_>,
        property: &str,
        class: Classification,
    ) -> String {
        if class == Classification::Quote {
            return decl.to_string();
        }
        match self.policy {
            MarginPolicy::Zero => {
                if class == Classification::Header && is_top_margin(property) {
                    decl.to_string()
                } else {
                    format_declaration(decl.property, "0", true)
                }
            }
            MarginPolicy::Restore => {
                if class != Classification::Header {
                    return decl.to_string();
                }
                match property {
                    "margin-top" => {
                        format_declaration(decl.property, &self.target_margin_top, false)
                    }
                    "margin" => {
                        let (value, important) = decl.value_and_importance();
                        let mut sides = MarginSides::expand(value);
                        sides.top = self.target_margin_top.clone();
                        format_declaration(decl.property, &sides.to_shorthand(), important)
                    }
                    _ => decl.to_string(),
                }
            }
        }
    }
}

fn rewrite_text_indent(decl: Declaration<'_>, class: Classification) -> String {
    if class == Classification::Quote {
        return decl.to_string();
    }
    let (value, _) = decl.value_and_importance();
    let lower = value.to_ascii_lowercase();
    if lower.contains("calc(") || lower.contains("var(") {
        return decl.to_string();
    }
    let length = CssLength::parse(value).clamp_non_negative();
    format_declaration(decl.property, &length.to_string(), true)
}

fn is_top_margin(property: &str) -> bool {
    matches!(property, "margin-top" | "margin")
}

fn declares_top_margin(raw: &str) -> bool {
    Declaration::split(raw).is_some_and(|decl| is_top_margin(&decl.property_lower()))
}
