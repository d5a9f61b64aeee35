//! Structured errors for the container and markup seams.
//!
//! The stylesheet engine itself is total: tokenizing, parsing, classifying
//! and rewriting never fail. Errors only come from the collaborators around
//! it (reading container entries, scanning markup) and from byte limits.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// Processing phase where an error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorPhase {
    /// Reading, replacing or removing container entries.
    Container,
    /// Scanning XHTML/HTML markup for `<style>` bodies and `style` attributes.
    Markup,
    /// Stylesheet or inline style payload checks.
    Style,
}

impl fmt::Display for ErrorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Container => "container",
            Self::Markup => "markup",
            Self::Style => "style",
        };
        f.write_str(name)
    }
}

/// Typed actual-vs-limit context for budget violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorLimitContext {
    /// Name of the limit that was exceeded (e.g. `max_css_bytes`).
    pub kind: Box<str>,
    /// Observed value.
    pub actual: usize,
    /// Configured limit.
    pub limit: usize,
}

impl ErrorLimitContext {
    /// Build a limit context.
    pub fn new(kind: &str, actual: usize, limit: usize) -> Self {
        Self {
            kind: kind.into(),
            actual,
            limit,
        }
    }
}

/// Extended optional context for restyle errors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestyleErrorContext {
    /// Where the payload came from (`<style>` element, inline style on `<p>`, ...).
    pub source: Option<Box<str>>,
    /// Offending declaration text, if any.
    pub declaration: Option<Box<str>>,
    /// Reader byte offset into the markup document.
    pub token_offset: Option<usize>,
}

/// Error raised by the container/markup seams of the normalizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestyleError {
    /// Processing phase where this error originated.
    pub phase: ErrorPhase,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional container entry path.
    pub path: Option<Box<str>>,
    /// Optional typed actual-vs-limit context.
    pub limit: Option<Box<ErrorLimitContext>>,
    /// Optional additional context.
    pub context: Option<Box<RestyleErrorContext>>,
}

impl RestyleError {
    /// Create an error.
    ///
    /// `Container` implementations report their own failures through this
    /// with [`ErrorPhase::Container`], which aborts a container run.
    pub fn new(phase: ErrorPhase, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            phase,
            code,
            message: message.into().into_boxed_str(),
            path: None,
            limit: None,
            context: None,
        }
    }

    /// Attach the container entry path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into().into_boxed_str());
        self
    }

    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn with_limit(mut self, kind: &'static str, actual: usize, limit: usize) -> Self {
        self.limit = Some(Box::new(ErrorLimitContext::new(kind, actual, limit)));
        self
    }

    /// Attach a short description of what was being processed.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        let ctx = self
            .context
            .get_or_insert_with(|| Box::new(RestyleErrorContext::default()));
        ctx.source = Some(source.into().into_boxed_str());
        self
    }

    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn with_declaration(mut self, declaration: impl Into<String>) -> Self {
        let ctx = self
            .context
            .get_or_insert_with(|| Box::new(RestyleErrorContext::default()));
        ctx.declaration = Some(declaration.into().into_boxed_str());
        self
    }

    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    pub(crate) fn with_token_offset(mut self, token_offset: usize) -> Self {
        let ctx = self
            .context
            .get_or_insert_with(|| Box::new(RestyleErrorContext::default()));
        ctx.token_offset = Some(token_offset);
        self
    }
}

impl fmt::Display for RestyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.phase, self.code, self.message)?;
        if let Some(path) = self.path.as_deref() {
            write!(f, " [path={}]", path)?;
        }
        if let Some(limit) = self.limit.as_deref() {
            write!(
                f,
                " [limit_kind={} actual={} limit={}]",
                limit.kind, limit.actual, limit.limit
            )?;
        }
        if let Some(ctx) = &self.context {
            if let Some(source) = ctx.source.as_deref() {
                write!(f, " [source={}]", source)?;
            }
            if let Some(declaration) = ctx.declaration.as_deref() {
                write!(f, " [declaration={}]", declaration)?;
            }
            if let Some(token_offset) = ctx.token_offset {
                write!(f, " [token_offset={}]", token_offset)?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RestyleError {}
