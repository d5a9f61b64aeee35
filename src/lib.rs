//! epub-restyle -- CSS-aware spacing normalization for EPUB content
//!
//! Rewrites `margin`, `padding` and `text-indent` declarations in EPUB
//! stylesheets, `<style>` elements and `style` attributes so books render
//! with consistent paragraph spacing. Headers and block quotes are detected
//! by keyword and treated specially.
//!
//! The stylesheet engine (`css`, `value`, `classify`, `rewrite`, `normalize`)
//! only needs `alloc`. The markup scanner and the container driver need
//! `std`.
//!
//! # Features
//!
//! - `std` (default) -- markup rewriting, container driver, `log` output
//! - `cli` -- the `epub-restyle` command-line tool

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod classify;
pub mod css;
pub mod error;
pub mod normalize;
pub mod rewrite;
pub mod value;

#[cfg(feature = "std")]
pub mod container;

#[cfg(feature = "std")]
pub mod driver;

#[cfg(feature = "std")]
pub mod markup;

// Re-export key types for convenience
pub use classify::{Classification, Classifier};
#[cfg(feature = "std")]
pub use container::{Container, ContainerEntry, MemoryContainer};
pub use css::{parse_stylesheet, serialize_inline, serialize_stylesheet, Rule, Token};
#[cfg(feature = "std")]
pub use driver::{normalize_container, NormalizeReport, SkippedEntry};
pub use error::{ErrorLimitContext, ErrorPhase, RestyleError, RestyleErrorContext};
#[cfg(feature = "std")]
pub use markup::{rewrite_markup, MarkupFlavor, MarkupRewrite};
pub use normalize::{NormalizeOptions, StyleLimits, StyleNormalizer};
pub use rewrite::{MarginPolicy, Rewriter};
pub use value::{CssLength, LengthUnit};
