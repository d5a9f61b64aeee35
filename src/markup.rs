//! Markup seam: rewrite `<style>` bodies and `style` attributes in chapter
//! documents.
//!
//! The document is scanned with quick-xml and never re-serialized. Rewritten
//! `<style>` bodies and rewritten start tags are spliced into the original
//! text; every other byte is kept as written.

use std::borrow::Cow;
use std::ops::Range;

use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ErrorPhase, RestyleError};
use crate::normalize::StyleNormalizer;

/// How `<style>` bodies are encoded in a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkupFlavor {
    /// XHTML: style bodies may carry entity references or CDATA sections.
    #[default]
    Xhtml,
    /// HTML: style bodies are raw text.
    Html,
}

impl MarkupFlavor {
    /// Flavor for a manifest media type, if it is a markup type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "application/xhtml+xml" => Some(Self::Xhtml),
            "text/html" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Result of rewriting one markup document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupRewrite {
    /// Document text with all rewrites applied.
    pub text: String,
    /// Number of `<style>` elements whose body changed.
    pub style_elements: usize,
    /// Number of `style` attributes that changed.
    pub inline_styles: usize,
}

impl MarkupRewrite {
    /// Whether anything in the document changed.
    pub fn changed(&self) -> bool {
        self.style_elements > 0 || self.inline_styles > 0
    }
}

struct Splice {
    range: Range<usize>,
    replacement: String,
}

/// Rewrite every `<style>` body and `style` attribute in `markup`.
///
/// Fails on markup quick-xml cannot scan and on payloads over the configured
/// byte limits; the caller keeps the original document in that case.
pub fn rewrite_markup(
    normalizer: &StyleNormalizer,
    markup: &str,
    flavor: MarkupFlavor,
) -> Result<MarkupRewrite, RestyleError> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut splices: Vec<Splice> = Vec::with_capacity(8);
    let mut style_body_start: Option<usize> = None;
    let mut style_body_nested = false;
    let mut style_elements = 0usize;
    let mut inline_styles = 0usize;

    loop {
        let event_start = reader_offset(&reader);
        let event = reader.read_event().map_err(|err| {
            RestyleError::new(
                ErrorPhase::Markup,
                "MARKUP_PARSE_ERROR",
                format!("Markup parse error: {:?}", err),
            )
            .with_token_offset(event_start)
        })?;
        let event_end = reader_offset(&reader);
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let self_closing = markup[event_start..event_end].trim_end().ends_with("/>");
                let tag = decode_tag_name(&reader, e.name().as_ref(), event_start)?;
                // elements nested in a <style> body are left to the body check below
                if style_body_start.is_some() {
                    style_body_nested = true;
                    continue;
                }
                if let Some(replacement) =
                    rewrite_start_tag(normalizer, &reader, &e, &tag, self_closing, event_start)?
                {
                    log::trace!("rewrote inline style on <{}> at {}", tag, event_start);
                    splices.push(Splice {
                        range: event_start..event_end,
                        replacement,
                    });
                    inline_styles += 1;
                }
                if tag == "style" && !self_closing {
                    style_body_start = Some(event_end);
                }
            }
            Event::End(e) => {
                let tag = decode_tag_name(&reader, e.name().as_ref(), event_start)?;
                if tag != "style" {
                    continue;
                }
                let Some(body_start) = style_body_start.take() else {
                    continue;
                };
                if std::mem::take(&mut style_body_nested) {
                    log::warn!("Skipping <style> at {}: body contains elements", body_start);
                    continue;
                }
                let body = &markup[body_start..event_start];
                let limit = normalizer.options().limits.max_css_bytes;
                if body.len() > limit {
                    return Err(RestyleError::new(
                        ErrorPhase::Style,
                        "STYLE_CSS_TOO_LARGE",
                        format!(
                            "<style> body exceeds max_css_bytes ({} > {})",
                            body.len(),
                            limit
                        ),
                    )
                    .with_limit("max_css_bytes", body.len(), limit)
                    .with_source("<style> element")
                    .with_token_offset(body_start));
                }
                if let Some(replacement) = rewrite_style_body(normalizer, body, flavor) {
                    log::trace!("rewrote <style> body at {}", body_start);
                    splices.push(Splice {
                        range: body_start..event_start,
                        replacement,
                    });
                    style_elements += 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(MarkupRewrite {
        text: apply_splices(markup, &splices),
        style_elements,
        inline_styles,
    })
}

fn reader_offset(reader: &Reader<&[u8]>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

fn decode_tag_name(
    reader: &Reader<&[u8]>,
    raw: &[u8],
    offset: usize,
) -> Result<String, RestyleError> {
    let decoded = reader.decoder().decode(raw).map_err(|err| {
        RestyleError::new(
            ErrorPhase::Markup,
            "MARKUP_DECODE_ERROR",
            format!("Decode error: {:?}", err),
        )
        .with_source("tag name decode")
        .with_token_offset(offset)
    })?;
    let local_name = decoded.rsplit(':').next().unwrap_or(decoded.as_ref());
    Ok(local_name.to_ascii_lowercase())
}

/// Raw attribute as found in the source: key and still-escaped value.
struct RawAttr {
    key: String,
    value: String,
}

fn rewrite_start_tag(
    normalizer: &StyleNormalizer,
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    tag: &str,
    self_closing: bool,
    offset: usize,
) -> Result<Option<String>, RestyleError> {
    let mut attrs: Vec<RawAttr> = Vec::with_capacity(8);
    let mut style_index: Option<usize> = None;
    let mut class_attr: Option<String> = None;
    for attr in e.html_attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                log::warn!(
                    "Skipping <{}> at {}: unreadable attribute ({:?})",
                    tag,
                    offset,
                    err
                );
                return Ok(None);
            }
        };
        let (Ok(key), Ok(value)) = (
            reader.decoder().decode(attr.key.as_ref()),
            reader.decoder().decode(&attr.value),
        ) else {
            return Ok(None);
        };
        let lower_key = key.to_ascii_lowercase();
        if lower_key == "style" {
            style_index = Some(attrs.len());
        } else if lower_key == "class" {
            class_attr = Some(unescape_lossy(&value).into_owned());
        }
        attrs.push(RawAttr {
            key: key.into_owned(),
            value: value.into_owned(),
        });
    }
    let Some(style_index) = style_index else {
        return Ok(None);
    };

    let raw_style = attrs[style_index].value.as_str();
    let limit = normalizer.options().limits.max_inline_style_bytes;
    if raw_style.len() > limit {
        return Err(RestyleError::new(
            ErrorPhase::Style,
            "STYLE_INLINE_BYTES_LIMIT",
            format!(
                "Inline style exceeds max_inline_style_bytes ({} > {})",
                raw_style.len(),
                limit
            ),
        )
        .with_limit("max_inline_style_bytes", raw_style.len(), limit)
        .with_source(format!("inline style on <{}>", tag))
        .with_declaration(raw_style)
        .with_token_offset(offset));
    }
    let style = unescape_lossy(raw_style);
    let Some(rewritten) = normalizer.rewrite_inline_style(tag, class_attr.as_deref(), &style)
    else {
        return Ok(None);
    };
    if rewritten == style {
        return Ok(None);
    }

    let qname = e.name();
    let name = reader
        .decoder()
        .decode(qname.as_ref())
        .map_err(|err| {
            RestyleError::new(
                ErrorPhase::Markup,
                "MARKUP_DECODE_ERROR",
                format!("Decode error: {:?}", err),
            )
            .with_token_offset(offset)
        })?;
    let mut out = String::with_capacity(name.len() + rewritten.len() + 64);
    out.push('<');
    out.push_str(&name);
    for (idx, attr) in attrs.iter().enumerate() {
        out.push(' ');
        out.push_str(&attr.key);
        if idx == style_index {
            out.push_str("=\"");
            out.push_str(&escape(rewritten.as_str()));
            out.push('"');
        } else {
            let quote = if attr.value.contains('"') { '\'' } else { '"' };
            out.push('=');
            out.push(quote);
            out.push_str(&attr.value);
            out.push(quote);
        }
    }
    out.push_str(if self_closing { "/>" } else { ">" });
    Ok(Some(out))
}

fn rewrite_style_body(
    normalizer: &StyleNormalizer,
    body: &str,
    flavor: MarkupFlavor,
) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    // CDATA and legacy comment wrappers are kept; only their inside is rewritten
    for (open, close) in [("<![CDATA[", "]]>"), ("<!--", "-->")] {
        let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        else {
            continue;
        };
        if inner.contains(open) || inner.contains(close) {
            return None;
        }
        let css = normalizer.normalize_stylesheet(inner);
        return (css != inner.trim()).then(|| format!("\n{}\n{}\n{}\n", open, css, close));
    }
    // a wrapper mixed with bare CSS cannot be rewritten without changing what it hides
    if trimmed.contains("<!--") || trimmed.contains("<![CDATA[") {
        return None;
    }
    match flavor {
        MarkupFlavor::Html => {
            let css = normalizer.normalize_stylesheet(body);
            (css != trimmed).then(|| format!("\n{}\n", css))
        }
        MarkupFlavor::Xhtml => {
            let decoded = unescape_lossy(body);
            let css = normalizer.normalize_stylesheet(&decoded);
            (css != decoded.trim()).then(|| format!("\n{}\n", partial_escape(css.as_str())))
        }
    }
}

/// Unescape entity references, keeping the raw text when an unknown entity
/// (e.g. `&nbsp;` in XHTML) makes that impossible.
fn unescape_lossy(raw: &str) -> Cow<'_, str> {
    unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

fn apply_splices(markup: &str, splices: &[Splice]) -> String {
    if splices.is_empty() {
        return markup.to_string();
    }
    let extra: usize = splices.iter().map(|s| s.replacement.len()).sum();
    let mut out = String::with_capacity(markup.len() + extra);
    let mut cursor = 0usize;
    for splice in splices {
        if splice.range.start < cursor {
            continue;
        }
        out.push_str(&markup[cursor..splice.range.start]);
        out.push_str(&splice.replacement);
        cursor = splice.range.end;
    }
    out.push_str(&markup[cursor..]);
    out
}
