//! Normalize margins, padding and indents in loose EPUB content files.
//!
//! Usage:
//!   epub-restyle [OPTIONS] FILE...
//!
//! `.css` files go through the stylesheet pipeline, `.xhtml`, `.html` and
//! `.htm` files through the markup pipeline. Without `--in-place` the result
//! is written to stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use epub_restyle::container::{MEDIA_TYPE_CSS, MEDIA_TYPE_HTML, MEDIA_TYPE_XHTML};
use epub_restyle::{
    normalize_container, MarginPolicy, MemoryContainer, NormalizeOptions, StyleNormalizer,
};

fn usage() {
    eprintln!("Usage: epub-restyle [OPTIONS] FILE...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --policy <zero|restore>  Margin policy (default: zero)");
    eprintln!("  --margin-top <VALUE>     Header top margin for the restore policy (default: 1em)");
    eprintln!("  --no-text-indent         Leave text-indent declarations alone");
    eprintln!("  --in-place               Write results back instead of printing them");
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "css" => Some(MEDIA_TYPE_CSS),
        "xhtml" => Some(MEDIA_TYPE_XHTML),
        "html" | "htm" => Some(MEDIA_TYPE_HTML),
        _ => None,
    }
}

/// Normalize one file; returns whether its content changed.
fn restyle_file(
    path: &Path,
    normalizer: &StyleNormalizer,
    in_place: bool,
) -> Result<bool, String> {
    let media_type =
        media_type_for(path).ok_or_else(|| "unsupported file extension".to_string())?;
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    let name = path.to_string_lossy().into_owned();
    let mut container = MemoryContainer::new().with_entry(name.as_str(), media_type, data);

    let report = normalize_container(&mut container, normalizer).map_err(|e| e.to_string())?;
    if let Some(skipped) = report.skipped.first() {
        return Err(format!("skipped ({})", skipped.code));
    }
    let bytes = container
        .bytes(&name)
        .ok_or_else(|| "entry vanished".to_string())?;

    if in_place {
        if report.modified() {
            std::fs::write(path, bytes).map_err(|e| e.to_string())?;
        }
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes).map_err(|e| e.to_string())?;
        stdout.flush().map_err(|e| e.to_string())?;
    }
    Ok(report.modified())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut policy = MarginPolicy::Zero;
    let mut margin_top: Option<String> = None;
    let mut text_indent = true;
    let mut in_place = false;
    let mut files: Vec<PathBuf> = Vec::with_capacity(8);
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--policy" => {
                i += 1;
                policy = args
                    .get(i)
                    .and_then(|name| MarginPolicy::from_name(name))
                    .unwrap_or_else(|| {
                        eprintln!("Unknown policy: {}", args.get(i).map_or("", String::as_str));
                        usage();
                        std::process::exit(1);
                    });
            }
            "--margin-top" => {
                i += 1;
                margin_top = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--margin-top expects a value");
                    usage();
                    std::process::exit(1);
                }));
            }
            "--no-text-indent" => {
                text_indent = false;
            }
            "--in-place" => {
                in_place = true;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                files.push(PathBuf::from(other));
            }
        }
        i += 1;
    }

    if files.is_empty() {
        usage();
        std::process::exit(1);
    }

    let mut options = NormalizeOptions::for_policy(policy);
    if let Some(margin_top) = margin_top {
        options.restore_target_margin_top = margin_top;
    }
    options.normalize_text_indent = text_indent;
    let normalizer = StyleNormalizer::new(options);

    eprintln!(
        "epub-restyle: policy={}, files={}{}",
        policy.name(),
        files.len(),
        if in_place { " (in place)" } else { "" }
    );

    let mut any_failed = false;
    for file in &files {
        match restyle_file(file, &normalizer, in_place) {
            Ok(true) => eprintln!("  {}: modified", file.display()),
            Ok(false) => eprintln!("  {}: unchanged", file.display()),
            Err(e) => {
                eprintln!("  {}: FAILED: {}", file.display(), e);
                any_failed = true;
            }
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}
