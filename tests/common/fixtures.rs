#![allow(dead_code)]

use epub_restyle::container::{MEDIA_TYPE_CSS, MEDIA_TYPE_PAGE_TEMPLATE, MEDIA_TYPE_XHTML};
use epub_restyle::MemoryContainer;

/// Stylesheets of the kind found in commercial and Gutenberg EPUBs.
pub const STYLESHEET_CORPUS: &[&str] = &[
    "",
    "p { margin: 0; }",
    "p{margin:1em 0 1em 0;text-indent:1.5em}",
    "body { margin: 5%; padding: 0 }\np.first { text-indent: 0 }",
    "h1, h2 { margin-top: 2em; margin-bottom: 1em; font-size: 1.6em }",
    "h3 { margin: 3em 0 1em; }\n.chapter-title { margin: 2em auto; text-align: center }",
    "blockquote { margin: 1em 2em; text-indent: -1em }\n.epigraph { padding-left: 3em }",
    ".calibre1 { font-size: 1.25em; margin-bottom: 0.5em }",
    ".calibre2 { font-size: 0.8em; margin-left: 1em; text-indent: -0.5em !important }",
    "/* generated */ p.noindent { text-indent: 0; margin: 0 }",
    "a[href=\"x;y\"] { padding: 1px } p { margin: 2px }",
    "li:before { content: \"{;}\"; margin-right: 4px }",
    "@import url(base.css);\n@charset \"utf-8\";\np { margin: 1em }",
    "@media print { p { margin: 1cm } }",
    "p { text-indent: calc(1em + 2px); margin: var(--gap) }",
    "p { margin: 1em 2em 3em 4em 5em; }",
    "div.title-page { MARGIN-TOP: 10%; Padding: 3px }",
    "p { margin: }",
    "p { font-family: 'Georgia'; margin: 0 0 0 0 !important; }",
];

pub const CHAPTER_XHTML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title>Chapter 1</title>
<link rel="stylesheet" type="text/css" href="style.css"/>
<style type="text/css">
p.intro { margin-bottom: 2em; }
</style>
</head>
<body>
<h1 class="chapter" style="margin-top: 4em; margin-bottom: 2em">Chapter 1</h1>
<p style="margin: 1em 0; text-indent: -1em">It was a dark and stormy night.</p>
<blockquote style="margin: 1em 3em">Quoted.</blockquote>
<p>Unstyled.</p>
</body>
</html>
"#;

pub const BOOK_CSS: &str = "p { margin: 1em 0; text-indent: -2em; }
h2.chapter { margin-top: 3em; margin-bottom: 1em; }
blockquote { margin: 0 2em; }";

pub fn sample_container() -> MemoryContainer {
    MemoryContainer::new()
        .with_entry("OEBPS/style.css", MEDIA_TYPE_CSS, BOOK_CSS)
        .with_entry("OEBPS/ch1.xhtml", MEDIA_TYPE_XHTML, CHAPTER_XHTML)
        .with_entry("OEBPS/page-template.xpgt", MEDIA_TYPE_PAGE_TEMPLATE, "<template/>")
        .with_entry("OEBPS/cover.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
}
