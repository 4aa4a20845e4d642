//! Standalone HTML page rendering for generated markdown

use chrono::Utc;
use pulldown_cmark::{html, Event, Options, Parser};

/// Escape text for use inside HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Convert markdown to an HTML fragment.
///
/// Raw HTML in the input is emitted as escaped text, never as markup.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

const STYLE: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: #333;
    max-width: 860px;
    margin: 0 auto;
    padding: 2rem;
}
pre {
    background: #f6f8fa;
    padding: 1rem;
    overflow-x: auto;
}
code {
    font-family: 'SF Mono', Consolas, monospace;
}
table {
    border-collapse: collapse;
}
th, td {
    border: 1px solid #ddd;
    padding: 0.4rem 0.8rem;
}
footer {
    margin-top: 3rem;
    color: #888;
    font-size: 0.85rem;
}
"#;

/// Wrap rendered markdown in a complete HTML document
pub fn render_html_page(title: &str, markdown: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <main>
{body}
    </main>
    <footer>
        <p>Generated by Leaflet on {generated}</p>
    </footer>
</body>
</html>
"#,
        title = escape_html(title),
        body = markdown_to_html(markdown),
        generated = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
