//! Server-rendered visitor pages

use biolink_core::{ContentNode, NodeKind, VisitorView};

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #0f172a; color: #1e293b; }
.hero { background: #111827; color: #fff; text-align: center; padding: 2rem 1.5rem 3rem; }
.hero h1 { text-transform: uppercase; letter-spacing: .08em; margin: 0 0 .5rem; }
main { background: #f8fafc; border-radius: 2rem 2rem 0 0; margin-top: -1.5rem; padding: 2rem 1.5rem 5rem; }
.items { max-width: 28rem; margin: 0 auto 3rem; }
.hero-image img { width: 100%; border-radius: 1.5rem; }
.link button { width: 100%; background: #1e293b; color: #fff; border: 0; border-radius: .75rem; padding: 1rem; font-weight: 600; text-align: left; }
.link details { font-size: .8rem; margin: .25rem 0 .75rem; }
.link input, .link textarea { width: 100%; margin: .25rem 0; }
details.folder > summary { background: #111827; color: #fff; border-radius: .75rem; padding: 1rem; font-weight: 700; cursor: pointer; }
details.folder > .children { margin: .5rem 0 0 1rem; padding-left: 1rem; border-left: 2px solid #e5e7eb; }
.section-header { text-align: center; margin: 2rem 0 1rem; }
.empty { color: #9ca3af; font-style: italic; font-size: .8rem; }
.cta { background: #eff6ff; border-radius: 1rem; padding: 1.5rem; text-align: center; max-width: 28rem; margin: 0 auto; }
.cta a { display: inline-block; background: #111827; color: #fff; padding: .75rem 2rem; border-radius: 999px; text-decoration: none; font-weight: 700; }
"#;

/// An http(s) URL made safe to sit inside CSS `url('...')`
fn css_url(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("https://") || lower.starts_with("http://")) {
        return None;
    }
    Some(
        url.chars()
            .filter(|c| !matches!(c, '\'' | '"' | '(' | ')' | '\\' | '<' | '>') && !c.is_control())
            .collect(),
    )
}

/// Wrap body HTML in the page shell
pub fn wrap_page(title: &str, background_url: Option<&str>, content: &str) -> String {
    let background = background_url
        .and_then(css_url)
        .map(|url| format!(r#" style="background-image: url('{}')""#, html_escape(&url)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>{}</style>
</head>
<body{}>
{}
</body>
</html>"#,
        html_escape(title),
        STYLE,
        background,
        content
    )
}

/// Full visitor page for `view`
pub fn render_page(view: &VisitorView) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<header class=\"hero\"><h1>{}</h1><h2>{}</h2></header>\n<main>\n",
        html_escape(&view.display_name),
        html_escape(&view.headline)
    ));

    if let Some(image) = &view.hero_image {
        html.push_str(&format!(
            "<div class=\"hero-image\"><img src=\"{}\" alt=\"Hero\"></div>\n",
            html_escape(image)
        ));
    }
    if let Some(text) = &view.hero_text {
        html.push_str(&format!("<h3 class=\"hero-text\">{}</h3>\n", html_escape(text)));
    }

    html.push_str("<div class=\"items\">\n");
    if view.items.is_empty() {
        html.push_str("<p class=\"empty\">No content added yet.</p>\n");
    }
    for node in &view.items {
        render_node(&mut html, &view.slug, node);
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"cta\"><p>{}</p>",
        html_escape(&view.consultation_text)
    ));
    if let Some(link) = &view.whatsapp_link {
        html.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Contact us</a>",
            html_escape(link)
        ));
    }
    html.push_str("</div>\n</main>");

    wrap_page(&view.display_name, view.background_url.as_deref(), &html)
}

fn render_node(html: &mut String, slug: &str, node: &ContentNode) {
    let title = html_escape(&node.title);
    match node.kind {
        NodeKind::Header => {
            html.push_str(&format!("<h3 class=\"section-header\">{}</h3>\n", title));
        }
        NodeKind::TextBlock => {
            html.push_str(&format!(
                "<div class=\"text-block\"><h3>{}</h3><p>{}</p></div>\n",
                title,
                html_escape(node.description.as_deref().unwrap_or(""))
            ));
        }
        NodeKind::Folder => {
            html.push_str(&format!(
                "<details class=\"folder\"><summary>{}</summary><div class=\"children\">\n",
                title
            ));
            if node.children().is_empty() {
                html.push_str("<p class=\"empty\">Empty folder</p>\n");
            }
            for child in node.children() {
                render_node(html, slug, child);
            }
            html.push_str("</div></details>\n");
        }
        NodeKind::Link => {
            html.push_str(&format!(
                r#"<form class="link" method="post" action="/p/{}/go/{}">
<button type="submit">{}</button>
<details><summary>Leave a note first</summary>
<input name="visitorName" placeholder="Your name">
<textarea name="content" placeholder="Your message"></textarea>
</details>
</form>
"#,
                html_escape(slug),
                html_escape(&node.id),
                title
            ));
        }
    }
}

/// Shown for unknown slugs
pub fn not_found_page(slug: &str) -> String {
    wrap_page(
        "Page not found",
        None,
        &format!(
            "<main><div class=\"items\"><h1>Page not found</h1><p>Nothing lives at /p/{}.</p></div></main>",
            html_escape(slug)
        ),
    )
}
