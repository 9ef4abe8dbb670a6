//! Plain-text output for the terminal

use biolink_core::{ContentNode, NodeKind, PageSummary, Testimonial, VisitorView};

pub fn page_table(pages: &[PageSummary]) -> String {
    if pages.is_empty() {
        return "No pages yet. Create one with `biolink pages create <slug> <name>`.\n".to_string();
    }
    let mut out = format!("{:<16} {:<24} {:<24} {:>5}\n", "ID", "SLUG", "NAME", "ITEMS");
    for page in pages {
        out.push_str(&format!(
            "{:<16} {:<24} {:<24} {:>5}\n",
            page.id, page.slug, page.display_name, page.item_count
        ));
    }
    out
}

/// Visitor view as an indented outline
pub fn outline(view: &VisitorView) -> String {
    let mut out = format!("{}\n", view.display_name);
    if !view.headline.is_empty() {
        out.push_str(&format!("  {}\n", view.headline));
    }
    out.push('\n');
    if view.items.is_empty() {
        out.push_str("  (no content)\n");
    }
    for node in &view.items {
        write_node(&mut out, node, 1);
    }
    out.push_str(&format!("\n  {}\n", view.consultation_text));
    if let Some(link) = &view.whatsapp_link {
        out.push_str(&format!("  {}\n", link));
    }
    out
}

fn write_node(out: &mut String, node: &ContentNode, depth: usize) {
    let indent = "  ".repeat(depth);
    match node.kind {
        NodeKind::Link => out.push_str(&format!("{}-> {}  {}\n", indent, node.title, node.url)),
        NodeKind::Header => out.push_str(&format!("{}## {}\n", indent, node.title)),
        NodeKind::TextBlock => {
            out.push_str(&format!("{}{}: {}\n", indent, node.title, node.description.as_deref().unwrap_or("")))
        }
        NodeKind::Folder => {
            out.push_str(&format!("{}[+] {}\n", indent, node.title));
            if node.children().is_empty() {
                out.push_str(&format!("{}  (empty folder)\n", indent));
            }
            for child in node.children() {
                write_node(out, child, depth + 1);
            }
        }
    }
}

pub fn testimonials(notes: &[Testimonial]) -> String {
    if notes.is_empty() {
        return "No testimonials.\n".to_string();
    }
    let mut out = String::new();
    for note in notes {
        out.push_str(&format!(
            "{}  {} (before opening \"{}\")\n    {}\n",
            note.timestamp.format("%Y-%m-%d %H:%M"),
            note.visitor_name,
            note.target_link_title,
            note.content
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use biolink_core::{Page, PageDefaults};
    use chrono::Utc;

    #[test]
    fn test_outline_nests_folders() {
        let now = Utc::now();
        let mut page = Page::new("p", "trip", "Trip", &PageDefaults::default(), now);
        page.links = vec![ContentNode::new("f", "Day 1", NodeKind::Folder).with_children(vec![
            ContentNode::new("l", "Photo", NodeKind::Link).with_url("https://x.io"),
        ])];

        let text = outline(&VisitorView::of(&page, now));
        assert!(text.contains("  [+] Day 1\n    -> Photo  https://x.io\n"));
    }

    #[test]
    fn test_empty_listings() {
        assert!(page_table(&[]).contains("No pages yet"));
        assert_eq!(testimonials(&[]), "No testimonials.\n");
    }
}
