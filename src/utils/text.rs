// src/utils/text.rs

//! Text cleanup for table cells scraped from schedule pages.

use scraper::{ElementRef, Node};

/// Elements whose boundaries separate words in the rendered page.
const SOFT_BREAK_TAGS: &[&str] = &["div", "p", "br", "li"];

/// Collapse whitespace runs to single spaces and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with block boundaries kept as spaces,
/// NBSP folded into regular spaces and whitespace collapsed.
pub fn clean_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_whitespace(&raw.replace('\u{a0}', " "))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                    if SOFT_BREAK_TAGS.contains(&child_el.value().name()) {
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Turn "08:00-09:30" into "08:00\n09:30".
///
/// Input with fewer than two parts is returned with separators blanked.
pub fn format_time(s: &str) -> String {
    let s = s.replace(['-', '–'], " ");
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() >= 2 {
        format!("{}\n{}", parts[0], parts[1])
    } else {
        s
    }
}

/// Make sure every period in a teacher name is followed by one space.
pub fn format_name(s: &str) -> String {
    normalize_whitespace(&s.replace('.', ". "))
}
