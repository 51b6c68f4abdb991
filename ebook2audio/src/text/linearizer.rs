//! Flattening an XHTML body into text with pause markers.

use super::PAUSE_SENTINEL;
use super::verbalizer::convert_roman_numerals;
use crate::lang::Language;
use scraper::{ElementRef, Html, Node};

/// Structural roles whose documents are not read aloud.
const EXCLUDED_ROLES: &[&str] = &[
    "frontmatter",
    "backmatter",
    "toc",
    "titlepage",
    "colophon",
    "acknowledgments",
    "acknowledgements",
    "dedication",
    "glossary",
    "index",
    "appendix",
    "bibliography",
    "copyright-page",
    "landmarks",
];

/// Containers followed by a pause when they produced any content.
const PAUSE_AFTER_TAGS: &[&str] = &["p", "div", "span"];

/// Elements whose boundaries separate words.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ul", "ol", "dl", "dd", "dt", "blockquote", "section", "article", "aside",
    "header", "footer", "nav", "main", "pre", "figure", "figcaption",
];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// One step of a linearized document.
#[derive(Debug, Clone)]
pub enum Event<'a> {
    Text(String),
    Heading(String),
    Table(ElementRef<'a>),
    Pause,
    /// Consecutive `<br>` elements.
    BreakRun(usize),
}

impl Event<'_> {
    fn has_content(&self) -> bool {
        match self {
            Event::Text(text) | Event::Heading(text) => !text.trim().is_empty(),
            Event::Table(_) => true,
            Event::Pause | Event::BreakRun(_) => false,
        }
    }
}

/// Linearize one body document into text ready for verbalization.
///
/// Pauses appear as the pause sentinel on their own line. Returns `None` when
/// the document has an excluded structural role or nothing speakable.
pub fn linearize(html: &str, language: &Language) -> Option<String> {
    let document = Html::parse_document(html);
    let body = find_body(&document);

    if let Some(role) = structural_role(body) {
        if role.split_whitespace().any(|r| EXCLUDED_ROLES.contains(&r)) {
            log::debug!("Skipping document with role {:?}", role);
            return None;
        }
    }

    let events = resolve_pauses(collect_events(body));
    let text = render(&events, language);
    text.chars().any(char::is_alphanumeric).then_some(text)
}

fn find_body(document: &Html) -> ElementRef<'_> {
    let root = document.root_element();
    root.children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "body")
        .unwrap_or(root)
}

fn structural_role<'a>(body: ElementRef<'a>) -> Option<&'a str> {
    body.value().attr("epub:type").or_else(|| {
        body.descendants()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "section")
            .and_then(|section| section.value().attr("epub:type"))
    })
}

/// Walk the body in document order.
pub fn collect_events(body: ElementRef<'_>) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    walk(body, &mut events);
    events
}

fn push_text(events: &mut Vec<Event<'_>>, text: &str) {
    match events.last_mut() {
        Some(Event::Text(last)) => last.push_str(text),
        _ => events.push(Event::Text(text.to_string())),
    }
}

fn walk<'a>(element: ElementRef<'a>, events: &mut Vec<Event<'a>>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_text(events, text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    visit(child, events);
                }
            }
            _ => {}
        }
    }
}

fn visit<'a>(element: ElementRef<'a>, events: &mut Vec<Event<'a>>) {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return;
    }
    if name == "br" {
        events.push(Event::BreakRun(1));
        return;
    }
    if HEADING_TAGS.contains(&name) {
        let text = collapse_whitespace(&element.text().collect::<String>());
        if !text.is_empty() {
            events.push(Event::Heading(text));
        }
        return;
    }
    if name == "table" {
        events.push(Event::Table(element));
        return;
    }

    let block = BLOCK_TAGS.contains(&name);
    if block {
        if let Some(Event::Text(last)) = events.last_mut() {
            last.push(' ');
        }
    }
    let start = events.len();
    walk(element, events);
    if block {
        if let Some(Event::Text(last)) = events.last_mut() {
            last.push(' ');
        }
    }
    if PAUSE_AFTER_TAGS.contains(&name) && events[start..].iter().any(Event::has_content) {
        events.push(Event::Pause);
    }
}

fn push_pause(events: &mut Vec<Event<'_>>) {
    if !matches!(events.last(), Some(Event::Pause)) {
        events.push(Event::Pause);
    }
}

/// Turn break runs into pauses and collapse adjacent pauses.
///
/// A run of two or more breaks is one pause; a single break is dropped.
/// Whitespace between breaks does not end a run.
pub fn resolve_pauses<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    fn flush_breaks(out: &mut Vec<Event<'_>>, run: usize) {
        if run >= 2 {
            push_pause(out);
        }
    }

    let mut out = Vec::with_capacity(events.len());
    let mut run = 0;
    for event in events {
        match event {
            Event::BreakRun(n) => run += n,
            Event::Text(ref text) if run > 0 && text.trim().is_empty() => {}
            Event::Pause => {
                flush_breaks(&mut out, run);
                run = 0;
                push_pause(&mut out);
            }
            other => {
                flush_breaks(&mut out, run);
                run = 0;
                out.push(other);
            }
        }
    }
    flush_breaks(&mut out, run);
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_text(cell: ElementRef<'_>) -> String {
    collapse_whitespace(&cell.text().collect::<String>())
}

/// Flatten a table into one line per row: "header: value — header: value".
///
/// The first row holds the headers, whatever its cell kind. Rows whose cell
/// count differs from the header count are joined as is.
fn render_table(table: ElementRef<'_>) -> Vec<String> {
    let rows: Vec<ElementRef<'_>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .collect();
    let Some((header_row, body)) = rows.split_first() else {
        return Vec::new();
    };

    fn cells_named(row: &ElementRef<'_>, names: &[&str]) -> Vec<String> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|e| names.contains(&e.value().name()))
            .map(cell_text)
            .collect()
    }

    let headers = cells_named(header_row, &["td", "th"]);
    let mut lines = Vec::new();
    for row in body {
        let cells = cells_named(row, &["td"]);
        if cells.iter().all(String::is_empty) {
            continue;
        }
        let line = if !headers.is_empty() && headers.len() == cells.len() {
            headers
                .iter()
                .zip(&cells)
                .map(|(header, cell)| format!("{}: {}", header, cell))
                .collect::<Vec<_>>()
                .join(" — ")
        } else {
            cells.join(" — ")
        };
        lines.push(line);
    }
    lines
}

fn render(events: &[Event<'_>], language: &Language) -> String {
    fn push_pause_piece(pieces: &mut Vec<String>) {
        if pieces.last().is_some_and(|last| last.as_str() != PAUSE_SENTINEL) {
            pieces.push(PAUSE_SENTINEL.to_string());
        }
    }

    let mut pieces: Vec<String> = Vec::new();
    for event in events {
        match event {
            Event::Text(text) => {
                let text = collapse_whitespace(text);
                if !text.is_empty() {
                    pieces.push(text);
                }
            }
            Event::Heading(text) => {
                pieces.push(convert_roman_numerals(text, language).trim().to_string());
                push_pause_piece(&mut pieces);
            }
            Event::Table(table) => pieces.extend(render_table(*table)),
            Event::Pause => push_pause_piece(&mut pieces),
            Event::BreakRun(_) => {}
        }
    }
    pieces.join("\n")
}
