//! Navigation helpers over parsed HTML documents.
//!
//! Source pages are located by a fixed element path from `<html>` (e.g.
//! `html/body/div/div/table`). The parser inserts `<tbody>` around bare table rows,
//! so paths that pass through a table include it.

use scraper::{ElementRef, Html, Node};

/// Deepest element nesting [`first_text`] descends into.
pub const MAX_TEXT_DEPTH: usize = 32;

/// Parses a whole document.
pub fn parse_document(text: &str) -> Html {
    Html::parse_document(text)
}

/// Element children of `element`, skipping text and comments.
pub fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.children().filter_map(ElementRef::wrap)
}

/// Finds the first element reachable from `element` by tag names.
///
/// `path[0]` must name `element` itself. When several children share a tag name,
/// each is tried in document order until the rest of the path matches.
pub fn find_path<'a>(element: ElementRef<'a>, path: &[&str]) -> Option<ElementRef<'a>> {
    let (head, rest) = path.split_first()?;
    if element.value().name() != *head {
        return None;
    }
    if rest.is_empty() {
        return Some(element);
    }
    child_elements(element).find_map(|child| find_path(child, rest))
}

/// First non-blank text node under `element`, with the element that directly holds it.
///
/// Descends depth-first, at most [`MAX_TEXT_DEPTH`] levels.
pub fn first_text<'a>(element: ElementRef<'a>) -> Option<(&'a str, ElementRef<'a>)> {
    first_text_at(element, 0)
}

fn first_text_at<'a>(element: ElementRef<'a>, depth: usize) -> Option<(&'a str, ElementRef<'a>)> {
    if depth > MAX_TEXT_DEPTH {
        return None;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) if !text.trim().is_empty() => return Some((&**text, element)),
            Node::Element(_) => {
                let found = ElementRef::wrap(child).and_then(|el| first_text_at(el, depth + 1));
                if found.is_some() {
                    return found;
                }
            }
            _ => {}
        }
    }
    None
}

/// Trimmed first text of a cell, or an empty string.
pub fn cell_text(cell: ElementRef<'_>) -> &str {
    first_text(cell).map_or("", |(text, _)| text.trim())
}

/// Rows of a table in document order, looking through `thead`/`tbody`/`tfoot`.
pub fn table_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(child_elements(child).filter(|el| el.value().name() == "tr"));
            }
            _ => {}
        }
    }
    rows
}

/// Cells (`td` or `th`) of a row.
pub fn row_cells<'a>(row: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    child_elements(row)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .collect()
}

/// True if the row is made of `th` cells.
pub fn is_header_row(row: ElementRef<'_>) -> bool {
    child_elements(row)
        .next()
        .is_some_and(|cell| cell.value().name() == "th")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><body>\
        <div><p>nav</p></div>\
        <div><div><span>x</span></div><div><table>\
        <tr><th>A</th><th><b>B</b></th></tr>\
        <tr><td><a href=\"/q/bonds/RU000A0JX0J2/\">ОФЗ 26207</a></td><td>\n <i> </i><b>1 234,5</b></td></tr>\
        </table></div></div>\
        </body></html>";

    #[test]
    fn test_find_path_backtracks() {
        let doc = parse_document(PAGE);
        let table = find_path(doc.root_element(), &["html", "body", "div", "div", "table"]);
        assert!(table.is_some());
        assert!(find_path(doc.root_element(), &["html", "body", "table"]).is_none());
        assert!(find_path(doc.root_element(), &["body"]).is_none());
    }

    #[test]
    fn test_rows_through_inserted_tbody() {
        let doc = parse_document(PAGE);
        let table = find_path(doc.root_element(), &["html", "body", "div", "div", "table"]).unwrap();
        let rows = table_rows(table);
        assert_eq!(rows.len(), 2);
        assert!(is_header_row(rows[0]));
        assert!(!is_header_row(rows[1]));

        let header: Vec<&str> = row_cells(rows[0]).into_iter().map(cell_text).collect();
        assert_eq!(header, vec!["A", "B"]);
    }

    #[test]
    fn test_first_text_skips_blank_nodes() {
        let doc = parse_document(PAGE);
        let table = find_path(doc.root_element(), &["html", "body", "div", "div", "table"]).unwrap();
        let cells = row_cells(table_rows(table)[1]);

        let (name, parent) = first_text(cells[0]).unwrap();
        assert_eq!(name, "ОФЗ 26207");
        assert_eq!(parent.value().name(), "a");
        assert_eq!(cell_text(cells[1]), "1 234,5");
    }

    #[test]
    fn test_first_text_depth_bound() {
        let mut page = String::from("<html><body>");
        for _ in 0..(MAX_TEXT_DEPTH + 5) {
            page.push_str("<span>");
        }
        page.push_str("deep");
        let doc = parse_document(&page);
        let body = find_path(doc.root_element(), &["html", "body"]).unwrap();
        assert!(first_text(body).is_none());
    }
}
