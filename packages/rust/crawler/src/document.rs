//! Parsed, read-only snapshot of a fetched listing page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use lipidscrape_shared::RawCell;

/// An immutable parsed page with structural queries over its tables.
pub struct RenderedDocument {
    url: Url,
    html: Html,
}

impl RenderedDocument {
    /// Parse `body` as the content of `url`.
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(body),
        }
    }

    /// The page this snapshot was taken from.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Text of every `<th>` in the document, in document order.
    pub fn header_labels(&self) -> Vec<String> {
        let th_sel = Selector::parse("th").unwrap();
        self.html.select(&th_sel).map(element_text).collect()
    }

    /// All `<tbody>` elements in document order.
    pub fn table_bodies(&self) -> impl Iterator<Item = ElementRef<'_>> {
        let tbody_sel = Selector::parse("tbody").unwrap();
        self.html.select(&tbody_sel).collect::<Vec<_>>().into_iter()
    }

    pub fn has_table_body(&self) -> bool {
        self.table_bodies().next().is_some()
    }

    /// Text of the first `<p>` in the first `<tfoot>` row, if any.
    pub fn footer_text(&self) -> Option<String> {
        let row_sel = Selector::parse("tfoot tr").unwrap();
        let p_sel = Selector::parse("p").unwrap();
        self.html
            .select(&row_sel)
            .next()
            .and_then(|row| row.select(&p_sel).next())
            .map(element_text)
    }
}

/// Rows (`<tr>`) under `parent` in document order.
pub fn rows_of(parent: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let tr_sel = Selector::parse("tr").unwrap();
    parent.select(&tr_sel).collect()
}

/// Data cells (`<td>`) of a row, each with its first anchor target.
pub fn cells_of(row: ElementRef<'_>) -> Vec<RawCell> {
    let td_sel = Selector::parse("td").unwrap();
    let a_sel = Selector::parse("a[href]").unwrap();
    row.select(&td_sel)
        .map(|td| RawCell {
            text: element_text(td),
            href: td
                .select(&a_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        })
        .collect()
}

/// Text content with whitespace runs collapsed and ends trimmed.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
