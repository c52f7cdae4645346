use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{pagination, Extraction, ParseError, RecordExtractor};
use crate::record::{or_placeholder, DefacementRecord};

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table[class*=mirror]").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

// Column positions within a listing row.
const DATE: usize = 0;
const ATTACKER: usize = 1;
const TEAM: usize = 2;
const URL: usize = 8;
const MIRROR: usize = 9;
const COLUMNS: usize = 10;

/// Extracts records from the site's mirror table.
///
/// Relative mirror links are resolved against `base`.
pub struct ListingExtractor {
    base: Url,
}

impl ListingExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Absolute http(s) link for `href`, or `None` for placeholders such as
    /// `#`, `?` or `javascript:` that point nowhere past the site root.
    fn resolve_mirror(&self, href: &str) -> Option<Url> {
        let mut url = self.base.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let mut bare = url.clone();
        bare.set_fragment(None);
        bare.set_query(None);
        let mut root = self.base.clone();
        root.set_fragment(None);
        root.set_query(None);
        if bare == root {
            return None;
        }
        if url.fragment() == Some("") {
            url.set_fragment(None);
        }
        Some(url)
    }

    fn parse_row(&self, cells: &[ElementRef]) -> Option<DefacementRecord> {
        let url = cell_text(&cells[URL]);
        if url.is_empty() {
            return None;
        }
        let mirror = cells[MIRROR]
            .select(&LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| self.resolve_mirror(href))?;

        let datetime = cell_text(&cells[DATE]);
        let date = datetime
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();

        Some(DefacementRecord {
            date,
            attacker: or_placeholder(&link_or_cell_text(&cells[ATTACKER])),
            team: or_placeholder(&link_or_cell_text(&cells[TEAM])),
            url,
            mirror: mirror.to_string(),
        })
    }
}

impl RecordExtractor for ListingExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ParseError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&TABLE)
            .next()
            .ok_or(ParseError::MissingTable)?;

        let mut out = Extraction {
            last_page: pagination::last_page(&document),
            ..Default::default()
        };

        for (i, row) in table.select(&ROW).enumerate() {
            let cells: Vec<ElementRef> = row.select(&CELL).collect();
            if cells.len() < COLUMNS {
                warn!(row = i, cells = cells.len(), "Skipping a row due to insufficient columns");
                continue;
            }
            out.entries += 1;
            match self.parse_row(&cells) {
                Some(record) => out.records.push(record),
                None => {
                    warn!(row = i, "Skipping entry without URL or mirror link");
                    out.skipped += 1;
                }
            }
        }

        debug!(
            entries = out.entries,
            skipped = out.skipped,
            last_page = ?out.last_page,
            "Extracted listing page"
        );
        Ok(out)
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_text(cell: &ElementRef) -> String {
    collapse_ws(&cell.text().collect::<String>())
}

/// Text of the cell's first link, falling back to the whole cell.
fn link_or_cell_text(cell: &ElementRef) -> String {
    match cell.select(&LINK).next() {
        Some(a) => cell_text(&a),
        None => cell_text(cell),
    }
}
