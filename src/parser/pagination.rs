use std::sync::LazyLock;

use scraper::{Html, Selector};

static PAGE_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul[class*=pagination] a").unwrap());

/// Largest numeric link label in the pagination block, if there is one.
pub fn last_page(document: &Html) -> Option<u32> {
    document
        .select(&PAGE_LINKS)
        .filter_map(|a| a.text().collect::<String>().trim().parse::<u32>().ok())
        .max()
}
