pub mod listing;
pub mod pagination;

use crate::record::DefacementRecord;

pub use listing::ListingExtractor;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The page has no defacement table at all, as opposed to an empty one.
    #[error("no table with a 'mirror' class found on the page")]
    MissingTable,
}

/// Everything pulled out of one listing page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Records in page order, top to bottom.
    pub records: Vec<DefacementRecord>,
    /// Listing entries seen, including the skipped ones.
    pub entries: usize,
    /// Entries dropped for lacking a URL or mirror.
    pub skipped: usize,
    /// Highest page number linked from the pagination block.
    pub last_page: Option<u32>,
}

impl Extraction {
    /// An empty page ends pagination.
    pub fn has_more(&self) -> bool {
        self.entries > 0
    }
}

/// Turns one page of listing HTML into records.
pub trait RecordExtractor {
    fn extract(&self, html: &str) -> Result<Extraction, ParseError>;
}
