use tracing::{error, info, warn};

use crate::category::Category;
use crate::fetcher::{FetchError, PageFetcher};
use crate::parser::{Extraction, ParseError, RecordExtractor};
use crate::record::DefacementRecord;

/// Hard ceiling on pages per run, whatever the caller asks for.
pub const MAX_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every requested page was fetched.
    PageLimit,
    /// A page came back with no listing entries.
    EmptyPage,
    /// The site's pagination says there is nothing after this page.
    LastPage,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(StopReason),
    /// The run stopped at `page`; records from earlier pages are kept.
    Aborted { page: u32, error: PageError },
}

#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<DefacementRecord>,
    pub pages_fetched: u32,
    pub skipped: usize,
    pub outcome: RunOutcome,
}

/// Walks listing pages one at a time: fetch, extract, accumulate.
pub struct Pipeline<'a> {
    fetcher: &'a dyn PageFetcher,
    extractor: &'a dyn RecordExtractor,
}

impl<'a> Pipeline<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, extractor: &'a dyn RecordExtractor) -> Self {
        Self { fetcher, extractor }
    }

    /// Never fails: a fetch or parse failure ends the loop and is reported
    /// in the outcome alongside whatever was collected before it.
    pub fn run(&self, category: &Category, max_pages: u32) -> RunReport {
        let max_pages = max_pages.min(MAX_PAGES);
        let mut report = RunReport {
            records: Vec::new(),
            pages_fetched: 0,
            skipped: 0,
            outcome: RunOutcome::Completed(StopReason::PageLimit),
        };

        info!("Scraping {} (up to {} pages)", category, max_pages);

        for page in 1..=max_pages {
            let extraction = match self.scrape_page(category, page) {
                Ok(extraction) => extraction,
                Err(error) => {
                    error!(page, "Stopping early: {}", error);
                    report.outcome = RunOutcome::Aborted { page, error };
                    break;
                }
            };
            report.pages_fetched += 1;

            if extraction.skipped > 0 {
                warn!(page, skipped = extraction.skipped, "Dropped incomplete entries");
            }
            info!(page, records = extraction.records.len(), "Page scraped");

            report.skipped += extraction.skipped;
            let has_more = extraction.has_more();
            let last_page = extraction.last_page;
            report.records.extend(extraction.records);

            if !has_more {
                info!(page, "Empty page, no more entries");
                report.outcome = RunOutcome::Completed(StopReason::EmptyPage);
                break;
            }
            // No pagination block means the page limit alone decides.
            if last_page.is_some_and(|last| page >= last) {
                info!(page, "Reached the last available page");
                report.outcome = RunOutcome::Completed(StopReason::LastPage);
                break;
            }
        }

        info!(
            pages = report.pages_fetched,
            "Total entries collected: {}",
            report.records.len()
        );
        report
    }

    fn scrape_page(
        &self,
        category: &Category,
        page: u32,
    ) -> Result<Extraction, PageError> {
        let html = self.fetcher.fetch(category, page)?;
        Ok(self.extractor.extract(&html)?)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use reqwest::{StatusCode, Url};

    use super::*;
    use crate::parser::ListingExtractor;

    /// Serves canned pages in order and records which pages were asked for.
    struct ScriptedFetcher {
        pages: Vec<Result<String, StatusCode>>,
        calls: RefCell<Vec<u32>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<Result<String, StatusCode>>) -> Self {
            Self {
                pages,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<u32> {
            self.calls.borrow().clone()
        }
    }

    impl PageFetcher for ScriptedFetcher {
        fn fetch(&self, category: &Category, page: u32) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(page);
            match self.pages.get(page as usize - 1) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    url: category.page_url("https://zone-xsec.com", page),
                    status: *status,
                }),
                None => Err(FetchError::Status {
                    url: category.page_url("https://zone-xsec.com", page),
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(Url::parse("https://zone-xsec.com").unwrap())
    }

    /// A listing page with `n` entries and no pagination block.
    fn listing(page: u32, n: usize) -> String {
        let rows: String = (0..n)
            .map(|i| {
                format!(
                    "<tr><td>2024-01-0{p} 10:00</td><td><a>att{p}{i}</a></td><td><a>team</a></td>\
                     <td></td><td></td><td></td><td></td><td></td>\
                     <td>site{p}-{i}.example.com</td><td><a href=\"/mirror/id/{p}{i}\">Mirror</a></td></tr>",
                    p = page,
                    i = i
                )
            })
            .collect();
        format!(
            "<html><body><table class=\"mirror-table\"><tbody>{}</tbody></table></body></html>",
            rows
        )
    }

    #[test]
    fn fetches_up_to_the_page_limit() {
        let fetcher = ScriptedFetcher::new((1..=5).map(|p| Ok(listing(p, 2))).collect());
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 3);

        assert_eq!(fetcher.calls(), vec![1, 2, 3]);
        assert_eq!(report.records.len(), 6);
        assert_eq!(report.pages_fetched, 3);
        assert!(matches!(
            report.outcome,
            RunOutcome::Completed(StopReason::PageLimit)
        ));
        assert_eq!(report.records[0].url, "site1-0.example.com");
        assert_eq!(report.records[5].url, "site3-1.example.com");
    }

    #[test]
    fn stops_on_empty_page() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(listing(1, 2)),
            Ok(listing(2, 0)),
            Ok(listing(3, 2)),
        ]);
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 3);

        assert_eq!(fetcher.calls(), vec![1, 2]);
        assert_eq!(report.records.len(), 2);
        assert!(matches!(
            report.outcome,
            RunOutcome::Completed(StopReason::EmptyPage)
        ));
    }

    #[test]
    fn fetch_failure_keeps_earlier_records() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(listing(1, 4)),
            Err(StatusCode::SERVICE_UNAVAILABLE),
            Ok(listing(3, 4)),
        ]);
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Country("MZ".into()), 3);

        assert_eq!(fetcher.calls(), vec![1, 2]);
        assert_eq!(report.records.len(), 4);
        assert!(report.records.iter().all(|r| r.url.starts_with("site1-")));
        assert_eq!(report.pages_fetched, 1);
        match &report.outcome {
            RunOutcome::Aborted {
                page: 2,
                error: PageError::Fetch(FetchError::Status { status, url }),
            } => {
                assert_eq!(*status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(url, "https://zone-xsec.com/country/MZ/page=2");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn unrecognized_markup_aborts_instead_of_ending_quietly() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(listing(1, 1)),
            Ok("<html><body>maintenance</body></html>".to_string()),
        ]);
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 3);

        assert_eq!(report.records.len(), 1);
        assert!(matches!(
            report.outcome,
            RunOutcome::Aborted {
                page: 2,
                error: PageError::Parse(ParseError::MissingTable)
            }
        ));
    }

    #[test]
    fn page_count_is_clamped() {
        let fetcher = ScriptedFetcher::new((1..=10).map(|p| Ok(listing(p, 1))).collect());
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 50);
        assert_eq!(fetcher.calls(), vec![1, 2, 3, 4, 5]);
        assert_eq!(report.records.len(), 5);

    }

    #[test]
    fn zero_pages_fetches_nothing() {
        let fetcher = ScriptedFetcher::new(vec![Ok(listing(1, 1))]);
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 0);
        assert!(fetcher.calls().is_empty());
        assert!(report.records.is_empty());
        assert_eq!(report.pages_fetched, 0);
        assert!(matches!(
            report.outcome,
            RunOutcome::Completed(StopReason::PageLimit)
        ));
    }

    #[test]
    fn pagination_beyond_limit_runs_to_the_limit() {
        // Advertises five pages; only two are requested.
        let page = |p: u32| {
            listing(p, 1).replace(
                "</body>",
                "<ul class=\"pagination\"><li><a>1</a></li><li><a>5</a></li></ul></body>",
            )
        };
        let fetcher = ScriptedFetcher::new((1..=5).map(|p| Ok(page(p))).collect());
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 2);
        assert_eq!(fetcher.calls(), vec![1, 2]);
        assert_eq!(report.records.len(), 2);
        assert!(matches!(
            report.outcome,
            RunOutcome::Completed(StopReason::PageLimit)
        ));
    }

    #[test]
    fn stops_at_advertised_last_page() {
        let page1 = std::fs::read_to_string("tests/fixtures/archive_page1.html").unwrap();
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page1.clone()),
            Ok(page1.clone()),
            Ok(page1),
        ]);
        let ex = extractor();
        // The fixture advertises three pages in total.
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 5);
        assert_eq!(fetcher.calls(), vec![1, 2, 3]);
        assert_eq!(report.records.len(), 9);
        assert!(matches!(
            report.outcome,
            RunOutcome::Completed(StopReason::LastPage)
        ));
    }

    #[test]
    fn skipped_entries_are_counted() {
        let irregular = std::fs::read_to_string("tests/fixtures/irregular_entries.html").unwrap();
        let fetcher = ScriptedFetcher::new(vec![Ok(irregular)]);
        let ex = extractor();
        let report = Pipeline::new(&fetcher, &ex).run(&Category::Archive, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.records.len(), 3);
    }
}
