use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static FQDN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$").unwrap()
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("invalid domain format: {0}")]
    InvalidDomain(String),
    #[error("country code must not be empty")]
    EmptyCountry,
    #[error("invalid country code: {0} (expected 2 or 3 letters)")]
    InvalidCountry(String),
}

/// Which listing to walk: the full archive, one country, or a domain search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Archive,
    Country(String),
    Domain(String),
}

impl Category {
    /// `archive` (any case) selects the archive; otherwise a 2-3 letter country code.
    pub fn from_tld(tld: &str) -> Result<Self, CategoryError> {
        let code = tld.trim().to_uppercase();
        match code.as_str() {
            "" => Err(CategoryError::EmptyCountry),
            "ARCHIVE" => Ok(Category::Archive),
            c if (2..=3).contains(&c.len()) && c.bytes().all(|b| b.is_ascii_alphabetic()) => {
                Ok(Category::Country(c.to_string()))
            }
            _ => Err(CategoryError::InvalidCountry(tld.trim().to_string())),
        }
    }

    pub fn from_domain(domain: &str) -> Result<Self, CategoryError> {
        let domain = domain.trim();
        if is_valid_fqdn(domain) {
            Ok(Category::Domain(domain.to_string()))
        } else {
            Err(CategoryError::InvalidDomain(domain.to_string()))
        }
    }

    /// Listing URL for a 1-based page. Page 1 has no page suffix.
    pub fn page_url(&self, base: &str, page: u32) -> String {
        let base = base.trim_end_matches('/');
        let listing = match self {
            Category::Archive => format!("{}/archive", base),
            Category::Country(code) => format!("{}/country/{}", base, code),
            Category::Domain(domain) => format!("{}/search/q={}", base, domain),
        };
        if page > 1 {
            format!("{}/page={}", listing, page)
        } else {
            listing
        }
    }

    /// Short name used in default output filenames.
    pub fn identifier(&self) -> String {
        match self {
            Category::Archive => "archive".to_string(),
            Category::Country(code) => code.to_lowercase(),
            Category::Domain(domain) => domain.clone(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Archive => write!(f, "archive"),
            Category::Country(code) => write!(f, "country {}", code),
            Category::Domain(domain) => write!(f, "domain {}", domain),
        }
    }
}

pub fn is_valid_fqdn(domain: &str) -> bool {
    (1..=253).contains(&domain.len()) && FQDN_RE.is_match(domain)
}
