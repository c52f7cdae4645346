use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::category::Category;
use crate::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Produces the raw HTML of one listing page.
pub trait PageFetcher {
    fn fetch(&self, category: &Category, page: u32) -> Result<String, FetchError>;
}

/// Blocking HTTP fetcher; one GET per call, no caching or retries.
///
/// Each request carries a User-Agent drawn at random from the configured pool.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
    user_agents: Vec<String>,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            user_agents: settings.user_agents.clone(),
        })
    }

    fn pick_user_agent(&self) -> Option<&str> {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, category: &Category, page: u32) -> Result<String, FetchError> {
        let url = category.page_url(&self.base_url, page);
        info!("Sending GET request to {}", url);

        let request_err = |source: reqwest::Error| FetchError::Request {
            url: url.clone(),
            source,
        };
        let mut request = self.client.get(&url);
        if let Some(ua) = self.pick_user_agent() {
            debug!(user_agent = ua, "Selected a random User-Agent");
            request = request.header(USER_AGENT, ua);
        }
        let response = request.send().map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let body = response.text().map_err(request_err)?;
        debug!(bytes = body.len(), "Fetched {}", url);
        Ok(body)
    }
}
