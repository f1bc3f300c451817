use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use scraper::Selector;

use crate::error::CrawlerError;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/71.0.3578.80 Safari/537.36";

/// Everything site-specific lives here. Defaults target pracuj.pl DevOps listings.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Listing page URL without the page number; the number is appended verbatim.
    pub listing_base_url: String,
    pub page_count: u32,
    pub listing_link_selector: String,
    pub offer_href_prefix: String,
    /// Must contain one capture group holding the numeric offer id.
    pub offer_id_pattern: String,
    pub offer_url_prefix: String,
    pub heading_selector: String,
    /// Tried in order; the first label present on the page wins.
    pub requirements_headings: Vec<String>,
    pub requirements_block_selector: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub request_delay: Duration,
    pub checkpoint_interval: u32,
    pub data_dir: PathBuf,
    pub links_file: PathBuf,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        CrawlerConfig {
            listing_base_url: "https://www.pracuj.pl/praca/devops%20engineer;kw?".to_string(),
            page_count: 3,
            listing_link_selector: "a.tiles_cnb3rfy.core_n194fgoq".to_string(),
            offer_href_prefix: "https://www.pracuj.pl/praca/".to_string(),
            offer_id_pattern: r"oferta,(\d+)".to_string(),
            offer_url_prefix: "https://www.pracuj.pl/praca/x,oferta,".to_string(),
            heading_selector: "h2".to_string(),
            requirements_headings: vec![
                "Nasze wymagania".to_string(),
                "Our requirements".to_string(),
            ],
            requirements_block_selector: "div.c1s1xseq".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            request_delay: Duration::from_millis(400),
            checkpoint_interval: 25,
            data_dir: PathBuf::from("data"),
            links_file: PathBuf::from("offer_urls.csv"),
        }
    }
}

impl CrawlerConfig {
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}{}", self.listing_base_url, page)
    }

    pub fn offer_url(&self, offer_id: &str) -> String {
        format!("{}{}", self.offer_url_prefix, offer_id)
    }

    pub fn validate(&self) -> Result<(), CrawlerError> {
        if self.page_count == 0 {
            return Err(CrawlerError::Config("page count must be at least 1".to_string()));
        }
        if self.checkpoint_interval == 0 {
            return Err(CrawlerError::Config(
                "checkpoint interval must be at least 1".to_string(),
            ));
        }
        if self.requirements_headings.is_empty() {
            return Err(CrawlerError::Config(
                "at least one requirements heading label is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Selectors and the id pattern parsed once, up front.
#[derive(Debug)]
pub struct CompiledSelectors {
    pub listing_link: Selector,
    pub offer_id: Regex,
    pub title: Selector,
    pub heading: Selector,
    pub requirements_block: Selector,
    pub list_item: Selector,
}

impl CompiledSelectors {
    pub fn compile(config: &CrawlerConfig) -> Result<Self, CrawlerError> {
        let offer_id = Regex::new(&config.offer_id_pattern)?;
        if offer_id.captures_len() < 2 {
            return Err(CrawlerError::Config(format!(
                "offer id pattern '{}' has no capture group",
                config.offer_id_pattern
            )));
        }

        Ok(CompiledSelectors {
            listing_link: parse_selector(&config.listing_link_selector)?,
            offer_id,
            title: parse_selector("title")?,
            heading: parse_selector(&config.heading_selector)?,
            requirements_block: parse_selector(&config.requirements_block_selector)?,
            list_item: parse_selector("li")?,
        })
    }
}

fn parse_selector(selector: &str) -> Result<Selector, CrawlerError> {
    Selector::parse(selector).map_err(|e| CrawlerError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}
