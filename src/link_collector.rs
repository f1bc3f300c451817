use std::collections::HashSet;
use log::{info, warn};

use crate::config::CrawlerConfig;
use crate::error::CrawlerError;
use crate::extractor::Extractor;
use crate::input_loader;
use crate::scraper::PageFetcher;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLink {
    pub identifier: String,
    pub canonical_url: String,
}

pub struct LinkCollector<'a, F: PageFetcher> {
    config: &'a CrawlerConfig,
    fetcher: &'a F,
    extractor: &'a Extractor,
}

impl<'a, F: PageFetcher> LinkCollector<'a, F> {
    pub fn new(config: &'a CrawlerConfig, fetcher: &'a F, extractor: &'a Extractor) -> Self {
        LinkCollector { config, fetcher, extractor }
    }

    /// Walks listing pages 1..=page_count, dedups ids across pages and writes the links file.
    pub fn collect(&self, page_count: u32) -> Result<Vec<PostingLink>, CrawlerError> {
        if page_count == 0 {
            return Err(CrawlerError::Config("page count must be at least 1".to_string()));
        }

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for page in 1..=page_count {
            let page_url = self.config.listing_url(page);
            match self.fetcher.fetch(&page_url) {
                Ok(document) => {
                    let ids = self.extractor.extract_offer_ids(&document);
                    info!("Page {} processed successfully ({} offers).", page, ids.len());
                    for id in ids {
                        if seen.insert(id.clone()) {
                            links.push(PostingLink {
                                canonical_url: self.config.offer_url(&id),
                                identifier: id,
                            });
                        }
                    }
                }
                Err(_) => warn!("Failed to fetch page {}.", page),
            }
        }

        input_loader::save_links(&self.config.links_file, &links)?;
        info!("Total unique links collected: {}", links.len());
        Ok(links)
    }
}
