use std::collections::HashSet;

use scraper::{ElementRef, Html};

use crate::config::{CompiledSelectors, CrawlerConfig};
use crate::error::CrawlerError;

/// Stored in place of the requirements text when the page has none we can read.
pub const REQUIREMENTS_NOT_FOUND: &str = "Requirements not found";

#[derive(Debug, Clone, PartialEq)]
pub struct OfferDetails {
    pub title: String,
    pub requirements: String,
    pub url: String,
}

pub struct Extractor {
    selectors: CompiledSelectors,
    offer_href_prefix: String,
    requirements_headings: Vec<String>,
}

impl Extractor {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlerError> {
        Ok(Extractor {
            selectors: CompiledSelectors::compile(config)?,
            offer_href_prefix: config.offer_href_prefix.clone(),
            requirements_headings: config.requirements_headings.clone(),
        })
    }

    /// Offer ids linked from one listing page, first-seen order, no repeats.
    pub fn extract_offer_ids(&self, page: &Html) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();

        for anchor in page.select(&self.selectors.listing_link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !href.starts_with(&self.offer_href_prefix) {
                continue;
            }
            if let Some(id) = self.offer_id_from_href(href) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    pub fn offer_id_from_href(&self, href: &str) -> Option<String> {
        self.selectors
            .offer_id
            .captures(href)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_details(&self, page: &Html, url: &str) -> OfferDetails {
        let title = page
            .select(&self.selectors.title)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let requirements = self
            .extract_requirements(page)
            .unwrap_or_else(|| REQUIREMENTS_NOT_FOUND.to_string());

        OfferDetails {
            title,
            requirements,
            url: url.to_string(),
        }
    }

    fn extract_requirements(&self, page: &Html) -> Option<String> {
        let heading = self.find_requirements_heading(page)?;
        let block = self.next_requirements_block(page, heading)?;

        let items: Vec<String> = block
            .select(&self.selectors.list_item)
            .map(|li| normalize_whitespace(li.text()))
            .filter(|text| !text.is_empty())
            .collect();

        if items.is_empty() {
            return None;
        }
        Some(items.join(" "))
    }

    /// Label order decides the winner, not document order.
    fn find_requirements_heading<'a>(&self, page: &'a Html) -> Option<ElementRef<'a>> {
        let headings: Vec<(ElementRef<'a>, String)> = page
            .select(&self.selectors.heading)
            .map(|h| (h, h.text().collect::<String>().trim().to_string()))
            .collect();

        self.requirements_headings.iter().find_map(|label| {
            headings
                .iter()
                .find(|(_, text)| text == label)
                .map(|(h, _)| *h)
        })
    }

    /// First matching block anywhere after the heading in document order.
    fn next_requirements_block<'a>(
        &self,
        page: &'a Html,
        heading: ElementRef<'a>,
    ) -> Option<ElementRef<'a>> {
        page.tree
            .root()
            .descendants()
            .skip_while(|node| node.id() != heading.id())
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| self.selectors.requirements_block.matches(el))
    }
}

fn normalize_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
