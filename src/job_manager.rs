use std::path::PathBuf;
use log::{info, warn};

use crate::config::CrawlerConfig;
use crate::delay_manager::DelayManager;
use crate::error::CrawlerError;
use crate::extractor::{Extractor, OfferDetails};
use crate::resume_manager::{CheckpointStore, PostingRecord};
use crate::scraper::PageFetcher;
use crate::stats::CloudMentions;

/// Outcome of one offer-grabbing run.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub first_index: u32,
    pub processed: u32,
    pub fetch_failures: u32,
    pub checkpoints: Vec<PathBuf>,
    pub records: Vec<PostingRecord>,
    pub mentions: CloudMentions,
}

/// Second stage: grabs offer details for every link not covered by the latest checkpoint.
///
/// Owns the record table and the counters for the whole run. Record `i` always
/// belongs to `links[i - 1]`, so an offer that fails to fetch leaves a gap in
/// the indices instead of shifting later offers.
pub struct OfferJob<'a, F: PageFetcher> {
    fetcher: &'a F,
    extractor: &'a Extractor,
    store: CheckpointStore,
    delay: DelayManager,
    checkpoint_interval: u32,
    records: Vec<PostingRecord>,
    mentions: CloudMentions,
}

impl<'a, F: PageFetcher> OfferJob<'a, F> {
    pub fn new(config: &CrawlerConfig, fetcher: &'a F, extractor: &'a Extractor) -> Self {
        OfferJob {
            fetcher,
            extractor,
            store: CheckpointStore::new(config.data_dir.clone()),
            delay: DelayManager::new(config.request_delay),
            checkpoint_interval: config.checkpoint_interval.max(1),
            records: Vec::new(),
            mentions: CloudMentions::default(),
        }
    }

    pub fn run(mut self, links: &[String]) -> Result<JobSummary, CrawlerError> {
        let checkpoint = self.store.latest()?;
        let first_index = CheckpointStore::resume_index(checkpoint.as_ref())?;

        // Counters cover the whole dataset, not just this run.
        if let Some(checkpoint) = checkpoint {
            for record in &checkpoint.records {
                self.mentions.observe(&record.requirements);
            }
            self.records = checkpoint.records;
        }

        let total = links.len();
        let mut processed = 0;
        let mut fetch_failures = 0;
        let mut checkpoints = Vec::new();

        if first_index as usize > total {
            info!("All {} offers already grabbed.", total);
        }

        for (index, url) in (first_index..).zip(links.iter().skip(first_index as usize - 1)) {
            info!("Processing {} / {} : {}", index, total, url);
            processed += 1;

            match self.grab(url) {
                Some(details) => self.push_record(index, details),
                None => fetch_failures += 1,
            }

            if index % self.checkpoint_interval == 0 {
                checkpoints.push(self.store.save(&self.records)?);
                info!("Progress saved!");
            }

            self.delay.throttle();
        }

        checkpoints.push(self.store.save(&self.records)?);
        info!("Saved {} offers to {:?}", self.records.len(), checkpoints.last());

        Ok(JobSummary {
            first_index,
            processed,
            fetch_failures,
            checkpoints,
            records: self.records,
            mentions: self.mentions,
        })
    }

    fn grab(&self, url: &str) -> Option<OfferDetails> {
        match self.fetcher.fetch(url) {
            Ok(page) => Some(self.extractor.extract_details(&page, url)),
            Err(failure) => {
                warn!("Skipping offer {}", failure.url());
                None
            }
        }
    }

    fn push_record(&mut self, index: u32, details: OfferDetails) {
        info!("Requirements for Offer {} ({}):", index, details.title);
        info!("{}", details.requirements);

        self.mentions.observe(&details.requirements);
        self.records.push(PostingRecord {
            index,
            title: details.title,
            requirements: details.requirements,
            url: details.url,
        });
    }
}

impl JobSummary {
    pub fn log(&self) {
        info!("Summary:");
        info!("AWS or Amazon mentioned in requirements: {} times", self.mentions.aws_count);
        info!("Azure mentioned in requirements: {} times", self.mentions.azure_count);
        info!(
            "Both AWS (or Amazon) and Azure mentioned together: {} times",
            self.mentions.both_count
        );
    }
}
