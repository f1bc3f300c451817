pub mod config;
pub mod error;
pub mod scraper;
pub mod extractor;
pub mod input_loader;
pub mod link_collector;
pub mod resume_manager;
pub mod delay_manager;
pub mod job_manager;
pub mod stats;
pub mod logger;

// Exporting types for convenience
pub use crate::config::CrawlerConfig;
pub use crate::error::{CrawlerError, FetchFailure};
pub use crate::scraper::{PageFetcher, Scraper};
pub use crate::extractor::{Extractor, OfferDetails, REQUIREMENTS_NOT_FOUND};
pub use crate::link_collector::{LinkCollector, PostingLink};
pub use crate::resume_manager::{Checkpoint, CheckpointStore, PostingRecord};
pub use crate::job_manager::{JobSummary, OfferJob};
pub use crate::stats::CloudMentions;
