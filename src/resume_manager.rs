use std::fs::{self, File};
use std::path::PathBuf;
use chrono::Local;
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::CrawlerError;

const CHECKPOINT_PREFIX: &str = "grabbed_offers_";
const CHECKPOINT_EXT: &str = ".csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingRecord {
    #[serde(rename = "index", alias = "i")]
    pub index: u32,
    pub title: String,
    pub requirements: String,
    pub url: String,
}

/// Snapshot of every record grabbed so far, as read from the newest checkpoint file.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub path: PathBuf,
    pub records: Vec<PostingRecord>,
}

impl Checkpoint {
    pub fn max_index(&self) -> Option<u32> {
        self.records.iter().map(|r| r.index).max()
    }
}

/// Append-only series of timestamped CSV snapshots in one directory.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        CheckpointStore { dir: dir.into() }
    }

    /// Checkpoint file names, newest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, CrawlerError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(CHECKPOINT_PREFIX) && name.ends_with(CHECKPOINT_EXT))
            .collect();
        names.sort_unstable_by(|a, b| b.cmp(a));

        Ok(names.into_iter().map(|name| self.dir.join(name)).collect())
    }

    pub fn latest(&self) -> Result<Option<Checkpoint>, CrawlerError> {
        let Some(path) = self.list()?.into_iter().next() else {
            info!("No checkpoint found in {:?}. Starting fresh.", self.dir);
            return Ok(None);
        };

        let mut rdr = csv::Reader::from_reader(File::open(&path)?);
        let records = rdr
            .deserialize::<PostingRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        info!("Resuming from {:?}: {} offers already grabbed.", path, records.len());
        Ok(Some(Checkpoint { path, records }))
    }

    /// First index to assign given the latest checkpoint (if any).
    pub fn resume_index(checkpoint: Option<&Checkpoint>) -> Result<u32, CrawlerError> {
        match checkpoint.and_then(Checkpoint::max_index) {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or_else(|| {
                CrawlerError::Config(format!("checkpoint index {} leaves no room to resume", max))
            }),
        }
    }

    /// Writes the whole table to a fresh file; existing checkpoints are never touched.
    pub fn save(&self, records: &[PostingRecord]) -> Result<PathBuf, CrawlerError> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = Local::now().format("%Y_%m_%d_%H%M%S");
        let mut seq = self.list()?.len() + 1;
        let path = loop {
            let candidate = self
                .dir
                .join(format!("{}{}_{:05}{}", CHECKPOINT_PREFIX, timestamp, seq, CHECKPOINT_EXT));
            if !candidate.exists() {
                break candidate;
            }
            seq += 1;
        };

        let mut writer = csv::Writer::from_path(&path)?;
        if records.is_empty() {
            writer.write_record(["index", "title", "requirements", "url"])?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u32) -> PostingRecord {
        PostingRecord {
            index,
            title: format!("Offer {}", index),
            requirements: "Docker, AWS".to_string(),
            url: format!("https://www.pracuj.pl/praca/x,oferta,{}", index),
        }
    }

    #[test]
    fn test_no_checkpoint_resumes_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("data"));
        let latest = store.latest().unwrap();
        assert!(latest.is_none());
        assert_eq!(CheckpointStore::resume_index(latest.as_ref()).unwrap(), 1);
    }

    #[test]
    fn test_save_never_overwrites_and_latest_is_newest() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());

        let first = store.save(&[record(1), record(2)]).unwrap();
        let second = store.save(&[record(1), record(2), record(3)]).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.list().unwrap(), vec![second.clone(), first]);

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.path, second);
        assert_eq!(latest.records.len(), 3);
        assert_eq!(CheckpointStore::resume_index(Some(&latest)).unwrap(), 4);
    }

    #[test]
    fn test_latest_uses_name_order_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("grabbed_offers_2024_01_01_1200.csv"),
            "title,requirements,url,i\nA,x,u1,7\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("grabbed_offers_2024_03_05_0900.csv"),
            "title,requirements,url,i\nA,x,u1,7\nB,y,u2,12\n",
        )
        .unwrap();
        fs::write(dir.path().join("offer_urls.csv"), "offer_url\nu1\n").unwrap();
        fs::write(dir.path().join("grabbed_offers_notes.txt"), "ignored").unwrap();

        let store = CheckpointStore::new(dir.path());
        let latest = store.latest().unwrap().unwrap();
        assert!(latest.path.ends_with("grabbed_offers_2024_03_05_0900.csv"));
        assert_eq!(latest.max_index(), Some(12));
        assert_eq!(CheckpointStore::resume_index(Some(&latest)).unwrap(), 13);
    }

    #[test]
    fn test_max_index_checkpoint_cannot_resume() {
        let checkpoint = Checkpoint {
            path: PathBuf::from("grabbed_offers_full.csv"),
            records: vec![record(u32::MAX)],
        };
        assert!(matches!(
            CheckpointStore::resume_index(Some(&checkpoint)),
            Err(CrawlerError::Config(_))
        ));
    }

    #[test]
    fn test_empty_checkpoint_resumes_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path());
        store.save(&[]).unwrap();
        let latest = store.latest().unwrap().unwrap();
        assert!(latest.records.is_empty());
        assert_eq!(CheckpointStore::resume_index(Some(&latest)).unwrap(), 1);
    }
}
