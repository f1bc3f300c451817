use std::fs::{self, File};
use std::path::Path;
use log::{info, error};
use serde::{Deserialize, Serialize};

use crate::error::CrawlerError;
use crate::link_collector::PostingLink;

/// One row of the links file handed from the listing stage to the offer stage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OfferUrlRow {
    #[serde(rename = "offer_url", alias = "url", alias = "URL")]
    pub offer_url: String,
}

pub fn save_links<P: AsRef<Path>>(path: P, links: &[PostingLink]) -> Result<(), CrawlerError> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path_ref)?;
    for link in links {
        writer.serialize(OfferUrlRow {
            offer_url: link.canonical_url.clone(),
        })?;
    }
    // Header only, so the file still reads back as an empty list.
    if links.is_empty() {
        writer.write_record(["offer_url"])?;
    }
    writer.flush()?;

    info!("Saved {} offer URLs to {:?}", links.len(), path_ref);
    Ok(())
}

pub fn load_links<P: AsRef<Path>>(path: P) -> Result<Vec<String>, CrawlerError> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        error!("Links file {:?} does not exist. Run the collect stage first.", path_ref);
    }

    let file = File::open(path_ref)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut urls = Vec::new();
    for result in rdr.deserialize::<OfferUrlRow>() {
        let row = result?;
        if !row.offer_url.is_empty() {
            urls.push(row.offer_url);
        }
    }
    info!("Loaded {} offer URLs from {:?}", urls.len(), path_ref);
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(id: &str) -> PostingLink {
        PostingLink {
            identifier: id.to_string(),
            canonical_url: format!("https://www.pracuj.pl/praca/x,oferta,{}", id),
        }
    }

    #[test]
    fn test_links_file_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offer_urls.csv");
        save_links(&path, &[link("222"), link("111")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("offer_url\n"));

        let urls = load_links(&path).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.pracuj.pl/praca/x,oferta,222",
                "https://www.pracuj.pl/praca/x,oferta,111",
            ]
        );
    }

    #[test]
    fn test_empty_links_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("offer_urls.csv");
        save_links(&path, &[]).unwrap();
        assert!(load_links(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_links_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_links(dir.path().join("absent.csv")),
            Err(CrawlerError::Io(_))
        ));
    }
}
