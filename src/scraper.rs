use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use scraper::Html;
use log::warn;

use crate::config::CrawlerConfig;
use crate::error::{CrawlerError, FetchFailure};

/// Source of parsed pages. `Scraper` is the HTTP one; tests plug in fixed pages.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<Html, FetchFailure>;
}

pub struct Scraper {
    client: Client,
    user_agent: String,
}

impl Scraper {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlerError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("pl-PL,pl;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Scraper {
            client,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Body is only read for a 200; other statuses come back without downloading it.
    fn visit_page(&self, url: &str) -> Result<Result<String, StatusCode>, reqwest::Error> {
        // Default reqwest identity gets blocked, so always send the browser one.
        let resp = self.client.get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Ok(Err(status));
        }
        Ok(Ok(resp.text()?))
    }
}

impl PageFetcher for Scraper {
    fn fetch(&self, url: &str) -> Result<Html, FetchFailure> {
        let failure = match self.visit_page(url) {
            Ok(Ok(body)) => return Ok(Html::parse_document(&body)),
            Ok(Err(status)) => FetchFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            },
            Err(source) => FetchFailure::Transport {
                url: url.to_string(),
                source,
            },
        };

        warn!("{}", failure);
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answers one request with a canned response and hands back the raw request head.
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/offer", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (url, handle)
    }

    fn scraper() -> Scraper {
        let config = CrawlerConfig {
            user_agent: "offer-test-agent/1.0".to_string(),
            ..CrawlerConfig::default()
        };
        Scraper::new(&config).unwrap()
    }

    #[test]
    fn test_ok_page_is_parsed_and_sends_user_agent() {
        let (url, server) = serve_once(
            "200 OK",
            "<html><head><title>DevOps</title></head><body></body></html>",
        );

        let page = scraper().fetch(&url).unwrap();
        let title = Selector::parse("title").unwrap();
        let text: String = page.select(&title).next().unwrap().text().collect();
        assert_eq!(text, "DevOps");

        let request = server.join().unwrap().to_lowercase();
        assert!(request.starts_with("get /offer "));
        assert!(request.contains("user-agent: offer-test-agent/1.0"));
    }

    #[test]
    fn test_non_ok_status_is_a_status_failure() {
        for (status_line, code) in [("404 Not Found", 404u16), ("204 No Content", 204)] {
            let body = if code == 204 { "" } else { "<html>gone</html>" };
            let (url, server) = serve_once(status_line, body);

            match scraper().fetch(&url) {
                Err(FetchFailure::Status { url: failed, status }) => {
                    assert_eq!(status, code);
                    assert_eq!(failed, url);
                }
                other => panic!("expected status failure for {}, got {:?}", code, other.map(|_| ())),
            }
            server.join().unwrap();
        }
    }

    #[test]
    fn test_refused_connection_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/offer", listener.local_addr().unwrap());
        drop(listener);

        let failure = scraper().fetch(&url).err().unwrap();
        assert!(matches!(failure, FetchFailure::Transport { .. }));
        assert_eq!(failure.url(), url);
    }
}
