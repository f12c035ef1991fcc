//! HTTP fetcher for the prefixes announced by an Autonomous System.
//!
//! Prefixes come from the RIPEstat `announced-prefixes` data call, which
//! returns every IPv4 and IPv6 prefix seen in BGP for the ASN.

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::model::NetworkBlock;

/// RIPEstat announced-prefixes endpoint
pub const RIPESTAT_URL: &str = "https://stat.ripe.net/data/announced-prefixes/data.json";

const TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per request
pub const DEFAULT_RETRIES: u32 = 3;

const RETRY_DELAY_MS: u64 = 2000;

/// Maximum size of one response (10 MB)
/// Large transit ASNs return a few hundred KB, so 10 MB provides ample margin
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// Maximum concurrent requests to the data API
const MAX_CONCURRENT_REQUESTS: usize = 4;

/// Result of fetching the prefixes of one ASN
#[derive(Debug)]
pub struct FetchResult {
    pub asn: u32,
    pub prefixes: Vec<NetworkBlock>,
    /// Entries in the response that were not valid CIDR blocks
    pub skipped: usize,
}

#[derive(Deserialize)]
struct AnnouncedPrefixes {
    data: AnnouncedData,
}

#[derive(Deserialize)]
struct AnnouncedData {
    #[serde(default)]
    prefixes: Vec<AnnouncedPrefix>,
}

#[derive(Deserialize)]
struct AnnouncedPrefix {
    prefix: String,
}

/// HTTP client for ASN prefix lookups
pub struct Fetcher {
    client: Client,
    base_url: String,
    retries: u32,
    retry_delay: Duration,
    max_response_size: usize,
}

impl Fetcher {
    /// Create a new fetcher against the public RIPEstat API
    pub fn new(retries: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("ccdroutes/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: RIPESTAT_URL.to_string(),
            retries: retries.max(1),
            retry_delay: Duration::from_millis(RETRY_DELAY_MS),
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Point the fetcher at another endpoint with the same response format
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base delay between attempts; doubles after every failure
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Largest response body accepted, in bytes
    pub fn with_max_response_size(mut self, max: usize) -> Self {
        self.max_response_size = max;
        self
    }

    /// Fetch the announced prefixes of one ASN
    pub async fn fetch_asn(&self, asn: u32) -> Result<FetchResult> {
        info!("Fetching prefixes of AS{}...", asn);

        let url = format!("{}?resource=AS{}", self.base_url, asn);
        let content = self
            .fetch_with_retry(&url)
            .await
            .with_context(|| format!("Failed to fetch prefixes of AS{}", asn))?;

        let (prefixes, skipped) = parse_announced_prefixes(&content)
            .with_context(|| format!("Failed to parse prefixes of AS{}", asn))?;

        info!("Fetched AS{} - {} prefixes", asn, prefixes.len());

        Ok(FetchResult {
            asn,
            prefixes,
            skipped,
        })
    }

    /// Fetch several ASNs concurrently with limited parallelism
    ///
    /// Results come back in input order.
    pub async fn fetch_asns(&self, asns: &[u32]) -> Vec<Result<FetchResult>> {
        use futures::stream::{self, StreamExt};

        stream::iter(asns.iter().map(|&asn| self.fetch_asn(asn)))
            .buffered(MAX_CONCURRENT_REQUESTS)
            .collect()
            .await
    }

    /// Fetch content with retry logic and size validation
    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..self.retries {
            if attempt > 0 {
                let delay = self.retry_delay * (1 << (attempt - 1).min(16));
                debug!("Retry {} after {:?} for {}", attempt, delay, url);
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        if let Some(content_length) = response.content_length() {
                            if content_length > self.max_response_size as u64 {
                                return Err(anyhow::anyhow!(
                                    "Response too large: {} bytes (max: {} bytes)",
                                    content_length,
                                    self.max_response_size
                                ));
                            }
                        }

                        let body = self.read_capped(response).await?;
                        return Ok(body);
                    }
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                }
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }

    /// Read the body chunk by chunk, stopping as soon as it exceeds the cap
    async fn read_capped(&self, mut response: Response) -> Result<String> {
        let mut body = Vec::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read response body")?
        {
            if body.len() + chunk.len() > self.max_response_size {
                return Err(anyhow::anyhow!(
                    "Downloaded content too large: over {} bytes",
                    self.max_response_size
                ));
            }
            body.extend_from_slice(&chunk);
        }

        String::from_utf8(body).context("Response body is not UTF-8")
    }
}

/// Parse a RIPEstat announced-prefixes response.
///
/// Returns the valid prefixes and the number of entries that were skipped.
pub fn parse_announced_prefixes(content: &str) -> Result<(Vec<NetworkBlock>, usize)> {
    let response: AnnouncedPrefixes =
        serde_json::from_str(content).context("Unexpected response format")?;

    let mut prefixes = Vec::with_capacity(response.data.prefixes.len());
    let mut skipped = 0;

    for entry in response.data.prefixes {
        match entry.prefix.parse::<NetworkBlock>() {
            Ok(block) => prefixes.push(block),
            Err(e) => {
                warn!("Skipping prefix {:?}: {}", entry.prefix, e);
                skipped += 1;
            }
        }
    }

    Ok((prefixes, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SAMPLE: &str = r#"{
        "status": "ok",
        "data": {
            "resource": "64496",
            "prefixes": [
                {"prefix": "192.0.2.0/25", "timelines": []},
                {"prefix": "192.0.2.128/25", "timelines": []},
                {"prefix": "2001:db8::/32", "timelines": []},
                {"prefix": "garbage", "timelines": []}
            ]
        }
    }"#;

    /// Serve one canned HTTP response per connection, in order.
    async fn serve(responses: Vec<(u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let reply = format!(
                    "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        format!("http://{}/data.json", addr)
    }

    /// Serve one chunked response with no content-length.
    async fn serve_chunked(chunks: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let mut reply = String::from(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            );
            for chunk in chunks {
                reply.push_str(&format!("{:x}\r\n{}\r\n", chunk.len(), chunk));
            }
            reply.push_str("0\r\n\r\n");
            // The client may hang up early once it hits the cap
            socket.write_all(reply.as_bytes()).await.ok();
            socket.shutdown().await.ok();
        });

        format!("http://{}/data.json", addr)
    }

    #[test]
    fn test_parse_announced_prefixes() {
        let (prefixes, skipped) = parse_announced_prefixes(SAMPLE).unwrap();
        assert_eq!(prefixes.len(), 3);
        assert_eq!(skipped, 1);
        assert_eq!(prefixes[2].to_string(), "2001:db8::/32");
    }

    #[test]
    fn test_parse_announced_prefixes_empty() {
        let (prefixes, skipped) =
            parse_announced_prefixes(r#"{"data": {"prefixes": []}}"#).unwrap();
        assert!(prefixes.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_parse_announced_prefixes_missing_list() {
        let (prefixes, _) = parse_announced_prefixes(r#"{"data": {}}"#).unwrap();
        assert!(prefixes.is_empty());
    }

    #[test]
    fn test_parse_announced_prefixes_rejects_other_json() {
        assert!(parse_announced_prefixes(r#"{"messages": []}"#).is_err());
        assert!(parse_announced_prefixes("<html>").is_err());
    }

    #[tokio::test]
    async fn test_fetch_asn() {
        let url = serve(vec![(200, SAMPLE.to_string())]).await;
        let fetcher = Fetcher::new(1).unwrap().with_base_url(url);

        let result = fetcher.fetch_asn(64496).await.unwrap();
        assert_eq!(result.asn, 64496);
        assert_eq!(result.prefixes.len(), 3);
        assert_eq!(result.skipped, 1);
    }

    #[tokio::test]
    async fn test_fetch_asn_retries_server_errors() {
        let url = serve(vec![(503, String::new()), (200, SAMPLE.to_string())]).await;
        let fetcher = Fetcher::new(3)
            .unwrap()
            .with_base_url(url)
            .with_retry_delay(Duration::from_millis(10));

        let result = fetcher.fetch_asn(64496).await.unwrap();
        assert_eq!(result.prefixes.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_asn_gives_up() {
        let url = serve(vec![(500, String::new()), (500, String::new())]).await;
        let fetcher = Fetcher::new(2)
            .unwrap()
            .with_base_url(url)
            .with_retry_delay(Duration::from_millis(10));

        let err = fetcher.fetch_asn(64496).await.unwrap_err();
        assert!(format!("{:#}", err).contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_fetch_asn_reads_chunked_body() {
        let (head, tail) = SAMPLE.split_at(40);
        let url = serve_chunked(vec![head.to_string(), tail.to_string()]).await;
        let fetcher = Fetcher::new(1).unwrap().with_base_url(url);

        let result = fetcher.fetch_asn(64496).await.unwrap();
        assert_eq!(result.prefixes.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_asn_caps_chunked_body() {
        let url = serve_chunked(vec!["x".repeat(64); 8]).await;
        let fetcher = Fetcher::new(1)
            .unwrap()
            .with_base_url(url)
            .with_max_response_size(100);

        let err = fetcher.fetch_asn(64496).await.unwrap_err();
        assert!(format!("{:#}", err).contains("too large"));
    }
}
