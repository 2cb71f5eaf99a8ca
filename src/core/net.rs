// src/core/net.rs

// HTTP/1.0 GET over TCP (std-only), split into lines.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::config::consts::{REQUEST_PAUSE_MS, TIMEOUT_SECS};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("I/O error while fetching {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {status} {url}")]
    Status { url: String, status: String },
    #[error("Malformed HTTP response from {0}")]
    Malformed(String),
    #[error("Unsupported location: {0}")]
    BadUrl(String),
}

/// Page-fetch collaborator: location in, text lines out.
pub trait Fetch {
    fn fetch_lines(&mut self, url: &str) -> Result<Vec<String>, FetchError>;
}

/// Blocking fetcher with a fixed courtesy pause before every request after the first.
pub struct HttpFetcher {
    pause: Duration,
    first: bool,
}

impl HttpFetcher {
    pub fn new(pause_ms: u64) -> Self {
        Self { pause: Duration::from_millis(pause_ms), first: true }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(REQUEST_PAUSE_MS)
    }
}

impl Fetch for HttpFetcher {
    fn fetch_lines(&mut self, url: &str) -> Result<Vec<String>, FetchError> {
        if !self.first {
            thread::sleep(self.pause);
        }
        self.first = false;
        let body = http_get(url)?;
        Ok(body.lines().map(str::to_owned).collect())
    }
}

/// Split `http://host[:port]/path` into its parts.
fn split_url(url: &str) -> Option<(&str, u16, &str)> {
    let rest = url.strip_prefix("http://")?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    match authority.split_once(':') {
        Some((host, port)) => Some((host, port.parse().ok()?, path)),
        None => Some((authority, 80, path)),
    }
}

pub fn http_get(url: &str) -> Result<String, FetchError> {
    let (host, port, path) = split_url(url).ok_or_else(|| FetchError::BadUrl(s!(url)))?;
    let io = |source: std::io::Error| FetchError::Io { url: s!(url), source };

    let mut s = TcpStream::connect((host, port)).map_err(io)?;
    s.set_read_timeout(Some(Duration::from_secs(TIMEOUT_SECS))).map_err(io)?;
    s.set_write_timeout(Some(Duration::from_secs(TIMEOUT_SECS))).map_err(io)?;

    let req = format!(
        "GET {} HTTP/1.0\r\nHost: {}\r\nUser-Agent: gw_crawl/1.3\r\nConnection: close\r\n\r\n",
        path, host
    );
    s.write_all(req.as_bytes()).map_err(io)?;
    s.flush().map_err(io)?;

    let mut buf = Vec::new();
    s.read_to_end(&mut buf).map_err(io)?;
    let resp = String::from_utf8_lossy(&buf);

    let status = resp.split("\r\n").next().unwrap_or("");
    if !status.contains("200") {
        return Err(FetchError::Status { url: s!(url), status: s!(status) });
    }
    let body_idx = resp.find("\r\n\r\n").ok_or_else(|| FetchError::Malformed(s!(url)))? + 4;
    Ok(resp[body_idx..].to_string())
}

/// In-memory pages keyed by full location. Records every request in order.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, Vec<String>>,
    requests: Vec<String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, html: &str) {
        self.pages.insert(url.into(), html.lines().map(str::to_owned).collect());
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}

impl Fetch for MemoryFetcher {
    fn fetch_lines(&mut self, url: &str) -> Result<Vec<String>, FetchError> {
        self.requests.push(s!(url));
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status { url: s!(url), status: s!("HTTP/1.0 404 Not Found") })
    }
}
