// src/specs/listing.rs
//! Event forum listing: `viewforum.php?forum_id=4&rowstart=<offset>`.
//!
//! Each listing row spans a fixed number of lines. Pinned rows are counted but
//! never followed; the walk stops at the first page without any row.

use std::collections::VecDeque;

use thiserror::Error;

use crate::config::consts::*;
use crate::config::options::CrawlOptions;
use crate::core::html::{find_line, quoted_after};
use crate::core::{Fetch, FetchError};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("listing page {url} has no start marker")]
    MissingStart { url: String },
    #[error("listing page {url} ends before its end marker")]
    MissingEnd { url: String },
    #[error("listing page {url}: unterminated thread link on line {line}")]
    BadLink { url: String, line: usize },
}

/// What one listing page holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Rows seen, pinned ones included.
    pub rows: usize,
    pub threads: Vec<String>,
}

pub fn parse_page(lines: &[String], server_path: &str, url: &str) -> Result<ListingPage, ListingError> {
    let start = find_line(lines, 0, LISTING_START).ok_or_else(|| ListingError::MissingStart { url: s!(url) })?;

    let mut page = ListingPage::default();
    let mut i = start;
    loop {
        i += 1;
        let line = lines.get(i).ok_or_else(|| ListingError::MissingEnd { url: s!(url) })?;
        if line.contains(PINNED_MARKER) {
            page.rows += 1;
            i += PINNED_SKIP;
        } else if line.contains(THREAD_LINK) {
            page.rows += 1;
            let loc = quoted_after(line, THREAD_LINK, '\'')
                .ok_or_else(|| ListingError::BadLink { url: s!(url), line: i })?;
            page.threads.push(join!(server_path, loc));
            i += THREAD_SKIP;
        }
        if line.contains(LISTING_END) {
            return Ok(page);
        }
    }
}

/// Lazy walk over all listing pages, yielding thread locations in listing order.
pub struct ThreadWalker<'f, F: Fetch + ?Sized> {
    fetch: &'f mut F,
    listing_url: String,
    server_path: String,
    page_size: usize,
    offset: usize,
    queue: VecDeque<String>,
    done: bool,
}

impl<'f, F: Fetch + ?Sized> ThreadWalker<'f, F> {
    pub fn new(fetch: &'f mut F, opts: &CrawlOptions) -> Self {
        Self {
            fetch,
            listing_url: opts.listing_url(),
            server_path: opts.server_path.clone(),
            page_size: opts.page_size,
            offset: 0,
            queue: VecDeque::new(),
            done: false,
        }
    }

    /// Start over from the first page.
    pub fn restart(&mut self) {
        self.offset = 0;
        self.queue.clear();
        self.done = false;
    }

    fn next_page(&mut self) -> Result<(), ListingError> {
        let url = format!("{}{}{}", self.listing_url, ROWSTART_PARAM, self.offset);
        logd!("Listing page {url}");
        let lines = self.fetch.fetch_lines(&url)?;
        let page = parse_page(&lines, &self.server_path, &url)?;

        self.offset += self.page_size;
        if page.rows == 0 {
            self.done = true;
        }
        self.queue.extend(page.threads);
        Ok(())
    }
}

impl<F: Fetch + ?Sized> Iterator for ThreadWalker<'_, F> {
    type Item = Result<String, ListingError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(loc) = self.queue.pop_front() {
                return Some(Ok(loc));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.next_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::config::consts::*;

    /// A listing page with `pinned` pinned rows followed by one row per id.
    pub fn listing(pinned: usize, ids: &[u32]) -> String {
        let mut out = vec![s!("<html><body>"), s!(LISTING_START), s!("<table class='tbl-border forum-table'>")];
        for _ in 0..pinned {
            out.push(s!("<td class='tbl2'><img src='sticky.gif' alt='Thema gepinnt' /></td>"));
            out.extend((0..PINNED_SKIP).map(|k| format!("<td>pinned {k}</td>")));
        }
        for id in ids {
            out.push(format!(
                "<td class='tbl1'><a href='viewthread.php?thread_id={id}' class='forum_thread'>Event {id}</a></td>"
            ));
            out.extend((0..THREAD_SKIP).map(|k| format!("<td>{k}</td>")));
        }
        out.push(s!("</table>"));
        out.push(s!(LISTING_END));
        out.push(s!("</body></html>"));
        out.join("\n")
    }

    pub fn page_url(offset: usize) -> String {
        format!("{SERVER_PATH}{LISTING_PATH}{ROWSTART_PARAM}{offset}")
    }
}
