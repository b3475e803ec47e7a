//! HTTP document fetching and HTML text extraction.

use async_trait::async_trait;
use causerie_core::{DocumentFetcher, FetchedDocument, RetrievalError};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

/// Fetches pages over HTTP and strips them down to plain text.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RetrievalError::Fetch(format!("build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, RetrievalError> {
        debug!(url, "Fetching document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RetrievalError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Fetch(format!("HTTP {status} for {url}")));
        }

        let html = response
            .text()
            .await
            .map_err(|e| RetrievalError::Fetch(e.to_string()))?;

        Ok(FetchedDocument {
            source_url: url.to_string(),
            text: html_to_text(&html),
        })
    }
}

/// Strip an HTML document down to its visible text: script/style blocks
/// removed, tags dropped, common entities decoded, whitespace collapsed.
pub fn html_to_text(html: &str) -> String {
    let without_blocks = strip_block(&strip_block(html, "script"), "style");

    let mut text = String::with_capacity(without_blocks.len() / 2);
    let mut in_tag = false;
    for c in without_blocks.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            c if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `<tag …>…</tag>` blocks wholesale (ASCII case-insensitive).
fn strip_block(html: &str, tag: &str) -> String {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = find_ignore_ascii_case(html, pos, &open) {
        out.push_str(&html[pos..start]);
        match find_ignore_ascii_case(html, start, &close) {
            Some(end) => pos = end + close.len(),
            None => return out, // unterminated block, drop the rest
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Byte-offset of `needle` in `haystack[from..]`, ignoring ASCII case.
/// Safe on multi-byte input: matches always start at the needle's ASCII
/// bytes, so returned offsets are char boundaries.
fn find_ignore_ascii_case(haystack: &str, from: usize, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let nee = needle.as_bytes();
    if nee.is_empty() || hay.len() < from + nee.len() {
        return None;
    }
    (from..=hay.len() - nee.len())
        .find(|&i| hay[i..i + nee.len()].eq_ignore_ascii_case(nee))
}
