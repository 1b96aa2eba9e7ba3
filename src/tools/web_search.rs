// ABOUTME: DuckDuckGoSearchTool - internet search for research agents.
// ABOUTME: Scrapes DuckDuckGo's HTML endpoint; failures come back as text.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::tool::{Tool, ToolResult, parse_params, single_string_schema};

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Tool that searches the internet for information on a topic.
pub struct DuckDuckGoSearchTool {
    client: reqwest::Client,
    max_results: usize,
}

impl Default for DuckDuckGoSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoSearchTool {
    /// Create a new search tool returning at most eight hits.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; crewline/0.1)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            max_results: 8,
        }
    }

    /// Change how many hits are returned.
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }

    /// Extract hits from DuckDuckGo result markup.
    fn parse_results(html: &str) -> Vec<SearchHit> {
        const ANCHOR: &str = "class=\"result__a\"";
        const SNIPPET: &str = "class=\"result__snippet\"";

        let mut hits = Vec::new();
        let mut rest = html;

        while let Some(pos) = rest.find(ANCHOR) {
            rest = &rest[pos + ANCHOR.len()..];
            // The snippet belongs to this hit only if it precedes the next anchor.
            let block_end = rest.find(ANCHOR).unwrap_or(rest.len());
            let block = &rest[..block_end];

            let url = attr_value(block, "href=\"")
                .map(Self::unwrap_redirect)
                .unwrap_or_default();
            let title = element_text(block, "</a>").unwrap_or_default();
            let snippet = block
                .find(SNIPPET)
                .and_then(|i| element_text(&block[i..], "</"))
                .unwrap_or_default();

            if !url.is_empty() && !title.is_empty() {
                hits.push(SearchHit {
                    title,
                    url,
                    snippet,
                });
            }
        }

        hits
    }

    /// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>&...`.
    fn unwrap_redirect(raw: &str) -> String {
        match raw.split_once("uddg=") {
            Some((_, encoded)) => {
                let encoded = encoded.split('&').next().unwrap_or(encoded);
                urlencoding::decode(encoded)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| encoded.to_string())
            }
            None => raw.to_string(),
        }
    }

    fn format_hits(query: &str, hits: &[SearchHit]) -> String {
        let mut out = format!("Found {} results for \"{}\":\n\n", hits.len(), query);
        for (i, hit) in hits.iter().enumerate() {
            let snippet = if hit.snippet.is_empty() {
                "(no snippet)"
            } else {
                &hit.snippet
            };
            out.push_str(&format!(
                "{}. {}\n   {}\n   {}\n\n",
                i + 1,
                hit.title,
                hit.url,
                snippet
            ));
        }
        out
    }
}

/// Value of the first `prefix...\"` attribute in `block`.
fn attr_value<'a>(block: &'a str, prefix: &str) -> Option<&'a str> {
    let start = block.find(prefix)? + prefix.len();
    let len = block[start..].find('"')?;
    Some(&block[start..start + len])
}

/// Text between the end of the current tag and `terminator`, tags stripped.
fn element_text(block: &str, terminator: &str) -> Option<String> {
    let after = &block[block.find('>')? + 1..];
    let end = after.find(terminator)?;
    Some(strip_tags(&after[..end]).trim().to_string())
}

fn strip_tags(html: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&#x27;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[async_trait]
impl Tool for DuckDuckGoSearchTool {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the internet for information on a given topic"
    }

    fn schema(&self) -> serde_json::Value {
        single_string_schema("search_query", "What to search for")
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            search_query: String,
        }
        let params: Params = parse_params(params)?;

        let response = match self
            .client
            .get(DDG_HTML_URL)
            .query(&[("q", params.search_query.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return Ok(ToolResult::error(format!("Search failed: {}", e))),
        };

        if !response.status().is_success() {
            return Ok(ToolResult::error(format!(
                "Search failed with status: {}",
                response.status()
            )));
        }

        let html = match response.text().await {
            Ok(text) => text,
            Err(e) => return Ok(ToolResult::error(format!("Failed to read response: {}", e))),
        };

        let mut hits = Self::parse_results(&html);
        hits.truncate(self.max_results);

        if hits.is_empty() {
            return Ok(ToolResult::text("No results found."));
        }

        Ok(ToolResult::text(Self::format_hits(&params.search_query, &hits))
            .with_metadata("results", hits.len()))
    }
}
