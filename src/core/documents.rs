use std::collections::HashSet;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{error, info};

use crate::core::FetchOutcome;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Page chrome that never contains specification text.
static STRIPPED_ELEMENTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, nav, footer, header").unwrap());

pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Fetches and extracts text content from a comma-separated string of
    /// URLs. Each URL is processed independently; a failure is recorded and
    /// the remaining URLs are still fetched.
    pub async fn fetch(&self, urls_str: &str) -> FetchOutcome {
        if urls_str.is_empty() {
            info!("No external references provided.");
            return FetchOutcome::new("No external references were provided.");
        }

        let urls: Vec<&str> = urls_str.split(',').map(str::trim).collect();
        info!(
            "Fetching content from {} external references...",
            urls.len()
        );

        let mut outcome = FetchOutcome::default();
        for url in urls {
            if url.is_empty() {
                continue;
            }
            info!("Processing URL: {}", url);
            match self.fetch_one(url).await {
                Ok(content) => {
                    outcome.content.push_str(&format!(
                        "--- Start of content from {} ---\n{}\n--- End of content from {} ---\n\n",
                        url, content, url
                    ));
                    info!("Successfully processed URL: {}", url);
                }
                Err(err) => {
                    let message = format!("Error processing document '{}': {:#}", url, err);
                    error!("{}", message);
                    outcome.push_error(message);
                }
            }
        }

        outcome
    }

    async fn fetch_one(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        if is_pdf(&content_type, url) {
            extract_pdf_text(&body)
        } else {
            Ok(extract_html_text(&String::from_utf8_lossy(&body)))
        }
    }
}

/// The URL suffix wins over the declared content type: plenty of servers
/// ship PDFs as `application/octet-stream`.
fn is_pdf(content_type: &str, url: &str) -> bool {
    content_type.contains("application/pdf") || url.to_lowercase().ends_with(".pdf")
}

fn extract_pdf_text(body: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(body).context("Failed to extract PDF text")
}

/// Extracts visible text from an HTML document: chrome subtrees are dropped,
/// every line is trimmed, double-space runs are split, and empty chunks are
/// discarded.
fn extract_html_text(body: &str) -> String {
    let document = Html::parse_document(body);

    let mut stripped = HashSet::new();
    for element in document.select(&STRIPPED_ELEMENTS) {
        for node in element.descendants() {
            stripped.insert(node.id());
        }
    }

    let mut text = String::new();
    for node in document.root_element().descendants() {
        if stripped.contains(&node.id()) {
            continue;
        }
        if let Some(fragment) = node.value().as_text() {
            text.push_str(fragment);
        }
    }

    let mut chunks = Vec::new();
    for line in text.lines() {
        for chunk in line.trim().split("  ") {
            if !chunk.is_empty() {
                chunks.push(chunk);
            }
        }
    }
    chunks.join("\n")
}
