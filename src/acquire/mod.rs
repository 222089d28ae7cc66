//! Rules document acquisition
//!
//! Scrapes the Comprehensive Rules landing page for plaintext document
//! links, picks the newest one and caches it on disk by file name.

use bytes::Bytes;
use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::{JudgeError, Result};

/// Default landing page listing the rules documents
pub const RULES_URL: &str = "https://magic.wizards.com/en/rules";

fn dated_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d{8})\.txt$").expect("date pattern is a valid regex"))
}

/// A downloaded (or cached) rules document
#[derive(Debug, Clone)]
pub struct RulesDocument {
    pub url: Url,
    pub path: PathBuf,
    pub file_name: String,
    /// False when the file was already on disk
    pub downloaded: bool,
}

impl RulesDocument {
    /// Source document id: file name without the `.txt` extension
    pub fn source_doc(&self) -> String {
        source_doc_id(&self.file_name)
    }
}

/// Strip the `.txt` extension from a document file name
pub fn source_doc_id(file_name: &str) -> String {
    file_name.replace(".txt", "")
}

/// Collect `.txt` links from a landing page, resolved against `base`, in document order
pub fn find_rules_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| href.to_lowercase().ends_with(".txt"))
        .filter_map(|href| base.join(href).ok())
        .collect()
}

/// Publication date encoded as `YYYYMMDD` right before `.txt`
pub fn link_date(url: &Url) -> Option<NaiveDate> {
    let name = file_name_from_url(url)?;
    let caps = dated_name_pattern().captures(&name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()
}

/// Choose the newest dated link; fall back to the first link when none is dated
pub fn select_latest(links: &[Url]) -> Option<&Url> {
    let mut best: Option<(&Url, NaiveDate)> = None;
    for link in links {
        if let Some(date) = link_date(link) {
            if best.map_or(true, |(_, current)| date > current) {
                best = Some((link, date));
            }
        }
    }
    best.map(|(link, _)| link).or_else(|| links.first())
}

/// Last path segment of a URL, percent-decoded
///
/// Segments that decode to a path separator or a dot entry are rejected so
/// the name can be joined onto the download directory as-is.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let name = percent_decode_str(segment).decode_utf8_lossy();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return None;
    }
    Some(name.into_owned())
}

/// HTTP side of document acquisition
pub struct DocumentAcquirer {
    client: Client,
    rules_url: String,
}

impl DocumentAcquirer {
    pub fn new(rules_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            rules_url: rules_url.into(),
        }
    }

    /// Fetch the landing page and return the selected document link
    pub async fn latest_rules_url(&self) -> Result<Url> {
        let base = Url::parse(&self.rules_url)
            .map_err(|e| JudgeError::ConfigError(format!("Invalid rules URL {}: {}", self.rules_url, e)))?;
        let html = self.get(base.clone()).await?.text().await?;

        let links = find_rules_links(&html, &base);
        tracing::debug!(count = links.len(), "found plaintext rule links");
        select_latest(&links)
            .cloned()
            .ok_or_else(|| JudgeError::NoLinkFound { url: self.rules_url.clone() })
    }

    /// Download `url` into `download_dir` unless a file of the same name exists
    pub async fn download_if_new(&self, url: &Url, download_dir: &Path) -> Result<RulesDocument> {
        let file_name = file_name_from_url(url)
            .ok_or_else(|| JudgeError::Generic(format!("Cannot derive file name from {}", url)))?;
        let path = download_dir.join(&file_name);

        if path.exists() {
            tracing::info!(file = %file_name, "already downloaded");
            return Ok(RulesDocument {
                url: url.clone(),
                path,
                file_name,
                downloaded: false,
            });
        }

        tracing::info!(file = %file_name, "downloading");
        let body: Bytes = self.get(url.clone()).await?.bytes().await?;
        std::fs::create_dir_all(download_dir)?;
        std::fs::write(&path, &body)?;

        Ok(RulesDocument {
            url: url.clone(),
            path,
            file_name,
            downloaded: true,
        })
    }

    /// Find the newest document and make sure it is on disk
    pub async fn acquire(&self, download_dir: &Path) -> Result<RulesDocument> {
        let url = self.latest_rules_url().await?;
        self.download_if_new(&url, download_dir).await
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(JudgeError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl Default for DocumentAcquirer {
    fn default() -> Self {
        Self::new(RULES_URL)
    }
}
