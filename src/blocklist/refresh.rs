//! Periodic fetch-and-merge of public disposable-domain lists
//! (`with-refresh` feature).
//!
//! Each source is fetched independently; a failing source is logged and
//! skipped. The merged set only replaces the live one when at least one
//! source succeeded, so a network outage never empties the blocklist.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{info, warn};

use super::BlocklistStore;

/// Public lists merged into the store, in fetch order.
pub const LIST_URLS: [&str; 3] = [
    "https://raw.githubusercontent.com/disposable-email-domains/disposable-email-domains/master/disposable_email_blocklist.conf",
    "https://raw.githubusercontent.com/ivolo/disposable-email-domains/master/index.json",
    "https://raw.githubusercontent.com/wesbos/burner-email-providers/master/emails.txt",
];

/// Default interval between background refreshes (matches the original
/// 24-hour cadence).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("building HTTP client failed: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("all blocklist sources failed")]
    AllSourcesFailed,
}

/// Fetches every source and swaps the merged set into `store`. Returns the
/// total number of domains after the merge.
pub fn refresh(store: &BlocklistStore) -> Result<usize, RefreshError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|source| RefreshError::Client { source })?;
    refresh_with(store, &client)
}

pub fn refresh_with(store: &BlocklistStore, client: &Client) -> Result<usize, RefreshError> {
    let mut merged: HashSet<String> = HashSet::new();
    let mut sources_ok = 0usize;

    for url in LIST_URLS {
        match fetch_list(client, url) {
            Ok(domains) => {
                sources_ok += 1;
                merged.extend(domains);
            }
            Err(err) => warn!(url, error = %err, "skipping blocklist source"),
        }
    }

    if sources_ok == 0 {
        return Err(RefreshError::AllSourcesFailed);
    }

    let total = merged.len();
    store.replace(merged);
    info!(total, sources_ok, "disposable blocklist refreshed");
    Ok(total)
}

/// Spawns a background thread that refreshes `store` every `interval`.
/// The first refresh happens after one full interval; callers wanting a
/// warm start run [`refresh`] once before spawning.
pub fn spawn_periodic(store: BlocklistStore, interval: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if let Err(err) = refresh(&store) {
            warn!(error = %err, "periodic blocklist refresh failed");
        }
    })
}

fn fetch_list(client: &Client, url: &str) -> Result<Vec<String>, reqwest::Error> {
    let body = client.get(url).send()?.error_for_status()?.text()?;
    Ok(parse_body(&body))
}

/// Sources publish either plain text (one domain per line) or a JSON string
/// array; both shapes are normalized to lowercase domains.
fn parse_body(body: &str) -> Vec<String> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('[') {
        if let Ok(domains) = serde_json::from_str::<Vec<String>>(trimmed) {
            return domains
                .into_iter()
                .map(|domain| domain.trim().to_ascii_lowercase())
                .filter(|domain| !domain.is_empty())
                .collect();
        }
    }
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_line_oriented_body() {
        let domains = parse_body("Mailinator.com\n\n  tempmail.dev\n");
        assert_eq!(domains, vec!["mailinator.com", "tempmail.dev"]);
    }

    #[test]
    fn parses_json_array_body() {
        let domains = parse_body("[\"Burner.io\", \" temp.example \", \"\"]");
        assert_eq!(domains, vec!["burner.io", "temp.example"]);
    }

    #[test]
    fn malformed_json_falls_back_to_lines() {
        let domains = parse_body("[not-json\nreal.example");
        assert_eq!(domains, vec!["[not-json", "real.example"]);
    }
}
