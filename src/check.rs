use std::path::Path;

use reqwest::StatusCode;
use url::Url;

use crate::record::{LinkCheckResult, LinkOutcome};
use crate::request::HttpClient;
use crate::table::read_column;
use crate::{info_time, warn_time, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkReport {
    pub results: Vec<LinkCheckResult>,
    /// Everything that isn't `Ok`.
    pub failures: usize,
}

/// Absolute `http`/`https` URL with a host, or `None`.
pub fn parse_web_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    let web = matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty());
    web.then_some(url)
}

pub fn classify_status(status: StatusCode) -> LinkOutcome {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => LinkOutcome::NotFound,
        s if s.is_success() || s.is_redirection() => LinkOutcome::Ok,
        s => LinkOutcome::Error(format!("HTTP {}", s.as_u16())),
    }
}

pub async fn check_url(client: &HttpClient, raw: &str) -> LinkOutcome {
    let Some(url) = parse_web_url(raw) else {
        return LinkOutcome::Invalid;
    };
    match client.probe(url.as_str()).await {
        Ok(status) => classify_status(status),
        Err(e) => LinkOutcome::Error(e.to_string()),
    }
}

/// Probes every URL in order. Per-URL problems end up in the report, never as `Err`.
pub async fn check_links(client: &HttpClient, urls: &[String]) -> LinkReport {
    let mut report = LinkReport::default();
    for (i, url) in urls.iter().enumerate() {
        let outcome = check_url(client, url).await;
        if outcome != LinkOutcome::Ok {
            report.failures += 1;
            warn_time!("Row {}: {url} -> {outcome:?}", i + 1);
        }
        report.results.push(LinkCheckResult {
            row: i + 1,
            url: url.clone(),
            outcome,
        });
    }
    report
}

/// Re-reads `column` from a persisted table and checks it.
pub async fn check_table(client: &HttpClient, path: &Path, column: &str) -> Result<LinkReport> {
    let urls = read_column(path, column).await?;
    info_time!("Checking {} links from {} [{column}]", urls.len(), path.display());
    let report = check_links(client, &urls).await;
    info_time!(
        "{}: {} checked, {} failed",
        path.display(),
        report.results.len(),
        report.failures
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_absolute_web_urls_are_valid() {
        assert!(parse_web_url("https://pokemondb.net/pokedex/bulbasaur").is_some());
        assert!(parse_web_url(" http://127.0.0.1:8080/x ").is_some());
        assert!(parse_web_url("/pokedex/bulbasaur").is_none());
        assert!(parse_web_url("ftp://pokemondb.net/file").is_none());
        assert!(parse_web_url("mailto:someone@example.com").is_none());
        assert!(parse_web_url("").is_none());
        assert!(parse_web_url("not a url").is_none());
    }

    #[test]
    fn statuses_map_to_outcomes() {
        assert_eq!(classify_status(StatusCode::OK), LinkOutcome::Ok);
        assert_eq!(classify_status(StatusCode::MOVED_PERMANENTLY), LinkOutcome::Ok);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), LinkOutcome::NotFound);
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            LinkOutcome::Error("HTTP 500".into())
        );
    }

    #[tokio::test]
    async fn invalid_urls_never_hit_the_network() {
        let client = HttpClient::new(std::time::Duration::from_millis(200)).unwrap();
        let report = check_links(&client, &["nope".to_string(), "/relative".to_string()]).await;
        assert_eq!(report.failures, 2);
        assert!(report.results.iter().all(|r| r.outcome == LinkOutcome::Invalid));
        assert_eq!(report.results[1].row, 2);
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let client = HttpClient::new(std::time::Duration::from_secs(2)).unwrap();
        let url = "http://127.0.0.1:1/pokedex/bulbasaur";
        assert!(matches!(check_url(&client, url).await, LinkOutcome::Error(_)));

        let report = check_links(&client, &[url.to_string()]).await;
        assert_eq!(report.failures, 1);
        assert_eq!(report.results[0].row, 1);
        assert!(matches!(report.results[0].outcome, LinkOutcome::Error(_)));
    }
}
