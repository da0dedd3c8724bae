use std::path::{Path, PathBuf};

use tokio::{fs, fs::File, io::AsyncWriteExt};

use crate::check::parse_web_url;
use crate::config::DEFAULT_IMAGE_EXT;
use crate::record::DownloadOutcome;
use crate::request::HttpClient;
use crate::{info_time, warn_time, Result};

/// Longest suffix (without the dot) still taken as a file extension.
const MAX_EXT_LEN: usize = 5;

/// `.ext` from the URL path's last segment, `.jpg` when missing or implausible.
pub fn infer_extension(url: &str) -> String {
    let path = parse_web_url(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|| url.split(['?', '#']).next().unwrap_or("").to_string());
    let last = path.rsplit('/').next().unwrap_or("");

    match last.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=MAX_EXT_LEN).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => DEFAULT_IMAGE_EXT.to_string(),
    }
}

/// Fetches the first `limit` URLs into `dest` as `<row><ext>`, 1-based.
///
/// Empty cells still count as a row. Invalid URLs and failed requests are
/// skipped, never retried.
pub async fn download_images(
    client: &HttpClient,
    urls: &[String],
    limit: usize,
    dest: &Path,
) -> Result<Vec<DownloadOutcome>> {
    fs::create_dir_all(dest).await?;

    let mut outcomes = Vec::with_capacity(limit.min(urls.len()));
    for (i, url) in urls.iter().take(limit).enumerate() {
        let row = i + 1;
        let outcome = download_one(client, url, row, dest).await;
        match &outcome {
            DownloadOutcome::Saved(path) => info_time!("Saved {url} -> {}", path.display()),
            DownloadOutcome::Skipped { reason, .. } => warn_time!("Skipped image {row} ({url}): {reason}"),
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn download_one(client: &HttpClient, url: &str, row: usize, dest: &Path) -> DownloadOutcome {
    let skipped = |reason: String| DownloadOutcome::Skipped {
        row,
        url: url.to_string(),
        reason,
    };

    let Some(parsed) = parse_web_url(url) else {
        return skipped("invalid URL".into());
    };
    let body = match client.get_bytes(parsed.as_str()).await {
        Ok(body) => body,
        Err(e) => return skipped(e.to_string()),
    };

    let path: PathBuf = dest.join(format!("{row}{}", infer_extension(url)));
    match write_file(&path, &body).await {
        Ok(()) => DownloadOutcome::Saved(path),
        Err(e) => skipped(e.to_string()),
    }
}

async fn write_file(path: &Path, body: &[u8]) -> Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(body).await?;
    file.flush().await?;
    Ok(())
}
