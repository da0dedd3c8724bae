use chrono::Local;
use url::Url;

use crate::check::{check_table, LinkReport};
use crate::config::{select, SiteConfig};
use crate::document::Page;
use crate::download::download_images;
use crate::parse::{parse_details, parse_index, Selectors};
use crate::prompt::Decide;
use crate::record::{DetailRecord, DownloadOutcome, NameLinkRecord, ScrapeOutcome, IMAGE_COLUMN, LINK_COLUMN};
use crate::request::HttpClient;
use crate::table::{read_column, read_names, write_details, write_names};
use crate::{info_time, warn_time, Error, Result};

/// What a full run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub index: Vec<NameLinkRecord>,
    /// `false` when the index was declined and the run stopped early.
    pub confirmed: bool,
    pub outcomes: Vec<ScrapeOutcome>,
    pub link_reports: Vec<LinkReport>,
    pub downloads: Vec<DownloadOutcome>,
}

impl RunSummary {
    pub fn records(&self) -> impl Iterator<Item = &DetailRecord> {
        self.outcomes.iter().filter_map(ScrapeOutcome::record)
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.records().count()
    }
}

/// Index → confirm → select → details → persist → (check) → (download).
pub async fn process_site<D: Decide>(site: &SiteConfig, decide: &mut D) -> Result<RunSummary> {
    let start_time = Local::now();
    let client = HttpClient::new(site.timeout)?;
    let selectors = Selectors::new(site)?;
    let mut summary = RunSummary::default();

    info_time!("Started scraping");

    summary.index = build_index(&client, &selectors, site).await?;
    write_names(&site.names_path(), &summary.index).await?;
    info_time!(
        start_time,
        "Wrote {} names to file: {}",
        summary.index.len(),
        site.names_path().display()
    );

    if !decide.confirm_index(&summary.index) {
        info_time!("Index not confirmed, stopping.");
        return Ok(summary);
    }
    summary.confirmed = true;

    let names = read_names(&site.names_path()).await?;
    let selection = decide.count(names.len());
    let selected = select(&names, selection.count);

    summary.outcomes = scrape_details(&client, &selectors, site, selected).await;
    let records: Vec<DetailRecord> = summary.records().cloned().collect();
    write_details(&site.details_path(), &records).await?;
    print_details(&records);
    info_time!(
        start_time,
        "Wrote {} records ({} skipped) to file: {}",
        records.len(),
        summary.skipped(),
        site.details_path().display()
    );

    if decide.run_link_check() {
        for (path, column) in [
            (site.names_path(), LINK_COLUMN),
            (site.details_path(), IMAGE_COLUMN),
        ] {
            let report = check_table(&client, &path, column).await?;
            summary.link_reports.push(report);
        }
    }

    let images = read_column(&site.details_path(), IMAGE_COLUMN).await?;
    if let Some(limit) = decide.download_count(images.len()) {
        summary.downloads = download_images(&client, &images, limit, &site.image_dir()).await?;
        let saved = summary
            .downloads
            .iter()
            .filter(|d| matches!(d, DownloadOutcome::Saved(_)))
            .count();
        info_time!("Downloaded {saved} of {limit} images to {}", site.image_dir().display());
    }

    info_time!(start_time, "Finished.");
    Ok(summary)
}

/// Fetches the listing page and extracts the index. A malformed or
/// unreachable listing URL is fatal.
pub async fn build_index(client: &HttpClient, selectors: &Selectors, site: &SiteConfig) -> Result<Vec<NameLinkRecord>> {
    let listing = Url::parse(&site.listing_url)?;
    let html = client.get_html(listing.as_str()).await.map_err(|e| match e {
        Error::Reqwest(source) => Error::Listing {
            url: site.listing_url.clone(),
            source,
        },
        other => other,
    })?;
    let page = Page::parse(&html);
    Ok(parse_index(&page, selectors, site))
}

/// One outcome per row, in order. A failed fetch skips the row and the batch goes on.
pub async fn scrape_details(
    client: &HttpClient,
    selectors: &Selectors,
    site: &SiteConfig,
    rows: &[NameLinkRecord],
) -> Vec<ScrapeOutcome> {
    let mut outcomes = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let outcome = match client.get_html(&row.link).await {
            Ok(html) => {
                let page = Page::parse(&html);
                let record = parse_details(&page, selectors, site, &row.name, &row.link);
                info_time!(
                    "[{}/{}] {}: {} fields",
                    i + 1,
                    rows.len(),
                    row.name,
                    record.attributes.len()
                );
                ScrapeOutcome::Scraped(record)
            }
            Err(e) => {
                warn_time!("[{}/{}] Skipping {} ({}): {e}", i + 1, rows.len(), row.name, row.link);
                ScrapeOutcome::Skipped {
                    name: row.name.clone(),
                    url: row.link.clone(),
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

fn print_details(records: &[DetailRecord]) {
    for record in records {
        println!("{:<20} | {:>3} fields | {}", record.name, record.attributes.len(), record.image);
    }
}
