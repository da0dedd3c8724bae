use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use dexscrape::config::{
    LinkMode, RunConfig, SiteConfig, DEFAULT_ENTRY_BASE, DEFAULT_IMAGE_BASE, DEFAULT_LISTING_URL,
    DEFAULT_TIMEOUT_SECS,
};
use dexscrape::process::{process_site, RunSummary};
use dexscrape::prompt::Prompter;
use dexscrape::{info_time, Result};

#[derive(Parser, Debug)]
#[command(name = "dexscrape", about = "Scrape the Pokédex into CSV tables")]
struct Cli {
    /// National listing page
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    listing_url: String,
    /// Prefix for derived entry page links
    #[arg(long, default_value = DEFAULT_ENTRY_BASE)]
    entry_base: String,
    /// Prefix for derived artwork links
    #[arg(long, default_value = DEFAULT_IMAGE_BASE)]
    image_base: String,
    /// Directory for the CSV files and images
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Per-request timeout
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Take index links from the listing, or derive them from names
    #[arg(long, value_enum, default_value_t = LinkMode::Scraped)]
    link_mode: LinkMode,

    /// Don't prompt; answer from the flags below
    #[arg(long)]
    batch: bool,
    /// Accept the generated index
    #[arg(short, long, requires = "batch")]
    yes: bool,
    /// Entries to scrape (default: min(10, index size))
    #[arg(short = 'n', long, requires = "batch")]
    count: Option<String>,
    /// Probe every saved link
    #[arg(long, requires = "batch")]
    check_links: bool,
    /// Images to download
    #[arg(long, requires = "batch")]
    download: Option<String>,
}

impl Cli {
    fn site(&self) -> SiteConfig {
        SiteConfig {
            listing_url: self.listing_url.clone(),
            entry_base: self.entry_base.clone(),
            image_base: self.image_base.clone(),
            link_mode: self.link_mode,
            out_dir: self.out_dir.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..SiteConfig::default()
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            confirm: self.yes,
            count: self.count.clone(),
            run_link_check: self.check_links,
            download: self.download.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let start_time = Local::now();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(summary) => {
            report(&summary);
            info_time!(start_time, "Full program time:");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("dexscrape: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let site = cli.site();
    if cli.batch {
        process_site(&site, &mut cli.run_config()).await
    } else {
        let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
        process_site(&site, &mut prompter).await
    }
}

fn report(summary: &RunSummary) {
    if !summary.confirmed {
        println!("Index of {} entries written; nothing else to do.", summary.index.len());
        return;
    }
    println!(
        "Scraped {} of {} selected entries ({} skipped).",
        summary.records().count(),
        summary.outcomes.len(),
        summary.skipped()
    );
    for report in &summary.link_reports {
        println!("Link check: {} checked, {} failed.", report.results.len(), report.failures);
    }
    if !summary.downloads.is_empty() {
        println!("Image download: {} attempted.", summary.downloads.len());
    }
}
