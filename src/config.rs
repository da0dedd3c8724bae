use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::slug::SlugPolicy;

pub const DEFAULT_LISTING_URL: &str = "https://pokemondb.net/pokedex/national";
pub const DEFAULT_ENTRY_BASE: &str = "https://pokemondb.net/pokedex/";
pub const DEFAULT_IMAGE_BASE: &str = "https://img.pokemondb.net/artwork/large/";
pub const DEFAULT_IMAGE_EXT: &str = ".jpg";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// How many rows the selector falls back to when the answer is unusable.
pub const DEFAULT_COUNT: usize = 10;

pub const SECTIONS: [&str; 4] = ["Pokédex data", "Training", "Breeding", "Base stats"];
/// Labels whose cells hold several values separated by line breaks.
pub const MULTI_VALUE_LABELS: [&str; 4] = ["Type", "Abilities", "Local №", "Local No."];
pub const MULTI_VALUE_DELIMITER: &str = " | ";

pub const NAMES_FILE: &str = "pokemon_names.csv";
pub const DETAILS_FILE: &str = "pokedex_data.csv";
pub const IMAGE_DIR: &str = "images";
pub const TABLE_DELIMITER: char = ',';

/// How the index builder produces each entry's link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LinkMode {
    /// Resolve the listing anchor's href; derive from the name if it has none.
    #[default]
    Scraped,
    /// Always derive from the name's slug.
    Derived,
}

/// Where to scrape from, what to look for, and where results go.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub listing_url: String,
    pub entry_base: String,
    pub image_base: String,
    pub image_ext: String,
    pub link_mode: LinkMode,
    pub slugs: SlugPolicy,

    pub entry_selector: String,
    pub heading_selector: String,
    pub table_selector: String,
    pub image_selector: String,
    pub sections: Vec<String>,

    pub out_dir: PathBuf,
    pub timeout: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.into(),
            entry_base: DEFAULT_ENTRY_BASE.into(),
            image_base: DEFAULT_IMAGE_BASE.into(),
            image_ext: DEFAULT_IMAGE_EXT.into(),
            link_mode: LinkMode::default(),
            slugs: SlugPolicy::default(),

            entry_selector: "a.ent-name".into(),
            heading_selector: "h2".into(),
            table_selector: "table.vitals-table".into(),
            image_selector: r#"a[rel="lightbox"]"#.into(),
            sections: SECTIONS.iter().map(|s| s.to_string()).collect(),

            out_dir: PathBuf::from("."),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SiteConfig {
    pub fn names_path(&self) -> PathBuf {
        self.out_dir.join(NAMES_FILE)
    }

    pub fn details_path(&self) -> PathBuf {
        self.out_dir.join(DETAILS_FILE)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.out_dir.join(IMAGE_DIR)
    }

    /// Points every site location at `base` (used against local test servers).
    pub fn with_site_root(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.listing_url = format!("{base}/pokedex/national");
        self.entry_base = format!("{base}/pokedex/");
        self.image_base = format!("{base}/artwork/large/");
        self
    }

    pub fn with_out_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.out_dir = dir.as_ref().to_path_buf();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    OutOfRange,
    NotANumber,
}

/// A bounded row count, plus why the answer was replaced, if it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub count: usize,
    pub fallback: Option<Fallback>,
}

impl Selection {
    pub fn default_for(total: usize) -> Self {
        Self {
            count: DEFAULT_COUNT.min(total),
            fallback: None,
        }
    }
}

/// Parses a requested row count against a table of `total` rows.
///
/// `1..=total` is taken as is. Anything else, numeric or not, becomes
/// `min(10, total)`.
pub fn select_count(answer: &str, total: usize) -> Selection {
    let default = DEFAULT_COUNT.min(total);
    match answer.trim().parse::<i64>() {
        Ok(n) if n >= 1 && (n as u64) <= total as u64 => Selection {
            count: n as usize,
            fallback: None,
        },
        Ok(_) => Selection {
            count: default,
            fallback: Some(Fallback::OutOfRange),
        },
        Err(_) => Selection {
            count: default,
            fallback: Some(Fallback::NotANumber),
        },
    }
}

/// The first `count` records, or all of them when there are fewer.
pub fn select<T>(records: &[T], count: usize) -> &[T] {
    &records[..count.min(records.len())]
}

/// Explicit answers to every question a run asks.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub confirm: bool,
    /// Raw count answer; `None` takes the default.
    pub count: Option<String>,
    pub run_link_check: bool,
    /// Raw image count answer; `None` skips the download pass.
    pub download: Option<String>,
}
