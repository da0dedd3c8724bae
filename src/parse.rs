use scraper::Selector;
use url::Url;

use crate::config::{LinkMode, SiteConfig, MULTI_VALUE_DELIMITER, MULTI_VALUE_LABELS};
use crate::document::{create_selector, flat_text, fragments, Page};
use crate::record::{Attributes, DetailRecord, NameLinkRecord, Section};
use crate::Result;

/// Selectors compiled once per run from a `SiteConfig`.
pub struct Selectors {
    entry: Selector,
    heading: Selector,
    table: Selector,
    image: Selector,
    row: Selector,
    th: Selector,
    td: Selector,
}

impl Selectors {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        Ok(Self {
            entry: create_selector(&site.entry_selector)?,
            heading: create_selector(&site.heading_selector)?,
            table: create_selector(&site.table_selector)?,
            image: create_selector(&site.image_selector)?,
            row: create_selector("tr")?,
            th: create_selector("th")?,
            td: create_selector("td")?,
        })
    }
}

/// Extracts one record per entry anchor on the listing page, in page order.
pub fn parse_index(page: &Page, sel: &Selectors, site: &SiteConfig) -> Vec<NameLinkRecord> {
    let base = Url::parse(&site.listing_url).ok();

    page.select_all(&sel.entry)
        .filter_map(|anchor| {
            let name = flat_text(anchor);
            if name.is_empty() {
                return None;
            }
            let scraped = match site.link_mode {
                LinkMode::Scraped => anchor
                    .value()
                    .attr("href")
                    .and_then(|href| resolve(base.as_ref(), href)),
                LinkMode::Derived => None,
            };
            let link = scraped.unwrap_or_else(|| site.slugs.entry_url(&site.entry_base, &name));
            Some(NameLinkRecord { name, link })
        })
        .collect()
}

/// Reads the label/value table that follows the heading `title`.
/// Absent heading or table gives an empty section.
pub fn extract_section(page: &Page, sel: &Selectors, title: &str) -> Section {
    let mut section = Section::new(title);

    let Some(heading) = page.heading(&sel.heading, title) else {
        return section;
    };
    let Some(table) = page.next_after(heading, &sel.table) else {
        return section;
    };

    for row in table.select(&sel.row) {
        let (Some(th), Some(td)) = (row.select(&sel.th).next(), row.select(&sel.td).next()) else {
            continue;
        };
        let label = flat_text(th);
        let value = if MULTI_VALUE_LABELS.contains(&label.as_str()) {
            fragments(td).collect::<Vec<_>>().join(MULTI_VALUE_DELIMITER)
        } else {
            flat_text(td)
        };
        section.push(label, value);
    }
    section
}

/// Builds the merged record for one entry page.
///
/// The artwork link comes from the page when it has one; otherwise it is
/// derived from the name.
pub fn parse_details(page: &Page, sel: &Selectors, site: &SiteConfig, name: &str, page_url: &str) -> DetailRecord {
    let mut attributes = Attributes::new();
    for title in &site.sections {
        attributes.merge_section(&extract_section(page, sel, title));
    }

    let base = Url::parse(page_url).ok();
    let image = page
        .first(&sel.image)
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(base.as_ref(), href))
        .unwrap_or_else(|| site.slugs.image_url(&site.image_base, name, &site.image_ext));

    DetailRecord {
        name: name.to_string(),
        attributes,
        image,
    }
}

fn resolve(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    Some(url.to_string())
}
