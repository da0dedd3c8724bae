use std::path::PathBuf;

/// Column headers shared by the writer and the reader.
pub const NAME_COLUMN: &str = "Name";
pub const LINK_COLUMN: &str = "Link";
pub const IMAGE_COLUMN: &str = "Image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameLinkRecord {
    pub name: String,
    pub link: String,
}

/// Ordered label → value map with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    fields: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Sets `key`, keeping its original position if it already exists.
    /// An empty value means "absent" and removes the key; a table cell can't
    /// tell the two apart.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.fields.retain(|(k, _)| *k != key);
            return;
        }
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Merges a section without overwriting anything already present.
    ///
    /// A colliding key is qualified as `"{title} - {key}"`, then numbered if
    /// that is taken too. `Name` and `Image` are the details table's fixed
    /// columns and count as taken. Empty values are not stored.
    pub fn merge_section(&mut self, section: &Section) {
        for (key, value) in section.fields.iter().filter(|(_, v)| !v.is_empty()) {
            let key = self.free_key(&section.title, key);
            self.fields.push((key, value.clone()));
        }
    }

    fn is_taken(&self, key: &str) -> bool {
        key == NAME_COLUMN || key == IMAGE_COLUMN || self.contains_key(key)
    }

    fn free_key(&self, title: &str, key: &str) -> String {
        if !self.is_taken(key) {
            return key.to_string();
        }
        let qualified = format!("{title} - {key}");
        if !self.is_taken(&qualified) {
            return qualified;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{qualified} ({n})");
            if !self.is_taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One labeled table from an entry page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub fields: Vec<(String, String)>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// A label repeated within one section keeps its first slot, last value wins.
    pub fn push(&mut self, label: String, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == label) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub name: String,
    pub attributes: Attributes,
    pub image: String,
}

/// What happened to one selected row of the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Scraped(DetailRecord),
    Skipped {
        name: String,
        url: String,
        reason: String,
    },
}

impl ScrapeOutcome {
    pub fn record(&self) -> Option<&DetailRecord> {
        match self {
            ScrapeOutcome::Scraped(record) => Some(record),
            ScrapeOutcome::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Ok,
    NotFound,
    Invalid,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheckResult {
    /// 1-based data row in the checked table.
    pub row: usize,
    pub url: String,
    pub outcome: LinkOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Skipped {
        row: usize,
        url: String,
        reason: String,
    },
}
