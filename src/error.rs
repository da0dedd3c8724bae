use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is invalid. Selector: {0}")]
    InvalidSelector(String),

    #[error("Couldn't fetch the listing page {url}: {source}")]
    Listing {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Table {} has no column named {column:?}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("Table {} has no header row", .0.display())]
    EmptyTable(PathBuf),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Url Error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
