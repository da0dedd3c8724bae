//! Pokédex scraper.
//!
//! Builds a name/link index from the national listing page, scrapes the
//! attribute tables of a chosen number of entries into one flat record each,
//! and writes both as CSV. Optionally checks every saved link and downloads
//! a sample of artwork.

mod error;
mod macros;

pub mod check;
pub mod config;
pub mod document;
pub mod download;
pub mod parse;
pub mod process;
pub mod prompt;
pub mod record;
pub mod request;
pub mod slug;
pub mod table;

pub use error::{Error, Result};
