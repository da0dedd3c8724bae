//! Delimited text tables: the names index and the details table.

use std::mem::take;
use std::path::Path;

use tokio::{fs, fs::File, io::AsyncWriteExt};

use crate::config::TABLE_DELIMITER;
use crate::record::{Attributes, DetailRecord, NameLinkRecord, IMAGE_COLUMN, LINK_COLUMN, NAME_COLUMN};
use crate::{Error, Result};

/// A header row plus data rows, all cells as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cell `(row, column)`, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn to_text(&self, sep: char) -> String {
        let mut out = String::new();
        write_row(&mut out, &self.headers, sep);
        for row in &self.rows {
            write_row(&mut out, row, sep);
        }
        out
    }

    /// First row is the header. Blank lines are dropped.
    pub fn from_text(text: &str, sep: char) -> Option<Self> {
        let mut rows = parse_rows(text, sep).into_iter();
        let headers = rows.next()?;
        Some(Self {
            headers,
            rows: rows.collect(),
        })
    }
}

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser, tolerant of quotes and CRLF.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // doubled quote
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                push_row(&mut rows, take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a newline (or with unterminated quotes).
    row.push(field);
    push_row(&mut rows, row);
    rows
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !row.is_empty() && !blank {
        rows.push(row);
    }
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

pub fn write_row(out: &mut String, row: &[String], sep: char) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        if needs_quotes(cell, sep) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/* ---------------- Files ---------------- */

pub async fn write_table(path: &Path, table: &Table) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    let mut file = File::create(path).await?;
    file.write_all(table.to_text(TABLE_DELIMITER).as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

pub async fn read_table(path: &Path) -> Result<Table> {
    let text = fs::read_to_string(path).await?;
    Table::from_text(&text, TABLE_DELIMITER).ok_or_else(|| Error::EmptyTable(path.to_path_buf()))
}

/// All values of `column`, one per data row.
pub async fn read_column(path: &Path, column: &str) -> Result<Vec<String>> {
    let table = read_table(path).await?;
    let idx = required_column(&table, path, column)?;
    Ok((0..table.rows.len())
        .map(|row| table.cell(row, idx).trim().to_string())
        .collect())
}

fn required_column(table: &Table, path: &Path, column: &str) -> Result<usize> {
    table.column_index(column).ok_or_else(|| Error::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    })
}

pub fn names_table(records: &[NameLinkRecord]) -> Table {
    Table {
        headers: vec![NAME_COLUMN.into(), LINK_COLUMN.into()],
        rows: records
            .iter()
            .map(|r| vec![r.name.clone(), r.link.clone()])
            .collect(),
    }
}

/// `Name`, every attribute key in first-seen order, then `Image`.
pub fn details_table(records: &[DetailRecord]) -> Table {
    let mut keys: Vec<&str> = Vec::new();
    for key in records.iter().flat_map(|r| r.attributes.keys()) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    let mut headers = Vec::with_capacity(keys.len() + 2);
    headers.push(NAME_COLUMN.to_string());
    headers.extend(keys.iter().map(|k| k.to_string()));
    headers.push(IMAGE_COLUMN.to_string());

    let rows = records
        .iter()
        .map(|r| {
            let mut row = Vec::with_capacity(headers.len());
            row.push(r.name.clone());
            row.extend(keys.iter().map(|k| r.attributes.get(k).unwrap_or("").to_string()));
            row.push(r.image.clone());
            row
        })
        .collect();

    Table { headers, rows }
}

pub async fn write_names(path: &Path, records: &[NameLinkRecord]) -> Result<()> {
    write_table(path, &names_table(records)).await
}

pub async fn read_names(path: &Path) -> Result<Vec<NameLinkRecord>> {
    let table = read_table(path).await?;
    let name = required_column(&table, path, NAME_COLUMN)?;
    let link = required_column(&table, path, LINK_COLUMN)?;
    Ok((0..table.rows.len())
        .map(|row| NameLinkRecord {
            name: table.cell(row, name).to_string(),
            link: table.cell(row, link).to_string(),
        })
        .collect())
}

pub async fn write_details(path: &Path, records: &[DetailRecord]) -> Result<()> {
    write_table(path, &details_table(records)).await
}

/// Reads a details table back. Empty attribute cells are left out of the map.
pub async fn read_details(path: &Path) -> Result<Vec<DetailRecord>> {
    let table = read_table(path).await?;
    let name = required_column(&table, path, NAME_COLUMN)?;
    let image = required_column(&table, path, IMAGE_COLUMN)?;

    Ok((0..table.rows.len())
        .map(|row| {
            let mut attributes = Attributes::new();
            for (col, key) in table.headers.iter().enumerate() {
                let value = table.cell(row, col);
                if col != name && col != image && !value.is_empty() {
                    attributes.set(key.clone(), value);
                }
            }
            DetailRecord {
                name: table.cell(row, name).to_string(),
                attributes,
                image: table.cell(row, image).to_string(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, fields: &[(&str, &str)]) -> DetailRecord {
        let mut attributes = Attributes::new();
        for (k, v) in fields {
            attributes.set(*k, *v);
        }
        DetailRecord {
            name: name.into(),
            attributes,
            image: format!("https://img.example/{}.jpg", name.to_lowercase()),
        }
    }

    #[test]
    fn parses_quotes_and_crlf() {
        let rows = parse_rows("a,\"b,c\",\"say \"\"hi\"\"\"\r\n\r\nx,\"multi\nline\",z\n", ',');
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b,c".into(), "say \"hi\"".into()],
                vec!["x".to_string(), "multi\nline".into(), "z".into()],
            ]
        );
    }

    #[test]
    fn trailing_newline_adds_no_row() {
        assert_eq!(parse_rows("Name,Link\n", ',').len(), 1);
        assert_eq!(parse_rows("Name,Link", ',').len(), 1);
        assert!(parse_rows("", ',').is_empty());
    }

    #[test]
    fn details_columns_follow_first_seen_order() {
        let table = details_table(&[
            record("Bulbasaur", &[("Type", "Grass | Poison"), ("HP", "45")]),
            record("Charmander", &[("Type", "Fire"), ("Egg cycles", "20"), ("HP", "39")]),
        ]);
        assert_eq!(table.headers, ["Name", "Type", "HP", "Egg cycles", "Image"]);
        assert_eq!(table.rows[0][3], "");
        assert_eq!(table.rows[1][3], "20");
    }

    #[tokio::test]
    async fn details_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("details.csv");
        let records = vec![
            record(
                "Bulbasaur",
                &[("Type", "Grass | Poison"), ("Species", "Seed Pokémon"), ("Catch rate", "45 (5.9%, \"PokéBall\")")],
            ),
            record("Farfetch'd", &[("Type", "Normal | Flying"), ("Training - Species", "x\ny")]),
        ];

        write_details(&path, &records).await.unwrap();
        let back = read_details(&path).await.unwrap();
        assert_eq!(back, records);
    }

    #[tokio::test]
    async fn empty_attribute_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("details.csv");
        let rec = record("Bulbasaur", &[("EV yield", ""), ("HP", "45")]);
        assert_eq!(rec.attributes.keys().collect::<Vec<_>>(), ["HP"]);

        write_details(&path, &[rec.clone()]).await.unwrap();
        let back = read_details(&path).await.unwrap();
        assert_eq!(back, vec![rec]);
    }

    #[tokio::test]
    async fn names_round_trip_and_column_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.csv");
        let records = vec![
            NameLinkRecord { name: "Bulbasaur".into(), link: "https://pokemondb.net/pokedex/bulbasaur".into() },
            NameLinkRecord { name: "Farfetch'd".into(), link: "https://pokemondb.net/pokedex/farfetchd".into() },
        ];
        write_names(&path, &records).await.unwrap();

        assert_eq!(read_names(&path).await.unwrap(), records);
        let links = read_column(&path, "Link").await.unwrap();
        assert_eq!(links[1], "https://pokemondb.net/pokedex/farfetchd");
        assert!(matches!(
            read_column(&path, "Image").await,
            Err(Error::MissingColumn { .. })
        ));
    }

    #[tokio::test]
    async fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(read_table(&path).await, Err(Error::EmptyTable(_))));
    }
}
