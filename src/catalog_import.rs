//! Catalog file import for bulk workflows.
//!
//! Rights holders export catalogs with no common schema, so the importer
//! accepts a handful of header aliases per column and keeps any row that
//! carries at least one usable field.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ARTIST_HEADERS: [&str; 2] = ["artist", "artist_name"];
const TITLE_HEADERS: [&str; 4] = ["title", "song", "song_title", "track_name"];
const ISRC_HEADERS: [&str; 1] = ["isrc"];

/// One song entry from an imported catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub isrc: Option<String>,
}

impl CatalogRecord {
    fn is_empty(&self) -> bool {
        self.artist.is_none() && self.title.is_none() && self.isrc.is_none()
    }
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.contains(&h.trim().to_lowercase().as_str()))
}

/// Parse a CSV catalog into normalized song records.
pub fn parse_catalog_csv(reader: impl Read) -> Result<Vec<CatalogRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().context("Catalog CSV has no header row")?.clone();

    let artist_col = find_column(&headers, &ARTIST_HEADERS);
    let title_col = find_column(&headers, &TITLE_HEADERS);
    let isrc_col = find_column(&headers, &ISRC_HEADERS);

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row.context("Failed to read catalog CSV row")?;
        let record = CatalogRecord {
            artist: clean(artist_col.and_then(|i| row.get(i))),
            title: clean(title_col.and_then(|i| row.get(i))),
            isrc: clean(isrc_col.and_then(|i| row.get(i))),
        };
        if !record.is_empty() {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse a catalog file by path. Only `.csv` is supported.
pub fn parse_catalog_file(path: &Path) -> Result<Vec<CatalogRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("csv") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open catalog file: {:?}", path))?;
            parse_catalog_csv(file)
        }
        _ => anyhow::bail!("Unsupported catalog format, expected .csv: {:?}", path),
    }
}

/// Drop records whose ISRC was already seen, so one song is not processed
/// twice. Records without an ISRC always pass.
pub fn dedupe_by_isrc(records: Vec<CatalogRecord>) -> Vec<CatalogRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    records
        .into_iter()
        .filter(|record| match &record.isrc {
            Some(isrc) => seen.insert(isrc.clone()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_basic_csv() {
        let data = "artist,title,isrc\nThe Weeknd,Blinding Lights,USUG11904206\nRobyn,Dancing On My Own,\n";
        let records = parse_catalog_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].artist.as_deref(), Some("The Weeknd"));
        assert_eq!(records[0].isrc.as_deref(), Some("USUG11904206"));
        assert!(records[1].isrc.is_none());
    }

    #[test]
    fn test_header_aliases() {
        let data = "artist_name,track_name\nDaft Punk,One More Time\n";
        let records = parse_catalog_csv(data.as_bytes()).unwrap();
        assert_eq!(records[0].artist.as_deref(), Some("Daft Punk"));
        assert_eq!(records[0].title.as_deref(), Some("One More Time"));
    }

    #[test]
    fn test_blank_rows_are_dropped() {
        let data = "artist,title\n , \nCaribou,Odessa\n";
        let records = parse_catalog_csv(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Odessa"));
    }

    #[test]
    fn test_dedupe_by_isrc() {
        let records = vec![
            CatalogRecord {
                title: Some("A".to_string()),
                isrc: Some("X1".to_string()),
                ..Default::default()
            },
            CatalogRecord {
                title: Some("A again".to_string()),
                isrc: Some("X1".to_string()),
                ..Default::default()
            },
            CatalogRecord {
                title: Some("B".to_string()),
                ..Default::default()
            },
            CatalogRecord {
                title: Some("C".to_string()),
                ..Default::default()
            },
        ];
        let deduped = dedupe_by_isrc(records);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_catalog_file_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.xlsx");
        std::fs::File::create(&path).unwrap();
        assert!(parse_catalog_file(&path).is_err());
    }

    #[test]
    fn test_parse_catalog_file_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "song,artist").unwrap();
        writeln!(file, "Midnight City,M83").unwrap();
        drop(file);

        let records = parse_catalog_file(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].artist.as_deref(), Some("M83"));
    }
}
