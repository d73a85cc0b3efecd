use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::types::{Result, COLUMNS};

/// Positions of the nine business columns within a source header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub company: usize,
    pub location: usize,
    pub industry: usize,
    pub total_laid_off: usize,
    pub percentage_laid_off: usize,
    pub date: usize,
    pub stage: usize,
    pub country: usize,
    pub funds_raised_millions: usize,
}

impl ColumnMap {
    /// Locate every business column by name (case-insensitive, trimmed).
    /// Extra columns are ignored; every missing one is reported at once.
    pub fn from_headers<'a, I>(headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();

        let find = |name: &str| normalized.iter().position(|h| h == name);
        let positions: Vec<Option<usize>> = COLUMNS.iter().map(|c| find(*c)).collect();

        let missing: Vec<String> = COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        let at = |i: usize| positions[i].unwrap_or_default();
        Ok(Self {
            company: at(0),
            location: at(1),
            industry: at(2),
            total_laid_off: at(3),
            percentage_laid_off: at(4),
            date: at(5),
            stage: at(6),
            country: at(7),
            funds_raised_millions: at(8),
        })
    }
}

/// Compute SHA-256 hash of a file (streaming to handle large files)
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_column_map_in_order() {
        let map = ColumnMap::from_headers(COLUMNS).unwrap();
        assert_eq!(map.company, 0);
        assert_eq!(map.funds_raised_millions, 8);
    }

    #[test]
    fn test_column_map_reordered_with_extras() {
        let headers = [
            "Country", "id", "company", "location", "industry", "total_laid_off",
            "percentage_laid_off", " date ", "stage", "funds_raised_millions",
        ];
        let map = ColumnMap::from_headers(headers).unwrap();
        assert_eq!(map.country, 0);
        assert_eq!(map.company, 2);
        assert_eq!(map.date, 7);
    }

    #[test]
    fn test_column_map_reports_all_missing() {
        let err = ColumnMap::from_headers(["company", "location"]).unwrap_err();
        match err {
            Error::MissingColumns(missing) => {
                assert_eq!(missing.len(), 7);
                assert!(missing.contains(&"industry".to_string()));
                assert!(missing.contains(&"funds_raised_millions".to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_compute_file_hash() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "test content").unwrap();

        let hash = compute_file_hash(file.path()).unwrap();
        assert_eq!(hash.len(), 64); // SHA-256 produces 64 hex chars
        assert_eq!(hash, compute_file_hash(file.path()).unwrap());
    }
}
