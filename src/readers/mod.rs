pub mod csv;

use std::path::Path;

use crate::types::{FileFormat, RawRecord, Result};

/// Common trait for source table readers
pub trait DataReader {
    /// Read every business record from the source, in file order
    fn read(&mut self) -> Result<Vec<RawRecord>>;
}

/// Create a reader for the given file path
pub fn create_reader(path: &Path) -> Result<Box<dyn DataReader>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let format = FileFormat::from_extension(ext).ok_or_else(|| {
        crate::error::Error::UnsupportedFormat(format!(
            "Unsupported file extension: .{}",
            ext
        ))
    })?;

    Ok(Box::new(csv::CsvReader::new(path, format)))
}
