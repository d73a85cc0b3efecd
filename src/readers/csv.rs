use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::Error;
use crate::schema::ColumnMap;
use crate::types::{FileFormat, RawRecord, Result};
use crate::values::{parse_integer, parse_text};

use super::DataReader;

/// CSV/TSV table reader
pub struct CsvReader {
    path: PathBuf,
    delimiter: u8,
}

impl CsvReader {
    pub fn new(path: &Path, format: FileFormat) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: format.delimiter(),
        }
    }
}

impl DataReader for CsvReader {
    fn read(&mut self) -> Result<Vec<RawRecord>> {
        let file = File::open(&self.path)?;
        let records = read_records(BufReader::new(file), self.delimiter)?;
        debug!(path = %self.path.display(), rows = records.len(), "read source table");
        Ok(records)
    }
}

/// Read layoff records from any delimited source with a header row
pub fn read_records<R: Read>(source: R, delimiter: u8) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(source);

    let columns = ColumnMap::from_headers(reader.headers()?.iter())?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result?;
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        records.push(parse_row(&row, &columns, line)?);
    }

    Ok(records)
}

fn parse_row(row: &StringRecord, columns: &ColumnMap, line: u64) -> Result<RawRecord> {
    let field = |idx: usize| row.get(idx).unwrap_or("");
    let integer = |idx: usize, name: &str| {
        parse_integer(field(idx))
            .map_err(|e| Error::InvalidInput(format!("line {}, column {}: {}", line, name, e)))
    };

    let company = parse_text(field(columns.company), false).ok_or_else(|| {
        Error::InvalidInput(format!("line {}: company is required", line))
    })?;

    Ok(RawRecord {
        line,
        company,
        location: parse_text(field(columns.location), false),
        // Empty industry is kept as-is; the standardize stage nulls it explicitly.
        industry: parse_text(field(columns.industry), true),
        total_laid_off: integer(columns.total_laid_off, "total_laid_off")?,
        percentage_laid_off: parse_text(field(columns.percentage_laid_off), false),
        date: parse_text(field(columns.date), false),
        stage: parse_text(field(columns.stage), false),
        country: parse_text(field(columns.country), false),
        funds_raised_millions: integer(columns.funds_raised_millions, "funds_raised_millions")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "company,location,industry,total_laid_off,percentage_laid_off,date,stage,country,funds_raised_millions\n";

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_basic_csv_read() {
        let content = format!(
            "{}Oda,Oslo,Food,80,NULL,3/14/2023,Series C,Norway,337\nAtlassian,Sydney,Other,500,0.05,3/6/2023,Post-IPO,Australia,210\n",
            HEADER
        );
        let file = create_test_csv(&content);

        let mut reader = CsvReader::new(file.path(), FileFormat::Csv);
        let records = reader.read().unwrap();

        assert_eq!(records.len(), 2);
        let oda = &records[0];
        assert_eq!(oda.line, 2);
        assert_eq!(oda.company, "Oda");
        assert_eq!(oda.total_laid_off, Some(80));
        assert_eq!(oda.percentage_laid_off, None);
        assert_eq!(oda.date.as_deref(), Some("3/14/2023"));
        assert_eq!(oda.funds_raised_millions, Some(337));
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_empty_industry_preserved() {
        let content = format!("{}Beyond Meat,Los Angeles,,200,0.19,10/14/2022,Post-IPO,United States,122\n", HEADER);
        let records = read_records(content.as_bytes(), b',').unwrap();

        assert_eq!(records[0].industry.as_deref(), Some(""));
        assert_eq!(records[0].location.as_deref(), Some("Los Angeles"));
    }

    #[test]
    fn test_null_tokens_in_every_field() {
        let content = format!("{}Acme,NULL,NULL,NULL,NULL,NULL,NULL,NULL,NULL\n", HEADER);
        let records = read_records(content.as_bytes(), b',').unwrap();

        let r = &records[0];
        assert_eq!(r.location, None);
        assert_eq!(r.industry, None);
        assert_eq!(r.total_laid_off, None);
        assert_eq!(r.date, None);
        assert_eq!(r.funds_raised_millions, None);
    }

    #[test]
    fn test_short_rows_are_null_padded() {
        let content = format!("{}Acme,Denver\n", HEADER);
        let records = read_records(content.as_bytes(), b',').unwrap();

        assert_eq!(records[0].location.as_deref(), Some("Denver"));
        assert_eq!(records[0].industry.as_deref(), Some(""));
        assert_eq!(records[0].country, None);
    }

    #[test]
    fn test_missing_company_is_error() {
        let content = format!("{}NULL,Oslo,Food,80,,3/14/2023,Series C,Norway,337\n", HEADER);
        let err = read_records(content.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_bad_integer_is_error() {
        let content = format!("{}Oda,Oslo,Food,eighty,,3/14/2023,Series C,Norway,337\n", HEADER);
        let err = read_records(content.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, Error::InvalidInput(msg) if msg.contains("total_laid_off")));
    }

    #[test]
    fn test_tsv_read() {
        let content = "company\tlocation\tindustry\ttotal_laid_off\tpercentage_laid_off\tdate\tstage\tcountry\tfunds_raised_millions\nOda\tOslo\tFood\t80\t\t3/14/2023\tSeries C\tNorway\t337\n";
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        write!(file, "{}", content).unwrap();

        let mut reader = crate::readers::create_reader(file.path()).unwrap();
        let records = reader.read().unwrap();
        assert_eq!(records[0].country.as_deref(), Some("Norway"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = NamedTempFile::with_suffix(".xlsx").unwrap();
        assert!(matches!(
            crate::readers::create_reader(file.path()),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
