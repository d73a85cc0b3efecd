use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::pipeline::PipelineReport;
use crate::types::{CleanRecord, DateFailure, Result, COLUMNS};

const QUARANTINE_COLUMNS: [&str; 3] = ["line", "company", "raw"];

/// Create a temp file beside `path` so the final rename stays on one
/// filesystem.
fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(NamedTempFile::new_in(dir)?)
}

/// Write the clean table as CSV into a temp file beside `path`. Nothing is
/// visible at `path` until the returned file is persisted.
pub fn stage_clean_csv(records: &[CleanRecord], path: &Path) -> Result<NamedTempFile> {
    let mut tmp = staging_file(path)?;
    {
        let mut writer = csv::Writer::from_writer(&mut tmp);
        writer.write_record(COLUMNS)?;
        for record in records {
            writer.write_record(record.to_fields())?;
        }
        writer.flush()?;
    }
    Ok(tmp)
}

/// Write quarantined records into a temp file beside `path`. The header is
/// written even when there are no records.
pub fn stage_quarantine_csv(failures: &[DateFailure], path: &Path) -> Result<NamedTempFile> {
    let mut tmp = staging_file(path)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);
        writer.write_record(QUARANTINE_COLUMNS)?;
        for failure in failures {
            writer.serialize(failure)?;
        }
        writer.flush()?;
    }
    Ok(tmp)
}

/// Write the clean table as CSV, replacing `path` atomically
pub fn write_clean_csv(records: &[CleanRecord], path: &Path) -> Result<()> {
    stage_clean_csv(records, path)?.persist(path)?;
    Ok(())
}

/// Write records set aside for unparseable dates, replacing `path` atomically
pub fn write_quarantine_csv(failures: &[DateFailure], path: &Path) -> Result<()> {
    stage_quarantine_csv(failures, path)?.persist(path)?;
    Ok(())
}

/// Write report to JSON file
pub fn write_json_file(report: &PipelineReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write report to JSON string
pub fn to_json_string<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write report to stdout
pub fn write_json_stdout<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = to_json_string(value)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleaningConfig;
    use crate::pipeline::run;
    use crate::types::DateErrorPolicy;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn oda() -> CleanRecord {
        CleanRecord {
            company: "Oda".to_string(),
            location: Some("Oslo".to_string()),
            industry: Some("Food".to_string()),
            total_laid_off: Some(80),
            percentage_laid_off: None,
            date: NaiveDate::from_ymd_opt(2023, 3, 14),
            stage: Some("Series C".to_string()),
            country: Some("Norway".to_string()),
            funds_raised_millions: Some(337),
        }
    }

    #[test]
    fn test_write_clean_csv_header_has_no_helper_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_clean_csv(&[oda()], &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, COLUMNS);
        assert!(!headers.iter().any(|h| h == "row_num"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][5], "2023-03-14");
        assert_eq!(&rows[0][4], "");
    }

    #[test]
    fn test_write_clean_csv_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(&path, "stale").unwrap();

        write_clean_csv(&[], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), COLUMNS.join(","));

        // Only the output itself remains in the directory.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_quarantine_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.csv");
        let failures = vec![DateFailure {
            line: 7,
            company: "Beyond Meat".to_string(),
            raw: "4/2023".to_string(),
        }];
        write_quarantine_csv(&failures, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["line,company,raw", "7,Beyond Meat,4/2023"]);
    }

    #[test]
    fn test_empty_quarantine_has_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.csv");
        std::fs::write(&path, "line,company,raw\n3,Stale,1/2023\n").unwrap();

        write_quarantine_csv(&[], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["line,company,raw"]);
    }

    #[test]
    fn test_staged_csv_not_visible_until_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.csv");

        let staged = stage_clean_csv(&[oda()], &path).unwrap();
        assert!(!path.exists());
        staged.persist(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_json_serialization() {
        let out = run(&[], &CleaningConfig::default(), DateErrorPolicy::Halt).unwrap();

        let json = to_json_string(&out.report).unwrap();
        assert!(json.contains("\"config_version\": 1"));
        assert!(json.contains("\"on_date_error\": \"halt\""));
        assert!(json.contains("\"duplicates_removed\": 0"));
        assert!(!json.contains("input_sha256"));
    }
}
