pub mod dedup;
pub mod prune;
pub mod staging;
pub mod standardize;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::CleaningConfig;
use crate::error::Error;
use crate::output;
use crate::readers::create_reader;
use crate::schema::compute_file_hash;
use crate::types::{CleanRecord, DateErrorPolicy, PipelineOptions, RawRecord, Result};

pub use dedup::DedupStats;
pub use prune::PruneStats;
pub use standardize::{StandardizeStats, Standardizer};

/// Per-stage accounting of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Report format version
    pub version: String,

    pub generated_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// SHA-256 of the raw input file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_sha256: Option<String>,

    pub config_version: u32,
    pub on_date_error: DateErrorPolicy,
    pub rows_read: usize,
    pub dedup: DedupStats,
    pub standardize: StandardizeStats,
    pub prune: PruneStats,
    pub rows_written: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarantine: Option<String>,
}

/// The clean table together with the report describing how it was made
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub records: Vec<CleanRecord>,
    pub report: PipelineReport,
}

/// Run all four stages over an in-memory raw table. `raw` is only read.
pub fn run(
    raw: &[RawRecord],
    config: &CleaningConfig,
    on_date_error: DateErrorPolicy,
) -> Result<PipelineOutput> {
    let standardizer = Standardizer::new(config, on_date_error)?;

    let staged = staging::stage_copy(raw);
    let (deduped, dedup) = dedup::deduplicate(staged);
    let (standardized, standardize) = standardizer.standardize(deduped)?;
    let (records, prune) = prune::prune(standardized);

    let report = PipelineReport {
        version: "1.0.0".to_string(),
        generated_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        input: None,
        input_sha256: None,
        config_version: config.version,
        on_date_error,
        rows_read: raw.len(),
        dedup,
        standardize,
        prune,
        rows_written: records.len(),
        output: None,
        quarantine: None,
    };

    Ok(PipelineOutput { records, report })
}

/// Clean the table at `input` into `out`. The input file is never written;
/// outputs are replaced atomically, so a failed run leaves them untouched
/// and can simply be repeated.
pub fn clean_file(
    input: &Path,
    out: &Path,
    quarantine: Option<&Path>,
    config: &CleaningConfig,
    options: &PipelineOptions,
) -> Result<PipelineReport> {
    if same_file(input, out)? || quarantine.map_or(Ok(false), |q| same_file(input, q))? {
        return Err(Error::InvalidInput(format!(
            "refusing to overwrite the raw input {}",
            input.display()
        )));
    }

    let input_sha256 = if options.hash_input {
        Some(compute_file_hash(input)?)
    } else {
        None
    };

    let mut reader = create_reader(input)?;
    let raw = reader.read()?;
    info!(path = %input.display(), rows = raw.len(), "loaded raw table");

    let PipelineOutput {
        records,
        mut report,
    } = run(&raw, config, options.on_date_error)?;

    // Quarantine runs always refresh their file, so a rerun never leaves
    // records from an earlier run behind.
    let quarantine_path = match (options.on_date_error, quarantine) {
        (_, Some(path)) => Some(path.to_path_buf()),
        (DateErrorPolicy::Quarantine, None) => Some(default_quarantine_path(out)),
        (DateErrorPolicy::Halt, None) => None,
    };

    let failures = &report.standardize.date_failures;
    let staged_clean = output::stage_clean_csv(&records, out)?;
    let staged_quarantine = quarantine_path
        .as_deref()
        .map(|path| output::stage_quarantine_csv(failures, path))
        .transpose()?;

    // The clean table lands first; a quarantine file never exists without it.
    staged_clean.persist(out)?;
    info!(path = %out.display(), rows = records.len(), "wrote clean table");

    match (staged_quarantine, quarantine_path) {
        (Some(staged), Some(path)) => {
            staged.persist(&path)?;
            info!(path = %path.display(), rows = failures.len(), "wrote quarantined records");
            report.quarantine = Some(path.display().to_string());
        }
        _ => {
            let stale = default_quarantine_path(out);
            if stale.exists() && !same_file(input, &stale)? {
                std::fs::remove_file(&stale)?;
                info!(path = %stale.display(), "removed quarantine file from an earlier run");
            }
        }
    }

    report.input = Some(input.display().to_string());
    report.input_sha256 = input_sha256;
    report.output = Some(out.display().to_string());
    Ok(report)
}

/// `<out>.quarantine.csv` next to the clean table
pub fn default_quarantine_path(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    out.with_file_name(format!("{}.quarantine.csv", stem))
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    if !a.exists() || !b.exists() {
        return Ok(false);
    }
    Ok(std::fs::canonicalize(a)? == std::fs::canonicalize(b)?)
}
