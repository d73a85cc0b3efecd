use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Business columns of the layoffs table, in persisted order
pub const COLUMNS: [&str; 9] = [
    "company",
    "location",
    "industry",
    "total_laid_off",
    "percentage_laid_off",
    "date",
    "stage",
    "country",
    "funds_raised_millions",
];

/// Format the source export uses for the `date` column
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// A layoff event as read from the source table, before date typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line in the source file, used only for reporting
    pub line: u64,
    pub company: String,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub total_laid_off: Option<i64>,
    pub percentage_laid_off: Option<String>,
    pub date: Option<String>,
    pub stage: Option<String>,
    pub country: Option<String>,
    pub funds_raised_millions: Option<i64>,
}

/// Joint value of all nine business fields. Two records with equal keys are
/// the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusinessKey<'a> {
    company: &'a str,
    location: Option<&'a str>,
    industry: Option<&'a str>,
    total_laid_off: Option<i64>,
    percentage_laid_off: Option<&'a str>,
    date: Option<&'a str>,
    stage: Option<&'a str>,
    country: Option<&'a str>,
    funds_raised_millions: Option<i64>,
}

impl RawRecord {
    #[cfg(test)]
    pub fn new(line: u64, company: &str) -> Self {
        Self {
            line,
            company: company.to_string(),
            location: None,
            industry: None,
            total_laid_off: None,
            percentage_laid_off: None,
            date: None,
            stage: None,
            country: None,
            funds_raised_millions: None,
        }
    }

    pub fn business_key(&self) -> BusinessKey<'_> {
        BusinessKey {
            company: &self.company,
            location: self.location.as_deref(),
            industry: self.industry.as_deref(),
            total_laid_off: self.total_laid_off,
            percentage_laid_off: self.percentage_laid_off.as_deref(),
            date: self.date.as_deref(),
            stage: self.stage.as_deref(),
            country: self.country.as_deref(),
            funds_raised_millions: self.funds_raised_millions,
        }
    }
}

/// A fully standardized layoff event, the persisted shape of the clean table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CleanRecord {
    pub company: String,
    pub location: Option<String>,
    pub industry: Option<String>,
    pub total_laid_off: Option<i64>,
    pub percentage_laid_off: Option<String>,
    pub date: Option<NaiveDate>,
    pub stage: Option<String>,
    pub country: Option<String>,
    pub funds_raised_millions: Option<i64>,
}

impl CleanRecord {
    /// Render the record as CSV fields in `COLUMNS` order
    pub fn to_fields(&self) -> [String; 9] {
        fn text(v: &Option<String>) -> String {
            v.clone().unwrap_or_default()
        }
        fn int(v: Option<i64>) -> String {
            v.map(|n| n.to_string()).unwrap_or_default()
        }

        [
            self.company.clone(),
            text(&self.location),
            text(&self.industry),
            int(self.total_laid_off),
            text(&self.percentage_laid_off),
            self.date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            text(&self.stage),
            text(&self.country),
            int(self.funds_raised_millions),
        ]
    }
}

/// A record carrying the transient dedup ordinal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked<T> {
    /// 1-based position within its business-key group
    pub row_num: usize,
    pub record: T,
}

impl<T> Ranked<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Ranked<U> {
        Ranked {
            row_num: self.row_num,
            record: f(self.record),
        }
    }
}

/// A record whose date text did not match the configured format
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateFailure {
    pub line: u64,
    pub company: String,
    pub raw: String,
}

/// What to do with records whose date cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DateErrorPolicy {
    /// Abort the run and report every offending record
    #[default]
    Halt,
    /// Set offending records aside and continue
    Quarantine,
}

/// Supported table formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            _ => None,
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Tsv => b'\t',
        }
    }
}

/// Processing options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub on_date_error: DateErrorPolicy,

    /// Whether to hash the input file into the report
    pub hash_input: bool,
}

/// Result type for the application
pub type Result<T> = std::result::Result<T, crate::error::Error>;
