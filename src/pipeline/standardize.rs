use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::CleaningConfig;
use crate::error::Error;
use crate::types::{CleanRecord, DateErrorPolicy, DateFailure, RawRecord, Ranked, Result};
use crate::values::DateParser;

/// A company whose siblings disagreed on industry when filling a gap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousBackfill {
    pub company: String,
    /// Distinct candidate labels with how many siblings carry each
    pub candidates: BTreeMap<String, usize>,
    pub chosen: String,
}

/// Row accounting for the standardize stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandardizeStats {
    pub companies_trimmed: usize,
    pub industries_blanked: usize,
    pub industries_backfilled: usize,
    pub ambiguous_backfills: Vec<AmbiguousBackfill>,
    pub industries_canonicalized: usize,
    pub countries_stripped: usize,
    pub dates_parsed: usize,
    pub date_failures: Vec<DateFailure>,
}

/// Applies the configured cleanup rules to a deduplicated table
#[derive(Debug, Clone)]
pub struct Standardizer {
    industry_lookup: HashMap<String, String>,
    dates: DateParser,
    on_date_error: DateErrorPolicy,
}

impl Standardizer {
    pub fn new(config: &CleaningConfig, on_date_error: DateErrorPolicy) -> Result<Self> {
        Ok(Self {
            industry_lookup: config.industry_lookup(),
            dates: DateParser::new(&config.date_format)?,
            on_date_error,
        })
    }

    /// Run every sub-step in order. Either the whole standardized table is
    /// returned or nothing is.
    pub fn standardize(
        &self,
        rows: Vec<Ranked<RawRecord>>,
    ) -> Result<(Vec<Ranked<CleanRecord>>, StandardizeStats)> {
        let mut rows = rows;
        let mut stats = StandardizeStats {
            companies_trimmed: trim_companies(&mut rows),
            industries_blanked: blank_empty_industries(&mut rows),
            ..StandardizeStats::default()
        };

        let (filled, ambiguous) = backfill_industries(&mut rows);
        stats.industries_backfilled = filled;
        stats.ambiguous_backfills = ambiguous;
        stats.industries_canonicalized = self.canonicalize_industries(&mut rows);
        stats.countries_stripped = strip_country_periods(&mut rows);

        let (typed, failures) = self.type_dates(rows);
        stats.dates_parsed = typed
            .iter()
            .filter(|r| r.record.date.is_some())
            .count();

        if !failures.is_empty() {
            for failure in &failures {
                warn!(
                    line = failure.line,
                    company = %failure.company,
                    date = %failure.raw,
                    "date does not match {}",
                    self.dates.format()
                );
            }
            if self.on_date_error == DateErrorPolicy::Halt {
                return Err(Error::DateParse { failures });
            }
        }
        stats.date_failures = failures;

        info!(
            backfilled = stats.industries_backfilled,
            canonicalized = stats.industries_canonicalized,
            countries = stats.countries_stripped,
            dates = stats.dates_parsed,
            quarantined = stats.date_failures.len(),
            "standardized records"
        );
        Ok((typed, stats))
    }

    fn canonicalize_industries(&self, rows: &mut [Ranked<RawRecord>]) -> usize {
        let mut changed = 0;
        for row in rows.iter_mut() {
            let canonical = row
                .record
                .industry
                .as_deref()
                .and_then(|i| self.industry_lookup.get(i));
            if let Some(canonical) = canonical {
                row.record.industry = Some(canonical.clone());
                changed += 1;
            }
        }
        changed
    }

    /// Convert date text into calendar dates. Rows whose text does not
    /// parse are returned separately, never coerced.
    fn type_dates(
        &self,
        rows: Vec<Ranked<RawRecord>>,
    ) -> (Vec<Ranked<CleanRecord>>, Vec<DateFailure>) {
        let mut typed = Vec::with_capacity(rows.len());
        let mut failures = Vec::new();

        for row in rows {
            let date = match row.record.date.as_deref() {
                None => None,
                Some(raw) => match self.dates.parse(raw) {
                    Some(date) => Some(date),
                    None => {
                        failures.push(DateFailure {
                            line: row.record.line,
                            company: row.record.company.clone(),
                            raw: raw.to_string(),
                        });
                        continue;
                    }
                },
            };
            typed.push(row.map(|r| CleanRecord {
                company: r.company,
                location: r.location,
                industry: r.industry,
                total_laid_off: r.total_laid_off,
                percentage_laid_off: r.percentage_laid_off,
                date,
                stage: r.stage,
                country: r.country,
                funds_raised_millions: r.funds_raised_millions,
            }));
        }

        (typed, failures)
    }
}

fn trim_companies(rows: &mut [Ranked<RawRecord>]) -> usize {
    let mut changed = 0;
    for row in rows.iter_mut() {
        let trimmed = row.record.company.trim();
        if trimmed.len() != row.record.company.len() {
            row.record.company = trimmed.to_string();
            changed += 1;
        }
    }
    changed
}

/// Trim industry labels and null the ones left empty. Returns how many
/// were nulled.
fn blank_empty_industries(rows: &mut [Ranked<RawRecord>]) -> usize {
    let mut changed = 0;
    for row in rows.iter_mut() {
        let Some(industry) = row.record.industry.as_deref() else {
            continue;
        };
        let trimmed = industry.trim();
        if trimmed.is_empty() {
            row.record.industry = None;
            changed += 1;
        } else if trimmed.len() != industry.len() {
            row.record.industry = Some(trimmed.to_string());
        }
    }
    changed
}

/// Fill null industries from same-company siblings. The most frequent
/// sibling label wins; ties go to the lexicographically smallest.
fn backfill_industries(rows: &mut [Ranked<RawRecord>]) -> (usize, Vec<AmbiguousBackfill>) {
    let mut candidates: HashMap<String, BTreeMap<String, usize>> = HashMap::new();
    for row in rows.iter() {
        if let Some(industry) = &row.record.industry {
            *candidates
                .entry(row.record.company.clone())
                .or_default()
                .entry(industry.clone())
                .or_insert(0) += 1;
        }
    }

    let chosen: HashMap<&str, &str> = candidates
        .iter()
        .filter_map(|(company, counts)| {
            // Highest count, then smallest label.
            counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(label, _)| (company.as_str(), label.as_str()))
        })
        .collect();

    let mut filled = 0;
    let mut ambiguous: BTreeMap<String, AmbiguousBackfill> = BTreeMap::new();
    for row in rows.iter_mut() {
        if row.record.industry.is_some() {
            continue;
        }
        let Some(label) = chosen.get(row.record.company.as_str()) else {
            debug!(company = %row.record.company, "no sibling industry to backfill");
            continue;
        };
        row.record.industry = Some(label.to_string());
        filled += 1;

        let counts = &candidates[&row.record.company];
        if counts.len() > 1 && !ambiguous.contains_key(&row.record.company) {
            warn!(
                company = %row.record.company,
                chosen = %label,
                candidates = counts.len(),
                "siblings disagree on industry"
            );
            ambiguous.insert(
                row.record.company.clone(),
                AmbiguousBackfill {
                    company: row.record.company.clone(),
                    candidates: counts.clone(),
                    chosen: label.to_string(),
                },
            );
        }
    }

    (filled, ambiguous.into_values().collect())
}

fn strip_country_periods(rows: &mut [Ranked<RawRecord>]) -> usize {
    let mut changed = 0;
    for row in rows.iter_mut() {
        let Some(country) = row.record.country.as_deref() else {
            continue;
        };
        let stripped = country.trim_end_matches('.');
        if stripped.len() != country.len() {
            row.record.country = if stripped.is_empty() {
                None
            } else {
                Some(stripped.to_string())
            };
            changed += 1;
        }
    }
    changed
}
