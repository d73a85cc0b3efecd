use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Result, DEFAULT_DATE_FORMAT};
use crate::values::DateParser;

/// Built-in configuration, used when no `--config` file is given
pub const DEFAULT_CONFIG: &str = r#"
version = 1
date_format = "%m/%d/%Y"

[industry_aliases]
Crypto = ["Crypto Currency", "CryptoCurrency", "Cryptocurrency", "crypto"]
"#;

/// Cleaning configuration: the versioned lookup tables the standardize stage
/// applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    pub version: u32,

    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Canonical industry label -> variant spellings that collapse onto it
    #[serde(default)]
    pub industry_aliases: BTreeMap<String, Vec<String>>,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self::from_toml(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            version: 1,
            date_format: default_date_format(),
            industry_aliases: BTreeMap::new(),
        })
    }
}

impl CleaningConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CleaningConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise the built-in default
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Self::from_toml(DEFAULT_CONFIG),
        }
    }

    fn validate(&self) -> Result<()> {
        DateParser::new(&self.date_format)?;

        let mut owner: HashMap<&str, &str> = HashMap::new();
        for (canonical, variants) in &self.industry_aliases {
            if canonical.trim().is_empty() {
                return Err(Error::Config("blank canonical industry label".to_string()));
            }
            for variant in variants {
                if variant.trim().is_empty() {
                    return Err(Error::Config(format!(
                        "blank variant listed under {:?}",
                        canonical
                    )));
                }
                if let Some(previous) = owner.insert(variant.as_str(), canonical.as_str()) {
                    if previous != canonical.as_str() {
                        return Err(Error::Config(format!(
                            "variant {:?} maps to both {:?} and {:?}",
                            variant, previous, canonical
                        )));
                    }
                }
            }
        }

        for canonical in self.industry_aliases.keys() {
            if let Some(other) = owner.get(canonical.as_str()) {
                if *other != canonical.as_str() {
                    return Err(Error::Config(format!(
                        "canonical label {:?} is also listed as a variant of {:?}",
                        canonical, other
                    )));
                }
            }
        }

        Ok(())
    }

    /// Flatten the alias table into variant -> canonical lookups
    pub fn industry_lookup(&self) -> HashMap<String, String> {
        self.industry_aliases
            .iter()
            .flat_map(|(canonical, variants)| {
                variants
                    .iter()
                    .filter(move |v| *v != canonical)
                    .map(move |v| (v.clone(), canonical.clone()))
            })
            .collect()
    }
}
