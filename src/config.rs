//! Configuration loaded from a TOML file.
//!
//! ```toml
//! data_file = "library_data.json"
//! seed_sample_data = true
//!
//! [rules]
//! loan_period_days = 14
//! daily_overdue_fee = 1.0
//! default_max_checkouts = 5
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Root application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Where the library snapshot is kept
    #[serde(default = "defaults::data_file")]
    pub data_file: PathBuf,

    /// Add the sample catalog and roster when the library starts empty
    #[serde(default = "defaults::seed_sample_data")]
    pub seed_sample_data: bool,

    /// Loan and fee rules
    #[serde(default)]
    pub rules: LoanRules,
}

/// Loan length, fee rate and member cap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanRules {
    /// Days from checkout to due date
    #[serde(default = "defaults::loan_period_days")]
    pub loan_period_days: u32,

    /// Fee charged per whole day past due
    #[serde(default = "defaults::daily_overdue_fee")]
    pub daily_overdue_fee: f64,

    /// Checkout cap for members added without an explicit one
    #[serde(default = "defaults::default_max_checkouts")]
    pub default_max_checkouts: u32,
}

impl Default for LoanRules {
    fn default() -> Self {
        Self {
            loan_period_days: defaults::loan_period_days(),
            daily_overdue_fee: defaults::daily_overdue_fee(),
            default_max_checkouts: defaults::default_max_checkouts(),
        }
    }
}

impl LoanRules {
    /// Check the rules are usable
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Config` for a zero loan period or a negative or non-finite fee.
    pub fn validate(&self) -> Result<()> {
        if self.loan_period_days == 0 {
            return Err(LibraryError::config("rules.loan_period_days must be > 0"));
        }
        if !self.daily_overdue_fee.is_finite() || self.daily_overdue_fee < 0.0 {
            return Err(LibraryError::config(
                "rules.daily_overdue_fee must be a non-negative number",
            ));
        }
        Ok(())
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_file: defaults::data_file(),
            seed_sample_data: defaults::seed_sample_data(),
            rules: LoanRules::default(),
        }
    }
}

impl LibraryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration, falling back to defaults if the file is missing or invalid.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(LibraryError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!(
                    "Config load failed from {}: {e}. Using defaults.",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Validate configuration values for basic sanity.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Config` if the data file path is empty or the rules are unusable.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(LibraryError::config("data_file is empty"));
        }
        self.rules.validate()
    }
}

/// Default values for configuration fields
mod defaults {
    use std::path::PathBuf;

    use crate::member::DEFAULT_MAX_CHECKOUTS;

    /// Default snapshot location
    pub fn data_file() -> PathBuf {
        PathBuf::from("library_data.json")
    }

    /// Seed an empty library by default
    pub fn seed_sample_data() -> bool {
        true
    }

    /// Two-week loans
    pub fn loan_period_days() -> u32 {
        14
    }

    /// One currency unit per day late
    pub fn daily_overdue_fee() -> f64 {
        1.0
    }

    /// Same cap as [`crate::member::Member::new`]
    pub fn default_max_checkouts() -> u32 {
        DEFAULT_MAX_CHECKOUTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: LibraryConfig = toml::from_str(
            r#"
            data_file = "books.json"

            [rules]
            loan_period_days = 21
            "#,
        )
        .unwrap_or_default();
        assert_eq!(config.data_file, PathBuf::from("books.json"));
        assert!(config.seed_sample_data);
        assert_eq!(config.rules.loan_period_days, 21);
        assert_eq!(config.rules.default_max_checkouts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_rules() {
        let mut config = LibraryConfig::default();
        config.rules.loan_period_days = 0;
        assert!(config.validate().is_err());

        let mut config = LibraryConfig::default();
        config.rules.daily_overdue_fee = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = LibraryConfig::load_or_default("/nonexistent/library.toml");
        assert_eq!(config, LibraryConfig::default());
    }
}
