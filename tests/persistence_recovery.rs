//! Startup behavior when the data or config file is damaged.

use std::{fs, path::Path};

use chrono::NaiveDate;
use library_checkout::{
    Book, ErrorKind, JsonFileStore, LibraryConfig, LoanRules, Member, Result, RuleEngine,
    clock::ManualClock,
};

/// Clock fixed on an arbitrary day
fn clock() -> ManualClock {
    let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or(NaiveDate::MIN);
    ManualClock::new(today)
}

/// Open the library kept in `path`, starting empty if it cannot be read
fn open(path: &Path) -> RuleEngine {
    RuleEngine::open(
        Box::new(JsonFileStore::new(path)),
        Box::new(clock()),
        LoanRules::default(),
    )
}

/// Open the library kept in `path`, failing if it cannot be read
fn open_strict(path: &Path) -> Result<RuleEngine> {
    RuleEngine::open_strict(
        Box::new(JsonFileStore::new(path)),
        Box::new(clock()),
        LoanRules::default(),
    )
}

#[test]
fn test_corrupt_data_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("library.json");
    fs::write(&path, "{ this is not json")?;

    let strict = open_strict(&path);
    assert_eq!(strict.err().map(|e| e.kind()), Some(ErrorKind::Persistence));

    let mut engine = open(&path);
    assert_eq!(engine.total_books(), 0);

    // the first successful command replaces the damaged file
    engine.add_book(Book::new("X", "Only Copy", "Some Author", "Fiction", 1))?;
    let reopened = open_strict(&path)?;
    assert_eq!(reopened.total_books(), 1);
    Ok(())
}

#[test]
fn test_configured_rules_drive_the_engine() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("library.toml");
    let data_path = dir.path().join("data").join("library.json");
    let config_text = format!(
        "data_file = {:?}
seed_sample_data = false

[rules]
loan_period_days = 7
daily_overdue_fee = 0.25
",
        data_path.display().to_string()
    );
    fs::write(&config_path, config_text)?;

    let config = LibraryConfig::load(&config_path)?;
    config.validate()?;
    assert!(!config.seed_sample_data);
    assert_eq!(config.rules.default_max_checkouts, 5);

    let clock = clock();
    let mut engine = RuleEngine::open(
        Box::new(JsonFileStore::new(&config.data_file)),
        Box::new(clock.clone()),
        config.rules,
    );
    engine.add_book(Book::new("X", "Only Copy", "Some Author", "Fiction", 1))?;
    engine.add_member(Member::new("M1", "Test User", "test@example.com", "555"))?;
    let checkout = engine.checkout_book("M1", "X")?;
    assert_eq!(checkout.days_allowed(), 7);

    clock.advance(11);
    let fee = engine.overdue_fee(checkout.checkout_id());
    assert!((fee - 1.0).abs() < f64::EPSILON);
    assert!(data_path.exists());
    Ok(())
}

#[test]
fn test_missing_config_uses_defaults() {
    let config = LibraryConfig::load_or_default("definitely/not/here.toml");
    assert_eq!(config.rules.loan_period_days, 14);
    assert!(config.seed_sample_data);
    assert!(config.validate().is_ok());
}
