//! End-to-end lending against a JSON data file.

use std::path::Path;

use chrono::NaiveDate;
use library_checkout::{
    Book, Checkout, CheckoutStatus, ErrorKind, JsonFileStore, LoanRules, Member, Result, RuleEngine,
    clock::ManualClock,
};

/// A day in March 2024
fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap_or(NaiveDate::MIN)
}

/// First day of every scenario
fn start_date() -> NaiveDate {
    march(1)
}

/// Open the library kept in `path` with a hand-driven clock
fn open_at(path: &Path, clock: &ManualClock) -> RuleEngine {
    RuleEngine::open(
        Box::new(JsonFileStore::new(path)),
        Box::new(clock.clone()),
        LoanRules::default(),
    )
}

#[test]
fn test_lend_overdue_and_return() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("library.json");
    let clock = ManualClock::new(start_date());
    let mut engine = open_at(&path, &clock);

    engine.add_book(Book::new("X", "Only Copy", "Some Author", "Fiction", 1))?;
    engine.add_member(Member::new("M1", "Test User", "test@example.com", "555"))?;
    engine.add_member(Member::new("M2", "Other User", "other@example.com", "556"))?;

    let checkout = engine.checkout_book("M1", "X")?;
    assert_eq!(checkout.checkout_id(), "CO000001");
    assert_eq!(checkout.due_date(), march(15));

    let second = engine.checkout_book("M2", "X");
    assert_eq!(second.err().map(|e| e.kind()), Some(ErrorKind::Unavailable));

    clock.advance(17);
    assert_eq!(engine.overdue_days("CO000001"), 3);
    assert!((engine.overdue_fee("CO000001") - 3.0).abs() < f64::EPSILON);
    assert_eq!(engine.overdue_checkouts().len(), 1);

    let returned = engine.return_book("CO000001")?;
    assert_eq!(returned.status(), CheckoutStatus::Returned);
    assert_eq!(engine.find_book("X").map(Book::available_copies), Some(1));
    assert!(engine.overdue_checkouts().is_empty());
    assert_eq!(engine.overdue_days("CO000001"), 0);
    Ok(())
}

#[test]
fn test_reopened_library_keeps_state_and_counter() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("library.json");
    let clock = ManualClock::new(start_date());

    let before = {
        let mut engine = open_at(&path, &clock);
        engine.add_book(Book::new("Y", "Many Copies", "Other Author", "Fiction", 3))?;
        engine.add_member(Member::new("M1", "Test User", "test@example.com", "555"))?;
        engine.checkout_book("M1", "Y")?;
        let second = engine.checkout_book("M1", "Y")?;
        engine.return_book(second.checkout_id())?;
        engine.snapshot()
    };
    assert!(path.exists());

    let mut engine = open_at(&path, &clock);
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.checkout_counter(), 2);
    assert_eq!(engine.total_active_checkouts(), 1);
    assert_eq!(engine.total_checked_out_copies(), 1);

    let next = engine.checkout_book("M1", "Y")?;
    assert_eq!(next.checkout_id(), "CO000003");
    Ok(())
}

#[test]
fn test_renewal_survives_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("library.json");
    let clock = ManualClock::new(start_date());

    {
        let mut engine = open_at(&path, &clock);
        engine.add_book(Book::new("X", "Only Copy", "Some Author", "Fiction", 1))?;
        engine.add_member(Member::new("M1", "Test User", "test@example.com", "555"))?;
        engine.checkout_book("M1", "X")?;
        clock.advance(10);
        engine.renew_checkout("CO000001")?;
    }

    let engine = open_at(&path, &clock);
    let renewed = engine.get_checkout("CO000001");
    assert_eq!(renewed.map(Checkout::checkout_date), Some(start_date()));
    assert_eq!(renewed.map(Checkout::due_date), Some(march(25)));
    assert_eq!(renewed.map(Checkout::renewals), Some(1));
    Ok(())
}
