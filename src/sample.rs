//! Starter catalog and roster for a fresh library.

use crate::{book::Book, engine::RuleEngine, error::Result, member::Member};

/// Books added to an empty library
#[must_use]
pub fn sample_books() -> Vec<Book> {
    vec![
        Book::new(
            "978-0-13-468599-1",
            "Clean Code",
            "Robert C. Martin",
            "Programming",
            3,
        ),
        Book::new(
            "978-0-13-468750-6",
            "The Pragmatic Programmer",
            "David Thomas",
            "Programming",
            2,
        ),
        Book::new(
            "978-0-13-468751-3",
            "Design Patterns",
            "Gang of Four",
            "Programming",
            1,
        ),
        Book::new(
            "978-0-07-149143-0",
            "Thinking in Java",
            "Bruce Eckel",
            "Programming",
            2,
        ),
        Book::new(
            "978-0-59-651298-4",
            "Head First Java",
            "Kathy Sierra",
            "Programming",
            4,
        ),
    ]
}

/// Members added to an empty library, each with `max_checkouts` as their cap
#[must_use]
pub fn sample_members(max_checkouts: u32) -> Vec<Member> {
    vec![
        Member::new("M001", "John Doe", "john@example.com", "732-555-1001"),
        Member::new("M002", "Jane Smith", "jane@example.com", "609-555-1002"),
        Member::new("M003", "Bob Johnson", "bob@example.com", "848-555-1003"),
    ]
    .into_iter()
    .map(|member| member.with_max_checkouts(max_checkouts))
    .collect()
}

/// Add the sample records if the library has no books and no members.
///
/// Returns whether anything was added.
///
/// # Errors
///
/// Returns an error if a sample record fails validation.
pub fn seed_if_empty(engine: &mut RuleEngine) -> Result<bool> {
    if engine.total_books() > 0 || engine.total_members() > 0 {
        log::info!("Loaded existing library data");
        return Ok(false);
    }
    for book in sample_books() {
        engine.add_book(book)?;
    }
    let cap = engine.rules().default_max_checkouts;
    for member in sample_members(cap) {
        engine.add_member(member)?;
    }
    log::info!("Sample data initialized");
    Ok(true)
}
