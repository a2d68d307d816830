use crate::{
    book::Book,
    checkout::Checkout,
    engine::{LibraryStatistics, RuleEngine},
    member::Member,
};

/// Plain-text rendering of library records
#[derive(Debug)]
pub struct Report;

impl Report {
    /// One line per book under a heading, or `empty` if there are none
    #[must_use]
    pub fn books(heading: &str, books: &[Book], empty: &str) -> String {
        Self::section(heading, books.iter().map(ToString::to_string), empty)
    }

    /// One line per member under a heading, or `empty` if there are none
    #[must_use]
    pub fn members(heading: &str, members: &[Member], empty: &str) -> String {
        Self::section(heading, members.iter().map(ToString::to_string), empty)
    }

    /// One line per checkout under a heading, or `empty` if there are none
    #[must_use]
    pub fn checkouts(heading: &str, checkouts: &[Checkout], empty: &str) -> String {
        Self::section(heading, checkouts.iter().map(ToString::to_string), empty)
    }

    /// Overdue loans with days late and fee accrued
    #[must_use]
    pub fn overdue(engine: &RuleEngine) -> String {
        let overdue = engine.overdue_checkouts();
        let lines = overdue.iter().map(|checkout| {
            let id = checkout.checkout_id();
            format!(
                "{checkout} - Overdue by {} days - Fee: ${:.2}",
                engine.overdue_days(id),
                engine.overdue_fee(id)
            )
        });
        Self::section("Overdue Checkouts", lines, "No overdue checkouts.")
    }

    /// The statistics dashboard
    #[must_use]
    pub fn statistics(stats: &LibraryStatistics) -> String {
        let rows = [
            ("Total Books", stats.total_books.to_string()),
            ("Available Copies", stats.total_available_copies.to_string()),
            ("Checked Out Copies", stats.total_checked_out_copies.to_string()),
            ("Total Members", stats.total_members.to_string()),
            ("Active Checkouts", stats.total_active_checkouts.to_string()),
            ("Overdue Checkouts", stats.overdue_checkouts.to_string()),
        ];
        let mut out = String::from("========== LIBRARY STATISTICS ==========\n");
        for (label, value) in rows {
            out.push_str(&format!("{label:<20}{value:>8}\n"));
        }
        out.push_str("========================================\n");
        out
    }

    /// Heading followed by one line per item
    fn section(heading: &str, lines: impl Iterator<Item = String>, empty: &str) -> String {
        let mut out = format!("--- {heading} ---\n");
        let mut any = false;
        for line in lines {
            any = true;
            out.push_str(&line);
            out.push('\n');
        }
        if any { out } else { format!("{empty}\n") }
    }
}
