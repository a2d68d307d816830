use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Prefix of every generated checkout ID
pub const CHECKOUT_ID_PREFIX: &str = "CO";

/// Format the checkout ID for a sequence number, e.g. `CO000042`
#[must_use]
pub fn format_checkout_id(sequence: u32) -> String {
    format!("{CHECKOUT_ID_PREFIX}{sequence:06}")
}

/// Sequence number encoded in a generated checkout ID
#[must_use]
pub fn checkout_sequence(checkout_id: &str) -> Option<u32> {
    checkout_id.strip_prefix(CHECKOUT_ID_PREFIX)?.parse().ok()
}

/// Order checkouts by sequence number; IDs that carry none sort last, by text
pub fn sort_by_sequence(checkouts: &mut [Checkout]) {
    checkouts.sort_by_cached_key(|c| {
        let sequence = checkout_sequence(c.checkout_id());
        (sequence.is_none(), sequence, c.checkout_id().to_string())
    });
}

/// Lifecycle label of a checkout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CheckoutStatus {
    /// Book is on loan
    #[default]
    Active,
    /// Book has been brought back
    Returned,
    /// Book is on loan past its due date
    Overdue,
}

impl CheckoutStatus {
    /// Whether the copy is still out with the member
    #[must_use]
    pub fn is_on_loan(self) -> bool {
        matches!(self, Self::Active | Self::Overdue)
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "ACTIVE",
            Self::Returned => "RETURNED",
            Self::Overdue => "OVERDUE",
        })
    }
}

/// One loan of one copy of a book to one member
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Checkout {
    /// Ledger key
    checkout_id: String,
    /// Borrowing member
    member_id: String,
    /// Borrowed book
    isbn: String,
    /// Day the loan started
    checkout_date: NaiveDate,
    /// Last day the book may be kept without a fee
    due_date: NaiveDate,
    /// Day the book came back, once returned
    return_date: Option<NaiveDate>,
    /// Lifecycle label
    status: CheckoutStatus,
    /// Length of the loan in days; `due_date` is always `checkout_date + days_allowed`
    days_allowed: u32,
    /// Number of times the loan has been extended
    #[serde(default)]
    renewals: u32,
}

/// Add whole days to a date, clamping at the calendar's end
fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MAX)
}

impl Checkout {
    /// Open a new loan starting on `checkout_date`
    #[must_use]
    pub fn new(
        checkout_id: impl Into<String>,
        member_id: impl Into<String>,
        isbn: impl Into<String>,
        checkout_date: NaiveDate,
        days_allowed: u32,
    ) -> Self {
        Self {
            checkout_id: checkout_id.into(),
            member_id: member_id.into(),
            isbn: isbn.into(),
            checkout_date,
            due_date: add_days(checkout_date, days_allowed),
            return_date: None,
            status: CheckoutStatus::Active,
            days_allowed,
            renewals: 0,
        }
    }

    #[must_use]
    pub fn checkout_id(&self) -> &str {
        &self.checkout_id
    }

    #[must_use]
    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    #[must_use]
    pub fn checkout_date(&self) -> NaiveDate {
        self.checkout_date
    }

    #[must_use]
    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    #[must_use]
    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    #[must_use]
    pub fn status(&self) -> CheckoutStatus {
        self.status
    }

    #[must_use]
    pub fn days_allowed(&self) -> u32 {
        self.days_allowed
    }

    #[must_use]
    pub fn renewals(&self) -> u32 {
        self.renewals
    }

    /// Whether the copy is still out with the member
    #[must_use]
    pub fn is_on_loan(&self) -> bool {
        self.status.is_on_loan()
    }

    /// On loan and `today` is past the due date
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_on_loan() && today > self.due_date
    }

    /// Whole days past due, or zero if not overdue
    #[must_use]
    pub fn overdue_days(&self, today: NaiveDate) -> u64 {
        if self.is_overdue(today) {
            u64::try_from(today.signed_duration_since(self.due_date).num_days()).unwrap_or(0)
        } else {
            0
        }
    }

    /// Close the loan
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidState` if the checkout was already returned.
    pub fn mark_returned(&mut self, today: NaiveDate) -> Result<()> {
        if !self.is_on_loan() {
            return Err(LibraryError::invalid_state(format!(
                "checkout {} is not active",
                self.checkout_id
            )));
        }
        self.return_date = Some(today);
        self.status = CheckoutStatus::Returned;
        Ok(())
    }

    /// Stamp the `Overdue` label if the loan is past due. Returns whether the label changed.
    pub fn mark_overdue(&mut self, today: NaiveDate) -> bool {
        if self.status == CheckoutStatus::Active && self.is_overdue(today) {
            self.status = CheckoutStatus::Overdue;
            true
        } else {
            false
        }
    }

    /// Extend the loan so it falls due `loan_period_days` after `today`
    ///
    /// The original checkout date is kept; `days_allowed` grows to match the new due date.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::InvalidState` if the checkout is returned or overdue.
    pub fn renew(&mut self, today: NaiveDate, loan_period_days: u32) -> Result<()> {
        if self.status != CheckoutStatus::Active {
            return Err(LibraryError::invalid_state(format!(
                "cannot renew checkout {} with status {}",
                self.checkout_id, self.status
            )));
        }
        if self.is_overdue(today) {
            return Err(LibraryError::invalid_state(format!(
                "cannot renew overdue checkout {}",
                self.checkout_id
            )));
        }
        let due_date = add_days(today, loan_period_days);
        let days_allowed =
            u32::try_from(due_date.signed_duration_since(self.checkout_date).num_days())
                .map_err(|_| {
                    LibraryError::invalid_state(format!(
                        "renewal of {} would start before the loan",
                        self.checkout_id
                    ))
                })?;
        self.due_date = due_date;
        self.days_allowed = days_allowed;
        self.renewals = self.renewals.saturating_add(1);
        Ok(())
    }
}

impl fmt::Display for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | member {} | {} | out {} due {}",
            self.checkout_id, self.member_id, self.isbn, self.checkout_date, self.due_date
        )?;
        if let Some(returned) = self.return_date {
            write!(f, " returned {returned}")?;
        }
        write!(f, " [{}]", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap_or(NaiveDate::MIN)
    }

    #[test]
    fn test_checkout_id_is_zero_padded() {
        assert_eq!(format_checkout_id(1), "CO000001");
        assert_eq!(format_checkout_id(1_234_567), "CO1234567");
    }

    #[test]
    fn test_sequence_order_is_numeric() {
        assert_eq!(checkout_sequence("CO1000000"), Some(1_000_000));
        assert_eq!(checkout_sequence("LEGACY-7"), None);

        let mut checkouts: Vec<Checkout> = ["LEGACY-7", "CO1000000", "CO000002"]
            .into_iter()
            .map(|id| Checkout::new(id, "M1", "X", day(1), 14))
            .collect();
        sort_by_sequence(&mut checkouts);
        let ids: Vec<&str> = checkouts.iter().map(Checkout::checkout_id).collect();
        assert_eq!(ids, vec!["CO000002", "CO1000000", "LEGACY-7"]);
    }

    #[test]
    fn test_due_date_follows_days_allowed() {
        let checkout = Checkout::new("CO000001", "M1", "X", day(1), 14);
        assert_eq!(checkout.due_date(), day(15));
        assert!(!checkout.is_overdue(day(15)));
        assert!(checkout.is_overdue(day(16)));
        assert_eq!(checkout.overdue_days(day(18)), 3);
        assert_eq!(checkout.overdue_days(day(10)), 0);
    }

    #[test]
    fn test_returned_is_terminal() {
        let mut checkout = Checkout::new("CO000001", "M1", "X", day(1), 14);
        assert!(checkout.mark_returned(day(2)).is_ok());
        assert_eq!(checkout.return_date(), Some(day(2)));
        assert!(checkout.mark_returned(day(3)).is_err());
        assert!(!checkout.mark_overdue(day(30)));
        assert_eq!(checkout.overdue_days(day(30)), 0);
    }

    #[test]
    fn test_overdue_label_can_still_be_returned() {
        let mut checkout = Checkout::new("CO000001", "M1", "X", day(1), 14);
        assert!(checkout.mark_overdue(day(20)));
        assert!(!checkout.mark_overdue(day(21)));
        assert_eq!(checkout.status(), CheckoutStatus::Overdue);
        assert!(checkout.mark_returned(day(22)).is_ok());
    }

    #[test]
    fn test_renew_keeps_checkout_date() {
        let mut checkout = Checkout::new("CO000001", "M1", "X", day(1), 14);
        assert!(checkout.renew(day(10), 14).is_ok());
        assert_eq!(checkout.checkout_date(), day(1));
        assert_eq!(checkout.due_date(), day(24));
        assert_eq!(checkout.days_allowed(), 23);
        assert_eq!(checkout.renewals(), 1);

        assert!(checkout.renew(day(30), 14).is_err());
    }
}
