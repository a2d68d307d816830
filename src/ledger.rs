//! Checkout store keyed by checkout ID, with a per-member history index.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::checkout::{Checkout, sort_by_sequence};

/// Owns every [`Checkout`] record
#[derive(Debug, Default, Clone)]
pub struct CheckoutLedger {
    /// Checkouts by checkout ID
    records: HashMap<String, Checkout>,
    /// Checkout IDs per member, in the order they were recorded
    by_member: HashMap<String, Vec<String>>,
}

impl CheckoutLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a checkout and append it to its member's history.
    ///
    /// Recording an ID that is already present replaces the stored record
    /// without adding a second history entry.
    pub fn record(&mut self, checkout: Checkout) {
        let checkout_id = checkout.checkout_id().to_string();
        if !self.records.contains_key(&checkout_id) {
            self.by_member
                .entry(checkout.member_id().to_string())
                .or_default()
                .push(checkout_id.clone());
        }
        self.records.insert(checkout_id, checkout);
    }

    #[must_use]
    pub fn get(&self, checkout_id: &str) -> Option<&Checkout> {
        self.records.get(checkout_id)
    }

    /// Mutable access for return, renewal and overdue stamping
    pub fn get_mut(&mut self, checkout_id: &str) -> Option<&mut Checkout> {
        self.records.get_mut(checkout_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every checkout the member has made, oldest first
    #[must_use]
    pub fn history_for_member(&self, member_id: &str) -> Vec<Checkout> {
        self.by_member.get(member_id).map_or_else(Vec::new, |ids| {
            ids.iter()
                .filter_map(|id| self.records.get(id))
                .cloned()
                .collect()
        })
    }

    /// The member's checkouts that are still on loan, oldest first
    #[must_use]
    pub fn active_for_member(&self, member_id: &str) -> Vec<Checkout> {
        let mut history = self.history_for_member(member_id);
        history.retain(Checkout::is_on_loan);
        history
    }

    /// Number of the member's checkouts still on loan
    #[must_use]
    pub fn count_active_for_member(&self, member_id: &str) -> usize {
        self.by_member.get(member_id).map_or(0, |ids| {
            ids.iter()
                .filter_map(|id| self.records.get(id))
                .filter(|checkout| checkout.is_on_loan())
                .count()
        })
    }

    /// Every checkout still on loan, ordered by checkout sequence
    #[must_use]
    pub fn all_active(&self) -> Vec<Checkout> {
        let mut active: Vec<Checkout> = self
            .records
            .values()
            .filter(|c| c.is_on_loan())
            .cloned()
            .collect();
        sort_by_sequence(&mut active);
        active
    }

    /// Checkouts past due on `today`, earliest due date first.
    ///
    /// This is a pure query; stamping the `Overdue` label is [`Self::mark_overdue`].
    #[must_use]
    pub fn all_overdue(&self, today: NaiveDate) -> Vec<Checkout> {
        let mut overdue: Vec<Checkout> = self
            .records
            .values()
            .filter(|c| c.is_overdue(today))
            .cloned()
            .collect();
        sort_by_sequence(&mut overdue);
        // stable sort keeps creation order among equal due dates
        overdue.sort_by_key(Checkout::due_date);
        overdue
    }

    /// Stamp the `Overdue` label on every loan past due, returning the IDs that changed
    pub fn mark_overdue(&mut self, today: NaiveDate) -> Vec<String> {
        let mut changed: Vec<String> = self
            .records
            .values_mut()
            .filter_map(|c| {
                c.mark_overdue(today).then(|| c.checkout_id().to_string())
            })
            .collect();
        changed.sort();
        changed
    }

    /// Checkouts of one book, ordered by checkout sequence
    #[must_use]
    pub fn for_book(&self, isbn: &str) -> Vec<Checkout> {
        let mut found: Vec<Checkout> = self
            .records
            .values()
            .filter(|c| c.isbn() == isbn)
            .cloned()
            .collect();
        sort_by_sequence(&mut found);
        found
    }

    /// Every checkout, ordered by checkout sequence
    #[must_use]
    pub fn all(&self) -> Vec<Checkout> {
        let mut all: Vec<Checkout> = self.records.values().cloned().collect();
        sort_by_sequence(&mut all);
        all
    }

    /// Every checkout in arbitrary order
    #[must_use]
    pub fn checkouts(&self) -> impl Iterator<Item = &Checkout> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CheckoutStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap_or(NaiveDate::MIN)
    }

    fn ledger() -> CheckoutLedger {
        let mut ledger = CheckoutLedger::new();
        ledger.record(Checkout::new("CO000001", "M1", "A", day(1), 14));
        ledger.record(Checkout::new("CO000002", "M2", "B", day(2), 14));
        ledger.record(Checkout::new("CO000003", "M1", "C", day(1), 7));
        ledger
    }

    #[test]
    fn test_history_keeps_insertion_order() {
        let ledger = ledger();
        let ids: Vec<String> = ledger
            .history_for_member("M1")
            .iter()
            .map(|c| c.checkout_id().to_string())
            .collect();
        assert_eq!(ids, vec!["CO000001", "CO000003"]);
        assert!(ledger.history_for_member("unknown").is_empty());
    }

    #[test]
    fn test_rerecording_does_not_duplicate_history() {
        let mut ledger = ledger();
        ledger.record(Checkout::new("CO000001", "M1", "A", day(3), 14));
        assert_eq!(ledger.history_for_member("M1").len(), 2);
        let checkout_date = ledger.get("CO000001").map(Checkout::checkout_date);
        assert_eq!(checkout_date, Some(day(3)));
    }

    #[test]
    fn test_order_follows_sequence_past_six_digits() {
        let mut ledger = CheckoutLedger::new();
        ledger.record(Checkout::new("CO1000000", "M1", "A", day(1), 14));
        ledger.record(Checkout::new("CO999999", "M1", "B", day(1), 14));
        let all = ledger.all();
        let ids: Vec<&str> = all.iter().map(Checkout::checkout_id).collect();
        assert_eq!(ids, vec!["CO999999", "CO1000000"]);
        let active = ledger.all_active();
        let active_ids: Vec<&str> = active.iter().map(Checkout::checkout_id).collect();
        assert_eq!(active_ids, ids);
    }

    #[test]
    fn test_active_filters_returned() {
        let mut ledger = ledger();
        if let Some(checkout) = ledger.get_mut("CO000001") {
            assert!(checkout.mark_returned(day(4)).is_ok());
        }
        assert_eq!(ledger.active_for_member("M1").len(), 1);
        assert_eq!(ledger.count_active_for_member("M1"), 1);
        assert_eq!(ledger.all_active().len(), 2);
    }

    #[test]
    fn test_overdue_query_is_pure_and_sorted_by_due_date() {
        let mut ledger = ledger();
        let overdue = ledger.all_overdue(day(20));
        let ids: Vec<&str> = overdue.iter().map(Checkout::checkout_id).collect();
        assert_eq!(ids, vec!["CO000003", "CO000001", "CO000002"]);
        let statuses: Vec<CheckoutStatus> = ledger.checkouts().map(Checkout::status).collect();
        assert!(statuses.iter().all(|s| *s == CheckoutStatus::Active));

        assert_eq!(ledger.mark_overdue(day(10)), vec!["CO000003".to_string()]);
        assert!(ledger.mark_overdue(day(10)).is_empty());
        // labelled records still count as on loan
        assert_eq!(ledger.count_active_for_member("M1"), 2);
    }
}
