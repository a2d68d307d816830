use std::fmt;

use chrono::NaiveDate;

use crate::{
    book::Book,
    catalog::Catalog,
    checkout::{Checkout, checkout_sequence, format_checkout_id, sort_by_sequence},
    clock::Clock,
    config::LoanRules,
    error::{LibraryError, Result},
    events::LibraryEvent,
    ledger::CheckoutLedger,
    member::{Member, MemberStatus},
    observers::LibraryObserver,
    persistence::{Snapshot, SnapshotStore},
    roster::Roster,
};

/// Aggregate counts over the whole library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStatistics {
    /// Distinct titles in the catalog
    pub total_books: usize,
    /// Copies on the shelf
    pub total_available_copies: u64,
    /// Copies out on loan
    pub total_checked_out_copies: u64,
    /// Registered members
    pub total_members: usize,
    /// Checkouts still on loan
    pub total_active_checkouts: usize,
    /// Checkouts on loan past their due date
    pub overdue_checkouts: usize,
}

/// Checkout rules over the catalog, roster and ledger.
///
/// Every successful command writes the full library through the configured
/// [`SnapshotStore`]. A failed write is logged and the in-memory state stays
/// authoritative.
pub struct RuleEngine {
    /// Books by ISBN
    catalog: Catalog,
    /// Members by ID
    roster: Roster,
    /// Checkouts by ID and by member
    ledger: CheckoutLedger,
    /// Last checkout sequence number handed out
    checkout_counter: u32,
    /// Loan period, fee rate and default cap
    rules: LoanRules,
    /// Where snapshots are written
    store: Box<dyn SnapshotStore>,
    /// Source of today's date
    clock: Box<dyn Clock>,
    /// Registered event observers
    observers: Vec<Box<dyn LibraryObserver>>,
}

// Manual implementation of Debug for RuleEngine
impl fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("catalog", &self.catalog)
            .field("roster", &self.roster)
            .field("ledger", &self.ledger)
            .field("checkout_counter", &self.checkout_counter)
            .field("rules", &self.rules)
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl RuleEngine {
    /// Create an empty library
    #[must_use]
    pub fn new(store: Box<dyn SnapshotStore>, clock: Box<dyn Clock>, rules: LoanRules) -> Self {
        Self {
            catalog: Catalog::new(),
            roster: Roster::new(),
            ledger: CheckoutLedger::new(),
            checkout_counter: 0,
            rules,
            store,
            clock,
            observers: Vec::new(),
        }
    }

    /// Load the library from `store`, starting empty if nothing usable is stored.
    ///
    /// A missing snapshot is normal on first run. An unreadable or inconsistent
    /// one is logged and ignored.
    #[must_use]
    pub fn open(store: Box<dyn SnapshotStore>, clock: Box<dyn Clock>, rules: LoanRules) -> Self {
        let mut engine = Self::new(store, clock, rules);
        match engine.store.load() {
            Ok(Some(snapshot)) => {
                if let Err(e) = engine.restore(snapshot) {
                    log::error!("Error loading data: {e}");
                    engine.clear();
                }
            }
            Ok(None) => log::info!("No saved library data, starting empty"),
            Err(e) => log::error!("Error loading data: {e}"),
        }
        engine
    }

    /// Load the library from `store`, failing on anything but a clean or missing snapshot
    ///
    /// # Errors
    ///
    /// Returns the store's error if the snapshot cannot be read, or
    /// `LibraryError::LoadError` if a stored record is invalid.
    pub fn open_strict(
        store: Box<dyn SnapshotStore>,
        clock: Box<dyn Clock>,
        rules: LoanRules,
    ) -> Result<Self> {
        let mut engine = Self::new(store, clock, rules);
        if let Some(snapshot) = engine.store.load()? {
            engine.restore(snapshot)?;
        }
        Ok(engine)
    }

    /// Replace the in-memory library with the contents of `snapshot`
    fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        self.clear();
        for book in snapshot.books {
            book.validate()
                .map_err(|e| LibraryError::LoadError(e.to_string()))?;
            self.catalog.insert(book);
        }
        for member in snapshot.members {
            member
                .validate()
                .map_err(|e| LibraryError::LoadError(e.to_string()))?;
            self.roster.insert(member);
        }
        let mut checkouts = snapshot.checkouts;
        sort_by_sequence(&mut checkouts);
        let highest = checkouts
            .iter()
            .filter_map(|c| checkout_sequence(c.checkout_id()))
            .max();
        for checkout in checkouts {
            self.ledger.record(checkout);
        }
        // never hand out an ID that is already in the ledger
        self.checkout_counter = snapshot.checkout_counter.max(highest.unwrap_or(0));
        log::info!(
            "Loaded {} books, {} members, {} checkouts",
            self.catalog.len(),
            self.roster.len(),
            self.ledger.len()
        );
        Ok(())
    }

    /// Drop every record
    fn clear(&mut self) {
        self.catalog = Catalog::new();
        self.roster = Roster::new();
        self.ledger = CheckoutLedger::new();
        self.checkout_counter = 0;
    }

    /// Register an observer to be notified of changes
    pub fn register_observer(&mut self, observer: Box<dyn LibraryObserver>) {
        self.observers.push(observer);
    }

    /// Notify observers of a change
    fn emit(&self, event: &LibraryEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    /// Full copy of the library as it would be persisted
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let mut books: Vec<Book> = self.catalog.books().cloned().collect();
        books.sort_by(|a, b| a.isbn().cmp(b.isbn()));
        let mut members: Vec<Member> = self.roster.members().cloned().collect();
        members.sort_by(|a, b| a.member_id().cmp(b.member_id()));
        Snapshot {
            books,
            members,
            checkouts: self.ledger.all(),
            checkout_counter: self.checkout_counter,
        }
    }

    /// Write the library through the store, logging instead of failing
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.snapshot()) {
            log::error!("Error saving data: {e}");
        }
    }

    #[must_use]
    pub fn rules(&self) -> &LoanRules {
        &self.rules
    }

    /// Today's date according to the engine's clock
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    #[must_use]
    pub fn checkout_counter(&self) -> u32 {
        self.checkout_counter
    }

    // ==================== BOOKS ====================

    /// Add a book, or overwrite the one with the same ISBN
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the book is missing required fields.
    pub fn add_book(&mut self, book: Book) -> Result<()> {
        book.validate()?;
        let isbn = book.isbn().to_string();
        self.catalog.insert(book);
        self.persist();
        self.emit(&LibraryEvent::BookAdded { isbn });
        Ok(())
    }

    /// Acquire more copies of a catalogued book
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` for a zero count and
    /// `LibraryError::NotFound` for an unknown ISBN.
    pub fn add_copies(&mut self, isbn: &str, count: u32) -> Result<()> {
        if count == 0 {
            return Err(LibraryError::validation("copy count must be positive"));
        }
        let book = self
            .catalog
            .find_mut(isbn)
            .ok_or_else(|| LibraryError::not_found("Book", isbn))?;
        book.add_copies(count)?;
        self.persist();
        self.emit(&LibraryEvent::CopiesAdded {
            isbn: isbn.to_string(),
            count,
        });
        Ok(())
    }

    /// Take a book out of the catalog
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` for an unknown ISBN and
    /// `LibraryError::InvalidState` while any copy is on loan.
    pub fn remove_book(&mut self, isbn: &str) -> Result<Book> {
        if self.catalog.find(isbn).is_none() {
            return Err(LibraryError::not_found("Book", isbn));
        }
        let lent_out = |c: &Checkout| c.isbn() == isbn && c.is_on_loan();
        if self.ledger.checkouts().any(lent_out) {
            return Err(LibraryError::invalid_state(format!(
                "book {isbn} has copies on loan"
            )));
        }
        let book = self
            .catalog
            .remove(isbn)
            .ok_or_else(|| LibraryError::not_found("Book", isbn))?;
        self.persist();
        self.emit(&LibraryEvent::BookRemoved {
            isbn: isbn.to_string(),
        });
        Ok(book)
    }

    #[must_use]
    pub fn find_book(&self, isbn: &str) -> Option<&Book> {
        self.catalog.find(isbn)
    }

    #[must_use]
    pub fn search_by_title(&self, keyword: &str) -> Vec<Book> {
        self.catalog.search_by_title(keyword)
    }

    #[must_use]
    pub fn search_by_author(&self, keyword: &str) -> Vec<Book> {
        self.catalog.search_by_author(keyword)
    }

    /// Every book, sorted by title
    #[must_use]
    pub fn list_books(&self) -> Vec<Book> {
        self.catalog.list_all()
    }

    /// Books with a copy on the shelf
    #[must_use]
    pub fn list_available_books(&self) -> Vec<Book> {
        self.catalog.list_available()
    }

    /// Loan history of one book
    #[must_use]
    pub fn book_history(&self, isbn: &str) -> Vec<Checkout> {
        self.ledger.for_book(isbn)
    }

    // ==================== MEMBERS ====================

    /// Register a member, or overwrite the one with the same ID
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the member is missing required fields.
    pub fn add_member(&mut self, member: Member) -> Result<()> {
        member.validate()?;
        let member_id = member.member_id().to_string();
        self.roster.insert(member);
        self.persist();
        self.emit(&LibraryEvent::MemberAdded { member_id });
        Ok(())
    }

    /// Update whichever contact fields are non-empty. Unknown members are ignored.
    ///
    /// Returns whether a member was updated.
    pub fn update_member_contact(
        &mut self,
        member_id: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> bool {
        if !self.roster.update_contact(member_id, email, phone) {
            log::debug!("Ignoring contact update for unknown member {member_id}");
            return false;
        }
        self.persist();
        self.emit(&LibraryEvent::MemberUpdated {
            member_id: member_id.to_string(),
        });
        true
    }

    /// Change a member's standing. Unknown members are ignored.
    ///
    /// Returns whether a member was updated.
    pub fn update_member_status(&mut self, member_id: &str, status: MemberStatus) -> bool {
        if !self.roster.update_status(member_id, status) {
            log::debug!("Ignoring status update for unknown member {member_id}");
            return false;
        }
        self.persist();
        self.emit(&LibraryEvent::MemberStatusChanged {
            member_id: member_id.to_string(),
            status,
        });
        true
    }

    /// Change a member's checkout cap. Unknown members are ignored.
    ///
    /// Returns whether a member was updated.
    pub fn update_member_limit(&mut self, member_id: &str, max_checkouts: u32) -> bool {
        if !self.roster.update_max_checkouts(member_id, max_checkouts) {
            log::debug!("Ignoring cap update for unknown member {member_id}");
            return false;
        }
        self.persist();
        self.emit(&LibraryEvent::MemberUpdated {
            member_id: member_id.to_string(),
        });
        true
    }

    /// Take a member off the roster
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::NotFound` for an unknown member and
    /// `LibraryError::InvalidState` while the member has books on loan.
    pub fn remove_member(&mut self, member_id: &str) -> Result<Member> {
        if self.roster.find(member_id).is_none() {
            return Err(LibraryError::not_found("Member", member_id));
        }
        if self.ledger.count_active_for_member(member_id) > 0 {
            return Err(LibraryError::invalid_state(format!(
                "member {member_id} still has books on loan"
            )));
        }
        let member = self
            .roster
            .remove(member_id)
            .ok_or_else(|| LibraryError::not_found("Member", member_id))?;
        self.persist();
        self.emit(&LibraryEvent::MemberRemoved {
            member_id: member_id.to_string(),
        });
        Ok(member)
    }

    #[must_use]
    pub fn find_member(&self, member_id: &str) -> Option<&Member> {
        self.roster.find(member_id)
    }

    /// Every member, sorted by name
    #[must_use]
    pub fn list_members(&self) -> Vec<Member> {
        self.roster.list_all()
    }

    // ==================== CHECKOUTS ====================

    /// Lend a copy of `isbn` to `member_id`
    ///
    /// # Errors
    ///
    /// - `LibraryError::NotFound` if the member or book is unknown
    /// - `LibraryError::InvalidState` if the member is not active
    /// - `LibraryError::LimitExceeded` if the member is at their cap
    /// - `LibraryError::Unavailable` if no copy is on the shelf
    pub fn checkout_book(&mut self, member_id: &str, isbn: &str) -> Result<Checkout> {
        let member = self
            .roster
            .find(member_id)
            .ok_or_else(|| LibraryError::not_found("Member", member_id))?;
        if self.catalog.find(isbn).is_none() {
            return Err(LibraryError::not_found("Book", isbn));
        }
        if !member.is_active() {
            return Err(LibraryError::invalid_state(format!(
                "member {member_id} is {}",
                member.status()
            )));
        }

        let limit = member.max_checkouts();
        let on_loan = self.ledger.count_active_for_member(member_id);
        if u32::try_from(on_loan).unwrap_or(u32::MAX) >= limit {
            return Err(LibraryError::LimitExceeded {
                member_id: member_id.to_string(),
                limit,
            });
        }

        let sequence = self
            .checkout_counter
            .checked_add(1)
            .ok_or_else(|| LibraryError::invalid_state("checkout IDs exhausted"))?;

        if !self.catalog.checkout_copy(isbn) {
            return Err(LibraryError::Unavailable {
                isbn: isbn.to_string(),
            });
        }

        self.checkout_counter = sequence;
        let checkout = Checkout::new(
            format_checkout_id(sequence),
            member_id,
            isbn,
            self.clock.today(),
            self.rules.loan_period_days,
        );
        self.ledger.record(checkout.clone());
        self.persist();

        self.emit(&LibraryEvent::CheckedOut {
            checkout_id: checkout.checkout_id().to_string(),
            member_id: member_id.to_string(),
            isbn: isbn.to_string(),
            due_date: checkout.due_date(),
        });
        Ok(checkout)
    }

    /// Close a loan and put the copy back on the shelf
    ///
    /// # Errors
    ///
    /// - `LibraryError::NotFound` if the checkout is unknown
    /// - `LibraryError::InvalidState` if it was already returned
    /// - `LibraryError::Integrity` if its book is no longer catalogued
    pub fn return_book(&mut self, checkout_id: &str) -> Result<Checkout> {
        let today = self.clock.today();
        let checkout = self
            .ledger
            .get(checkout_id)
            .ok_or_else(|| LibraryError::not_found("Checkout", checkout_id))?;
        if !checkout.is_on_loan() {
            return Err(LibraryError::invalid_state(format!(
                "checkout {checkout_id} is not active"
            )));
        }
        let isbn = checkout.isbn().to_string();
        if self.catalog.find(&isbn).is_none() {
            return Err(LibraryError::Integrity(format!(
                "checkout {checkout_id} refers to unknown book {isbn}"
            )));
        }
        let overdue_days = checkout.overdue_days(today);
        let fee = self.fee_for_days(overdue_days);

        let checkout = self
            .ledger
            .get_mut(checkout_id)
            .ok_or_else(|| LibraryError::not_found("Checkout", checkout_id))?;
        checkout.mark_returned(today)?;
        let returned = checkout.clone();
        if !self.catalog.return_copy(&isbn) {
            log::warn!(
                "Every copy of {isbn} was already shelved when {checkout_id} came back"
            );
        }
        self.persist();

        self.emit(&LibraryEvent::Returned {
            checkout_id: checkout_id.to_string(),
            isbn,
            overdue_days,
            fee,
        });
        Ok(returned)
    }

    /// Extend a loan so it falls due one loan period from today
    ///
    /// # Errors
    ///
    /// - `LibraryError::NotFound` if the checkout is unknown
    /// - `LibraryError::InvalidState` if it is returned or overdue
    pub fn renew_checkout(&mut self, checkout_id: &str) -> Result<Checkout> {
        let today = self.clock.today();
        let loan_period_days = self.rules.loan_period_days;
        let checkout = self
            .ledger
            .get_mut(checkout_id)
            .ok_or_else(|| LibraryError::not_found("Checkout", checkout_id))?;
        checkout.renew(today, loan_period_days)?;
        let renewed = checkout.clone();
        self.persist();

        self.emit(&LibraryEvent::Renewed {
            checkout_id: checkout_id.to_string(),
            due_date: renewed.due_date(),
        });
        Ok(renewed)
    }

    /// Stamp the `Overdue` label on every loan past due and persist.
    ///
    /// Returns the number of checkouts that changed.
    pub fn refresh_overdue_labels(&mut self) -> usize {
        let changed = self.ledger.mark_overdue(self.clock.today());
        if !changed.is_empty() {
            self.persist();
        }
        for checkout_id in &changed {
            self.emit(&LibraryEvent::MarkedOverdue {
                checkout_id: checkout_id.clone(),
            });
        }
        changed.len()
    }

    #[must_use]
    pub fn get_checkout(&self, checkout_id: &str) -> Option<&Checkout> {
        self.ledger.get(checkout_id)
    }

    /// Every checkout the member has made, oldest first
    #[must_use]
    pub fn member_history(&self, member_id: &str) -> Vec<Checkout> {
        self.ledger.history_for_member(member_id)
    }

    /// The member's checkouts still on loan
    #[must_use]
    pub fn member_active_checkouts(&self, member_id: &str) -> Vec<Checkout> {
        self.ledger.active_for_member(member_id)
    }

    /// Every checkout still on loan
    #[must_use]
    pub fn all_active_checkouts(&self) -> Vec<Checkout> {
        self.ledger.all_active()
    }

    /// Checkouts past due today, earliest due date first
    #[must_use]
    pub fn overdue_checkouts(&self) -> Vec<Checkout> {
        self.ledger.all_overdue(self.clock.today())
    }

    /// Whole days a checkout is past due, zero if unknown or not overdue
    #[must_use]
    pub fn overdue_days(&self, checkout_id: &str) -> u64 {
        self.ledger
            .get(checkout_id)
            .map_or(0, |c| c.overdue_days(self.clock.today()))
    }

    /// Fee accrued by a checkout, zero if unknown or not overdue
    #[must_use]
    pub fn overdue_fee(&self, checkout_id: &str) -> f64 {
        self.fee_for_days(self.overdue_days(checkout_id))
    }

    /// Fee for a number of days late
    fn fee_for_days(&self, days: u64) -> f64 {
        f64::from(u32::try_from(days).unwrap_or(u32::MAX)) * self.rules.daily_overdue_fee
    }

    // ==================== STATISTICS ====================

    /// Distinct titles in the catalog
    #[must_use]
    pub fn total_books(&self) -> usize {
        self.catalog.len()
    }

    /// Copies on the shelf across the catalog
    #[must_use]
    pub fn total_available_copies(&self) -> u64 {
        self.catalog
            .books()
            .map(|b| u64::from(b.available_copies()))
            .sum()
    }

    /// Copies on loan across the catalog
    #[must_use]
    pub fn total_checked_out_copies(&self) -> u64 {
        self.catalog
            .books()
            .map(|b| u64::from(b.checked_out_copies()))
            .sum()
    }

    #[must_use]
    pub fn total_members(&self) -> usize {
        self.roster.len()
    }

    /// Checkouts still on loan
    #[must_use]
    pub fn total_active_checkouts(&self) -> usize {
        self.ledger.checkouts().filter(|c| c.is_on_loan()).count()
    }

    /// Checkouts on loan past their due date
    #[must_use]
    pub fn overdue_count(&self) -> usize {
        let today = self.clock.today();
        self.ledger
            .checkouts()
            .filter(|c| c.is_overdue(today))
            .count()
    }

    /// All aggregate counts at once
    #[must_use]
    pub fn statistics(&self) -> LibraryStatistics {
        LibraryStatistics {
            total_books: self.total_books(),
            total_available_copies: self.total_available_copies(),
            total_checked_out_copies: self.total_checked_out_copies(),
            total_members: self.total_members(),
            total_active_checkouts: self.total_active_checkouts(),
            overdue_checkouts: self.overdue_count(),
        }
    }
}
