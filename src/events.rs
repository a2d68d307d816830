use chrono::NaiveDate;

use crate::member::MemberStatus;

/// Changes applied by the rule engine, broadcast to observers
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    /// A book was added or overwritten in the catalog
    BookAdded { isbn: String },
    /// More copies of a book were acquired
    CopiesAdded {
        isbn: String,
        count: u32,
    },
    /// A book was taken out of the catalog
    BookRemoved { isbn: String },
    /// A member was registered or overwritten
    MemberAdded { member_id: String },
    /// A member's contact details changed
    MemberUpdated { member_id: String },
    /// A member's standing changed
    MemberStatusChanged {
        member_id: String,
        status: MemberStatus,
    },
    /// A member was taken off the roster
    MemberRemoved { member_id: String },
    /// A copy went out on loan
    CheckedOut {
        checkout_id: String,
        member_id: String,
        isbn: String,
        due_date: NaiveDate,
    },
    /// A copy came back
    Returned {
        checkout_id: String,
        isbn: String,
        overdue_days: u64,
        fee: f64,
    },
    /// A loan was extended
    Renewed {
        checkout_id: String,
        due_date: NaiveDate,
    },
    /// A loan was labelled overdue
    MarkedOverdue { checkout_id: String },
}
