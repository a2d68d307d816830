use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{LibraryError, Result};

/// Checkout cap given to new members
pub const DEFAULT_MAX_CHECKOUTS: u32 = 5;

/// Standing of a library member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum MemberStatus {
    /// Member may borrow books
    #[default]
    Active,
    /// Membership has lapsed
    Inactive,
    /// Borrowing privileges withdrawn
    Suspended,
}

impl MemberStatus {
    /// Get a human-readable label for the status
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MemberStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "1" => Ok(Self::Active),
            "inactive" | "2" => Ok(Self::Inactive),
            "suspended" | "3" => Ok(Self::Suspended),
            other => Err(LibraryError::validation(format!(
                "unknown member status '{other}'"
            ))),
        }
    }
}

/// A registered borrower
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Member {
    /// Roster key
    member_id: String,
    /// Display name
    name: String,
    /// Contact email
    email: String,
    /// Contact phone
    phone: String,
    /// Maximum checkouts on loan at once
    max_checkouts: u32,
    /// Current standing
    status: MemberStatus,
}

impl Member {
    /// Create an active member with the default checkout cap
    #[must_use]
    pub fn new(
        member_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            max_checkouts: DEFAULT_MAX_CHECKOUTS,
            status: MemberStatus::Active,
        }
    }

    /// Replace the checkout cap
    #[must_use]
    pub fn with_max_checkouts(mut self, max_checkouts: u32) -> Self {
        self.max_checkouts = max_checkouts;
        self
    }

    /// Check required fields
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Validation` if the member ID or name is blank.
    pub fn validate(&self) -> Result<()> {
        if self.member_id.trim().is_empty() {
            return Err(LibraryError::validation("member ID is required"));
        }
        if self.name.trim().is_empty() {
            return Err(LibraryError::validation(format!(
                "member {} has no name",
                self.member_id
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn max_checkouts(&self) -> u32 {
        self.max_checkouts
    }

    #[must_use]
    pub fn status(&self) -> MemberStatus {
        self.status
    }

    /// Only active members may borrow
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    pub fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }

    pub fn set_max_checkouts(&mut self, max_checkouts: u32) {
        self.max_checkouts = max_checkouts;
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} <{}> {} [{}] max {}",
            self.member_id, self.name, self.email, self.phone, self.status, self.max_checkouts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_member_defaults() {
        let member = Member::new("M1", "Ada", "ada@example.com", "555-0100");
        assert!(member.is_active());
        assert_eq!(member.max_checkouts(), DEFAULT_MAX_CHECKOUTS);
    }

    #[test]
    fn test_status_parsing() {
        assert!(matches!(
            "Suspended".parse::<MemberStatus>(),
            Ok(MemberStatus::Suspended)
        ));
        assert!(matches!(
            "2".parse::<MemberStatus>(),
            Ok(MemberStatus::Inactive)
        ));
        assert!("banned".parse::<MemberStatus>().is_err());
    }
}
