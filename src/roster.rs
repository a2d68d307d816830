//! Member store keyed by member ID.

use std::collections::HashMap;

use crate::member::{Member, MemberStatus};

/// Owns every [`Member`] record
#[derive(Debug, Default, Clone)]
pub struct Roster {
    /// Members by ID
    members: HashMap<String, Member>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the member stored under its ID
    pub fn insert(&mut self, member: Member) {
        self.members.insert(member.member_id().to_string(), member);
    }

    /// Drop a member, returning the record if it was present
    pub fn remove(&mut self, member_id: &str) -> Option<Member> {
        self.members.remove(member_id)
    }

    #[must_use]
    pub fn find(&self, member_id: &str) -> Option<&Member> {
        self.members.get(member_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Every member, sorted by name
    #[must_use]
    pub fn list_all(&self) -> Vec<Member> {
        let mut all: Vec<Member> = self.members.values().cloned().collect();
        all.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.member_id().cmp(b.member_id()))
        });
        all
    }

    /// Update whichever contact fields are non-empty. Returns `false` if the member is unknown.
    pub fn update_contact(
        &mut self,
        member_id: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> bool {
        let Some(member) = self.members.get_mut(member_id) else {
            return false;
        };
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            member.set_email(email);
        }
        if let Some(phone) = phone.filter(|p| !p.is_empty()) {
            member.set_phone(phone);
        }
        true
    }

    /// Change a member's standing. Returns `false` if the member is unknown.
    pub fn update_status(&mut self, member_id: &str, status: MemberStatus) -> bool {
        match self.members.get_mut(member_id) {
            Some(member) => {
                member.set_status(status);
                true
            }
            None => false,
        }
    }

    /// Change a member's checkout cap. Returns `false` if the member is unknown.
    pub fn update_max_checkouts(&mut self, member_id: &str, max_checkouts: u32) -> bool {
        match self.members.get_mut(member_id) {
            Some(member) => {
                member.set_max_checkouts(max_checkouts);
                true
            }
            None => false,
        }
    }
    /// Every member in arbitrary order
    #[must_use]
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_all_sorted_by_name() {
        let mut roster = Roster::new();
        roster.insert(Member::new("M2", "Jane Smith", "", ""));
        roster.insert(Member::new("M1", "John Doe", "", ""));
        roster.insert(Member::new("M3", "Bob Johnson", "", ""));
        let names: Vec<String> = roster
            .list_all()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["Bob Johnson", "Jane Smith", "John Doe"]);
    }

    #[test]
    fn test_update_contact_skips_empty_fields() {
        let mut roster = Roster::new();
        let member = Member::new("M1", "John Doe", "john@example.com", "555-1001");
        roster.insert(member);
        assert!(roster.update_contact("M1", Some(""), Some("555-2002")));
        let member = roster.find("M1");
        assert_eq!(member.map(Member::email), Some("john@example.com"));
        assert_eq!(member.map(Member::phone), Some("555-2002"));
    }

    #[test]
    fn test_updates_on_unknown_member_are_noops() {
        let mut roster = Roster::new();
        assert!(!roster.update_contact("ghost", Some("a@b.c"), None));
        assert!(!roster.update_status("ghost", MemberStatus::Suspended));
        assert!(roster.is_empty());
    }
}
