use serde::{Deserialize, Serialize};

use crate::types::ProjectContainer;
use crate::validate::{self, FieldError, MEMBER_EMAIL_RULES, MEMBER_NAME_RULES};

/// A person who can be assigned to projects. Members are never removed;
/// deletion only flags them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "belong_to")]
    pub belong_to: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

impl Member {
    /// Check the required form fields.
    pub fn validate(&self) -> Result<(), FieldError> {
        validate::validate_value("name", &self.name, MEMBER_NAME_RULES)?;
        validate::validate_value("email", &self.email, MEMBER_EMAIL_RULES)?;
        Ok(())
    }
}

/// Resolve a member id to its display name. Members missing from the roster
/// render with an empty name.
pub fn display_name<'a>(roster: &'a [Member], member_id: &str) -> &'a str {
    roster
        .iter()
        .find(|m| m.id == member_id)
        .map(|m| m.name.as_str())
        .unwrap_or("")
}

/// Members that may still be picked for `project`: everyone not already
/// assigned there and not logically deleted. `keep` is the member of the
/// assignment being edited, which stays selectable.
pub fn assignable_members<'a>(
    roster: &'a [Member],
    project: Option<&ProjectContainer>,
    keep: Option<&str>,
) -> Vec<&'a Member> {
    roster
        .iter()
        .filter(|m| !m.is_deleted)
        .filter(|m| {
            if keep == Some(m.id.as_str()) {
                return true;
            }
            match project {
                Some(p) => !p.items.iter().any(|item| item.member_id == m.id),
                None => true,
            }
        })
        .collect()
}

/// Criteria for the member list. Each non-empty field must appear as a
/// substring of the matching member field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub belong_to: String,
}

impl MemberFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.belong_to.is_empty()
    }

    pub fn matches(&self, member: &Member) -> bool {
        member.name.contains(&self.name)
            && member.email.contains(&self.email)
            && member.belong_to.contains(&self.belong_to)
    }
}

pub fn filter_members<'a>(roster: &'a [Member], filter: &MemberFilter) -> Vec<&'a Member> {
    if filter.is_empty() {
        return roster.iter().collect();
    }
    roster.iter().filter(|m| filter.matches(m)).collect()
}
