//! Commit-time conflict checks and form field rules.
//!
//! Duplicate assignments are legal while editing; they only block a save.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::types::{Position, ProjectBoard};

/// Name of the first project (in board order) that assigns one member twice.
/// Scanning stops at the first repeat; blank member ids are skipped.
pub fn check_duplicate_member_ids(board: &ProjectBoard) -> Option<&str> {
    for project in &board.projects {
        let mut seen = HashSet::new();
        for item in &project.items {
            if item.member_id.is_empty() {
                continue;
            }
            if !seen.insert(item.member_id.as_str()) {
                return Some(project.name.as_str());
            }
        }
    }
    None
}

/// A member assigned more than once within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMember {
    pub project_id: String,
    pub project_name: String,
    pub member_id: String,
    pub occurrences: usize,
}

/// Every duplicate assignment on the board, in board order. Used for
/// reporting; the save gate only needs [`check_duplicate_member_ids`].
pub fn find_duplicate_members(board: &ProjectBoard) -> Vec<DuplicateMember> {
    let mut out = Vec::new();
    for project in &board.projects {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in &project.items {
            if item.member_id.is_empty() {
                continue;
            }
            let count = counts.entry(item.member_id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                order.push(item.member_id.as_str());
            }
        }
        for member_id in order {
            out.push(DuplicateMember {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                member_id: member_id.to_string(),
                occurrences: counts[member_id],
            });
        }
    }
    out
}

/// A single form field rule: the predicate and the message shown when it
/// fails.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub validate: fn(&str) -> bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

pub const PROJECT_NAME_RULES: &[ValidationRule] = &[ValidationRule {
    validate: not_blank,
    message: "Project name is required",
}];

pub const MEMBER_NAME_RULES: &[ValidationRule] = &[ValidationRule {
    validate: not_blank,
    message: "Member name is required",
}];

pub const MEMBER_EMAIL_RULES: &[ValidationRule] = &[ValidationRule {
    validate: not_blank,
    message: "Email address is required",
}];

/// Run rules in order and report the first one that fails.
pub fn validate_value(
    field: &'static str,
    value: &str,
    rules: &[ValidationRule],
) -> Result<(), FieldError> {
    for rule in rules {
        if !(rule.validate)(value) {
            return Err(FieldError {
                field,
                message: rule.message.to_string(),
            });
        }
    }
    Ok(())
}

/// Every position on an assignment must carry a catalog role code.
pub fn validate_positions(positions: &[Position]) -> Result<(), FieldError> {
    match positions
        .iter()
        .find(|p| Position::from_catalog(p.id).is_none())
    {
        Some(unknown) => Err(FieldError {
            field: "positions",
            message: format!("Unknown position code {}", unknown.id),
        }),
        None => Ok(()),
    }
}
