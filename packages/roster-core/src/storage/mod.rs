pub mod local;

use crate::members::Member;
use crate::reconcile::{self, ProjectOp, ReconcileSummary};
use crate::types::ProjectContainer;

/// Abstract project store.
/// Implementations: LocalStore (JSON file); a remote document store plugs in
/// through the same trait.
pub trait ProjectStore: Send + Sync {
    /// Load every project, ordered by `display_order`. `items` and `tags`
    /// are always present, possibly empty.
    fn fetch_projects(&self) -> Result<Vec<ProjectContainer>, StorageError>;

    /// Apply a batch of operations. Either the whole batch lands or an error
    /// is returned.
    fn apply_ops(&self, ops: &[ProjectOp]) -> Result<(), StorageError>;

    /// Persist the full edited project list: re-read the store, plan the
    /// insert/update/delete set and apply it.
    fn save_projects(&self, projects: &[ProjectContainer]) -> Result<ReconcileSummary, StorageError> {
        let existing = self.fetch_projects()?;
        let ops = reconcile::plan_reconcile(&existing, projects);
        let summary = ReconcileSummary::from_ops(&ops);
        if !ops.is_empty() {
            self.apply_ops(&ops)?;
        }
        Ok(summary)
    }
}

/// Member roster store. Deletion is logical.
pub trait MemberStore: Send + Sync {
    /// Every member, including logically deleted ones.
    fn fetch_all_members(&self) -> Result<Vec<Member>, StorageError>;

    /// Members whose deleted flag equals `deleted`.
    fn fetch_members(&self, deleted: bool) -> Result<Vec<Member>, StorageError> {
        Ok(self
            .fetch_all_members()?
            .into_iter()
            .filter(|m| m.is_deleted == deleted)
            .collect())
    }

    /// Store a new member and return it with its assigned id.
    fn add_member(&self, member: Member) -> Result<Member, StorageError>;

    fn update_member(&self, member: &Member) -> Result<(), StorageError>;

    /// Flag a member as deleted, stamping the deletion time.
    fn delete_member(&self, member_id: &str) -> Result<(), StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store rejected the operation: {0}")]
    Rejected(String),
}
