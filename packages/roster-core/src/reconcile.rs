/// Project-level reconciliation between the persisted board and an edited one.
///
/// Projects are matched by id only:
/// - in both, content differs  -> Update (whole record replace)
/// - in both, content equal    -> nothing
/// - only in edited            -> Insert at the client-assigned id
/// - only in persisted         -> Delete
///
/// Assignments are never diffed on their own; any change to one travels
/// inside its project's Update.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::ProjectContainer;

/// A single store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ProjectOp {
    Insert { project: ProjectContainer },
    Update { project: ProjectContainer },
    Delete { id: String },
}

impl ProjectOp {
    pub fn project_id(&self) -> &str {
        match self {
            ProjectOp::Insert { project } | ProjectOp::Update { project } => &project.id,
            ProjectOp::Delete { id } => id,
        }
    }
}

/// Counts of each operation kind in a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ReconcileSummary {
    pub fn from_ops(ops: &[ProjectOp]) -> Self {
        let mut summary = Self::default();
        for op in ops {
            match op {
                ProjectOp::Insert { .. } => summary.inserted += 1,
                ProjectOp::Update { .. } => summary.updated += 1,
                ProjectOp::Delete { .. } => summary.deleted += 1,
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Compute the operations that turn `persisted` into `edited`.
/// Upserts come first, in edited order, followed by deletes in persisted order.
pub fn plan_reconcile(persisted: &[ProjectContainer], edited: &[ProjectContainer]) -> Vec<ProjectOp> {
    let existing: HashMap<&str, &ProjectContainer> =
        persisted.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut ops = Vec::new();

    for project in edited {
        match existing.get(project.id.as_str()) {
            Some(old) if *old == project => {}
            Some(_) => ops.push(ProjectOp::Update {
                project: project.clone(),
            }),
            None => ops.push(ProjectOp::Insert {
                project: project.clone(),
            }),
        }
    }

    let kept: HashSet<&str> = edited.iter().map(|p| p.id.as_str()).collect();
    for project in persisted {
        if !kept.contains(project.id.as_str()) {
            ops.push(ProjectOp::Delete {
                id: project.id.clone(),
            });
        }
    }

    ops
}
