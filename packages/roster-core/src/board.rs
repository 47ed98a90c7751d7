//! Board commands and the reducer that applies them.
//!
//! `apply` is the single entry point for mutating a board: it takes the
//! current board and a command and returns the next board. Commands that
//! reference unknown ids leave the board as it was.

use serde::{Deserialize, Serialize};

use crate::drag::{self, DragEvent, DragPhase};
use crate::identity;
use crate::ordering;
use crate::types::{
    catalog_positions, normalize_tags, EntityKind, EntityRef, MemberItem, Position, ProjectBoard,
    ProjectContainer,
};
use crate::validate::{self, FieldError, PROJECT_NAME_RULES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardCommand {
    AddProject {
        /// Pre-minted id; a fresh one is generated when absent.
        #[serde(default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    EditProject {
        project_id: String,
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    DeleteProject {
        project_id: String,
    },
    AddItem {
        project_id: String,
        #[serde(default)]
        id: Option<String>,
        member_id: String,
        #[serde(default)]
        positions: Vec<Position>,
    },
    EditItem {
        project_id: String,
        item_id: String,
        member_id: String,
        #[serde(default)]
        positions: Vec<Position>,
    },
    DeleteItem {
        project_id: String,
        item_id: String,
    },
    MoveProject {
        active_id: String,
        over_id: String,
    },
    MoveItemWithin {
        project_id: String,
        active_id: String,
        over_id: String,
    },
    MoveItemAcross {
        active_id: String,
        over: EntityRef,
    },
    Drag {
        phase: DragPhase,
        event: DragEvent,
    },
}

impl BoardCommand {
    /// Field checks that must pass before the command is applied.
    pub fn validate(&self) -> Result<(), FieldError> {
        match self {
            BoardCommand::AddProject { name, .. } | BoardCommand::EditProject { name, .. } => {
                validate::validate_value("name", name, PROJECT_NAME_RULES)
            }
            BoardCommand::AddItem { positions, .. } | BoardCommand::EditItem { positions, .. } => {
                validate::validate_positions(positions)
            }
            _ => Ok(()),
        }
    }
}

/// Apply a command to the board.
pub fn apply(mut board: ProjectBoard, command: BoardCommand) -> ProjectBoard {
    match command {
        BoardCommand::AddProject {
            id,
            name,
            description,
            tags,
        } => {
            if name.trim().is_empty() {
                return board;
            }
            let id = id.unwrap_or_else(|| identity::new_entity_id(EntityKind::Container));
            if board.project_index(&id).is_some() {
                log::warn!("[roster.board] AddProject ignored, id {} already in use", id);
                return board;
            }
            board.projects.push(ProjectContainer {
                id,
                display_order: board.projects.len(),
                name,
                description,
                tags: normalize_tags(&tags),
                items: Vec::new(),
            });
        }
        BoardCommand::EditProject {
            project_id,
            name,
            description,
            tags,
        } => {
            if name.trim().is_empty() {
                return board;
            }
            if let Some(project) = board.projects.iter_mut().find(|p| p.id == project_id) {
                project.name = name;
                project.description = description;
                project.tags = normalize_tags(&tags);
            }
        }
        BoardCommand::DeleteProject { project_id } => {
            let before = board.projects.len();
            board.projects.retain(|p| p.id != project_id);
            if board.projects.len() != before {
                board.renumber();
            }
        }
        BoardCommand::AddItem {
            project_id,
            id,
            member_id,
            positions,
        } => {
            if member_id.is_empty() {
                return board;
            }
            let id = id.unwrap_or_else(|| identity::new_entity_id(EntityKind::Item));
            if ordering::find_owning_container(&board, &id, EntityKind::Item).is_some() {
                log::warn!("[roster.board] AddItem ignored, id {} already in use", id);
                return board;
            }
            if let Some(project) = board.projects.iter_mut().find(|p| p.id == project_id) {
                project.items.push(MemberItem {
                    id,
                    member_id,
                    positions: catalog_positions(&positions),
                });
            }
        }
        BoardCommand::EditItem {
            project_id,
            item_id,
            member_id,
            positions,
        } => {
            if member_id.is_empty() {
                return board;
            }
            let item = board
                .projects
                .iter_mut()
                .find(|p| p.id == project_id)
                .and_then(|p| p.items.iter_mut().find(|i| i.id == item_id));
            if let Some(item) = item {
                item.member_id = member_id;
                item.positions = catalog_positions(&positions);
            }
        }
        BoardCommand::DeleteItem {
            project_id,
            item_id,
        } => {
            if let Some(project) = board.projects.iter_mut().find(|p| p.id == project_id) {
                project.items.retain(|i| i.id != item_id);
            }
        }
        BoardCommand::MoveProject { active_id, over_id } => {
            return ordering::move_container(board, &active_id, &over_id);
        }
        BoardCommand::MoveItemWithin {
            project_id,
            active_id,
            over_id,
        } => {
            return ordering::move_item_within_container(board, &project_id, &active_id, &over_id);
        }
        BoardCommand::MoveItemAcross { active_id, over } => {
            return ordering::move_item_across_containers(board, &active_id, &over);
        }
        BoardCommand::Drag { phase, event } => {
            return drag::apply_drag(board, phase, &event);
        }
    }
    board
}
