//! Drag gesture interpretation.
//!
//! The drag framework reports two hooks: `Move` fires continuously while an
//! entity is held, `End` fires once on release. Both are classified by the
//! kinds of the dragged entity and the drop target:
//!
//! | active    | over      | Move              | End               |
//! |-----------|-----------|-------------------|-------------------|
//! | item      | item      | within / across   | within / across   |
//! | item      | container | across (append)   | across (append)   |
//! | container | container | ignored           | move container    |
//! | container | item      | ignored           | ignored           |
//!
//! Projects are only relocated on release so whole columns do not jump
//! around mid-gesture.

use serde::{Deserialize, Serialize};

use crate::ordering;
use crate::types::{EntityKind, EntityRef, ProjectBoard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragPhase {
    Move,
    End,
}

/// A drag notification. `over` is None when the pointer is outside every
/// valid drop target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEvent {
    pub active: Option<EntityRef>,
    pub over: Option<EntityRef>,
}

impl DragEvent {
    pub fn new(active: EntityRef, over: EntityRef) -> Self {
        Self {
            active: Some(active),
            over: Some(over),
        }
    }
}

/// The ordering operation a drag event resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragAction {
    MoveContainer {
        active_id: String,
        over_id: String,
    },
    MoveItemWithin {
        container_id: String,
        active_id: String,
        over_id: String,
    },
    MoveItemAcross {
        active_id: String,
        over: EntityRef,
    },
}

/// Classify a drag event against the current board. Returns None for every
/// pairing that should leave the board alone.
pub fn interpret(board: &ProjectBoard, phase: DragPhase, event: &DragEvent) -> Option<DragAction> {
    let (Some(active), Some(over)) = (event.active.as_ref(), event.over.as_ref()) else {
        return None;
    };
    if active.id == over.id {
        return None;
    }

    match (active.kind, over.kind) {
        (EntityKind::Item, EntityKind::Item) => {
            let source = ordering::find_owning_container(board, &active.id, EntityKind::Item)?;
            let dest = ordering::find_owning_container(board, &over.id, EntityKind::Item)?;
            if source.id == dest.id {
                Some(DragAction::MoveItemWithin {
                    container_id: source.id.clone(),
                    active_id: active.id.clone(),
                    over_id: over.id.clone(),
                })
            } else {
                Some(DragAction::MoveItemAcross {
                    active_id: active.id.clone(),
                    over: over.clone(),
                })
            }
        }
        (EntityKind::Item, EntityKind::Container) => Some(DragAction::MoveItemAcross {
            active_id: active.id.clone(),
            over: over.clone(),
        }),
        (EntityKind::Container, EntityKind::Container) => match phase {
            DragPhase::End => Some(DragAction::MoveContainer {
                active_id: active.id.clone(),
                over_id: over.id.clone(),
            }),
            DragPhase::Move => None,
        },
        (EntityKind::Container, EntityKind::Item) => None,
    }
}

/// Run a resolved action through the ordering engine.
pub fn apply_action(board: ProjectBoard, action: &DragAction) -> ProjectBoard {
    match action {
        DragAction::MoveContainer { active_id, over_id } => {
            ordering::move_container(board, active_id, over_id)
        }
        DragAction::MoveItemWithin {
            container_id,
            active_id,
            over_id,
        } => ordering::move_item_within_container(board, container_id, active_id, over_id),
        DragAction::MoveItemAcross { active_id, over } => {
            ordering::move_item_across_containers(board, active_id, over)
        }
    }
}

/// Interpret and apply a drag event in one step.
pub fn apply_drag(board: ProjectBoard, phase: DragPhase, event: &DragEvent) -> ProjectBoard {
    match interpret(&board, phase, event) {
        Some(action) => {
            log::debug!("[roster.drag] {:?} -> {:?}", phase, action);
            apply_action(board, &action)
        }
        None => board,
    }
}
