//! Edit-session controller.
//!
//! ```text
//!            begin_edit
//!  Viewing ─────────────▶ Editing ──┐ dispatch / drag
//!     ▲                     │  ▲   │
//!     │   save (ok)         │  └───┘
//!     └─────────────────────┤
//!     │   cancel            │ save (duplicate member / store error)
//!     └─────────────────────┘   stays in Editing, working copy intact
//! ```
//!
//! The working copy is an owned clone of the pristine snapshot, so cancel
//! is exact regardless of what was done while editing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::board::{self, BoardCommand};
use crate::drag::{DragEvent, DragPhase};
use crate::reconcile::ReconcileSummary;
use crate::storage::{ProjectStore, StorageError};
use crate::types::ProjectBoard;
use crate::validate::{self, FieldError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionMode {
    Viewing,
    Editing,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not in edit mode")]
    NotEditing,

    #[error("Already in edit mode")]
    AlreadyEditing,

    #[error("Project \"{project_name}\" has the same member assigned more than once; cannot save")]
    DuplicateMember { project_name: String },

    #[error("{0}")]
    Invalid(#[from] FieldError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Advisory "busy" signal raised while the session waits on the store.
/// Clones share the same flag, so a presentation layer can poll it without
/// holding the session.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn raise(&self) -> BusyGuard<'_> {
        self.0.store(true, Ordering::Release);
        BusyGuard(self)
    }
}

struct BusyGuard<'a>(&'a BusyFlag);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::Release);
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub summary: ReconcileSummary,
}

#[derive(Debug, Default)]
pub struct EditSession {
    /// Last fetched (or last saved) board
    pristine: ProjectBoard,
    /// Working copy, present only while editing
    working: Option<ProjectBoard>,
    busy: BusyFlag,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn busy_flag(&self) -> &BusyFlag {
        &self.busy
    }

    pub fn mode(&self) -> SessionMode {
        if self.working.is_some() {
            SessionMode::Editing
        } else {
            SessionMode::Viewing
        }
    }

    /// The board to render: the working copy while editing, otherwise the
    /// pristine snapshot.
    pub fn board(&self) -> &ProjectBoard {
        self.working.as_ref().unwrap_or(&self.pristine)
    }

    /// True while editing and the working copy differs from the snapshot.
    pub fn is_dirty(&self) -> bool {
        self.working
            .as_ref()
            .is_some_and(|working| *working != self.pristine)
    }

    /// Fetch the board from the store into the pristine snapshot. On failure
    /// the board is left empty and the error is returned for display.
    pub fn load(&mut self, store: &dyn ProjectStore) -> Result<(), SessionError> {
        if self.working.is_some() {
            return Err(SessionError::AlreadyEditing);
        }
        let _busy = self.busy.raise();
        match store.fetch_projects() {
            Ok(projects) => {
                self.pristine = ProjectBoard::new(projects);
                log::info!(
                    "[roster.session.load] Loaded {} projects",
                    self.pristine.projects.len()
                );
                Ok(())
            }
            Err(e) => {
                log::warn!("[roster.session.load] Failed to fetch projects: {}", e);
                self.pristine = ProjectBoard::default();
                Err(e.into())
            }
        }
    }

    /// Enter edit mode with a deep copy of the snapshot.
    pub fn begin_edit(&mut self) -> Result<(), SessionError> {
        if self.working.is_some() {
            return Err(SessionError::AlreadyEditing);
        }
        self.working = Some(self.pristine.clone());
        Ok(())
    }

    /// Apply a command to the working copy.
    pub fn dispatch(&mut self, command: BoardCommand) -> Result<(), SessionError> {
        command.validate()?;
        let working = self.working.take().ok_or(SessionError::NotEditing)?;
        self.working = Some(board::apply(working, command));
        Ok(())
    }

    /// Feed a drag notification to the working copy.
    pub fn drag(&mut self, phase: DragPhase, event: DragEvent) -> Result<(), SessionError> {
        self.dispatch(BoardCommand::Drag { phase, event })
    }

    /// Validate, persist and leave edit mode.
    ///
    /// A duplicate assignment or a store failure keeps the session in edit
    /// mode with the working copy unchanged so the user can fix and retry.
    pub fn save(&mut self, store: &dyn ProjectStore) -> Result<SaveOutcome, SessionError> {
        let working = self.working.as_ref().ok_or(SessionError::NotEditing)?;

        if let Some(project_name) = validate::check_duplicate_member_ids(working) {
            for dup in validate::find_duplicate_members(working) {
                log::warn!(
                    "[roster.session.save] Member {} assigned {} times in \"{}\"",
                    dup.member_id,
                    dup.occurrences,
                    dup.project_name
                );
            }
            return Err(SessionError::DuplicateMember {
                project_name: project_name.to_string(),
            });
        }

        let _busy = self.busy.raise();
        let summary = store.save_projects(&working.projects).map_err(|e| {
            log::warn!("[roster.session.save] Save failed, staying in edit mode: {}", e);
            SessionError::from(e)
        })?;
        if summary.is_empty() {
            log::info!("[roster.session.save] Nothing changed, store left untouched");
        } else {
            log::info!(
                "[roster.session.save] Saved: {} inserted, {} updated, {} deleted",
                summary.inserted,
                summary.updated,
                summary.deleted
            );
        }

        let Some(saved) = self.working.take() else {
            return Err(SessionError::NotEditing);
        };
        self.pristine = match store.fetch_projects() {
            Ok(projects) => ProjectBoard::new(projects),
            Err(e) => {
                log::warn!(
                    "[roster.session.save] Refresh after save failed, keeping saved copy: {}",
                    e
                );
                saved
            }
        };
        Ok(SaveOutcome { summary })
    }

    /// Discard the working copy and return to the snapshot.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.working.take().is_none() {
            return Err(SessionError::NotEditing);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ProjectOp;
    use crate::storage::local::LocalStore;
    use crate::types::{EntityRef, MemberItem, ProjectContainer};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn make_item(id: &str, member_id: &str) -> MemberItem {
        MemberItem {
            id: id.to_string(),
            member_id: member_id.to_string(),
            positions: Vec::new(),
        }
    }

    fn make_project(id: &str, display_order: usize, items: Vec<MemberItem>) -> ProjectContainer {
        ProjectContainer {
            id: id.to_string(),
            display_order,
            name: format!("Project {}", id),
            description: String::new(),
            tags: Vec::new(),
            items,
        }
    }

    fn seeded_store(dir: &TempDir) -> LocalStore {
        let store = LocalStore::open(&dir.path().join("projects.json")).unwrap();
        store
            .save_projects(&[
                make_project("c1", 0, vec![make_item("i1", "m1"), make_item("i2", "m2")]),
                make_project("c2", 1, Vec::new()),
            ])
            .unwrap();
        store
    }

    /// Store whose writes always fail; reads come from a fixed list.
    struct FailingStore {
        projects: Mutex<Vec<ProjectContainer>>,
        fail_reads: bool,
    }

    impl ProjectStore for FailingStore {
        fn fetch_projects(&self) -> Result<Vec<ProjectContainer>, StorageError> {
            if self.fail_reads {
                return Err(StorageError::Rejected("offline".to_string()));
            }
            Ok(self.projects.lock().unwrap().clone())
        }

        fn apply_ops(&self, _ops: &[ProjectOp]) -> Result<(), StorageError> {
            Err(StorageError::Rejected("write refused".to_string()))
        }
    }

    /// Store whose writes land but whose reads start failing after
    /// `good_reads` successful fetches.
    struct FlakyReadStore {
        projects: Mutex<Vec<ProjectContainer>>,
        reads: AtomicUsize,
        good_reads: usize,
    }

    impl ProjectStore for FlakyReadStore {
        fn fetch_projects(&self) -> Result<Vec<ProjectContainer>, StorageError> {
            if self.reads.fetch_add(1, Ordering::SeqCst) >= self.good_reads {
                return Err(StorageError::Rejected("connection dropped".to_string()));
            }
            Ok(self.projects.lock().unwrap().clone())
        }

        fn apply_ops(&self, ops: &[ProjectOp]) -> Result<(), StorageError> {
            let mut projects = self.projects.lock().unwrap();
            for op in ops {
                match op {
                    ProjectOp::Insert { project } | ProjectOp::Update { project } => {
                        projects.retain(|p| p.id != project.id);
                        projects.push(project.clone());
                    }
                    ProjectOp::Delete { id } => projects.retain(|p| &p.id != id),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_load_and_view() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        assert_eq!(session.mode(), SessionMode::Viewing);
        assert_eq!(session.board().projects.len(), 2);
        assert!(!session.is_dirty());
        assert!(!session.busy_flag().is_busy());
    }

    #[test]
    fn test_load_failure_renders_empty() {
        let store = FailingStore {
            projects: Mutex::new(Vec::new()),
            fail_reads: true,
        };
        let mut session = EditSession::new();
        assert!(matches!(session.load(&store), Err(SessionError::Storage(_))));
        assert!(session.board().projects.is_empty());
        assert!(!session.busy_flag().is_busy());
    }

    #[test]
    fn test_mutations_require_edit_mode() {
        let mut session = EditSession::new();
        let result = session.dispatch(BoardCommand::DeleteProject {
            project_id: "c1".to_string(),
        });
        assert!(matches!(result, Err(SessionError::NotEditing)));
        assert!(matches!(session.cancel(), Err(SessionError::NotEditing)));
        session.begin_edit().unwrap();
        assert!(matches!(session.begin_edit(), Err(SessionError::AlreadyEditing)));
    }

    #[test]
    fn test_cancel_restores_snapshot_exactly() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        let before = serde_json::to_string(session.board()).unwrap();

        session.begin_edit().unwrap();
        session
            .drag(
                DragPhase::End,
                DragEvent::new(EntityRef::container("c2"), EntityRef::container("c1")),
            )
            .unwrap();
        session
            .drag(
                DragPhase::Move,
                DragEvent::new(EntityRef::item("i1"), EntityRef::container("c2")),
            )
            .unwrap();
        session
            .dispatch(BoardCommand::AddProject {
                id: None,
                name: "New".to_string(),
                description: String::new(),
                tags: Vec::new(),
            })
            .unwrap();
        session
            .dispatch(BoardCommand::DeleteItem {
                project_id: "c1".to_string(),
                item_id: "i2".to_string(),
            })
            .unwrap();
        assert!(session.is_dirty());

        session.cancel().unwrap();
        assert_eq!(session.mode(), SessionMode::Viewing);
        assert_eq!(serde_json::to_string(session.board()).unwrap(), before);
    }

    #[test]
    fn test_invalid_command_rejected() {
        let mut session = EditSession::new();
        session.begin_edit().unwrap();
        let result = session.dispatch(BoardCommand::AddProject {
            id: None,
            name: String::new(),
            description: String::new(),
            tags: Vec::new(),
        });
        assert!(matches!(result, Err(SessionError::Invalid(_))));
        assert_eq!(session.mode(), SessionMode::Editing);
    }

    #[test]
    fn test_save_persists_and_returns_to_viewing() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        session.begin_edit().unwrap();
        session
            .drag(
                DragPhase::End,
                DragEvent::new(EntityRef::item("i1"), EntityRef::container("c2")),
            )
            .unwrap();
        session
            .dispatch(BoardCommand::AddProject {
                id: Some("c3".to_string()),
                name: "Third".to_string(),
                description: String::new(),
                tags: Vec::new(),
            })
            .unwrap();

        let outcome = session.save(&store).unwrap();
        assert_eq!(outcome.summary.inserted, 1);
        assert_eq!(outcome.summary.updated, 2);
        assert_eq!(session.mode(), SessionMode::Viewing);

        let persisted = store.fetch_projects().unwrap();
        assert_eq!(persisted.len(), 3);
        assert_eq!(persisted[1].items[0].id, "i1");
        assert_eq!(session.board().projects, persisted);
    }

    #[test]
    fn test_save_blocked_by_duplicate_member() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        session.begin_edit().unwrap();
        session
            .dispatch(BoardCommand::AddItem {
                project_id: "c1".to_string(),
                id: Some("i3".to_string()),
                member_id: "m1".to_string(),
                positions: Vec::new(),
            })
            .unwrap();
        let working = session.board().clone();

        match session.save(&store) {
            Err(SessionError::DuplicateMember { project_name }) => {
                assert_eq!(project_name, "Project c1")
            }
            other => panic!("expected duplicate member error, got {:?}", other),
        }
        assert_eq!(session.mode(), SessionMode::Editing);
        assert_eq!(session.board(), &working);
        assert_eq!(store.fetch_projects().unwrap()[0].items.len(), 2);
    }

    #[test]
    fn test_save_failure_keeps_working_copy() {
        let store = FailingStore {
            projects: Mutex::new(vec![make_project("c1", 0, Vec::new())]),
            fail_reads: false,
        };
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        session.begin_edit().unwrap();
        session
            .dispatch(BoardCommand::DeleteProject {
                project_id: "c1".to_string(),
            })
            .unwrap();

        assert!(matches!(session.save(&store), Err(SessionError::Storage(_))));
        assert_eq!(session.mode(), SessionMode::Editing);
        assert!(session.board().projects.is_empty());
        assert!(session.is_dirty());
        assert!(!session.busy_flag().is_busy());
    }

    #[test]
    fn test_refresh_failure_after_save_keeps_saved_copy() {
        // load and the pre-save diff read succeed; the post-save refresh fails
        let store = FlakyReadStore {
            projects: Mutex::new(vec![make_project("c1", 0, vec![make_item("i1", "m1")])]),
            reads: AtomicUsize::new(0),
            good_reads: 2,
        };
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        session.begin_edit().unwrap();
        session
            .dispatch(BoardCommand::AddProject {
                id: Some("c2".to_string()),
                name: "Second".to_string(),
                description: String::new(),
                tags: Vec::new(),
            })
            .unwrap();
        let saved = session.board().clone();

        let outcome = session.save(&store).unwrap();
        assert_eq!(outcome.summary.inserted, 1);
        assert_eq!(session.mode(), SessionMode::Viewing);
        assert_eq!(session.board(), &saved);
        assert!(!session.is_dirty());
        assert_eq!(store.projects.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unchanged_save_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let hash = store.content_hash();
        let mut session = EditSession::new();
        session.load(&store).unwrap();
        session.begin_edit().unwrap();

        let outcome = session.save(&store).unwrap();
        assert!(outcome.summary.is_empty());
        assert_eq!(session.mode(), SessionMode::Viewing);
        assert_eq!(store.content_hash(), hash);
    }

    #[test]
    fn test_shared_busy_flag() {
        let session = EditSession::new();
        let flag = session.busy_flag().clone();
        let guard = session.busy_flag().raise();
        assert!(flag.is_busy());
        drop(guard);
        assert!(!flag.is_busy());
    }
}
