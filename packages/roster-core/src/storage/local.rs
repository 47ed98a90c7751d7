//! Local filesystem store.
//!
//! Keeps the whole document in memory and mirrors it to a single JSON file:
//! - Atomic writes (write to .tmp, fsync, rename)
//! - Batches staged on a copy and swapped in only after the write lands
//! - Mutex-guarded writes to prevent concurrent modification
//! - SHA-256 content hash of the last read/written file

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{MemberStore, ProjectStore, StorageError};
use crate::identity;
use crate::members::Member;
use crate::reconcile::ProjectOp;
use crate::types::ProjectContainer;

/// On-disk layout: two keyed collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub projects: BTreeMap<String, ProjectContainer>,
    #[serde(default)]
    pub members: BTreeMap<String, Member>,
}

pub struct LocalStore {
    path: PathBuf,
    document: RwLock<StoreDocument>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
    /// SHA-256 of the last read/written content
    content_hash: RwLock<String>,
}

impl LocalStore {
    /// Open the store at `path`. A missing file starts an empty document;
    /// the file is created on first write.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let (document, hash) = match fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                let document: StoreDocument = serde_json::from_str(&content)?;
                (document, Self::hash_content(&content))
            }
            Ok(_) => (StoreDocument::default(), String::new()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("[roster.storage] No store at {}, starting empty", path.display());
                (StoreDocument::default(), String::new())
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            document: RwLock::new(document),
            write_lock: Mutex::new(()),
            content_hash: RwLock::new(hash),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash of the last content read from or written to disk.
    pub fn content_hash(&self) -> String {
        self.content_hash
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn hash_content(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.replace("\r\n", "\n").as_bytes());
        hex::encode(hasher.finalize())
    }

    fn snapshot(&self) -> StoreDocument {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run `mutate` against a copy of the document, write the copy to disk,
    /// and only then make it the live document.
    fn commit<T>(
        &self,
        mutate: impl FnOnce(&mut StoreDocument) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut staged = self.snapshot();
        let result = mutate(&mut staged)?;

        let content = serde_json::to_string_pretty(&staged)?;
        Self::atomic_write(&self.path, &content)?;

        *self.document.write().unwrap_or_else(PoisonError::into_inner) = staged;
        *self.content_hash.write().unwrap_or_else(PoisonError::into_inner) =
            Self::hash_content(&content);
        Ok(result)
    }

    /// Atomic write with fsync: write to .tmp, fsync, rename, fsync directory.
    fn atomic_write(path: &Path, content: &str) -> Result<(), std::io::Error> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let tmp_path = path.with_extension("roster.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        // fsync directory for rename durability
        if let Some(dir) = path.parent() {
            if let Ok(d) = fs::File::open(dir) {
                let _ = d.sync_all();
            }
        }
        Ok(())
    }
}

impl ProjectStore for LocalStore {
    fn fetch_projects(&self) -> Result<Vec<ProjectContainer>, StorageError> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        let mut projects: Vec<ProjectContainer> = document.projects.values().cloned().collect();
        projects.sort_by_key(|p| p.display_order);
        Ok(projects)
    }

    fn apply_ops(&self, ops: &[ProjectOp]) -> Result<(), StorageError> {
        self.commit(|doc| {
            for op in ops {
                log::debug!("[roster.storage] Applying op on project {}", op.project_id());
                match op {
                    ProjectOp::Insert { project } => {
                        doc.projects.insert(project.id.clone(), project.clone());
                    }
                    ProjectOp::Update { project } => {
                        let slot = doc
                            .projects
                            .get_mut(&project.id)
                            .ok_or_else(|| StorageError::ProjectNotFound(project.id.clone()))?;
                        *slot = project.clone();
                    }
                    ProjectOp::Delete { id } => {
                        doc.projects.remove(id);
                    }
                }
            }
            Ok(())
        })?;
        log::info!(
            "[roster.storage] Applied {} project operations to {}",
            ops.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl MemberStore for LocalStore {
    fn fetch_all_members(&self) -> Result<Vec<Member>, StorageError> {
        let document = self.document.read().unwrap_or_else(PoisonError::into_inner);
        Ok(document.members.values().cloned().collect())
    }

    fn add_member(&self, mut member: Member) -> Result<Member, StorageError> {
        if member.id.is_empty() {
            member.id = identity::generate_id("member");
        }
        self.commit(|doc| {
            if doc.members.contains_key(&member.id) {
                return Err(StorageError::Rejected(format!(
                    "member id {} already exists",
                    member.id
                )));
            }
            doc.members.insert(member.id.clone(), member.clone());
            Ok(())
        })?;
        Ok(member)
    }

    fn update_member(&self, member: &Member) -> Result<(), StorageError> {
        self.commit(|doc| {
            let slot = doc
                .members
                .get_mut(&member.id)
                .ok_or_else(|| StorageError::MemberNotFound(member.id.clone()))?;
            *slot = member.clone();
            Ok(())
        })
    }

    fn delete_member(&self, member_id: &str) -> Result<(), StorageError> {
        let deleted_at = chrono::Local::now().format("%Y/%m/%d %H:%M").to_string();
        self.commit(|doc| {
            let slot = doc
                .members
                .get_mut(member_id)
                .ok_or_else(|| StorageError::MemberNotFound(member_id.to_string()))?;
            slot.is_deleted = true;
            slot.deleted_at = Some(deleted_at);
            Ok(())
        })
    }
}
