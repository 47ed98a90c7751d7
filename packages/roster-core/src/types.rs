use serde::{Deserialize, Serialize};

use crate::identity;

/// Fixed catalog of role codes an assignment may carry.
/// The order here is the order roles are offered and rendered in.
pub const POSITION_CATALOG: &[(u32, &str)] = &[
    (1, "Project Manager"),
    (2, "Project Leader"),
    (3, "Engineer"),
    (4, "Designer"),
    (5, "Tester"),
    (6, "Sales"),
];

/// A role tag embedded in an assignment. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub id: u32,
    pub name: String,
}

impl Position {
    /// Look up a role code in the catalog.
    pub fn from_catalog(id: u32) -> Option<Self> {
        POSITION_CATALOG
            .iter()
            .find(|(code, _)| *code == id)
            .map(|(code, name)| Position {
                id: *code,
                name: (*name).to_string(),
            })
    }

    /// Every catalog role, in catalog order.
    pub fn catalog() -> Vec<Self> {
        POSITION_CATALOG
            .iter()
            .map(|(code, name)| Position {
                id: *code,
                name: (*name).to_string(),
            })
            .collect()
    }
}

/// Rebuild positions from their role codes so labels always match the
/// catalog. Unknown codes are dropped.
pub fn catalog_positions(positions: &[Position]) -> Vec<Position> {
    positions
        .iter()
        .filter_map(|p| Position::from_catalog(p.id))
        .collect()
}

/// A single member-to-project assignment.
///
/// `positions` is conceptually a set, but duplicates are tolerated here; the
/// board does not police them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberItem {
    pub id: String,
    pub member_id: String,
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// A project: an ordered container of assignments with its own display rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContainer {
    pub id: String,
    pub display_order: usize,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Sequence order is the ranking; there is no per-item index field.
    #[serde(default)]
    pub items: Vec<MemberItem>,
}

impl ProjectContainer {
    pub fn item_index(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == item_id)
    }
}

/// Build a tag list the way interactive entry does: trimmed, blanks dropped,
/// first occurrence wins.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if !trimmed.is_empty() && !out.iter().any(|t| t == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    out
}

/// The whole board: projects in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectBoard {
    pub projects: Vec<ProjectContainer>,
}

impl ProjectBoard {
    /// Build a board from fetched projects, ordered by their stored rank.
    pub fn new(mut projects: Vec<ProjectContainer>) -> Self {
        projects.sort_by_key(|p| p.display_order);
        Self { projects }
    }

    pub fn project(&self, project_id: &str) -> Option<&ProjectContainer> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    pub fn project_index(&self, project_id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == project_id)
    }

    /// Total number of assignments across all projects.
    pub fn item_count(&self) -> usize {
        self.projects.iter().map(|p| p.items.len()).sum()
    }

    /// Rewrite every project's `display_order` to its position.
    pub fn renumber(&mut self) {
        for (index, project) in self.projects.iter_mut().enumerate() {
            project.display_order = index;
        }
    }
}

/// Discriminates the two draggable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Container,
    Item,
}

impl EntityKind {
    /// Prefix used when minting ids of this kind.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Container => "container",
            EntityKind::Item => "item",
        }
    }
}

/// A typed reference to a draggable entity. The kind travels with the id
/// rather than being parsed back out of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Container,
            id: id.into(),
        }
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Item,
            id: id.into(),
        }
    }

    /// Classify a raw id minted with a kind prefix. Returns None for ids that
    /// carry no recognizable prefix.
    pub fn from_prefixed_id(id: &str) -> Option<Self> {
        identity::kind_from_id(id).map(|kind| Self {
            kind,
            id: id.to_string(),
        })
    }
}
