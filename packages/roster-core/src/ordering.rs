//! Ordering engine for the project board.
//!
//! Every operation takes the board by value and hands back the resulting
//! board. Invalid or stale ids never error: a live drag produces many
//! transient states that reference entities which have just moved, so those
//! inputs degrade to returning the board untouched.
//!
//! Relocation follows the remove-then-insert rule: the moved element is taken
//! out of its index and reinserted at the target index, so everything between
//! the two indices shifts by one. Nothing is swapped.

use crate::types::{EntityKind, EntityRef, ProjectBoard, ProjectContainer};

/// Move `items[from]` to `to`, shifting the elements in between.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let moved = items.remove(from);
    items.insert(to, moved);
}

/// Return the project that is (for `Container`) or holds (for `Item`) the
/// entity with the given id.
pub fn find_owning_container<'a>(
    board: &'a ProjectBoard,
    entity_id: &str,
    kind: EntityKind,
) -> Option<&'a ProjectContainer> {
    owning_index(board, entity_id, kind).map(|index| &board.projects[index])
}

fn owning_index(board: &ProjectBoard, entity_id: &str, kind: EntityKind) -> Option<usize> {
    match kind {
        EntityKind::Container => board.project_index(entity_id),
        EntityKind::Item => board
            .projects
            .iter()
            .position(|p| p.items.iter().any(|item| item.id == entity_id)),
    }
}

/// Relocate a project to the index of another project and renumber
/// `display_order` across the whole board.
pub fn move_container(mut board: ProjectBoard, active_id: &str, over_id: &str) -> ProjectBoard {
    if active_id == over_id {
        return board;
    }
    let (Some(from), Some(to)) = (board.project_index(active_id), board.project_index(over_id))
    else {
        log::debug!(
            "[roster.ordering] move_container ignored, unknown id ({} -> {})",
            active_id,
            over_id
        );
        return board;
    };

    array_move(&mut board.projects, from, to);
    board.renumber();
    board
}

/// Relocate an assignment inside one project. Item rank is positional, so no
/// order field is touched.
pub fn move_item_within_container(
    mut board: ProjectBoard,
    container_id: &str,
    active_item_id: &str,
    over_item_id: &str,
) -> ProjectBoard {
    if active_item_id == over_item_id {
        return board;
    }
    let Some(project) = board.projects.iter_mut().find(|p| p.id == container_id) else {
        return board;
    };
    let (Some(from), Some(to)) = (
        project.item_index(active_item_id),
        project.item_index(over_item_id),
    ) else {
        log::debug!(
            "[roster.ordering] move_item_within_container ignored in {} ({} -> {})",
            container_id,
            active_item_id,
            over_item_id
        );
        return board;
    };

    array_move(&mut project.items, from, to);
    board
}

/// Move an assignment out of its project and into the project identified by
/// `over`.
///
/// - `over` is an item: insert at that item's index in its project.
/// - `over` is a project: append to the end of that project.
///
/// When both ends resolve to the same project an item target degrades to a
/// within-project move.
pub fn move_item_across_containers(
    mut board: ProjectBoard,
    active_item_id: &str,
    over: &EntityRef,
) -> ProjectBoard {
    if over.kind == EntityKind::Item && over.id == active_item_id {
        return board;
    }
    let Some(source) = owning_index(&board, active_item_id, EntityKind::Item) else {
        log::debug!(
            "[roster.ordering] move_item_across_containers ignored, unknown item {}",
            active_item_id
        );
        return board;
    };
    let Some(dest) = owning_index(&board, &over.id, over.kind) else {
        log::debug!(
            "[roster.ordering] move_item_across_containers ignored, unknown target {}",
            over.id
        );
        return board;
    };

    let target_index = match over.kind {
        EntityKind::Item => board.projects[dest].item_index(&over.id),
        EntityKind::Container => None,
    };

    if source == dest && target_index.is_some() {
        let container_id = board.projects[source].id.clone();
        return move_item_within_container(board, &container_id, active_item_id, &over.id);
    }

    let Some(from) = board.projects[source].item_index(active_item_id) else {
        return board;
    };
    let moved = board.projects[source].items.remove(from);
    let dest_items = &mut board.projects[dest].items;
    match target_index {
        Some(index) => {
            let at = index.min(dest_items.len());
            dest_items.insert(at, moved);
        }
        None => dest_items.push(moved),
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MemberItem;

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

    fn make_board(ids: &[&str]) -> ProjectBoard {
        ProjectBoard::new(
            ids.iter()
                .enumerate()
                .map(|(i, id)| make_project(id, i, Vec::new()))
                .collect(),
        )
    }

    fn ids(board: &ProjectBoard) -> Vec<&str> {
        board.projects.iter().map(|p| p.id.as_str()).collect()
    }

    fn item_ids(project: &ProjectContainer) -> Vec<&str> {
        project.items.iter().map(|i| i.id.as_str()).collect()
    }

    fn two_projects() -> ProjectBoard {
        ProjectBoard::new(vec![
            make_project(
                "c1",
                0,
                vec![make_item("i1", "m1"), make_item("i2", "m2"), make_item("i3", "m3")],
            ),
            make_project("c2", 1, vec![make_item("i4", "m4"), make_item("i5", "m5")]),
        ])
    }

    #[test]
    fn test_array_move_shifts_between() {
        let mut v = vec!['a', 'b', 'c', 'd', 'e'];
        array_move(&mut v, 1, 3);
        assert_eq!(v, vec!['a', 'c', 'd', 'b', 'e']);
        array_move(&mut v, 3, 0);
        assert_eq!(v, vec!['b', 'a', 'c', 'd', 'e']);
        array_move(&mut v, 0, 10);
        assert_eq!(v, vec!['b', 'a', 'c', 'd', 'e']);
    }

    #[test]
    fn test_move_container_forward() {
        let board = move_container(make_board(&["a", "b", "c", "d"]), "a", "c");
        assert_eq!(ids(&board), vec!["b", "c", "a", "d"]);
        let orders: Vec<usize> = board.projects.iter().map(|p| p.display_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_move_container_backward() {
        let board = move_container(make_board(&["a", "b", "c", "d"]), "d", "b");
        assert_eq!(ids(&board), vec!["a", "d", "b", "c"]);
        assert_eq!(board.projects[1].display_order, 1);
        assert_eq!(board.projects[3].display_order, 3);
    }

    #[test]
    fn test_move_container_display_order_is_permutation() {
        let names = ["a", "b", "c", "d", "e"];
        for from in names {
            for to in names {
                let board = move_container(make_board(&names), from, to);
                let mut orders: Vec<usize> =
                    board.projects.iter().map(|p| p.display_order).collect();
                orders.sort();
                assert_eq!(orders, vec![0, 1, 2, 3, 4]);
                let target_index = names.iter().position(|n| *n == to).unwrap();
                assert_eq!(board.projects[target_index].id, from);
            }
        }
    }

    #[test]
    fn test_move_container_noops() {
        let original = make_board(&["a", "b", "c"]);
        assert_eq!(move_container(original.clone(), "a", "a"), original);
        assert_eq!(move_container(original.clone(), "a", "zzz"), original);
        assert_eq!(move_container(original.clone(), "zzz", "b"), original);
    }

    #[test]
    fn test_move_item_within_container() {
        let board = move_item_within_container(two_projects(), "c1", "i1", "i3");
        assert_eq!(item_ids(&board.projects[0]), vec!["i2", "i3", "i1"]);
        assert_eq!(item_ids(&board.projects[1]), vec!["i4", "i5"]);
    }

    #[test]
    fn test_move_item_within_container_noops() {
        let original = two_projects();
        assert_eq!(
            move_item_within_container(original.clone(), "c1", "i1", "i1"),
            original
        );
        assert_eq!(
            move_item_within_container(original.clone(), "c1", "i1", "i4"),
            original
        );
        assert_eq!(
            move_item_within_container(original.clone(), "nope", "i1", "i2"),
            original
        );
    }

    #[test]
    fn test_move_item_across_onto_item() {
        let board = move_item_across_containers(two_projects(), "i2", &EntityRef::item("i5"));
        assert_eq!(item_ids(&board.projects[0]), vec!["i1", "i3"]);
        assert_eq!(item_ids(&board.projects[1]), vec!["i4", "i2", "i5"]);
    }

    #[test]
    fn test_move_item_across_onto_container_appends() {
        let board =
            move_item_across_containers(two_projects(), "i1", &EntityRef::container("c2"));
        assert_eq!(item_ids(&board.projects[0]), vec!["i2", "i3"]);
        assert_eq!(item_ids(&board.projects[1]), vec!["i4", "i5", "i1"]);
    }

    #[test]
    fn test_move_item_into_empty_container() {
        let board = ProjectBoard::new(vec![
            make_project("c1", 0, vec![make_item("i1", "m1"), make_item("i2", "m2")]),
            make_project("c2", 1, Vec::new()),
        ]);
        let board = move_item_across_containers(board, "i1", &EntityRef::container("c2"));
        assert_eq!(item_ids(&board.projects[0]), vec!["i2"]);
        assert_eq!(item_ids(&board.projects[1]), vec!["i1"]);
        assert_eq!(board.projects[0].display_order, 0);
        assert_eq!(board.projects[1].display_order, 1);
    }

    #[test]
    fn test_move_item_across_same_container_item_target() {
        let board = move_item_across_containers(two_projects(), "i3", &EntityRef::item("i1"));
        assert_eq!(item_ids(&board.projects[0]), vec!["i3", "i1", "i2"]);
    }

    #[test]
    fn test_move_item_across_noops() {
        let original = two_projects();
        assert_eq!(
            move_item_across_containers(original.clone(), "i1", &EntityRef::item("i1")),
            original
        );
        assert_eq!(
            move_item_across_containers(original.clone(), "ghost", &EntityRef::container("c2")),
            original
        );
        assert_eq!(
            move_item_across_containers(original.clone(), "i1", &EntityRef::container("c9")),
            original
        );
    }

    #[test]
    fn test_item_count_conserved_under_moves() {
        let mut board = two_projects();
        let total = board.item_count();
        let moves: Vec<(&str, EntityRef)> = vec![
            ("i1", EntityRef::item("i4")),
            ("i4", EntityRef::container("c1")),
            ("i5", EntityRef::item("i2")),
            ("i2", EntityRef::container("c2")),
            ("i3", EntityRef::item("i3")),
            ("ghost", EntityRef::item("i1")),
        ];
        for (active, over) in moves {
            board = move_item_across_containers(board, active, &over);
            assert_eq!(board.item_count(), total);
        }
        board = move_item_within_container(board, "c1", "i4", "i5");
        assert_eq!(board.item_count(), total);
    }

    #[test]
    fn test_find_owning_container() {
        let board = two_projects();
        assert_eq!(
            find_owning_container(&board, "i5", EntityKind::Item).map(|p| p.id.as_str()),
            Some("c2")
        );
        assert_eq!(
            find_owning_container(&board, "c1", EntityKind::Container).map(|p| p.id.as_str()),
            Some("c1")
        );
        assert!(find_owning_container(&board, "c1", EntityKind::Item).is_none());
        assert!(find_owning_container(&board, "i1", EntityKind::Container).is_none());
    }
}
