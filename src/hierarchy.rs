//! Read-only views over the task tree.
//!
//! Children are always derived by scanning `parent_task_id`; the cached
//! `subtasks` list on each task is a convenience index, not the source of
//! truth for rendering. The helpers here never mutate anything except
//! [`reindex_subtasks`], which the store uses to repair a loaded snapshot.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::fields::Position;
use crate::task::Task;

/// A root task with its direct children, in collection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<'a> {
    pub task: &'a Task,
    pub subtasks: Vec<&'a Task>,
}

/// All tasks of `project_id` without a parent, in collection order.
pub fn root_tasks<'a>(tasks: &'a [Task], project_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.project_id == project_id && t.parent_task_id.is_none())
        .collect()
}

/// Direct children of `task_id`, in collection order.
pub fn subtasks_of<'a>(tasks: &'a [Task], task_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.parent_task_id.as_deref() == Some(task_id))
        .collect()
}

/// Root tasks of a project, each paired with its children one level deep.
///
/// Grandchildren are not expanded under their grandparent; they remain
/// reachable through [`descendants`].
pub fn render_tree<'a>(tasks: &'a [Task], project_id: &str) -> Vec<TreeNode<'a>> {
    root_tasks(tasks, project_id)
        .into_iter()
        .map(|task| TreeNode { task, subtasks: subtasks_of(tasks, &task.id) })
        .collect()
}

/// Map of parent id to child ids, children in collection order.
pub fn build_children_map(tasks: &[Task]) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for t in tasks {
        if let Some(p) = &t.parent_task_id {
            map.entry(p.clone()).or_default().push(t.id.clone());
        }
    }
    map
}

/// Collect all descendant task IDs below `root`, at any depth.
pub fn collect_descendants(
    root: &str,
    child_map: &BTreeMap<String, Vec<String>>,
    out: &mut HashSet<String>,
) {
    let mut stack = vec![root.to_string()];
    while let Some(id) = stack.pop() {
        for c in child_map.get(&id).into_iter().flatten() {
            if out.insert(c.clone()) {
                stack.push(c.clone());
            }
        }
    }
}

/// Every task below `task_id` at any depth, in collection order.
pub fn descendants<'a>(tasks: &'a [Task], task_id: &str) -> Vec<&'a Task> {
    let mut ids = HashSet::new();
    collect_descendants(task_id, &build_children_map(tasks), &mut ids);
    ids.remove(task_id);
    tasks.iter().filter(|t| ids.contains(&t.id)).collect()
}

/// Parent chain of `task_id`, closest first.
///
/// Stops at a missing parent or at the first repeated id. A task that sits on
/// a loop therefore shows up in its own chain.
pub fn ancestors(tasks: &[Task], task_id: &str) -> Vec<String> {
    let index: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut cur = index.get(task_id).and_then(|t| t.parent_task_id.clone());
    while let Some(pid) = cur {
        if !seen.insert(pid.clone()) {
            break;
        }
        cur = index.get(pid.as_str()).and_then(|t| t.parent_task_id.clone());
        chain.push(pid);
    }
    chain
}

/// Number of ancestors, 0 for a root task.
pub fn depth_of(tasks: &[Task], task_id: &str) -> usize {
    ancestors(tasks, task_id).len()
}

/// Whether hanging `task_id` under `new_parent` would make the task its own ancestor.
pub fn would_create_cycle(tasks: &[Task], task_id: &str, new_parent: &str) -> bool {
    new_parent == task_id || ancestors(tasks, new_parent).iter().any(|a| a == task_id)
}

/// Whether following parent links from `task_id` leads back to it.
pub fn is_on_cycle(tasks: &[Task], task_id: &str) -> bool {
    ancestors(tasks, task_id).iter().any(|a| a == task_id)
}

/// Clear the parent link of the first task (in collection order) on each
/// loop. Returns the ids whose link was cut.
pub(crate) fn break_cycles(tasks: &mut [Task]) -> Vec<String> {
    let mut parents: HashMap<String, String> = tasks
        .iter()
        .filter_map(|t| t.parent_task_id.clone().map(|p| (t.id.clone(), p)))
        .collect();
    let mut cut = Vec::new();
    for t in tasks.iter_mut() {
        if loops_back(&parents, &t.id) {
            parents.remove(&t.id);
            t.parent_task_id = None;
            cut.push(t.id.clone());
        }
    }
    cut
}

fn loops_back(parents: &HashMap<String, String>, id: &str) -> bool {
    let mut seen = HashSet::new();
    let mut cur = parents.get(id);
    while let Some(pid) = cur {
        if pid == id {
            return true;
        }
        if !seen.insert(pid) {
            return false;
        }
        cur = parents.get(pid);
    }
    false
}

/// Tasks whose parent exists but belongs to another project.
pub fn cross_project_links(tasks: &[Task]) -> Vec<&Task> {
    let index: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    tasks
        .iter()
        .filter(|t| {
            t.parent_task_id
                .as_deref()
                .and_then(|p| index.get(p))
                .is_some_and(|parent| parent.project_id != t.project_id)
        })
        .collect()
}

/// Whether every task's `subtasks` equals its scanned children, in some order.
pub fn subtask_index_consistent(tasks: &[Task]) -> bool {
    let children = build_children_map(tasks);
    tasks.iter().all(|t| {
        let expected = children.get(&t.id).map(Vec::as_slice).unwrap_or(&[]);
        t.subtasks.len() == expected.len() && expected.iter().all(|c| t.subtasks.contains(c))
    })
}

/// Rebuild each `subtasks` index from `parent_task_id`.
///
/// Ids already listed keep their attachment order, missing children are
/// appended in collection order and stale entries are dropped. Returns the
/// number of tasks whose index changed.
pub(crate) fn reindex_subtasks(tasks: &mut [Task]) -> usize {
    let children = build_children_map(tasks);
    let mut changed = 0;
    for t in tasks.iter_mut() {
        let expected = children.get(&t.id).cloned().unwrap_or_default();
        let mut rebuilt: Vec<String> = Vec::with_capacity(expected.len());
        for id in &t.subtasks {
            if expected.contains(id) && !rebuilt.contains(id) {
                rebuilt.push(id.clone());
            }
        }
        for id in expected {
            if !rebuilt.contains(&id) {
                rebuilt.push(id);
            }
        }
        if rebuilt != t.subtasks {
            t.subtasks = rebuilt;
            changed += 1;
        }
    }
    changed
}

/// What a dragged task was dropped on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another task in the list.
    Task(String),
    /// A project entry in the sidebar.
    Project(String),
}

/// Store operation a drop gesture resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    Reorder { dragged: String, target: String, position: Position },
    MoveToProject { task: String, project: String },
}

/// Task-onto-task always inserts the dragged task before the target;
/// task-onto-project reassigns the project. There is no reparenting drop.
pub fn resolve_drop(dragged: &str, target: DropTarget) -> DropAction {
    match target {
        DropTarget::Task(target) => DropAction::Reorder {
            dragged: dragged.to_string(),
            target,
            position: Position::Before,
        },
        DropTarget::Project(project) => {
            DropAction::MoveToProject { task: dragged.to_string(), project }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::Utc;

    fn t(id: &str, project: &str, parent: Option<&str>) -> Task {
        let mut data = NewTask::new(project, format!("task {id}"));
        data.parent_task_id = parent.map(str::to_string);
        Task::from_new(id.into(), data, Utc::now())
    }

    fn sample() -> Vec<Task> {
        vec![
            t("a", "p", None),
            t("b", "p", Some("a")),
            t("c", "p", Some("b")),
            t("d", "q", None),
            t("e", "p", Some("a")),
            t("f", "p", None),
        ]
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_roots_and_children_follow_collection_order() {
        let tasks = sample();
        assert_eq!(ids(&root_tasks(&tasks, "p")), ["a", "f"]);
        assert_eq!(ids(&subtasks_of(&tasks, "a")), ["b", "e"]);
        assert!(subtasks_of(&tasks, "f").is_empty());
    }

    #[test]
    fn test_render_tree_is_one_level_deep() {
        let tasks = sample();
        let tree = render_tree(&tasks, "p");
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].task.id, "a");
        assert_eq!(ids(&tree[0].subtasks), ["b", "e"]);
        // "c" is a grandchild of "a" and is not shown anywhere in the tree.
        assert!(tree.iter().all(|n| n.subtasks.iter().all(|s| s.id != "c")));
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let tasks = sample();
        assert_eq!(ids(&descendants(&tasks, "a")), ["b", "c", "e"]);
        assert_eq!(ancestors(&tasks, "c"), ["b", "a"]);
        assert_eq!(depth_of(&tasks, "c"), 2);
        assert_eq!(depth_of(&tasks, "d"), 0);
    }

    #[test]
    fn test_cycle_detection() {
        let tasks = sample();
        assert!(would_create_cycle(&tasks, "a", "c"));
        assert!(would_create_cycle(&tasks, "a", "a"));
        assert!(!would_create_cycle(&tasks, "c", "f"));
    }

    #[test]
    fn test_ancestors_stop_on_existing_loop() {
        let tasks = vec![t("x", "p", Some("y")), t("y", "p", Some("x")), t("z", "p", Some("x"))];
        assert_eq!(ancestors(&tasks, "x"), ["y", "x"]);
        assert_eq!(ancestors(&tasks, "z"), ["x", "y"]);
        assert!(is_on_cycle(&tasks, "x"));
        assert!(!is_on_cycle(&tasks, "z"));
    }

    #[test]
    fn test_cycle_detection_on_deep_chain() {
        let mut tasks = vec![t("n0", "p", None)];
        for i in 1..1500 {
            let parent = format!("n{}", i - 1);
            tasks.push(t(&format!("n{i}"), "p", Some(&parent)));
        }
        assert_eq!(depth_of(&tasks, "n1499"), 1499);
        assert!(would_create_cycle(&tasks, "n0", "n1499"));
        assert!(!would_create_cycle(&tasks, "n1499", "n0"));
        assert_eq!(descendants(&tasks, "n0").len(), 1499);
    }

    #[test]
    fn test_break_cycles_cuts_one_link_per_loop() {
        let mut tasks = vec![
            t("x", "p", Some("y")),
            t("y", "p", Some("x")),
            t("z", "p", Some("z")),
            t("w", "p", Some("x")),
        ];
        assert_eq!(break_cycles(&mut tasks), ["x", "z"]);
        assert!(tasks.iter().all(|t| !is_on_cycle(&tasks, &t.id)));
        assert_eq!(tasks[1].parent_task_id.as_deref(), Some("x"));
        assert_eq!(tasks[3].parent_task_id.as_deref(), Some("x"));
    }

    #[test]
    fn test_cross_project_links() {
        let mut tasks = sample();
        assert!(cross_project_links(&tasks).is_empty());
        tasks[2].project_id = "q".into();
        assert_eq!(ids(&cross_project_links(&tasks)), ["c"]);
    }

    #[test]
    fn test_reindex_repairs_stale_and_missing_entries() {
        let mut tasks = sample();
        tasks[0].subtasks = vec!["e".into(), "ghost".into()];
        let changed = reindex_subtasks(&mut tasks);
        assert!(changed >= 2);
        assert_eq!(tasks[0].subtasks, ["e", "b"]);
        assert_eq!(tasks[1].subtasks, ["c"]);
        assert!(subtask_index_consistent(&tasks));
        assert_eq!(reindex_subtasks(&mut tasks), 0);
    }

    #[test]
    fn test_drop_resolution() {
        assert_eq!(
            resolve_drop("b", DropTarget::Task("a".into())),
            DropAction::Reorder {
                dragged: "b".into(),
                target: "a".into(),
                position: Position::Before,
            }
        );
        assert_eq!(
            resolve_drop("b", DropTarget::Project("q".into())),
            DropAction::MoveToProject { task: "b".into(), project: "q".into() }
        );
    }
}
