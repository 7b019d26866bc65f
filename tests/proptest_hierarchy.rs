//! Property tests: arbitrary mutation sequences never break the task tree.

mod common;

use std::collections::HashMap;

use common::*;
use proptest::prelude::*;
use taskboard::hierarchy::{is_on_cycle, subtask_index_consistent};
use taskboard::{DeletePolicy, NewTask, Position, Store, Task, TaskPatch};

#[derive(Debug, Clone)]
enum Op {
    Add { project: usize, parent: Option<usize> },
    Reparent { task: usize, parent: Option<usize> },
    Delete { task: usize, cascade: bool },
    Reorder { dragged: usize, target: usize, after: bool },
    Move { task: usize, project: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..2usize, proptest::option::of(0..32usize))
            .prop_map(|(project, parent)| Op::Add { project, parent }),
        2 => (0..32usize, proptest::option::of(0..32usize))
            .prop_map(|(task, parent)| Op::Reparent { task, parent }),
        1 => (0..32usize, any::<bool>()).prop_map(|(task, cascade)| Op::Delete { task, cascade }),
        2 => (0..32usize, 0..32usize, any::<bool>())
            .prop_map(|(dragged, target, after)| Op::Reorder { dragged, target, after }),
        1 => (0..32usize, 0..2usize).prop_map(|(task, project)| Op::Move { task, project }),
    ]
}

fn task_id(store: &Store, i: usize) -> Option<String> {
    let n = store.tasks().len();
    (n > 0).then(|| store.tasks()[i % n].id.clone())
}

/// Expected `subtasks` of each parent, in attachment order.
#[derive(Debug, Default)]
struct Attachments(HashMap<String, Vec<String>>);

impl Attachments {
    fn attach(&mut self, parent: Option<&String>, child: &str) {
        if let Some(parent) = parent {
            self.0.entry(parent.clone()).or_default().push(child.to_string());
        }
    }

    fn detach(&mut self, parent: Option<&String>, child: &str) {
        if let Some(list) = parent.and_then(|p| self.0.get_mut(p)) {
            list.retain(|c| c != child);
        }
    }

    fn remove_all(&mut self, removed: &[String]) {
        for id in removed {
            self.0.remove(id);
        }
        for list in self.0.values_mut() {
            list.retain(|c| !removed.contains(c));
        }
    }

    fn expected(&self, id: &str) -> &[String] {
        self.0.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Apply `op` and mirror any accepted change in `model`. Ops that point at no
/// task are skipped.
fn apply(store: &mut Store, model: &mut Attachments, projects: &[String], op: &Op) {
    let before = store.snapshot();
    let accepted = match op {
        Op::Add { project, parent } => {
            let mut data = NewTask::new(&projects[*project], "t");
            data.parent_task_id = parent.and_then(|p| task_id(store, p));
            match store.add_task(data) {
                Ok(task) => {
                    model.attach(task.parent_task_id.as_ref(), &task.id);
                    true
                }
                Err(_) => false,
            }
        }
        Op::Reparent { task, parent } => {
            let Some(id) = task_id(store, *task) else {
                return;
            };
            let parent = parent.and_then(|p| task_id(store, p));
            let old = store.task(&id).and_then(|t| t.parent_task_id.clone());
            let accepted = store.update_task(&id, TaskPatch::parent(parent.clone())).is_ok();
            if accepted && old != parent {
                model.detach(old.as_ref(), &id);
                model.attach(parent.as_ref(), &id);
            }
            accepted
        }
        Op::Delete { task, cascade } => {
            let Some(id) = task_id(store, *task) else {
                return;
            };
            let policy = if *cascade { DeletePolicy::Cascade } else { DeletePolicy::Orphan };
            match store.delete_task_with(&id, policy) {
                Ok(removed) => {
                    model.remove_all(&removed);
                    // Survivors differ from before only by dropped `subtasks` entries.
                    let mut expected: Vec<Task> = before
                        .tasks
                        .iter()
                        .filter(|t| !removed.contains(&t.id))
                        .cloned()
                        .collect();
                    for t in &mut expected {
                        t.subtasks.retain(|s| !removed.contains(s));
                    }
                    assert_eq!(store.tasks(), expected.as_slice());
                    true
                }
                Err(_) => false,
            }
        }
        Op::Reorder { dragged, target, after } => {
            let (Some(d), Some(t)) = (task_id(store, *dragged), task_id(store, *target)) else {
                return;
            };
            let position = if *after { Position::After } else { Position::Before };
            store.reorder_tasks(&d, &t, position).is_ok()
        }
        Op::Move { task, project } => {
            let Some(id) = task_id(store, *task) else {
                return;
            };
            store.move_task_to_project(&id, &projects[*project]).is_ok()
        }
    };
    if !accepted {
        assert_eq!(store.snapshot(), before, "rejected {op:?} changed state");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn tree_stays_consistent(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let (mut store, _) = memory_store();
        let projects = vec![add_project(&mut store).id, add_project(&mut store).id];
        let mut model = Attachments::default();

        for op in &ops {
            apply(&mut store, &mut model, &projects, op);
            prop_assert!(subtask_index_consistent(store.tasks()), "after {:?}", op);
            for t in store.tasks() {
                prop_assert_eq!(t.subtasks.as_slice(), model.expected(&t.id), "after {:?}", op);
                prop_assert!(!is_on_cycle(store.tasks(), &t.id), "cycle through {}", t.id);
            }
        }
    }

    #[test]
    fn reorder_is_a_pure_permutation(
        count in 2..12usize,
        dragged in 0..12usize,
        target in 0..12usize,
        after in any::<bool>(),
    ) {
        let (mut store, _) = memory_store();
        let p = add_project(&mut store);
        let root = store.add_task(NewTask::new(&p.id, "root")).unwrap();
        for i in 1..count {
            store.add_task(NewTask::new(&p.id, format!("t{i}")).under(&root.id)).unwrap();
        }
        let before = store.snapshot();
        let d = before.tasks[dragged % count].id.clone();
        let t = before.tasks[target % count].id.clone();
        let position = if after { Position::After } else { Position::Before };

        store.reorder_tasks(&d, &t, position).unwrap();

        let mut old = before.tasks.clone();
        let mut new = store.tasks().to_vec();
        old.sort_by(|a, b| a.id.cmp(&b.id));
        new.sort_by(|a, b| a.id.cmp(&b.id));
        prop_assert_eq!(old, new);

        let order: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        let di = order.iter().position(|id| *id == d).unwrap();
        let ti = order.iter().position(|id| *id == t).unwrap();
        if d != t {
            prop_assert_eq!(di, if after { ti + 1 } else { ti - 1 });
        }
    }
}
