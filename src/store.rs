//! The entity store: sole owner of the project and task collections.
//!
//! Every mutation goes through a method on [`Store`]. A successful mutation
//! notifies subscribers and then writes a snapshot through the configured
//! [`SnapshotStore`]. A failed write never rolls the mutation back; it only
//! flips [`Store::save_status`] to [`SaveStatus::Unsaved`] until a later
//! write succeeds.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{IntegrityViolation, PersistError, StoreError, StoreResult};
use crate::fields::{DeletePolicy, Position};
use crate::filter::{filter_tasks, FiltersPatch, TaskFilters};
use crate::hierarchy::{self, DropAction, TreeNode};
use crate::persist::{Snapshot, SnapshotStore};
use crate::project::{validate_progress, NewProject, Project, ProjectPatch};
use crate::stats::{self, ProjectStats};
use crate::task::{NewTask, Task, TaskPatch};

/// Change notification delivered to subscribers after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ProjectAdded(String),
    ProjectUpdated(String),
    ProjectDeleted(String),
    TaskAdded(String),
    TaskUpdated(String),
    /// The deleted task first, then any cascaded descendants.
    TasksDeleted(Vec<String>),
    TasksReordered { dragged: String, target: String, position: Position },
    TaskMoved { task: String, project: String },
    FiltersChanged,
    Replaced,
}

impl StoreEvent {
    /// Filter changes are view state and are not part of the snapshot.
    fn persists(&self) -> bool {
        !matches!(self, StoreEvent::FiltersChanged)
    }
}

/// Outcome of the most recent snapshot write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Unsaved(String),
}

type Subscriber = Box<dyn FnMut(&StoreEvent) + Send>;

/// In-memory project and task collections plus task filter state.
pub struct Store {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    filters: TaskFilters,
    delete_policy: DeletePolicy,
    persistence: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
    subscribers: Vec<Subscriber>,
    last_issued_id: i64,
    save_status: SaveStatus,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("projects", &self.projects.len())
            .field("tasks", &self.tasks.len())
            .field("filters", &self.filters)
            .field("delete_policy", &self.delete_policy)
            .field("save_status", &self.save_status)
            .finish()
    }
}

impl Store {
    /// Empty store writing to `persistence`. Nothing is loaded.
    pub fn new(persistence: impl SnapshotStore + 'static) -> Self {
        Store {
            projects: Vec::new(),
            tasks: Vec::new(),
            filters: TaskFilters::default(),
            delete_policy: DeletePolicy::default(),
            persistence: Box::new(persistence),
            clock: Box::new(SystemClock),
            subscribers: Vec::new(),
            last_issued_id: 0,
            save_status: SaveStatus::Saved,
        }
    }

    /// Store initialised from the last snapshot saved in `persistence`, or empty if there is none.
    pub fn open(persistence: impl SnapshotStore + 'static) -> Result<Self, PersistError> {
        let mut store = Store::new(persistence);
        if let Some(snapshot) = store.persistence.load()? {
            info!(
                projects = snapshot.projects.len(),
                tasks = snapshot.tasks.len(),
                "loaded snapshot"
            );
            store.install(snapshot);
        }
        Ok(store)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Register a callback run after every successful mutation.
    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent) + Send + 'static) {
        self.subscribers.push(Box::new(f));
    }

    // ----- reads -----

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.tasks.is_empty()
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Copy of the persisted part of the state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { projects: self.projects.clone(), tasks: self.tasks.clone() }
    }

    /// Tasks of one project, in collection order.
    pub fn project_tasks(&self, project_id: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.project_id == project_id).collect()
    }

    /// Tasks of one project passing the current filters and `search`.
    pub fn filtered_tasks(&self, project_id: &str, search: &str) -> Vec<&Task> {
        let in_project = self.tasks.iter().filter(|t| t.project_id == project_id);
        filter_tasks(in_project, &self.filters, search)
    }

    pub fn root_tasks(&self, project_id: &str) -> Vec<&Task> {
        hierarchy::root_tasks(&self.tasks, project_id)
    }

    pub fn subtasks_of(&self, task_id: &str) -> Vec<&Task> {
        hierarchy::subtasks_of(&self.tasks, task_id)
    }

    pub fn render_tree(&self, project_id: &str) -> Vec<TreeNode<'_>> {
        hierarchy::render_tree(&self.tasks, project_id)
    }

    pub fn project_stats(&self, project_id: &str) -> StoreResult<ProjectStats> {
        let project = self.project(project_id).ok_or_else(|| StoreError::project(project_id))?;
        Ok(stats::project_stats(project, &self.tasks, self.clock.now()))
    }

    // ----- projects -----

    pub fn add_project(&mut self, data: NewProject) -> StoreResult<Project> {
        let project = Project::from_new(self.next_id(), data, self.clock.now());
        project.validate()?;
        debug!(id = %project.id, title = %project.title, "project added");
        self.projects.push(project.clone());
        self.commit(StoreEvent::ProjectAdded(project.id.clone()));
        Ok(project)
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> StoreResult<&Project> {
        let idx = self.project_index(id)?;
        let merged = self.projects[idx].merged(patch);
        merged.validate()?;
        self.projects[idx] = merged;
        debug!(id, "project updated");
        self.commit(StoreEvent::ProjectUpdated(id.to_string()));
        Ok(&self.projects[idx])
    }

    /// Set the stored progress percentage. Progress is never derived from tasks.
    pub fn set_project_progress(&mut self, id: &str, progress: u8) -> StoreResult<()> {
        validate_progress(progress)?;
        let idx = self.project_index(id)?;
        self.projects[idx].progress = progress;
        debug!(id, progress, "project progress set");
        self.commit(StoreEvent::ProjectUpdated(id.to_string()));
        Ok(())
    }

    /// Remove a project. Its tasks stay in the collection.
    pub fn delete_project(&mut self, id: &str) -> StoreResult<Project> {
        let idx = self.project_index(id)?;
        let removed = self.projects.remove(idx);
        let left_behind = self.tasks.iter().filter(|t| t.project_id == id).count();
        debug!(id, left_behind, "project deleted");
        self.commit(StoreEvent::ProjectDeleted(id.to_string()));
        Ok(removed)
    }

    // ----- tasks -----

    pub fn add_task(&mut self, data: NewTask) -> StoreResult<Task> {
        let task = Task::from_new(self.next_id(), data, self.clock.now());
        task.validate()?;
        if let Some(parent) = &task.parent_task_id {
            self.check_parent(&task.id, &task.project_id, parent)?;
        }
        self.tasks.push(task.clone());
        if let Some(parent) = &task.parent_task_id {
            self.attach(parent, &task.id);
        }
        debug!(
            id = %task.id,
            project = %task.project_id,
            parent = ?task.parent_task_id,
            "task added"
        );
        self.commit(StoreEvent::TaskAdded(task.id.clone()));
        Ok(task)
    }

    /// Merge `patch` into a task. A parent change moves the id between the
    /// old and new parent's `subtasks`.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<&Task> {
        let idx = self.task_index(id)?;
        let reparenting = patch.parent_task_id.is_some() || patch.project_id.is_some();
        let old_parent = self.tasks[idx].parent_task_id.clone();
        let old_project = self.tasks[idx].project_id.clone();
        let merged = self.tasks[idx].merged(patch);
        merged.validate()?;
        if merged.project_id != old_project {
            self.project_index(&merged.project_id)?;
            if let Some(child) = self.subtasks_of(id).first() {
                return Err(IntegrityViolation::CrossProjectParent {
                    parent: id.to_string(),
                    parent_project: merged.project_id.clone(),
                    project: child.project_id.clone(),
                }
                .into());
            }
        }
        if reparenting {
            if let Some(parent) = &merged.parent_task_id {
                self.check_parent(id, &merged.project_id, parent)?;
            }
        }

        let new_parent = merged.parent_task_id.clone();
        self.tasks[idx] = merged;
        if old_parent != new_parent {
            if let Some(old) = &old_parent {
                self.detach(old, id);
            }
            if let Some(new) = &new_parent {
                self.attach(new, id);
            }
            debug!(id, from = ?old_parent, to = ?new_parent, "task reparented");
        }
        debug!(id, "task updated");
        self.commit(StoreEvent::TaskUpdated(id.to_string()));
        Ok(&self.tasks[idx])
    }

    /// Delete a task under the store's configured [`DeletePolicy`].
    pub fn delete_task(&mut self, id: &str) -> StoreResult<Vec<String>> {
        self.delete_task_with(id, self.delete_policy)
    }

    /// Delete a task. Returns every removed id, the requested one first.
    pub fn delete_task_with(&mut self, id: &str, policy: DeletePolicy) -> StoreResult<Vec<String>> {
        self.task_index(id)?;
        let mut doomed: HashSet<String> = HashSet::from([id.to_string()]);
        if policy == DeletePolicy::Cascade {
            let child_map = hierarchy::build_children_map(&self.tasks);
            hierarchy::collect_descendants(id, &child_map, &mut doomed);
        }

        let mut removed = vec![id.to_string()];
        removed.extend(
            self.tasks
                .iter()
                .filter(|t| t.id != id && doomed.contains(&t.id))
                .map(|t| t.id.clone()),
        );
        self.tasks.retain(|t| !doomed.contains(&t.id));
        for t in self.tasks.iter_mut() {
            t.subtasks.retain(|s| !doomed.contains(s));
        }
        debug!(id, ?policy, removed = removed.len(), "task deleted");
        self.commit(StoreEvent::TasksDeleted(removed.clone()));
        Ok(removed)
    }

    /// Move `dragged` next to `target` in the collection order.
    ///
    /// Only the order changes; parent and project links are untouched.
    pub fn reorder_tasks(
        &mut self,
        dragged: &str,
        target: &str,
        position: Position,
    ) -> StoreResult<()> {
        let from = self.task_index(dragged)?;
        let target_idx = self.task_index(target)?;
        if from == target_idx {
            return Ok(());
        }

        let task = self.tasks.remove(from);
        let insert_at = match position {
            Position::Before => target_idx,
            Position::After => target_idx + 1,
        };
        // Removing an earlier element shifted the target one slot left.
        let insert_at = if from < target_idx { insert_at - 1 } else { insert_at };
        self.tasks.insert(insert_at, task);

        debug!(dragged, target, ?position, from, to = insert_at, "task reordered");
        self.commit(StoreEvent::TasksReordered {
            dragged: dragged.to_string(),
            target: target.to_string(),
            position,
        });
        Ok(())
    }

    /// Reassign a task to another project. Returns `false` if it already belonged there.
    ///
    /// Subtasks and the parent link are left as they are.
    pub fn move_task_to_project(&mut self, task_id: &str, project_id: &str) -> StoreResult<bool> {
        let idx = self.task_index(task_id)?;
        self.project_index(project_id)?;
        if self.tasks[idx].project_id == project_id {
            return Ok(false);
        }
        self.tasks[idx].project_id = project_id.to_string();
        debug!(task_id, project_id, "task moved to project");
        self.commit(StoreEvent::TaskMoved {
            task: task_id.to_string(),
            project: project_id.to_string(),
        });
        Ok(true)
    }

    /// Carry out a resolved drag-and-drop gesture.
    pub fn apply_drop(&mut self, action: DropAction) -> StoreResult<()> {
        match action {
            DropAction::Reorder { dragged, target, position } => {
                self.reorder_tasks(&dragged, &target, position)
            }
            DropAction::MoveToProject { task, project } => {
                self.move_task_to_project(&task, &project).map(|_| ())
            }
        }
    }

    pub fn set_filters(&mut self, patch: FiltersPatch) {
        self.filters.merge(patch);
        self.commit(StoreEvent::FiltersChanged);
    }

    /// Replace both collections, repairing the `subtasks` index as needed.
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.install(snapshot);
        self.commit(StoreEvent::Replaced);
    }

    /// Write the current snapshot, retrying after an earlier failure.
    pub fn flush(&mut self) -> Result<(), PersistError> {
        let result = self.persistence.save(&self.snapshot());
        self.save_status = match &result {
            Ok(()) => SaveStatus::Saved,
            Err(e) => SaveStatus::Unsaved(e.to_string()),
        };
        result
    }

    // ----- internals -----

    fn install(&mut self, snapshot: Snapshot) {
        self.projects = snapshot.projects;
        self.tasks = snapshot.tasks;
        let cut = hierarchy::break_cycles(&mut self.tasks);
        if !cut.is_empty() {
            warn!(tasks = ?cut, "parent links formed a loop; detached");
        }
        let crossing: Vec<&str> = hierarchy::cross_project_links(&self.tasks)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        if !crossing.is_empty() {
            warn!(tasks = ?crossing, "subtasks in a different project than their parent");
        }
        let repaired = hierarchy::reindex_subtasks(&mut self.tasks);
        if repaired > 0 {
            warn!(repaired, "subtask index out of sync with parent links; rebuilt");
        }
        let max_loaded = self
            .projects
            .iter()
            .map(|p| p.id.as_str())
            .chain(self.tasks.iter().map(|t| t.id.as_str()))
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        self.last_issued_id = self.last_issued_id.max(max_loaded);
    }

    fn commit(&mut self, event: StoreEvent) {
        for sub in self.subscribers.iter_mut() {
            sub(&event);
        }
        if event.persists() {
            if let Err(e) = self.flush() {
                warn!(error = %e, "snapshot not saved; in-memory state kept");
            }
        }
    }

    /// Millisecond timestamp id, strictly greater than any id issued or loaded.
    /// Once the numeric range is used up, ids become `<millis>-<n>`.
    fn next_id(&mut self) -> String {
        let now = self.clock.now().timestamp_millis();
        let mut candidate = self.last_issued_id.checked_add(1).map(|floor| now.max(floor));
        while let Some(id) = candidate {
            if !self.id_taken(&id.to_string()) {
                self.last_issued_id = id;
                return id.to_string();
            }
            candidate = id.checked_add(1);
        }
        let mut n = 1u64;
        loop {
            let id = format!("{now}-{n}");
            if !self.id_taken(&id) {
                return id;
            }
            n += 1;
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id) || self.projects.iter().any(|p| p.id == id)
    }

    fn project_index(&self, id: &str) -> StoreResult<usize> {
        self.projects.iter().position(|p| p.id == id).ok_or_else(|| StoreError::project(id))
    }

    fn task_index(&self, id: &str) -> StoreResult<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or_else(|| StoreError::task(id))
    }

    /// Reject a parent link that is missing, crosses projects or closes a loop.
    fn check_parent(&self, task_id: &str, project_id: &str, parent_id: &str) -> StoreResult<()> {
        if parent_id == task_id {
            return Err(IntegrityViolation::SelfParent(task_id.to_string()).into());
        }
        let parent = self
            .task(parent_id)
            .ok_or_else(|| IntegrityViolation::ParentNotFound(parent_id.to_string()))?;
        if parent.project_id != project_id {
            return Err(IntegrityViolation::CrossProjectParent {
                parent: parent_id.to_string(),
                parent_project: parent.project_id.clone(),
                project: project_id.to_string(),
            }
            .into());
        }
        if hierarchy::would_create_cycle(&self.tasks, task_id, parent_id) {
            return Err(IntegrityViolation::Cycle {
                task: task_id.to_string(),
                parent: parent_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn attach(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parent) = self.tasks.iter_mut().find(|t| t.id == parent_id) {
            if !parent.subtasks.iter().any(|s| s == child_id) {
                parent.subtasks.push(child_id.to_string());
            }
        }
    }

    fn detach(&mut self, parent_id: &str, child_id: &str) {
        if let Some(parent) = self.tasks.iter_mut().find(|t| t.id == parent_id) {
            parent.subtasks.retain(|s| s != child_id);
        }
    }
}
