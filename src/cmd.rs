//! Command implementations for the CLI interface.
//!
//! Every handler is a thin wrapper: it parses arguments, calls one store
//! operation and prints the result.

use std::io;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use taskboard::display::{format_due_relative, parse_date_input, progress_bar, truncate};
use taskboard::filter::{filter_projects, sort_by_priority};
use taskboard::hierarchy::{self, resolve_drop, DropTarget};
use taskboard::stats::overview;
use taskboard::{
    DeletePolicy, FilterValue, FiltersPatch, NewProject, NewTask, Position, Priority, ProjectPatch,
    ProjectStatus, Store, Task, TaskPatch, TaskStatus,
};

use crate::cli::Cli;

#[derive(Subcommand)]
pub enum Commands {
    /// Create, list and edit projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Create, list, edit and rearrange tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show task statistics for one project.
    Stats {
        /// Project ID.
        project: String,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show totals across all projects.
    Overview {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Add a new project.
    Add {
        /// Project title.
        title: String,
        /// Description (required).
        #[arg(long)]
        desc: String,
        /// Start date: YYYY-MM-DD, "today", "in Nd", ...
        #[arg(long)]
        start: String,
        /// End date, after the start date.
        #[arg(long)]
        end: String,
        #[arg(long, value_enum, default_value_t = ProjectStatus::Active)]
        status: ProjectStatus,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Display colour, e.g. "#6366f1".
        #[arg(long)]
        color: Option<String>,
        /// Team member name. May be repeated.
        #[arg(long = "member")]
        members: Vec<String>,
    },

    /// List projects.
    List {
        /// Status filter: all | active | completed | on-hold.
        #[arg(long, default_value = "all")]
        status: FilterValue<ProjectStatus>,
        /// Only projects whose title or description contains this text.
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show one project with its statistics.
    Show {
        /// Project ID.
        id: String,
    },

    /// Update fields on a project.
    Update {
        /// Project ID.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<ProjectStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Replace the team with these members. May be repeated.
        #[arg(long = "member")]
        members: Vec<String>,
        /// Remove every team member.
        #[arg(long, conflicts_with = "members")]
        clear_members: bool,
    },

    /// Set the progress percentage of a project.
    Progress {
        /// Project ID.
        id: String,
        /// 0 to 100.
        percent: u8,
    },

    /// Delete a project. Its tasks are kept.
    Delete {
        /// Project ID.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a new task.
    Add {
        /// Owning project ID.
        project: String,
        /// Short title for the task.
        title: String,
        #[arg(long, default_value = "")]
        desc: String,
        #[arg(long, value_enum, default_value_t = TaskStatus::Todo)]
        status: TaskStatus,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", "friday".
        #[arg(long)]
        due: Option<String>,
        /// Parent task ID.
        #[arg(long)]
        parent: Option<String>,
        #[arg(long, default_value = "")]
        assignee: String,
    },

    /// List the tasks of a project.
    List {
        /// Project ID.
        project: String,
        /// all | todo | in-progress | completed
        #[arg(long, default_value = "all")]
        status: FilterValue<TaskStatus>,
        /// all | low | medium | high | urgent
        #[arg(long, default_value = "all")]
        priority: FilterValue<Priority>,
        /// Assignee name, or "all".
        #[arg(long, default_value = "all")]
        assignee: FilterValue<String>,
        /// Only tasks whose title or description contains this text.
        #[arg(long, default_value = "")]
        search: String,
        /// Sort urgent first instead of list order.
        #[arg(long)]
        by_priority: bool,
    },

    /// Show root tasks with their subtasks.
    Tree {
        /// Project ID.
        project: String,
        /// Expand subtasks at every depth, not just one level.
        #[arg(long)]
        deep: bool,
    },

    /// View a single task.
    View {
        /// Task ID.
        id: String,
    },

    /// Update fields on a task.
    Update {
        /// Task ID.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        status: Option<TaskStatus>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        /// Clear due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        /// New parent task ID.
        #[arg(long)]
        parent: Option<String>,
        /// Make this a root task.
        #[arg(long, conflicts_with = "parent")]
        clear_parent: bool,
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Flip a task between completed and todo.
    Toggle {
        /// Task ID.
        id: String,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: String,
        /// What happens to subtasks; defaults to the configured policy.
        #[arg(long, value_enum)]
        policy: Option<DeletePolicy>,
    },

    /// Move a task next to another task in the list order.
    Reorder {
        /// Task being moved.
        dragged: String,
        /// Task it is placed next to.
        target: String,
        #[arg(long, value_enum, default_value_t = Position::Before)]
        position: Position,
    },

    /// Reassign a task to another project.
    Move {
        /// Task ID.
        id: String,
        /// Destination project ID.
        project: String,
    },

    /// Apply a drag-and-drop gesture: onto a task reorders, onto a project moves.
    Drop {
        /// Dragged task ID.
        id: String,
        #[arg(long, conflicts_with = "onto_project", required_unless_present = "onto_project")]
        onto_task: Option<String>,
        #[arg(long)]
        onto_project: Option<String>,
    },
}

/// Run one parsed command against the store.
pub fn dispatch(store: &mut Store, command: Commands) -> Result<()> {
    match command {
        Commands::Project { action } => cmd_project(store, action),
        Commands::Task { action } => cmd_task(store, action),
        Commands::Stats { project, json } => cmd_stats(store, &project, json),
        Commands::Overview { json } => cmd_overview(store, json),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Print completion script for `shell` to stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn parse_date(store: &Store, input: &str) -> Result<NaiveDate> {
    parse_date_input(input, store.now().date_naive()).ok_or_else(|| {
        anyhow!("Unrecognised date '{input}'. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.")
    })
}

fn parse_opt_date(store: &Store, input: Option<String>) -> Result<Option<NaiveDate>> {
    input.map(|s| parse_date(store, &s)).transpose()
}

fn cmd_project(store: &mut Store, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::Add { title, desc, start, end, status, priority, color, members } => {
            let start = parse_date(store, &start)?;
            let end = parse_date(store, &end)?;
            let mut data = NewProject::new(title, desc, start, end);
            data.status = status;
            data.priority = priority;
            data.team_members = members;
            if let Some(c) = color {
                data.color = c;
            }
            let project = store.add_project(data)?;
            println!("Added project {}", project.id);
        }
        ProjectAction::List { status, search } => {
            println!("{:<15} {:<10} {:<8} {:<17} {}", "ID", "Status", "Pri", "Progress", "Title");
            for p in filter_projects(store.projects(), &status, &search) {
                println!(
                    "{:<15} {:<10} {:<8} {:<17} {}",
                    truncate(&p.id, 15),
                    p.status.to_string(),
                    p.priority.to_string(),
                    progress_bar(p.progress, 10),
                    p.title
                );
            }
        }
        ProjectAction::Show { id } => {
            let stats = store.project_stats(&id)?;
            let Some(p) = store.project(&id) else {
                bail!("project {id} not found");
            };
            println!("ID:           {}", p.id);
            println!("Title:        {}", p.title);
            println!("Status:       {}", p.status);
            println!("Priority:     {}", p.priority);
            println!("Timeline:     {} -> {}", p.start_date, p.end_date);
            println!("Progress:     {}", progress_bar(p.progress, 20));
            let team =
                if p.team_members.is_empty() { "-".into() } else { p.team_members.join(", ") };
            println!("Team:         {team}");
            println!("Created UTC:  {}", p.created_at.to_rfc3339());
            println!("Description:\n{}\n", p.description);
            println!(
                "Tasks: {} total, {} done ({}%), {} in progress, {} todo, {} overdue, \
                 {} urgent open",
                stats.total,
                stats.status_counts.completed,
                stats.completion_rate,
                stats.status_counts.in_progress,
                stats.status_counts.todo,
                stats.overdue_count,
                stats.urgent_open_count
            );
        }
        ProjectAction::Update {
            id,
            title,
            desc,
            status,
            priority,
            start,
            end,
            color,
            members,
            clear_members,
        } => {
            let team_members = if clear_members {
                Some(Vec::new())
            } else if members.is_empty() {
                None
            } else {
                Some(members)
            };
            let patch = ProjectPatch {
                title,
                description: desc,
                status,
                priority,
                start_date: parse_opt_date(store, start)?,
                end_date: parse_opt_date(store, end)?,
                progress: None,
                color,
                team_members,
            };
            if patch.is_empty() {
                bail!("Nothing to update.");
            }
            store.update_project(&id, patch)?;
            println!("Updated project {id}");
        }
        ProjectAction::Progress { id, percent } => {
            store.set_project_progress(&id, percent)?;
            println!("Project {id} at {percent}%");
        }
        ProjectAction::Delete { id } => {
            let removed = store.delete_project(&id)?;
            let left = store.project_tasks(&id).len();
            println!("Deleted project {}", removed.id);
            if left > 0 {
                println!("{left} task(s) still reference it.");
            }
        }
    }
    Ok(())
}

fn cmd_task(store: &mut Store, action: TaskAction) -> Result<()> {
    match action {
        TaskAction::Add { project, title, desc, status, priority, due, parent, assignee } => {
            let data = NewTask {
                project_id: project,
                title,
                description: desc,
                status,
                priority,
                due_date: parse_opt_date(store, due)?,
                parent_task_id: parent,
                assignee,
            };
            let task = store.add_task(data)?;
            println!("Added task {}", task.id);
        }
        TaskAction::List { project, status, priority, assignee, search, by_priority } => {
            store.set_filters(FiltersPatch {
                status: Some(status),
                priority: Some(priority),
                assignee: Some(assignee),
            });
            let mut tasks = store.filtered_tasks(&project, &search);
            if by_priority {
                sort_by_priority(&mut tasks);
            }
            print_table(store, &tasks, false);
        }
        TaskAction::Tree { project, deep } => {
            if deep {
                let mut rows = Vec::new();
                for root in store.root_tasks(&project) {
                    rows.push(root);
                    rows.extend(walk(store, &root.id));
                }
                print_table(store, &rows, true);
            } else {
                let mut rows = Vec::new();
                let mut hidden = 0;
                for node in store.render_tree(&project) {
                    rows.push(node.task);
                    for sub in node.subtasks {
                        hidden += store.subtasks_of(&sub.id).len();
                        rows.push(sub);
                    }
                }
                print_table(store, &rows, true);
                if hidden > 0 {
                    println!("({hidden} deeper subtask(s) not shown; use --deep)");
                }
            }
        }
        TaskAction::View { id } => {
            let Some(t) = store.task(&id) else {
                bail!("task {id} not found");
            };
            let today = store.now().date_naive();
            println!("ID:           {}", t.id);
            println!("Project:      {}", t.project_id);
            println!("Title:        {}", t.title);
            println!("Status:       {}", t.status);
            println!("Priority:     {}", t.priority);
            let assignee = if t.assignee.is_empty() { "-" } else { t.assignee.as_str() };
            println!("Assignee:     {assignee}");
            println!(
                "Due:          {}",
                match t.due_date {
                    Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
                    None => "-".into(),
                }
            );
            println!("Parent:       {}", t.parent_task_id.as_deref().unwrap_or("-"));
            let subtasks = if t.subtasks.is_empty() { "-".into() } else { t.subtasks.join(", ") };
            println!("Subtasks:     {subtasks}");
            let chain = hierarchy::ancestors(store.tasks(), &t.id);
            if !chain.is_empty() {
                println!("Ancestors:    {}", chain.join(" -> "));
            }
            println!("Created UTC:  {}", t.created_at.to_rfc3339());
            let description = if t.description.is_empty() { "-" } else { t.description.as_str() };
            println!("Description:\n{description}\n");
        }
        TaskAction::Update {
            id,
            title,
            desc,
            status,
            priority,
            due,
            clear_due,
            parent,
            clear_parent,
            assignee,
        } => {
            let due_date =
                if clear_due { Some(None) } else { parse_opt_date(store, due)?.map(Some) };
            let parent_task_id = if clear_parent { Some(None) } else { parent.map(Some) };
            let patch = TaskPatch {
                project_id: None,
                title,
                description: desc,
                status,
                priority,
                due_date,
                parent_task_id,
                assignee,
            };
            if patch.is_empty() {
                bail!("Nothing to update.");
            }
            store.update_task(&id, patch)?;
            println!("Updated task {id}");
        }
        TaskAction::Toggle { id } => {
            let current = store
                .task(&id)
                .map(|t| t.status)
                .ok_or_else(|| anyhow!("task {id} not found"))?;
            let next = current.toggled();
            store.update_task(&id, TaskPatch::status(next))?;
            println!("Task {id} is now {next}");
        }
        TaskAction::Delete { id, policy } => {
            let policy = policy.unwrap_or(store.delete_policy());
            let removed = store.delete_task_with(&id, policy)?;
            if removed.len() > 1 {
                println!("Deleted task {id} and {} subtask(s)", removed.len() - 1);
            } else {
                println!("Deleted task {id}");
            }
        }
        TaskAction::Reorder { dragged, target, position } => {
            store.reorder_tasks(&dragged, &target, position)?;
            let side = if position == Position::Before { "before" } else { "after" };
            println!("Moved {dragged} {side} {target}");
        }
        TaskAction::Move { id, project } => {
            if store.move_task_to_project(&id, &project)? {
                println!("Moved task {id} to project {project}");
            } else {
                println!("Task {id} already in project {project}");
            }
        }
        TaskAction::Drop { id, onto_task, onto_project } => {
            let target = match (onto_task, onto_project) {
                (Some(task), _) => DropTarget::Task(task),
                (None, Some(project)) => DropTarget::Project(project),
                (None, None) => bail!("Give --onto-task or --onto-project."),
            };
            store.apply_drop(resolve_drop(&id, target))?;
            println!("Dropped task {id}");
        }
    }
    Ok(())
}

/// Depth-first descendants of `id`, children in list order.
fn walk<'a>(store: &'a Store, id: &str) -> Vec<&'a Task> {
    let mut out = Vec::new();
    for child in store.subtasks_of(id) {
        out.push(child);
        out.extend(walk(store, &child.id));
    }
    out
}

fn cmd_stats(store: &Store, project: &str, json: bool) -> Result<()> {
    let stats = store.project_stats(project)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("Total tasks:     {}", stats.total);
    for s in TaskStatus::ALL {
        println!("  {:<13} {}", s.to_string(), stats.status_counts.get(s));
    }
    for p in Priority::ALL.iter().rev() {
        println!("  {:<13} {}", p.to_string(), stats.priority_counts.get(*p));
    }
    println!("Completion rate: {}%", stats.completion_rate);
    println!("Overdue:         {}", stats.overdue_count);
    println!("Urgent (open):   {} ({})", stats.urgent_count, stats.urgent_open_count);
    println!("Team members:    {}", stats.team_size);
    Ok(())
}

fn cmd_overview(store: &Store, json: bool) -> Result<()> {
    let o = overview(store.projects(), store.tasks());
    if json {
        println!("{}", serde_json::to_string_pretty(&o)?);
        return Ok(());
    }
    println!("Projects:        {} ({} active)", o.total_projects, o.active_projects);
    println!("Tasks:           {}", o.total_tasks);
    println!("Completed tasks: {}", o.completed_tasks);
    println!("Pending tasks:   {}", o.pending_tasks);
    Ok(())
}

/// Print tasks in a formatted table with optional tree indentation.
fn print_table(store: &Store, tasks: &[&Task], indent: bool) {
    println!(
        "{:<15} {:<12} {:<7} {:<10} {:<12} {}",
        "ID", "Status", "Pri", "Due", "Assignee", "Title"
    );
    let today = store.now().date_naive();
    for t in tasks {
        let depth = if indent { hierarchy::depth_of(store.tasks(), &t.id) } else { 0 };
        println!(
            "{:<15} {:<12} {:<7} {:<10} {:<12} {}{}",
            truncate(&t.id, 15),
            t.status.to_string(),
            t.priority.to_string(),
            format_due_relative(t.due_date, today),
            truncate(if t.assignee.is_empty() { "-" } else { t.assignee.as_str() }, 12),
            "  ".repeat(depth),
            t.title
        );
    }
}
