//! Shared fixtures for taskboard integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use taskboard::{FixedClock, MemoryStore, NewProject, Project, Store};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Clock frozen at 2024-02-15 12:00 UTC.
pub fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap())
}

/// Empty store over an in-memory backend, plus a handle to that backend.
pub fn memory_store() -> (Store, MemoryStore) {
    let backend = MemoryStore::new();
    (Store::new(backend.clone()).with_clock(clock()), backend)
}

/// Project P from the reference scenario: 2024-01-01 to 2024-03-01.
pub fn add_project(store: &mut Store) -> Project {
    store
        .add_project(NewProject::new("P", "Reference project", date(2024, 1, 1), date(2024, 3, 1)))
        .unwrap()
}

pub fn titles(store: &Store) -> Vec<String> {
    store.tasks().iter().map(|t| t.title.clone()).collect()
}

/// Isolated data directory for driving the `tb` binary.
pub struct TestEnv {
    pub data_dir: tempfile::TempDir,
}

impl TestEnv {
    /// Empty board: demo seeding disabled through `config.toml`.
    pub fn new() -> Self {
        let data_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(data_dir.path().join("config.toml"), "seed_demo_data = false\n").unwrap();
        Self { data_dir }
    }

    /// Board left to seed itself with demo data on first use.
    pub fn seeded() -> Self {
        Self { data_dir: tempfile::TempDir::new().unwrap() }
    }

    /// Command for the `tb` binary pointed at this environment's data directory.
    pub fn tb(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_tb"));
        cmd.arg("--dir").arg(self.data_dir.path());
        cmd.env_remove("TASKBOARD_DIR").env_remove("TASKBOARD_LOG");
        cmd
    }

    pub fn data_file(&self) -> std::path::PathBuf {
        self.data_dir.path().join("taskboard.json")
    }

    pub fn snapshot(&self) -> taskboard::Snapshot {
        taskboard::Snapshot::from_json(&std::fs::read_to_string(self.data_file()).unwrap()).unwrap()
    }

    /// Run `args`, expect success and return the id printed after `prefix`.
    pub fn create(&self, args: &[&str], prefix: &str) -> String {
        let out = self.tb().args(args).assert().success().get_output().stdout.clone();
        let out = String::from_utf8(out).unwrap();
        out.trim()
            .strip_prefix(prefix)
            .unwrap_or_else(|| panic!("unexpected output: {out}"))
            .to_string()
    }

    pub fn add_project(&self, title: &str) -> String {
        let dates = ["--start", "2024-01-01", "--end", "2024-03-01"];
        let mut args = vec!["project", "add", title, "--desc", "desc"];
        args.extend_from_slice(&dates);
        self.create(&args, "Added project ")
    }

    pub fn add_task(&self, project: &str, title: &str, extra: &[&str]) -> String {
        let mut args = vec!["task", "add", project, title];
        args.extend_from_slice(extra);
        self.create(&args, "Added task ")
    }
}
