//! Project persistence.
//!
//! The lifecycle talks to a [`ProjectStore`] rather than an ambient map:
//! in-memory for tests and one-shot runs, JSON files on disk for the CLI so
//! downstream tools can pick up completed project records.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::workflow::Project;

/// Store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Project record not decodable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where project records live.
pub trait ProjectStore: Send {
    /// Insert or replace a project record.
    fn put(&mut self, project: &Project) -> Result<(), StoreError>;

    /// Fetch a project by id.
    fn get(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// List all projects, oldest first.
    fn list(&self) -> Result<Vec<Project>, StoreError>;
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    projects: HashMap<String, Project>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn put(&mut self, project: &Project) -> Result<(), StoreError> {
        self.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects: Vec<Project> = self.projects.values().cloned().collect();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }
}

/// One pretty-printed JSON file per project under a directory.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("project_{id}.json"))
    }

    fn read_record(path: &Path) -> Result<Project, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ProjectStore for JsonFileStore {
    fn put(&mut self, project: &Project) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(project)?;
        fs::write(self.path_for(&project.id), content)?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::read_record(&path)?))
    }

    fn list(&self) -> Result<Vec<Project>, StoreError> {
        let mut projects = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("project_") && n.ends_with(".json"))
                .unwrap_or(false);
            if !is_record {
                continue;
            }
            match Self::read_record(&path) {
                Ok(project) => projects.push(project),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable project record");
                }
            }
        }
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityKey;
    use crate::workflow::{Plan, Task};

    fn sample(id: &str) -> Project {
        let plan = Plan {
            summary: "s".to_string(),
            required_capabilities: Vec::new(),
            tasks: vec![Task {
                id: "task_1".to_string(),
                title: "t".to_string(),
                description: String::new(),
                capability: CapabilityKey::Tester,
                dependencies: Vec::new(),
                estimated_hours: 1.0,
            }],
            tech_stack: Vec::new(),
            estimated_time: String::new(),
            challenges: Vec::new(),
            deliverables: Vec::new(),
        };
        Project::planned(id, "req", plan)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let project = sample("p-1");
        store.put(&project).unwrap();

        assert_eq!(store.get("p-1").unwrap(), Some(project));
        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        let project = sample("p-2");
        store.put(&project).unwrap();

        assert!(dir.path().join("project_p-2.json").exists());
        assert_eq!(store.get("p-2").unwrap(), Some(project));
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_list_ignores_foreign_files() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        store.put(&sample("a")).unwrap();
        store.put(&sample("b")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("project_bad.json"), "{not json").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_put_overwrites_existing_record() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut store = JsonFileStore::open(dir.path()).unwrap();

        let mut project = sample("p-3");
        store.put(&project).unwrap();

        project.final_deliverable = Some("done".to_string());
        store.put(&project).unwrap();

        let loaded = store.get("p-3").unwrap().unwrap();
        assert_eq!(loaded.final_deliverable.as_deref(), Some("done"));
    }
}
