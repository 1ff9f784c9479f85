//! Project data model.
//!
//! The `Project` record is the unit of persistence: everything the
//! orchestration run produces ends up here, and downstream tooling parses the
//! serialized form, so field names are part of the contract and result text is
//! stored verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityKey;

/// Project lifecycle status. Transitions are monotonic:
/// planned -> in_progress -> completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planned => f.write_str("planned"),
            ProjectStatus::InProgress => f.write_str("in_progress"),
            ProjectStatus::Completed => f.write_str("completed"),
        }
    }
}

/// Outcome of a single task attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// A unit of work assigned to one capability.
///
/// Immutable after analysis, except that validation rewrites unresolved
/// capability names to the coordinator key before the task is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Id unique within the project (e.g. "task_1")
    pub id: String,

    /// Short title
    pub title: String,

    /// What the specialist should produce
    pub description: String,

    /// Assigned capability
    pub capability: CapabilityKey,

    /// Ids of tasks that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Effort estimate from the analysis
    #[serde(default)]
    pub estimated_hours: f64,
}

/// Result recorded for one task attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,

    pub capability: CapabilityKey,

    /// Display name of the capability that produced this result
    pub capability_name: String,

    /// The service response, stored verbatim (downstream tools scan it for
    /// fenced code segments)
    pub result: String,

    pub status: TaskStatus,

    pub completed_at: DateTime<Utc>,
}

/// Structured output of requirement analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// One-paragraph project summary
    pub summary: String,

    /// Capabilities the plan calls for
    #[serde(default)]
    pub required_capabilities: Vec<String>,

    /// Validated task list
    pub tasks: Vec<Task>,

    /// Proposed technology stack
    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// Overall time estimate, free text
    #[serde(default)]
    pub estimated_time: String,

    /// Anticipated risks/challenges
    #[serde(default)]
    pub challenges: Vec<String>,

    /// Expected deliverables
    #[serde(default)]
    pub deliverables: Vec<String>,
}

/// A project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project id
    pub id: String,

    /// The raw requirements text the project was created from
    pub requirements: String,

    /// Analyzer output
    pub plan: Plan,

    pub status: ProjectStatus,

    /// Task list (mirrors `plan.tasks` at creation time)
    pub tasks: Vec<Task>,

    /// One entry per attempted task, in execution order
    #[serde(default)]
    pub results: Vec<TaskResult>,

    /// Synthesized final document, present once execution finished
    #[serde(default)]
    pub final_deliverable: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a freshly-planned project around an analyzed plan.
    pub fn planned(id: impl Into<String>, requirements: impl Into<String>, plan: Plan) -> Self {
        let tasks = plan.tasks.clone();
        Self {
            id: id.into(),
            requirements: requirements.into(),
            plan,
            status: ProjectStatus::Planned,
            tasks,
            results: Vec::new(),
            final_deliverable: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Count of (completed, failed) results.
    pub fn result_counts(&self) -> (usize, usize) {
        let completed =
            self.results.iter().filter(|r| r.status == TaskStatus::Completed).count();
        (completed, self.results.len() - completed)
    }
}
