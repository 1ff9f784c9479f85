//! Project orchestration workflow.
//!
//! Turns free-text requirements into a dependency-ordered task plan,
//! dispatches each task to a specialist capability via the generation
//! service, and assembles a final deliverable.
//!
//! ## Pipeline
//!
//! - [`RequirementAnalyzer`] - requirements -> validated [`Plan`]
//! - [`topological_order`] - dependency-ordered task sequence
//! - [`TaskExecutor`] - runs tasks, records [`TaskResult`]s
//! - [`DeliverableAssembler`] - synthesizes the final document
//! - [`ProjectLifecycle`] - drives the whole run over a project store

mod analysis;
mod assembler;
mod executor;
mod graph;
mod lifecycle;
mod project;

pub use analysis::{extract_object, AnalysisError, RequirementAnalyzer};
pub use assembler::{is_failure_placeholder, DeliverableAssembler, FAILURE_PREFIX};
pub use executor::{ExecutionOutcome, ExecutorConfig, ProjectContext, TaskExecutor};
pub use graph::{topological_order, CycleError};
pub use lifecycle::{ProjectError, ProjectLifecycle};
pub use project::{Plan, Project, ProjectStatus, Task, TaskResult, TaskStatus};
