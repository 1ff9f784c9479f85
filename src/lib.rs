//! # Taskforge
//!
//! AI project orchestrator - turn free-text requirements into an executed,
//! dependency-ordered task plan with a synthesized final deliverable.
//!
//! Taskforge analyzes a requirement with a coordinator capability, breaks it
//! into tasks assigned to specialist capability profiles, executes them in
//! topological order against a text-generation service, and assembles the
//! results into one delivery document.
//!
//! ## Quick Start
//!
//! ```bash
//! # Plan and execute a project in one shot
//! export GEMINI_API_KEY=...
//! taskforge run "Build a real-time chat application"
//!
//! # Or step by step
//! taskforge create "Build a real-time chat application"
//! taskforge execute <project-id>
//! taskforge show <project-id>
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::struct_field_names)]

pub mod ai;
pub mod capability;
pub mod core;
pub mod workflow;

pub use ai::{GenerationManager, GenerationService, ServiceError};
pub use capability::{CapabilityCatalog, CapabilityKey, CapabilityProfile};
pub use core::{Config, JsonFileStore, MemoryStore, ProjectStore, StoreError};
pub use workflow::{
    AnalysisError, CycleError, DeliverableAssembler, ExecutorConfig, Plan, Project, ProjectError,
    ProjectLifecycle, ProjectStatus, RequirementAnalyzer, Task, TaskExecutor, TaskResult,
    TaskStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "taskforge";
