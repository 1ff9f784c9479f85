//! Project lifecycle.
//!
//! Ties the orchestration pieces together around a single mutable `Project`
//! record: analysis at creation, then ordering, execution, and assembly
//! during `execute`. Status transitions are monotonic
//! (planned -> in_progress -> completed).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::analysis::{AnalysisError, RequirementAnalyzer};
use super::assembler::DeliverableAssembler;
use super::executor::{ExecutorConfig, ProjectContext, TaskExecutor};
use super::graph::{topological_order, CycleError};
use super::project::{Project, ProjectStatus};
use crate::ai::GenerationService;
use crate::capability::CapabilityCatalog;
use crate::core::{ProjectStore, StoreError};

/// Lifecycle operation errors.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Requirement analysis failed; no project was created.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The task graph contains a cycle; execution aborted.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// No project with this id.
    #[error("Project {0} not found")]
    NotFound(String),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives projects from requirements to deliverable.
///
/// Owns the explicit context threaded through every component: the capability
/// catalog, the generation service, the store, and the executor settings.
/// At most one execution should be in flight per project id; `execute` takes
/// `&mut self` so a single lifecycle value cannot interleave them.
pub struct ProjectLifecycle {
    catalog: Arc<CapabilityCatalog>,
    service: Arc<dyn GenerationService>,
    store: Box<dyn ProjectStore>,
    executor_config: ExecutorConfig,
}

impl ProjectLifecycle {
    /// Create a lifecycle over the given catalog, service, and store.
    pub fn new(
        catalog: Arc<CapabilityCatalog>,
        service: Arc<dyn GenerationService>,
        store: Box<dyn ProjectStore>,
    ) -> Self {
        Self { catalog, service, store, executor_config: ExecutorConfig::default() }
    }

    /// Override the executor configuration.
    pub fn with_executor_config(mut self, config: ExecutorConfig) -> Self {
        self.executor_config = config;
        self
    }

    /// Analyze requirements and store a planned project.
    pub async fn create(&mut self, requirements: &str) -> Result<Project, ProjectError> {
        tracing::info!("Analyzing project requirements");
        let analyzer = RequirementAnalyzer::new(&self.catalog, self.service.as_ref());
        let plan = analyzer.analyze(requirements).await?;

        let project = Project::planned(Uuid::new_v4().to_string(), requirements, plan);
        tracing::info!(
            project = %project.id,
            tasks = project.tasks.len(),
            "Project planned"
        );

        self.store.put(&project)?;
        Ok(project)
    }

    /// Execute a planned project through to a deliverable.
    ///
    /// A project can finish `completed` while containing failed task results
    /// or a placeholder deliverable; only an unknown id or a dependency
    /// cycle aborts.
    pub async fn execute(&mut self, id: &str) -> Result<Project, ProjectError> {
        let mut project =
            self.store.get(id)?.ok_or_else(|| ProjectError::NotFound(id.to_string()))?;

        tracing::info!(project = %project.id, "Starting project execution");
        project.status = ProjectStatus::InProgress;
        self.store.put(&project)?;

        let ordered = topological_order(&project.tasks)?;

        let context = ProjectContext {
            summary: project.plan.summary.clone(),
            tech_stack: project.plan.tech_stack.clone(),
            requirements: project.requirements.clone(),
        };

        let executor = TaskExecutor::new(&self.catalog, self.service.as_ref())
            .with_config(self.executor_config.clone());
        let outcome = executor.execute(&ordered, &context).await;

        if !outcome.skipped.is_empty() {
            tracing::warn!(
                project = %project.id,
                skipped = ?outcome.skipped,
                "Some tasks were skipped because dependencies did not complete"
            );
        }

        tracing::info!(project = %project.id, "Assembling final deliverable");
        let assembler = DeliverableAssembler::new(&self.catalog, self.service.as_ref());
        let deliverable = assembler.assemble(&context, &outcome.results).await;

        project.results = outcome.results;
        project.final_deliverable = Some(deliverable);
        project.status = ProjectStatus::Completed;
        project.completed_at = Some(Utc::now());
        self.store.put(&project)?;

        let (completed, failed) = project.result_counts();
        tracing::info!(
            project = %project.id,
            completed,
            failed,
            "Project execution finished"
        );
        Ok(project)
    }

    /// Fetch a project by id.
    pub fn get(&self, id: &str) -> Result<Project, ProjectError> {
        self.store.get(id)?.ok_or_else(|| ProjectError::NotFound(id.to_string()))
    }

    /// List all stored projects.
    pub fn list(&self) -> Result<Vec<Project>, ProjectError> {
        Ok(self.store.list()?)
    }

    /// The capability catalog in use.
    pub fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }
}
