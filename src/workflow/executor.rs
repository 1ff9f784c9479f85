//! Task execution engine.
//!
//! Walks the topological order, gating each task on completed dependencies,
//! and records one [`TaskResult`] per attempted task. Execution is sequential
//! by default; `ExecutorConfig::concurrency` admits independent tasks in
//! bounded waves when raised above 1.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;

use super::project::{Task, TaskResult, TaskStatus};
use crate::ai::GenerationService;
use crate::capability::CapabilityCatalog;

/// Task executor configuration.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum tasks in flight at once. 1 reproduces strictly sequential
    /// execution; higher values run independent branches together.
    pub concurrency: usize,

    /// Unconditional pause between waves, to respect service rate limits.
    pub pause: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { concurrency: 1, pause: Duration::from_secs(1) }
    }
}

/// Shared project context injected into every execution prompt.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Plan summary
    pub summary: String,

    /// Proposed tech stack
    pub tech_stack: Vec<String>,

    /// Original requirements text
    pub requirements: String,
}

/// What an execution run produced.
#[derive(Debug)]
pub struct ExecutionOutcome {
    /// One result per attempted task, in completion order
    pub results: Vec<TaskResult>,

    /// Ids of tasks skipped because a dependency failed, was skipped, or
    /// names no task in the run. Skipped tasks produce no result and are
    /// never retried.
    pub skipped: Vec<String>,
}

/// How a pending task relates to the results recorded so far.
enum Readiness {
    /// All dependencies completed
    Ready,
    /// Some dependency has not run yet
    Waiting,
    /// A dependency failed, was skipped, or names no task in the run
    Doomed,
}

/// Runs tasks against the generation service.
pub struct TaskExecutor<'a> {
    catalog: &'a CapabilityCatalog,
    service: &'a dyn GenerationService,
    config: ExecutorConfig,
}

impl<'a> TaskExecutor<'a> {
    /// Create an executor with the default configuration.
    pub fn new(catalog: &'a CapabilityCatalog, service: &'a dyn GenerationService) -> Self {
        Self { catalog, service, config: ExecutorConfig::default() }
    }

    /// Override the configuration.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Execute `ordered` (a topological order) under the shared context.
    ///
    /// Task-level failures do not abort the run: a failed service call is
    /// recorded as a failed result and execution continues.
    pub async fn execute(&self, ordered: &[&Task], context: &ProjectContext) -> ExecutionOutcome {
        let limit = self.config.concurrency.max(1);
        let known: HashSet<&str> = ordered.iter().map(|t| t.id.as_str()).collect();

        let mut pending: VecDeque<&Task> = ordered.iter().copied().collect();
        let mut completed: HashSet<String> = HashSet::new();
        let mut unrunnable: HashSet<String> = HashSet::new();
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        let mut first_wave = true;

        while !pending.is_empty() {
            let mut batch: Vec<&Task> = Vec::new();
            let mut waiting: VecDeque<&Task> = VecDeque::new();
            let mut newly_skipped = 0usize;

            while let Some(task) = pending.pop_front() {
                match self.classify(task, &known, &completed, &unrunnable) {
                    Readiness::Ready if batch.len() < limit => batch.push(task),
                    Readiness::Ready => waiting.push_back(task),
                    Readiness::Waiting => waiting.push_back(task),
                    Readiness::Doomed => {
                        tracing::info!(task = %task.id, "Skipping task, dependencies not met");
                        unrunnable.insert(task.id.clone());
                        skipped.push(task.id.clone());
                        newly_skipped += 1;
                    }
                }
            }

            if batch.is_empty() {
                if newly_skipped == 0 {
                    // Only possible if the input was not a real topological
                    // order; nothing left can ever run.
                    for task in waiting {
                        tracing::warn!(task = %task.id, "Task unreachable in this run, skipping");
                        skipped.push(task.id.clone());
                    }
                    break;
                }
                pending = waiting;
                continue;
            }

            if !first_wave {
                tokio::time::sleep(self.config.pause).await;
            }
            first_wave = false;

            let wave = join_all(batch.iter().map(|task| self.execute_task(task, context))).await;
            for (task, result) in batch.iter().zip(wave) {
                if result.status == TaskStatus::Completed {
                    completed.insert(task.id.clone());
                } else {
                    unrunnable.insert(task.id.clone());
                }
                results.push(result);
            }

            pending = waiting;
        }

        ExecutionOutcome { results, skipped }
    }

    fn classify(
        &self,
        task: &Task,
        known: &HashSet<&str>,
        completed: &HashSet<String>,
        unrunnable: &HashSet<String>,
    ) -> Readiness {
        let mut ready = true;
        for dep in &task.dependencies {
            if completed.contains(dep) {
                continue;
            }
            if unrunnable.contains(dep) || !known.contains(dep.as_str()) {
                return Readiness::Doomed;
            }
            ready = false;
        }
        if ready {
            Readiness::Ready
        } else {
            Readiness::Waiting
        }
    }

    /// Run one task: build the prompt, call the service, record the outcome.
    async fn execute_task(&self, task: &Task, context: &ProjectContext) -> TaskResult {
        let profile = self.catalog.profile(task.capability);

        tracing::info!(
            task = %task.id,
            title = %task.title,
            capability = %task.capability,
            "Executing task"
        );

        let prompt = build_execution_prompt(task, context);

        match self.service.generate(&prompt, &profile.prompt).await {
            Ok(text) => TaskResult {
                task_id: task.id.clone(),
                capability: task.capability,
                capability_name: profile.name.clone(),
                result: text,
                status: TaskStatus::Completed,
                completed_at: Utc::now(),
            },
            Err(e) => {
                tracing::error!(task = %task.id, error = %e, "Task execution failed");
                TaskResult {
                    task_id: task.id.clone(),
                    capability: task.capability,
                    capability_name: profile.name.clone(),
                    result: format!("Failed: {e}"),
                    status: TaskStatus::Failed,
                    completed_at: Utc::now(),
                }
            }
        }
    }
}

/// Build the execution prompt for one task.
fn build_execution_prompt(task: &Task, context: &ProjectContext) -> String {
    format!(
        r"Execute this task for the project:

Project summary: {}
Tech stack: {}
Original requirements: {}

Task details:
- Title: {}
- Description: {}

Please provide:
1. Complete implementation/solution
2. Code files where applicable (in fenced code blocks)
3. Documentation
4. Testing instructions
5. Integration notes

Format your response as structured output with clear sections.",
        context.summary,
        if context.tech_stack.is_empty() {
            "not specified".to_string()
        } else {
            context.tech_stack.join(", ")
        },
        context.requirements,
        task.title,
        task.description,
    )
}
