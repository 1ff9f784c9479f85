//! Final deliverable assembly.
//!
//! Synthesizes a single delivery document from all task results. Assembly
//! failure never fails the project: a recognizable placeholder is stored
//! instead so the run can still finish.

use super::executor::ProjectContext;
use super::project::{TaskResult, TaskStatus};
use crate::ai::GenerationService;
use crate::capability::CapabilityCatalog;

/// Prefix marking a placeholder stored in place of a real deliverable.
pub const FAILURE_PREFIX: &str = "[deliverable unavailable]";

/// Whether a deliverable text is the failure placeholder rather than a
/// genuine document.
pub fn is_failure_placeholder(deliverable: &str) -> bool {
    deliverable.starts_with(FAILURE_PREFIX)
}

/// Synthesizes the final document from task results.
pub struct DeliverableAssembler<'a> {
    catalog: &'a CapabilityCatalog,
    service: &'a dyn GenerationService,
}

impl<'a> DeliverableAssembler<'a> {
    /// Create an assembler over a catalog and a generation service.
    pub fn new(catalog: &'a CapabilityCatalog, service: &'a dyn GenerationService) -> Self {
        Self { catalog, service }
    }

    /// Assemble the final deliverable.
    ///
    /// On service failure this returns the placeholder text rather than an
    /// error, so callers can always complete the project.
    pub async fn assemble(&self, context: &ProjectContext, results: &[TaskResult]) -> String {
        let prompt = build_synthesis_prompt(context, results);
        let system = &self.catalog.coordinator().prompt;

        match self.service.generate(&prompt, system).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Deliverable assembly failed");
                format!("{FAILURE_PREFIX} final synthesis failed: {e}")
            }
        }
    }
}

/// Build the synthesis prompt over every recorded result.
fn build_synthesis_prompt(context: &ProjectContext, results: &[TaskResult]) -> String {
    let mut sections = String::new();
    for result in results {
        let status = match result.status {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        sections.push_str(&format!(
            "Task: {}\nCapability: {}\nStatus: {}\nResult:\n{}\n---\n",
            result.task_id, result.capability_name, status, result.result
        ));
    }

    format!(
        r"Create a final project deliverable by integrating all task results:

Project: {}
Original requirements: {}

Task results:
{}

Please provide:
1. Executive summary
2. Complete solution overview
3. Technical documentation
4. Deployment instructions
5. Maintenance notes and future recommendations

Format as a comprehensive project delivery document.",
        context.summary, context.requirements, sections
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityKey;
    use crate::workflow::testing::ScriptedService;
    use chrono::Utc;

    fn context() -> ProjectContext {
        ProjectContext {
            summary: "A sample project".to_string(),
            tech_stack: vec!["rust".to_string()],
            requirements: "build the sample".to_string(),
        }
    }

    fn result(task_id: &str, status: TaskStatus, text: &str) -> TaskResult {
        TaskResult {
            task_id: task_id.to_string(),
            capability: CapabilityKey::BackendSpecialist,
            capability_name: "Backend Developer".to_string(),
            result: text.to_string(),
            status,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_assemble_returns_document() {
        let catalog = CapabilityCatalog::builtin();
        let service = ScriptedService::replying(["# Delivery\nAll done.".to_string()]);
        let assembler = DeliverableAssembler::new(&catalog, &service);

        let results = vec![
            result("t1", TaskStatus::Completed, "server code"),
            result("t2", TaskStatus::Failed, "Failed: timeout"),
        ];
        let deliverable = assembler.assemble(&context(), &results).await;

        assert_eq!(deliverable, "# Delivery\nAll done.");
        assert!(!is_failure_placeholder(&deliverable));

        // The synthesis prompt lists every result with its status.
        let prompts = service.prompts();
        assert!(prompts[0].contains("Task: t1"));
        assert!(prompts[0].contains("Status: failed"));
        assert!(prompts[0].contains("server code"));
        assert!(prompts[0].contains("build the sample"));
    }

    #[tokio::test]
    async fn test_assemble_failure_yields_placeholder() {
        let catalog = CapabilityCatalog::builtin();
        let service = ScriptedService::failing();
        let assembler = DeliverableAssembler::new(&catalog, &service);

        let deliverable =
            assembler.assemble(&context(), &[result("t1", TaskStatus::Completed, "x")]).await;

        assert!(is_failure_placeholder(&deliverable));
        assert!(deliverable.starts_with(FAILURE_PREFIX));
    }

    #[test]
    fn test_placeholder_is_distinguishable() {
        assert!(is_failure_placeholder("[deliverable unavailable] service down"));
        assert!(!is_failure_placeholder("# Real deliverable"));
    }
}
