//! Requirement analysis.
//!
//! Sends the raw requirements plus the capability catalog to the generation
//! service and decodes the response into a validated [`Plan`]. Model output is
//! rarely pure JSON, so the analyzer extracts the first balanced top-level
//! object before decoding, and decodes strictly: a plan that does not match
//! the schema is an error carrying the raw text, not a partial recovery.

use serde::Deserialize;

use super::project::{Plan, Task};
use crate::ai::{GenerationService, ServiceError};
use crate::capability::CapabilityCatalog;

/// Requirement-analysis errors.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The generation service itself failed; fatal to project creation.
    #[error("Generation service failed during analysis: {0}")]
    Service(#[from] ServiceError),

    /// The response contained no bracketed object at all.
    #[error("Analysis response contained no JSON object")]
    NoObject {
        /// The raw response, kept for diagnosis
        raw: String,
    },

    /// The extracted object did not decode as a plan.
    #[error("Analysis response did not decode as a plan: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// The raw response, kept for diagnosis
        raw: String,
    },
}

/// Raw task shape as emitted by the model, before capability validation.
#[derive(Debug, Deserialize)]
struct DraftTask {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    capability: String,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    estimated_hours: f64,
}

/// Raw plan shape as emitted by the model.
#[derive(Debug, Deserialize)]
struct DraftPlan {
    summary: String,
    #[serde(default)]
    required_capabilities: Vec<String>,
    tasks: Vec<DraftTask>,
    #[serde(default)]
    tech_stack: Vec<String>,
    #[serde(default)]
    estimated_time: String,
    #[serde(default)]
    challenges: Vec<String>,
    #[serde(default)]
    deliverables: Vec<String>,
}

/// Translates free-text requirements into a structured plan.
pub struct RequirementAnalyzer<'a> {
    catalog: &'a CapabilityCatalog,
    service: &'a dyn GenerationService,
}

impl<'a> RequirementAnalyzer<'a> {
    /// Create an analyzer over a catalog and a generation service.
    pub fn new(catalog: &'a CapabilityCatalog, service: &'a dyn GenerationService) -> Self {
        Self { catalog, service }
    }

    /// Analyze requirements into a validated plan.
    pub async fn analyze(&self, requirements: &str) -> Result<Plan, AnalysisError> {
        let prompt = self.build_prompt(requirements);
        let system = &self.catalog.coordinator().prompt;

        let response = self.service.generate(&prompt, system).await?;

        let object = extract_object(&response)
            .ok_or_else(|| AnalysisError::NoObject { raw: response.clone() })?;

        let draft: DraftPlan = serde_json::from_str(object)
            .map_err(|source| AnalysisError::Decode { source, raw: response.clone() })?;

        Ok(self.validate(draft))
    }

    /// Build the analysis prompt, embedding the exact set of valid keys.
    fn build_prompt(&self, requirements: &str) -> String {
        let keys = self.catalog.keys().join(", ");
        format!(
            r#"Analyze these project requirements and create a detailed project plan:

Requirements: {requirements}

IMPORTANT: Use ONLY these exact capability values in your response: {keys}

Respond with a JSON object with these fields:
1. summary - one-paragraph project summary
2. required_capabilities - list of capabilities needed (from: {keys})
3. tasks - list of tasks, each with id, title, description, capability, dependencies, estimated_hours
4. tech_stack - list of technologies
5. estimated_time - overall time estimate
6. challenges - list of anticipated risks
7. deliverables - list of expected deliverables

Example task:
{{
  "id": "task_1",
  "title": "Set up database schema",
  "description": "Design and implement the database schema",
  "capability": "database_specialist",
  "dependencies": [],
  "estimated_hours": 4
}}

Ensure the JSON is valid. Use ONLY the capability values listed above."#
        )
    }

    /// Rewrite draft tasks into validated tasks.
    ///
    /// Unresolved capability names default to the coordinator; the original
    /// spelling survives only in the warning.
    fn validate(&self, draft: DraftPlan) -> Plan {
        let coordinator = self.catalog.coordinator().key;

        let tasks = draft
            .tasks
            .into_iter()
            .map(|task| {
                let capability = match self.catalog.resolve(&task.capability) {
                    Some(key) => key,
                    None => {
                        tracing::warn!(
                            task = %task.id,
                            capability = %task.capability,
                            default = %coordinator,
                            "Unknown capability name, defaulting to coordinator"
                        );
                        coordinator
                    }
                };
                Task {
                    id: task.id,
                    title: task.title,
                    description: task.description,
                    capability,
                    dependencies: task.dependencies,
                    estimated_hours: task.estimated_hours,
                }
            })
            .collect();

        Plan {
            summary: draft.summary,
            required_capabilities: draft.required_capabilities,
            tasks,
            tech_stack: draft.tech_stack,
            estimated_time: draft.estimated_time,
            challenges: draft.challenges,
            deliverables: draft.deliverables,
        }
    }
}

/// Extract the first balanced top-level `{...}` substring.
///
/// Brace counting is string-aware: braces inside JSON string literals (and
/// escaped quotes) do not affect depth. Returns `None` when no balanced
/// object exists.
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityKey;
    use crate::workflow::testing::ScriptedService;

    const PLAN_JSON: &str = r#"{
        "summary": "A chat application",
        "required_capabilities": ["backend_specialist", "frontend_specialist"],
        "tasks": [
            {
                "id": "task_1",
                "title": "API server",
                "description": "Implement the websocket API",
                "capability": "backend_specialist",
                "dependencies": [],
                "estimated_hours": 8
            },
            {
                "id": "task_2",
                "title": "Chat UI",
                "description": "Build the chat interface",
                "capability": "Frontend",
                "dependencies": ["task_1"],
                "estimated_hours": 6
            }
        ],
        "tech_stack": ["rust", "react"],
        "estimated_time": "2 weeks",
        "challenges": ["realtime scaling"],
        "deliverables": ["chat app"]
    }"#;

    #[test]
    fn test_extract_object_plain() {
        assert_eq!(extract_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_object_with_surrounding_noise() {
        let text = "Here is your plan:\n```json\n{\"a\": {\"b\": 2}}\n```\nGood luck!";
        assert_eq!(extract_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_extract_object_ignores_braces_in_strings() {
        let text = r#"prefix {"note": "uses { and } inside", "n": 1} suffix"#;
        assert_eq!(extract_object(text), Some(r#"{"note": "uses { and } inside", "n": 1}"#));
    }

    #[test]
    fn test_extract_object_handles_escaped_quotes() {
        let text = r#"{"quote": "she said \"hi {\" loudly"}"#;
        assert_eq!(extract_object(text), Some(text));
    }

    #[test]
    fn test_extract_object_none_without_object() {
        assert_eq!(extract_object("no structured data here"), None);
        assert_eq!(extract_object("unbalanced { forever"), None);
        assert_eq!(extract_object(""), None);
    }

    #[tokio::test]
    async fn test_analyze_decodes_and_validates() {
        let catalog = CapabilityCatalog::builtin();
        let service =
            ScriptedService::replying([format!("Sure, here you go:\n{PLAN_JSON}\nDone.")]);
        let analyzer = RequirementAnalyzer::new(&catalog, &service);

        let plan = analyzer.analyze("build a chat app").await.unwrap();

        assert_eq!(plan.summary, "A chat application");
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[0].capability, CapabilityKey::BackendSpecialist);
        // "Frontend" resolved through the alias table.
        assert_eq!(plan.tasks[1].capability, CapabilityKey::FrontendSpecialist);
        assert_eq!(plan.tasks[1].dependencies, vec!["task_1".to_string()]);

        // The prompt advertised the valid keys.
        let prompts = service.prompts();
        assert!(prompts[0].contains("database_specialist"));
        assert!(prompts[0].contains("build a chat app"));
    }

    #[tokio::test]
    async fn test_analyze_rewrites_unresolved_capability() {
        let catalog = CapabilityCatalog::builtin();
        let raw = r#"{"summary": "s", "tasks": [
            {"id": "task_1", "title": "t", "capability": "wizard"}
        ]}"#;
        let service = ScriptedService::replying([raw.to_string()]);
        let analyzer = RequirementAnalyzer::new(&catalog, &service);

        let plan = analyzer.analyze("anything").await.unwrap();
        assert_eq!(plan.tasks[0].capability, CapabilityKey::ProjectManager);
    }

    #[tokio::test]
    async fn test_analyze_without_object_is_parse_error() {
        let catalog = CapabilityCatalog::builtin();
        let service = ScriptedService::replying(["I cannot help with that.".to_string()]);
        let analyzer = RequirementAnalyzer::new(&catalog, &service);

        let err = analyzer.analyze("anything").await.unwrap_err();
        match err {
            AnalysisError::NoObject { raw } => assert!(raw.contains("cannot help")),
            other => panic!("expected NoObject, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_with_malformed_plan_is_decode_error() {
        let catalog = CapabilityCatalog::builtin();
        // An object, but missing the required "tasks" field.
        let service = ScriptedService::replying([r#"{"summary": "s"}"#.to_string()]);
        let analyzer = RequirementAnalyzer::new(&catalog, &service);

        let err = analyzer.analyze("anything").await.unwrap_err();
        match err {
            AnalysisError::Decode { raw, .. } => assert!(raw.contains("summary")),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_propagates_service_failure() {
        let catalog = CapabilityCatalog::builtin();
        let service = ScriptedService::failing();
        let analyzer = RequirementAnalyzer::new(&catalog, &service);

        let err = analyzer.analyze("anything").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
    }
}
