//! Capability registry.
//!
//! Named specialist profiles that contextualize generation-service calls,
//! plus a fuzzy name-resolution table so that whatever spelling the model
//! emits ("PM", "Frontend Specialist", "qa") maps back to a canonical key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical capability keys.
///
/// The wire strings (snake_case) are stable: they appear in persisted project
/// records and downstream tooling groups output by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKey {
    /// Coordinator role; also the default for unresolved capability names.
    ProjectManager,
    FrontendSpecialist,
    BackendSpecialist,
    DatabaseSpecialist,
    DevopsSpecialist,
    Tester,
}

impl CapabilityKey {
    /// All keys in registration order.
    pub const ALL: [CapabilityKey; 6] = [
        CapabilityKey::ProjectManager,
        CapabilityKey::FrontendSpecialist,
        CapabilityKey::BackendSpecialist,
        CapabilityKey::DatabaseSpecialist,
        CapabilityKey::DevopsSpecialist,
        CapabilityKey::Tester,
    ];

    /// The canonical wire string for this key.
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityKey::ProjectManager => "project_manager",
            CapabilityKey::FrontendSpecialist => "frontend_specialist",
            CapabilityKey::BackendSpecialist => "backend_specialist",
            CapabilityKey::DatabaseSpecialist => "database_specialist",
            CapabilityKey::DevopsSpecialist => "devops_specialist",
            CapabilityKey::Tester => "tester",
        }
    }

    /// Parse an exact canonical key string.
    pub fn from_exact(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A specialist profile. Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityProfile {
    /// Canonical key
    pub key: CapabilityKey,

    /// Human-readable display name
    pub name: String,

    /// Role tag (shown in listings)
    pub role: String,

    /// Instructional text sent as system context for this specialist
    pub prompt: String,

    /// Skill tags
    pub skills: Vec<String>,
}

/// Read-only catalog of capability profiles with alias resolution.
///
/// Built once at startup; safe to share afterwards. Alias registration order
/// is fixed so substring-fallback resolution stays deterministic.
pub struct CapabilityCatalog {
    profiles: Vec<CapabilityProfile>,
    index: HashMap<CapabilityKey, usize>,
    /// Lowercased alias -> key, in registration order (substring fallback scans this).
    aliases: Vec<(String, CapabilityKey)>,
    alias_index: HashMap<String, CapabilityKey>,
}

impl CapabilityCatalog {
    fn new() -> Self {
        Self {
            profiles: Vec::new(),
            index: HashMap::new(),
            aliases: Vec::new(),
            alias_index: HashMap::new(),
        }
    }

    fn register(&mut self, profile: CapabilityProfile, aliases: &[&str]) {
        let key = profile.key;
        self.index.insert(key, self.profiles.len());
        self.profiles.push(profile);

        // A key always resolves through its own canonical name.
        self.add_alias(key.as_str(), key);
        for alias in aliases {
            self.add_alias(alias, key);
        }
    }

    fn add_alias(&mut self, alias: &str, key: CapabilityKey) {
        let normalized = alias.trim().to_lowercase();
        if self.alias_index.contains_key(&normalized) {
            return;
        }
        self.alias_index.insert(normalized.clone(), key);
        self.aliases.push((normalized, key));
    }

    /// Build the catalog of builtin specialist profiles.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::ProjectManager,
                name: "Project Manager".to_string(),
                role: "coordination".to_string(),
                prompt: "You are an expert Project Manager AI. Your job is to:\n\
                         1. Analyze client requirements thoroughly\n\
                         2. Break projects down into specific, actionable tasks\n\
                         3. Assign each task to the right specialist\n\
                         4. Create realistic timelines and dependencies\n\
                         5. Coordinate between specialists and ensure quality\n\n\
                         Always respond in JSON when asked for structured output."
                    .to_string(),
                skills: vec![
                    "project_planning".to_string(),
                    "requirement_analysis".to_string(),
                    "coordination".to_string(),
                    "quality_assurance".to_string(),
                ],
            },
            &["project manager", "pm", "coordinator", "manager"],
        );

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::FrontendSpecialist,
                name: "Frontend Developer".to_string(),
                role: "frontend".to_string(),
                prompt: "You are an expert Frontend Developer AI. You specialize in:\n\
                         - React, Vue, and Angular frameworks\n\
                         - HTML5, CSS3, JavaScript/TypeScript\n\
                         - UI/UX design principles and responsive design\n\
                         - Performance optimization and accessibility\n\n\
                         Generate production-ready code with proper structure and error handling."
                    .to_string(),
                skills: vec![
                    "react".to_string(),
                    "vue".to_string(),
                    "html".to_string(),
                    "css".to_string(),
                    "typescript".to_string(),
                    "ui_ux".to_string(),
                ],
            },
            &["frontend specialist", "frontend", "ui_developer", "frontend_developer"],
        );

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::BackendSpecialist,
                name: "Backend Developer".to_string(),
                role: "backend".to_string(),
                prompt: "You are an expert Backend Developer AI. You specialize in:\n\
                         - Server-side development (Node.js, Python, Java, Rust)\n\
                         - RESTful APIs and GraphQL\n\
                         - Authentication, authorization, and security best practices\n\
                         - Microservices architecture\n\n\
                         Generate production-ready server code with proper error handling and logging."
                    .to_string(),
                skills: vec![
                    "apis".to_string(),
                    "databases".to_string(),
                    "security".to_string(),
                    "microservices".to_string(),
                ],
            },
            &["backend specialist", "backend", "api_developer", "backend_developer"],
        );

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::DatabaseSpecialist,
                name: "Database Expert".to_string(),
                role: "database".to_string(),
                prompt: "You are an expert Database Developer AI. You specialize in:\n\
                         - SQL databases (PostgreSQL, MySQL) and NoSQL stores\n\
                         - Schema design, normalization, and data modeling\n\
                         - Query optimization and migration strategies\n\n\
                         Generate proper schemas, queries, and data access patterns."
                    .to_string(),
                skills: vec![
                    "postgresql".to_string(),
                    "mysql".to_string(),
                    "mongodb".to_string(),
                    "data_modeling".to_string(),
                ],
            },
            &["database specialist", "database", "db_specialist", "dba"],
        );

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::DevopsSpecialist,
                name: "DevOps Engineer".to_string(),
                role: "devops".to_string(),
                prompt: "You are an expert DevOps Engineer AI. You specialize in:\n\
                         - Docker, Kubernetes, and CI/CD pipelines\n\
                         - Cloud platforms and Infrastructure as Code\n\
                         - Monitoring and logging\n\n\
                         Generate deployment scripts, container files, and infrastructure configuration."
                    .to_string(),
                skills: vec![
                    "docker".to_string(),
                    "kubernetes".to_string(),
                    "cicd".to_string(),
                    "terraform".to_string(),
                ],
            },
            &["devops specialist", "devops", "infrastructure", "deployment"],
        );

        catalog.register(
            CapabilityProfile {
                key: CapabilityKey::Tester,
                name: "QA Engineer".to_string(),
                role: "testing".to_string(),
                prompt: "You are an expert QA Engineer AI. You specialize in:\n\
                         - Unit, integration, and performance testing\n\
                         - Test automation frameworks\n\
                         - Bug detection and test case design\n\n\
                         Generate comprehensive test suites and quality reports."
                    .to_string(),
                skills: vec![
                    "unit_testing".to_string(),
                    "integration_testing".to_string(),
                    "automation".to_string(),
                ],
            },
            &["qa", "qa_engineer", "qa engineer", "quality_assurance", "testing"],
        );

        catalog
    }

    /// The coordinator profile (default target for unresolved names).
    pub fn coordinator(&self) -> &CapabilityProfile {
        self.profile(CapabilityKey::ProjectManager)
    }

    /// Look up a profile by key. Every key registered in `builtin` is present.
    pub fn profile(&self, key: CapabilityKey) -> &CapabilityProfile {
        &self.profiles[self.index[&key]]
    }

    /// All profiles in registration order.
    pub fn profiles(&self) -> &[CapabilityProfile] {
        &self.profiles
    }

    /// All canonical key strings in registration order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.profiles.iter().map(|p| p.key.as_str()).collect()
    }

    /// Resolve a free-form capability name to a canonical key.
    ///
    /// Resolution order: exact key match, then case-insensitive alias match,
    /// then substring containment over aliases (first registered wins).
    pub fn resolve(&self, name: &str) -> Option<CapabilityKey> {
        if name.trim().is_empty() {
            return None;
        }

        if let Some(key) = CapabilityKey::from_exact(name) {
            return Some(key);
        }

        let normalized = name.trim().to_lowercase();
        if let Some(key) = self.alias_index.get(&normalized) {
            return Some(*key);
        }

        // Substring fallback over the ordered alias table.
        self.aliases
            .iter()
            .find(|(alias, _)| alias.contains(&normalized) || normalized.contains(alias.as_str()))
            .map(|(_, key)| *key)
    }
}

impl Default for CapabilityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_resolution() {
        let catalog = CapabilityCatalog::builtin();
        for key in CapabilityKey::ALL {
            assert_eq!(catalog.resolve(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_alias_resolution_is_case_insensitive() {
        let catalog = CapabilityCatalog::builtin();
        assert_eq!(catalog.resolve("PM"), Some(CapabilityKey::ProjectManager));
        assert_eq!(catalog.resolve("Project Manager"), Some(CapabilityKey::ProjectManager));
        assert_eq!(catalog.resolve("Frontend"), Some(CapabilityKey::FrontendSpecialist));
        assert_eq!(catalog.resolve("DevOps"), Some(CapabilityKey::DevopsSpecialist));
        assert_eq!(catalog.resolve("QA Engineer"), Some(CapabilityKey::Tester));
    }

    #[test]
    fn test_alias_resolution_trims_whitespace() {
        let catalog = CapabilityCatalog::builtin();
        assert_eq!(catalog.resolve("  backend  "), Some(CapabilityKey::BackendSpecialist));
    }

    #[test]
    fn test_substring_fallback() {
        let catalog = CapabilityCatalog::builtin();
        // Not a registered alias, but contains "frontend".
        assert_eq!(catalog.resolve("senior frontend dev"), Some(CapabilityKey::FrontendSpecialist));
        // Input contained within an alias also matches.
        assert_eq!(catalog.resolve("databas"), Some(CapabilityKey::DatabaseSpecialist));
    }

    #[test]
    fn test_substring_fallback_first_registered_wins() {
        let catalog = CapabilityCatalog::builtin();
        // "specialist" is contained in several aliases; the frontend specialist
        // registered first among them.
        assert_eq!(catalog.resolve("specialist"), Some(CapabilityKey::FrontendSpecialist));
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        let catalog = CapabilityCatalog::builtin();
        assert_eq!(catalog.resolve("astrologer"), None);
        assert_eq!(catalog.resolve(""), None);
        assert_eq!(catalog.resolve("   "), None);
    }

    #[test]
    fn test_every_key_has_a_profile() {
        let catalog = CapabilityCatalog::builtin();
        assert_eq!(catalog.profiles().len(), CapabilityKey::ALL.len());
        for key in CapabilityKey::ALL {
            let profile = catalog.profile(key);
            assert_eq!(profile.key, key);
            assert!(!profile.prompt.is_empty());
        }
    }

    #[test]
    fn test_key_wire_format() {
        let json = serde_json::to_string(&CapabilityKey::FrontendSpecialist).unwrap();
        assert_eq!(json, "\"frontend_specialist\"");

        let key: CapabilityKey = serde_json::from_str("\"tester\"").unwrap();
        assert_eq!(key, CapabilityKey::Tester);
    }
}
