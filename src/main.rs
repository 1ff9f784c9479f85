//! Taskforge - AI project orchestrator.
//!
//! Turns free-text requirements into a planned, executed project with a
//! synthesized final deliverable.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taskforge::workflow::is_failure_placeholder;
use taskforge::{
    CapabilityCatalog, Config, GenerationManager, JsonFileStore, Project, ProjectLifecycle,
    ProjectStatus, ProjectStore,
};

/// AI project orchestrator
#[derive(Parser)]
#[command(name = "taskforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project storage directory (overrides config)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan and execute a project in one shot
    Run {
        /// Requirements text (or use --file)
        requirements: Option<String>,

        /// Read requirements from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Analyze requirements and store a planned project
    Create {
        /// Requirements text (or use --file)
        requirements: Option<String>,

        /// Read requirements from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Execute a planned project by id
    Execute {
        /// Project id
        id: String,
    },

    /// Show a stored project
    Show {
        /// Project id
        id: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List all stored projects
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the available capability profiles
    Capabilities,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config = Config::load();
    let storage_dir = cli.dir.clone().unwrap_or_else(|| config.storage_dir());

    match cli.command {
        None => cmd_interactive(&config, &storage_dir),
        Some(Commands::Run { requirements, file }) => {
            let requirements = read_requirements(requirements, file)?;
            cmd_run(&config, &storage_dir, &requirements)
        }
        Some(Commands::Create { requirements, file }) => {
            let requirements = read_requirements(requirements, file)?;
            cmd_create(&config, &storage_dir, &requirements)
        }
        Some(Commands::Execute { id }) => cmd_execute(&config, &storage_dir, &id),
        Some(Commands::Show { id, format }) => cmd_show(&storage_dir, &id, &format),
        Some(Commands::List { format }) => cmd_list(&storage_dir, &format),
        Some(Commands::Capabilities) => cmd_capabilities(),
    }
}

/// Requirements come from the positional argument or --file, not both.
fn read_requirements(inline: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (inline, file) {
        (Some(_), Some(_)) => bail!("Pass requirements inline or via --file, not both"),
        (Some(text), None) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display())),
        (None, None) => bail!("No requirements given (pass text or --file)"),
    }
}

/// Build a lifecycle over the configured provider chain and file store.
async fn build_lifecycle(config: &Config, storage_dir: &PathBuf) -> Result<ProjectLifecycle> {
    let manager = GenerationManager::new(&config.ai).await;
    if !manager.is_configured() {
        bail!(
            "No generation provider available.\n\
             Set GEMINI_API_KEY, or run a local Ollama instance."
        );
    }
    println!("Provider: {}", manager.active_provider().unwrap_or("unknown"));

    let store = JsonFileStore::open(storage_dir.clone())?;
    Ok(ProjectLifecycle::new(
        Arc::new(CapabilityCatalog::builtin()),
        Arc::new(manager),
        Box::new(store),
    )
    .with_executor_config(config.executor_config()))
}

fn cmd_run(config: &Config, storage_dir: &PathBuf, requirements: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut lifecycle = build_lifecycle(config, storage_dir).await?;

        println!("Analyzing requirements...");
        let project = lifecycle.create(requirements).await?;
        print_plan(&project);

        println!("\nExecuting {} tasks...", project.tasks.len());
        let executed = lifecycle.execute(&project.id).await?;
        print_outcome(&executed);
        Ok(())
    })
}

fn cmd_create(config: &Config, storage_dir: &PathBuf, requirements: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut lifecycle = build_lifecycle(config, storage_dir).await?;

        println!("Analyzing requirements...");
        let project = lifecycle.create(requirements).await?;
        print_plan(&project);
        println!("\nExecute with: taskforge execute {}", project.id);
        Ok(())
    })
}

fn cmd_execute(config: &Config, storage_dir: &PathBuf, id: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut lifecycle = build_lifecycle(config, storage_dir).await?;
        let executed = lifecycle.execute(id).await?;
        print_outcome(&executed);
        Ok(())
    })
}

fn cmd_show(storage_dir: &PathBuf, id: &str, format: &str) -> Result<()> {
    let store = JsonFileStore::open(storage_dir.clone())?;
    let project = store.get(id)?.with_context(|| format!("Project {id} not found"))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    print_plan(&project);
    if project.status == ProjectStatus::Completed {
        print_outcome(&project);
    }
    Ok(())
}

fn cmd_list(storage_dir: &PathBuf, format: &str) -> Result<()> {
    let store = JsonFileStore::open(storage_dir.clone())?;
    let projects = store.list()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects yet. Create one with: taskforge create \"<requirements>\"");
        return Ok(());
    }

    for project in &projects {
        println!(
            "{}  [{}]  {} tasks  {}",
            project.id,
            project.status,
            project.tasks.len(),
            truncate(&project.plan.summary, 60)
        );
    }
    Ok(())
}

fn cmd_capabilities() -> Result<()> {
    let catalog = CapabilityCatalog::builtin();
    println!("Available capabilities:\n");
    for profile in catalog.profiles() {
        println!("  {:<22} {}  ({})", profile.key.to_string(), profile.name, profile.role);
    }
    Ok(())
}

fn cmd_interactive(config: &Config, storage_dir: &PathBuf) -> Result<()> {
    println!("Taskforge - AI project orchestrator");
    cmd_capabilities()?;

    print!("\nRequirements: ");
    io::stdout().flush()?;
    let mut requirements = String::new();
    io::stdin().read_line(&mut requirements)?;
    let requirements = requirements.trim();
    if requirements.is_empty() {
        bail!("No requirements entered");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut lifecycle = build_lifecycle(config, storage_dir).await?;

        println!("\nAnalyzing requirements...");
        let project = lifecycle.create(requirements).await?;
        print_plan(&project);

        print!("\nExecute project now? (y/n): ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if answer.trim().eq_ignore_ascii_case("y") {
            let executed = lifecycle.execute(&project.id).await?;
            print_outcome(&executed);
        } else {
            println!("Stored as {}. Execute later with: taskforge execute {}", project.id, project.id);
        }
        Ok(())
    })
}

fn print_plan(project: &Project) {
    println!("\nProject {}", project.id);
    println!("Status: {}", project.status);
    println!("Summary: {}", project.plan.summary);
    if !project.plan.tech_stack.is_empty() {
        println!("Tech stack: {}", project.plan.tech_stack.join(", "));
    }
    if !project.plan.estimated_time.is_empty() {
        println!("Estimated time: {}", project.plan.estimated_time);
    }
    println!("Tasks:");
    for task in &project.tasks {
        let deps = if task.dependencies.is_empty() {
            String::new()
        } else {
            format!("  (after {})", task.dependencies.join(", "))
        };
        println!("  {} - {} [{}]{}", task.id, task.title, task.capability, deps);
    }
}

fn print_outcome(project: &Project) {
    let (completed, failed) = project.result_counts();
    println!("\nResults: {} completed, {} failed", completed, failed);
    for result in &project.results {
        let marker = match result.status {
            taskforge::TaskStatus::Completed => "ok",
            taskforge::TaskStatus::Failed => "FAILED",
        };
        println!("  {} - {} [{}]", result.task_id, result.capability_name, marker);
    }

    if let Some(deliverable) = &project.final_deliverable {
        if is_failure_placeholder(deliverable) {
            println!("\nFinal deliverable unavailable: {}", deliverable);
        } else {
            println!("\n--- Final deliverable ---\n{}", deliverable);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{truncated}...")
    }
}
