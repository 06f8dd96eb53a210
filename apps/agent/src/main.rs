mod analysis;
mod config;
mod errors;
mod generation;
mod llm_client;
mod models;
mod pipeline;
mod storage;
mod tasks;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::gap::analyze_skills_gap;
use crate::config::Config;
use crate::errors::AppError;
use crate::generation::content::ModuleSelection;
use crate::generation::generator::GroqGenerator;
use crate::llm_client::GroqClient;
use crate::models::course::CourseOutline;
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;
use crate::models::requirements::PositionRequirements;
use crate::pipeline::CoursePipeline;
use crate::storage::{
    JsonStore, CONTENT_DIR, EMPLOYEE_DATA_KEY, GAP_ANALYSIS_KEY, OUTLINE_KEY, REQUIREMENTS_KEY,
};
use crate::tasks::worker::Worker;
use crate::tasks::TaskClient;

#[derive(Parser)]
#[command(
    name = "agent",
    about = "Skill gap analysis and personalized course generation",
    version
)]
struct Cli {
    /// Directory holding the JSON artifacts (overrides DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the skill gap analysis and store the report.
    Analyze {
        /// Reject an invalid profile instead of analyzing it as-is.
        #[arg(long)]
        strict: bool,
    },
    /// Run the gap analysis, then generate the personalized course outline.
    Outline {
        /// Regenerate even when an outline is already stored.
        #[arg(long)]
        force: bool,
    },
    /// Generate module content for the stored outline.
    Content {
        /// Comma-separated module numbers, e.g. --modules 1,2,11.
        #[arg(long, value_delimiter = ',', conflicts_with = "week")]
        modules: Option<Vec<u32>>,
        /// All modules of one week, e.g. --week 2.
        #[arg(long)]
        week: Option<u32>,
    },
    /// Poll the task backend and process employee profiles.
    Worker {
        /// Run a single polling pass and exit.
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (credentials are checked per subcommand)
    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting LearnFinity agent v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Analyze { strict } => run_analyze(&config, strict).await?,
        Command::Outline { force } => run_outline(&config, force).await?,
        Command::Content { modules, week } => run_content(&config, modules, week).await?,
        Command::Worker { once } => run_worker(&config, once).await?,
    }

    Ok(())
}

async fn run_analyze(config: &Config, strict: bool) -> Result<(), AppError> {
    let store = JsonStore::new(&config.data_dir);
    let profile = load_profile(&store).await?;
    if strict {
        profile.validate()?;
    }
    let requirements = load_requirements(&store).await?;

    let report = analyze_skills_gap(&profile.skills, &requirements);
    info!(
        "Skill gap analysis for {}: {} transferable, {} gap categories, {} learning priorities",
        profile.name,
        report.transferable_skills.len(),
        report.skill_gaps.len(),
        report.learning_priorities.len()
    );
    let path = store.put_as(GAP_ANALYSIS_KEY, &report).await?;
    info!("Saved gap report to {}", path.display());

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_outline(config: &Config, force: bool) -> Result<(), AppError> {
    let pipeline = build_pipeline(config, JsonStore::new(&config.data_dir))?;
    let profile = load_profile(pipeline.store()).await?;
    let requirements = load_requirements(pipeline.store()).await?;

    let (report, outline, reused) = pipeline
        .run_analysis_and_outline(
            &profile,
            &requirements,
            GAP_ANALYSIS_KEY,
            OUTLINE_KEY,
            None,
            force,
        )
        .await?;

    println!(
        "Gap analysis: {} transferable, {} gap categories, {} learning priorities",
        report.transferable_skills.len(),
        report.skill_gaps.len(),
        report.learning_priorities.len()
    );
    let verb = if reused { "Reused" } else { "Generated" };
    println!(
        "{verb} outline '{}': {} weeks, {} modules",
        outline.course_title,
        outline.weeks.len(),
        outline.module_count()
    );
    Ok(())
}

async fn run_content(
    config: &Config,
    modules: Option<Vec<u32>>,
    week: Option<u32>,
) -> Result<(), AppError> {
    let pipeline = build_pipeline(config, JsonStore::new(&config.data_dir))?;
    let profile = load_profile(pipeline.store()).await?;
    let report = load_report(pipeline.store()).await?;
    let outline = load_outline(pipeline.store()).await?;

    let selection = match (modules, week) {
        (Some(modules), _) => ModuleSelection::Modules(modules),
        (None, Some(week)) => ModuleSelection::Week(week),
        (None, None) => ModuleSelection::All,
    };

    let outcome = pipeline
        .run_content(&outline, &profile, &report, &selection, CONTENT_DIR, None)
        .await?;

    for content in &outcome.completed {
        println!("Module {:02}: {}", content.module_number, content.title);
    }
    for failure in &outcome.failed {
        println!("Module {:02} FAILED: {}", failure.module_number, failure.error);
    }
    println!(
        "{} module(s) generated, {} failed",
        outcome.completed.len(),
        outcome.failed.len()
    );

    if outcome.completed.is_empty() && !outcome.failed.is_empty() {
        return Err(AppError::Llm(format!(
            "All {} module generations failed",
            outcome.failed.len()
        )));
    }
    Ok(())
}

async fn run_worker(config: &Config, once: bool) -> Result<(), AppError> {
    let (supabase_url, supabase_key) = config.require_tasks()?;
    let client = Arc::new(TaskClient::new(supabase_url, supabase_key));

    let store = JsonStore::new(&config.data_dir);
    let pipeline = build_pipeline(config, store)?;

    Worker::new(client, pipeline, config.poll_interval_secs)
        .run(once)
        .await
}

fn build_pipeline(config: &Config, store: JsonStore) -> Result<CoursePipeline, AppError> {
    let api_key = config.require_groq()?;
    let llm = GroqClient::new(api_key.to_string(), config.groq_model.clone());
    let generator = Arc::new(GroqGenerator::new(llm));
    Ok(CoursePipeline::new(
        store,
        generator,
        config.generation_concurrency,
    ))
}

async fn load_profile(store: &JsonStore) -> Result<EmployeeProfile, AppError> {
    store.get_as(EMPLOYEE_DATA_KEY).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "No employee profile stored under '{EMPLOYEE_DATA_KEY}'"
        ))
    })
}

async fn load_requirements(store: &JsonStore) -> Result<PositionRequirements, AppError> {
    store.get_as(REQUIREMENTS_KEY).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "No position requirements stored under '{REQUIREMENTS_KEY}'"
        ))
    })
}

async fn load_report(store: &JsonStore) -> Result<SkillGapReport, AppError> {
    store.get_as(GAP_ANALYSIS_KEY).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "No gap analysis stored under '{GAP_ANALYSIS_KEY}', run `agent analyze` first"
        ))
    })
}

async fn load_outline(store: &JsonStore) -> Result<CourseOutline, AppError> {
    store.get_as(OUTLINE_KEY).await?.ok_or_else(|| {
        AppError::NotFound(format!(
            "No course outline stored under '{OUTLINE_KEY}', run `agent outline` first"
        ))
    })
}
