//! Module content generation: a bounded-concurrency batch over the outline's
//! modules. One module's failure is logged and recorded; it never cancels the
//! rest of the batch.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::generator::ContentGenerator;
use crate::generation::prompts::MODULES_PER_WEEK;
use crate::models::course::{CourseModule, CourseOutline, ModuleContent};
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;

/// One outline module paired with the week context its prompt needs.
#[derive(Debug, Clone)]
pub struct PlannedModule {
    pub week_number: u32,
    pub week_theme: String,
    pub module: CourseModule,
}

/// Which outline modules a content run covers.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleSelection {
    All,
    /// Explicit module numbers, e.g. `--modules 1,3,5`.
    Modules(Vec<u32>),
    /// All modules of one week: week N covers (N-1)*10+1 ..= N*10.
    Week(u32),
}

impl ModuleSelection {
    fn covers(&self, module_number: u32) -> bool {
        match self {
            ModuleSelection::All => true,
            ModuleSelection::Modules(numbers) => numbers.contains(&module_number),
            // Computed from the module side: the week's own range math
            // overflows u32 for absurd week numbers.
            ModuleSelection::Week(week) => {
                module_number != 0 && (module_number - 1) / MODULES_PER_WEEK + 1 == *week
            }
        }
    }
}

/// Flattens the outline into planned modules, outline order preserved,
/// keeping only the ones the selection covers.
pub fn plan_modules(outline: &CourseOutline, selection: &ModuleSelection) -> Vec<PlannedModule> {
    outline
        .weeks
        .iter()
        .flat_map(|week| {
            week.modules
                .iter()
                .filter(|m| selection.covers(m.module_number))
                .map(|m| PlannedModule {
                    week_number: week.week_number,
                    week_theme: week.theme.clone(),
                    module: m.clone(),
                })
        })
        .collect()
}

/// Outcome of one batch run. `completed` is in completion order; callers
/// that need presentation order re-sort by module number.
#[derive(Debug)]
pub struct BatchOutcome {
    pub completed: Vec<ModuleContent>,
    pub failed: Vec<ModuleFailure>,
}

#[derive(Debug)]
pub struct ModuleFailure {
    pub module_number: u32,
    pub error: String,
}

pub fn sort_by_module_number(contents: &mut [ModuleContent]) {
    contents.sort_by_key(|c| c.module_number);
}

/// Generates and validates content for one module. An empty reply violates
/// the non-empty contract and fails this module only.
pub async fn generate_module(
    generator: &dyn ContentGenerator,
    planned: &PlannedModule,
    profile: &EmployeeProfile,
    report: &SkillGapReport,
) -> Result<ModuleContent, AppError> {
    let raw = generator
        .generate_module_content(
            &planned.module,
            planned.week_number,
            &planned.week_theme,
            profile,
            report,
        )
        .await?;

    let content = raw.trim();
    if content.is_empty() {
        return Err(AppError::Llm(format!(
            "module {} reply was empty",
            planned.module.module_number
        )));
    }

    Ok(ModuleContent {
        module_number: planned.module.module_number,
        title: planned.module.title.clone(),
        content: content.to_string(),
    })
}

/// Runs the planned modules through the generator with at most `concurrency`
/// calls in flight. Results are collected as tasks complete; per-module
/// errors and panics are recorded in `failed` and never abort siblings.
pub async fn generate_batch(
    generator: Arc<dyn ContentGenerator>,
    planned: Vec<PlannedModule>,
    profile: &EmployeeProfile,
    report: &SkillGapReport,
    concurrency: usize,
) -> BatchOutcome {
    let total = planned.len();
    info!(
        "Generating content for {} modules (concurrency {})",
        total, concurrency
    );

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let profile = Arc::new(profile.clone());
    let report = Arc::new(report.clone());

    let mut join_set = JoinSet::new();

    for planned_module in planned {
        let generator = Arc::clone(&generator);
        let semaphore = Arc::clone(&semaphore);
        let profile = Arc::clone(&profile);
        let report = Arc::clone(&report);

        join_set.spawn(async move {
            // The semaphore lives for the whole batch; acquire cannot fail.
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("batch semaphore closed");

            let module_number = planned_module.module.module_number;
            let result =
                generate_module(generator.as_ref(), &planned_module, &profile, &report).await;
            (module_number, result)
        });
    }

    let mut completed = Vec::new();
    let mut failed = Vec::new();

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((module_number, Ok(content))) => {
                info!(
                    "Module {} generated ({} chars)",
                    module_number,
                    content.content.len()
                );
                completed.push(content);
            }
            Ok((module_number, Err(e))) => {
                warn!("Module {module_number} failed: {e}");
                failed.push(ModuleFailure {
                    module_number,
                    error: e.to_string(),
                });
            }
            Err(join_error) => {
                warn!("Module generation task panicked: {join_error}");
                failed.push(ModuleFailure {
                    module_number: 0,
                    error: format!("task panicked: {join_error}"),
                });
            }
        }
    }

    info!(
        "Batch finished: {}/{} modules generated, {} failed",
        completed.len(),
        total,
        failed.len()
    );
    BatchOutcome { completed, failed }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
