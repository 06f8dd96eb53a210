//! End-to-end course pipeline: analyze → outline → content → persist.
//!
//! The pipeline owns the artifact store, the content generator and the
//! concurrency limit. Each stage can run on its own (the CLI exposes them
//! as subcommands) or chained for one employee (the worker path).

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::gap::analyze_skills_gap;
use crate::errors::AppError;
use crate::generation::content::{
    generate_batch, plan_modules, sort_by_module_number, BatchOutcome, ModuleSelection,
};
use crate::generation::generator::ContentGenerator;
use crate::generation::outline::generate_outline;
use crate::models::course::CourseOutline;
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;
use crate::models::requirements::PositionRequirements;
use crate::models::taxonomy::SkillTaxonomy;
use crate::storage::{
    content_key, employee_content_prefix, employee_gap_key, employee_outline_key, stamp_metadata,
    JsonStore, TAXONOMY_KEY,
};

pub struct CoursePipeline {
    store: JsonStore,
    generator: Arc<dyn ContentGenerator>,
    concurrency: usize,
}

/// What one full employee run produced, for the task result column.
#[derive(Debug, Clone, Serialize)]
pub struct CourseSummary {
    pub gap_report_key: String,
    pub outline_key: String,
    pub outline_reused: bool,
    pub modules_generated: usize,
    pub modules_failed: usize,
}

impl CoursePipeline {
    pub fn new(store: JsonStore, generator: Arc<dyn ContentGenerator>, concurrency: usize) -> Self {
        Self {
            store,
            generator,
            concurrency,
        }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Stage 1: deterministic gap analysis, persisted under `key`.
    pub async fn run_analysis(
        &self,
        profile: &EmployeeProfile,
        requirements: &PositionRequirements,
        key: &str,
        owner: Option<&str>,
    ) -> Result<SkillGapReport, AppError> {
        let report = analyze_skills_gap(&profile.skills, requirements);
        info!(
            "Skill gap analysis for {}: {} transferable, {} gap categories, {} learning priorities",
            profile.name,
            report.transferable_skills.len(),
            report.skill_gaps.len(),
            report.learning_priorities.len()
        );

        let path = self.persist(key, &report, owner).await?;
        info!("Saved gap report to {}", path.display());
        Ok(report)
    }

    /// Stage 2: course outline. An outline already stored under `key` is
    /// reused unless `force` is set, so reprocessing an employee does not
    /// burn LLM calls on a course that already exists.
    pub async fn run_outline(
        &self,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
        taxonomy: &SkillTaxonomy,
        key: &str,
        owner: Option<&str>,
        force: bool,
    ) -> Result<(CourseOutline, bool), AppError> {
        if !force {
            if let Some(existing) = self.store.get_as::<CourseOutline>(key).await? {
                info!(
                    "Reusing stored outline '{}' ({} modules)",
                    existing.course_title,
                    existing.module_count()
                );
                return Ok((existing, true));
            }
        }

        let outline = generate_outline(self.generator.as_ref(), profile, report, taxonomy).await?;
        let path = self.persist(key, &outline, owner).await?;
        info!("Saved course outline to {}", path.display());
        Ok((outline, false))
    }

    /// Stages 1 and 2 chained: the outline is always built against a gap
    /// analysis refreshed in the same run, never against a stale stored one.
    /// Both artifacts are written.
    pub async fn run_analysis_and_outline(
        &self,
        profile: &EmployeeProfile,
        requirements: &PositionRequirements,
        gap_key: &str,
        outline_key: &str,
        owner: Option<&str>,
        force: bool,
    ) -> Result<(SkillGapReport, CourseOutline, bool), AppError> {
        let report = self
            .run_analysis(profile, requirements, gap_key, owner)
            .await?;

        let taxonomy = self.load_taxonomy().await?;
        let (outline, reused) = self
            .run_outline(profile, &report, &taxonomy, outline_key, owner, force)
            .await?;
        Ok((report, outline, reused))
    }

    /// Stage 3: module content for the selected slice of the outline. Each
    /// completed module is persisted under `content_prefix`; failures are
    /// collected, not fatal.
    pub async fn run_content(
        &self,
        outline: &CourseOutline,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
        selection: &ModuleSelection,
        content_prefix: &str,
        owner: Option<&str>,
    ) -> Result<BatchOutcome, AppError> {
        let planned = plan_modules(outline, selection);
        if planned.is_empty() {
            warn!("Module selection matched nothing in the outline");
            return Ok(BatchOutcome {
                completed: Vec::new(),
                failed: Vec::new(),
            });
        }

        info!(
            "Generating content for {} module(s), concurrency {}",
            planned.len(),
            self.concurrency
        );
        let mut outcome = generate_batch(
            Arc::clone(&self.generator),
            planned,
            profile,
            report,
            self.concurrency,
        )
        .await;

        sort_by_module_number(&mut outcome.completed);
        outcome.failed.sort_by_key(|f| f.module_number);

        for content in &outcome.completed {
            let key = content_key(content_prefix, content.module_number);
            self.persist(&key, content, owner).await?;
        }
        info!(
            "Content generation finished: {} succeeded, {} failed",
            outcome.completed.len(),
            outcome.failed.len()
        );

        Ok(outcome)
    }

    /// The full chain for one employee, keyed by their id. Used by the
    /// worker; a run where every module fails is reported as an error so
    /// the task does not complete with an empty course.
    pub async fn run_for_employee(
        &self,
        employee_id: &str,
        profile: &EmployeeProfile,
        requirements: &PositionRequirements,
    ) -> Result<CourseSummary, AppError> {
        let gap_key = employee_gap_key(employee_id);
        let outline_key = employee_outline_key(employee_id);
        let (report, outline, outline_reused) = self
            .run_analysis_and_outline(
                profile,
                requirements,
                &gap_key,
                &outline_key,
                Some(employee_id),
                false,
            )
            .await?;

        let prefix = employee_content_prefix(employee_id);
        let outcome = self
            .run_content(
                &outline,
                profile,
                &report,
                &ModuleSelection::All,
                &prefix,
                Some(employee_id),
            )
            .await?;

        if outcome.completed.is_empty() && !outcome.failed.is_empty() {
            return Err(AppError::Llm(format!(
                "All {} module generations failed",
                outcome.failed.len()
            )));
        }

        Ok(CourseSummary {
            gap_report_key: gap_key,
            outline_key,
            outline_reused,
            modules_generated: outcome.completed.len(),
            modules_failed: outcome.failed.len(),
        })
    }

    /// The locally stored skills taxonomy. Absence is not fatal: the outline
    /// prompt simply goes out without a reference skill list.
    pub async fn load_taxonomy(&self) -> Result<SkillTaxonomy, AppError> {
        match self.store.get_as::<SkillTaxonomy>(TAXONOMY_KEY).await? {
            Some(taxonomy) => Ok(taxonomy),
            None => {
                warn!("No skills taxonomy stored under '{TAXONOMY_KEY}', continuing without one");
                Ok(SkillTaxonomy { skills: Vec::new() })
            }
        }
    }

    async fn persist<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        owner: Option<&str>,
    ) -> Result<PathBuf, AppError> {
        let mut value = serde_json::to_value(value)?;
        if let Some(employee_id) = owner {
            stamp_metadata(&mut value, employee_id);
        }
        self.store.put(key, &value).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
