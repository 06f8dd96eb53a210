//! Content generator seam: the direct function-call interface every course
//! generation step goes through.
//!
//! `GroqGenerator` is the production backend; tests script their own
//! implementations to exercise orchestration without network calls.

use async_trait::async_trait;
use tracing::debug;

use crate::errors::AppError;
use crate::generation::prompts;
use crate::llm_client::GroqClient;
use crate::models::course::CourseModule;
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;
use crate::models::taxonomy::SkillTaxonomy;

/// Produces raw generator text for the two course-building capabilities.
/// Callers own parsing and validation of the reply.
///
/// Held by the pipeline as `Arc<dyn ContentGenerator>`.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Full-course outline reply for one student. Raw text; the caller
    /// best-effort parses it into a `CourseOutline`.
    async fn generate_outline(
        &self,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
        taxonomy: &SkillTaxonomy,
    ) -> Result<String, AppError>;

    /// Long-form teaching content for one module. Raw text; the non-empty
    /// contract is enforced by the caller.
    async fn generate_module_content(
        &self,
        module: &CourseModule,
        week_number: u32,
        week_theme: &str,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
    ) -> Result<String, AppError>;
}

/// Production generator backed by the Groq chat API.
pub struct GroqGenerator {
    llm: GroqClient,
}

impl GroqGenerator {
    pub fn new(llm: GroqClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentGenerator for GroqGenerator {
    async fn generate_outline(
        &self,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
        taxonomy: &SkillTaxonomy,
    ) -> Result<String, AppError> {
        let prompt = prompts::build_outline_prompt(profile, report, taxonomy)?;
        debug!(
            "Outline prompt for {} rendered ({} chars, model {})",
            profile.name,
            prompt.len(),
            self.llm.model()
        );

        let response = self
            .llm
            .call(&prompt, prompts::OUTLINE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("outline generation failed: {e}")))?;

        let text = response
            .text()
            .ok_or_else(|| AppError::Llm("outline reply had no content".to_string()))?;
        Ok(text.to_string())
    }

    async fn generate_module_content(
        &self,
        module: &CourseModule,
        week_number: u32,
        week_theme: &str,
        profile: &EmployeeProfile,
        report: &SkillGapReport,
    ) -> Result<String, AppError> {
        let prompt = prompts::build_module_prompt(module, week_number, week_theme, profile, report);
        debug!(
            "Module {} prompt rendered ({} chars)",
            module.module_number,
            prompt.len()
        );

        let response = self
            .llm
            .call(&prompt, prompts::MODULE_SYSTEM)
            .await
            .map_err(|e| {
                AppError::Llm(format!(
                    "module {} generation failed: {e}",
                    module.module_number
                ))
            })?;

        let text = response.text().ok_or_else(|| {
            AppError::Llm(format!(
                "module {} reply had no content",
                module.module_number
            ))
        })?;
        Ok(text.to_string())
    }
}
