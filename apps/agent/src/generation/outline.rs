//! Course outline generation: one LLM call, then a best-effort structured
//! parse of the reply. A reply with no parsable outline fails the attempt;
//! nothing is ever fabricated in its place.

use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::ContentGenerator;
use crate::llm_client::extract_json_block;
use crate::models::course::CourseOutline;
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;
use crate::models::taxonomy::SkillTaxonomy;

/// Generates and parses the course outline for one student.
pub async fn generate_outline(
    generator: &dyn ContentGenerator,
    profile: &EmployeeProfile,
    report: &SkillGapReport,
    taxonomy: &SkillTaxonomy,
) -> Result<CourseOutline, AppError> {
    info!("Generating course outline for {}", profile.name);

    let raw = generator
        .generate_outline(profile, report, taxonomy)
        .await?;
    let outline = parse_outline(&raw)?;

    info!(
        "Outline parsed: '{}' ({} weeks, {} modules)",
        outline.course_title,
        outline.weeks.len(),
        outline.module_count()
    );
    Ok(outline)
}

/// Extracts the first well-formed JSON block from a generator reply and
/// parses it as a `CourseOutline`.
pub fn parse_outline(raw: &str) -> Result<CourseOutline, AppError> {
    let block = extract_json_block(raw)
        .ok_or_else(|| AppError::Llm("outline reply contained no JSON block".to_string()))?;

    serde_json::from_str(block)
        .map_err(|e| AppError::Llm(format!("outline JSON did not match the expected shape: {e}")))
}
