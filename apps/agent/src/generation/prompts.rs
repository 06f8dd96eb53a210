// All LLM prompt constants for the course generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::errors::AppError;
use crate::llm_client::prompts::PERSONALIZATION_INSTRUCTION;
use crate::models::course::CourseModule;
use crate::models::employee::EmployeeProfile;
use crate::models::report::SkillGapReport;
use crate::models::taxonomy::SkillTaxonomy;

/// Fixed course shape: every generated course runs this many weeks.
pub const COURSE_WEEKS: u32 = 4;
/// Modules per week. The `--week` filter derives its module ranges from this.
pub const MODULES_PER_WEEK: u32 = 10;
pub const TOTAL_MODULES: u32 = COURSE_WEEKS * MODULES_PER_WEEK;

/// Word target for one module's teaching content.
pub const MODULE_WORD_TARGET: u32 = 900;

/// System prompt for outline generation. Enforces JSON-only output.
pub const OUTLINE_SYSTEM: &str =
    "You are an expert curriculum designer creating personalized career-transition courses. \
    You design course outlines that move a student from their current role into a target role \
    by building on transferable skills and closing identified skill gaps. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Outline prompt template.
/// Replace: {weeks}, {total_modules}, {modules_per_week}, {student_name},
///          {current_role}, {target_role}, {profile_json}, {analysis_json},
///          {taxonomy_json}, {personalization_instruction}
pub const OUTLINE_PROMPT_TEMPLATE: &str = r#"Create a personalized {weeks}-week course outline ({total_modules} modules total, {modules_per_week} per week) for {student_name}, a {current_role} preparing to move into a {target_role} role.

STUDENT PROFILE:
{profile_json}

SKILL GAP ANALYSIS (transferable strengths, gap categories, ranked learning priorities):
{analysis_json}

SKILL TAXONOMY (reference list of real skills for this domain; prefer these names):
{taxonomy_json}

{personalization_instruction}

Return a JSON object with this EXACT schema (no extra fields):
{
  "course_title": "From Data Analysis to Financial Analysis",
  "course_description": "One paragraph on what this program covers and how it fits the student",
  "student_name": "Alex Chen",
  "duration": "4 Weeks",
  "target_role": "Financial Analyst",
  "weeks": [
    {
      "week_number": 1,
      "theme": "Foundations",
      "description": "What this week covers and why it comes first",
      "modules": [
        {
          "module_number": 1,
          "title": "Module title",
          "focus_area": "The skill or gap this module works on",
          "learning_objectives": ["objective 1", "objective 2", "objective 3"]
        }
      ]
    }
  ]
}

HARD RULES:
1. Exactly {weeks} weeks with {modules_per_week} modules each; module_number runs continuously from 1 to {total_modules} across weeks
2. Weeks progress from foundations toward role-ready application; later weeks build on earlier ones
3. Early modules lean on the student's transferable skills to introduce new material
4. Every learning priority from the analysis is covered by at least one module
5. Give every module exactly 3 learning_objectives"#;

/// System prompt for module content generation. Free-form HTML, not JSON.
pub const MODULE_SYSTEM: &str =
    "You are an expert educator writing personalized teaching content for career-transition \
    courses. You write clear, practical lessons in clean HTML fragments that build on what \
    the student already knows. Respond with the lesson content only, with no preamble and \
    no markdown code fences.";

/// Module content prompt template.
/// Replace: {module_number}, {module_title}, {week_number}, {week_theme},
///          {focus_area}, {objectives}, {student_name}, {current_role},
///          {target_role}, {education}, {experience}, {transferable},
///          {priorities}, {word_target}, {personalization_instruction}
pub const MODULE_PROMPT_TEMPLATE: &str = r#"Write the full teaching content for one course module.

MODULE {module_number}: {module_title}
Week {week_number} theme: {week_theme}
Focus area: {focus_area}
Learning objectives:
{objectives}

STUDENT:
{student_name} is a {current_role} moving into a {target_role} role.
Education: {education}. Years of experience: {experience}.
Transferable strengths to build on: {transferable}.
Learning priorities to address: {priorities}.

{personalization_instruction}

REQUIREMENTS:
1. Around {word_target} words of substantive teaching content
2. Clean HTML fragment: <h3> section headings, <p> paragraphs, <ul>/<li> lists; no <html>, <head> or <body> wrapper
3. Open by connecting the topic to the student's existing strengths, then teach the new material step by step
4. Include at least one worked, concrete example relevant to the {target_role} role
5. Close with a short practice exercise the student can complete on their own"#;

/// Builds the outline prompt by filling the template with serialized student
/// context.
pub fn build_outline_prompt(
    profile: &EmployeeProfile,
    report: &SkillGapReport,
    taxonomy: &SkillTaxonomy,
) -> Result<String, AppError> {
    let profile_json = serde_json::to_string_pretty(profile)?;
    let analysis_json = serde_json::to_string_pretty(report)?;
    let taxonomy_json = serde_json::to_string_pretty(taxonomy)?;

    Ok(OUTLINE_PROMPT_TEMPLATE
        .replace("{weeks}", &COURSE_WEEKS.to_string())
        .replace("{total_modules}", &TOTAL_MODULES.to_string())
        .replace("{modules_per_week}", &MODULES_PER_WEEK.to_string())
        .replace("{student_name}", &profile.name)
        .replace("{current_role}", &profile.current_role)
        .replace("{target_role}", &profile.target_role)
        .replace("{profile_json}", &profile_json)
        .replace("{analysis_json}", &analysis_json)
        .replace("{taxonomy_json}", &taxonomy_json)
        .replace("{personalization_instruction}", PERSONALIZATION_INSTRUCTION))
}

/// Builds the per-module content prompt. Infallible: everything embedded is
/// already plain text.
pub fn build_module_prompt(
    module: &CourseModule,
    week_number: u32,
    week_theme: &str,
    profile: &EmployeeProfile,
    report: &SkillGapReport,
) -> String {
    let objectives = module
        .learning_objectives
        .iter()
        .map(|o| format!("- {o}"))
        .collect::<Vec<_>>()
        .join("\n");

    // Shortlists keep the prompt focused; five covers the ranked priorities.
    let transferable = join_first(&report.transferable_skills, 5);
    let priorities = join_first(&report.learning_priorities, 5);

    let experience = profile
        .years_experience
        .map(|y| y.to_string())
        .unwrap_or_else(|| "not specified".to_string());

    MODULE_PROMPT_TEMPLATE
        .replace("{module_number}", &module.module_number.to_string())
        .replace("{module_title}", &module.title)
        .replace("{week_number}", &week_number.to_string())
        .replace("{week_theme}", week_theme)
        .replace("{focus_area}", &module.focus_area)
        .replace("{objectives}", &objectives)
        .replace("{student_name}", &profile.name)
        .replace("{current_role}", &profile.current_role)
        .replace("{target_role}", &profile.target_role)
        .replace("{education}", profile.education.as_deref().unwrap_or("not specified"))
        .replace("{experience}", &experience)
        .replace("{transferable}", &transferable)
        .replace("{priorities}", &priorities)
        .replace("{word_target}", &MODULE_WORD_TARGET.to_string())
        .replace("{personalization_instruction}", PERSONALIZATION_INSTRUCTION)
}

fn join_first(items: &[String], count: usize) -> String {
    if items.is_empty() {
        return "none listed".to_string();
    }
    items
        .iter()
        .take(count)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
