use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MIN_PROFICIENCY: i32 = 1;
pub const MAX_PROFICIENCY: i32 = 5;

/// One self-reported skill with an ordinal 1-5 proficiency rating.
///
/// The rating carries no numeric semantics beyond ordering and the analyzer's
/// two thresholds. Out-of-range values are tolerated and compared numerically;
/// only strict intake (`EmployeeProfile::validate`) rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub proficiency: i32,
}

/// A named group of skills, e.g. "Technical Skills" or "Domain Knowledge".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    pub skills: Vec<SkillRecord>,
}

/// Employee profile as stored in `employee_data.json` and embedded in
/// `hr_employees` rows. `skills` is the inventory the gap analysis consumes;
/// category and skill order are preserved end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub name: String,
    pub current_role: String,
    pub target_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Free-form HR context: notes, and the names of any documents on file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub skills: Vec<SkillCategory>,
}

impl EmployeeProfile {
    /// Strict intake validation: every skill needs a non-empty name and a
    /// proficiency inside [1, 5]. Violations surface as `Validation` errors;
    /// nothing is coerced. The analyzer itself never enforces this.
    pub fn validate(&self) -> Result<(), AppError> {
        for group in &self.skills {
            for skill in &group.skills {
                if skill.name.trim().is_empty() {
                    return Err(AppError::Validation(format!(
                        "empty skill name in category '{}'",
                        group.category
                    )));
                }
                if !(MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&skill.proficiency) {
                    return Err(AppError::Validation(format!(
                        "proficiency {} for skill '{}' is outside [{MIN_PROFICIENCY}, {MAX_PROFICIENCY}]",
                        skill.proficiency, skill.name
                    )));
                }
            }
        }
        Ok(())
    }
}
