use serde::{Deserialize, Serialize};

use crate::models::requirements::Priority;

/// One required category with at least one unmet skill. `skills` keeps the
/// required-side names in input order; categories with zero gaps never appear
/// in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapCategory {
    pub category: String,
    pub skills: Vec<String>,
    pub priority: Priority,
}

/// Output of the skill-gap analysis. Field names and declaration order are the
/// wire contract: the frontend, the prompt builders and the stored
/// `skills_gap_analysis` artifact all read these exact keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGapReport {
    /// Set-like: first-seen order, duplicates suppressed, employee-side casing.
    pub transferable_skills: Vec<String>,
    pub skill_gaps: Vec<SkillGapCategory>,
    /// Ranked shortlist, at most five entries, drawn from `skill_gaps`.
    pub learning_priorities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_contract_field_names() {
        let report = SkillGapReport {
            transferable_skills: vec!["Excel".to_string()],
            skill_gaps: vec![SkillGapCategory {
                category: "Accounting".to_string(),
                skills: vec!["GAAP".to_string()],
                priority: Priority::High,
            }],
            learning_priorities: vec!["GAAP".to_string()],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("transferable_skills").is_some());
        assert!(value.get("skill_gaps").is_some());
        assert!(value.get("learning_priorities").is_some());
        assert_eq!(value["skill_gaps"][0]["priority"], "High");
    }
}
