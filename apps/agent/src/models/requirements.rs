use serde::{Deserialize, Serialize};

/// Gap-category priority, serialized by variant name ("High" / "Medium" /
/// "Low"). A category without an explicit priority defaults to `Medium`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// One required-skills category for a target position. `skills` holds plain
/// names (a requirement is binary, there is no proficiency); input order is
/// significant and preserved through analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkillCategory {
    pub category: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

/// Required-skills definition for a target position, as stored in
/// `position_requirements.json` and in the backend's `position_requirements`
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRequirements {
    pub required_skills: Vec<RequiredSkillCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_priority_defaults_to_medium() {
        let category: RequiredSkillCategory = serde_json::from_value(json!({
            "category": "Accounting",
            "skills": ["GAAP", "Variance Analysis"]
        }))
        .unwrap();
        assert_eq!(category.priority, Priority::Medium);
    }

    #[test]
    fn test_priority_round_trips_by_variant_name() {
        let category = RequiredSkillCategory {
            category: "Modeling".to_string(),
            skills: vec!["DCF".to_string()],
            priority: Priority::High,
        };
        let value = serde_json::to_value(&category).unwrap();
        assert_eq!(value["priority"], "High");

        let back: RequiredSkillCategory = serde_json::from_value(value).unwrap();
        assert_eq!(back.priority, Priority::High);
    }

    #[test]
    fn test_requirements_preserve_category_order() {
        let requirements: PositionRequirements = serde_json::from_value(json!({
            "required_skills": [
                {"category": "B", "skills": ["x"]},
                {"category": "A", "skills": ["y"], "priority": "Low"}
            ]
        }))
        .unwrap();
        assert_eq!(requirements.required_skills[0].category, "B");
        assert_eq!(requirements.required_skills[1].priority, Priority::Low);
    }
}
